pub mod policy;
pub mod result_ext;
pub mod severity;

// public exports
pub use policy::{ErrorPolicy, NoopPolicy};
pub use result_ext::ResultExt;
pub use severity::Severity;

#[cfg(feature = "tracing")]
pub use policy::TracingPolicy;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid thread: {0}")]
    InvalidThread(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("query failed: {message}")]
    Query { message: String },

    #[error("could not change tag `{tag}`: {reason}")]
    TagRejected { tag: String, reason: String },

    #[error("invalid key notation `{input}`: {reason}")]
    KeyNotation { input: String, reason: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl Error {
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    pub fn tag_rejected(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TagRejected {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    pub fn key_notation(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KeyNotation {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Default classification used by the bundled policies.
    ///
    /// Everything a user can cause from the keyboard is a warning: the
    /// interface keeps running and the message goes to the status bar.
    pub fn severity(&self) -> Severity {
        match self {
            Error::InvalidThread(_)
            | Error::InvalidMessage(_)
            | Error::TagRejected { .. }
            | Error::KeyNotation { .. } => Severity::Warning,
            Error::Query { .. } | Error::Config { .. } | Error::Io { .. } => Severity::Error,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_driven_failures_are_warnings() {
        assert!(Error::InvalidThread("abc".into()).is_warning());
        assert!(Error::tag_rejected("inbox", "read-only").is_warning());
        assert_eq!(Error::query("db locked").severity(), Severity::Error);
        assert_eq!(Error::from(std::io::Error::other("disk full")).severity(), Severity::Error);
    }

    #[test]
    fn display_names_the_offending_tag() {
        let err = Error::tag_rejected("inbox", "read-only database");
        assert_eq!(
            err.to_string(),
            "could not change tag `inbox`: read-only database"
        );
    }
}
