use super::{Error, Severity};

/// A policy for classifying and emitting errors.
///
/// Library code returns [`crate::Result`] and never prints. The application
/// installs a policy that decides where a failure ends up: a log file, the
/// status bar, or both.
pub trait ErrorPolicy {
    /// Classify the error's severity
    fn classify(&self, error: &Error) -> Severity;

    /// Emit the error according to the policy
    fn emit(&self, error: &Error);
}

/// A policy that drops everything.
#[derive(Debug, Clone, Default)]
pub struct NoopPolicy;

impl ErrorPolicy for NoopPolicy {
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }

    fn emit(&self, _error: &Error) {}
}

/// Uses the error's default severity and emits via tracing.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Default)]
pub struct TracingPolicy;

#[cfg(feature = "tracing")]
impl ErrorPolicy for TracingPolicy {
    fn classify(&self, error: &Error) -> Severity {
        error.severity()
    }

    fn emit(&self, error: &Error) {
        use tracing::{Level, event};

        match error.severity() {
            Severity::Warning => event!(target: "ner::error", Level::WARN, error = %error),
            Severity::Error => event!(target: "ner::error", Level::ERROR, error = %error),
        }
    }
}
