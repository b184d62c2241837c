use super::{ErrorPolicy, Result};

/// Extension trait for `Result` enabling policy-driven emission without
/// contaminating control flow with side effects.
///
/// ```rust,ignore
/// use ner_error::{Error, Result, ResultExt};
///
/// fn archive(policy: &impl ErrorPolicy) -> Option<()> {
///     let r: Result<()> = Err(Error::tag_rejected("inbox", "read-only"));
///     r.report(policy) // reported, the caller sees `None`
/// }
/// ```
pub trait ResultExt<T> {
    /// Emit the error using the provided policy, then discard it. Returns the
    /// `Ok` value if there was one.
    fn report(self, policy: &impl ErrorPolicy) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn report(self, policy: &impl ErrorPolicy) -> Option<T> {
        if let Err(ref e) = self {
            policy.emit(e);
        }
        self.ok()
    }
}
