//! Coarse-grained classification for programmatic handling of errors.
//!
//! - Warning: the current action failed, the interface keeps going
//! - Error: a subsystem failed and the user should know
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}
