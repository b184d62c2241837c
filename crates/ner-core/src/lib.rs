pub mod backend;
pub mod memory;
pub mod thread;

pub use backend::{TagStore, TagTarget, ThreadQuery, ThreadStream};
pub use ids::{MessageId, ThreadId};
pub use memory::MemoryStore;
pub use thread::{Message, SortMode, TagSet, ThreadSummary};

/// Tag carried by every unread message.
pub const UNREAD_TAG: &str = "unread";
/// Tag removed when a thread is archived.
pub const INBOX_TAG: &str = "inbox";

mod ids {
    use std::fmt;

    use serde::{Deserialize, Serialize};

    /// Backend-assigned identifier of a thread. Stable across searches and
    /// refreshes, which is what lets a refreshed list find the old selection.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ThreadId(String);

    /// Backend-assigned identifier of a single message.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct MessageId(String);

    macro_rules! string_id {
        ($ty:ident) => {
            impl $ty {
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $ty {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }

            impl From<String> for $ty {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }
        };
    }

    string_id!(ThreadId);
    string_id!(MessageId);
}
