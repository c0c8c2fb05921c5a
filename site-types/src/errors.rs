use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// JSON body the site API sends with non-success statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The server's message, if it sent a non-blank one.
    pub fn into_message(self) -> Option<String> {
        self.message.filter(|m| !m.trim().is_empty())
    }
}
