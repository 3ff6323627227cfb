//! History entry model

use serde::{Deserialize, Serialize};

/// One recorded prompt/response exchange.
///
/// The creation timestamp is assigned by the server, unique per user, and
/// doubles as the entry's identifier and sort key. On the wire the field
/// is camelCase (`createdAt`), matching the backend contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The submitted prompt text
    pub prompt: String,
    /// The generated reply
    pub response: String,
    /// Server-assigned creation time in epoch milliseconds
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl HistoryEntry {
    /// Creation time rendered for display, e.g. `2026-08-04 16:02`.
    ///
    /// Falls back to the raw millisecond value if the timestamp is outside
    /// the representable range.
    pub fn created_at_display(&self) -> String {
        match chrono::DateTime::from_timestamp_millis(self.created_at) {
            Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
            None => self.created_at.to_string(),
        }
    }
}
