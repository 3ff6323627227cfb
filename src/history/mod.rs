//! Prompt/response history
//!
//! [`entry`] defines the recorded exchange, [`api`] implements the dynamic
//! origin's HTTP contract, and [`state`] holds the client-side cache with
//! its refresh/submit/delete reconciliation rules.

pub mod api;
pub mod entry;
pub mod state;

pub use api::BackendClient;
pub use entry::HistoryEntry;
pub use state::HistoryState;
