//! Selection state machine
//!
//! - [`controller`] - day, department, tab and patient selection, refresh
//!   orchestration and optimistic writes
//! - [`scope`] - monotonic scope tokens that discard stale responses
//! - [`persisted`] - typed access to the client state kept between runs

pub mod controller;
pub mod persisted;
pub mod scope;

pub use controller::{Notice, SelectionController, Tab};
pub use persisted::PersistedState;
pub use scope::{ScopeRequest, ScopeToken, ScopeTracker};
