//! Core client logic for Rounds.
//!
//! # Modules
//!
//! - [`clock`] - local date and time source
//! - [`store`] - patient cache, reconciliation rules and the pending-write ledger
//! - [`projection`] - pure patient list projection for a day and department
//! - [`selection`] - the selection controller driving fetches and writes
//!
//! # Refresh Workflow
//!
//! 1. **Scope change**: a day or department change advances the scope token
//! 2. **Fetch**: the patient list (and the report on the report tab) is
//!    requested with the current token
//! 3. **Merge**: results are folded into the store unless their token is stale
//! 4. **Detail**: the selected patient's visits for the day are merged
//! 5. **Project**: the list view is recomputed from the store
//!
//! # Example
//!
//! ```rust,no_run
//! use rounds::adapters::api::HttpGateway;
//! use rounds::adapters::storage::FileStore;
//! use rounds::config::load_config;
//! use rounds::core::clock::SystemClock;
//! use rounds::core::selection::SelectionController;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rounds.toml")?;
//! let gateway = HttpGateway::new(&config.api, config.client.feed_limit)?;
//! let storage = FileStore::open(&config.storage.path)?;
//!
//! let mut controller = SelectionController::new(
//!     Arc::new(gateway),
//!     Arc::new(SystemClock),
//!     Arc::new(storage),
//!     config.client.default_department.clone(),
//! );
//! controller.startup();
//! controller.refresh(true).await?;
//!
//! for row in controller.patient_list() {
//!     println!("{} ({})", row.label, row.count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod projection;
pub mod selection;
pub mod store;
