//! External system integrations for Rounds.
//!
//! - [`api`] - the Rounds HTTP API behind the [`api::RemoteGateway`] trait
//! - [`storage`] - persisted client state behind the [`storage::KeyValueStore`] trait
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the core state
//! machine can be driven by in-memory implementations in tests.
//!
//! ```rust,no_run
//! use rounds::adapters::api::HttpGateway;
//! use rounds::adapters::storage::FileStore;
//! use rounds::config::ApiConfig;
//!
//! # fn example() -> rounds::domain::Result<()> {
//! let gateway = HttpGateway::new(&ApiConfig::default(), 200)?;
//! let store = FileStore::open(".rounds/state.json")?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod storage;
