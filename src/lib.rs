// Rounds - Ward-round notes client
// Copyright (c) 2025 Rounds Contributors
// Licensed under the MIT License

//! # Rounds - ward-round notes client
//!
//! Rounds is a client for a hospital note-taking service. Interns sign in,
//! open patients by national ID, attach dated departmental visit notes and
//! review aggregate daily reports.
//!
//! ## Overview
//!
//! The heart of the crate is a client-side reconciliation state machine that:
//! - **Merges** authoritative server lists and per-patient detail into a local cache
//! - **Filters** the cache by calendar day and department
//! - **Applies** creates, edits and deletes optimistically, then confirms or
//!   rolls them back and resyncs
//! - **Discards** responses that arrive for a day or department the user has
//!   already left
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Patient store, list projection and the selection controller
//! - [`adapters`] - HTTP API gateway and persisted key-value storage
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rounds::adapters::api::HttpGateway;
//! use rounds::adapters::storage::FileStore;
//! use rounds::config::{load_config, secret_string};
//! use rounds::core::clock::SystemClock;
//! use rounds::core::selection::SelectionController;
//! use rounds::domain::VisitDraft;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("rounds.toml")?;
//!     let mut controller = SelectionController::new(
//!         Arc::new(HttpGateway::new(&config.api, config.client.feed_limit)?),
//!         Arc::new(SystemClock),
//!         Arc::new(FileStore::open(&config.storage.path)?),
//!         config.client.default_department.clone(),
//!     );
//!     controller.startup();
//!     controller
//!         .login("esude", &secret_string("secret".to_string()))
//!         .await?;
//!
//!     controller.open_patient("12345678901", "Yatak 4").await?;
//!     controller
//!         .add_visit(VisitDraft::new("Hasta stabil, kontrol planlandı."))
//!         .await?;
//!
//!     for row in controller.patient_list() {
//!         println!("{} - {} visit(s)", row.label, row.count);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::Result`], whose error type is
//! [`domain::RoundsError`]. Validation failures block locally before any
//! network call; failed reads degrade to cached data; failed writes trigger a
//! resync and leave a [`core::selection::Notice`].
//!
//! ## Logging
//!
//! Rounds uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(day = "2024-05-01", "Patient list loaded");
//! warn!(operation = "create_visit", "Write failed, resyncing from server");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
