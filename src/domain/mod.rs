//! Domain models and types for Rounds.
//!
//! This module contains the core domain models, types, and business rules for
//! the Rounds client: patients, their visit notes, the day/department filter
//! context, sessions, and the daily report.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`VisitId`])
//! - **Domain models** ([`Patient`], [`Visit`], [`DailyReport`], [`Session`])
//! - **Filter context** ([`FilterContext`], [`DepartmentFilter`])
//! - **Error types** ([`RoundsError`], [`NetworkError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Server-assigned visit ids and optimistic placeholders share one type, so a
//! placeholder can never be sent to an endpoint that needs a confirmed id:
//!
//! ```rust
//! use rounds::domain::VisitId;
//!
//! let placeholder = VisitId::placeholder();
//! assert!(placeholder.server_id().is_none());
//! assert_eq!(VisitId::from(12).server_id(), Some(12));
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, RoundsError>`]:
//!
//! ```rust
//! use rounds::domain::{validation::validate_note_text, Result};
//!
//! fn example() -> Result<()> {
//!     let note = validate_note_text("Hasta stabil, kontrol yarin yapilacak.")?;
//!     assert!(note.len() >= 20);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod errors;
pub mod filter;
pub mod ids;
pub mod nullable;
pub mod patient;
pub mod report;
pub mod result;
pub mod session;
pub mod timestamp;
pub mod validation;
pub mod visit;

// Re-export commonly used types for convenience
pub use errors::{NetworkError, RoundsError};
pub use filter::{Department, DepartmentFilter, FilterContext};
pub use ids::{PatientId, VisitId};
pub use patient::{Patient, PatientDetail, PatientSummary, ScopeItem};
pub use report::{AuthorCounts, DailyReport, FavoriteAuthors, ReportTotals};
pub use result::Result;
pub use session::{Role, Session};
pub use validation::NationalId;
pub use visit::{FeedVisit, Visit, VisitDraft, VisitOps, VisitPatch};
