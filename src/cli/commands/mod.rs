//! CLI command implementations
//!
//! Every command returns its process exit code; see [`context::exit_code`].

pub mod context;
pub mod init;
pub mod login;
pub mod patients;
pub mod report;
pub mod validate;
pub mod visits;
pub mod watch;
