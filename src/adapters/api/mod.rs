//! Rounds API integration
//!
//! [`RemoteGateway`] is the seam between the client state machine and the
//! network; [`HttpGateway`] implements it with `reqwest`.

pub mod client;
pub mod gateway;
pub mod models;

pub use client::HttpGateway;
pub use gateway::RemoteGateway;
