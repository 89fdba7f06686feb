//! Bulk resume screening service for recruitment job postings.
//!
//! The crate exposes the screening subsystem (batch intake, scoring fan-out,
//! ranking, shortlist curation, exports, analytics) behind an axum router and
//! a service facade; `main.rs` wires the HTTP server and the offline demo CLI.

pub mod config;
pub mod error;
pub mod screening;
pub mod telemetry;
