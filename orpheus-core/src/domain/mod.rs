//! Core domain types
//!
//! Shared between the console (which produces them) and the client/CLI
//! (which consume them over HTTP).

pub mod cronjob;
pub mod metrics;
pub mod pod;
pub mod workload;
