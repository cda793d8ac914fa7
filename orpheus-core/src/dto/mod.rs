//! Data Transfer Objects for the console HTTP API
//!
//! Request and response bodies exchanged between the console and its
//! callers (the browser front end, `orpheus-client`, the CLI).

pub mod cluster;
pub mod job;
