//! Orpheus Core
//!
//! Core types for the Orpheus operator console.
//!
//! This crate contains:
//! - Domain types: workloads, pods and datastore metrics
//! - DTOs: request/response bodies of the console HTTP API
//! - The job spec builder turning a function call request into a workload

pub mod builder;
pub mod domain;
pub mod dto;
pub mod error;

pub use builder::build;
pub use error::ValidationError;
