//! Error types shared by core operations

use thiserror::Error;

/// Caller input that cannot be turned into a workload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("function name must not be empty")]
    EmptyFunction,

    #[error("module must not be empty")]
    EmptyModule,

    #[error("function name {0:?} has no characters usable in a job name")]
    UnnamableFunction(String),

    #[error("{field} must be a single line")]
    MultiLine { field: &'static str },

    #[error("parameter name {0:?} is not an identifier")]
    InvalidParameterName(String),

    #[error("image reference must not be empty")]
    EmptyImage,

    #[error("invalid cron job manifest: {0}")]
    InvalidManifest(String),

    #[error("malformed image reference {reference:?}: {reason}")]
    MalformedImage {
        reference: String,
        reason: &'static str,
    },
}
