//! Fault types for collaborators and the workflow engine.

use thiserror::Error;

/// A fault raised by an external collaborator.
///
/// Whether a fault becomes a business rejection or escapes to the caller is
/// decided by the step that made the call, see [`crate::steps`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The service did not answer in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The service answered with an internal error.
    #[error("Service error: {0}")]
    Internal(String),
}

/// Errors surfaced by the engine as faults rather than business outcomes.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The engine was wired without one or more collaborators.
    #[error("Missing collaborators: {}", .0.join(", "))]
    Configuration(Vec<&'static str>),

    /// A helper was called with an argument outside its contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A collaborator fault that the failing step does not absorb.
    #[error("Collaborator fault during '{step}': {source}")]
    Collaborator {
        step: &'static str,
        #[source]
        source: ServiceError,
    },
}

impl FulfillmentError {
    /// Wraps a collaborator fault raised while running `step`.
    pub fn collaborator(step: &'static str, source: ServiceError) -> Self {
        FulfillmentError::Collaborator { step, source }
    }
}

/// Convenience type alias for engine results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
