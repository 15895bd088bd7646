//! Route handlers.

pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use fulfillment::Outcome;
use serde::Serialize;

/// Body of an endpoint whose business outcome may be a rejection.
///
/// Rejections are answered with `200` and `{"status": "error", ...}`;
/// only faults use HTTP error statuses.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OutcomeBody<T> {
    Success(T),
    Error { code: &'static str, message: String },
}

impl<T> OutcomeBody<T> {
    /// Converts an engine outcome, shaping the success payload with `f`.
    pub fn from_outcome<U>(outcome: Outcome<U>, f: impl FnOnce(U) -> T) -> Self {
        match outcome {
            Outcome::Success(value) => OutcomeBody::Success(f(value)),
            Outcome::Failure(rejection) => OutcomeBody::Error {
                code: rejection.code(),
                message: rejection.to_string(),
            },
        }
    }
}
