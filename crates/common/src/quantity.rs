//! Positive unit quantities.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected raw quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("Invalid quantity: {0} (must be a positive integer)")]
    NotPositive(i64),

    #[error("Invalid quantity: {0} (must be at most {max})", max = u32::MAX)]
    OutOfRange(i64),
}

/// A strictly positive number of product units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// Creates a quantity, returning `None` for zero.
    pub fn new(units: u32) -> Option<Self> {
        NonZeroU32::new(units).map(Self)
    }

    /// Returns the number of units.
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Returns the quantity as a signed stock delta.
    pub fn as_delta(&self) -> i64 {
        i64::from(self.0.get())
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if raw <= 0 {
            return Err(QuantityError::NotPositive(raw));
        }
        u32::try_from(raw)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(QuantityError::OutOfRange(raw))
    }
}

impl From<Quantity> for i64 {
    fn from(q: Quantity) -> Self {
        q.as_delta()
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
