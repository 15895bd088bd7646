//! Tax calculator trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Money;

use super::{read, write};
use crate::error::ServiceError;
use crate::model::Address;

/// Flat rate applied by the in-memory calculator.
pub const DEFAULT_TAX_RATE: f64 = 0.22;

/// Trait for address-dependent tax computation.
#[async_trait]
pub trait TaxCalculator: Send + Sync {
    /// Returns the tax owed on `amount` when shipped to `address`.
    async fn calculate_tax(&self, amount: Money, address: &Address) -> Result<Money, ServiceError>;
}

#[derive(Debug)]
struct InMemoryTaxState {
    rate: f64,
    fail_on_calculate: bool,
}

/// In-memory flat-rate tax calculator for testing.
#[derive(Debug, Clone)]
pub struct InMemoryTaxCalculator {
    state: Arc<RwLock<InMemoryTaxState>>,
}

impl Default for InMemoryTaxCalculator {
    fn default() -> Self {
        Self::with_rate(DEFAULT_TAX_RATE)
    }
}

impl InMemoryTaxCalculator {
    /// Creates a calculator charging [`DEFAULT_TAX_RATE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calculator charging `rate` (0.22 = 22%).
    pub fn with_rate(rate: f64) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaxState {
                rate,
                fail_on_calculate: false,
            })),
        }
    }

    /// Configures every calculation to fail.
    pub fn set_fail_on_calculate(&self, fail: bool) {
        write(&self.state).fail_on_calculate = fail;
    }

    pub fn rate(&self) -> f64 {
        read(&self.state).rate
    }
}

#[async_trait]
impl TaxCalculator for InMemoryTaxCalculator {
    async fn calculate_tax(&self, amount: Money, _address: &Address) -> Result<Money, ServiceError> {
        let state = read(&self.state);
        if state.fail_on_calculate {
            return Err(ServiceError::Unavailable("tax service unreachable".to_string()));
        }
        Ok(amount.scale(state.rate))
    }
}
