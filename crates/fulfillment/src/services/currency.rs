//! Currency conversion trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{read, write};
use crate::error::ServiceError;

/// Trait for exchange-rate lookup.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Returns how many units of `to` one unit of `from` buys, if known.
    async fn get_rate(&self, from: &str, to: &str) -> Result<Option<f64>, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCurrencyState {
    rates: HashMap<(String, String), f64>,
    fail_on_lookup: bool,
}

/// In-memory rate table, keyed by upper-cased currency codes.
#[derive(Debug, Clone)]
pub struct InMemoryCurrencyConverter {
    state: Arc<RwLock<InMemoryCurrencyState>>,
}

impl Default for InMemoryCurrencyConverter {
    /// Knows a single pair, EUR to USD at 1.08.
    fn default() -> Self {
        Self::empty().with_rate("EUR", "USD", 1.08)
    }
}

impl InMemoryCurrencyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a converter that knows no rates.
    pub fn empty() -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryCurrencyState::default())),
        }
    }

    pub fn set_rate(&self, from: &str, to: &str, rate: f64) {
        write(&self.state)
            .rates
            .insert((from.to_ascii_uppercase(), to.to_ascii_uppercase()), rate);
    }

    pub fn with_rate(self, from: &str, to: &str, rate: f64) -> Self {
        self.set_rate(from, to, rate);
        self
    }

    /// Configures every lookup to fail.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        write(&self.state).fail_on_lookup = fail;
    }
}

#[async_trait]
impl CurrencyConverter for InMemoryCurrencyConverter {
    async fn get_rate(&self, from: &str, to: &str) -> Result<Option<f64>, ServiceError> {
        let state = read(&self.state);
        if state.fail_on_lookup {
            return Err(ServiceError::Unavailable("rate feed offline".to_string()));
        }
        let key = (from.to_ascii_uppercase(), to.to_ascii_uppercase());
        Ok(state.rates.get(&key).copied())
    }
}
