//! Loyalty program trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerId, Money};

use super::{read, write};
use crate::error::ServiceError;

/// Trait for loyalty point accrual.
#[async_trait]
pub trait LoyaltyProgram: Send + Sync {
    async fn award_points(&self, customer_id: &CustomerId, amount: Money)
    -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryLoyaltyState {
    points: HashMap<CustomerId, i64>,
    awards: Vec<(CustomerId, Money)>,
    fail_on_award: bool,
}

/// In-memory loyalty program: one point per whole currency unit spent.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoyaltyProgram {
    state: Arc<RwLock<InMemoryLoyaltyState>>,
}

impl InMemoryLoyaltyProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every award to fail.
    pub fn set_fail_on_award(&self, fail: bool) {
        write(&self.state).fail_on_award = fail;
    }

    /// Points balance of a customer.
    pub fn points(&self, customer_id: &CustomerId) -> i64 {
        read(&self.state)
            .points
            .get(customer_id)
            .copied()
            .unwrap_or(0)
    }

    /// Awards made so far, in order.
    pub fn awards(&self) -> Vec<(CustomerId, Money)> {
        read(&self.state).awards.clone()
    }
}

#[async_trait]
impl LoyaltyProgram for InMemoryLoyaltyProgram {
    async fn award_points(
        &self,
        customer_id: &CustomerId,
        amount: Money,
    ) -> Result<(), ServiceError> {
        let mut state = write(&self.state);
        if state.fail_on_award {
            return Err(ServiceError::Internal("loyalty ledger locked".to_string()));
        }
        *state.points.entry(customer_id.clone()).or_insert(0) += amount.units();
        state.awards.push((customer_id.clone(), amount));
        Ok(())
    }
}
