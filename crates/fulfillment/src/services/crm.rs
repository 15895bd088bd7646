//! CRM trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerId, Money, TransactionId};

use super::{read, write};
use crate::error::ServiceError;

/// One purchase in a customer's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub customer_id: CustomerId,
    pub transaction_id: TransactionId,
    pub amount: Money,
}

/// Trait for customer history updates.
#[async_trait]
pub trait CrmSystem: Send + Sync {
    async fn update_customer_history(
        &self,
        customer_id: &CustomerId,
        transaction_id: &TransactionId,
        amount: Money,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCrmState {
    history: Vec<HistoryEntry>,
    fail_on_update: bool,
}

/// In-memory CRM for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCrmSystem {
    state: Arc<RwLock<InMemoryCrmState>>,
}

impl InMemoryCrmSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_update(&self, fail: bool) {
        write(&self.state).fail_on_update = fail;
    }

    /// History entries of one customer, oldest first.
    pub fn history_for(&self, customer_id: &CustomerId) -> Vec<HistoryEntry> {
        read(&self.state)
            .history
            .iter()
            .filter(|e| &e.customer_id == customer_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CrmSystem for InMemoryCrmSystem {
    async fn update_customer_history(
        &self,
        customer_id: &CustomerId,
        transaction_id: &TransactionId,
        amount: Money,
    ) -> Result<(), ServiceError> {
        let mut state = write(&self.state);
        if state.fail_on_update {
            return Err(ServiceError::Unavailable("CRM maintenance".to_string()));
        }
        state.history.push(HistoryEntry {
            customer_id: customer_id.clone(),
            transaction_id: transaction_id.clone(),
            amount,
        });
        Ok(())
    }
}
