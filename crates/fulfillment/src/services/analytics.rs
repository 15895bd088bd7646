//! Sales analytics trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId, Quantity};

use super::{read, write};
use crate::error::ServiceError;

/// One tracked sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleRecord {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub amount: Money,
}

/// Trait for sales tracking.
#[async_trait]
pub trait AnalyticsTracker: Send + Sync {
    async fn track_sale(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
        amount: Money,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryAnalyticsState {
    sales: Vec<SaleRecord>,
    fail_on_track: bool,
}

/// In-memory analytics tracker for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnalyticsTracker {
    state: Arc<RwLock<InMemoryAnalyticsState>>,
}

impl InMemoryAnalyticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_track(&self, fail: bool) {
        write(&self.state).fail_on_track = fail;
    }

    /// Sales tracked so far, in order.
    pub fn sales(&self) -> Vec<SaleRecord> {
        read(&self.state).sales.clone()
    }

    /// Sum of every tracked sale, or `None` if it overflows.
    pub fn revenue(&self) -> Option<Money> {
        read(&self.state)
            .sales
            .iter()
            .try_fold(Money::zero(), |total, sale| total.checked_add(sale.amount))
    }
}

#[async_trait]
impl AnalyticsTracker for InMemoryAnalyticsTracker {
    async fn track_sale(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
        amount: Money,
    ) -> Result<(), ServiceError> {
        let mut state = write(&self.state);
        if state.fail_on_track {
            return Err(ServiceError::Timeout("analytics collector".to_string()));
        }
        state.sales.push(SaleRecord {
            product_id: product_id.clone(),
            quantity,
            amount,
        });
        Ok(())
    }
}
