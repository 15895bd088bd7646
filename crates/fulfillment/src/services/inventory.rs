//! Inventory system trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ProductId;

use super::{read, write};
use crate::error::ServiceError;

/// Trait for stock accounting.
#[async_trait]
pub trait InventorySystem: Send + Sync {
    /// Applies a signed stock change: negative for a sale, positive for a
    /// restock or refund.
    async fn update_stock(&self, product_id: &ProductId, delta: i64) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    levels: HashMap<ProductId, i64>,
    adjustments: Vec<(ProductId, i64)>,
    fail_on_update: bool,
}

/// In-memory inventory system for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventorySystem {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventorySystem {
    /// Creates a new in-memory inventory system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every stock update to fail.
    pub fn set_fail_on_update(&self, fail: bool) {
        write(&self.state).fail_on_update = fail;
    }

    /// Net stock level recorded for a product.
    pub fn level(&self, product_id: &ProductId) -> i64 {
        read(&self.state)
            .levels
            .get(product_id)
            .copied()
            .unwrap_or(0)
    }

    /// Every adjustment applied so far, in order.
    pub fn adjustments(&self) -> Vec<(ProductId, i64)> {
        read(&self.state).adjustments.clone()
    }
}

#[async_trait]
impl InventorySystem for InMemoryInventorySystem {
    async fn update_stock(&self, product_id: &ProductId, delta: i64) -> Result<(), ServiceError> {
        let mut state = write(&self.state);

        if state.fail_on_update {
            return Err(ServiceError::Unavailable(
                "inventory system offline".to_string(),
            ));
        }

        *state.levels.entry(product_id.clone()).or_insert(0) += delta;
        state.adjustments.push((product_id.clone(), delta));
        Ok(())
    }
}
