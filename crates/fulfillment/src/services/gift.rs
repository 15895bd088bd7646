//! Gift-wrap pricing trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::Money;

use super::{read, write};
use crate::error::ServiceError;
use crate::model::GiftOptions;

/// Trait for pricing gift-wrap add-ons.
#[async_trait]
pub trait GiftWrapService: Send + Sync {
    async fn get_gift_wrap_price(&self, options: &GiftOptions) -> Result<Money, ServiceError>;
}

#[derive(Debug)]
struct InMemoryGiftWrapState {
    price: Money,
    quotes: u32,
}

/// In-memory gift-wrap service charging a fixed price.
#[derive(Debug, Clone)]
pub struct InMemoryGiftWrapService {
    state: Arc<RwLock<InMemoryGiftWrapState>>,
}

impl Default for InMemoryGiftWrapService {
    fn default() -> Self {
        Self::with_price(Money::from_cents(500))
    }
}

impl InMemoryGiftWrapService {
    /// Creates a service charging 5.00 per wrap.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(price: Money) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryGiftWrapState { price, quotes: 0 })),
        }
    }

    /// Number of gift-wrap quotes served.
    pub fn quote_count(&self) -> u32 {
        read(&self.state).quotes
    }
}

#[async_trait]
impl GiftWrapService for InMemoryGiftWrapService {
    async fn get_gift_wrap_price(&self, _options: &GiftOptions) -> Result<Money, ServiceError> {
        let mut state = write(&self.state);
        state.quotes += 1;
        Ok(state.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_price() {
        let service = InMemoryGiftWrapService::new();
        let options = GiftOptions::new(serde_json::json!({ "paper": "red" }));

        let price = service.get_gift_wrap_price(&options).await.unwrap();
        assert_eq!(price.cents(), 500);
        assert_eq!(service.quote_count(), 1);
    }
}
