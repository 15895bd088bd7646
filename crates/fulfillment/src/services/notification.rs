//! Notification service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId, Quantity, TransactionId};

use super::{read, write};
use crate::error::ServiceError;

/// Content of an order confirmation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub email: String,
    pub transaction_id: TransactionId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub total_paid: Money,
}

/// Trait for customer notifications (email, SMS).
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<OrderConfirmation>,
    fail_on_send: bool,
}

/// In-memory notification service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every send to fail.
    pub fn set_fail_on_send(&self, fail: bool) {
        write(&self.state).fail_on_send = fail;
    }

    /// Confirmations sent so far, in order.
    pub fn sent(&self) -> Vec<OrderConfirmation> {
        read(&self.state).sent.clone()
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send_order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), ServiceError> {
        let mut state = write(&self.state);
        if state.fail_on_send {
            return Err(ServiceError::Unavailable("SMTP server down".to_string()));
        }
        state.sent.push(confirmation.clone());
        Ok(())
    }
}
