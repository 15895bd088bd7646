//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, TransactionId};

use super::{read, write};
use crate::error::ServiceError;
use crate::model::CardDetails;

/// Answer of the gateway to a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentResult {
    /// The charge went through.
    Approved { transaction_id: TransactionId },
    /// The charge was refused, optionally with the gateway's explanation.
    Declined { message: Option<String> },
}

/// Answer of the gateway to a refund.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundResult {
    Approved,
    Declined { message: Option<String> },
}

/// Trait for payment capture and refunds.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges `amount` to the given card.
    async fn process_payment(
        &self,
        amount: Money,
        card: &CardDetails,
    ) -> Result<PaymentResult, ServiceError>;

    /// Refunds `amount` against an earlier transaction.
    async fn process_refund(
        &self,
        amount: Money,
        transaction_id: &TransactionId,
    ) -> Result<RefundResult, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    charges: HashMap<TransactionId, Money>,
    refunds: Vec<(TransactionId, Money)>,
    next_id: u32,
    decline_charges: bool,
    decline_refunds: bool,
    fail_on_charge: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory payment gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline charges.
    pub fn set_decline_charges(&self, decline: bool) {
        write(&self.state).decline_charges = decline;
    }

    /// Configures the gateway to decline refunds.
    pub fn set_decline_refunds(&self, decline: bool) {
        write(&self.state).decline_refunds = decline;
    }

    /// Configures the gateway to fault on charge calls.
    pub fn set_fail_on_charge(&self, fail: bool) {
        write(&self.state).fail_on_charge = fail;
    }

    /// Returns the number of captured charges.
    pub fn charge_count(&self) -> usize {
        read(&self.state).charges.len()
    }

    /// Returns the amount captured for a transaction.
    pub fn charged(&self, transaction_id: &TransactionId) -> Option<Money> {
        read(&self.state).charges.get(transaction_id).copied()
    }

    /// Returns every refund granted, in order.
    pub fn refunds(&self) -> Vec<(TransactionId, Money)> {
        read(&self.state).refunds.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn process_payment(
        &self,
        amount: Money,
        _card: &CardDetails,
    ) -> Result<PaymentResult, ServiceError> {
        let mut state = write(&self.state);

        if state.fail_on_charge {
            return Err(ServiceError::Timeout("payment gateway".to_string()));
        }
        if state.decline_charges {
            return Ok(PaymentResult::Declined {
                message: Some("Card declined".to_string()),
            });
        }

        state.next_id += 1;
        let transaction_id = TransactionId::new(format!("TXN-{:04}", state.next_id));
        state.charges.insert(transaction_id.clone(), amount);

        Ok(PaymentResult::Approved { transaction_id })
    }

    async fn process_refund(
        &self,
        amount: Money,
        transaction_id: &TransactionId,
    ) -> Result<RefundResult, ServiceError> {
        let mut state = write(&self.state);

        if state.decline_refunds {
            return Ok(RefundResult::Declined {
                message: Some("Refund refused".to_string()),
            });
        }

        state.refunds.push((transaction_id.clone(), amount));
        Ok(RefundResult::Approved)
    }
}
