//! Return authorization (RMA) trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ProductId, TransactionId};
use serde::{Deserialize, Serialize};

use super::{read, write};
use crate::error::ServiceError;

/// Identifier of an opened return authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnTicket(String);

impl ReturnTicket {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReturnTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for return-authorization ticketing.
#[async_trait]
pub trait ReturnAuthorizer: Send + Sync {
    async fn create_rma_ticket(
        &self,
        product_id: &ProductId,
        transaction_id: &TransactionId,
    ) -> Result<ReturnTicket, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryReturnState {
    tickets: Vec<(ReturnTicket, ProductId, TransactionId)>,
    next_id: u32,
}

/// In-memory RMA desk issuing sequential `RMA-nnnn` tickets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReturnAuthorizer {
    state: Arc<RwLock<InMemoryReturnState>>,
}

impl InMemoryReturnAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tickets opened.
    pub fn ticket_count(&self) -> usize {
        read(&self.state).tickets.len()
    }
}

#[async_trait]
impl ReturnAuthorizer for InMemoryReturnAuthorizer {
    async fn create_rma_ticket(
        &self,
        product_id: &ProductId,
        transaction_id: &TransactionId,
    ) -> Result<ReturnTicket, ServiceError> {
        let mut state = write(&self.state);
        state.next_id += 1;
        let ticket = ReturnTicket::new(format!("RMA-{:04}", state.next_id));
        state
            .tickets
            .push((ticket.clone(), product_id.clone(), transaction_id.clone()));
        Ok(ticket)
    }
}
