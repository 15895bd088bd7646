//! Fraud screening and shipment compliance traits with in-memory
//! implementations.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerId, ProductId};

use super::{read, write};
use crate::error::ServiceError;
use crate::model::{Address, CardDetails, CustomerInfo};

/// Trait for fraud scoring.
#[async_trait]
pub trait FraudDetector: Send + Sync {
    async fn is_fraudulent(
        &self,
        customer: &CustomerInfo,
        card: &CardDetails,
    ) -> Result<bool, ServiceError>;
}

/// Trait for regulatory shipment checks.
#[async_trait]
pub trait ComplianceChecker: Send + Sync {
    /// Returns true if the product may be shipped to the address.
    async fn verify_shipment(
        &self,
        product_id: &ProductId,
        address: &Address,
    ) -> Result<bool, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryFraudState {
    flagged: HashSet<CustomerId>,
    screenings: u32,
}

/// In-memory fraud detector; customers are clean unless flagged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFraudDetector {
    state: Arc<RwLock<InMemoryFraudState>>,
}

impl InMemoryFraudDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every order from this customer as fraudulent.
    pub fn flag_customer(&self, customer_id: impl Into<CustomerId>) {
        write(&self.state).flagged.insert(customer_id.into());
    }

    /// Number of screenings performed.
    pub fn screening_count(&self) -> u32 {
        read(&self.state).screenings
    }
}

#[async_trait]
impl FraudDetector for InMemoryFraudDetector {
    async fn is_fraudulent(
        &self,
        customer: &CustomerInfo,
        _card: &CardDetails,
    ) -> Result<bool, ServiceError> {
        let mut state = write(&self.state);
        state.screenings += 1;
        Ok(state.flagged.contains(&customer.id))
    }
}

#[derive(Debug, Default)]
struct InMemoryComplianceState {
    blocked: HashSet<(ProductId, Address)>,
    blocked_addresses: HashSet<Address>,
}

/// In-memory compliance checker; everything ships unless blocked.
#[derive(Debug, Clone, Default)]
pub struct InMemoryComplianceChecker {
    state: Arc<RwLock<InMemoryComplianceState>>,
}

impl InMemoryComplianceChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbids shipping any product to the address.
    pub fn block_address(&self, address: impl Into<String>) {
        write(&self.state)
            .blocked_addresses
            .insert(Address::new(address));
    }

    /// Forbids shipping one product to the address.
    pub fn block(&self, product_id: impl Into<ProductId>, address: impl Into<String>) {
        write(&self.state)
            .blocked
            .insert((product_id.into(), Address::new(address)));
    }
}

#[async_trait]
impl ComplianceChecker for InMemoryComplianceChecker {
    async fn verify_shipment(
        &self,
        product_id: &ProductId,
        address: &Address,
    ) -> Result<bool, ServiceError> {
        let state = read(&self.state);
        let blocked = state.blocked_addresses.contains(address)
            || state
                .blocked
                .contains(&(product_id.clone(), address.clone()));
        Ok(!blocked)
    }
}
