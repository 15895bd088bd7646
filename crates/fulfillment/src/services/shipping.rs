//! Shipping service trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{ProductId, Quantity};

use super::{read, write};
use crate::error::ServiceError;
use crate::model::Address;

/// A shipment handed to the carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentRequest {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub address: Address,
}

/// Trait for shipment scheduling.
#[async_trait]
pub trait ShippingService: Send + Sync {
    /// Schedules delivery of `quantity` units to `address`.
    async fn schedule_shipment(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
        address: &Address,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryShippingState {
    shipments: Vec<ShipmentRequest>,
    fail_on_schedule: bool,
}

/// In-memory shipping service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShippingService {
    state: Arc<RwLock<InMemoryShippingState>>,
}

impl InMemoryShippingService {
    /// Creates a new in-memory shipping service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every schedule call to fail.
    pub fn set_fail_on_schedule(&self, fail: bool) {
        write(&self.state).fail_on_schedule = fail;
    }

    /// Returns the number of scheduled shipments.
    pub fn shipment_count(&self) -> usize {
        read(&self.state).shipments.len()
    }

    /// Returns every scheduled shipment, in order.
    pub fn shipments(&self) -> Vec<ShipmentRequest> {
        read(&self.state).shipments.clone()
    }
}

#[async_trait]
impl ShippingService for InMemoryShippingService {
    async fn schedule_shipment(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
        address: &Address,
    ) -> Result<(), ServiceError> {
        let mut state = write(&self.state);

        if state.fail_on_schedule {
            return Err(ServiceError::Unavailable("carrier API down".to_string()));
        }

        state.shipments.push(ShipmentRequest {
            product_id: product_id.clone(),
            quantity,
            address: address.clone(),
        });
        Ok(())
    }
}
