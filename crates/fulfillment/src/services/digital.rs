//! Digital asset manager trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{CustomerId, ProductId};
use uuid::Uuid;

use super::{read, write};
use crate::error::ServiceError;

/// Trait for issuing download links.
#[async_trait]
pub trait DigitalAssetManager: Send + Sync {
    async fn generate_download_link(
        &self,
        product_id: &ProductId,
        customer_id: &CustomerId,
    ) -> Result<String, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryDigitalState {
    issued: Vec<(ProductId, CustomerId, String)>,
}

/// In-memory link issuer producing `https://my.store/download/{product}/{uuid}`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDigitalAssetManager {
    state: Arc<RwLock<InMemoryDigitalState>>,
}

impl InMemoryDigitalAssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of links issued.
    pub fn issued_count(&self) -> usize {
        read(&self.state).issued.len()
    }
}

#[async_trait]
impl DigitalAssetManager for InMemoryDigitalAssetManager {
    async fn generate_download_link(
        &self,
        product_id: &ProductId,
        customer_id: &CustomerId,
    ) -> Result<String, ServiceError> {
        let link = format!("https://my.store/download/{product_id}/{}", Uuid::new_v4());
        write(&self.state)
            .issued
            .push((product_id.clone(), customer_id.clone(), link.clone()));
        Ok(link)
    }
}
