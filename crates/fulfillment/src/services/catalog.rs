//! Product catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId, Quantity};

use super::{read, write};
use crate::error::ServiceError;
use crate::model::ProductDetails;

/// Trait for product lookup, availability and price maintenance.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the current snapshot of a product, if it exists.
    async fn get_product_details(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductDetails>, ServiceError>;

    /// Returns true if `quantity` units can be sold right now.
    async fn check_product_availability(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<bool, ServiceError>;

    /// Replaces the unit price of a product.
    async fn update_product_price(
        &self,
        product_id: &ProductId,
        new_price: Money,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, ProductDetails>,
    stock: HashMap<ProductId, u32>,
    lookups: u32,
    fail_on_lookup: bool,
}

/// In-memory product catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a product together with its sellable stock.
    pub fn add_product(&self, product: ProductDetails, stock: u32) {
        let mut state = write(&self.state);
        state.stock.insert(product.id.clone(), stock);
        state.products.insert(product.id.clone(), product);
    }

    /// Sets the sellable stock for a product.
    pub fn set_stock(&self, product_id: &ProductId, stock: u32) {
        write(&self.state).stock.insert(product_id.clone(), stock);
    }

    /// Configures every lookup to fail.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        write(&self.state).fail_on_lookup = fail;
    }

    /// Returns the current unit price of a product.
    pub fn price_of(&self, product_id: &ProductId) -> Option<Money> {
        read(&self.state)
            .products
            .get(product_id)
            .and_then(|p| p.price)
    }

    /// Number of product lookups served.
    pub fn lookup_count(&self) -> u32 {
        read(&self.state).lookups
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get_product_details(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductDetails>, ServiceError> {
        let mut state = write(&self.state);
        if state.fail_on_lookup {
            return Err(ServiceError::Unavailable("catalog offline".to_string()));
        }
        state.lookups += 1;
        Ok(state.products.get(product_id).cloned())
    }

    async fn check_product_availability(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<bool, ServiceError> {
        let state = read(&self.state);
        let available = state.stock.get(product_id).copied().unwrap_or(0);
        Ok(available >= quantity.get())
    }

    async fn update_product_price(
        &self,
        product_id: &ProductId,
        new_price: Money,
    ) -> Result<(), ServiceError> {
        let mut state = write(&self.state);
        match state.products.get_mut(product_id) {
            Some(product) => {
                product.price = Some(new_price);
                Ok(())
            }
            None => Err(ServiceError::Internal(format!(
                "unknown product {product_id}"
            ))),
        }
    }
}
