//! Request and product shapes the engine works with.

use common::{CustomerId, Money, ProductId};
use serde::{Deserialize, Serialize};

/// Catalog snapshot of a product, fetched fresh on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// The product identifier.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Unit price, `None` when the catalog entry carries no price.
    pub price: Option<Money>,

    /// Delivered as a download rather than shipped.
    #[serde(default)]
    pub is_digital: bool,

    /// Eligible for a return authorization.
    #[serde(default)]
    pub is_returnable: bool,
}

impl ProductDetails {
    /// Creates a priced, physical, non-returnable product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: Some(price),
            is_digital: false,
            is_returnable: false,
        }
    }

    /// Removes the price from the snapshot.
    pub fn without_price(mut self) -> Self {
        self.price = None;
        self
    }

    /// Marks the product as a digital download.
    pub fn digital(mut self) -> Self {
        self.is_digital = true;
        self
    }

    /// Marks the product as returnable.
    pub fn returnable(mut self) -> Self {
        self.is_returnable = true;
        self
    }

    /// Returns the unit price, treating a missing price as zero.
    pub fn unit_price(&self) -> Money {
        self.price.unwrap_or_default()
    }
}

/// A shipping destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The buyer, as supplied with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub id: CustomerId,
    pub email: String,
    pub address: Address,
}

impl CustomerInfo {
    pub fn new(
        id: impl Into<CustomerId>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            address: Address::new(address),
        }
    }
}

/// Opaque payment credential, handed to the gateway untouched.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardDetails(String);

impl CardDetails {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CardDetails(<redacted>)")
    }
}

/// Opaque gift-wrap choices; only the gift-wrap service interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftOptions(serde_json::Value);

impl GiftOptions {
    pub fn new(options: serde_json::Value) -> Self {
        Self(options)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Input to [`crate::OrderWorkflowEngine::process_order`].
///
/// `quantity` is the raw caller value; the engine validates it.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub product_id: ProductId,
    pub quantity: i64,
    pub card: CardDetails,
    pub customer: CustomerInfo,
    pub gift_options: Option<GiftOptions>,
}

impl OrderRequest {
    /// Creates a request without gift options.
    pub fn new(
        product_id: impl Into<ProductId>,
        quantity: i64,
        card: CardDetails,
        customer: CustomerInfo,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            card,
            customer,
            gift_options: None,
        }
    }

    /// Attaches gift-wrap options to the request.
    pub fn with_gift_options(mut self, options: GiftOptions) -> Self {
        self.gift_options = Some(options);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_details_debug_is_redacted() {
        let card = CardDetails::new("4111-1111-1111-1111");
        let debug = format!("{card:?}");
        assert!(!debug.contains("4111"));
        assert_eq!(card.expose(), "4111-1111-1111-1111");
    }

    #[test]
    fn test_missing_price_counts_as_zero() {
        let product = ProductDetails::new("SKU-001", "Widget", Money::from_cents(1000)).without_price();
        assert!(product.price.is_none());
        assert!(product.unit_price().is_zero());
    }

    #[test]
    fn test_product_flags_default_to_false_when_deserialized() {
        let product: ProductDetails = serde_json::from_value(serde_json::json!({
            "id": "SKU-001",
            "name": "Widget",
            "price": { "cents": 2550 }
        }))
        .unwrap();
        assert!(!product.is_digital);
        assert!(!product.is_returnable);
        assert_eq!(product.unit_price().cents(), 2550);
    }
}
