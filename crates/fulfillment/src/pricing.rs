//! Pure pricing rules shared by the order, quote and helper operations.

use common::{Money, Quantity};

use crate::error::FulfillmentError;
use crate::model::ProductDetails;

/// Home currency used when the engine is not configured otherwise.
pub const DEFAULT_HOME_CURRENCY: &str = "EUR";

/// Unit price times quantity; a product without a price costs nothing.
///
/// `None` when the amount does not fit in cents.
pub fn base_price(product: &ProductDetails, quantity: Quantity) -> Option<Money> {
    product.unit_price().multiply(quantity.get())
}

/// Amount charged for a physical order, or `None` on overflow.
pub fn order_total(subtotal: Money, gift_cost: Money, tax: Money) -> Option<Money> {
    subtotal.checked_add(gift_cost)?.checked_add(tax)
}

/// Checks that a discount lies in (0, 100].
pub fn validate_discount_percentage(percentage: f64) -> Result<f64, FulfillmentError> {
    if percentage > 0.0 && percentage <= 100.0 {
        Ok(percentage)
    } else {
        Err(FulfillmentError::InvalidArgument(format!(
            "discount percentage must be greater than 0 and at most 100, got {percentage}"
        )))
    }
}

/// Price after a percentage discount, rounded to the cent.
pub fn discounted_price(price: Money, percentage: f64) -> Money {
    price.percent_off(percentage)
}

/// Price converted at `rate`, rounded to the cent.
pub fn convert(price: Money, rate: f64) -> Money {
    price.scale(rate)
}

/// Case-insensitive match against the engine's home currency.
pub fn is_home_currency(home: &str, currency: &str) -> bool {
    home.eq_ignore_ascii_case(currency.trim())
}
