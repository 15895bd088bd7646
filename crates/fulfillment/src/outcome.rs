//! Business outcomes returned by the engine.
//!
//! Expected rejections travel as [`Outcome::Failure`] values; only faults use
//! the `Err` side of the engine's results.

use common::{Money, TransactionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::ReturnTicket;

/// A named, expected rejection of a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Quantity must be a positive integer")]
    InvalidQuantity,

    #[error("Refund quantity must be positive")]
    InvalidRefundQuantity,

    #[error("Product not found")]
    ProductNotFound,

    #[error("Order blocked on suspected fraud")]
    FraudDetected,

    #[error("Product cannot be shipped to this address due to regulatory restrictions")]
    RegulatoryRestriction,

    #[error("Requested quantity is not available")]
    StockNotAvailable,

    #[error("Invalid or zero price")]
    InvalidPrice,

    #[error("Tax calculation error: {0}")]
    TaxCalculation(String),

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Payment declined")]
    PaymentDeclined,

    #[error("Refund failed")]
    RefundFailed,

    #[error("Invalid or expired promo code")]
    InvalidPromoCode,

    #[error("Not a digital product")]
    NotDigital,

    #[error("Product is not returnable")]
    NotReturnable,
}

impl Rejection {
    /// The `reason` tag recorded in the audit trail.
    pub fn audit_reason(&self) -> &'static str {
        match self {
            Rejection::InvalidQuantity | Rejection::InvalidRefundQuantity => "Invalid quantity",
            Rejection::ProductNotFound => "Product not found",
            Rejection::FraudDetected => "Fraud detected",
            Rejection::RegulatoryRestriction => "Compliance check failed",
            Rejection::StockNotAvailable => "Stock not available",
            Rejection::InvalidPrice => "Invalid price",
            Rejection::TaxCalculation(_) => "Tax calculation error",
            Rejection::PaymentGateway(_) => "Payment gateway exception",
            Rejection::PaymentDeclined => "Payment failed",
            Rejection::RefundFailed => "Gateway refund failed",
            Rejection::InvalidPromoCode => "Invalid promo code",
            Rejection::NotDigital => "Not a digital product",
            Rejection::NotReturnable => "Not returnable",
        }
    }

    /// Stable machine-readable code, used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::InvalidQuantity => "invalid_quantity",
            Rejection::InvalidRefundQuantity => "invalid_refund_quantity",
            Rejection::ProductNotFound => "product_not_found",
            Rejection::FraudDetected => "fraud_detected",
            Rejection::RegulatoryRestriction => "regulatory_restriction",
            Rejection::StockNotAvailable => "stock_not_available",
            Rejection::InvalidPrice => "invalid_price",
            Rejection::TaxCalculation(_) => "tax_calculation_error",
            Rejection::PaymentGateway(_) => "payment_gateway_error",
            Rejection::PaymentDeclined => "payment_declined",
            Rejection::RefundFailed => "refund_failed",
            Rejection::InvalidPromoCode => "invalid_promo_code",
            Rejection::NotDigital => "not_digital",
            Rejection::NotReturnable => "not_returnable",
        }
    }
}

/// Result of a business operation: the payload, or the reason it was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(Rejection),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(r) => Some(r),
        }
    }

    /// Returns the success payload, if any.
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(v) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    /// Human-readable message for a failure.
    pub fn message(&self) -> Option<String> {
        self.rejection().map(ToString::to_string)
    }

    /// Short label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::Failure(_) => "failure",
        }
    }
}

impl<T> From<Rejection> for Outcome<T> {
    fn from(rejection: Rejection) -> Self {
        Outcome::Failure(rejection)
    }
}

/// Payload of a completed physical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub transaction_id: TransactionId,
    pub total_paid: Money,
}

/// Payload of a completed refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReceipt {
    pub transaction_id: TransactionId,
    pub amount: Money,
}

/// Payload of a completed digital purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalDelivery {
    pub transaction_id: TransactionId,
    pub download_link: String,
}

pub type OrderOutcome = Outcome<OrderReceipt>;
pub type RefundOutcome = Outcome<RefundReceipt>;
/// Discounted unit price on success.
pub type QuoteOutcome = Outcome<Money>;
pub type DigitalOrderOutcome = Outcome<DigitalDelivery>;
pub type ReturnOutcome = Outcome<ReturnTicket>;
