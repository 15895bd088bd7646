//! Shared value types for the fulfillment workspace.
//!
//! Identifiers, money and quantities are kept here so that the engine, its
//! collaborators and the HTTP layer all agree on one representation.

pub mod money;
pub mod quantity;
pub mod types;

pub use money::Money;
pub use quantity::{Quantity, QuantityError};
pub use types::{CustomerId, ProductId, TransactionId};
