//! Collaborator traits and in-memory implementations.
//!
//! The engine depends only on the traits. The in-memory implementations back
//! tests, benchmarks and the demo HTTP server.

pub mod analytics;
pub mod audit;
pub mod catalog;
pub mod crm;
pub mod currency;
pub mod digital;
pub mod gift;
pub mod inventory;
pub mod loyalty;
pub mod notification;
pub mod payment;
pub mod promo;
pub mod returns;
pub mod risk;
pub mod shipping;
pub mod tax;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use analytics::{AnalyticsTracker, InMemoryAnalyticsTracker, SaleRecord};
pub use audit::{AuditEvent, AuditEventKind, AuditLogger, InMemoryAuditLogger};
pub use catalog::{InMemoryProductCatalog, ProductCatalog};
pub use crm::{CrmSystem, HistoryEntry, InMemoryCrmSystem};
pub use currency::{CurrencyConverter, InMemoryCurrencyConverter};
pub use digital::{DigitalAssetManager, InMemoryDigitalAssetManager};
pub use gift::{GiftWrapService, InMemoryGiftWrapService};
pub use inventory::{InMemoryInventorySystem, InventorySystem};
pub use loyalty::{InMemoryLoyaltyProgram, LoyaltyProgram};
pub use notification::{InMemoryNotificationService, NotificationService, OrderConfirmation};
pub use payment::{InMemoryPaymentGateway, PaymentGateway, PaymentResult, RefundResult};
pub use promo::{InMemoryPromoCodeValidator, PromoCodeValidator, PromoValidation};
pub use returns::{InMemoryReturnAuthorizer, ReturnAuthorizer, ReturnTicket};
pub use risk::{ComplianceChecker, FraudDetector, InMemoryComplianceChecker, InMemoryFraudDetector};
pub use shipping::{InMemoryShippingService, ShipmentRequest, ShippingService};
pub use tax::{InMemoryTaxCalculator, TaxCalculator};

// The in-memory state is plain data, so a panic mid-update leaves nothing
// half-applied that a later reader could trip over.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
