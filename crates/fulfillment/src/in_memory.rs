//! A complete set of in-memory collaborators.
//!
//! Each field is a cheap handle sharing state with the copy handed to the
//! engine, so a test can wire an engine and still inspect every stub.

use std::sync::Arc;

use crate::builder::EngineBuilder;
use crate::engine::OrderWorkflowEngine;
use crate::error::Result;
use crate::services::{
    InMemoryAnalyticsTracker, InMemoryAuditLogger, InMemoryComplianceChecker,
    InMemoryCrmSystem, InMemoryCurrencyConverter, InMemoryDigitalAssetManager,
    InMemoryFraudDetector, InMemoryGiftWrapService, InMemoryInventorySystem,
    InMemoryLoyaltyProgram, InMemoryNotificationService, InMemoryPaymentGateway,
    InMemoryProductCatalog, InMemoryPromoCodeValidator, InMemoryReturnAuthorizer,
    InMemoryShippingService, InMemoryTaxCalculator,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCollaborators {
    pub catalog: InMemoryProductCatalog,
    pub inventory: InMemoryInventorySystem,
    pub payment: InMemoryPaymentGateway,
    pub promo: InMemoryPromoCodeValidator,
    pub notifications: InMemoryNotificationService,
    pub shipping: InMemoryShippingService,
    pub audit: InMemoryAuditLogger,
    pub fraud: InMemoryFraudDetector,
    pub tax: InMemoryTaxCalculator,
    pub loyalty: InMemoryLoyaltyProgram,
    pub analytics: InMemoryAnalyticsTracker,
    pub currency: InMemoryCurrencyConverter,
    pub crm: InMemoryCrmSystem,
    pub gift_wrap: InMemoryGiftWrapService,
    pub digital: InMemoryDigitalAssetManager,
    pub returns: InMemoryReturnAuthorizer,
    pub compliance: InMemoryComplianceChecker,
}

impl InMemoryCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder with every collaborator slot filled from this set.
    pub fn engine_builder(&self) -> EngineBuilder {
        OrderWorkflowEngine::builder()
            .product_catalog(Arc::new(self.catalog.clone()))
            .inventory(Arc::new(self.inventory.clone()))
            .payment_gateway(Arc::new(self.payment.clone()))
            .promo_validator(Arc::new(self.promo.clone()))
            .notifications(Arc::new(self.notifications.clone()))
            .shipping(Arc::new(self.shipping.clone()))
            .audit_logger(Arc::new(self.audit.clone()))
            .fraud_detector(Arc::new(self.fraud.clone()))
            .tax_calculator(Arc::new(self.tax.clone()))
            .loyalty(Arc::new(self.loyalty.clone()))
            .analytics(Arc::new(self.analytics.clone()))
            .currency_converter(Arc::new(self.currency.clone()))
            .crm(Arc::new(self.crm.clone()))
            .gift_wrap(Arc::new(self.gift_wrap.clone()))
            .digital_assets(Arc::new(self.digital.clone()))
            .returns(Arc::new(self.returns.clone()))
            .compliance(Arc::new(self.compliance.clone()))
    }

    pub fn engine(&self) -> Result<OrderWorkflowEngine> {
        self.engine_builder().build()
    }
}
