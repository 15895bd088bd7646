//! Dependency wiring for [`OrderWorkflowEngine`].

use std::sync::Arc;

use crate::engine::OrderWorkflowEngine;
use crate::error::FulfillmentError;
use crate::pricing::DEFAULT_HOME_CURRENCY;
use crate::services::{
    AnalyticsTracker, AuditLogger, ComplianceChecker, CrmSystem, CurrencyConverter,
    DigitalAssetManager, FraudDetector, GiftWrapService, InventorySystem, LoyaltyProgram,
    NotificationService, PaymentGateway, ProductCatalog, PromoCodeValidator, ReturnAuthorizer,
    ShippingService, TaxCalculator,
};

/// Collects the seventeen collaborators before the engine is built.
///
/// [`EngineBuilder::build`] fails with [`FulfillmentError::Configuration`]
/// naming every collaborator that was not supplied.
#[derive(Default)]
pub struct EngineBuilder {
    product_catalog: Option<Arc<dyn ProductCatalog>>,
    inventory: Option<Arc<dyn InventorySystem>>,
    payment_gateway: Option<Arc<dyn PaymentGateway>>,
    promo_validator: Option<Arc<dyn PromoCodeValidator>>,
    notifications: Option<Arc<dyn NotificationService>>,
    shipping: Option<Arc<dyn ShippingService>>,
    audit_logger: Option<Arc<dyn AuditLogger>>,
    fraud_detector: Option<Arc<dyn FraudDetector>>,
    tax_calculator: Option<Arc<dyn TaxCalculator>>,
    loyalty: Option<Arc<dyn LoyaltyProgram>>,
    analytics: Option<Arc<dyn AnalyticsTracker>>,
    currency_converter: Option<Arc<dyn CurrencyConverter>>,
    crm: Option<Arc<dyn CrmSystem>>,
    gift_wrap: Option<Arc<dyn GiftWrapService>>,
    digital_assets: Option<Arc<dyn DigitalAssetManager>>,
    returns: Option<Arc<dyn ReturnAuthorizer>>,
    compliance: Option<Arc<dyn ComplianceChecker>>,
    home_currency: Option<String>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn product_catalog(mut self, service: Arc<dyn ProductCatalog>) -> Self {
        self.product_catalog = Some(service);
        self
    }

    pub fn inventory(mut self, service: Arc<dyn InventorySystem>) -> Self {
        self.inventory = Some(service);
        self
    }

    pub fn payment_gateway(mut self, service: Arc<dyn PaymentGateway>) -> Self {
        self.payment_gateway = Some(service);
        self
    }

    pub fn promo_validator(mut self, service: Arc<dyn PromoCodeValidator>) -> Self {
        self.promo_validator = Some(service);
        self
    }

    pub fn notifications(mut self, service: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(service);
        self
    }

    pub fn shipping(mut self, service: Arc<dyn ShippingService>) -> Self {
        self.shipping = Some(service);
        self
    }

    pub fn audit_logger(mut self, service: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = Some(service);
        self
    }

    pub fn fraud_detector(mut self, service: Arc<dyn FraudDetector>) -> Self {
        self.fraud_detector = Some(service);
        self
    }

    pub fn tax_calculator(mut self, service: Arc<dyn TaxCalculator>) -> Self {
        self.tax_calculator = Some(service);
        self
    }

    pub fn loyalty(mut self, service: Arc<dyn LoyaltyProgram>) -> Self {
        self.loyalty = Some(service);
        self
    }

    pub fn analytics(mut self, service: Arc<dyn AnalyticsTracker>) -> Self {
        self.analytics = Some(service);
        self
    }

    pub fn currency_converter(mut self, service: Arc<dyn CurrencyConverter>) -> Self {
        self.currency_converter = Some(service);
        self
    }

    pub fn crm(mut self, service: Arc<dyn CrmSystem>) -> Self {
        self.crm = Some(service);
        self
    }

    pub fn gift_wrap(mut self, service: Arc<dyn GiftWrapService>) -> Self {
        self.gift_wrap = Some(service);
        self
    }

    pub fn digital_assets(mut self, service: Arc<dyn DigitalAssetManager>) -> Self {
        self.digital_assets = Some(service);
        self
    }

    pub fn returns(mut self, service: Arc<dyn ReturnAuthorizer>) -> Self {
        self.returns = Some(service);
        self
    }

    pub fn compliance(mut self, service: Arc<dyn ComplianceChecker>) -> Self {
        self.compliance = Some(service);
        self
    }

    /// Currency in which catalog prices are expressed (default `EUR`).
    pub fn home_currency(mut self, currency: impl Into<String>) -> Self {
        self.home_currency = Some(currency.into());
        self
    }

    /// Names of the collaborators not supplied yet, in declaration order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("product_catalog", self.product_catalog.is_some()),
            ("inventory", self.inventory.is_some()),
            ("payment_gateway", self.payment_gateway.is_some()),
            ("promo_validator", self.promo_validator.is_some()),
            ("notifications", self.notifications.is_some()),
            ("shipping", self.shipping.is_some()),
            ("audit_logger", self.audit_logger.is_some()),
            ("fraud_detector", self.fraud_detector.is_some()),
            ("tax_calculator", self.tax_calculator.is_some()),
            ("loyalty", self.loyalty.is_some()),
            ("analytics", self.analytics.is_some()),
            ("currency_converter", self.currency_converter.is_some()),
            ("crm", self.crm.is_some()),
            ("gift_wrap", self.gift_wrap.is_some()),
            ("digital_assets", self.digital_assets.is_some()),
            ("returns", self.returns.is_some()),
            ("compliance", self.compliance.is_some()),
        ]
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
    }

    /// Builds the engine, or reports every missing collaborator at once.
    pub fn build(self) -> Result<OrderWorkflowEngine, FulfillmentError> {
        let missing = self.missing();
        let (
            Some(product_catalog),
            Some(inventory),
            Some(payment_gateway),
            Some(promo_validator),
            Some(notifications),
            Some(shipping),
            Some(audit_logger),
            Some(fraud_detector),
            Some(tax_calculator),
            Some(loyalty),
            Some(analytics),
            Some(currency_converter),
            Some(crm),
            Some(gift_wrap),
            Some(digital_assets),
            Some(returns),
            Some(compliance),
        ) = (
            self.product_catalog,
            self.inventory,
            self.payment_gateway,
            self.promo_validator,
            self.notifications,
            self.shipping,
            self.audit_logger,
            self.fraud_detector,
            self.tax_calculator,
            self.loyalty,
            self.analytics,
            self.currency_converter,
            self.crm,
            self.gift_wrap,
            self.digital_assets,
            self.returns,
            self.compliance,
        )
        else {
            return Err(FulfillmentError::Configuration(missing));
        };

        Ok(OrderWorkflowEngine {
            product_catalog,
            inventory,
            payment_gateway,
            promo_validator,
            notifications,
            shipping,
            audit_logger,
            fraud_detector,
            tax_calculator,
            loyalty,
            analytics,
            currency_converter,
            crm,
            gift_wrap,
            digital_assets,
            returns,
            compliance,
            home_currency: self
                .home_currency
                .unwrap_or_else(|| DEFAULT_HOME_CURRENCY.to_string()),
        })
    }
}
