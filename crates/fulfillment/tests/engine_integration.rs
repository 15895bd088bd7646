//! Integration tests for the order workflow engine.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{CustomerId, Money, ProductId, Quantity, TransactionId};
use fulfillment::services::{
    AnalyticsTracker, AuditEvent, AuditEventKind, AuditLogger, ComplianceChecker, CrmSystem,
    FraudDetector, GiftWrapService, InventorySystem, LoyaltyProgram, NotificationService,
    OrderConfirmation, PaymentGateway, PaymentResult, ProductCatalog, PromoValidation,
    RefundResult, ShippingService, TaxCalculator,
};
use fulfillment::{
    Address, CardDetails, CustomerInfo, FulfillmentError, GiftOptions, InMemoryCollaborators,
    ORDER_PIPELINE, OrderRequest, OrderStep, OrderWorkflowEngine, ProductDetails, Rejection,
    ServiceError,
};
use serde_json::json;

/// Shared log of collaborator calls, in the order they happened.
#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn record(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }

    fn contains(&self, call: &str) -> bool {
        self.calls().contains(&call)
    }
}

/// Wraps an in-memory collaborator and journals each call before delegating.
struct Recording<T> {
    inner: T,
    journal: Journal,
}

impl<T> Recording<T> {
    fn wrap(inner: T, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            inner,
            journal: journal.clone(),
        })
    }
}

#[async_trait]
impl<T: ProductCatalog> ProductCatalog for Recording<T> {
    async fn get_product_details(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductDetails>, ServiceError> {
        self.journal.record("catalog.lookup");
        self.inner.get_product_details(product_id).await
    }

    async fn check_product_availability(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<bool, ServiceError> {
        self.journal.record("catalog.availability");
        self.inner
            .check_product_availability(product_id, quantity)
            .await
    }

    async fn update_product_price(
        &self,
        product_id: &ProductId,
        new_price: Money,
    ) -> Result<(), ServiceError> {
        self.journal.record("catalog.price");
        self.inner.update_product_price(product_id, new_price).await
    }
}

#[async_trait]
impl<T: FraudDetector> FraudDetector for Recording<T> {
    async fn is_fraudulent(
        &self,
        customer: &CustomerInfo,
        card: &CardDetails,
    ) -> Result<bool, ServiceError> {
        self.journal.record("fraud");
        self.inner.is_fraudulent(customer, card).await
    }
}

#[async_trait]
impl<T: ComplianceChecker> ComplianceChecker for Recording<T> {
    async fn verify_shipment(
        &self,
        product_id: &ProductId,
        address: &Address,
    ) -> Result<bool, ServiceError> {
        self.journal.record("compliance");
        self.inner.verify_shipment(product_id, address).await
    }
}

#[async_trait]
impl<T: GiftWrapService> GiftWrapService for Recording<T> {
    async fn get_gift_wrap_price(&self, options: &GiftOptions) -> Result<Money, ServiceError> {
        self.journal.record("gift_wrap");
        self.inner.get_gift_wrap_price(options).await
    }
}

#[async_trait]
impl<T: TaxCalculator> TaxCalculator for Recording<T> {
    async fn calculate_tax(&self, amount: Money, address: &Address) -> Result<Money, ServiceError> {
        self.journal.record("tax");
        self.inner.calculate_tax(amount, address).await
    }
}

#[async_trait]
impl<T: PaymentGateway> PaymentGateway for Recording<T> {
    async fn process_payment(
        &self,
        amount: Money,
        card: &CardDetails,
    ) -> Result<PaymentResult, ServiceError> {
        self.journal.record("payment.charge");
        self.inner.process_payment(amount, card).await
    }

    async fn process_refund(
        &self,
        amount: Money,
        transaction_id: &TransactionId,
    ) -> Result<RefundResult, ServiceError> {
        self.journal.record("payment.refund");
        self.inner.process_refund(amount, transaction_id).await
    }
}

#[async_trait]
impl<T: InventorySystem> InventorySystem for Recording<T> {
    async fn update_stock(&self, product_id: &ProductId, delta: i64) -> Result<(), ServiceError> {
        self.journal.record("inventory");
        self.inner.update_stock(product_id, delta).await
    }
}

#[async_trait]
impl<T: ShippingService> ShippingService for Recording<T> {
    async fn schedule_shipment(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
        address: &Address,
    ) -> Result<(), ServiceError> {
        self.journal.record("shipping");
        self.inner
            .schedule_shipment(product_id, quantity, address)
            .await
    }
}

#[async_trait]
impl<T: NotificationService> NotificationService for Recording<T> {
    async fn send_order_confirmation(
        &self,
        confirmation: &OrderConfirmation,
    ) -> Result<(), ServiceError> {
        self.journal.record("notification");
        self.inner.send_order_confirmation(confirmation).await
    }
}

#[async_trait]
impl<T: CrmSystem> CrmSystem for Recording<T> {
    async fn update_customer_history(
        &self,
        customer_id: &CustomerId,
        transaction_id: &TransactionId,
        amount: Money,
    ) -> Result<(), ServiceError> {
        self.journal.record("crm");
        self.inner
            .update_customer_history(customer_id, transaction_id, amount)
            .await
    }
}

#[async_trait]
impl<T: LoyaltyProgram> LoyaltyProgram for Recording<T> {
    async fn award_points(&self, customer_id: &CustomerId, amount: Money) -> Result<(), ServiceError> {
        self.journal.record("loyalty");
        self.inner.award_points(customer_id, amount).await
    }
}

#[async_trait]
impl<T: AnalyticsTracker> AnalyticsTracker for Recording<T> {
    async fn track_sale(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
        amount: Money,
    ) -> Result<(), ServiceError> {
        self.journal.record("analytics");
        self.inner.track_sale(product_id, quantity, amount).await
    }
}

#[async_trait]
impl<T: AuditLogger> AuditLogger for Recording<T> {
    async fn log_event(&self, event: AuditEvent) -> Result<(), ServiceError> {
        self.journal.record("audit");
        self.inner.log_event(event).await
    }
}

struct TestHarness {
    engine: OrderWorkflowEngine,
    services: InMemoryCollaborators,
    journal: Journal,
}

impl TestHarness {
    fn new() -> Self {
        let services = InMemoryCollaborators::new();
        services.catalog.add_product(
            ProductDetails::new("LAPTOP", "Laptop", Money::from_cents(100_000)),
            10,
        );
        services.catalog.add_product(
            ProductDetails::new("SHIRT", "Shirt", Money::from_cents(20_000)).returnable(),
            50,
        );
        services.catalog.add_product(
            ProductDetails::new("MUG", "Mug", Money::from_cents(9_999)),
            100,
        );
        services.catalog.add_product(
            ProductDetails::new("EBOOK", "E-book", Money::from_cents(1_500)).digital(),
            0,
        );
        services.catalog.add_product(
            ProductDetails::new("FREEBIE", "Sticker", Money::zero()),
            100,
        );
        services.catalog.add_product(
            ProductDetails::new("UNPRICED", "Prototype", Money::zero()).without_price(),
            100,
        );
        services.catalog.add_product(
            ProductDetails::new("YACHT", "Yacht", Money::from_cents(5_000_000_000)),
            u32::MAX,
        );
        services
            .promo
            .add_code("SAVE15", PromoValidation::valid(15.0));
        services.promo.add_code(
            "BARE",
            PromoValidation {
                is_valid: true,
                discount_percentage: None,
            },
        );
        services.promo.add_code("EXPIRED", PromoValidation::invalid());

        let journal = Journal::default();
        let engine = services
            .engine_builder()
            .product_catalog(Recording::wrap(services.catalog.clone(), &journal))
            .fraud_detector(Recording::wrap(services.fraud.clone(), &journal))
            .compliance(Recording::wrap(services.compliance.clone(), &journal))
            .gift_wrap(Recording::wrap(services.gift_wrap.clone(), &journal))
            .tax_calculator(Recording::wrap(services.tax.clone(), &journal))
            .payment_gateway(Recording::wrap(services.payment.clone(), &journal))
            .inventory(Recording::wrap(services.inventory.clone(), &journal))
            .shipping(Recording::wrap(services.shipping.clone(), &journal))
            .notifications(Recording::wrap(services.notifications.clone(), &journal))
            .crm(Recording::wrap(services.crm.clone(), &journal))
            .loyalty(Recording::wrap(services.loyalty.clone(), &journal))
            .analytics(Recording::wrap(services.analytics.clone(), &journal))
            .audit_logger(Recording::wrap(services.audit.clone(), &journal))
            .build()
            .unwrap();

        Self {
            engine,
            services,
            journal,
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo::new("CUST001", "alice@example.com", "1 Main St, Rome")
    }

    fn order(product: &str, quantity: i64) -> OrderRequest {
        OrderRequest::new(product, quantity, CardDetails::new("4111-1111"), Self::customer())
    }

    fn assert_no_fan_out(&self) {
        for call in [
            "inventory",
            "shipping",
            "notification",
            "crm",
            "loyalty",
            "analytics",
        ] {
            assert!(!self.journal.contains(call), "{call} was invoked");
        }
    }
}

// Order pipeline

#[tokio::test]
async fn test_successful_order_runs_every_step_in_order() {
    let h = TestHarness::new();

    let outcome = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 2))
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(
        h.journal.calls(),
        vec![
            "audit",
            "catalog.lookup",
            "fraud",
            "compliance",
            "catalog.availability",
            "tax",
            "payment.charge",
            "inventory",
            "shipping",
            "notification",
            "crm",
            "loyalty",
            "analytics",
            "audit",
        ]
    );
}

/// Collaborator call each pipeline step makes, if any.
fn journal_entry(step: OrderStep) -> Option<&'static str> {
    match step {
        OrderStep::RecordStart | OrderStep::RecordSuccess => Some("audit"),
        OrderStep::ValidateQuantity | OrderStep::PriceBase => None,
        OrderStep::LookupProduct => Some("catalog.lookup"),
        OrderStep::ScreenFraud => Some("fraud"),
        OrderStep::CheckCompliance => Some("compliance"),
        OrderStep::CheckAvailability => Some("catalog.availability"),
        OrderStep::PriceGiftWrap => Some("gift_wrap"),
        OrderStep::CalculateTax => Some("tax"),
        OrderStep::CapturePayment => Some("payment.charge"),
        OrderStep::DecrementStock => Some("inventory"),
        OrderStep::ScheduleShipment => Some("shipping"),
        OrderStep::SendConfirmation => Some("notification"),
        OrderStep::UpdateCrm => Some("crm"),
        OrderStep::AwardLoyalty => Some("loyalty"),
        OrderStep::TrackSale => Some("analytics"),
    }
}

#[tokio::test]
async fn test_gift_order_follows_the_published_pipeline() {
    let h = TestHarness::new();
    let request = TestHarness::order("SHIRT", 1)
        .with_gift_options(GiftOptions::new(json!({ "paper": "silver" })));

    let outcome = h.engine.process_order(&request).await.unwrap();

    assert!(outcome.is_success());
    let expected: Vec<&str> = ORDER_PIPELINE.into_iter().filter_map(journal_entry).collect();
    assert_eq!(h.journal.calls(), expected);
}

#[tokio::test]
async fn test_total_is_subtotal_plus_tax_and_is_what_gets_charged() {
    let h = TestHarness::new();

    let receipt = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 2))
        .await
        .unwrap()
        .success()
        .unwrap();

    // 2 x 1000.00 = 2000.00, 22% tax = 440.00
    assert_eq!(receipt.total_paid, Money::from_cents(244_000));
    assert_eq!(
        h.services.payment.charged(&receipt.transaction_id),
        Some(Money::from_cents(244_000))
    );
}

#[tokio::test]
async fn test_fan_out_sees_one_transaction_and_amount() {
    let h = TestHarness::new();
    let customer_id = CustomerId::new("CUST001");

    let receipt = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 3))
        .await
        .unwrap()
        .success()
        .unwrap();

    let laptop = ProductId::new("LAPTOP");
    assert_eq!(h.services.inventory.adjustments(), vec![(laptop.clone(), -3)]);

    let shipments = h.services.shipping.shipments();
    assert_eq!(shipments.len(), 1);
    assert_eq!(shipments[0].quantity.get(), 3);
    assert_eq!(shipments[0].address.as_str(), "1 Main St, Rome");

    let sent = h.services.notifications.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].transaction_id, receipt.transaction_id);
    assert_eq!(sent[0].total_paid, receipt.total_paid);
    assert_eq!(sent[0].email, "alice@example.com");

    let history = h.services.crm.history_for(&customer_id);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].transaction_id, receipt.transaction_id);
    assert_eq!(history[0].amount, receipt.total_paid);

    assert_eq!(
        h.services.loyalty.awards(),
        vec![(customer_id, receipt.total_paid)]
    );
    assert_eq!(h.services.analytics.revenue(), Some(receipt.total_paid));

    let last = h.services.audit.last().unwrap();
    assert_eq!(last.kind, AuditEventKind::OrderSuccess);
    assert_eq!(
        last.detail("transaction_id"),
        Some(&json!(receipt.transaction_id.as_str()))
    );
    assert_eq!(last.detail("amount"), Some(&json!(3660.0)));
}

#[tokio::test]
async fn test_gift_wrap_is_taxed_and_charged() {
    let h = TestHarness::new();
    let request = TestHarness::order("SHIRT", 1)
        .with_gift_options(GiftOptions::new(json!({ "paper": "gold", "card": "Happy birthday" })));

    let receipt = h
        .engine
        .process_order(&request)
        .await
        .unwrap()
        .success()
        .unwrap();

    // 200.00 + 5.00 wrap, 22% of 205.00 = 45.10
    assert_eq!(receipt.total_paid, Money::from_cents(25_010));
    let calls = h.journal.calls();
    let pos = |call| calls.iter().position(|c| *c == call).unwrap();
    assert!(pos("gift_wrap") < pos("tax"));
}

#[tokio::test]
async fn test_non_positive_quantity_only_records_start() {
    for quantity in [0, -1, -100] {
        let h = TestHarness::new();

        let outcome = h
            .engine
            .process_order(&TestHarness::order("LAPTOP", quantity))
            .await
            .unwrap();

        assert_eq!(outcome.rejection(), Some(&Rejection::InvalidQuantity));
        assert_eq!(h.journal.calls(), vec!["audit"]);
        assert_eq!(
            h.services.audit.kinds(),
            vec![AuditEventKind::OrderProcessStarted]
        );
    }
}

#[tokio::test]
async fn test_start_event_carries_product_and_quantity() {
    let h = TestHarness::new();

    h.engine
        .process_order(&TestHarness::order("LAPTOP", 2))
        .await
        .unwrap();

    let start = &h.services.audit.events()[0];
    assert_eq!(start.kind, AuditEventKind::OrderProcessStarted);
    assert_eq!(start.detail("product_id"), Some(&json!("LAPTOP")));
    assert_eq!(start.detail("quantity"), Some(&json!(2)));
}

#[tokio::test]
async fn test_unknown_product_is_rejected_and_audited() {
    let h = TestHarness::new();

    let outcome = h
        .engine
        .process_order(&TestHarness::order("NOPE", 1))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::ProductNotFound));
    assert_eq!(outcome.message().as_deref(), Some("Product not found"));
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.kind, AuditEventKind::OrderFailed);
    assert_eq!(last.detail("reason"), Some(&json!("Product not found")));
    assert!(!h.journal.contains("fraud"));
}

#[tokio::test]
async fn test_fraud_never_reaches_payment() {
    let h = TestHarness::new();
    h.services.fraud.flag_customer("CUST001");

    let outcome = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::FraudDetected));
    assert!(!h.journal.contains("compliance"));
    assert!(!h.journal.contains("payment.charge"));
    assert_eq!(h.services.payment.charge_count(), 0);
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.detail("reason"), Some(&json!("Fraud detected")));
    assert_eq!(last.detail("customer_id"), Some(&json!("CUST001")));
}

#[tokio::test]
async fn test_compliance_is_checked_before_availability() {
    let h = TestHarness::new();
    h.services.compliance.block("LAPTOP", "1 Main St, Rome");

    let outcome = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::RegulatoryRestriction));
    assert!(!h.journal.contains("catalog.availability"));
    assert!(!h.journal.contains("payment.charge"));
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.detail("reason"), Some(&json!("Compliance check failed")));
    assert_eq!(last.detail("address"), Some(&json!("1 Main St, Rome")));
}

#[tokio::test]
async fn test_insufficient_stock_is_rejected() {
    let h = TestHarness::new();

    let outcome = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 11))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::StockNotAvailable));
    assert!(!h.journal.contains("tax"));
    assert_no_charges(&h);
}

#[tokio::test]
async fn test_zero_or_missing_price_is_invalid() {
    for product in ["FREEBIE", "UNPRICED"] {
        let h = TestHarness::new();

        let outcome = h
            .engine
            .process_order(&TestHarness::order(product, 1))
            .await
            .unwrap();

        assert_eq!(outcome.rejection(), Some(&Rejection::InvalidPrice), "{product}");
        assert_eq!(
            h.services.audit.last().unwrap().detail("reason"),
            Some(&json!("Invalid price"))
        );
        assert_no_charges(&h);
    }
}

#[tokio::test]
async fn test_tax_fault_is_absorbed_before_payment() {
    let h = TestHarness::new();
    h.services.tax.set_fail_on_calculate(true);

    let outcome = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap();

    match outcome.rejection() {
        Some(Rejection::TaxCalculation(message)) => {
            assert!(message.contains("tax service unreachable"));
        }
        other => panic!("unexpected rejection: {other:?}"),
    }
    assert!(!h.journal.contains("payment.charge"));
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.detail("reason"), Some(&json!("Tax calculation error")));
    assert!(last.detail("error").is_some());
}

#[tokio::test]
async fn test_payment_fault_is_absorbed_without_side_effects() {
    let h = TestHarness::new();
    h.services.payment.set_fail_on_charge(true);

    let outcome = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap();

    let message = outcome.message().unwrap();
    assert!(message.starts_with("Payment gateway error:"));
    assert!(message.contains("Timeout"));
    h.assert_no_fan_out();
    assert_eq!(
        h.services.audit.last().unwrap().detail("reason"),
        Some(&json!("Payment gateway exception"))
    );
}

#[tokio::test]
async fn test_declined_payment_has_no_side_effects() {
    let h = TestHarness::new();
    h.services.payment.set_decline_charges(true);

    let outcome = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::PaymentDeclined));
    h.assert_no_fan_out();
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.detail("reason"), Some(&json!("Payment failed")));
    assert_eq!(last.detail("gateway_message"), Some(&json!("Card declined")));
}

#[tokio::test]
async fn test_inventory_fault_after_payment_propagates() {
    let h = TestHarness::new();
    h.services.inventory.set_fail_on_update(true);

    let err = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap_err();

    match err {
        FulfillmentError::Collaborator { step, .. } => assert_eq!(step, "decrement_stock"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.services.payment.charge_count(), 1);
    assert!(!h.journal.contains("shipping"));
    assert_ne!(
        h.services.audit.last().unwrap().kind,
        AuditEventKind::OrderSuccess
    );
}

#[tokio::test]
async fn test_notification_fault_leaves_earlier_side_effects_in_place() {
    let h = TestHarness::new();
    h.services.notifications.set_fail_on_send(true);

    let err = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("SMTP server down"));
    assert_eq!(h.services.inventory.level(&ProductId::new("LAPTOP")), -1);
    assert_eq!(h.services.shipping.shipment_count(), 1);
    assert!(!h.journal.contains("crm"));
}

#[tokio::test]
async fn test_audit_fault_at_start_propagates() {
    let h = TestHarness::new();
    h.services.audit.set_fail_on_log(true);

    let err = h
        .engine
        .process_order(&TestHarness::order("LAPTOP", 1))
        .await
        .unwrap_err();

    assert!(matches!(err, FulfillmentError::Collaborator { .. }));
    assert_eq!(h.journal.calls(), vec!["audit"]);
}

fn assert_no_charges(h: &TestHarness) {
    assert_eq!(h.services.payment.charge_count(), 0);
    h.assert_no_fan_out();
}

#[tokio::test]
async fn test_order_total_overflow_is_an_invalid_price() {
    let h = TestHarness::new();

    let outcome = h
        .engine
        .process_order(&TestHarness::order("YACHT", 2_000_000_000))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::InvalidPrice));
    assert!(!h.journal.contains("tax"));
    assert_no_charges(&h);
}

// Refunds

#[tokio::test]
async fn test_approved_refund_restores_stock() {
    let h = TestHarness::new();
    let txn = TransactionId::new("TXN-0042");

    let receipt = h
        .engine
        .process_refund(&ProductId::new("SHIRT"), 2, &txn)
        .await
        .unwrap()
        .success()
        .unwrap();

    assert_eq!(receipt.amount, Money::from_cents(40_000));
    assert_eq!(h.services.payment.refunds(), vec![(txn.clone(), receipt.amount)]);
    assert_eq!(h.services.inventory.adjustments(), vec![(ProductId::new("SHIRT"), 2)]);
    assert_eq!(
        h.services.audit.kinds(),
        vec![
            AuditEventKind::RefundProcessStarted,
            AuditEventKind::RefundSuccess
        ]
    );
}

#[tokio::test]
async fn test_declined_refund_leaves_stock_alone() {
    let h = TestHarness::new();
    h.services.payment.set_decline_refunds(true);

    let outcome = h
        .engine
        .process_refund(&ProductId::new("SHIRT"), 1, &TransactionId::new("TXN-0001"))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::RefundFailed));
    assert!(!h.journal.contains("inventory"));
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.kind, AuditEventKind::RefundFailed);
    assert_eq!(last.detail("reason"), Some(&json!("Gateway refund failed")));
}

#[tokio::test]
async fn test_refund_with_non_positive_quantity() {
    let h = TestHarness::new();

    let outcome = h
        .engine
        .process_refund(&ProductId::new("SHIRT"), 0, &TransactionId::new("TXN-0001"))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::InvalidRefundQuantity));
    assert_eq!(h.journal.calls(), vec!["audit"]);
}

#[tokio::test]
async fn test_refund_amount_overflow_is_an_invalid_price() {
    let h = TestHarness::new();

    let outcome = h
        .engine
        .process_refund(
            &ProductId::new("YACHT"),
            2_000_000_000,
            &TransactionId::new("TXN-0001"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::InvalidPrice));
    assert!(!h.journal.contains("payment.refund"));
    assert!(!h.journal.contains("inventory"));
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.kind, AuditEventKind::RefundFailed);
    assert_eq!(last.detail("reason"), Some(&json!("Invalid price")));
}

#[tokio::test]
async fn test_refund_for_unknown_product() {
    let h = TestHarness::new();

    let outcome = h
        .engine
        .process_refund(&ProductId::new("NOPE"), 1, &TransactionId::new("TXN-0001"))
        .await
        .unwrap();

    assert_eq!(outcome.rejection(), Some(&Rejection::ProductNotFound));
    assert!(!h.journal.contains("payment.refund"));
    assert_eq!(
        h.services.audit.last().unwrap().kind,
        AuditEventKind::RefundFailed
    );
}

// Quotes and pricing helpers

#[tokio::test]
async fn test_promo_code_quotes() {
    let h = TestHarness::new();
    let shirt = ProductId::new("SHIRT");

    let quote = h.engine.quote_with_promo_code(&shirt, "SAVE15").await.unwrap();
    assert_eq!(quote.success(), Some(Money::from_cents(17_000)));

    let quote = h.engine.quote_with_promo_code(&shirt, "BARE").await.unwrap();
    assert_eq!(quote.success(), Some(Money::from_cents(20_000)));

    let quote = h.engine.quote_with_promo_code(&shirt, "EXPIRED").await.unwrap();
    assert_eq!(quote.rejection(), Some(&Rejection::InvalidPromoCode));

    let quote = h.engine.quote_with_promo_code(&shirt, "UNKNOWN").await.unwrap();
    assert_eq!(quote.rejection(), Some(&Rejection::InvalidPromoCode));

    let quote = h
        .engine
        .quote_with_promo_code(&ProductId::new("NOPE"), "SAVE15")
        .await
        .unwrap();
    assert_eq!(quote.rejection(), Some(&Rejection::ProductNotFound));
    assert_eq!(h.services.promo.checked_codes().len(), 4);
}

#[tokio::test]
async fn test_apply_discount() {
    let h = TestHarness::new();
    h.services.catalog.add_product(
        ProductDetails::new("BOOK", "Book", Money::from_cents(5_000)),
        5,
    );

    let full = h.engine.apply_discount(&ProductId::new("BOOK"), 100.0).await.unwrap();
    assert_eq!(full, Some(Money::zero()));

    let tenth = h.engine.apply_discount(&ProductId::new("MUG"), 10.0).await.unwrap();
    assert_eq!(tenth, Some(Money::from_cents(8_999)));

    let missing = h.engine.apply_discount(&ProductId::new("NOPE"), 10.0).await.unwrap();
    assert_eq!(missing, None);

    let unpriced = h
        .engine
        .apply_discount(&ProductId::new("UNPRICED"), 10.0)
        .await
        .unwrap();
    assert_eq!(unpriced, None);
}

#[tokio::test]
async fn test_invalid_discount_skips_the_catalog() {
    let h = TestHarness::new();

    let err = h
        .engine
        .apply_discount(&ProductId::new("MUG"), 150.0)
        .await
        .unwrap_err();

    assert!(matches!(err, FulfillmentError::InvalidArgument(_)));
    assert!(h.journal.calls().is_empty());
}

#[tokio::test]
async fn test_price_in_currency() {
    let h = TestHarness::new();
    h.services.catalog.add_product(
        ProductDetails::new("CHAIR", "Chair", Money::from_cents(10_000)),
        5,
    );
    let chair = ProductId::new("CHAIR");

    let usd = h.engine.price_in_currency(&chair, "USD").await.unwrap();
    assert_eq!(usd, Some(Money::from_cents(10_800)));

    let gbp = h.engine.price_in_currency(&chair, "GBP").await.unwrap();
    assert_eq!(gbp, None);

    let missing = h
        .engine
        .price_in_currency(&ProductId::new("NOPE"), "USD")
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_home_currency_ignores_a_failing_converter() {
    let h = TestHarness::new();
    h.services.currency.set_fail_on_lookup(true);
    let mug = ProductId::new("MUG");

    for code in ["EUR", "eur", " Eur "] {
        let price = h.engine.price_in_currency(&mug, code).await.unwrap();
        assert_eq!(price, Some(Money::from_cents(9_999)), "{code}");
    }

    let err = h.engine.price_in_currency(&mug, "USD").await.unwrap_err();
    assert!(matches!(err, FulfillmentError::Collaborator { step: "currency_rate", .. }));
}

#[tokio::test]
async fn test_product_info_and_availability_guards() {
    let h = TestHarness::new();

    assert!(h.engine.get_product_info(&ProductId::new("")).await.unwrap().is_none());
    assert!(!h.engine.check_availability(&ProductId::new("LAPTOP"), 0).await.unwrap());
    assert!(!h.engine.check_availability(&ProductId::new("LAPTOP"), -3).await.unwrap());
    assert!(h.journal.calls().is_empty());

    let info = h
        .engine
        .get_product_info(&ProductId::new("LAPTOP"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.name, "Laptop");
    assert!(h.engine.check_availability(&ProductId::new("LAPTOP"), 10).await.unwrap());
    assert!(!h.engine.check_availability(&ProductId::new("LAPTOP"), 11).await.unwrap());
}

// Digital orders and returns

#[tokio::test]
async fn test_free_digital_product_is_charged_zero_and_delivered() {
    let h = TestHarness::new();
    h.services.catalog.add_product(
        ProductDetails::new("FREE-EBOOK", "Free e-book", Money::zero()).digital(),
        0,
    );
    h.services.catalog.add_product(
        ProductDetails::new("DRAFT-EBOOK", "Draft e-book", Money::zero())
            .digital()
            .without_price(),
        0,
    );

    for product in ["FREE-EBOOK", "DRAFT-EBOOK"] {
        let delivery = h
            .engine
            .process_digital_order(
                &ProductId::new(product),
                &CardDetails::new("4111-1111"),
                &TestHarness::customer(),
            )
            .await
            .unwrap()
            .success()
            .unwrap();

        assert_eq!(
            h.services.payment.charged(&delivery.transaction_id),
            Some(Money::zero()),
            "{product}"
        );
    }
    assert_eq!(h.services.digital.issued_count(), 2);
}

#[tokio::test]
async fn test_digital_order_charges_unit_price_only() {
    let h = TestHarness::new();

    let delivery = h
        .engine
        .process_digital_order(
            &ProductId::new("EBOOK"),
            &CardDetails::new("4111-1111"),
            &TestHarness::customer(),
        )
        .await
        .unwrap()
        .success()
        .unwrap();

    assert!(delivery.download_link.starts_with("https://my.store/download/EBOOK/"));
    assert_eq!(
        h.services.payment.charged(&delivery.transaction_id),
        Some(Money::from_cents(1_500))
    );
    assert!(!h.journal.contains("tax"));
    assert!(!h.journal.contains("shipping"));
    assert_eq!(h.services.digital.issued_count(), 1);
}

#[tokio::test]
async fn test_digital_order_rejections() {
    let h = TestHarness::new();
    let card = CardDetails::new("4111-1111");
    let customer = TestHarness::customer();

    let physical = h
        .engine
        .process_digital_order(&ProductId::new("LAPTOP"), &card, &customer)
        .await
        .unwrap();
    assert_eq!(physical.rejection(), Some(&Rejection::NotDigital));

    h.services.payment.set_decline_charges(true);
    let declined = h
        .engine
        .process_digital_order(&ProductId::new("EBOOK"), &card, &customer)
        .await
        .unwrap();
    assert_eq!(declined.rejection(), Some(&Rejection::PaymentDeclined));
    assert_eq!(h.services.digital.issued_count(), 0);
}

#[tokio::test]
async fn test_return_requests() {
    let h = TestHarness::new();
    let txn = TransactionId::new("TXN-0007");

    let ticket = h
        .engine
        .request_return(&ProductId::new("SHIRT"), &txn)
        .await
        .unwrap()
        .success()
        .unwrap();
    assert_eq!(ticket.as_str(), "RMA-0001");

    let not_returnable = h
        .engine
        .request_return(&ProductId::new("LAPTOP"), &txn)
        .await
        .unwrap();
    assert_eq!(not_returnable.rejection(), Some(&Rejection::NotReturnable));

    let unknown = h
        .engine
        .request_return(&ProductId::new("NOPE"), &txn)
        .await
        .unwrap();
    assert_eq!(unknown.rejection(), Some(&Rejection::ProductNotFound));
    assert_eq!(h.services.returns.ticket_count(), 1);
}

// Stock and price maintenance

#[tokio::test]
async fn test_add_stock_is_audited() {
    let h = TestHarness::new();
    let mug = ProductId::new("MUG");

    let added = h.engine.add_stock(&mug, 5).await.unwrap();

    assert_eq!(added.get(), 5);
    assert_eq!(h.services.inventory.adjustments(), vec![(mug, 5)]);
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.kind, AuditEventKind::StockAdded);
    assert_eq!(last.detail("product_id"), Some(&json!("MUG")));
    assert_eq!(last.detail("quantity"), Some(&json!(5)));
}

#[tokio::test]
async fn test_add_stock_rejects_non_positive_quantity() {
    let h = TestHarness::new();

    let err = h.engine.add_stock(&ProductId::new("MUG"), 0).await.unwrap_err();

    assert!(matches!(err, FulfillmentError::InvalidArgument(_)));
    assert!(h.journal.calls().is_empty());
}

#[tokio::test]
async fn test_update_product_price_is_audited() {
    let h = TestHarness::new();
    let mug = ProductId::new("MUG");

    h.engine
        .update_product_price(&mug, Money::from_cents(12_950))
        .await
        .unwrap();

    assert_eq!(h.services.catalog.price_of(&mug), Some(Money::from_cents(12_950)));
    let last = h.services.audit.last().unwrap();
    assert_eq!(last.kind, AuditEventKind::PriceUpdated);
    assert_eq!(last.detail("price"), Some(&json!(129.5)));
}

// Construction

#[test]
fn test_missing_collaborators_are_all_reported() {
    let services = InMemoryCollaborators::new();
    let err = OrderWorkflowEngine::builder()
        .product_catalog(Arc::new(services.catalog.clone()))
        .payment_gateway(Arc::new(services.payment.clone()))
        .build()
        .unwrap_err();

    match err {
        FulfillmentError::Configuration(missing) => {
            assert_eq!(missing.len(), 15);
            assert!(missing.contains(&"inventory"));
            assert!(missing.contains(&"compliance"));
            assert!(!missing.contains(&"payment_gateway"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
