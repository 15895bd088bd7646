//! The order workflow engine.
//!
//! `OrderWorkflowEngine` orchestrates seventeen collaborators. It keeps no
//! state of its own between calls; every operation runs its collaborator
//! calls one after another in a fixed order.

use std::sync::Arc;
use std::time::Instant;

use common::{Money, ProductId, Quantity, TransactionId};
use serde_json::{Value, json};

use crate::builder::EngineBuilder;
use crate::error::{FulfillmentError, Result};
use crate::model::{CardDetails, CustomerInfo, OrderRequest, ProductDetails};
use crate::outcome::{
    DigitalDelivery, DigitalOrderOutcome, OrderOutcome, OrderReceipt, Outcome, QuoteOutcome,
    RefundOutcome, RefundReceipt, Rejection, ReturnOutcome,
};
use crate::pricing;
use crate::services::{
    AnalyticsTracker, AuditEvent, AuditEventKind, AuditLogger, ComplianceChecker, CrmSystem,
    CurrencyConverter, DigitalAssetManager, FraudDetector, GiftWrapService, InventorySystem,
    LoyaltyProgram, NotificationService, OrderConfirmation, PaymentGateway, PaymentResult,
    ProductCatalog, PromoCodeValidator, RefundResult, ReturnAuthorizer, ShippingService,
    TaxCalculator,
};
use crate::steps::{
    FanOutStep, OrderStep, POST_PAYMENT_FAN_OUT, STEP_ADD_STOCK, STEP_AUDIT, STEP_CURRENCY_RATE,
    STEP_DIGITAL_PAYMENT, STEP_DOWNLOAD_LINK, STEP_REFUND_PAYMENT, STEP_RESTORE_STOCK,
    STEP_RMA_TICKET, STEP_UPDATE_PRICE, STEP_VALIDATE_PROMO, StepFault, WORKFLOW_TYPE,
};

/// Orchestrates order, refund, quote and helper workflows.
///
/// Build one with [`OrderWorkflowEngine::builder`]. The engine is immutable
/// and can be shared behind an `Arc` across tasks.
pub struct OrderWorkflowEngine {
    pub(crate) product_catalog: Arc<dyn ProductCatalog>,
    pub(crate) inventory: Arc<dyn InventorySystem>,
    pub(crate) payment_gateway: Arc<dyn PaymentGateway>,
    pub(crate) promo_validator: Arc<dyn PromoCodeValidator>,
    pub(crate) notifications: Arc<dyn NotificationService>,
    pub(crate) shipping: Arc<dyn ShippingService>,
    pub(crate) audit_logger: Arc<dyn AuditLogger>,
    pub(crate) fraud_detector: Arc<dyn FraudDetector>,
    pub(crate) tax_calculator: Arc<dyn TaxCalculator>,
    pub(crate) loyalty: Arc<dyn LoyaltyProgram>,
    pub(crate) analytics: Arc<dyn AnalyticsTracker>,
    pub(crate) currency_converter: Arc<dyn CurrencyConverter>,
    pub(crate) crm: Arc<dyn CrmSystem>,
    pub(crate) gift_wrap: Arc<dyn GiftWrapService>,
    pub(crate) digital_assets: Arc<dyn DigitalAssetManager>,
    pub(crate) returns: Arc<dyn ReturnAuthorizer>,
    pub(crate) compliance: Arc<dyn ComplianceChecker>,
    pub(crate) home_currency: String,
}

impl std::fmt::Debug for OrderWorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderWorkflowEngine")
            .field("home_currency", &self.home_currency)
            .finish_non_exhaustive()
    }
}

impl OrderWorkflowEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Currency in which catalog prices are expressed.
    pub fn home_currency(&self) -> &str {
        &self.home_currency
    }

    /// Runs the full order pipeline.
    ///
    /// Business rejections come back as `Ok(Outcome::Failure(_))`. An `Err`
    /// means a collaborator fault escaped; when it comes from a post-payment
    /// step the charge has already been captured.
    #[tracing::instrument(
        skip(self, request),
        fields(
            workflow = WORKFLOW_TYPE,
            product_id = %request.product_id,
            quantity = request.quantity,
        )
    )]
    pub async fn process_order(&self, request: &OrderRequest) -> Result<OrderOutcome> {
        let started = Instant::now();

        let result = match self.run_order(request).await {
            Ok(outcome) => Ok(outcome),
            Err(StepFault::Absorbed { step, source }) => {
                metrics::counter!("collaborator_faults_total", "step" => step.name())
                    .increment(1);
                tracing::warn!(step = step.name(), error = %source, "collaborator fault absorbed");
                let rejection = step.absorbed_rejection(&source);
                self.reject_order(rejection, vec![("error", json!(source.to_string()))])
                    .await
            }
            Err(StepFault::Escalated(err)) => {
                if let FulfillmentError::Collaborator { step, .. } = &err {
                    metrics::counter!("collaborator_faults_total", "step" => *step).increment(1);
                    tracing::error!(
                        step = *step,
                        error = %err,
                        "order aborted by collaborator fault, earlier steps are not compensated"
                    );
                }
                Err(err)
            }
        };

        if let Ok(outcome) = &result {
            metrics::counter!("orders_processed_total", "outcome" => outcome.label())
                .increment(1);
        }
        metrics::histogram!("order_processing_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        result
    }

    async fn run_order(&self, request: &OrderRequest) -> std::result::Result<OrderOutcome, StepFault> {
        let product_id = &request.product_id;
        let customer = &request.customer;

        OrderStep::RecordStart.attempt(
            self.audit_logger
                .log_event(
                    AuditEvent::new(AuditEventKind::OrderProcessStarted)
                        .with("product_id", product_id.as_str())
                        .with("quantity", request.quantity),
                )
                .await,
        )?;

        let Ok(quantity) = Quantity::try_from(request.quantity) else {
            tracing::warn!(reason = "Invalid quantity", "order rejected");
            return Ok(Rejection::InvalidQuantity.into());
        };

        let product = OrderStep::LookupProduct
            .attempt(self.product_catalog.get_product_details(product_id).await)?;
        let Some(product) = product else {
            return Ok(self.reject_order(Rejection::ProductNotFound, vec![]).await?);
        };

        let fraudulent = OrderStep::ScreenFraud
            .attempt(self.fraud_detector.is_fraudulent(customer, &request.card).await)?;
        if fraudulent {
            let details = vec![("customer_id", json!(customer.id.as_str()))];
            return Ok(self.reject_order(Rejection::FraudDetected, details).await?);
        }

        let compliant = OrderStep::CheckCompliance.attempt(
            self.compliance
                .verify_shipment(product_id, &customer.address)
                .await,
        )?;
        if !compliant {
            let details = vec![("address", json!(customer.address.as_str()))];
            return Ok(self.reject_order(Rejection::RegulatoryRestriction, details).await?);
        }

        let available = OrderStep::CheckAvailability.attempt(
            self.product_catalog
                .check_product_availability(product_id, quantity)
                .await,
        )?;
        if !available {
            return Ok(self.reject_order(Rejection::StockNotAvailable, vec![]).await?);
        }

        let subtotal = pricing::base_price(&product, quantity).filter(Money::is_positive);
        let Some(subtotal) = subtotal else {
            return Ok(self.reject_order(Rejection::InvalidPrice, vec![]).await?);
        };

        let gift_cost = match &request.gift_options {
            Some(options) => OrderStep::PriceGiftWrap
                .attempt(self.gift_wrap.get_gift_wrap_price(options).await)?,
            None => Money::zero(),
        };

        let Some(taxable) = subtotal.checked_add(gift_cost) else {
            return Ok(self.reject_order(Rejection::InvalidPrice, vec![]).await?);
        };
        let tax = OrderStep::CalculateTax.attempt(
            self.tax_calculator
                .calculate_tax(taxable, &customer.address)
                .await,
        )?;
        let Some(total) = pricing::order_total(subtotal, gift_cost, tax) else {
            return Ok(self.reject_order(Rejection::InvalidPrice, vec![]).await?);
        };
        tracing::debug!(%subtotal, %gift_cost, %tax, %total, "order priced");

        let payment = OrderStep::CapturePayment
            .attempt(self.payment_gateway.process_payment(total, &request.card).await)?;
        let transaction_id = match payment {
            PaymentResult::Approved { transaction_id } => transaction_id,
            PaymentResult::Declined { message } => {
                let details = message
                    .map(|m| vec![("gateway_message", json!(m))])
                    .unwrap_or_default();
                return Ok(self.reject_order(Rejection::PaymentDeclined, details).await?);
            }
        };
        tracing::info!(%transaction_id, %total, "payment captured");

        let receipt = OrderReceipt {
            transaction_id,
            total_paid: total,
        };
        for step in POST_PAYMENT_FAN_OUT {
            self.fan_out(step, request, quantity, &receipt).await?;
        }

        tracing::info!(transaction_id = %receipt.transaction_id, "order fulfilled");
        Ok(Outcome::Success(receipt))
    }

    async fn fan_out(
        &self,
        step: FanOutStep,
        request: &OrderRequest,
        quantity: Quantity,
        receipt: &OrderReceipt,
    ) -> std::result::Result<(), StepFault> {
        let product_id = &request.product_id;
        let customer = &request.customer;
        tracing::debug!(step = step.name(), "running post-payment step");

        let result = match step {
            FanOutStep::DecrementStock => {
                self.inventory
                    .update_stock(product_id, -quantity.as_delta())
                    .await
            }
            FanOutStep::ScheduleShipment => {
                self.shipping
                    .schedule_shipment(product_id, quantity, &customer.address)
                    .await
            }
            FanOutStep::SendConfirmation => {
                let confirmation = OrderConfirmation {
                    email: customer.email.clone(),
                    transaction_id: receipt.transaction_id.clone(),
                    product_id: product_id.clone(),
                    quantity,
                    total_paid: receipt.total_paid,
                };
                self.notifications
                    .send_order_confirmation(&confirmation)
                    .await
            }
            FanOutStep::UpdateCrm => {
                self.crm
                    .update_customer_history(
                        &customer.id,
                        &receipt.transaction_id,
                        receipt.total_paid,
                    )
                    .await
            }
            FanOutStep::AwardLoyalty => {
                self.loyalty
                    .award_points(&customer.id, receipt.total_paid)
                    .await
            }
            FanOutStep::TrackSale => {
                self.analytics
                    .track_sale(product_id, quantity, receipt.total_paid)
                    .await
            }
            FanOutStep::RecordSuccess => {
                self.audit_logger
                    .log_event(
                        AuditEvent::new(AuditEventKind::OrderSuccess)
                            .with("transaction_id", receipt.transaction_id.as_str())
                            .with("amount", receipt.total_paid.to_decimal()),
                    )
                    .await
            }
        };

        step.attempt(result)
    }

    async fn reject_order(
        &self,
        rejection: Rejection,
        details: Vec<(&'static str, Value)>,
    ) -> Result<OrderOutcome> {
        tracing::warn!(reason = rejection.audit_reason(), "order rejected");
        let mut event =
            AuditEvent::new(AuditEventKind::OrderFailed).with("reason", rejection.audit_reason());
        for (key, value) in details {
            event = event.with(key, value);
        }
        self.audit(event).await?;
        Ok(Outcome::Failure(rejection))
    }

    /// Refunds `quantity` units of a product against an earlier transaction.
    #[tracing::instrument(skip(self), fields(product_id = %product_id, transaction_id = %transaction_id))]
    pub async fn process_refund(
        &self,
        product_id: &ProductId,
        quantity: i64,
        transaction_id: &TransactionId,
    ) -> Result<RefundOutcome> {
        let result = self.run_refund(product_id, quantity, transaction_id).await;
        match &result {
            Ok(outcome) => {
                metrics::counter!("refunds_processed_total", "outcome" => outcome.label())
                    .increment(1);
            }
            Err(err) => tracing::error!(error = %err, "refund aborted by collaborator fault"),
        }
        result
    }

    async fn run_refund(
        &self,
        product_id: &ProductId,
        quantity: i64,
        transaction_id: &TransactionId,
    ) -> Result<RefundOutcome> {
        self.audit(
            AuditEvent::new(AuditEventKind::RefundProcessStarted)
                .with("transaction_id", transaction_id.as_str()),
        )
        .await?;

        let Ok(quantity) = Quantity::try_from(quantity) else {
            tracing::warn!(quantity, "refund rejected");
            return Ok(Rejection::InvalidRefundQuantity.into());
        };

        let Some(product) = self.fetch_product(product_id).await? else {
            return self.reject_refund(Rejection::ProductNotFound).await;
        };

        let Some(amount) = pricing::base_price(&product, quantity) else {
            return self.reject_refund(Rejection::InvalidPrice).await;
        };
        let result = self
            .payment_gateway
            .process_refund(amount, transaction_id)
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_REFUND_PAYMENT, e))?;

        match result {
            RefundResult::Approved => {
                self.inventory
                    .update_stock(product_id, quantity.as_delta())
                    .await
                    .map_err(|e| FulfillmentError::collaborator(STEP_RESTORE_STOCK, e))?;
                self.audit(
                    AuditEvent::new(AuditEventKind::RefundSuccess)
                        .with("transaction_id", transaction_id.as_str()),
                )
                .await?;
                tracing::info!(%amount, "refund completed");
                Ok(Outcome::Success(RefundReceipt {
                    transaction_id: transaction_id.clone(),
                    amount,
                }))
            }
            RefundResult::Declined { message } => {
                tracing::debug!(gateway_message = ?message, "refund declined by gateway");
                self.reject_refund(Rejection::RefundFailed).await
            }
        }
    }

    async fn reject_refund(&self, rejection: Rejection) -> Result<RefundOutcome> {
        tracing::warn!(reason = rejection.audit_reason(), "refund rejected");
        self.audit(
            AuditEvent::new(AuditEventKind::RefundFailed).with("reason", rejection.audit_reason()),
        )
        .await?;
        Ok(Outcome::Failure(rejection))
    }

    /// Unit price after applying a promo code.
    #[tracing::instrument(skip(self, code), fields(product_id = %product_id))]
    pub async fn quote_with_promo_code(
        &self,
        product_id: &ProductId,
        code: &str,
    ) -> Result<QuoteOutcome> {
        let Some(product) = self.fetch_product(product_id).await? else {
            return Ok(Rejection::ProductNotFound.into());
        };

        let validation = self
            .promo_validator
            .validate_code(code)
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_VALIDATE_PROMO, e))?;

        match validation {
            Some(validation) if validation.is_valid => {
                let percentage = validation.discount_percentage.unwrap_or(0.0);
                Ok(Outcome::Success(pricing::discounted_price(
                    product.unit_price(),
                    percentage,
                )))
            }
            _ => {
                tracing::warn!(reason = "Invalid promo code", "quote rejected");
                Ok(Rejection::InvalidPromoCode.into())
            }
        }
    }

    /// Catalog price after a percentage discount in (0, 100].
    ///
    /// Returns `Ok(None)` when the product is unknown or has no price.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn apply_discount(
        &self,
        product_id: &ProductId,
        percentage: f64,
    ) -> Result<Option<Money>> {
        let percentage = pricing::validate_discount_percentage(percentage)?;
        let price = self.fetch_product(product_id).await?.and_then(|p| p.price);
        Ok(price.map(|price| pricing::discounted_price(price, percentage)))
    }

    /// Catalog price expressed in `currency`.
    ///
    /// The home currency never consults the converter. Returns `Ok(None)` for
    /// an unknown or unpriced product, or when no rate is available.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn price_in_currency(
        &self,
        product_id: &ProductId,
        currency: &str,
    ) -> Result<Option<Money>> {
        let Some(price) = self.fetch_product(product_id).await?.and_then(|p| p.price) else {
            return Ok(None);
        };
        if pricing::is_home_currency(&self.home_currency, currency) {
            return Ok(Some(price));
        }

        let rate = self
            .currency_converter
            .get_rate(&self.home_currency, currency.trim())
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_CURRENCY_RATE, e))?;
        if rate.is_none() {
            tracing::debug!(currency, "no conversion rate available");
        }
        Ok(rate.map(|rate| pricing::convert(price, rate)))
    }

    /// Catalog entry for a product; an empty id is answered without a lookup.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_info(&self, product_id: &ProductId) -> Result<Option<ProductDetails>> {
        if product_id.is_empty() {
            return Ok(None);
        }
        self.fetch_product(product_id).await
    }

    /// Whether `quantity` units can be sold; non-positive quantities are never available.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn check_availability(&self, product_id: &ProductId, quantity: i64) -> Result<bool> {
        let Ok(quantity) = Quantity::try_from(quantity) else {
            return Ok(false);
        };
        self.product_catalog
            .check_product_availability(product_id, quantity)
            .await
            .map_err(|e| FulfillmentError::collaborator(OrderStep::CheckAvailability.name(), e))
    }

    /// Sells a digital product: full unit price, no tax, no shipping.
    ///
    /// A product without a price is charged zero.
    #[tracing::instrument(skip(self, card, customer), fields(product_id = %product_id, customer_id = %customer.id))]
    pub async fn process_digital_order(
        &self,
        product_id: &ProductId,
        card: &CardDetails,
        customer: &CustomerInfo,
    ) -> Result<DigitalOrderOutcome> {
        let product = self.fetch_product(product_id).await?.filter(|p| p.is_digital);
        let Some(product) = product else {
            tracing::warn!(reason = "Not a digital product", "digital order rejected");
            return Ok(Rejection::NotDigital.into());
        };
        let payment = self
            .payment_gateway
            .process_payment(product.unit_price(), card)
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_DIGITAL_PAYMENT, e))?;

        match payment {
            PaymentResult::Approved { transaction_id } => {
                let download_link = self
                    .digital_assets
                    .generate_download_link(product_id, &customer.id)
                    .await
                    .map_err(|e| FulfillmentError::collaborator(STEP_DOWNLOAD_LINK, e))?;
                tracing::info!(%transaction_id, "digital order delivered");
                Ok(Outcome::Success(DigitalDelivery {
                    transaction_id,
                    download_link,
                }))
            }
            PaymentResult::Declined { .. } => {
                tracing::warn!(reason = "Payment failed", "digital order rejected");
                Ok(Rejection::PaymentDeclined.into())
            }
        }
    }

    /// Opens a return authorization for a returnable product.
    #[tracing::instrument(skip(self), fields(product_id = %product_id, transaction_id = %transaction_id))]
    pub async fn request_return(
        &self,
        product_id: &ProductId,
        transaction_id: &TransactionId,
    ) -> Result<ReturnOutcome> {
        let Some(product) = self.fetch_product(product_id).await? else {
            return Ok(Rejection::ProductNotFound.into());
        };
        if !product.is_returnable {
            tracing::warn!(reason = "Not returnable", "return rejected");
            return Ok(Rejection::NotReturnable.into());
        }

        let ticket = self
            .returns
            .create_rma_ticket(product_id, transaction_id)
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_RMA_TICKET, e))?;
        tracing::info!(%ticket, "return authorized");
        Ok(Outcome::Success(ticket))
    }

    /// Adds stock for a product and records it in the audit trail.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_stock(&self, product_id: &ProductId, quantity: i64) -> Result<Quantity> {
        let quantity = Quantity::try_from(quantity)
            .map_err(|e| FulfillmentError::InvalidArgument(e.to_string()))?;

        self.inventory
            .update_stock(product_id, quantity.as_delta())
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_ADD_STOCK, e))?;
        self.audit(
            AuditEvent::new(AuditEventKind::StockAdded)
                .with("product_id", product_id.as_str())
                .with("quantity", quantity.as_delta()),
        )
        .await?;
        Ok(quantity)
    }

    /// Sets a new catalog price and records it in the audit trail.
    #[tracing::instrument(skip(self), fields(product_id = %product_id, price = %new_price))]
    pub async fn update_product_price(&self, product_id: &ProductId, new_price: Money) -> Result<()> {
        if new_price.is_negative() {
            return Err(FulfillmentError::InvalidArgument(format!(
                "price must not be negative, got {new_price}"
            )));
        }

        self.product_catalog
            .update_product_price(product_id, new_price)
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_UPDATE_PRICE, e))?;
        self.audit(
            AuditEvent::new(AuditEventKind::PriceUpdated)
                .with("product_id", product_id.as_str())
                .with("price", new_price.to_decimal()),
        )
        .await
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<ProductDetails>> {
        self.product_catalog
            .get_product_details(product_id)
            .await
            .map_err(|e| FulfillmentError::collaborator(OrderStep::LookupProduct.name(), e))
    }

    async fn audit(&self, event: AuditEvent) -> Result<()> {
        self.audit_logger
            .log_event(event)
            .await
            .map_err(|e| FulfillmentError::collaborator(STEP_AUDIT, e))
    }
}
