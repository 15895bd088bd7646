//! The order pipeline as an explicit step table.
//!
//! Each step that calls a collaborator carries a [`FaultPolicy`]. Absorbing
//! steps turn a collaborator fault into a business rejection; every other
//! step lets the fault escape to the caller. Only the tax and payment steps
//! absorb, and both run before any irreversible side effect.

use crate::error::{FulfillmentError, ServiceError};
use crate::outcome::Rejection;

/// The workflow name used in spans and metrics.
pub const WORKFLOW_TYPE: &str = "OrderFulfillment";

// Steps outside the order pipeline, named for fault reports.
pub const STEP_AUDIT: &str = "audit";
pub const STEP_REFUND_PAYMENT: &str = "refund_payment";
pub const STEP_RESTORE_STOCK: &str = "restore_stock";
pub const STEP_ADD_STOCK: &str = "add_stock";
pub const STEP_UPDATE_PRICE: &str = "update_price";
pub const STEP_VALIDATE_PROMO: &str = "validate_promo";
pub const STEP_CURRENCY_RATE: &str = "currency_rate";
pub const STEP_DIGITAL_PAYMENT: &str = "digital_payment";
pub const STEP_DOWNLOAD_LINK: &str = "download_link";
pub const STEP_RMA_TICKET: &str = "rma_ticket";

/// What happens when a collaborator call inside a step faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Convert the fault into a typed rejection; no side effects have run yet.
    Absorb,
    /// Let the fault escape to the caller as-is.
    Propagate,
}

/// One step of the order pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStep {
    RecordStart,
    ValidateQuantity,
    LookupProduct,
    ScreenFraud,
    CheckCompliance,
    CheckAvailability,
    PriceBase,
    PriceGiftWrap,
    CalculateTax,
    CapturePayment,
    DecrementStock,
    ScheduleShipment,
    SendConfirmation,
    UpdateCrm,
    AwardLoyalty,
    TrackSale,
    RecordSuccess,
}

/// Every step of `process_order`, in the order it runs.
///
/// The pre-payment steps branch on their results, so `process_order` runs
/// them as straight-line code; only [`POST_PAYMENT_FAN_OUT`] is iterated.
pub const ORDER_PIPELINE: [OrderStep; 17] = [
    OrderStep::RecordStart,
    OrderStep::ValidateQuantity,
    OrderStep::LookupProduct,
    OrderStep::ScreenFraud,
    OrderStep::CheckCompliance,
    OrderStep::CheckAvailability,
    OrderStep::PriceBase,
    OrderStep::PriceGiftWrap,
    OrderStep::CalculateTax,
    OrderStep::CapturePayment,
    OrderStep::DecrementStock,
    OrderStep::ScheduleShipment,
    OrderStep::SendConfirmation,
    OrderStep::UpdateCrm,
    OrderStep::AwardLoyalty,
    OrderStep::TrackSale,
    OrderStep::RecordSuccess,
];

/// A step that runs only after the payment was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FanOutStep {
    DecrementStock,
    ScheduleShipment,
    SendConfirmation,
    UpdateCrm,
    AwardLoyalty,
    TrackSale,
    RecordSuccess,
}

/// Side effects run only after the payment was captured, in this order.
pub const POST_PAYMENT_FAN_OUT: [FanOutStep; 7] = [
    FanOutStep::DecrementStock,
    FanOutStep::ScheduleShipment,
    FanOutStep::SendConfirmation,
    FanOutStep::UpdateCrm,
    FanOutStep::AwardLoyalty,
    FanOutStep::TrackSale,
    FanOutStep::RecordSuccess,
];

impl From<FanOutStep> for OrderStep {
    fn from(step: FanOutStep) -> Self {
        match step {
            FanOutStep::DecrementStock => OrderStep::DecrementStock,
            FanOutStep::ScheduleShipment => OrderStep::ScheduleShipment,
            FanOutStep::SendConfirmation => OrderStep::SendConfirmation,
            FanOutStep::UpdateCrm => OrderStep::UpdateCrm,
            FanOutStep::AwardLoyalty => OrderStep::AwardLoyalty,
            FanOutStep::TrackSale => OrderStep::TrackSale,
            FanOutStep::RecordSuccess => OrderStep::RecordSuccess,
        }
    }
}

impl FanOutStep {
    pub fn name(self) -> &'static str {
        OrderStep::from(self).name()
    }

    /// Applies the step's fault policy; fan-out steps always propagate.
    pub fn attempt<T>(self, result: Result<T, ServiceError>) -> Result<T, StepFault> {
        OrderStep::from(self).attempt(result)
    }
}

impl OrderStep {
    /// Stable snake_case name, used in logs, metrics and fault reports.
    pub const fn name(self) -> &'static str {
        match self {
            OrderStep::RecordStart => "record_start",
            OrderStep::ValidateQuantity => "validate_quantity",
            OrderStep::LookupProduct => "lookup_product",
            OrderStep::ScreenFraud => "screen_fraud",
            OrderStep::CheckCompliance => "check_compliance",
            OrderStep::CheckAvailability => "check_availability",
            OrderStep::PriceBase => "price_base",
            OrderStep::PriceGiftWrap => "price_gift_wrap",
            OrderStep::CalculateTax => "calculate_tax",
            OrderStep::CapturePayment => "capture_payment",
            OrderStep::DecrementStock => "decrement_stock",
            OrderStep::ScheduleShipment => "schedule_shipment",
            OrderStep::SendConfirmation => "send_confirmation",
            OrderStep::UpdateCrm => "update_crm",
            OrderStep::AwardLoyalty => "award_loyalty",
            OrderStep::TrackSale => "track_sale",
            OrderStep::RecordSuccess => "record_success",
        }
    }

    pub const fn fault_policy(self) -> FaultPolicy {
        match self {
            OrderStep::CalculateTax | OrderStep::CapturePayment => FaultPolicy::Absorb,
            _ => FaultPolicy::Propagate,
        }
    }

    /// Rejection reported when this step absorbs `source`.
    ///
    /// Only meaningful for steps whose policy is [`FaultPolicy::Absorb`].
    pub fn absorbed_rejection(self, source: &ServiceError) -> Rejection {
        match self {
            OrderStep::CalculateTax => Rejection::TaxCalculation(source.to_string()),
            _ => Rejection::PaymentGateway(source.to_string()),
        }
    }

    /// True for steps that only run after the payment was captured.
    pub fn is_post_payment(self) -> bool {
        POST_PAYMENT_FAN_OUT
            .into_iter()
            .any(|step| OrderStep::from(step) == self)
    }

    /// Applies this step's fault policy to a collaborator result.
    pub fn attempt<T>(self, result: Result<T, ServiceError>) -> Result<T, StepFault> {
        result.map_err(|source| match self.fault_policy() {
            FaultPolicy::Absorb => StepFault::Absorbed { step: self, source },
            FaultPolicy::Propagate => {
                StepFault::Escalated(FulfillmentError::collaborator(self.name(), source))
            }
        })
    }
}

impl std::fmt::Display for OrderStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A collaborator fault after its step's policy was applied.
#[derive(Debug)]
pub enum StepFault {
    /// To be reported to the caller as a rejection.
    Absorbed {
        step: OrderStep,
        source: ServiceError,
    },
    /// To be returned to the caller as an error.
    Escalated(FulfillmentError),
}

impl From<FulfillmentError> for StepFault {
    fn from(err: FulfillmentError) -> Self {
        StepFault::Escalated(err)
    }
}
