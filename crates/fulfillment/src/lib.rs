//! Order fulfillment workflow engine.
//!
//! [`OrderWorkflowEngine`] coordinates a physical order across seventeen
//! external collaborators:
//! 1. Record the start and validate the quantity
//! 2. Look up the product, screen for fraud, check compliance and stock
//! 3. Price the order (base, gift wrap, tax)
//! 4. Capture payment
//! 5. Fan out to inventory, shipping, notification, CRM, loyalty, analytics
//!    and the audit trail
//!
//! Expected business failures are returned as [`Outcome::Failure`]. Faults
//! from collaborators are absorbed only at the tax and payment steps; every
//! other fault is returned as [`FulfillmentError`] without compensation.

pub mod builder;
pub mod engine;
pub mod error;
pub mod in_memory;
pub mod model;
pub mod outcome;
pub mod pricing;
pub mod services;
pub mod steps;

pub use builder::EngineBuilder;
pub use engine::OrderWorkflowEngine;
pub use error::{FulfillmentError, Result, ServiceError};
pub use in_memory::InMemoryCollaborators;
pub use model::{Address, CardDetails, CustomerInfo, GiftOptions, OrderRequest, ProductDetails};
pub use outcome::{
    DigitalDelivery, DigitalOrderOutcome, OrderOutcome, OrderReceipt, Outcome, QuoteOutcome,
    RefundOutcome, RefundReceipt, Rejection, ReturnOutcome,
};
pub use pricing::DEFAULT_HOME_CURRENCY;
pub use services::ReturnTicket;
pub use steps::{
    FanOutStep, FaultPolicy, ORDER_PIPELINE, OrderStep, POST_PAYMENT_FAN_OUT, WORKFLOW_TYPE,
};
