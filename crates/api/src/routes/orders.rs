//! Order, digital order, refund and return endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::{ProductId, TransactionId};
use fulfillment::{CardDetails, CustomerInfo, GiftOptions, OrderRequest};
use serde::{Deserialize, Serialize};

use super::OutcomeBody;
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CustomerBody {
    pub id: String,
    pub email: String,
    pub address: String,
}

impl From<CustomerBody> for CustomerInfo {
    fn from(body: CustomerBody) -> Self {
        CustomerInfo::new(body.id, body.email, body.address)
    }
}

/// A physical order. `quantity` must be a JSON integer.
#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub product_id: String,
    pub quantity: i64,
    pub card: String,
    pub customer: CustomerBody,
    pub gift_options: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct DigitalOrderRequest {
    pub product_id: String,
    pub card: String,
    pub customer: CustomerBody,
}

#[derive(Deserialize)]
pub struct RefundRequest {
    pub product_id: String,
    pub quantity: i64,
    pub transaction_id: String,
}

#[derive(Deserialize)]
pub struct ReturnRequest {
    pub product_id: String,
    pub transaction_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderPlacedResponse {
    pub transaction_id: String,
    pub total_paid_cents: i64,
}

#[derive(Serialize)]
pub struct DigitalOrderResponse {
    pub transaction_id: String,
    pub download_link: String,
}

#[derive(Serialize)]
pub struct RefundResponse {
    pub transaction_id: String,
    pub amount_cents: i64,
}

#[derive(Serialize)]
pub struct ReturnResponse {
    pub rma_ticket: String,
}

// -- Handlers --

/// POST /orders: run the full order pipeline.
#[tracing::instrument(skip(state, req), fields(product_id = %req.product_id))]
pub async fn place(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<OutcomeBody<OrderPlacedResponse>>, ApiError> {
    let mut request = OrderRequest::new(
        req.product_id,
        req.quantity,
        CardDetails::new(req.card),
        req.customer.into(),
    );
    if let Some(options) = req.gift_options {
        request = request.with_gift_options(GiftOptions::new(options));
    }

    let outcome = state.engine.process_order(&request).await?;

    Ok(Json(OutcomeBody::from_outcome(outcome, |receipt| {
        OrderPlacedResponse {
            transaction_id: receipt.transaction_id.to_string(),
            total_paid_cents: receipt.total_paid.cents(),
        }
    })))
}

/// POST /orders/digital: sell a download.
#[tracing::instrument(skip(state, req), fields(product_id = %req.product_id))]
pub async fn place_digital(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DigitalOrderRequest>,
) -> Result<Json<OutcomeBody<DigitalOrderResponse>>, ApiError> {
    let customer: CustomerInfo = req.customer.into();
    let outcome = state
        .engine
        .process_digital_order(
            &ProductId::new(req.product_id),
            &CardDetails::new(req.card),
            &customer,
        )
        .await?;

    Ok(Json(OutcomeBody::from_outcome(outcome, |delivery| {
        DigitalOrderResponse {
            transaction_id: delivery.transaction_id.to_string(),
            download_link: delivery.download_link,
        }
    })))
}

/// POST /refunds: refund units against an earlier transaction.
#[tracing::instrument(skip(state, req), fields(transaction_id = %req.transaction_id))]
pub async fn refund(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<OutcomeBody<RefundResponse>>, ApiError> {
    let outcome = state
        .engine
        .process_refund(
            &ProductId::new(req.product_id),
            req.quantity,
            &TransactionId::new(req.transaction_id),
        )
        .await?;

    Ok(Json(OutcomeBody::from_outcome(outcome, |receipt| {
        RefundResponse {
            transaction_id: receipt.transaction_id.to_string(),
            amount_cents: receipt.amount.cents(),
        }
    })))
}

/// POST /returns: open a return authorization.
#[tracing::instrument(skip(state, req), fields(transaction_id = %req.transaction_id))]
pub async fn request_return(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<OutcomeBody<ReturnResponse>>, ApiError> {
    let outcome = state
        .engine
        .request_return(
            &ProductId::new(req.product_id),
            &TransactionId::new(req.transaction_id),
        )
        .await?;

    Ok(Json(OutcomeBody::from_outcome(outcome, |ticket| {
        ReturnResponse {
            rma_ticket: ticket.to_string(),
        }
    })))
}
