//! Product lookup, pricing and stock endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{Money, ProductId};
use fulfillment::ProductDetails;
use serde::{Deserialize, Serialize};

use super::OutcomeBody;
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyQuery {
    pub currency: String,
}

#[derive(Deserialize)]
pub struct DiscountRequest {
    pub percentage: f64,
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub promo_code: String,
}

#[derive(Deserialize)]
pub struct AddStockRequest {
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct UpdatePriceRequest {
    pub price_cents: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub price_cents: Option<i64>,
    pub is_digital: bool,
    pub is_returnable: bool,
}

impl From<ProductDetails> for ProductResponse {
    fn from(product: ProductDetails) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            price_cents: product.price.map(|p| p.cents()),
            is_digital: product.is_digital,
            is_returnable: product.is_returnable,
        }
    }
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub product_id: String,
    pub quantity: i64,
    pub available: bool,
}

#[derive(Serialize)]
pub struct PriceResponse {
    pub product_id: String,
    pub currency: String,
    /// `None` when the product is unknown, unpriced or no rate exists.
    pub price_cents: Option<i64>,
}

#[derive(Serialize)]
pub struct DiscountResponse {
    pub product_id: String,
    pub percentage: f64,
    pub discounted_price_cents: Option<i64>,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub new_price_cents: i64,
}

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: String,
    pub added: u32,
}

#[derive(Serialize)]
pub struct PriceUpdatedResponse {
    pub product_id: String,
    pub price_cents: i64,
}

// -- Handlers --

/// GET /products/{id}: catalog entry of a product.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .engine
        .get_product_info(&ProductId::new(id.as_str()))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {id}")))?;

    Ok(Json(product.into()))
}

/// GET /products/{id}/availability?quantity=n
#[tracing::instrument(skip(state))]
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let available = state
        .engine
        .check_availability(&product_id, query.quantity)
        .await?;

    Ok(Json(AvailabilityResponse {
        product_id: product_id.to_string(),
        quantity: query.quantity,
        available,
    }))
}

/// GET /products/{id}/price?currency=USD
#[tracing::instrument(skip(state))]
pub async fn price(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<CurrencyQuery>,
) -> Result<Json<PriceResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let price = state
        .engine
        .price_in_currency(&product_id, &query.currency)
        .await?;

    Ok(Json(PriceResponse {
        product_id: product_id.to_string(),
        currency: query.currency.trim().to_ascii_uppercase(),
        price_cents: price.map(|p| p.cents()),
    }))
}

/// POST /products/{id}/discount: catalog price after a percentage discount.
#[tracing::instrument(skip(state, req))]
pub async fn discount(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<DiscountRequest>,
) -> Result<Json<DiscountResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let discounted = state
        .engine
        .apply_discount(&product_id, req.percentage)
        .await?;

    Ok(Json(DiscountResponse {
        product_id: product_id.to_string(),
        percentage: req.percentage,
        discounted_price_cents: discounted.map(|p| p.cents()),
    }))
}

/// POST /products/{id}/quote: unit price after a promo code.
#[tracing::instrument(skip(state, req))]
pub async fn quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<OutcomeBody<QuoteResponse>>, ApiError> {
    let outcome = state
        .engine
        .quote_with_promo_code(&ProductId::new(id), &req.promo_code)
        .await?;

    Ok(Json(OutcomeBody::from_outcome(outcome, |price| {
        QuoteResponse {
            new_price_cents: price.cents(),
        }
    })))
}

/// POST /products/{id}/stock: add units to the inventory.
#[tracing::instrument(skip(state, req))]
pub async fn add_stock(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddStockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let product_id = ProductId::new(id);
    let added = state.engine.add_stock(&product_id, req.quantity).await?;

    Ok(Json(StockResponse {
        product_id: product_id.to_string(),
        added: added.get(),
    }))
}

/// PUT /products/{id}/price: replace the catalog price.
#[tracing::instrument(skip(state, req))]
pub async fn update_price(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePriceRequest>,
) -> Result<Json<PriceUpdatedResponse>, ApiError> {
    let product_id = ProductId::new(id);
    state
        .engine
        .update_product_price(&product_id, Money::from_cents(req.price_cents))
        .await?;

    Ok(Json(PriceUpdatedResponse {
        product_id: product_id.to_string(),
        price_cents: req.price_cents,
    }))
}
