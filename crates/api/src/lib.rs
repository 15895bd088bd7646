//! HTTP API server for the order workflow engine.
//!
//! Exposes order, refund, return and product endpoints over the engine,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use common::Money;
use fulfillment::services::PromoValidation;
use fulfillment::{FulfillmentError, InMemoryCollaborators, OrderWorkflowEngine, ProductDetails};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub engine: OrderWorkflowEngine,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/products/{id}", get(routes::products::get))
        .route(
            "/products/{id}/availability",
            get(routes::products::availability),
        )
        .route(
            "/products/{id}/price",
            get(routes::products::price).put(routes::products::update_price),
        )
        .route("/products/{id}/discount", post(routes::products::discount))
        .route("/products/{id}/quote", post(routes::products::quote))
        .route("/products/{id}/stock", post(routes::products::add_stock))
        .route("/orders", post(routes::orders::place))
        .route("/orders/digital", post(routes::orders::place_digital))
        .route("/refunds", post(routes::orders::refund))
        .route("/returns", post(routes::orders::request_return))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state backed by in-memory collaborators.
///
/// The collaborators are returned alongside the state so callers can seed or
/// inspect them.
pub fn create_default_state(
    config: &Config,
) -> Result<(Arc<AppState>, InMemoryCollaborators), FulfillmentError> {
    let services = InMemoryCollaborators::new();
    seed_demo_catalog(&services);

    let engine = services
        .engine_builder()
        .home_currency(config.home_currency.clone())
        .build()?;

    Ok((Arc::new(AppState { engine }), services))
}

/// Fills the in-memory catalog and promo desk with a small demo assortment.
pub fn seed_demo_catalog(services: &InMemoryCollaborators) {
    services.catalog.add_product(
        ProductDetails::new("LAPTOP-15", "15\" Laptop", Money::from_cents(99_999)).returnable(),
        25,
    );
    services.catalog.add_product(
        ProductDetails::new("MOUSE-WL", "Wireless Mouse", Money::from_cents(2_490)).returnable(),
        200,
    );
    services.catalog.add_product(
        ProductDetails::new("HEADSET-PRO", "Studio Headset", Money::from_cents(14_900)),
        3,
    );
    services.catalog.add_product(
        ProductDetails::new("EBOOK-RUST", "Rust in Practice (e-book)", Money::from_cents(2_900))
            .digital(),
        0,
    );

    services
        .promo
        .add_code("WELCOME10", PromoValidation::valid(10.0));
    services
        .promo
        .add_code("SPRING25", PromoValidation::valid(25.0));
    services
        .promo
        .add_code("WINTER23", PromoValidation::invalid());
}
