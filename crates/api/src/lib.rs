//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for sales and their items
//! - Request validation
//! - Error to HTTP response mapping

pub mod error;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use salesdesk_core::sales::{DiscountPolicy, SaleService, discount_policy_from_settings};
use salesdesk_db::SaleRepository;
use salesdesk_shared::SalesConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Discount policy attached to every sale.
    pub discount_policy: Option<Arc<dyn DiscountPolicy>>,
    /// Page size used when a list request omits `per_page`.
    pub default_page_size: u32,
}

impl AppState {
    /// Builds the state from a connection and the sales configuration.
    pub fn new(db: DatabaseConnection, sales: &SalesConfig) -> Self {
        Self {
            db: Arc::new(db),
            discount_policy: discount_policy_from_settings(&sales.discount_policy),
            default_page_size: sales.default_page_size,
        }
    }

    /// A sale service over the shared connection.
    pub fn sale_service(&self) -> SaleService<SaleRepository> {
        SaleService::new(
            SaleRepository::new((*self.db).clone()),
            self.discount_policy.clone(),
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
