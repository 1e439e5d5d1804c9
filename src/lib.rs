//! ShipDesk API Library
//!
//! Shipping back office: customers, consolidated shipments, partial
//! shipments with packages and customs items, and the documents and exports
//! built from them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod common;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use ::tracing::{info, warn};
use axum::{http::HeaderValue, routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }

    pub fn customer_service(&self) -> Arc<services::customers::CustomerService> {
        self.services.customers.clone()
    }

    pub fn shipment_service(&self) -> Arc<services::shipments::ShipmentService> {
        self.services.shipments.clone()
    }

    pub fn partial_shipment_service(
        &self,
    ) -> Arc<services::partial_shipments::PartialShipmentService> {
        self.services.partial_shipments.clone()
    }

    pub fn document_service(&self) -> Arc<services::documents::DocumentService> {
        self.services.documents.clone()
    }

    pub fn export_service(&self) -> Arc<services::exports::ExportService> {
        self.services.exports.clone()
    }
}

/// Resource routes, mounted under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/customers", handlers::customers::customer_routes())
        .nest("/shipments", handlers::shipments::shipment_routes())
        .nest("/documents", handlers::documents::document_routes())
}

/// CORS from configuration: explicit origins, permissive in development or
/// when opted in, otherwise same-origin only.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

/// Full application router with health, OpenAPI and the `/api` tree.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::<AppState>::new()
        .route("/", get(|| async { "shipdesk-api up" }))
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes())
        .merge(openapi::openapi_routes::<AppState>())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
