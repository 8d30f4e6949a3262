// src/lib.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

/// Assembles the full application router. Split out of `main` so the
/// integration tests can drive the exact same routes.
pub fn router(app_state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout));

    // Everything else requires a bearer token.
    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route(
            "/api/suppliers",
            post(handlers::suppliers::create_supplier).get(handlers::suppliers::list_suppliers),
        )
        .route(
            "/api/suppliers/{id}",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        .route(
            "/api/trips",
            post(handlers::trips::create_trip).get(handlers::trips::list_trips),
        )
        .route(
            "/api/trips/{id}",
            get(handlers::trips::get_trip)
                .put(handlers::trips::update_trip)
                .delete(handlers::trips::delete_trip),
        )
        .route(
            "/api/trips/{id}/manifest.pdf",
            get(handlers::documents::trip_manifest_pdf),
        )
        .route("/api/reports/suppliers", get(handlers::reports::supplier_report))
        .route(
            "/api/reports/suppliers/export.csv",
            get(handlers::documents::supplier_report_csv),
        )
        .route(
            "/api/reports/suppliers/export.pdf",
            get(handlers::documents::supplier_report_pdf),
        )
        .route(
            "/api/reports/suppliers/{id}",
            get(handlers::reports::supplier_detail_report),
        )
        .route(
            "/api/reports/suppliers/{id}/export.csv",
            get(handlers::documents::supplier_detail_csv),
        )
        .route(
            "/api/reports/suppliers/{id}/export.pdf",
            get(handlers::documents::supplier_detail_pdf),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state)
}
