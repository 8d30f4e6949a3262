// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::report::{SupplierDetailReport, SupplierReport},
};

/// Inclusive calendar-date bounds compared against each trip's date;
/// `region` is an exact match, absent means no filter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    #[param(example = "2024-03-01")]
    pub from: NaiveDate,
    #[param(example = "2024-03-31")]
    pub to: NaiveDate,
    #[param(example = "Manyara")]
    pub region: Option<String>,
}

// GET /api/reports/suppliers
#[utoipa::path(
    get,
    path = "/api/reports/suppliers",
    tag = "Reports",
    params(ReportQuery),
    responses((status = 200, description = "Rows, per-supplier roll-up and grand totals", body = SupplierReport)),
    security(("api_jwt" = []))
)]
pub async fn supplier_report(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SupplierReport>, AppError> {
    let report = app_state
        .report_service
        .cross_supplier(query.from, query.to, query.region.as_deref())
        .await?;
    Ok(Json(report))
}

// GET /api/reports/suppliers/{id}
#[utoipa::path(
    get,
    path = "/api/reports/suppliers/{id}",
    tag = "Reports",
    params(("id" = Uuid, Path, description = "Supplier id"), ReportQuery),
    responses(
        (status = 200, description = "Detail rows for one supplier, date descending", body = SupplierDetailReport),
        (status = 404, description = "Unknown supplier")
    ),
    security(("api_jwt" = []))
)]
pub async fn supplier_detail_report(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SupplierDetailReport>, AppError> {
    let report = app_state
        .report_service
        .supplier_detail(id, query.from, query.to)
        .await?;
    Ok(Json(report))
}
