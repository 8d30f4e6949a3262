// src/handlers/documents.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::reports::ReportQuery,
    services::csv_service,
};

const PDF_CONTENT_TYPE: &str = "application/pdf";
const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

fn download(content_type: &str, filename: &str, body: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    (headers, body).into_response()
}

// GET /api/trips/{id}/manifest.pdf
#[utoipa::path(
    get,
    path = "/api/trips/{id}/manifest.pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "Trip manifest PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Unknown trip")
    ),
    security(("api_jwt" = []))
)]
pub async fn trip_manifest_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let trip = app_state.trip_service.get(id).await?;
    let pdf = app_state.document_service.trip_manifest(&trip)?;
    let filename = format!("Trip-{}.pdf", trip.trip.form_no);
    Ok(download(PDF_CONTENT_TYPE, &filename, pdf))
}

// GET /api/reports/suppliers/export.csv
#[utoipa::path(
    get,
    path = "/api/reports/suppliers/export.csv",
    tag = "Documents",
    params(ReportQuery),
    responses((status = 200, description = "Cross-supplier summary CSV", body = String, content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn supplier_report_csv(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let report = app_state
        .report_service
        .cross_supplier(query.from, query.to, query.region.as_deref())
        .await?;
    let csv = csv_service::summary_csv(&report.summary)?;
    let filename = format!("supplier-report-{}-{}.csv", query.from, query.to);
    Ok(download(CSV_CONTENT_TYPE, &filename, csv.into_bytes()))
}

// GET /api/reports/suppliers/export.pdf
#[utoipa::path(
    get,
    path = "/api/reports/suppliers/export.pdf",
    tag = "Documents",
    params(ReportQuery),
    responses((status = 200, description = "Cross-supplier summary PDF", body = Vec<u8>, content_type = "application/pdf")),
    security(("api_jwt" = []))
)]
pub async fn supplier_report_pdf(
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    // The renderer groups the raw rows itself; handing it the flat rows
    // keeps that path independent of the aggregator's roll-up.
    let report = app_state
        .report_service
        .cross_supplier(query.from, query.to, query.region.as_deref())
        .await?;
    let pdf = app_state.document_service.supplier_summary(
        &report.rows,
        query.from,
        query.to,
        query.region.as_deref(),
    )?;
    let filename = format!("supplier-report-{}-{}.pdf", query.from, query.to);
    Ok(download(PDF_CONTENT_TYPE, &filename, pdf))
}

// GET /api/reports/suppliers/{id}/export.csv
#[utoipa::path(
    get,
    path = "/api/reports/suppliers/{id}/export.csv",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Supplier id"), ReportQuery),
    responses(
        (status = 200, description = "Single-supplier detail CSV", body = String, content_type = "text/csv"),
        (status = 404, description = "Unknown supplier")
    ),
    security(("api_jwt" = []))
)]
pub async fn supplier_detail_csv(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let report = app_state
        .report_service
        .supplier_detail(id, query.from, query.to)
        .await?;
    let csv = csv_service::detail_csv(&report.rows)?;
    let filename = format!(
        "supplier-{}-{}-{}.csv",
        report.supplier_name, query.from, query.to
    );
    Ok(download(CSV_CONTENT_TYPE, &filename, csv.into_bytes()))
}

// GET /api/reports/suppliers/{id}/export.pdf
#[utoipa::path(
    get,
    path = "/api/reports/suppliers/{id}/export.pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Supplier id"), ReportQuery),
    responses(
        (status = 200, description = "Single-supplier detail PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Unknown supplier")
    ),
    security(("api_jwt" = []))
)]
pub async fn supplier_detail_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let report = app_state
        .report_service
        .supplier_detail(id, query.from, query.to)
        .await?;
    let pdf = app_state.document_service.supplier_detail(
        &report.supplier_name,
        &report.rows,
        query.from,
        query.to,
    )?;
    let filename = format!(
        "supplier-{}-{}-{}.pdf",
        report.supplier_name, query.from, query.to
    );
    Ok(download(PDF_CONTENT_TYPE, &filename, pdf))
}
