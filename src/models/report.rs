// src/models/report.rs

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Fallback name rendered when a line item's supplier reference dangles.
pub const UNKNOWN_SUPPLIER: &str = "Unknown";

/// One cross-supplier report row: a line item denormalized with its
/// supplier name and parent-trip metadata. Line items whose parent trip
/// cannot be resolved never make it into a report.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReportRow {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub date: NaiveDate,
    pub region: String,
    pub truck_no: String,
    pub form_no: String,
    pub goats_count: i32,
    pub sheep_count: i32,
    pub total_animals: i32,
}

/// One single-supplier detail row, sorted by trip date descending.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct DetailRow {
    pub date: NaiveDate,
    pub region: String,
    pub truck_no: String,
    pub form_no: String,
    pub goats_count: i32,
    pub sheep_count: i32,
    pub total_animals: i32,
}

/// Per-supplier roll-up over a report period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SupplierSummary {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub total_goats: i64,
    pub total_sheep: i64,
    pub total_animals: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportTotals {
    pub goats: i64,
    pub sheep: i64,
    pub total: i64,
}

/// Cross-supplier report: the flat rows, the per-supplier roll-up, and the
/// grand totals across all suppliers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierReport {
    pub rows: Vec<ReportRow>,
    pub summary: Vec<SupplierSummary>,
    pub totals: ReportTotals,
}

/// Single-supplier detail report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierDetailReport {
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub rows: Vec<DetailRow>,
    pub totals: ReportTotals,
}
