// src/models/supplier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A livestock supplier. `default_mark` is the ear-mark code pre-filled on
/// trip line items entered for this supplier.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub default_mark: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Field set accepted when creating a supplier.
#[derive(Debug, Clone)]
pub struct SupplierFields {
    pub name: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub default_mark: Option<String>,
}

/// Partial update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub default_mark: Option<String>,
}
