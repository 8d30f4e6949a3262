// src/handlers/suppliers.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::supplier::{Supplier, SupplierFields, SupplierPatch},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Mwanga Livestock Traders")]
    pub name: String,

    #[schema(example = "+255 712 555 111")]
    pub phone: Option<String>,

    #[schema(example = "Manyara")]
    pub region: Option<String>,

    #[schema(example = "M1")]
    pub default_mark: Option<String>,
}

/// Absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub default_mark: Option<String>,
}

// GET /api/suppliers
#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "Suppliers",
    responses((status = 200, description = "Suppliers ordered by name", body = Vec<Supplier>)),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let suppliers = app_state.supplier_service.list().await?;
    Ok(Json(suppliers))
}

// GET /api/suppliers/{id}
#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "The supplier", body = Supplier),
        (status = 404, description = "Unknown id")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_supplier(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    let supplier = app_state.supplier_service.get(id).await?;
    Ok(Json(supplier))
}

// POST /api/suppliers
#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "Suppliers",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Supplier created", body = Supplier),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .supplier_service
        .create(
            SupplierFields {
                name: payload.name,
                phone: payload.phone,
                region: payload.region,
                default_mark: payload.default_mark,
            },
            user.actor(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// PUT /api/suppliers/{id}
#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = UpdateSupplierPayload,
    responses(
        (status = 200, description = "Supplier updated", body = Supplier),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Unknown id")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_supplier(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierPayload>,
) -> Result<Json<Supplier>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let supplier = app_state
        .supplier_service
        .update(
            id,
            SupplierPatch {
                name: payload.name,
                phone: payload.phone,
                region: payload.region,
                default_mark: payload.default_mark,
            },
            user.actor(),
        )
        .await?;

    Ok(Json(supplier))
}

// DELETE /api/suppliers/{id}
#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "Suppliers",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Supplier and its trip line items deleted"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Unknown id")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.supplier_service.delete(id, user.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
