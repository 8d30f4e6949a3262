// src/handlers/trips.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::trip::{
        NewTripAnimal, TripFields, TripListEntry, TripPatch, TripWithAnimals,
    },
};

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct TripAnimalPayload {
    pub supplier_id: Uuid,

    /// Blank means "use the supplier's default mark".
    #[serde(default)]
    #[schema(example = "M1")]
    pub mark: String,

    #[validate(range(min = 0, message = "must be non-negative"))]
    pub goats_count: i32,

    #[validate(range(min = 0, message = "must be non-negative"))]
    pub sheep_count: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTripPayload {
    #[schema(example = "2024-03-05")]
    pub date: NaiveDate,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Manyara")]
    pub region: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "T 456 DEF")]
    pub truck_no: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "F-002")]
    pub form_no: String,

    #[validate(length(min = 1, message = "required"))]
    pub driver_name: String,

    #[validate(length(min = 1, message = "required"))]
    pub escort_name: String,

    pub prepared_by_name: Option<String>,
    pub prepared_by_position: Option<String>,

    #[validate(length(min = 1, message = "at least one line item is required"), nested)]
    pub animals: Vec<TripAnimalPayload>,
}

/// Header fields are partial; the line items are always the full
/// replacement set.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTripPayload {
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "required"))]
    pub region: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub truck_no: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub form_no: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub driver_name: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub escort_name: Option<String>,
    pub prepared_by_name: Option<String>,
    pub prepared_by_position: Option<String>,

    #[validate(length(min = 1, message = "at least one line item is required"), nested)]
    pub animals: Vec<TripAnimalPayload>,
}

fn to_new_animals(animals: Vec<TripAnimalPayload>) -> Vec<NewTripAnimal> {
    animals
        .into_iter()
        .map(|a| NewTripAnimal {
            supplier_id: a.supplier_id,
            mark: a.mark,
            goats_count: a.goats_count,
            sheep_count: a.sheep_count,
        })
        .collect()
}

// GET /api/trips
#[utoipa::path(
    get,
    path = "/api/trips",
    tag = "Trips",
    responses((status = 200, description = "Trips ordered by date descending, with totals", body = Vec<TripListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_trips(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<TripListEntry>>, AppError> {
    let trips = app_state.trip_service.list().await?;
    Ok(Json(trips))
}

// GET /api/trips/{id}
#[utoipa::path(
    get,
    path = "/api/trips/{id}",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "Trip with its line items", body = TripWithAnimals),
        (status = 404, description = "Unknown id")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_trip(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TripWithAnimals>, AppError> {
    let trip = app_state.trip_service.get(id).await?;
    Ok(Json(trip))
}

// POST /api/trips
#[utoipa::path(
    post,
    path = "/api/trips",
    tag = "Trips",
    request_body = CreateTripPayload,
    responses(
        (status = 201, description = "Trip and line items created together", body = TripWithAnimals),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_trip(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTripPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let trip = app_state
        .trip_service
        .create(
            TripFields {
                date: payload.date,
                region: payload.region,
                truck_no: payload.truck_no,
                form_no: payload.form_no,
                driver_name: payload.driver_name,
                escort_name: payload.escort_name,
                prepared_by_name: payload.prepared_by_name,
                prepared_by_position: payload.prepared_by_position,
            },
            to_new_animals(payload.animals),
            user.actor(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(trip)))
}

// PUT /api/trips/{id}
#[utoipa::path(
    put,
    path = "/api/trips/{id}",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    request_body = UpdateTripPayload,
    responses(
        (status = 200, description = "Trip updated, line items replaced", body = TripWithAnimals),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Unknown id")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_trip(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTripPayload>,
) -> Result<Json<TripWithAnimals>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let trip = app_state
        .trip_service
        .update(
            id,
            TripPatch {
                date: payload.date,
                region: payload.region,
                truck_no: payload.truck_no,
                form_no: payload.form_no,
                driver_name: payload.driver_name,
                escort_name: payload.escort_name,
                prepared_by_name: payload.prepared_by_name,
                prepared_by_position: payload.prepared_by_position,
            },
            to_new_animals(payload.animals),
            user.actor(),
        )
        .await?;

    Ok(Json(trip))
}

// DELETE /api/trips/{id}
#[utoipa::path(
    delete,
    path = "/api/trips/{id}",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 204, description = "Trip and its line items deleted"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "Unknown id")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_trip(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.trip_service.delete(id, user.actor()).await?;
    Ok(StatusCode::NO_CONTENT)
}
