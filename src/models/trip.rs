// src/models/trip.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::supplier::Supplier;

/// One truckload collection run, identified by a human-assigned form number.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Trip {
    pub id: Uuid,
    pub date: NaiveDate,
    pub region: String,
    pub truck_no: String,
    pub form_no: String,
    pub driver_name: String,
    pub escort_name: String,
    pub prepared_by_name: Option<String>,
    pub prepared_by_position: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line item within a trip: the animals collected from one supplier.
/// `total_animals` is a projection of `goats_count + sheep_count`; it is
/// recomputed on every write and never taken from the caller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TripAnimal {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub supplier_id: Uuid,
    pub mark: String,
    pub goats_count: i32,
    pub sheep_count: i32,
    pub total_animals: i32,
    pub created_at: DateTime<Utc>,
}

/// Line item joined with its supplier; `supplier` is `None` when the
/// reference dangles.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TripAnimalWithSupplier {
    #[serde(flatten)]
    pub animal: TripAnimal,
    pub supplier: Option<Supplier>,
}

/// A trip together with its full set of line items, ordered by creation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TripWithAnimals {
    #[serde(flatten)]
    pub trip: Trip,
    pub animals: Vec<TripAnimalWithSupplier>,
}

/// List-view row: trip fields plus its animal count sums, so the list view
/// does not have to fetch every trip's detail to show totals.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TripListEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub region: String,
    pub truck_no: String,
    pub form_no: String,
    pub driver_name: String,
    pub escort_name: String,
    pub prepared_by_name: Option<String>,
    pub prepared_by_position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_goats: i64,
    pub total_sheep: i64,
    pub total_animals: i64,
}

/// Trip header fields accepted on create.
#[derive(Debug, Clone)]
pub struct TripFields {
    pub date: NaiveDate,
    pub region: String,
    pub truck_no: String,
    pub form_no: String,
    pub driver_name: String,
    pub escort_name: String,
    pub prepared_by_name: Option<String>,
    pub prepared_by_position: Option<String>,
}

/// Partial trip header update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
    pub date: Option<NaiveDate>,
    pub region: Option<String>,
    pub truck_no: Option<String>,
    pub form_no: Option<String>,
    pub driver_name: Option<String>,
    pub escort_name: Option<String>,
    pub prepared_by_name: Option<String>,
    pub prepared_by_position: Option<String>,
}

/// A line item as submitted by the caller. The id, trip linkage, creation
/// timestamp and total are all assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTripAnimal {
    pub supplier_id: Uuid,
    pub mark: String,
    pub goats_count: i32,
    pub sheep_count: i32,
}

impl NewTripAnimal {
    pub fn total(&self) -> i32 {
        self.goats_count + self.sheep_count
    }
}
