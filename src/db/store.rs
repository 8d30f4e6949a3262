// src/db/store.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::User,
        report::{DetailRow, ReportRow},
        supplier::{Supplier, SupplierFields, SupplierPatch},
        trip::{NewTripAnimal, TripFields, TripListEntry, TripPatch, TripWithAnimals},
    },
};

/// The persistence gateway. Both backends (PostgreSQL and the local JSON
/// snapshot) implement this trait, so either is a drop-in choice made once
/// at startup.
///
/// Every mutation is durable before the call returns. `actor` is the
/// authenticated user stamped onto created records; the hosted store also
/// uses it to refuse writes against records owned by someone else.
#[async_trait]
pub trait Store: Send + Sync {
    // --- Suppliers ---

    /// All suppliers, ordered by name ascending.
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError>;

    async fn get_supplier(&self, id: Uuid) -> Result<Supplier, AppError>;

    async fn create_supplier(
        &self,
        fields: SupplierFields,
        actor: Option<Uuid>,
    ) -> Result<Supplier, AppError>;

    async fn update_supplier(
        &self,
        id: Uuid,
        patch: SupplierPatch,
        actor: Option<Uuid>,
    ) -> Result<Supplier, AppError>;

    /// Deletes the supplier and every trip line item referencing it, so no
    /// dangling references are left behind. The cascade holds in both
    /// backends.
    async fn delete_supplier(&self, id: Uuid, actor: Option<Uuid>) -> Result<(), AppError>;

    // --- Trips ---

    /// All trips ordered by date descending, each carrying its animal
    /// count sums for the list view.
    async fn list_trips(&self) -> Result<Vec<TripListEntry>, AppError>;

    /// A trip with its line items (creation order), each joined with its
    /// supplier when the reference resolves.
    async fn get_trip(&self, id: Uuid) -> Result<TripWithAnimals, AppError>;

    /// Persists the trip header and its line items together or not at all.
    async fn create_trip(
        &self,
        fields: TripFields,
        animals: Vec<NewTripAnimal>,
        actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError>;

    /// Updates the header and wholesale-replaces the line items: the prior
    /// set is removed and the submitted set inserted, as one unit.
    async fn update_trip(
        &self,
        id: Uuid,
        patch: TripPatch,
        animals: Vec<NewTripAnimal>,
        actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError>;

    /// Deletes the trip and all of its line items.
    async fn delete_trip(&self, id: Uuid, actor: Option<Uuid>) -> Result<(), AppError>;

    // --- Reports ---

    /// Line items whose parent trip's date falls within `[from, to]` and
    /// whose region matches (when given), denormalized with supplier name
    /// and trip metadata. Items with a missing parent trip are dropped; a
    /// missing supplier renders as "Unknown".
    async fn report_rows(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        region: Option<&str>,
    ) -> Result<Vec<ReportRow>, AppError>;

    /// Same filtering restricted to one supplier, sorted by trip date
    /// descending.
    async fn supplier_report_rows(
        &self,
        supplier_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DetailRow>, AppError>;

    // --- Sessions ---

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AppError>;

    async fn create_user(&self, email: &str, password: &str) -> Result<User, AppError>;
}
