// src/db/local_store.rs

use std::{
    fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::Store,
    models::{
        auth::User,
        report::{DetailRow, ReportRow, UNKNOWN_SUPPLIER},
        supplier::{Supplier, SupplierFields, SupplierPatch},
        trip::{
            NewTripAnimal, Trip, TripAnimal, TripAnimalWithSupplier, TripFields, TripListEntry,
            TripPatch, TripWithAnimals,
        },
    },
};

pub const DEMO_USER_EMAIL: &str = "demo@tanchoice.com";

/// The whole offline database: a single JSON document with three arrays.
/// It is read fully into memory on startup and rewritten fully after every
/// mutation.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    suppliers: Vec<Supplier>,
    trips: Vec<Trip>,
    #[serde(rename = "tripAnimals")]
    trip_animals: Vec<TripAnimal>,
}

fn seed_snapshot() -> Snapshot {
    Snapshot {
        suppliers: vec![
            Supplier {
                id: Uuid::new_v4(),
                name: "Mwanga Livestock Traders".to_string(),
                phone: Some("+255 712 555 111".to_string()),
                region: Some("Manyara".to_string()),
                default_mark: Some("M1".to_string()),
                created_at: Utc::now(),
            },
            Supplier {
                id: Uuid::new_v4(),
                name: "Kilimanjaro Goats".to_string(),
                phone: Some("+255 713 222 444".to_string()),
                region: Some("Arusha".to_string()),
                default_mark: Some("KG".to_string()),
                created_at: Utc::now(),
            },
        ],
        trips: Vec::new(),
        trip_animals: Vec::new(),
    }
}

/// Offline/demo store: the in-memory snapshot plays the role of the
/// database, persisted as one JSON file. Mutations read-modify-write the
/// whole snapshot behind a mutex; the later of two racing writes wins.
pub struct LocalStore {
    path: PathBuf,
    state: Mutex<Snapshot>,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Snapshot>(&raw) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Failed to parse snapshot {}, resetting: {}", path.display(), e);
                    seed_snapshot()
                }
            },
            Err(_) => seed_snapshot(),
        };
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        // A poisoned lock still holds a usable snapshot.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Writes the entire snapshot back to disk. No partial writes: the file
    /// always holds a complete database.
    fn persist(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(snapshot)
            .map_err(|e| AppError::StorageError(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| AppError::StorageError(e.to_string()))
    }

    fn demo_user(email: &str) -> User {
        User {
            id: Uuid::nil(),
            email: if email.is_empty() {
                DEMO_USER_EMAIL.to_string()
            } else {
                email.to_string()
            },
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// Joins a trip with its line items, recomputing each total on the way out
/// rather than trusting the stored value.
fn enrich(snapshot: &Snapshot, trip: &Trip) -> TripWithAnimals {
    let mut animals: Vec<&TripAnimal> = snapshot
        .trip_animals
        .iter()
        .filter(|a| a.trip_id == trip.id)
        .collect();
    animals.sort_by_key(|a| a.created_at);

    let animals = animals
        .into_iter()
        .map(|a| TripAnimalWithSupplier {
            animal: TripAnimal {
                total_animals: a.goats_count + a.sheep_count,
                ..a.clone()
            },
            supplier: snapshot.suppliers.iter().find(|s| s.id == a.supplier_id).cloned(),
        })
        .collect();

    TripWithAnimals {
        trip: trip.clone(),
        animals,
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        let snapshot = self.lock();
        let mut suppliers = snapshot.suppliers.clone();
        suppliers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: Uuid) -> Result<Supplier, AppError> {
        let snapshot = self.lock();
        snapshot
            .suppliers
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(AppError::SupplierNotFound)
    }

    async fn create_supplier(
        &self,
        fields: SupplierFields,
        _actor: Option<Uuid>,
    ) -> Result<Supplier, AppError> {
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: fields.name,
            phone: fields.phone,
            region: fields.region,
            default_mark: fields.default_mark,
            created_at: Utc::now(),
        };
        let mut snapshot = self.lock();
        snapshot.suppliers.push(supplier.clone());
        self.persist(&snapshot)?;
        Ok(supplier)
    }

    async fn update_supplier(
        &self,
        id: Uuid,
        patch: SupplierPatch,
        _actor: Option<Uuid>,
    ) -> Result<Supplier, AppError> {
        let mut snapshot = self.lock();
        let supplier = snapshot
            .suppliers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AppError::SupplierNotFound)?;

        if let Some(name) = patch.name {
            supplier.name = name;
        }
        if let Some(phone) = patch.phone {
            supplier.phone = Some(phone);
        }
        if let Some(region) = patch.region {
            supplier.region = Some(region);
        }
        if let Some(default_mark) = patch.default_mark {
            supplier.default_mark = Some(default_mark);
        }
        let updated = supplier.clone();

        self.persist(&snapshot)?;
        Ok(updated)
    }

    async fn delete_supplier(&self, id: Uuid, _actor: Option<Uuid>) -> Result<(), AppError> {
        let mut snapshot = self.lock();
        if !snapshot.suppliers.iter().any(|s| s.id == id) {
            return Err(AppError::SupplierNotFound);
        }
        snapshot.suppliers.retain(|s| s.id != id);
        // Cascade: drop every line item that referenced this supplier.
        snapshot.trip_animals.retain(|a| a.supplier_id != id);
        self.persist(&snapshot)
    }

    async fn list_trips(&self) -> Result<Vec<TripListEntry>, AppError> {
        let snapshot = self.lock();
        let mut entries: Vec<TripListEntry> = snapshot
            .trips
            .iter()
            .map(|trip| {
                let (mut goats, mut sheep) = (0i64, 0i64);
                for animal in snapshot.trip_animals.iter().filter(|a| a.trip_id == trip.id) {
                    goats += i64::from(animal.goats_count);
                    sheep += i64::from(animal.sheep_count);
                }
                TripListEntry {
                    id: trip.id,
                    date: trip.date,
                    region: trip.region.clone(),
                    truck_no: trip.truck_no.clone(),
                    form_no: trip.form_no.clone(),
                    driver_name: trip.driver_name.clone(),
                    escort_name: trip.escort_name.clone(),
                    prepared_by_name: trip.prepared_by_name.clone(),
                    prepared_by_position: trip.prepared_by_position.clone(),
                    created_at: trip.created_at,
                    total_goats: goats,
                    total_sheep: sheep,
                    total_animals: goats + sheep,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    async fn get_trip(&self, id: Uuid) -> Result<TripWithAnimals, AppError> {
        let snapshot = self.lock();
        let trip = snapshot
            .trips
            .iter()
            .find(|t| t.id == id)
            .ok_or(AppError::TripNotFound)?;
        Ok(enrich(&snapshot, trip))
    }

    async fn create_trip(
        &self,
        fields: TripFields,
        animals: Vec<NewTripAnimal>,
        _actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError> {
        let trip = Trip {
            id: Uuid::new_v4(),
            date: fields.date,
            region: fields.region,
            truck_no: fields.truck_no,
            form_no: fields.form_no,
            driver_name: fields.driver_name,
            escort_name: fields.escort_name,
            prepared_by_name: fields.prepared_by_name,
            prepared_by_position: fields.prepared_by_position,
            created_at: Utc::now(),
        };

        let mut snapshot = self.lock();
        for animal in animals {
            snapshot.trip_animals.push(TripAnimal {
                id: Uuid::new_v4(),
                trip_id: trip.id,
                supplier_id: animal.supplier_id,
                mark: animal.mark.clone(),
                goats_count: animal.goats_count,
                sheep_count: animal.sheep_count,
                total_animals: animal.total(),
                created_at: Utc::now(),
            });
        }
        snapshot.trips.push(trip.clone());
        self.persist(&snapshot)?;
        Ok(enrich(&snapshot, &trip))
    }

    async fn update_trip(
        &self,
        id: Uuid,
        patch: TripPatch,
        animals: Vec<NewTripAnimal>,
        _actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError> {
        let mut snapshot = self.lock();
        let trip = snapshot
            .trips
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(AppError::TripNotFound)?;

        if let Some(date) = patch.date {
            trip.date = date;
        }
        if let Some(region) = patch.region {
            trip.region = region;
        }
        if let Some(truck_no) = patch.truck_no {
            trip.truck_no = truck_no;
        }
        if let Some(form_no) = patch.form_no {
            trip.form_no = form_no;
        }
        if let Some(driver_name) = patch.driver_name {
            trip.driver_name = driver_name;
        }
        if let Some(escort_name) = patch.escort_name {
            trip.escort_name = escort_name;
        }
        if let Some(prepared_by_name) = patch.prepared_by_name {
            trip.prepared_by_name = Some(prepared_by_name);
        }
        if let Some(prepared_by_position) = patch.prepared_by_position {
            trip.prepared_by_position = Some(prepared_by_position);
        }
        let updated = trip.clone();

        // Replace-all: the previous line items are gone, only the submitted
        // set remains.
        snapshot.trip_animals.retain(|a| a.trip_id != id);
        for animal in animals {
            snapshot.trip_animals.push(TripAnimal {
                id: Uuid::new_v4(),
                trip_id: id,
                supplier_id: animal.supplier_id,
                mark: animal.mark.clone(),
                goats_count: animal.goats_count,
                sheep_count: animal.sheep_count,
                total_animals: animal.total(),
                created_at: Utc::now(),
            });
        }

        self.persist(&snapshot)?;
        Ok(enrich(&snapshot, &updated))
    }

    async fn delete_trip(&self, id: Uuid, _actor: Option<Uuid>) -> Result<(), AppError> {
        let mut snapshot = self.lock();
        if !snapshot.trips.iter().any(|t| t.id == id) {
            return Err(AppError::TripNotFound);
        }
        snapshot.trips.retain(|t| t.id != id);
        snapshot.trip_animals.retain(|a| a.trip_id != id);
        self.persist(&snapshot)
    }

    async fn report_rows(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        region: Option<&str>,
    ) -> Result<Vec<ReportRow>, AppError> {
        let snapshot = self.lock();
        let rows = snapshot
            .trip_animals
            .iter()
            .filter_map(|animal| {
                // A line item whose parent trip is gone is dropped, never an error.
                let trip = snapshot.trips.iter().find(|t| t.id == animal.trip_id)?;
                if trip.date < from || trip.date > to {
                    return None;
                }
                if let Some(region) = region {
                    if trip.region != region {
                        return None;
                    }
                }
                let supplier_name = snapshot
                    .suppliers
                    .iter()
                    .find(|s| s.id == animal.supplier_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| UNKNOWN_SUPPLIER.to_string());
                Some(ReportRow {
                    supplier_id: animal.supplier_id,
                    supplier_name,
                    date: trip.date,
                    region: trip.region.clone(),
                    truck_no: trip.truck_no.clone(),
                    form_no: trip.form_no.clone(),
                    goats_count: animal.goats_count,
                    sheep_count: animal.sheep_count,
                    total_animals: animal.goats_count + animal.sheep_count,
                })
            })
            .collect();
        Ok(rows)
    }

    async fn supplier_report_rows(
        &self,
        supplier_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DetailRow>, AppError> {
        let snapshot = self.lock();
        let mut rows: Vec<DetailRow> = snapshot
            .trip_animals
            .iter()
            .filter(|a| a.supplier_id == supplier_id)
            .filter_map(|animal| {
                let trip = snapshot.trips.iter().find(|t| t.id == animal.trip_id)?;
                if trip.date < from || trip.date > to {
                    return None;
                }
                Some(DetailRow {
                    date: trip.date,
                    region: trip.region.clone(),
                    truck_no: trip.truck_no.clone(),
                    form_no: trip.form_no.clone(),
                    goats_count: animal.goats_count,
                    sheep_count: animal.sheep_count,
                    total_animals: animal.goats_count + animal.sheep_count,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn verify_credentials(&self, email: &str, _password: &str) -> Result<User, AppError> {
        // Demo mode: any credentials sign in as the demo user.
        Ok(Self::demo_user(email))
    }

    async fn create_user(&self, email: &str, _password: &str) -> Result<User, AppError> {
        Ok(Self::demo_user(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, region: Option<&str>, mark: Option<&str>) -> SupplierFields {
        SupplierFields {
            name: name.to_string(),
            phone: None,
            region: region.map(str::to_string),
            default_mark: mark.map(str::to_string),
        }
    }

    fn trip_fields(date: NaiveDate, region: &str) -> TripFields {
        TripFields {
            date,
            region: region.to_string(),
            truck_no: "T 123 ABC".to_string(),
            form_no: "F-001".to_string(),
            driver_name: "Juma".to_string(),
            escort_name: "Asha".to_string(),
            prepared_by_name: None,
            prepared_by_position: None,
        }
    }

    fn row(supplier_id: Uuid, goats: i32, sheep: i32) -> NewTripAnimal {
        NewTripAnimal {
            supplier_id,
            mark: "M1".to_string(),
            goats_count: goats,
            sheep_count: sheep,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn missing_file_starts_from_seed() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("db.json"));
        let suppliers = store.list_suppliers().await.unwrap();
        assert_eq!(suppliers.len(), 2);
        // Ordered by name ascending.
        assert_eq!(suppliers[0].name, "Kilimanjaro Goats");
        assert_eq!(suppliers[1].name, "Mwanga Livestock Traders");
    }

    #[tokio::test]
    async fn corrupt_file_is_replaced_by_seed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{not json").unwrap();
        let store = LocalStore::new(&path);
        assert_eq!(store.list_suppliers().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        {
            let store = LocalStore::new(&path);
            store
                .create_supplier(fields("Simanjiro Herders", Some("Manyara"), Some("SH")), None)
                .await
                .unwrap();
        }
        let reopened = LocalStore::new(&path);
        let suppliers = reopened.list_suppliers().await.unwrap();
        assert!(suppliers.iter().any(|s| s.name == "Simanjiro Herders"));
    }

    #[tokio::test]
    async fn trip_totals_are_recomputed_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("db.json"));
        let supplier = store
            .create_supplier(fields("S1", None, None), None)
            .await
            .unwrap();
        let trip = store
            .create_trip(
                trip_fields(date(2024, 3, 5), "Manyara"),
                vec![row(supplier.id, 3, 2)],
                None,
            )
            .await
            .unwrap();
        assert_eq!(trip.animals.len(), 1);
        assert_eq!(trip.animals[0].animal.total_animals, 5);
    }

    #[tokio::test]
    async fn trip_update_replaces_all_line_items() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("db.json"));
        let s1 = store.create_supplier(fields("S1", None, None), None).await.unwrap();
        let s2 = store.create_supplier(fields("S2", None, None), None).await.unwrap();
        let trip = store
            .create_trip(
                trip_fields(date(2024, 3, 5), "Manyara"),
                vec![row(s1.id, 3, 2), row(s2.id, 1, 0)],
                None,
            )
            .await
            .unwrap();

        let updated = store
            .update_trip(trip.trip.id, TripPatch::default(), vec![row(s1.id, 0, 1)], None)
            .await
            .unwrap();
        assert_eq!(updated.animals.len(), 1);
        assert_eq!(updated.animals[0].animal.total_animals, 1);

        let refetched = store.get_trip(trip.trip.id).await.unwrap();
        assert_eq!(refetched.animals.len(), 1);
        assert_eq!(refetched.animals[0].animal.goats_count, 0);
        assert_eq!(refetched.animals[0].animal.sheep_count, 1);
    }

    #[tokio::test]
    async fn supplier_delete_cascades_to_line_items() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("db.json"));
        let s1 = store.create_supplier(fields("S1", None, None), None).await.unwrap();
        let s2 = store.create_supplier(fields("S2", None, None), None).await.unwrap();
        let trip = store
            .create_trip(
                trip_fields(date(2024, 3, 5), "Manyara"),
                vec![row(s1.id, 3, 2), row(s2.id, 1, 0)],
                None,
            )
            .await
            .unwrap();

        store.delete_supplier(s2.id, None).await.unwrap();

        let refetched = store.get_trip(trip.trip.id).await.unwrap();
        assert_eq!(refetched.animals.len(), 1);
        assert_eq!(refetched.animals[0].animal.supplier_id, s1.id);
    }

    #[tokio::test]
    async fn dangling_supplier_renders_as_unknown_in_reports() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("db.json"));
        let s1 = store.create_supplier(fields("S1", None, None), None).await.unwrap();
        let ghost = Uuid::new_v4();
        store
            .create_trip(
                trip_fields(date(2024, 3, 5), "Manyara"),
                vec![row(s1.id, 1, 1), row(ghost, 2, 0)],
                None,
            )
            .await
            .unwrap();

        let rows = store
            .report_rows(date(2024, 3, 1), date(2024, 3, 31), None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        let ghost_row = rows.iter().find(|r| r.supplier_id == ghost).unwrap();
        assert_eq!(ghost_row.supplier_name, UNKNOWN_SUPPLIER);
    }

    #[tokio::test]
    async fn missing_ids_fail_with_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("db.json"));
        assert!(matches!(
            store.get_trip(Uuid::new_v4()).await,
            Err(AppError::TripNotFound)
        ));
        assert!(matches!(
            store.delete_supplier(Uuid::new_v4(), None).await,
            Err(AppError::SupplierNotFound)
        ));
    }
}
