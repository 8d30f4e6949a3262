// src/db/pg_store.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::Store,
    models::{
        auth::User,
        report::{DetailRow, ReportRow},
        supplier::{Supplier, SupplierFields, SupplierPatch},
        trip::{
            NewTripAnimal, Trip, TripAnimal, TripAnimalWithSupplier, TripFields, TripListEntry,
            TripPatch, TripWithAnimals,
        },
    },
};

const SUPPLIER_COLUMNS: &str = "id, name, phone, region, default_mark, created_at";
const TRIP_COLUMNS: &str = "id, date, region, truck_no, form_no, driver_name, escort_name, \
     prepared_by_name, prepared_by_position, created_at";

/// Hosted-store path: PostgreSQL behind the same gateway trait as the
/// offline snapshot. Records carry a `created_by` stamp; mutating a record
/// owned by a different user is refused, mirroring the row-level policies
/// of the hosted database this replaces.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Line item joined with its (possibly absent) supplier, flattened the way
/// the SQL returns it.
#[derive(FromRow)]
struct AnimalSupplierRow {
    id: Uuid,
    trip_id: Uuid,
    supplier_id: Uuid,
    mark: String,
    goats_count: i32,
    sheep_count: i32,
    total_animals: i32,
    created_at: DateTime<Utc>,
    s_id: Option<Uuid>,
    s_name: Option<String>,
    s_phone: Option<String>,
    s_region: Option<String>,
    s_default_mark: Option<String>,
    s_created_at: Option<DateTime<Utc>>,
}

impl From<AnimalSupplierRow> for TripAnimalWithSupplier {
    fn from(row: AnimalSupplierRow) -> Self {
        let supplier = match (row.s_id, row.s_name, row.s_created_at) {
            (Some(id), Some(name), Some(created_at)) => Some(Supplier {
                id,
                name,
                phone: row.s_phone,
                region: row.s_region,
                default_mark: row.s_default_mark,
                created_at,
            }),
            _ => None,
        };
        TripAnimalWithSupplier {
            animal: TripAnimal {
                id: row.id,
                trip_id: row.trip_id,
                supplier_id: row.supplier_id,
                mark: row.mark,
                goats_count: row.goats_count,
                sheep_count: row.sheep_count,
                total_animals: row.total_animals,
                created_at: row.created_at,
            },
            supplier,
        }
    }
}

fn ensure_owner(owner: Option<Uuid>, actor: Option<Uuid>) -> Result<(), AppError> {
    match (owner, actor) {
        (Some(owner), Some(actor)) if owner == actor => Ok(()),
        (Some(_), _) => Err(AppError::PermissionDenied),
        (None, _) => Ok(()),
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn supplier_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
        sqlx::query_scalar::<_, Option<Uuid>>("SELECT created_by FROM suppliers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::SupplierNotFound)
    }

    async fn trip_owner(&self, id: Uuid) -> Result<Option<Uuid>, AppError> {
        sqlx::query_scalar::<_, Option<Uuid>>("SELECT created_by FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::TripNotFound)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(suppliers)
    }

    async fn get_supplier(&self, id: Uuid) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::SupplierNotFound)
    }

    async fn create_supplier(
        &self,
        fields: SupplierFields,
        actor: Option<Uuid>,
    ) -> Result<Supplier, AppError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "INSERT INTO suppliers (name, phone, region, default_mark, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(&fields.name)
        .bind(&fields.phone)
        .bind(&fields.region)
        .bind(&fields.default_mark)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;
        Ok(supplier)
    }

    async fn update_supplier(
        &self,
        id: Uuid,
        patch: SupplierPatch,
        actor: Option<Uuid>,
    ) -> Result<Supplier, AppError> {
        ensure_owner(self.supplier_owner(id).await?, actor)?;

        // Absent patch fields keep the stored value.
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "UPDATE suppliers SET
                 name = COALESCE($2, name),
                 phone = COALESCE($3, phone),
                 region = COALESCE($4, region),
                 default_mark = COALESCE($5, default_mark)
             WHERE id = $1
             RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.phone)
        .bind(&patch.region)
        .bind(&patch.default_mark)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::SupplierNotFound)?;
        Ok(supplier)
    }

    async fn delete_supplier(&self, id: Uuid, actor: Option<Uuid>) -> Result<(), AppError> {
        ensure_owner(self.supplier_owner(id).await?, actor)?;

        // Cascade and delete as one unit so no dangling references survive.
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM trip_animals WHERE supplier_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::SupplierNotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_trips(&self) -> Result<Vec<TripListEntry>, AppError> {
        let trips = sqlx::query_as::<_, TripListEntry>(
            r#"
            SELECT
                t.id, t.date, t.region, t.truck_no, t.form_no, t.driver_name, t.escort_name,
                t.prepared_by_name, t.prepared_by_position, t.created_at,
                COALESCE(SUM(ta.goats_count), 0)::BIGINT AS total_goats,
                COALESCE(SUM(ta.sheep_count), 0)::BIGINT AS total_sheep,
                COALESCE(SUM(ta.goats_count + ta.sheep_count), 0)::BIGINT AS total_animals
            FROM trips t
            LEFT JOIN trip_animals ta ON ta.trip_id = t.id
            GROUP BY t.id
            ORDER BY t.date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(trips)
    }

    async fn get_trip(&self, id: Uuid) -> Result<TripWithAnimals, AppError> {
        let trip = sqlx::query_as::<_, Trip>(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::TripNotFound)?;

        // Totals are projections: recomputed here, not read back.
        let animals = sqlx::query_as::<_, AnimalSupplierRow>(
            r#"
            SELECT
                ta.id, ta.trip_id, ta.supplier_id, ta.mark,
                ta.goats_count, ta.sheep_count,
                ta.goats_count + ta.sheep_count AS total_animals,
                ta.created_at,
                s.id AS s_id, s.name AS s_name, s.phone AS s_phone,
                s.region AS s_region, s.default_mark AS s_default_mark,
                s.created_at AS s_created_at
            FROM trip_animals ta
            LEFT JOIN suppliers s ON s.id = ta.supplier_id
            WHERE ta.trip_id = $1
            ORDER BY ta.created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(TripWithAnimals {
            trip,
            animals: animals.into_iter().map(Into::into).collect(),
        })
    }

    async fn create_trip(
        &self,
        fields: TripFields,
        animals: Vec<NewTripAnimal>,
        actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError> {
        // Parent and children are persisted together or not at all.
        let mut tx = self.pool.begin().await?;

        let trip = sqlx::query_as::<_, Trip>(&format!(
            "INSERT INTO trips
                 (date, region, truck_no, form_no, driver_name, escort_name,
                  prepared_by_name, prepared_by_position, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {TRIP_COLUMNS}"
        ))
        .bind(fields.date)
        .bind(&fields.region)
        .bind(&fields.truck_no)
        .bind(&fields.form_no)
        .bind(&fields.driver_name)
        .bind(&fields.escort_name)
        .bind(&fields.prepared_by_name)
        .bind(&fields.prepared_by_position)
        .bind(actor)
        .fetch_one(&mut *tx)
        .await?;

        for animal in &animals {
            sqlx::query(
                "INSERT INTO trip_animals
                     (trip_id, supplier_id, mark, goats_count, sheep_count, total_animals, created_by)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(trip.id)
            .bind(animal.supplier_id)
            .bind(&animal.mark)
            .bind(animal.goats_count)
            .bind(animal.sheep_count)
            .bind(animal.total())
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get_trip(trip.id).await
    }

    async fn update_trip(
        &self,
        id: Uuid,
        patch: TripPatch,
        animals: Vec<NewTripAnimal>,
        actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError> {
        ensure_owner(self.trip_owner(id).await?, actor)?;

        // Header update and child replacement are one transaction: a failure
        // between the delete and the insert can never leave the trip with no
        // line items.
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Trip>(&format!(
            "UPDATE trips SET
                 date = COALESCE($2, date),
                 region = COALESCE($3, region),
                 truck_no = COALESCE($4, truck_no),
                 form_no = COALESCE($5, form_no),
                 driver_name = COALESCE($6, driver_name),
                 escort_name = COALESCE($7, escort_name),
                 prepared_by_name = COALESCE($8, prepared_by_name),
                 prepared_by_position = COALESCE($9, prepared_by_position)
             WHERE id = $1
             RETURNING {TRIP_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.date)
        .bind(&patch.region)
        .bind(&patch.truck_no)
        .bind(&patch.form_no)
        .bind(&patch.driver_name)
        .bind(&patch.escort_name)
        .bind(&patch.prepared_by_name)
        .bind(&patch.prepared_by_position)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::TripNotFound)?;

        sqlx::query("DELETE FROM trip_animals WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for animal in &animals {
            sqlx::query(
                "INSERT INTO trip_animals
                     (trip_id, supplier_id, mark, goats_count, sheep_count, total_animals, created_by)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(updated.id)
            .bind(animal.supplier_id)
            .bind(&animal.mark)
            .bind(animal.goats_count)
            .bind(animal.sheep_count)
            .bind(animal.total())
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get_trip(id).await
    }

    async fn delete_trip(&self, id: Uuid, actor: Option<Uuid>) -> Result<(), AppError> {
        ensure_owner(self.trip_owner(id).await?, actor)?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM trip_animals WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::TripNotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn report_rows(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        region: Option<&str>,
    ) -> Result<Vec<ReportRow>, AppError> {
        // The INNER JOIN on trips drops line items with no resolvable parent;
        // a missing supplier falls back to the placeholder name.
        let base = r#"
            SELECT
                ta.supplier_id,
                COALESCE(s.name, 'Unknown') AS supplier_name,
                t.date, t.region, t.truck_no, t.form_no,
                ta.goats_count, ta.sheep_count,
                ta.goats_count + ta.sheep_count AS total_animals
            FROM trip_animals ta
            JOIN trips t ON t.id = ta.trip_id
            LEFT JOIN suppliers s ON s.id = ta.supplier_id
            WHERE t.date >= $1 AND t.date <= $2
        "#;

        let rows = match region {
            Some(region) => {
                sqlx::query_as::<_, ReportRow>(&format!(
                    "{base} AND t.region = $3 ORDER BY t.date DESC, ta.created_at ASC"
                ))
                .bind(from)
                .bind(to)
                .bind(region)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ReportRow>(&format!(
                    "{base} ORDER BY t.date DESC, ta.created_at ASC"
                ))
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn supplier_report_rows(
        &self,
        supplier_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DetailRow>, AppError> {
        let rows = sqlx::query_as::<_, DetailRow>(
            r#"
            SELECT
                t.date, t.region, t.truck_no, t.form_no,
                ta.goats_count, ta.sheep_count,
                ta.goats_count + ta.sheep_count AS total_animals
            FROM trip_animals ta
            JOIN trips t ON t.id = ta.trip_id
            WHERE ta.supplier_id = $1 AND t.date >= $2 AND t.date <= $3
            ORDER BY t.date DESC
            "#,
        )
        .bind(supplier_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        // bcrypt is CPU-heavy; keep it off the async workers.
        let password = password.to_owned();
        let password_hash = user.password_hash.clone();
        let is_password_valid =
            tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<User, AppError> {
        let password = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash)
             VALUES ($1, $2)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })?;
        Ok(user)
    }
}
