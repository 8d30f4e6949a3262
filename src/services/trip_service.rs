// src/services/trip_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::trip::{NewTripAnimal, TripFields, TripListEntry, TripPatch, TripWithAnimals},
};

#[derive(Clone)]
pub struct TripService {
    store: Arc<dyn Store>,
}

impl TripService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<TripListEntry>, AppError> {
        self.store.list_trips().await
    }

    pub async fn get(&self, id: Uuid) -> Result<TripWithAnimals, AppError> {
        self.store.get_trip(id).await
    }

    pub async fn create(
        &self,
        fields: TripFields,
        animals: Vec<NewTripAnimal>,
        actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError> {
        let animals = self.apply_default_marks(animals).await?;
        self.store.create_trip(fields, animals, actor).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: TripPatch,
        animals: Vec<NewTripAnimal>,
        actor: Option<Uuid>,
    ) -> Result<TripWithAnimals, AppError> {
        let animals = self.apply_default_marks(animals).await?;
        self.store.update_trip(id, patch, animals, actor).await
    }

    pub async fn delete(&self, id: Uuid, actor: Option<Uuid>) -> Result<(), AppError> {
        self.store.delete_trip(id, actor).await
    }

    /// A line item submitted with a blank mark takes the supplier's
    /// `default_mark`. Referential integrity is not enforced here, so a row
    /// pointing at an unknown supplier just keeps whatever mark it came
    /// with.
    async fn apply_default_marks(
        &self,
        animals: Vec<NewTripAnimal>,
    ) -> Result<Vec<NewTripAnimal>, AppError> {
        let mut resolved = Vec::with_capacity(animals.len());
        for mut animal in animals {
            if animal.mark.trim().is_empty() {
                if let Ok(supplier) = self.store.get_supplier(animal.supplier_id).await {
                    if let Some(default_mark) = supplier.default_mark {
                        animal.mark = default_mark;
                    }
                }
            }
            resolved.push(animal);
        }
        Ok(resolved)
    }
}
