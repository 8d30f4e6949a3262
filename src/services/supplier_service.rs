// src/services/supplier_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Store,
    models::supplier::{Supplier, SupplierFields, SupplierPatch},
};

#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn Store>,
}

impl SupplierService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Supplier>, AppError> {
        self.store.list_suppliers().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Supplier, AppError> {
        self.store.get_supplier(id).await
    }

    pub async fn create(
        &self,
        fields: SupplierFields,
        actor: Option<Uuid>,
    ) -> Result<Supplier, AppError> {
        self.store.create_supplier(fields, actor).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: SupplierPatch,
        actor: Option<Uuid>,
    ) -> Result<Supplier, AppError> {
        self.store.update_supplier(id, patch, actor).await
    }

    /// Also removes every trip line item referencing the supplier.
    pub async fn delete(&self, id: Uuid, actor: Option<Uuid>) -> Result<(), AppError> {
        self.store.delete_supplier(id, actor).await
    }
}
