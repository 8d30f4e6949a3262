// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{LocalStore, PgStore, Store},
    services::{AuthService, DocumentService, ReportService, SupplierService, TripService},
};

// Shared state accessible across the whole application.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub supplier_service: SupplierService,
    pub trip_service: TripService,
    pub report_service: ReportService,
    pub document_service: DocumentService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // DATABASE_URL selects the hosted store; without it the application
        // runs against the local snapshot file (offline/demo mode).
        let (store, jwt_secret): (Arc<dyn Store>, String) = match env::var("DATABASE_URL") {
            Ok(database_url) => {
                let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
                    anyhow::anyhow!("JWT_SECRET must be set when DATABASE_URL is configured")
                })?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(&database_url)
                    .await?;
                tracing::info!("✅ Database connection established!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Database migrations applied!");

                (Arc::new(PgStore::new(db_pool)), jwt_secret)
            }
            Err(_) => {
                let data_file =
                    env::var("DATA_FILE").unwrap_or_else(|_| "tanchoice-db.json".to_string());
                let jwt_secret = env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "tanchoice-dev-secret".to_string());
                tracing::info!("No DATABASE_URL set, using local snapshot store at {}", data_file);

                (Arc::new(LocalStore::new(data_file)), jwt_secret)
            }
        };

        let font_dir = env::var("PDF_FONT_DIR").unwrap_or_else(|_| "./fonts".to_string());
        let font_family = env::var("PDF_FONT_FAMILY").unwrap_or_else(|_| "Roboto".to_string());

        Ok(Self::with_store(store, jwt_secret, font_dir, font_family))
    }

    // Wires the dependency graph over an already-selected store.
    pub fn with_store(
        store: Arc<dyn Store>,
        jwt_secret: String,
        font_dir: String,
        font_family: String,
    ) -> Self {
        Self {
            auth_service: AuthService::new(store.clone(), jwt_secret),
            supplier_service: SupplierService::new(store.clone()),
            trip_service: TripService::new(store.clone()),
            report_service: ReportService::new(store),
            document_service: DocumentService::new(font_dir, font_family),
        }
    }
}
