// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Suppliers ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::get_supplier,
        handlers::suppliers::create_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,

        // --- Trips ---
        handlers::trips::list_trips,
        handlers::trips::get_trip,
        handlers::trips::create_trip,
        handlers::trips::update_trip,
        handlers::trips::delete_trip,

        // --- Reports ---
        handlers::reports::supplier_report,
        handlers::reports::supplier_detail_report,

        // --- Documents ---
        handlers::documents::trip_manifest_pdf,
        handlers::documents::supplier_report_csv,
        handlers::documents::supplier_report_pdf,
        handlers::documents::supplier_detail_csv,
        handlers::documents::supplier_detail_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserResponse,
            handlers::auth::RegisterPayload,
            handlers::auth::LoginPayload,
            handlers::auth::AuthResponse,

            // --- Suppliers ---
            models::supplier::Supplier,
            handlers::suppliers::CreateSupplierPayload,
            handlers::suppliers::UpdateSupplierPayload,

            // --- Trips ---
            models::trip::Trip,
            models::trip::TripAnimal,
            models::trip::TripAnimalWithSupplier,
            models::trip::TripWithAnimals,
            models::trip::TripListEntry,
            handlers::trips::TripAnimalPayload,
            handlers::trips::CreateTripPayload,
            handlers::trips::UpdateTripPayload,

            // --- Reports ---
            models::report::ReportRow,
            models::report::DetailRow,
            models::report::SupplierSummary,
            models::report::ReportTotals,
            models::report::SupplierReport,
            models::report::SupplierDetailReport,
        )
    ),
    tags(
        (name = "Auth", description = "Sign in and session"),
        (name = "Suppliers", description = "Supplier registry"),
        (name = "Trips", description = "Collection trips and their line items"),
        (name = "Reports", description = "Per-supplier aggregation over a date range"),
        (name = "Documents", description = "CSV and PDF exports")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
