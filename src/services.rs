pub mod auth;
pub use auth::AuthService;
pub mod supplier_service;
pub use supplier_service::SupplierService;
pub mod trip_service;
pub use trip_service::TripService;
pub mod report_service;
pub use report_service::ReportService;
pub mod csv_service;
pub mod document_service;
pub use document_service::DocumentService;
