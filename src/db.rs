pub mod store;
pub use store::Store;
pub mod local_store;
pub use local_store::LocalStore;
pub mod pg_store;
pub use pg_store::PgStore;
