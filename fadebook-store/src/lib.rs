pub mod app_config;
pub mod database;
pub mod hold_repo;

pub use database::DbClient;
pub use hold_repo::PgHoldStore;
