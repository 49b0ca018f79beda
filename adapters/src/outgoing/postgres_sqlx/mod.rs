pub mod credit_store_postgres;
pub mod gallery_store_postgres;
pub mod generation_store_postgres;
pub mod health_probe_postgres;
pub mod ledger_sql;
pub mod payment_store_postgres;
pub mod user_store_postgres;
pub mod utils;
