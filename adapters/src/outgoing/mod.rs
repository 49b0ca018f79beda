pub mod generation;
pub mod postgres_sqlx;
pub mod tokio_time;
