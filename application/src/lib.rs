#[cfg(any(
    feature = "adapters",
    feature = "axum",
    feature = "sqlx",
    feature = "tokio"
))]
compile_error!("application must not depend on adapters/framework crates");

pub mod auth;
pub mod config;
pub mod credits;
pub mod error;
pub mod gallery;
pub mod generation;
pub mod infrastructure_config;
pub mod ports;
pub mod purchases;

#[cfg(test)]
pub(crate) mod test_support;
