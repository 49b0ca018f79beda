// keep public for OpenAPI docs
pub mod auth;
pub mod credits;
pub mod gallery;
pub mod generation;
pub mod health;
pub mod purchases;
