pub mod auth;
pub mod credits;
pub mod gallery;
pub mod generation;
pub mod purchases;
