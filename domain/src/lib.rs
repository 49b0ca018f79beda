pub mod auth;
pub mod credits;
pub mod error;
pub mod gallery;
pub mod generation;
pub mod pagination;
pub mod payment;
pub mod prompt;
pub mod shuffle;
