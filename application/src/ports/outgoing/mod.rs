pub mod credit_store;
pub mod delay;
pub mod gallery_store;
pub mod generation_backend;
pub mod generation_store;
pub mod health;
pub mod payment_store;
pub mod timeout;
pub mod user_store;
