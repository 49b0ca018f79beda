pub mod backend;
pub mod oauth_google;
pub mod session;
