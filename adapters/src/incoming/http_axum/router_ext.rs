use axum::{Router, extract::DefaultBodyLimit, middleware};
use axum_login::AuthManagerLayer;
use std::sync::Arc;
use tower_sessions_redis_store::{RedisStore, fred::prelude::Client};

use crate::incoming::http_axum::{
    auth::backend::AuthBackend,
    middleware::{
        rate_limit::{RateLimiter, rate_limit_middleware},
        request_id::request_id_middleware,
    },
};

pub type SessionAuthLayer = AuthManagerLayer<AuthBackend, RedisStore<Client>>;

pub trait RouterExt<State> {
    fn with_request_id(self) -> Self;
    fn with_auth(self, layer: SessionAuthLayer) -> Self;
    /// No-op when rate limiting is switched off in config.
    fn with_rate_limit(self, limiter: Option<Arc<RateLimiter>>) -> Self;
    fn with_body_limit(self, max_bytes: usize) -> Self;
}

impl<State> RouterExt<State> for Router<State>
where
    State: Clone + Send + Sync + 'static,
{
    fn with_request_id(self) -> Self {
        self.layer(middleware::from_fn(request_id_middleware))
    }

    fn with_auth(self, layer: SessionAuthLayer) -> Self {
        self.layer(layer)
    }

    fn with_rate_limit(self, limiter: Option<Arc<RateLimiter>>) -> Self {
        let Some(limiter) = limiter else {
            return self;
        };

        self.layer(middleware::from_fn(move |conn_info, req, next| {
            rate_limit_middleware(Arc::clone(&limiter), conn_info, req, next)
        }))
    }

    fn with_body_limit(self, max_bytes: usize) -> Self {
        self.layer(DefaultBodyLimit::max(max_bytes))
    }
}
