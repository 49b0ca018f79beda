use axum::{
    Json,
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::{
    net::{IpAddr, SocketAddr},
    sync::{Arc, Weak},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tokio::time::{MissedTickBehavior, interval};

use craftads_application::infrastructure_config::RateLimitConfig;

use crate::incoming::http_axum::dto::responses::ApiResponse;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RateLimitEntry {
    pub requests: u32,
    pub window_start: Instant,
}

#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset_time: Instant,
    pub retry_after_seconds: Option<u64>,
}

fn numeric_header(value: impl ToString) -> HeaderValue {
    HeaderValue::from_str(&value.to_string()).unwrap_or(HeaderValue::from_static("0"))
}

impl RateLimitInfo {
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("RateLimit-Limit", numeric_header(self.limit));
        headers.insert("RateLimit-Remaining", numeric_header(self.remaining));

        let time_until_reset = self.reset_time.saturating_duration_since(Instant::now());
        let reset_timestamp = (SystemTime::now() + time_until_reset)
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        headers.insert("RateLimit-Reset", numeric_header(reset_timestamp));

        if let Some(retry_after) = self.retry_after_seconds {
            headers.insert(RETRY_AFTER, numeric_header(retry_after));
        }

        headers
    }
}

#[derive(Debug)]
pub enum RateLimitResult {
    Allowed(RateLimitInfo),
    Denied(RateLimitInfo),
}

/// Fixed one-minute window per client IP.
#[derive(Debug)]
pub struct RateLimiter {
    scope: &'static str,
    store: DashMap<IpAddr, RateLimitEntry>,
    burst_size: u32,
}

impl RateLimiter {
    pub fn new(scope: &'static str, requests_per_minute: u32, burst_size_multiplier: u32) -> Self {
        Self {
            scope,
            store: DashMap::new(),
            burst_size: requests_per_minute.saturating_mul(burst_size_multiplier),
        }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn check_rate_limit(&self, ip: IpAddr) -> RateLimitResult {
        let now = Instant::now();

        let mut entry = self.store.entry(ip).or_insert_with(|| RateLimitEntry {
            requests: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= WINDOW {
            entry.window_start = now;
            entry.requests = 0;
        }

        let reset_time = entry.window_start + WINDOW;

        if entry.requests < self.burst_size {
            entry.requests += 1;
            RateLimitResult::Allowed(RateLimitInfo {
                limit: self.burst_size,
                remaining: self.burst_size - entry.requests,
                reset_time,
                retry_after_seconds: None,
            })
        } else {
            RateLimitResult::Denied(RateLimitInfo {
                limit: self.burst_size,
                remaining: 0,
                reset_time,
                retry_after_seconds: Some(reset_time.saturating_duration_since(now).as_secs()),
            })
        }
    }

    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.store
            .retain(|_, entry| now.duration_since(entry.window_start) < WINDOW);
    }

    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }
}

/// Periodically drops stale windows; the task ends once the limiter is gone.
fn spawn_eviction(limiter: &Arc<RateLimiter>) {
    let weak: Weak<RateLimiter> = Arc::downgrade(limiter);
    tokio::spawn(async move {
        let mut ticker = interval(WINDOW);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let Some(limiter) = weak.upgrade() else {
                break;
            };
            limiter.evict_expired();
        }
    });
}

fn merge_headers_safe(target: &mut HeaderMap, source: &HeaderMap) {
    for (key, value) in source {
        if !target.contains_key(key) {
            target.insert(key, value.clone());
        }
    }
}

pub async fn rate_limit_middleware(
    rate_limiter: Arc<RateLimiter>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let client_ip = addr.ip();

    match rate_limiter.check_rate_limit(client_ip) {
        RateLimitResult::Allowed(rate_info) => {
            let mut response = next.run(request).await;
            merge_headers_safe(response.headers_mut(), &rate_info.to_headers());
            response
        }
        RateLimitResult::Denied(rate_info) => {
            tracing::warn!(
                scope = rate_limiter.scope(),
                "Rate limit exceeded for IP: {} on {} {}",
                client_ip,
                request.method(),
                request.uri()
            );

            (
                StatusCode::TOO_MANY_REQUESTS,
                rate_info.to_headers(),
                Json(ApiResponse::<()>::failure(
                    "RATE_LIMITED",
                    "Rate limit exceeded",
                )),
            )
                .into_response()
        }
    }
}

fn create_rate_limiter(
    scope: &'static str,
    requests_per_minute: u32,
    config: &RateLimitConfig,
) -> Arc<RateLimiter> {
    let limiter = Arc::new(RateLimiter::new(
        scope,
        requests_per_minute,
        config.burst_size_multiplier,
    ));
    spawn_eviction(&limiter);
    limiter
}

pub fn create_general_rate_limiter(config: &RateLimitConfig) -> Arc<RateLimiter> {
    create_rate_limiter("global", config.global_requests_per_minute, config)
}

pub fn create_auth_rate_limiter(config: &RateLimitConfig) -> Arc<RateLimiter> {
    create_rate_limiter("auth", config.auth_requests_per_minute, config)
}

pub fn create_generation_rate_limiter(config: &RateLimitConfig) -> Arc<RateLimiter> {
    create_rate_limiter("generation", config.generation_requests_per_minute, config)
}
