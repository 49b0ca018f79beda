use craftads_application::config::ReservationSweep;
use craftads_application::infrastructure_config::{
    Config, GenerationBackendKind, RateLimitConfig,
};
use tracing::info;

/// Logged once the listener is bound.
pub fn print_api_info(config: &Config) {
    print_api_documentation_info(config);
    print_endpoint_groups();
    print_rate_limiting_info(&config.rate_limit);
}

/// Logged before any connection is opened, so a failed start still shows
/// what it was trying to run with.
pub fn print_configuration_summary(config: &Config) {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment.env,
        address = %config.server_address(),
        "CraftAds configuration loaded"
    );
    print_configuration_info(config);
}

fn print_endpoint_groups() {
    info!("🧭 Endpoints:");
    info!("  🔓 Public: /health, /credits/packages, /prompts, /gallery/*");
    info!("  🔑 Session: /auth/*, /credits/*, /generations/history");
    info!("  🎨 Generation: POST /generate");
}

fn print_api_documentation_info(config: &Config) {
    let base_url = format!("http://{}", config.server_address());
    info!("📋 API Documentation:");
    info!("  📖 Swagger UI: {}/docs", base_url);
    info!("  📄 OpenAPI JSON: {}/api-docs/openapi.json", base_url);
}

fn print_configuration_info(config: &Config) {
    info!("⚙️  Configuration:");
    info!("  🗄️  Database: {}", config.db.redacted_url());
    info!(
        "  💳 Credits: signup bonus {}, {} ledger retries",
        config.credits.signup_bonus, config.credits.ledger_write_retries
    );
    info!("  🧹 Stale reservation sweep: {}", sweep_summary(config));
    info!(
        "  🎨 Generation: {} backend, {}s timeout",
        backend_label(config.generation.backend),
        config.generation.timeout_secs
    );
    info!("  🧾 Payments: {} provider", config.payments.provider);
    info!(
        "  🔐 Google sign-in: {}",
        if config.auth.google_client_id.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
}

fn sweep_summary(config: &Config) -> String {
    match ReservationSweep::from_config(config) {
        Some(sweep) => format!(
            "every {}s, after {}s pending",
            sweep.every.as_secs(),
            sweep.max_age.as_secs()
        ),
        None => "DISABLED".to_string(),
    }
}

fn backend_label(kind: GenerationBackendKind) -> &'static str {
    match kind {
        GenerationBackendKind::Mock => "mock",
        GenerationBackendKind::Disabled => "disabled",
    }
}

fn print_rate_limiting_info(rate_limit: &RateLimitConfig) {
    if !rate_limit.enabled {
        info!("  🚦 Rate Limiting: DISABLED");
        return;
    }

    info!("  🚦 Rate Limiting: ENABLED");
    for (scope, per_minute) in [
        ("Global", rate_limit.global_requests_per_minute),
        ("Auth", rate_limit.auth_requests_per_minute),
        ("Generation", rate_limit.generation_requests_per_minute),
    ] {
        info!(
            "    • {}: {}/min per IP (burst: {})",
            scope,
            per_minute,
            per_minute.saturating_mul(rate_limit.burst_size_multiplier)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_summary_reports_schedule_or_disabled() {
        let mut config = Config::default();
        assert_eq!(sweep_summary(&config), "every 60s, after 90s pending");

        config.credits.reservation_sweep_secs = 0;
        assert_eq!(sweep_summary(&config), "DISABLED");
    }

    #[test]
    fn backend_labels_match_config_values() {
        assert_eq!(backend_label(GenerationBackendKind::Mock), "mock");
        assert_eq!(backend_label(GenerationBackendKind::Disabled), "disabled");
    }
}
