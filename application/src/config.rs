use std::time::Duration;

use crate::infrastructure_config::Config;

/// Knobs the credit service needs, lifted out of [`Config`].
#[derive(Debug, Clone)]
pub struct CreditSettings {
    pub signup_bonus: i64,
    pub history_default_limit: u32,
    pub history_max_limit: u32,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

/// Schedule for refunding reservations a failed release left pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationSweep {
    pub every: Duration,
    pub max_age: Duration,
}

impl ReservationSweep {
    /// `None` when the sweep is switched off. A reservation is only stale once
    /// the generation holding it must have timed out.
    pub fn from_config(config: &Config) -> Option<Self> {
        if config.credits.reservation_sweep_secs == 0 {
            return None;
        }

        Some(Self {
            every: Duration::from_secs(config.credits.reservation_sweep_secs),
            max_age: Duration::from_secs(
                config
                    .generation
                    .timeout_secs
                    .saturating_add(config.credits.reservation_grace_secs),
            ),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub timeout: Duration,
    pub history_default_limit: u32,
    pub history_max_limit: u32,
}

#[derive(Debug, Clone)]
pub struct GallerySettings {
    pub default_limit: u32,
    pub max_limit: u32,
}

#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub provider: String,
    pub mock_payment_url: String,
}

impl From<&Config> for CreditSettings {
    fn from(config: &Config) -> Self {
        Self {
            signup_bonus: config.credits.signup_bonus,
            history_default_limit: config.credits.history_default_limit,
            history_max_limit: config.credits.history_max_limit,
            retry: RetryPolicy {
                max_retries: config.credits.ledger_write_retries,
                backoff: Duration::from_millis(config.credits.retry_backoff_ms),
            },
        }
    }
}

impl From<&Config> for GenerationSettings {
    fn from(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.generation.timeout_secs),
            history_default_limit: config.generation.history_default_limit,
            history_max_limit: config.generation.history_max_limit,
        }
    }
}

impl From<&Config> for GallerySettings {
    fn from(config: &Config) -> Self {
        Self {
            default_limit: config.gallery.default_limit,
            max_limit: config.gallery.max_limit,
        }
    }
}

impl From<&Config> for PaymentSettings {
    fn from(config: &Config) -> Self {
        Self {
            provider: config.payments.provider.clone(),
            mock_payment_url: config.payments.mock_payment_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_waits_past_the_generation_timeout() {
        let config = Config::default();

        let sweep = ReservationSweep::from_config(&config).unwrap();

        assert_eq!(sweep.every, Duration::from_secs(60));
        assert_eq!(sweep.max_age, Duration::from_secs(90));
    }

    #[test]
    fn zero_interval_disables_the_sweep() {
        let mut config = Config::default();
        config.credits.reservation_sweep_secs = 0;

        assert_eq!(ReservationSweep::from_config(&config), None);
    }
}
