use std::sync::{Arc, Weak};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use craftads_application::config::ReservationSweep;
use craftads_application::ports::incoming::credits::CreditUseCase;

/// Periodically refunds reservations left pending past `sweep.max_age`.
/// The task ends once the credit service is gone.
pub fn spawn_reservation_sweeper(credits: &Arc<dyn CreditUseCase>, sweep: ReservationSweep) {
    let weak: Weak<dyn CreditUseCase> = Arc::downgrade(credits);
    info!(
        every_secs = sweep.every.as_secs(),
        max_age_secs = sweep.max_age.as_secs(),
        "Stale reservation sweep scheduled"
    );

    tokio::spawn(async move {
        let mut ticker = interval(sweep.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let Some(credits) = weak.upgrade() else {
                break;
            };
            if let Err(err) = credits.release_stale_reservations(sweep.max_age).await {
                warn!(error = %err, "Stale reservation sweep failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use tokio::time::sleep;
    use uuid::Uuid;

    use super::*;
    use craftads_application::error::{AppError, AppResult};
    use craftads_application::ports::incoming::credits::{
        AddCredits, DeductCredits, ReserveCredits,
    };
    use domain::auth::UserId;
    use domain::credits::{CreditAccount, CreditCheck, CreditTransaction, LedgerEntry};
    use domain::pagination::Page;

    #[derive(Default)]
    struct SweepCounter {
        sweeps: Arc<AtomicU32>,
        max_ages: Mutex<Vec<Duration>>,
    }

    #[async_trait::async_trait]
    impl CreditUseCase for SweepCounter {
        async fn get_balance(&self, _user_id: &UserId) -> AppResult<CreditAccount> {
            Err(AppError::InternalServerError)
        }

        async fn deduct(&self, _user_id: &UserId, _request: DeductCredits) -> AppResult<LedgerEntry> {
            Err(AppError::InternalServerError)
        }

        async fn add(&self, _user_id: &UserId, _request: AddCredits) -> AppResult<LedgerEntry> {
            Err(AppError::InternalServerError)
        }

        async fn history(
            &self,
            _user_id: &UserId,
            _page: Option<u32>,
            _limit: Option<u32>,
        ) -> AppResult<Page<CreditTransaction>> {
            Err(AppError::InternalServerError)
        }

        async fn validate(
            &self,
            _user_id: &UserId,
            _required: i64,
            _operation: String,
        ) -> AppResult<CreditCheck> {
            Err(AppError::InternalServerError)
        }

        async fn reserve(
            &self,
            _user_id: &UserId,
            _request: ReserveCredits,
        ) -> AppResult<LedgerEntry> {
            Err(AppError::InternalServerError)
        }

        async fn commit_reservation(&self, _transaction_id: Uuid) -> AppResult<CreditTransaction> {
            Err(AppError::InternalServerError)
        }

        async fn release_reservation(&self, _transaction_id: Uuid) -> AppResult<LedgerEntry> {
            Err(AppError::InternalServerError)
        }

        async fn release_stale_reservations(
            &self,
            max_age: Duration,
        ) -> AppResult<Vec<LedgerEntry>> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            self.max_ages.lock().unwrap().push(max_age);
            Ok(Vec::new())
        }
    }

    fn sweep() -> ReservationSweep {
        ReservationSweep {
            every: Duration::from_secs(60),
            max_age: Duration::from_secs(90),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_on_every_tick_with_the_configured_age() {
        let counter = Arc::new(SweepCounter::default());
        let credits: Arc<dyn CreditUseCase> = Arc::<SweepCounter>::clone(&counter);

        spawn_reservation_sweeper(&credits, sweep());
        sleep(Duration::from_secs(125)).await;

        assert_eq!(counter.sweeps.load(Ordering::SeqCst), 3);
        assert!(
            counter
                .max_ages
                .lock()
                .unwrap()
                .iter()
                .all(|age| *age == Duration::from_secs(90))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stops_once_the_service_is_dropped() {
        let counter = SweepCounter::default();
        let sweeps = Arc::clone(&counter.sweeps);
        let credits: Arc<dyn CreditUseCase> = Arc::new(counter);

        spawn_reservation_sweeper(&credits, sweep());
        sleep(Duration::from_secs(5)).await;
        assert_eq!(sweeps.load(Ordering::SeqCst), 1);

        drop(credits);
        sleep(Duration::from_secs(300)).await;
        assert_eq!(sweeps.load(Ordering::SeqCst), 1);
    }
}
