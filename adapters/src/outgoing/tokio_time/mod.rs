pub mod generation_timeout_tokio;
pub mod reservation_sweeper;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;

use craftads_application::ports::outgoing::delay::DelayPort;

pub struct TokioDelayAdapter;

impl TokioDelayAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioDelayAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayPort for TokioDelayAdapter {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + 'static>> {
        Box::pin(sleep(duration))
    }
}
