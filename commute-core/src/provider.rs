use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Error;
use crate::model::{FetchRequest, HourlyObservation};

pub mod open_meteo;

/// Contract the core needs from a weather data source: hourly observations
/// for a point over an inclusive date range, UTC-aligned at a fixed
/// interval.
///
/// Transport, caching, and retry are the implementor's concern; every
/// upstream failure surfaces as a single [`Error::Provider`] for the fetch.
#[async_trait]
pub trait HourlyProvider: Send + Sync + Debug {
    async fn fetch_hourly(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<HourlyObservation>, Error>;
}

/// Retry schedule for transient provider failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per fetch, including the first. Must be at least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// A single attempt per fetch, no waiting.
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Delay before retry number `retry` (1-based).
    pub(crate) fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff * self.multiplier.saturating_pow(retry.saturating_sub(1))
    }
}
