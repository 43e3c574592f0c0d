// Collaborator seam: the external data providers the engine drives

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{AvailabilityCalendar, FlightLeg, LodgingOption, PricePoint};

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("network error: {0}")]
    Network(String),

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

// Daily fare series and exact flight lookups. Implementations own
// their retry policy; the engine never retries.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    // May legitimately return an empty series. An Err means the
    // provider gave up for good; the destination is then abandoned.
    async fn fetch_price_series(
        &self,
        origin: &str,
        destination: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, CollaboratorError>;

    // Cheapest-first exact legs for one direction on one date.
    async fn fetch_exact_flight_details(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
    ) -> Result<Vec<FlightLeg>, CollaboratorError>;
}

// Lodging search and per-listing calendars. Both degrade to empty
// results on failure rather than raising.
#[async_trait]
pub trait LodgingProvider: Send + Sync {
    // At most 3 options, cheapest first.
    async fn fetch_lodging_options(
        &self,
        destination_query: &str,
        checkin: &str,
        checkout: &str,
    ) -> Vec<LodgingOption>;

    async fn fetch_lodging_calendar(&self, link: &str, months_to_scan: u32)
        -> AvailabilityCalendar;
}

// Retry schedule shared by provider implementations.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

// Exponential backoff with jitter to keep retries from synchronizing.
pub fn calculate_backoff(retry_attempt: u32, policy: &RetryPolicy) -> Duration {
    let base_backoff_ms = (policy.initial_backoff_ms as f64
        * policy.backoff_multiplier.powf(retry_attempt as f64))
    .min(policy.max_backoff_ms as f64);

    let jitter = rand::random::<f64>() * policy.jitter_factor * base_backoff_ms;
    let backoff_ms = base_backoff_ms * (1.0 - policy.jitter_factor / 2.0) + jitter;

    Duration::from_millis(backoff_ms as u64)
}
