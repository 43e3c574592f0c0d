// Run configuration: engine tuning knobs plus the destination catalog

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Duration, Local, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// Engine tuning knobs. Every field has a working default so a partial
// config file only needs to name what it overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    pub origin_city_id: String,
    // ISO date; unparseable or absent falls back to tomorrow
    pub start_date: Option<String>,
    pub days_to_search: u32,
    pub max_trip_duration_days: u32,
    pub min_exploration_hours: f64,
    pub day_starts_at_hour: u32,
    pub day_ends_at_hour: u32,
    pub airport_buffer_hours: f64,
    pub num_candidates_to_validate: usize,
    pub num_final_results_to_store: usize,
    pub airbnb_calendar_months_to_scan: u32,
    pub sampled_durations: Vec<u32>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            origin_city_id: String::new(),
            start_date: None,
            days_to_search: 60,
            max_trip_duration_days: 7,
            min_exploration_hours: 10.0,
            day_starts_at_hour: 8,
            day_ends_at_hour: 21,
            airport_buffer_hours: 2.0,
            num_candidates_to_validate: 5,
            num_final_results_to_store: 3,
            airbnb_calendar_months_to_scan: 6,
            sampled_durations: vec![1, 2, 3, 5, 7, 10, 14],
        }
    }
}

impl SearchParameters {
    pub fn max_num_nights(&self) -> u32 {
        self.max_trip_duration_days.saturating_sub(1)
    }

    pub fn resolved_start_date(&self) -> NaiveDate {
        self.start_date
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .unwrap_or_else(|| Local::now().date_naive() + Duration::days(1))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.origin_city_id.is_empty() {
            return Err(ConfigError::Invalid(
                "origin_city_id must be set".to_string(),
            ));
        }
        if self.day_ends_at_hour <= self.day_starts_at_hour {
            return Err(ConfigError::Invalid(format!(
                "day window is empty: starts at {} and ends at {}",
                self.day_starts_at_hour, self.day_ends_at_hour
            )));
        }
        if self.min_exploration_hours < 0.0 {
            return Err(ConfigError::Invalid(
                "min_exploration_hours must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

// One country's slice of the destination catalog. Disabled countries
// are skipped wholesale; cities map collaborator ids to display names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CountryPlan {
    pub enabled: bool,
    pub cities: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilePaths {
    pub results_file: String,
}

impl Default for FilePaths {
    fn default() -> Self {
        Self {
            results_file: "results.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search_parameters: SearchParameters,
    pub destinations: BTreeMap<String, CountryPlan>,
    pub file_paths: FilePaths,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        config.search_parameters.validate()?;
        Ok(config)
    }
}
