// Estimated cost-per-hour scoring and ranking for candidate trips

use std::collections::BTreeMap;

use crate::config::SearchParameters;
use crate::exploration::exploration_hours;
use crate::matcher::match_accommodation;
use crate::model::{CalendarCache, EstimatedTrip, LodgingOption, TripCandidate};

// Exact flight times are unknown before validation; estimates assume
// midday arrival and departure.
const PLACEHOLDER_TIME: &str = "12:00";

// Attaches lodging and a rough cost-per-hour to every candidate that
// clears the minimum-hours threshold and finds available lodging.
// Candidates that would divide by zero hours are discarded.
pub fn estimate_trips(
    candidates: &[TripCandidate],
    listings_by_duration: &BTreeMap<u32, Vec<LodgingOption>>,
    calendars: &CalendarCache,
    params: &SearchParameters,
) -> Vec<EstimatedTrip> {
    let mut estimates = Vec::new();

    for candidate in candidates {
        let rough_hours = exploration_hours(
            PLACEHOLDER_TIME,
            PLACEHOLDER_TIME,
            candidate.num_nights,
            params,
        );
        if rough_hours < params.min_exploration_hours {
            continue;
        }

        let Some(accommodation) = match_accommodation(candidate, listings_by_duration, calendars)
        else {
            continue;
        };

        let estimated_total_cost = candidate.estimated_flight_cost + accommodation.total_cost;
        let estimated_cost_per_hour = if rough_hours > 0.0 {
            estimated_total_cost / rough_hours
        } else {
            f64::INFINITY
        };
        if !estimated_cost_per_hour.is_finite() {
            continue;
        }

        estimates.push(EstimatedTrip {
            candidate: candidate.clone(),
            estimated_total_cost,
            estimated_cost_per_hour,
            matched_accommodation: accommodation,
        });
    }

    estimates
}

// Stable ascending sort by estimated cost-per-hour, capped to the
// number of candidates worth validating. Ties keep generation order.
pub fn rank_candidates(mut estimates: Vec<EstimatedTrip>, limit: usize) -> Vec<EstimatedTrip> {
    estimates.sort_by(|a, b| a.estimated_cost_per_hour.total_cmp(&b.estimated_cost_per_hour));
    estimates.truncate(limit);
    estimates
}
