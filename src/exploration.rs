// Usable exploration hours under day-window and airport-buffer rules

use chrono::{NaiveTime, Timelike};

use crate::config::SearchParameters;
use crate::model::round2;

// Parses an HH:MM clock time into fractional hours. A "+1" suffix marks
// a next-day arrival; it is stripped here and does not enter the hour
// arithmetic (it only ever affected display upstream).
fn parse_clock(raw: &str) -> Option<f64> {
    let bare = if raw.contains("+1") {
        raw.split('+').next().unwrap_or(raw)
    } else {
        raw
    };
    let time = NaiveTime::parse_from_str(bare, "%H:%M").ok()?;
    Some(time.hour() as f64 + time.minute() as f64 / 60.0)
}

// Hours left for sightseeing once airport buffers are subtracted and
// the result is clipped to the configured day window. Fails closed:
// any malformed time yields 0.0, which the minimum-hours threshold
// then filters out downstream.
pub fn exploration_hours(
    outbound_arrival: &str,
    return_departure: &str,
    num_nights: u32,
    params: &SearchParameters,
) -> f64 {
    let (Some(arrival), Some(departure)) = (
        parse_clock(outbound_arrival),
        parse_clock(return_departure),
    ) else {
        return 0.0;
    };

    let day_starts = params.day_starts_at_hour as f64;
    let day_ends = params.day_ends_at_hour as f64;
    let buffer = params.airport_buffer_hours;

    let explore_starts = day_starts.max(arrival + buffer);
    let explore_ends = day_ends.min(departure - buffer);

    let total_hours = if num_nights == 0 {
        // Day trip: one interval on a single day.
        (explore_ends - explore_starts).max(0.0)
    } else {
        let arrival_day = (day_ends - explore_starts).max(0.0);
        let departure_day = (explore_ends - day_starts).max(0.0);
        let full_days = num_nights.saturating_sub(1) as f64 * (day_ends - day_starts);
        arrival_day + departure_day + full_days
    };

    round2(total_hours)
}
