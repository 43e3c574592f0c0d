// Matches trips to the cheapest lodging option available for their span

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::model::{CalendarCache, LodgingOption, TripCandidate};

const DATE_FORMAT: &str = "%Y-%m-%d";

// Nearest sampled night count by absolute distance. Durations must be
// supplied in ascending order; an exact tie resolves to the lower one.
pub fn nearest_sampled_duration(
    num_nights: u32,
    sampled: impl IntoIterator<Item = u32>,
) -> Option<u32> {
    let mut best: Option<(u32, u32)> = None;
    for duration in sampled {
        let distance = duration.abs_diff(num_nights);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((duration, distance)),
        }
    }
    best.map(|(duration, _)| duration)
}

// Greedy nearest-duration, cheapest-first selection. Only the listings
// pre-searched for the nearest sampled duration are scanned; a missing
// or empty calendar makes a listing unmatchable, and a date absent from
// a calendar counts as unavailable. Day trips match a zero-cost
// sentinel without touching the cache.
pub fn match_accommodation(
    candidate: &TripCandidate,
    listings_by_duration: &BTreeMap<u32, Vec<LodgingOption>>,
    calendars: &CalendarCache,
) -> Option<LodgingOption> {
    if candidate.num_nights == 0 {
        return Some(LodgingOption::day_trip());
    }

    let nearest = nearest_sampled_duration(
        candidate.num_nights,
        listings_by_duration.keys().copied(),
    )?;
    let listings = listings_by_duration.get(&nearest)?;

    let outbound = NaiveDate::parse_from_str(&candidate.outbound_date, DATE_FORMAT).ok()?;
    let returning = NaiveDate::parse_from_str(&candidate.return_date, DATE_FORMAT).ok()?;

    for listing in listings {
        let Some(calendar) = calendars.get(&listing.link) else {
            continue;
        };
        if calendar.is_empty() {
            continue;
        }

        let mut all_available = true;
        let mut current = outbound;
        while current < returning {
            let key = current.format(DATE_FORMAT).to_string();
            if !calendar.get(&key).copied().unwrap_or(false) {
                all_available = false;
                break;
            }
            current += Duration::days(1);
        }

        if all_available {
            return Some(listing.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AvailabilityCalendar;
    use test_case::test_case;

    fn listing(name: &str, cost: f64, link: &str) -> LodgingOption {
        LodgingOption {
            name: name.to_string(),
            total_cost: cost,
            rating: "4.8".to_string(),
            link: link.to_string(),
            checkin: "2025-06-01".to_string(),
            checkout: "2025-06-04".to_string(),
        }
    }

    fn candidate(outbound: &str, returning: &str, nights: u32) -> TripCandidate {
        TripCandidate {
            outbound_date: outbound.to_string(),
            return_date: returning.to_string(),
            num_nights: nights,
            estimated_flight_cost: 200.0,
        }
    }

    // days counted from 2025-06-01; blocked lists dates that are booked
    fn calendar(days: u32, blocked: &[&str]) -> AvailabilityCalendar {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut map = AvailabilityCalendar::new();
        for offset in 0..days {
            let date = (start + Duration::days(offset as i64))
                .format(DATE_FORMAT)
                .to_string();
            let available = !blocked.contains(&date.as_str());
            map.insert(date, available);
        }
        map
    }

    #[test_case(4, &[3, 5], Some(3); "#1 exact tie picks lower duration")]
    #[test_case(2, &[1, 2, 3], Some(2); "#2 exact hit")]
    #[test_case(20, &[1, 2, 3], Some(3); "#3 clamps to largest")]
    #[test_case(1, &[2, 14], Some(2); "#4 clamps to smallest")]
    #[test_case(6, &[], None; "#5 no sampled durations")]
    fn test_nearest_sampled_duration(nights: u32, sampled: &[u32], expected: Option<u32>) {
        assert_eq!(
            nearest_sampled_duration(nights, sampled.iter().copied()),
            expected
        );
    }

    #[test]
    fn test_day_trip_needs_no_lodging() {
        let listings = BTreeMap::new();
        let calendars = CalendarCache::new();

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-01", 0),
            &listings,
            &calendars,
        )
        .expect("day trips always match");

        assert!(matched.is_day_trip());
        assert_eq!(matched.total_cost, 0.0);
    }

    #[test]
    fn test_cheapest_fully_available_listing_wins() {
        let mut listings = BTreeMap::new();
        listings.insert(
            3,
            vec![
                listing("Cheap but booked", 150.0, "link-a"),
                listing("Mid available", 200.0, "link-b"),
                listing("Pricey available", 400.0, "link-c"),
            ],
        );
        let calendars = CalendarCache::new();
        calendars.insert("link-a".to_string(), calendar(30, &["2025-06-02"]));
        calendars.insert("link-b".to_string(), calendar(30, &[]));
        calendars.insert("link-c".to_string(), calendar(30, &[]));

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-04", 3),
            &listings,
            &calendars,
        )
        .expect("an available listing exists");

        assert_eq!(matched.link, "link-b");
    }

    #[test]
    fn test_never_selects_listing_with_blocked_night() {
        let mut listings = BTreeMap::new();
        listings.insert(3, vec![listing("Partially booked", 150.0, "link-a")]);
        let calendars = CalendarCache::new();
        calendars.insert("link-a".to_string(), calendar(30, &["2025-06-03"]));

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-04", 3),
            &listings,
            &calendars,
        );

        assert!(matched.is_none());
    }

    #[test]
    fn test_checkout_night_is_not_required() {
        let mut listings = BTreeMap::new();
        listings.insert(3, vec![listing("Free until checkout", 150.0, "link-a")]);
        let calendars = CalendarCache::new();
        // Checkout day itself is booked; the stay spans [checkin, checkout).
        calendars.insert("link-a".to_string(), calendar(30, &["2025-06-04"]));

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-04", 3),
            &listings,
            &calendars,
        );

        assert_eq!(matched.expect("match").link, "link-a");
    }

    #[test]
    fn test_dates_missing_from_calendar_are_unavailable() {
        let mut listings = BTreeMap::new();
        listings.insert(3, vec![listing("Short calendar", 150.0, "link-a")]);
        let calendars = CalendarCache::new();
        // Calendar covers only two of the three nights.
        calendars.insert("link-a".to_string(), calendar(2, &[]));

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-04", 3),
            &listings,
            &calendars,
        );

        assert!(matched.is_none());
    }

    #[test]
    fn test_empty_or_missing_calendar_skips_listing() {
        let mut listings = BTreeMap::new();
        listings.insert(
            3,
            vec![
                listing("Empty calendar", 100.0, "link-empty"),
                listing("No calendar", 120.0, "link-missing"),
                listing("Good calendar", 300.0, "link-good"),
            ],
        );
        let calendars = CalendarCache::new();
        calendars.insert("link-empty".to_string(), AvailabilityCalendar::new());
        calendars.insert("link-good".to_string(), calendar(30, &[]));

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-04", 3),
            &listings,
            &calendars,
        );

        assert_eq!(matched.expect("match").link, "link-good");
    }

    #[test]
    fn test_no_fallback_to_other_sampled_durations() {
        let mut listings = BTreeMap::new();
        // Nearest to 4 nights is 3; its only listing is blocked.
        listings.insert(3, vec![listing("Blocked", 150.0, "link-a")]);
        listings.insert(5, vec![listing("Available elsewhere", 180.0, "link-b")]);
        let calendars = CalendarCache::new();
        calendars.insert("link-a".to_string(), calendar(30, &["2025-06-02"]));
        calendars.insert("link-b".to_string(), calendar(30, &[]));

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-05", 4),
            &listings,
            &calendars,
        );

        assert!(matched.is_none());
    }

    #[test]
    fn test_no_listings_at_all_rejects_multi_night_trip() {
        let listings = BTreeMap::new();
        let calendars = CalendarCache::new();

        let matched = match_accommodation(
            &candidate("2025-06-01", "2025-06-04", 3),
            &listings,
            &calendars,
        );

        assert!(matched.is_none());
    }
}
