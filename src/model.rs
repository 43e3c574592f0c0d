// Core data types shared across the trip optimization pipeline

use std::collections::HashMap;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

// Daily availability per listing, ISO date string -> bookable that night
pub type AvailabilityCalendar = HashMap<String, bool>;

// Per-destination calendar cache, keyed by listing link. Populated once
// before ranking, read-only during estimation and validation.
pub type CalendarCache = DashMap<String, AvailabilityCalendar>;

// One scraped daily fare. Dates stay strings until the combination
// generator parses them; malformed records are dropped there.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TripCandidate {
    pub outbound_date: String,
    pub return_date: String,
    pub num_nights: u32,
    pub estimated_flight_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LodgingOption {
    pub name: String,
    #[serde(rename = "total_accommodation_cost")]
    pub total_cost: f64,
    pub rating: String,
    pub link: String,
    pub checkin: String,
    pub checkout: String,
}

impl LodgingOption {
    // Zero-cost stand-in for trips that need no lodging.
    pub fn day_trip() -> Self {
        Self {
            name: "N/A (Day Trip)".to_string(),
            total_cost: 0.0,
            rating: "N/A".to_string(),
            link: "N/A".to_string(),
            checkin: "N/A".to_string(),
            checkout: "N/A".to_string(),
        }
    }

    pub fn is_day_trip(&self) -> bool {
        self.link == "N/A"
    }
}

// Exact flight record from the detailed-flight collaborator. Times are
// HH:MM strings, possibly "+1"-suffixed for next-day arrivals, possibly
// absent when extraction could not recover them.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct FlightLeg {
    pub price: f64,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub airline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlightPair {
    pub total_price: f64,
    pub outbound: FlightLeg,
    #[serde(rename = "return")]
    pub return_leg: FlightLeg,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedTrip {
    pub candidate: TripCandidate,
    pub estimated_total_cost: f64,
    pub estimated_cost_per_hour: f64,
    pub matched_accommodation: LodgingOption,
}

// The persisted unit: one validated trip package for a destination.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfirmedTrip {
    pub destination: String,
    pub outbound_date: String,
    pub return_date: String,
    pub total_cost: f64,
    pub cost_per_hour_of_exploration: f64,
    pub exploration_hours: f64,
    pub flights: FlightPair,
    pub accommodation: LodgingOption,
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// Collapses duplicate dates (later scrape wins, keeping the first-seen
// position) and orders the merged series cheapest-first.
pub fn merge_price_points(points: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut merged: Vec<PricePoint> = Vec::with_capacity(points.len());
    let mut index_by_date: HashMap<String, usize> = HashMap::with_capacity(points.len());

    for point in points {
        match index_by_date.get(&point.date) {
            Some(&i) => merged[i] = point,
            None => {
                index_by_date.insert(point.date.clone(), merged.len());
                merged.push(point);
            }
        }
    }

    merged.sort_by(|a, b| a.price.total_cmp(&b.price));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, price: f64) -> PricePoint {
        PricePoint {
            date: date.to_string(),
            price,
        }
    }

    #[test]
    fn test_merge_dedupes_by_date_last_write_wins() {
        let merged = merge_price_points(vec![
            point("2025-06-01", 120.0),
            point("2025-06-02", 90.0),
            point("2025-06-01", 80.0),
        ]);

        assert_eq!(merged.len(), 2);
        let first_of_june = merged
            .iter()
            .find(|p| p.date == "2025-06-01")
            .expect("date collapsed away");
        assert_eq!(first_of_june.price, 80.0);
    }

    #[test]
    fn test_merge_orders_cheapest_first() {
        let merged = merge_price_points(vec![
            point("2025-06-03", 300.0),
            point("2025-06-01", 100.0),
            point("2025-06-02", 200.0),
        ]);

        let prices: Vec<f64> = merged.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge_price_points(Vec::new()).is_empty());
    }

    #[test]
    fn test_day_trip_sentinel_costs_nothing() {
        let sentinel = LodgingOption::day_trip();
        assert_eq!(sentinel.total_cost, 0.0);
        assert_eq!(sentinel.name, "N/A (Day Trip)");
        assert_eq!(sentinel.rating, "N/A");
        assert!(sentinel.is_day_trip());
    }

    #[test]
    fn test_confirmed_trip_serialized_shape() {
        let trip = ConfirmedTrip {
            destination: "Porto".to_string(),
            outbound_date: "2025-06-01".to_string(),
            return_date: "2025-06-03".to_string(),
            total_cost: 540.5,
            cost_per_hour_of_exploration: 18.02,
            exploration_hours: 30.0,
            flights: FlightPair {
                total_price: 240.5,
                outbound: FlightLeg {
                    price: 120.0,
                    departure_time: Some("06:30".to_string()),
                    arrival_time: Some("09:10".to_string()),
                    airline: Some("Wizz Air".to_string()),
                },
                return_leg: FlightLeg {
                    price: 120.5,
                    departure_time: Some("18:45".to_string()),
                    arrival_time: Some("21:20+1".to_string()),
                    airline: None,
                },
            },
            accommodation: LodgingOption {
                name: "Riverside studio".to_string(),
                total_cost: 300.0,
                rating: "4.92".to_string(),
                link: "https://www.airbnb.com/rooms/1234".to_string(),
                checkin: "2025-06-01".to_string(),
                checkout: "2025-06-03".to_string(),
            },
        };

        let json = serde_json::to_string(&trip).expect("serialize");
        assert!(json.contains("\"total_accommodation_cost\":300.0"));
        assert!(json.contains("\"return\":"));
        assert!(json.contains("\"cost_per_hour_of_exploration\":18.02"));

        let back: ConfirmedTrip = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, trip);
    }
}
