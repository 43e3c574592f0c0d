// Cross-products outbound and return fares into candidate trips

use chrono::NaiveDate;

use crate::model::{PricePoint, TripCandidate};

const DATE_FORMAT: &str = "%Y-%m-%d";

// Emits every (outbound, return) pairing whose night count fits in
// [0, max_num_nights]. Deliberately the full cross product: fare is
// not known to correlate with duration, so nothing is pruned here.
// Records with unparseable dates are dropped silently.
pub fn generate_trip_candidates(
    outbound: &[PricePoint],
    returning: &[PricePoint],
    max_num_nights: u32,
) -> Vec<TripCandidate> {
    let parsed_returns: Vec<(NaiveDate, &PricePoint)> = returning
        .iter()
        .filter_map(|point| {
            NaiveDate::parse_from_str(&point.date, DATE_FORMAT)
                .ok()
                .map(|date| (date, point))
        })
        .collect();

    let mut candidates = Vec::new();
    for ob in outbound {
        let Ok(ob_date) = NaiveDate::parse_from_str(&ob.date, DATE_FORMAT) else {
            continue;
        };
        for (ret_date, ret) in &parsed_returns {
            let nights = (*ret_date - ob_date).num_days();
            if nights >= 0 && nights <= max_num_nights as i64 {
                candidates.push(TripCandidate {
                    outbound_date: ob.date.clone(),
                    return_date: ret.date.clone(),
                    num_nights: nights as u32,
                    estimated_flight_cost: ob.price + ret.price,
                });
            }
        }
    }
    candidates
}
