// Run orchestration: drives the per-destination pipeline end to end
// and persists every validated result before moving on.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::collaborators::{CollaboratorError, FlightProvider, LodgingProvider};
use crate::combinations::generate_trip_candidates;
use crate::config::{CountryPlan, SearchParameters};
use crate::estimator::{estimate_trips, rank_candidates};
use crate::exploration::exploration_hours;
use crate::model::{
    merge_price_points, round2, CalendarCache, ConfirmedTrip, EstimatedTrip, FlightPair,
    LodgingOption,
};
use crate::store::{ResultStore, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

// Missing exact flight times count as midnight, the most pessimistic
// reading for the arrival and the most optimistic for the departure.
const MIDNIGHT: &str = "00:00";

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// Counts for one full catalog pass. A processed destination may still
// store nothing when no package survives validation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub destinations_processed: usize,
    pub destinations_skipped: usize,
    pub destinations_failed: usize,
    pub results_stored: usize,
}

pub struct TripOptimizer<F, L> {
    flights: Arc<F>,
    lodging: Arc<L>,
    params: SearchParameters,
    store: Arc<ResultStore>,
}

impl<F, L> TripOptimizer<F, L>
where
    F: FlightProvider,
    L: LodgingProvider,
{
    pub fn new(
        flights: Arc<F>,
        lodging: Arc<L>,
        params: SearchParameters,
        store: Arc<ResultStore>,
    ) -> Self {
        Self {
            flights,
            lodging,
            params,
            store,
        }
    }

    // Walks the destination catalog in order. Destinations already in
    // the store are skipped so an interrupted run resumes where it
    // stopped, and one destination failing never takes down the rest.
    pub async fn run(&self, destinations: &BTreeMap<String, CountryPlan>) -> RunSummary {
        let mut summary = RunSummary::default();

        for (country, plan) in destinations {
            if !plan.enabled {
                info!(country = %country, "country disabled, skipping");
                continue;
            }

            for (city_id, city_name) in &plan.cities {
                if self.store.contains(city_name) {
                    info!(city = %city_name, "already optimized, skipping");
                    summary.destinations_skipped += 1;
                    continue;
                }

                info!(city = %city_name, country = %country, "optimizing destination");
                match self.process_destination(city_id, city_name).await {
                    Ok(stored) => {
                        summary.destinations_processed += 1;
                        summary.results_stored += stored;
                    }
                    Err(error) => {
                        error!(city = %city_name, %error, "destination failed, moving on");
                        summary.destinations_failed += 1;
                    }
                }
            }
        }

        summary
    }

    // The six-phase pipeline for a single destination. Returns how many
    // validated packages were persisted.
    async fn process_destination(
        &self,
        city_id: &str,
        city_name: &str,
    ) -> Result<usize, EngineError> {
        let start_date = self.params.resolved_start_date();

        // Phase 1: daily fare series in both directions.
        let outbound_series = merge_price_points(
            self.flights
                .fetch_price_series(&self.params.origin_city_id, city_id, start_date)
                .await?,
        );
        let return_series = merge_price_points(
            self.flights
                .fetch_price_series(city_id, &self.params.origin_city_id, start_date)
                .await?,
        );
        if outbound_series.is_empty() || return_series.is_empty() {
            warn!(city = %city_name, "missing fare series in at least one direction");
            return Ok(0);
        }

        // Phase 2: every date pairing under the duration cap.
        let candidates = generate_trip_candidates(
            &outbound_series,
            &return_series,
            self.params.max_num_nights(),
        );
        if candidates.is_empty() {
            warn!(city = %city_name, "no feasible date pairings in range");
            return Ok(0);
        }
        info!(city = %city_name, candidates = candidates.len(), "generated trip candidates");

        // Phase 3: lodging searches for a handful of sampled durations.
        let listings_by_duration = self.sample_lodging(city_name, start_date).await;
        if listings_by_duration.is_empty() {
            warn!(city = %city_name, "no lodging found for any sampled duration");
            return Ok(0);
        }

        // Phase 4: one calendar per distinct listing.
        let calendars = self.fetch_calendars(&listings_by_duration).await;

        // Phase 5: rough scoring and ranking.
        let estimates =
            estimate_trips(&candidates, &listings_by_duration, &calendars, &self.params);
        if estimates.is_empty() {
            warn!(city = %city_name, "no candidate cleared estimation");
            return Ok(0);
        }
        info!(city = %city_name, estimates = estimates.len(), "candidates cleared estimation");
        let shortlist = rank_candidates(estimates, self.params.num_candidates_to_validate);

        // Phase 6: confirm the shortlist against exact flights.
        let confirmed = self.validate_shortlist(city_id, city_name, shortlist).await?;
        if confirmed.is_empty() {
            warn!(city = %city_name, "no shortlisted trip survived validation");
            return Ok(0);
        }

        let stored = confirmed.len();
        self.store.put(city_name, confirmed)?;
        info!(city = %city_name, results = stored, "persisted validated trips");
        Ok(stored)
    }

    // Searching every candidate's exact dates would be one search per
    // pairing; a few representative durations from a fixed check-in
    // cover the same price landscape in a handful of calls.
    async fn sample_lodging(
        &self,
        city_name: &str,
        start_date: NaiveDate,
    ) -> BTreeMap<u32, Vec<LodgingOption>> {
        let max_nights = self.params.max_num_nights();
        let checkin = start_date.format(DATE_FORMAT).to_string();
        let mut listings_by_duration = BTreeMap::new();

        for &nights in &self.params.sampled_durations {
            if nights == 0 || nights > max_nights {
                continue;
            }
            let checkout = (start_date + Duration::days(nights as i64))
                .format(DATE_FORMAT)
                .to_string();

            let options = self
                .lodging
                .fetch_lodging_options(city_name, &checkin, &checkout)
                .await;
            if options.is_empty() {
                warn!(city = %city_name, nights, "no listings for sampled duration");
                continue;
            }
            info!(city = %city_name, nights, listings = options.len(), "sampled lodging");
            listings_by_duration.insert(nights, options);
        }

        listings_by_duration
    }

    // A listing can appear under several sampled durations; its
    // calendar is fetched once. Empty calendars are cached too so the
    // matcher can tell "scan failed" from "never scanned".
    async fn fetch_calendars(
        &self,
        listings_by_duration: &BTreeMap<u32, Vec<LodgingOption>>,
    ) -> CalendarCache {
        let links: BTreeSet<&str> = listings_by_duration
            .values()
            .flatten()
            .map(|listing| listing.link.as_str())
            .collect();
        info!(calendars = links.len(), "scanning listing calendars");

        let calendars = CalendarCache::new();
        for link in links {
            let calendar = self
                .lodging
                .fetch_lodging_calendar(link, self.params.airbnb_calendar_months_to_scan)
                .await;
            if calendar.is_empty() {
                warn!(link, "no availability data for listing");
            }
            calendars.insert(link.to_string(), calendar);
        }
        calendars
    }

    // Confirms shortlisted estimates cheapest-first. Estimates are
    // optimistic, so once the next estimate is no better than the best
    // confirmed cost-per-hour nothing later can win either.
    async fn validate_shortlist(
        &self,
        city_id: &str,
        city_name: &str,
        shortlist: Vec<EstimatedTrip>,
    ) -> Result<Vec<ConfirmedTrip>, EngineError> {
        let mut confirmed: Vec<ConfirmedTrip> = Vec::new();
        let mut best_cost_per_hour = f64::INFINITY;

        for estimate in shortlist {
            if estimate.estimated_cost_per_hour >= best_cost_per_hour {
                info!(city = %city_name, "remaining estimates cannot beat confirmed trips");
                break;
            }

            let candidate = &estimate.candidate;
            info!(
                city = %city_name,
                outbound = %candidate.outbound_date,
                returning = %candidate.return_date,
                estimated_cost_per_hour = estimate.estimated_cost_per_hour,
                "validating candidate"
            );

            let outbound_legs = self
                .flights
                .fetch_exact_flight_details(
                    &self.params.origin_city_id,
                    city_id,
                    &candidate.outbound_date,
                )
                .await?;
            let Some(outbound) = outbound_legs.into_iter().next() else {
                continue;
            };

            let return_legs = self
                .flights
                .fetch_exact_flight_details(
                    city_id,
                    &self.params.origin_city_id,
                    &candidate.return_date,
                )
                .await?;
            let Some(return_leg) = return_legs.into_iter().next() else {
                continue;
            };

            let arrival = outbound.arrival_time.as_deref().unwrap_or(MIDNIGHT);
            let departure = return_leg.departure_time.as_deref().unwrap_or(MIDNIGHT);
            let hours = exploration_hours(arrival, departure, candidate.num_nights, &self.params);
            if hours < self.params.min_exploration_hours {
                info!(
                    city = %city_name,
                    outbound = %candidate.outbound_date,
                    hours,
                    "rejected: not enough usable exploration time"
                );
                continue;
            }

            let flight_total = outbound.price + return_leg.price;
            let total_cost = flight_total + estimate.matched_accommodation.total_cost;
            let cost_per_hour = if hours > 0.0 {
                total_cost / hours
            } else {
                f64::INFINITY
            };
            if !cost_per_hour.is_finite() {
                continue;
            }

            info!(
                city = %city_name,
                outbound = %candidate.outbound_date,
                total_cost,
                cost_per_hour,
                "confirmed trip package"
            );
            confirmed.push(ConfirmedTrip {
                destination: city_name.to_string(),
                outbound_date: candidate.outbound_date.clone(),
                return_date: candidate.return_date.clone(),
                total_cost: round2(total_cost),
                cost_per_hour_of_exploration: round2(cost_per_hour),
                exploration_hours: hours,
                flights: FlightPair {
                    total_price: flight_total,
                    outbound,
                    return_leg,
                },
                accommodation: estimate.matched_accommodation,
            });
            best_cost_per_hour = best_cost_per_hour.min(cost_per_hour);
        }

        confirmed.sort_by(|a, b| {
            a.cost_per_hour_of_exploration
                .total_cmp(&b.cost_per_hour_of_exploration)
        });
        confirmed.truncate(self.params.num_final_results_to_store);
        Ok(confirmed)
    }

    // Closing summary of everything the store holds after a run.
    pub fn report(&self) {
        let snapshot = self.store.snapshot();
        info!(destinations = snapshot.len(), "run complete");

        for (destination, trips) in &snapshot {
            if let Some(best) = trips.first() {
                info!(
                    destination = %destination,
                    options = trips.len(),
                    outbound = %best.outbound_date,
                    returning = %best.return_date,
                    total_cost = best.total_cost,
                    exploration_hours = best.exploration_hours,
                    cost_per_hour = best.cost_per_hour_of_exploration,
                    "best package"
                );
            }
        }
    }
}
