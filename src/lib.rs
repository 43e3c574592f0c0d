// Trip optimizer: finds the cheapest round-trip flight plus lodging
// package per destination, ranked by cost per usable exploration hour.

pub mod collaborators;
pub mod combinations;
pub mod config;
pub mod engine;
pub mod estimator;
pub mod exploration;
pub mod matcher;
pub mod model;
pub mod store;

// Re-export key types for convenience
pub use collaborators::{
    calculate_backoff, CollaboratorError, FlightProvider, LodgingProvider, RetryPolicy,
};
pub use config::{AppConfig, ConfigError, CountryPlan, FilePaths, SearchParameters};
pub use engine::{EngineError, RunSummary, TripOptimizer};
pub use model::{
    AvailabilityCalendar, CalendarCache, ConfirmedTrip, EstimatedTrip, FlightLeg, FlightPair,
    LodgingOption, PricePoint, TripCandidate,
};
pub use store::{ResultStore, StoreError};
