//! `PlaceScout` - destination content aggregation and guide retrieval
//!
//! This library enriches a place name with third-party travel content:
//! nearby points of interest, a structured multi-section travel guide,
//! a short descriptive summary and a forecast-derived climate profile,
//! each sourced from independent upstream providers with inconsistent
//! schemas and partial availability.

pub mod climate;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod geocode;
pub mod guide;
pub mod models;
pub mod places;

// Re-export core types for public API
pub use config::PlaceScoutConfig;
pub use engine::{Guide, TravelEngine};
pub use error::PlaceScoutError;
pub use fetch::{Candidate, Fetch, HttpFetcher};
pub use geocode::GeocodedPlace;
pub use guide::{SECTION_UNAVAILABLE, sanitize_section};
pub use models::{
    ClimateMonth, DailyOutlook, ForecastSample, GeoPoint, GuideSectionRef, MonthRating, Place,
    PlaceDetail, Summary, SummarySource,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlaceScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
