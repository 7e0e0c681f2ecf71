//! Canonical record shapes shared across the engine
//!
//! Every provider adapter normalizes its upstream payload into one of
//! these types before anything else sees it.

pub mod climate;
pub mod guide;
pub mod place;

pub use climate::{ClimateMonth, DailyOutlook, ForecastSample, MonthRating};
pub use guide::{GuideSectionRef, Summary, SummarySource};
pub use place::{GeoPoint, Place, PlaceDetail};
