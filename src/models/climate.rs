//! Climate models derived from forecast time series
//!
//! These are forecast-derived approximations, not long-run climatology;
//! callers should present them with that qualification.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One raw forecast sample from the weather provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Sample timestamp (UTC)
    pub timestamp: DateTime<Utc>,
    /// Air temperature in degrees Celsius
    pub temperature_c: f64,
    /// Relative humidity in percent
    pub humidity_pct: f64,
    /// Rain volume for the sample window in millimeters, if reported
    pub rain_mm: Option<f64>,
}

/// Aggregate statistics for one calendar month
///
/// A month with no samples in the source data is simply absent; consumers
/// must treat missing months as unknown, never as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateMonth {
    /// Calendar month index, 0 = January .. 11 = December
    pub month: u32,
    /// Mean temperature across the month's samples
    pub avg_temperature_c: f64,
    /// Mean relative humidity across the month's samples
    pub avg_humidity_pct: f64,
    /// Summed rain volume across the month's samples
    pub total_rain_mm: f64,
}

/// Coarse travel-comfort classification of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthRating {
    Good,
    Bad,
}

impl ClimateMonth {
    /// Classify the month for travel comfort: mild temperatures and
    /// moderate rain rate as good, everything else as bad.
    #[must_use]
    pub fn rating(&self) -> MonthRating {
        let mild = (15.0..=30.0).contains(&self.avg_temperature_c);
        if mild && self.total_rain_mm < 100.0 {
            MonthRating::Good
        } else {
            MonthRating::Bad
        }
    }
}

/// Min/max temperature outlook for one day of the forecast window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyOutlook {
    /// Calendar date (UTC)
    pub date: NaiveDate,
    /// Lowest sampled temperature of the day
    pub min_c: f64,
    /// Highest sampled temperature of the day
    pub max_c: f64,
}
