//! Forecast adapter and climate aggregation
//!
//! Buckets time-stamped forecast samples by calendar month to approximate
//! a climate profile. This substitutes near-future forecast aggregation
//! for true historical climatology; the output must be presented with
//! that qualification.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::WeatherConfig;
use crate::fetch::Fetch;
use crate::models::{ClimateMonth, DailyOutlook, ForecastSample};

/// Client for the forecast provider
pub struct ForecastClient {
    config: WeatherConfig,
}

impl ForecastClient {
    #[must_use]
    pub fn new(config: WeatherConfig) -> Self {
        Self { config }
    }

    /// Fetch the raw forecast time series for a point.
    ///
    /// A missing API key or any upstream failure yields `None`; the
    /// climate feature is an optional enrichment.
    pub async fn samples(
        &self,
        fetcher: &dyn Fetch,
        lat: f64,
        lon: f64,
    ) -> Option<Vec<ForecastSample>> {
        let api_key = self.config.api_key.as_deref()?;
        let url = format!(
            "{}/forecast?lat={lat}&lon={lon}&units=metric&appid={api_key}",
            self.config.base_url
        );

        let raw = match fetcher.get_json(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Forecast fetch for ({lat}, {lon}) failed: {e:#}");
                return None;
            }
        };

        let response: openweather::ForecastResponse = serde_json::from_value(raw).ok()?;
        Some(response.into_samples())
    }
}

/// Aggregate forecast samples into one record per calendar month present.
///
/// Temperature and humidity are averaged; rain is summed. Months with no
/// samples are absent from the output, never zeroed. Output is ordered by
/// month index.
#[must_use]
pub fn aggregate_months(samples: &[ForecastSample]) -> Vec<ClimateMonth> {
    struct Bucket {
        temps: Vec<f64>,
        humids: Vec<f64>,
        rain: f64,
    }

    let mut by_month: BTreeMap<u32, Bucket> = BTreeMap::new();
    for sample in samples {
        let month = sample.timestamp.month0();
        let bucket = by_month.entry(month).or_insert_with(|| Bucket {
            temps: Vec::new(),
            humids: Vec::new(),
            rain: 0.0,
        });
        bucket.temps.push(sample.temperature_c);
        bucket.humids.push(sample.humidity_pct);
        bucket.rain += sample.rain_mm.unwrap_or(0.0);
    }

    by_month
        .into_iter()
        .map(|(month, bucket)| {
            let n = bucket.temps.len() as f64;
            ClimateMonth {
                month,
                avg_temperature_c: bucket.temps.iter().sum::<f64>() / n,
                avg_humidity_pct: bucket.humids.iter().sum::<f64>() / n,
                total_rain_mm: bucket.rain,
            }
        })
        .collect()
}

/// Per-day min/max temperature over the first `days` days of the series
#[must_use]
pub fn daily_outlook(samples: &[ForecastSample], days: usize) -> Vec<DailyOutlook> {
    let mut by_day: BTreeMap<chrono::NaiveDate, (f64, f64)> = BTreeMap::new();
    for sample in samples {
        let date = sample.timestamp.date_naive();
        let entry = by_day
            .entry(date)
            .or_insert((sample.temperature_c, sample.temperature_c));
        entry.0 = entry.0.min(sample.temperature_c);
        entry.1 = entry.1.max(sample.temperature_c);
    }

    by_day
        .into_iter()
        .take(days)
        .map(|(date, (min_c, max_c))| DailyOutlook { date, min_c, max_c })
        .collect()
}

/// Process-wide cache of aggregated climate profiles
///
/// Keyed by destination name plus coordinates rounded to two decimals, so
/// nearby lookups for the same destination share one provider call.
/// Shared by concurrent aggregation requests; entries never expire within
/// a run.
#[derive(Default)]
pub struct ClimateCache {
    entries: Mutex<HashMap<String, Vec<ClimateMonth>>>,
}

impl ClimateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the cache key for a destination at a point
    #[must_use]
    pub fn key(name: &str, lat: f64, lon: f64) -> String {
        format!("{name}:{lat:.2}:{lon:.2}")
    }

    pub async fn get(&self, key: &str) -> Option<Vec<ClimateMonth>> {
        self.entries.lock().await.get(key).cloned()
    }

    pub async fn put(&self, key: String, months: Vec<ClimateMonth>) {
        self.entries.lock().await.insert(key, months);
    }
}

/// `OpenWeatherMap` forecast response structures and conversion
mod openweather {
    use super::{DateTime, ForecastSample, Utc};
    use serde::Deserialize;

    /// 5-day / 3-hour forecast response
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        #[serde(default)]
        pub list: Vec<ForecastItem>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ForecastItem {
        /// Unix timestamp (seconds)
        pub dt: i64,
        pub main: MainData,
        pub rain: Option<RainData>,
    }

    #[derive(Debug, Deserialize)]
    pub struct MainData {
        pub temp: f64,
        pub humidity: f64,
    }

    /// Rain volume keyed by accumulation window
    #[derive(Debug, Deserialize)]
    pub struct RainData {
        #[serde(rename = "3h")]
        pub three_h: Option<f64>,
        #[serde(rename = "1h")]
        pub one_h: Option<f64>,
    }

    impl ForecastResponse {
        /// Convert to canonical samples, dropping items whose timestamp
        /// does not resolve.
        pub fn into_samples(self) -> Vec<ForecastSample> {
            self.list
                .into_iter()
                .filter_map(|item| {
                    let timestamp: DateTime<Utc> = DateTime::from_timestamp(item.dt, 0)?;
                    let rain_mm = item.rain.and_then(|r| r.three_h.or(r.one_h));
                    Some(ForecastSample {
                        timestamp,
                        temperature_c: item.main.temp,
                        humidity_pct: item.main.humidity,
                        rain_mm,
                    })
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::ScriptedFetch;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample(ts: &str, temp: f64, humidity: f64, rain: Option<f64>) -> ForecastSample {
        ForecastSample {
            timestamp: ts.parse().unwrap(),
            temperature_c: temp,
            humidity_pct: humidity,
            rain_mm: rain,
        }
    }

    #[test]
    fn test_aggregate_means_and_rain_sum() {
        let samples = vec![
            sample("2026-06-01T09:00:00Z", 10.0, 40.0, Some(1.5)),
            sample("2026-06-02T12:00:00Z", 20.0, 50.0, Some(2.5)),
            sample("2026-06-03T15:00:00Z", 30.0, 60.0, None),
        ];
        let months = aggregate_months(&samples);

        assert_eq!(months.len(), 1);
        let june = &months[0];
        assert_eq!(june.month, 5);
        assert_eq!(june.avg_temperature_c, 20.0);
        assert_eq!(june.avg_humidity_pct, 50.0);
        // Rain is summed, not averaged
        assert_eq!(june.total_rain_mm, 4.0);
    }

    #[test]
    fn test_aggregate_missing_months_absent() {
        let samples = vec![
            sample("2026-06-30T23:00:00Z", 18.0, 55.0, None),
            sample("2026-07-01T02:00:00Z", 22.0, 65.0, Some(0.4)),
        ];
        let months = aggregate_months(&samples);

        let indices: Vec<u32> = months.iter().map(|m| m.month).collect();
        assert_eq!(indices, vec![5, 6]);
    }

    #[test]
    fn test_aggregate_empty_input() {
        assert!(aggregate_months(&[]).is_empty());
    }

    #[test]
    fn test_daily_outlook_min_max() {
        let samples = vec![
            sample("2026-06-01T06:00:00Z", 12.0, 50.0, None),
            sample("2026-06-01T15:00:00Z", 24.0, 50.0, None),
            sample("2026-06-02T06:00:00Z", 14.0, 50.0, None),
        ];
        let outlook = daily_outlook(&samples, 5);

        assert_eq!(outlook.len(), 2);
        assert_eq!(outlook[0].min_c, 12.0);
        assert_eq!(outlook[0].max_c, 24.0);
        assert_eq!(outlook[1].min_c, 14.0);
        assert_eq!(outlook[1].max_c, 14.0);
    }

    #[test]
    fn test_daily_outlook_caps_days() {
        let samples: Vec<ForecastSample> = (1..=8)
            .map(|day| {
                let ts = Utc.with_ymd_and_hms(2026, 6, day, 12, 0, 0).unwrap();
                ForecastSample {
                    timestamp: ts,
                    temperature_c: 20.0,
                    humidity_pct: 50.0,
                    rain_mm: None,
                }
            })
            .collect();
        assert_eq!(daily_outlook(&samples, 5).len(), 5);
    }

    #[tokio::test]
    async fn test_samples_without_api_key() {
        let client = ForecastClient::new(WeatherConfig::default());
        let fetcher = ScriptedFetch::new(vec![]);

        assert!(client.samples(&fetcher, 48.85, 2.35).await.is_none());
        assert_eq!(fetcher.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_samples_parse_rain_windows() {
        let client = ForecastClient::new(WeatherConfig {
            api_key: Some("k".to_string()),
            ..WeatherConfig::default()
        });
        let fetcher = ScriptedFetch::new(vec![Ok(json!({
            "list": [
                {"dt": 1_780_000_000, "main": {"temp": 21.0, "humidity": 55.0}, "rain": {"3h": 1.2}},
                {"dt": 1_780_010_800, "main": {"temp": 19.0, "humidity": 60.0}, "rain": {"1h": 0.3}},
                {"dt": 1_780_021_600, "main": {"temp": 18.0, "humidity": 62.0}}
            ]
        }))]);

        let samples = client.samples(&fetcher, 48.85, 2.35).await.unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].rain_mm, Some(1.2));
        assert_eq!(samples[1].rain_mm, Some(0.3));
        assert_eq!(samples[2].rain_mm, None);
    }

    #[tokio::test]
    async fn test_climate_cache_roundtrip() {
        let cache = ClimateCache::new();
        let key = ClimateCache::key("Paris", 48.8566, 2.3522);
        assert_eq!(key, "Paris:48.86:2.35");

        assert!(cache.get(&key).await.is_none());
        cache
            .put(
                key.clone(),
                vec![ClimateMonth {
                    month: 0,
                    avg_temperature_c: 4.0,
                    avg_humidity_pct: 80.0,
                    total_rain_mm: 50.0,
                }],
            )
            .await;
        let cached = cache.get(&key).await.unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].month, 0);
    }
}
