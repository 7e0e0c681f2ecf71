//! Places-by-area adapter (OpenTripMap)
//!
//! Builds the ordered candidate queries for nearby attractions, normalizes
//! the provider's two response shapes into canonical [`Place`] records and
//! exposes the lazy per-place detail lookup.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::PlacesConfig;
use crate::fetch::{Candidate, Fetch, first_acceptable, non_empty};
use crate::models::{GeoPoint, Place, PlaceDetail};

/// Category filter for the narrow first-tier query
const SIGHT_KINDS: &str = "interesting_places,sights,architecture,historic";

/// Minimum provider rating requested from radius queries
const MIN_RATE: u32 = 2;

/// Client for the places-by-area and place-detail endpoints
pub struct PlacesClient {
    config: PlacesConfig,
}

/// A normalized place together with the provider's distance hint,
/// kept only long enough to order results before acceptance
#[derive(Debug, Clone)]
struct ScoredPlace {
    place: Place,
    dist: f64,
}

/// The provider answers radius queries with flat point-tagged items and
/// bbox queries with GeoJSON-like features; the discriminant is resolved
/// here, once, instead of probing fields downstream.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPlace {
    Point {
        name: String,
        point: GeoPoint,
        #[serde(default)]
        dist: Option<f64>,
        #[serde(default)]
        xid: Option<String>,
    },
    Feature {
        geometry: RawGeometry,
        #[serde(default)]
        properties: RawProperties,
    },
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    /// GeoJSON order: [lon, lat]
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    name: Option<String>,
    xid: Option<String>,
    dist: Option<f64>,
}

impl RawPlace {
    /// Convert to a canonical place, dropping records that would violate
    /// the "name and point always present" invariant.
    fn into_scored(self) -> Option<ScoredPlace> {
        match self {
            RawPlace::Point {
                name,
                point,
                dist,
                xid,
            } => {
                if name.is_empty() {
                    return None;
                }
                Some(ScoredPlace {
                    place: Place {
                        name,
                        point,
                        external_id: xid,
                    },
                    dist: dist.unwrap_or(0.0),
                })
            }
            RawPlace::Feature {
                geometry,
                properties,
            } => {
                let name = properties.name.filter(|n| !n.is_empty())?;
                let (&lon, &lat) = match geometry.coordinates.as_slice() {
                    [lon, lat, ..] => (lon, lat),
                    _ => return None,
                };
                Some(ScoredPlace {
                    place: Place {
                        name,
                        point: GeoPoint { lat, lon },
                        external_id: properties.xid,
                    },
                    dist: properties.dist.unwrap_or(0.0),
                })
            }
        }
    }
}

impl PlacesClient {
    #[must_use]
    pub fn new(config: PlacesConfig) -> Self {
        Self { config }
    }

    /// Search for attractions near a point using the tiered fallback
    /// strategy: narrow filtered radius, broad unfiltered radius, then a
    /// bounding box derived from the radius.
    ///
    /// A missing API key disables the feature and yields an empty list;
    /// the provider is an optional enrichment, never a hard requirement.
    pub async fn search(
        &self,
        fetcher: &dyn Fetch,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> Vec<Place> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            debug!("Places API key not configured, skipping attraction search");
            return Vec::new();
        };

        let candidates = self.build_candidates(api_key, lat, lon, radius_m);
        let scored = first_acceptable(fetcher, &candidates, normalize_places, non_empty).await;

        info!("Found {} attractions near ({lat}, {lon})", scored.len());
        scored.into_iter().map(|s| s.place).collect()
    }

    /// Fetch richer detail for one place by its external id.
    ///
    /// Failures degrade to `None`; the place list is never affected.
    pub async fn detail(&self, fetcher: &dyn Fetch, external_id: &str) -> Option<PlaceDetail> {
        let api_key = self.config.api_key.as_deref()?;
        let url = format!(
            "{}/xid/{}?apikey={}",
            self.config.base_url,
            urlencoding::encode(external_id),
            api_key
        );

        let raw = match fetcher.get_json(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Detail lookup for '{external_id}' failed: {e:#}");
                return None;
            }
        };

        Some(PlaceDetail {
            preview_image: raw
                .pointer("/preview/source")
                .and_then(Value::as_str)
                .map(String::from),
            extract: raw
                .pointer("/wikipedia_extracts/text")
                .and_then(Value::as_str)
                .or_else(|| raw.pointer("/info/descr").and_then(Value::as_str))
                .map(String::from),
            locality: raw
                .pointer("/address/city")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }

    fn build_candidates(
        &self,
        api_key: &str,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> Vec<Candidate> {
        let limit = self.config.limit;
        let base = &self.config.base_url;

        let narrow = radius_m.clamp(500.0, 3000.0);
        let broad = radius_m.clamp(1000.0, 5000.0);
        // Convert the requested radius to a degree span for the bbox tier
        let deg = (radius_m / 120_000.0).clamp(0.01, 0.08);

        vec![
            Candidate::new(
                "radius-filtered",
                format!(
                    "{base}/radius?apikey={api_key}&radius={narrow}&lon={lon}&lat={lat}\
                     &kinds={SIGHT_KINDS}&rate={MIN_RATE}&format=json&limit={limit}"
                ),
            ),
            Candidate::new(
                "radius-broad",
                format!(
                    "{base}/radius?apikey={api_key}&radius={broad}&lon={lon}&lat={lat}\
                     &rate={MIN_RATE}&format=json&limit={limit}"
                ),
            ),
            Candidate::new(
                "bbox",
                format!(
                    "{base}/bbox?apikey={api_key}&lon_min={}&lon_max={}&lat_min={}&lat_max={}\
                     &rate={MIN_RATE}&format=json&limit={limit}",
                    lon - deg,
                    lon + deg,
                    lat - deg,
                    lat + deg
                ),
            ),
        ]
    }
}

/// Normalize a raw provider response into scored places.
///
/// The body is either a bare array (radius format) or a feature
/// collection; malformed items are dropped one by one, never the whole
/// batch. Results are sorted by the provider distance hint ascending,
/// with missing distances sorting first, before the acceptance check.
fn normalize_places(raw: &Value) -> Vec<ScoredPlace> {
    let items = raw
        .as_array()
        .or_else(|| raw.get("features").and_then(Value::as_array));

    let Some(items) = items else {
        return Vec::new();
    };

    let mut scored: Vec<ScoredPlace> = items
        .iter()
        .filter_map(|item| serde_json::from_value::<RawPlace>(item.clone()).ok())
        .filter_map(RawPlace::into_scored)
        .collect();

    scored.sort_by(|a, b| a.dist.total_cmp(&b.dist));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_with_key() -> PlacesClient {
        PlacesClient::new(PlacesConfig {
            api_key: Some("test-key".to_string()),
            ..PlacesConfig::default()
        })
    }

    #[test]
    fn test_candidate_order_and_clamping() {
        let client = client_with_key();
        let candidates = client.build_candidates("test-key", 48.85, 2.35, 10_000.0);

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].label, "radius-filtered");
        assert_eq!(candidates[1].label, "radius-broad");
        assert_eq!(candidates[2].label, "bbox");

        // 10km request clamps to the per-tier ceilings
        assert!(candidates[0].url.contains("radius=3000"));
        assert!(candidates[0].url.contains("kinds=interesting_places"));
        assert!(candidates[1].url.contains("radius=5000"));
        assert!(!candidates[1].url.contains("kinds="));
        // 10000 / 120000 = 0.0833.. clamps to the 0.08 degree ceiling
        assert!(candidates[2].url.contains("/bbox?"));
        assert!(candidates[2].url.contains(&format!("lon_min={}", 2.35 - 0.08)));
    }

    #[test]
    fn test_candidate_radius_floor() {
        let client = client_with_key();
        let candidates = client.build_candidates("test-key", 48.85, 2.35, 100.0);

        assert!(candidates[0].url.contains("radius=500"));
        assert!(candidates[1].url.contains("radius=1000"));
        // 100 / 120000 clamps up to the 0.01 degree floor
        assert!(candidates[2].url.contains(&format!("lat_min={}", 48.85 - 0.01)));
    }

    #[test]
    fn test_normalize_point_shape_passthrough() {
        let raw = json!([
            {"name": "Old Bridge", "point": {"lat": 43.7, "lon": 11.25}, "dist": 120.0, "xid": "W123"}
        ]);
        let scored = normalize_places(&raw);

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].place.name, "Old Bridge");
        assert_eq!(scored[0].place.point.lat, 43.7);
        assert_eq!(scored[0].place.external_id.as_deref(), Some("W123"));
    }

    #[test]
    fn test_normalize_geometry_shape_converted() {
        let raw = json!({"features": [
            {"geometry": {"coordinates": [11.25, 43.7]}, "properties": {"name": "Duomo", "xid": "N9"}}
        ]});
        let scored = normalize_places(&raw);

        assert_eq!(scored.len(), 1);
        let place = &scored[0].place;
        assert_eq!(place.name, "Duomo");
        // GeoJSON coordinate order is [lon, lat]
        assert_eq!(place.point.lat, 43.7);
        assert_eq!(place.point.lon, 11.25);
        assert_eq!(place.external_id.as_deref(), Some("N9"));
    }

    #[test]
    fn test_normalize_drops_malformed_items_only() {
        let raw = json!([
            {"name": "Kept", "point": {"lat": 1.0, "lon": 2.0}},
            {"name": "", "point": {"lat": 1.0, "lon": 2.0}},
            {"name": "No point"},
            {"geometry": {"coordinates": [2.0]}, "properties": {"name": "Short coords"}},
            {"geometry": {"coordinates": [2.0, 1.0]}, "properties": {}},
            42
        ]);
        let scored = normalize_places(&raw);

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].place.name, "Kept");
    }

    #[test]
    fn test_normalize_sorts_by_distance_missing_first() {
        let raw = json!([
            {"name": "Far", "point": {"lat": 1.0, "lon": 2.0}, "dist": 900.0},
            {"name": "Near", "point": {"lat": 1.0, "lon": 2.0}, "dist": 10.0},
            {"name": "Unknown", "point": {"lat": 1.0, "lon": 2.0}}
        ]);
        let scored = normalize_places(&raw);

        let names: Vec<&str> = scored.iter().map(|s| s.place.name.as_str()).collect();
        assert_eq!(names, vec!["Unknown", "Near", "Far"]);
    }

    #[test]
    fn test_normalize_non_list_body_is_empty() {
        assert!(normalize_places(&json!({"error": "bad request"})).is_empty());
        assert!(normalize_places(&json!("plain string")).is_empty());
    }

    #[tokio::test]
    async fn test_search_without_api_key_is_empty() {
        let client = PlacesClient::new(PlacesConfig::default());
        let fetcher = crate::fetch::tests::ScriptedFetch::new(vec![]);

        let places = client.search(&fetcher, 48.85, 2.35, 3000.0).await;

        assert!(places.is_empty());
        assert_eq!(
            fetcher.calls.load(std::sync::atomic::Ordering::SeqCst),
            0,
            "no upstream call may be issued without a key"
        );
    }

    #[tokio::test]
    async fn test_detail_failure_degrades_to_none() {
        let client = client_with_key();
        let fetcher =
            crate::fetch::tests::ScriptedFetch::new(vec![Err(anyhow::anyhow!("404 Not Found"))]);

        assert!(client.detail(&fetcher, "W123").await.is_none());
    }

    #[tokio::test]
    async fn test_detail_extracts_fields() {
        let client = client_with_key();
        let fetcher = crate::fetch::tests::ScriptedFetch::new(vec![Ok(json!({
            "preview": {"source": "https://img.example/p.jpg"},
            "wikipedia_extracts": {"text": "A medieval bridge."},
            "address": {"city": "Florence"}
        }))]);

        let detail = client.detail(&fetcher, "W123").await.unwrap();
        assert_eq!(
            detail.preview_image.as_deref(),
            Some("https://img.example/p.jpg")
        );
        assert_eq!(detail.extract.as_deref(), Some("A medieval bridge."));
        assert_eq!(detail.locality.as_deref(), Some("Florence"));
    }

    #[tokio::test]
    async fn test_detail_falls_back_to_info_descr() {
        let client = client_with_key();
        let fetcher = crate::fetch::tests::ScriptedFetch::new(vec![Ok(json!({
            "info": {"descr": "Local description."}
        }))]);

        let detail = client.detail(&fetcher, "W123").await.unwrap();
        assert!(detail.preview_image.is_none());
        assert_eq!(detail.extract.as_deref(), Some("Local description."));
    }
}
