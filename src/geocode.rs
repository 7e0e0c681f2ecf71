//! Geocoding adapter (Nominatim)
//!
//! Resolves a free-text place name to coordinates, single best match only.

use serde::Deserialize;
use tracing::debug;

use crate::config::GeocodingConfig;
use crate::fetch::Fetch;

/// Best-match geocoding result for a free-text query
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub lat: f64,
    pub lon: f64,
    /// Full display name as reported by the provider
    pub display_name: String,
}

/// The provider reports coordinates as decimal strings
#[derive(Debug, Deserialize)]
struct RawGeocodeHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Client for the geocoding provider
pub struct GeocodingClient {
    config: GeocodingConfig,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(config: GeocodingConfig) -> Self {
        Self { config }
    }

    /// Resolve a place name to its best-matching coordinates.
    ///
    /// No match, a transport failure or an unparsable hit all degrade
    /// to `None`.
    pub async fn geocode(&self, fetcher: &dyn Fetch, name: &str) -> Option<GeocodedPlace> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1&accept-language=en",
            self.config.base_url,
            urlencoding::encode(name)
        );

        let raw = match fetcher.get_json(&url).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Geocoding '{name}' failed: {e:#}");
                return None;
            }
        };

        let hits: Vec<RawGeocodeHit> = serde_json::from_value(raw).ok()?;
        let hit = hits.into_iter().next()?;

        let lat = hit.lat.parse().ok()?;
        let lon = hit.lon.parse().ok()?;
        Some(GeocodedPlace {
            lat,
            lon,
            display_name: hit.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::ScriptedFetch;
    use serde_json::json;

    fn client() -> GeocodingClient {
        GeocodingClient::new(GeocodingConfig::default())
    }

    #[tokio::test]
    async fn test_geocode_best_match() {
        let fetcher = ScriptedFetch::new(vec![Ok(json!([
            {"lat": "48.8566", "lon": "2.3522", "display_name": "Paris, Île-de-France, France"},
            {"lat": "33.66", "lon": "-95.55", "display_name": "Paris, Texas"}
        ]))]);

        let hit = client().geocode(&fetcher, "Paris").await.unwrap();
        assert_eq!(hit.lat, 48.8566);
        assert_eq!(hit.lon, 2.3522);
        assert!(hit.display_name.starts_with("Paris, Île-de-France"));
    }

    #[tokio::test]
    async fn test_geocode_no_results() {
        let fetcher = ScriptedFetch::new(vec![Ok(json!([]))]);
        assert!(client().geocode(&fetcher, "Nowhereville").await.is_none());
    }

    #[tokio::test]
    async fn test_geocode_transport_failure_degrades() {
        let fetcher = ScriptedFetch::new(vec![Err(anyhow::anyhow!("timeout"))]);
        assert!(client().geocode(&fetcher, "Paris").await.is_none());
    }

    #[tokio::test]
    async fn test_geocode_query_is_encoded() {
        let fetcher = ScriptedFetch::new(vec![Ok(json!([]))]);
        let _ = client().geocode(&fetcher, "São Paulo").await;

        let urls = fetcher.urls.lock().unwrap();
        assert!(urls[0].contains("q=S%C3%A3o%20Paulo"));
        assert!(urls[0].contains("limit=1"));
    }
}
