//! Aggregation engine
//!
//! Owns the fetcher handle and the process-wide caches, and exposes the
//! consumer-facing operations. Every upstream problem degrades to an
//! empty or absent value; no operation here is fatal to the process.

use std::sync::Arc;

use tracing::{debug, info};

use crate::Result;
use crate::climate::{ClimateCache, ForecastClient, aggregate_months};
use crate::config::PlaceScoutConfig;
use crate::fetch::{Fetch, HttpFetcher};
use crate::geocode::{GeocodedPlace, GeocodingClient};
use crate::guide::{SectionCache, SummaryResolver, WikivoyageClient, resolve_section_refs};
use crate::models::{ClimateMonth, GuideSectionRef, Place, PlaceDetail, Summary};
use crate::places::PlacesClient;

/// A resolved guide: the ordered section refs plus the first section's
/// sanitized content for immediate display
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    /// Section refs in vocabulary order; empty means guide unavailable
    pub sections: Vec<GuideSectionRef>,
    /// Sanitized content of the first section, prefetched; the remaining
    /// sections are warm in the cache
    pub initial_html: Option<String>,
}

/// Content aggregation engine for destination enrichment
pub struct TravelEngine {
    fetcher: Arc<dyn Fetch>,
    config: PlaceScoutConfig,
    places: PlacesClient,
    geocoding: GeocodingClient,
    forecast: ForecastClient,
    wikivoyage: WikivoyageClient,
    summaries: SummaryResolver,
    sections: SectionCache,
    climate: ClimateCache,
}

impl TravelEngine {
    /// Create an engine with the production HTTP fetcher
    pub fn new(config: PlaceScoutConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Create an engine over an arbitrary fetcher (used by tests)
    #[must_use]
    pub fn with_fetcher(config: PlaceScoutConfig, fetcher: Arc<dyn Fetch>) -> Self {
        let places = PlacesClient::new(config.places.clone());
        let geocoding = GeocodingClient::new(config.geocoding.clone());
        let forecast = ForecastClient::new(config.weather.clone());
        let wikivoyage = WikivoyageClient::new(config.guide.base_url.clone());
        let summaries = SummaryResolver::new(config.guide.encyclopedia_base_url.clone());
        let sections = SectionCache::new(config.guide.cache_failed_sections);
        Self {
            fetcher,
            config,
            places,
            geocoding,
            forecast,
            wikivoyage,
            summaries,
            sections,
            climate: ClimateCache::new(),
        }
    }

    /// Resolve a free-text place name to its best-matching coordinates
    pub async fn geocode(&self, name: &str) -> Option<GeocodedPlace> {
        self.geocoding.geocode(self.fetcher.as_ref(), name).await
    }

    /// Nearby attractions around a point, via the tiered fallback search
    pub async fn resolve_places(&self, lat: f64, lon: f64, radius_m: f64) -> Vec<Place> {
        self.places
            .search(self.fetcher.as_ref(), lat, lon, radius_m)
            .await
    }

    /// Richer detail for one place; failures degrade to `None` without
    /// affecting any place list
    pub async fn place_detail(&self, external_id: &str) -> Option<PlaceDetail> {
        self.places.detail(self.fetcher.as_ref(), external_id).await
    }

    /// Short descriptive summary, guide tier first, encyclopedia second
    pub async fn resolve_summary(&self, title: &str) -> Option<Summary> {
        self.summaries
            .resolve(&self.wikivoyage, self.fetcher.as_ref(), title)
            .await
    }

    /// Resolve the guide for a title: map the wanted topic vocabulary
    /// onto the provider's section listing, prefetch every matched
    /// section concurrently, and return the first section's content as
    /// the initial view.
    pub async fn resolve_guide(&self, title: &str) -> Guide {
        let sections = match self.wikivoyage.outline(self.fetcher.as_ref(), title).await {
            Ok(sections) => sections,
            Err(e) => {
                debug!("Guide outline for '{title}' failed: {e:#}");
                return Guide {
                    sections: Vec::new(),
                    initial_html: None,
                };
            }
        };

        let refs = resolve_section_refs(&self.config.guide.wanted_sections, &sections);
        if refs.is_empty() {
            info!("Guide for '{title}' has no matching sections");
            return Guide {
                sections: refs,
                initial_html: None,
            };
        }

        let initial_html = self
            .sections
            .prefetch_all(&self.wikivoyage, self.fetcher.as_ref(), title, &refs)
            .await;
        Guide {
            sections: refs,
            initial_html,
        }
    }

    /// Sanitized content for one guide section, served from the cache
    /// when warm
    pub async fn guide_section(&self, title: &str, section_id: i64) -> String {
        self.sections
            .get(&self.wikivoyage, self.fetcher.as_ref(), title, section_id)
            .await
    }

    /// Forecast-derived climate profile for a destination.
    ///
    /// The result approximates near-future months only and must not be
    /// presented as long-run climate data without qualification.
    pub async fn resolve_climate(
        &self,
        title: &str,
        lat: f64,
        lon: f64,
    ) -> Option<Vec<ClimateMonth>> {
        let key = ClimateCache::key(title, lat, lon);
        if let Some(cached) = self.climate.get(&key).await {
            debug!("Climate cache hit for {key}");
            return Some(cached);
        }

        let samples = self.forecast.samples(self.fetcher.as_ref(), lat, lon).await?;
        let months = aggregate_months(&samples);
        if months.is_empty() {
            return None;
        }

        self.climate.put(key, months.clone()).await;
        Some(months)
    }
}
