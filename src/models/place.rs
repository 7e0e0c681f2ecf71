//! Place models for nearby points of interest

use serde::{Deserialize, Serialize};

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lon: f64,
}

/// A nearby point of interest
///
/// Normalization guarantees that `name` is non-empty and `point` is present
/// for every value handed to a caller; raw items failing that are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Display name of the attraction
    pub name: String,
    /// Location of the attraction
    pub point: GeoPoint,
    /// Opaque provider id usable for a detail lookup
    pub external_id: Option<String>,
}

/// Richer detail for a single place, fetched lazily by external id
///
/// Every field is optional; a failed detail lookup simply yields nothing
/// and never removes the place from its list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetail {
    /// Preview image URL, if the provider has one
    pub preview_image: Option<String>,
    /// Descriptive extract text
    pub extract: Option<String>,
    /// Locality (city) the place belongs to
    pub locality: Option<String>,
}

impl PlaceDetail {
    /// Pick the best available description, mirroring the provider's
    /// preference order (extract over locality).
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.extract
            .as_deref()
            .or(self.locality.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_description_prefers_extract() {
        let detail = PlaceDetail {
            preview_image: None,
            extract: Some("A grand old bridge.".to_string()),
            locality: Some("Florence".to_string()),
        };
        assert_eq!(detail.description(), Some("A grand old bridge."));
    }

    #[test]
    fn test_detail_description_falls_back_to_locality() {
        let detail = PlaceDetail {
            preview_image: None,
            extract: None,
            locality: Some("Florence".to_string()),
        };
        assert_eq!(detail.description(), Some("Florence"));
    }

    #[test]
    fn test_detail_description_absent() {
        assert_eq!(PlaceDetail::default().description(), None);
    }
}
