//! Configuration management for the `PlaceScout` engine
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::{PlaceScoutError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `PlaceScout` engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceScoutConfig {
    /// Places-by-area provider configuration
    #[serde(default)]
    pub places: PlacesConfig,
    /// Forecast provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Travel guide provider configuration
    #[serde(default)]
    pub guide: GuideConfig,
    /// Geocoding provider configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Places-by-area provider settings (OpenTripMap)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// API key; the places feature is silently disabled without one
    pub api_key: Option<String>,
    /// Base URL for the places API
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Result cap per candidate query
    #[serde(default = "default_places_limit")]
    pub limit: u32,
}

/// Forecast provider settings (OpenWeatherMap)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// API key; climate aggregation is silently disabled without one
    pub api_key: Option<String>,
    /// Base URL for the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Travel guide provider settings (Wikivoyage primary, Wikipedia fallback)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideConfig {
    /// Home domain of the structured guide provider
    #[serde(default = "default_guide_base_url")]
    pub base_url: String,
    /// Home domain of the encyclopedia fallback provider
    #[serde(default = "default_encyclopedia_base_url")]
    pub encyclopedia_base_url: String,
    /// Ordered topic labels wanted from a guide's section listing
    #[serde(default = "default_wanted_sections")]
    pub wanted_sections: Vec<String>,
    /// Whether a failed section fetch is cached as an unavailable
    /// sentinel (no retry this run) or left uncached (retry on demand)
    #[serde(default = "default_cache_failed_sections")]
    pub cache_failed_sections: bool,
}

/// Geocoding provider settings (Nominatim)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
}

/// Shared HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_places_base_url() -> String {
    "https://api.opentripmap.com/0.1/en/places".to_string()
}

fn default_places_limit() -> u32 {
    30
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_guide_base_url() -> String {
    "https://en.wikivoyage.org".to_string()
}

fn default_encyclopedia_base_url() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_wanted_sections() -> Vec<String> {
    ["Get in", "See", "Do", "Eat", "Respect", "Stay safe"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_cache_failed_sections() -> bool {
    true
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_http_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("PlaceScout/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            limit: default_places_limit(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            base_url: default_guide_base_url(),
            encyclopedia_base_url: default_encyclopedia_base_url(),
            wanted_sections: default_wanted_sections(),
            cache_failed_sections: default_cache_failed_sections(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for PlaceScoutConfig {
    fn default() -> Self {
        Self {
            places: PlacesConfig::default(),
            weather: WeatherConfig::default(),
            guide: GuideConfig::default(),
            geocoding: GeocodingConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PlaceScoutConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with PLACESCOUT_ prefix
        builder = builder.add_source(
            Environment::with_prefix("PLACESCOUT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PlaceScoutError::config(format!("Failed to build configuration: {e}")))?;

        let config: PlaceScoutConfig = settings.try_deserialize().map_err(|e| {
            PlaceScoutError::config(format!("Failed to deserialize configuration: {e}"))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("placescout").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    ///
    /// Keys are optional throughout; a present-but-empty key is treated as
    /// a configuration mistake rather than silently disabling a feature.
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.places.api_key {
            if api_key.is_empty() {
                return Err(PlaceScoutError::config(
                    "Places API key cannot be empty if provided. Either remove it or provide a valid key."
                ));
            }
        }

        if let Some(api_key) = &self.weather.api_key {
            if api_key.is_empty() {
                return Err(PlaceScoutError::config(
                    "Weather API key cannot be empty if provided. Either remove it or provide a valid key."
                ));
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds == 0 || self.http.timeout_seconds > 300 {
            return Err(PlaceScoutError::config(
                "HTTP timeout must be between 1 and 300 seconds",
            ));
        }

        if self.places.limit == 0 || self.places.limit > 500 {
            return Err(PlaceScoutError::config(
                "Places result limit must be between 1 and 500",
            ));
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlaceScoutError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlaceScoutError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        for (name, url) in [
            ("places", &self.places.base_url),
            ("weather", &self.weather.base_url),
            ("guide", &self.guide.base_url),
            ("encyclopedia", &self.guide.encyclopedia_base_url),
            ("geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlaceScoutError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        if self.guide.wanted_sections.is_empty() {
            return Err(PlaceScoutError::config(
                "Guide wanted sections list cannot be empty",
            ));
        }

        Ok(())
    }
}
