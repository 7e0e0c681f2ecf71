//! Error types and handling for the `PlaceScout` engine

use thiserror::Error;

/// Main error type for the `PlaceScout` engine
///
/// Only setup problems surface as errors; per-request upstream failures
/// degrade to empty or absent values inside the adapters instead.
#[derive(Error, Debug)]
pub enum PlaceScoutError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream provider communication errors
    #[error("Provider error: {message}")]
    Provider { message: String },
}

impl PlaceScoutError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlaceScoutError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            PlaceScoutError::Provider { .. } => {
                "Unable to reach external travel services. Please check your internet connection."
                    .to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = PlaceScoutError::config("missing API key");
        assert!(matches!(config_err, PlaceScoutError::Config { .. }));

        let provider_err = PlaceScoutError::provider("connection failed");
        assert!(matches!(provider_err, PlaceScoutError::Provider { .. }));
    }

    #[test]
    fn test_display_includes_message() {
        let err = PlaceScoutError::config("log level");
        assert_eq!(err.to_string(), "Configuration error: log level");
    }

    #[test]
    fn test_user_messages() {
        let config_err = PlaceScoutError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let provider_err = PlaceScoutError::provider("test");
        assert!(provider_err.user_message().contains("Unable to reach"));
    }
}
