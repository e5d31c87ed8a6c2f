//! Error types and handling for `weatherdb`

use thiserror::Error;

/// Main error type for the `weatherdb` library
#[derive(Error, Debug)]
pub enum WeatherDbError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Transport failures and non-success responses from the provider
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// Provider answered, but the payload could not be understood
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Geocoding returned no candidates
    #[error("Location not found: {query}")]
    LocationNotFound { query: String },
}

impl WeatherDbError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new API error without an HTTP status
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Create a new API error carrying the HTTP status the provider returned
    pub fn api_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn location_not_found<S: Into<String>>(query: S) -> Self {
        Self::LocationNotFound {
            query: query.into(),
        }
    }

    /// HTTP status attached to the error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherDbError::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherDbError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            WeatherDbError::Validation { message } => format!("Invalid input: {message}"),
            WeatherDbError::Api { status: Some(401), .. } => {
                "The weather provider rejected the API key.".to_string()
            }
            WeatherDbError::Api { .. } => {
                "Unable to reach the weather provider. Please check your internet connection."
                    .to_string()
            }
            WeatherDbError::InvalidResponse { .. } => {
                "The weather provider returned data that could not be read.".to_string()
            }
            WeatherDbError::LocationNotFound { query } => {
                format!("No location matching '{query}' was found.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = WeatherDbError::config("missing API key");
        assert!(matches!(config_err, WeatherDbError::Config { .. }));

        let api_err = WeatherDbError::api_status("bad gateway", 502);
        assert!(matches!(api_err, WeatherDbError::Api { status: Some(502), .. }));
        assert_eq!(api_err.status(), Some(502));

        let not_found = WeatherDbError::location_not_found("Nowhere123");
        assert_eq!(not_found.to_string(), "Location not found: Nowhere123");
        assert_eq!(not_found.status(), None);
    }

    #[test]
    fn test_user_messages() {
        let config_err = WeatherDbError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let unauthorized = WeatherDbError::api_status("401 Unauthorized", 401);
        assert!(unauthorized.user_message().contains("API key"));

        let api_err = WeatherDbError::api("connection reset");
        assert!(api_err.user_message().contains("Unable to reach"));

        let not_found = WeatherDbError::location_not_found("Atlantis");
        assert!(not_found.user_message().contains("Atlantis"));
    }
}
