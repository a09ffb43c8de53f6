//! Error types and handling for the `solarsite` analysis pipeline

use crate::upstream::Provider;
use thiserror::Error;

/// Main error type for the site survey pipeline
#[derive(Error, Debug)]
pub enum SiteSurveyError {
    /// Request validation errors (blank postcode, malformed body)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Request body exceeds the accepted size
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// The geocoder returned no candidate for the postcode
    #[error("{message}")]
    NotFound { message: String },

    /// A third-party provider failed at the transport level or answered with a non-success status
    #[error("{provider} request failed: {message}")]
    Upstream {
        provider: Provider,
        status: Option<u16>,
        message: String,
        details: Option<String>,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Anything else: unreadable provider payloads, internal faults
    #[error("{message}")]
    Unknown {
        message: String,
        details: Option<String>,
    },
}

impl SiteSurveyError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new payload-too-large error
    pub fn payload_too_large<S: Into<String>>(message: S) -> Self {
        Self::PayloadTooLarge {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new upstream error for a provider that answered with `status`
    pub fn upstream_status(provider: Provider, status: u16, reason: &str, body: Option<String>) -> Self {
        Self::Upstream {
            provider,
            status: Some(status),
            message: format!("responded with HTTP {status} {reason}").trim_end().to_string(),
            details: body,
        }
    }

    /// Create a new upstream error for a provider that could not be reached
    pub fn upstream_transport<E: std::fmt::Display>(provider: Provider, source: E) -> Self {
        Self::Upstream {
            provider,
            status: None,
            message: format!("transport error: {source}"),
            details: None,
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new unknown error with optional diagnostic detail
    pub fn unknown<S: Into<String>>(message: S, details: Option<String>) -> Self {
        Self::Unknown {
            message: message.into(),
            details,
        }
    }

    /// Provider payload could not be interpreted
    pub fn malformed<E: std::fmt::Display>(provider: Provider, source: E) -> Self {
        Self::unknown(
            format!("{provider} returned an unreadable response"),
            Some(source.to_string()),
        )
    }

    /// Diagnostic detail surfaced next to the message, if any
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        match self {
            SiteSurveyError::Upstream { details, .. } | SiteSurveyError::Unknown { details, .. } => {
                details.as_deref()
            }
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SiteSurveyError::Validation { message }
            | SiteSurveyError::PayloadTooLarge { message }
            | SiteSurveyError::NotFound { message } => message.clone(),
            SiteSurveyError::Upstream { provider, .. } => {
                format!("The {provider} service is unavailable right now. Please try again later.")
            }
            SiteSurveyError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            SiteSurveyError::Unknown { message, .. } => message.clone(),
        }
    }
}
