// src/error.rs

//! Unified error handling for the scraper.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Link does not match the shape expected for an entity
    #[error("Invalid {kind} link: {link}")]
    InvalidLink { kind: &'static str, link: String },

    /// AJAX endpoint answered with something other than a usable envelope
    #[error("AJAX error for {endpoint}: {message}")]
    Ajax { endpoint: String, message: String },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid link error for the given entity kind.
    pub fn invalid_link(kind: &'static str, link: impl Into<String>) -> Self {
        Self::InvalidLink {
            kind,
            link: link.into(),
        }
    }

    /// Create an AJAX error with the endpoint as context.
    pub fn ajax(endpoint: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Ajax {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}
