//! Application configuration structures.

use std::fs;
use std::path::Path;

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client and session settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Batch sizes used to detect the last page of a listing
    #[serde(default)]
    pub paging: PagingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if HeaderValue::from_str(&self.http.cookie).is_err() {
            return Err(AppError::validation(
                "http.cookie is not a valid header value",
            ));
        }
        if self.paging.page_size == 0 {
            return Err(AppError::validation("paging.page_size must be > 0"));
        }
        if self.paging.answer_page_size == 0 {
            return Err(AppError::validation(
                "paging.answer_page_size must be > 0",
            ));
        }
        if self.paging.collection_page_size == 0 {
            return Err(AppError::validation(
                "paging.collection_page_size must be > 0",
            ));
        }
        Ok(())
    }
}

/// HTTP client and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum delay between two requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Raw `Cookie` header of a logged-in browser session
    #[serde(default)]
    pub cookie: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            cookie: String::new(),
        }
    }
}

/// Fixed batch sizes of the remote listings.
///
/// A batch shorter than its page size marks the end of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Items per AJAX batch for follower, followee and topic lists
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Answers per batch on a question page
    #[serde(default = "defaults::answer_page_size")]
    pub answer_page_size: usize,

    /// Questions per page of a collection
    #[serde(default = "defaults::collection_page_size")]
    pub collection_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
            answer_page_size: defaults::answer_page_size(),
            collection_page_size: defaults::collection_page_size(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/48.0.2564.116 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }

    pub fn page_size() -> usize {
        20
    }
    pub fn answer_page_size() -> usize {
        10
    }
    pub fn collection_page_size() -> usize {
        10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.paging.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_cookie_with_newline() {
        let mut config = Config::default();
        config.http.cookie = "z_c0=abc\nevil".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [http]
            cookie = "z_c0=token"

            [paging]
            page_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.http.cookie, "z_c0=token");
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.paging.page_size, 10);
        assert_eq!(config.paging.answer_page_size, 10);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/definitely/not/here.toml");
        assert_eq!(config.paging, PagingConfig::default());
    }
}
