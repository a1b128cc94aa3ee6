// src/utils/http.rs

//! HTTP client utilities.

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;
use crate::session::Fetcher;

/// Browser-like headers sent with every request.
fn default_headers(config: &HttpConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(header::ORIGIN, HeaderValue::from_static("http://www.zhihu.com"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));

    if !config.cookie.is_empty() {
        let cookie = HeaderValue::from_str(&config.cookie)
            .map_err(|e| AppError::config(format!("invalid cookie header: {e}")))?;
        headers.insert(header::COOKIE, cookie);
    }
    Ok(headers)
}

/// Create a configured blocking HTTP client.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(default_headers(config)?)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// [`Fetcher`] backed by a real HTTP client.
///
/// Requests are issued one at a time with at least `request_delay_ms`
/// between them.
pub struct HttpFetcher {
    client: Client,
    delay: Duration,
    last_request: Cell<Option<Instant>>,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            delay: Duration::from_millis(config.request_delay_ms),
            last_request: Cell::new(None),
        })
    }

    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                thread::sleep(self.delay - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<String> {
        self.throttle();
        log::debug!("GET {url}");
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }

    fn post_form(&self, url: &str, form: &[(String, String)], referer: &str) -> Result<String> {
        self.throttle();
        log::debug!("POST {url} (referer {referer})");
        let response = self
            .client
            .post(url)
            .header(header::REFERER, referer)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(form)
            .send()?
            .error_for_status()?;
        Ok(response.text()?)
    }
}
