use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::warn;

use crate::config::ScraperConfig;
use crate::error::ArtworkError;

/// Some artwork hosts refuse anything that doesn't look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestProfile {
    /// Image download: browser headers, short timeout.
    Asset,
    /// Catalog or metadata JSON.
    Json,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or("")
    }
}

/// Blocking GET. `Err` means the request never produced a response
/// (connect, timeout, TLS, body read); any status code is an `Ok`.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str, profile: RequestProfile) -> Result<HttpResponse, ArtworkError>;
}

#[derive(Clone)]
pub struct BlockingHttpClient {
    assets: Client,
    json: Client,
}

impl BlockingHttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self, ArtworkError> {
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for all requests");
        }

        let mut asset_headers = HeaderMap::new();
        asset_headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        asset_headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        let assets = Self::build(config, asset_headers, config.asset_timeout)?;

        let mut json_headers = HeaderMap::new();
        json_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("artwork-scraper/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ArtworkError::HttpClient(err.to_string()))?,
        );
        let json = Self::build(config, json_headers, config.json_timeout)?;

        Ok(Self { assets, json })
    }

    fn build(
        config: &ScraperConfig,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<Client, ArtworkError> {
        Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|err| ArtworkError::HttpClient(err.to_string()))
    }
}

impl HttpClient for BlockingHttpClient {
    fn get(&self, url: &str, profile: RequestProfile) -> Result<HttpResponse, ArtworkError> {
        let client = match profile {
            RequestProfile::Asset => &self.assets,
            RequestProfile::Json => &self.json,
        };
        let response = client
            .get(url)
            .send()
            .map_err(|err| ArtworkError::Http(err.to_string()))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response
            .bytes()
            .map_err(|err| ArtworkError::Http(err.to_string()))?
            .to_vec();
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}
