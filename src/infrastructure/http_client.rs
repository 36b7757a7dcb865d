//! Rate-limited HTTP client for catalog scraping.
//!
//! One client per provider: the user agent, timeout and request rate all
//! come from the provider configuration. Every fetch waits on the rate
//! limiter first so a burst of section fetches never hammers the site.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use tracing::debug;

use crate::extraction::config::ProviderConfig;
use crate::extraction::error::{ExtractError, ExtractResult};

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_requests_per_second: u32,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            timeout_secs: 60,
            max_requests_per_second: 4,
            follow_redirects: true,
        }
    }
}

impl HttpClientConfig {
    pub fn for_provider(config: &ProviderConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout_secs: config.timeout_secs,
            max_requests_per_second: config.max_requests_per_second,
            follow_redirects: true,
        }
    }
}

pub struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("invalid user agent")?,
        );

        // Cookie store is required: several targets gate their player
        // endpoints behind a session cookie set on the first page load.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("failed to build HTTP client")?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.max_requests_per_second)
                .context("request rate must be greater than 0")?,
        );

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota),
            config,
        })
    }

    pub fn for_provider(config: &ProviderConfig) -> Result<Self> {
        Self::new(HttpClientConfig::for_provider(config))
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET a page and return its body. Non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> ExtractResult<String> {
        self.rate_limiter.until_ready().await;
        debug!(url, "GET");

        let request = self.client.get(url).headers(build_headers(url, headers)?);
        let response = request
            .send()
            .await
            .map_err(|e| ExtractError::fetch_failed(url, e.status().map(|s| s.as_u16()), e.to_string()))?;
        read_body(url, response).await
    }

    /// POST a form and return the response body. Used for the AJAX player
    /// endpoints and embed key exchanges.
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
        headers: &[(&str, &str)],
    ) -> ExtractResult<String> {
        self.rate_limiter.until_ready().await;
        debug!(url, fields = form.len(), "POST form");

        let request = self
            .client
            .post(url)
            .headers(build_headers(url, headers)?)
            .form(form);
        let response = request
            .send()
            .await
            .map_err(|e| ExtractError::fetch_failed(url, e.status().map(|s| s.as_u16()), e.to_string()))?;
        read_body(url, response).await
    }
}

fn build_headers(url: &str, extra: &[(&str, &str)]) -> ExtractResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ExtractError::fetch_failed(url, None, format!("bad header name: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ExtractError::fetch_failed(url, None, format!("bad header value: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

async fn read_body(url: &str, response: Response) -> ExtractResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::fetch_failed(
            url,
            Some(status.as_u16()),
            format!("status {status}"),
        ));
    }
    let body = response
        .text()
        .await
        .map_err(|e| ExtractError::fetch_failed(url, Some(status.as_u16()), e.to_string()))?;
    debug!(url, bytes = body.len(), "fetched");
    Ok(body)
}
