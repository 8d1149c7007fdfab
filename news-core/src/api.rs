use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::article::NewsPage;
use crate::config::ApiConfig;
use crate::error::{ConfigError, FetchError};

/// Error body the remote API sends with a non-success status:
/// `{"status":"error","code":...,"message":"..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Client for the two paged read operations of the remote news API.
///
/// Failures come back already classified as a [`FetchError`], so the
/// pagination layer only has to surface the message.
#[derive(Debug, Clone)]
pub struct NewsApi {
    http: Client,
    headlines_url: Url,
    search_url: Url,
    api_key: String,
}

impl NewsApi {
    /// Build a client against `base_url`, e.g. `https://newsapi.org/`.
    pub fn new(
        http: Client,
        base_url: Url,
        api_key: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            headlines_url: base_url.join("v2/top-headlines")?,
            search_url: base_url.join("v2/everything")?,
            api_key: api_key.into(),
        })
    }

    /// Build a client from configuration, including the request timeout.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self::new(http, base_url, config.resolved_key())?)
    }

    /// Breaking news for a country, one page at a time.
    pub async fn top_headlines(
        &self,
        country: &str,
        page: u32,
        page_size: u32,
    ) -> Result<NewsPage, FetchError> {
        debug!(country, page, "requesting top headlines");
        self.fetch_page(
            self.headlines_url.clone(),
            &[
                ("country", country.to_string()),
                ("page", page.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        )
        .await
    }

    /// Free-text search across everything, one page at a time.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<NewsPage, FetchError> {
        debug!(query, page, "requesting search results");
        self.fetch_page(
            self.search_url.clone(),
            &[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("pageSize", page_size.to_string()),
            ],
        )
        .await
    }

    async fn fetch_page(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<NewsPage, FetchError> {
        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }
        if body.is_empty() {
            return Err(FetchError::EmptyBody);
        }

        serde_json::from_slice(&body).map_err(FetchError::Decode)
    }
}

/// The server's own message when it sent one, else the status reason.
fn api_error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
