//! API client for the comic content and auth services.
//!
//! This module provides the `ApiClient` struct for fetching listings,
//! comic details, and chapter pages, and for the two authenticated write
//! paths (logout, search-keyword recording).

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::models::{ChapterPages, ComicDetail, ComicListResponse, ComicSummary};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the comic services.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Config,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            config,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            token: Some(token),
        }
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning a structured error with
    /// the body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn get_list(&self, url: &str) -> Result<Vec<ComicSummary>> {
        let response: ComicListResponse = self.get(url).await?;
        Ok(response.anime_list)
    }

    // ===== Content API =====

    /// Fetch the latest comic updates
    pub async fn fetch_updates(&self) -> Result<Vec<ComicSummary>> {
        self.get_list(&self.config.updates_url()).await
    }

    /// Fetch the curated project list
    pub async fn fetch_projects(&self) -> Result<Vec<ComicSummary>> {
        self.get_list(&self.config.projects_url()).await
    }

    /// Fetch comic details by slug
    pub async fn fetch_detail(&self, slug: &str) -> Result<ComicDetail> {
        self.get(&self.config.detail_url(slug)).await
    }

    /// Fetch chapter pages by slug
    pub async fn fetch_chapter(&self, slug: &str) -> Result<ChapterPages> {
        self.get(&self.config.chapter_url(slug)).await
    }

    /// Fetch one page of the full catalog
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<ComicSummary>> {
        self.get_list(&self.config.page_url(page)).await
    }

    /// Search comics by keyword
    pub async fn search(&self, page: u32, keyword: &str) -> Result<Vec<ComicSummary>> {
        self.get_list(&self.config.search_url(page, keyword)).await
    }

    // ===== Auth backend =====

    /// Record a search keyword, fire-and-forget.
    ///
    /// The request is spawned and never awaited; failures are logged and
    /// otherwise ignored.
    pub fn record_search_keyword(&self, keyword: &str) {
        let client = self.client.clone();
        let url = self.config.save_keyword_url();
        let token = self.token.clone();
        let keyword = keyword.to_string();

        tokio::spawn(async move {
            let mut request = client.post(&url).json(&serde_json::json!({ "keyword": keyword }));
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    debug!(url = %url, status = %response.status(), "Search keyword not recorded");
                }
                Ok(_) => {}
                Err(e) => {
                    debug!(url = %url, error = %e, "Search keyword request failed");
                }
            }
        });
    }

    /// Call the server-side logout endpoint for the given token.
    pub async fn post_logout(&self, token: &str) -> Result<()> {
        let url = self.config.logout_url();
        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        Self::check_response(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction_and_token() {
        let client = ApiClient::new(Config::default()).expect("Failed to build client");
        assert!(client.token.is_none());

        let authed = client.with_token("tok-123".to_string());
        assert_eq!(authed.token.as_deref(), Some("tok-123"));
        // Original client untouched
        assert!(client.token.is_none());
    }

    #[test]
    fn test_auth_headers_include_bearer() {
        let client = ApiClient::new(Config::default())
            .expect("Failed to build client")
            .with_token("tok-123".to_string());

        let headers = client.auth_headers().expect("Failed to build headers");
        assert_eq!(
            headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer tok-123")
        );
    }
}
