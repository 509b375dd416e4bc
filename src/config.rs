//! Application configuration management.
//!
//! This module holds the base URLs for the two remote services (the auth
//! backend and the comic content API) and builds the concrete endpoint URLs
//! from them. Values come from the environment with baked-in defaults, so a
//! deployment can repoint either service without a rebuild.

use std::path::PathBuf;

use anyhow::Result;
use url::Url;

/// Application name used for cache directory paths
const APP_NAME: &str = "panelcache";

/// Default base URL for the auth backend
const DEFAULT_AUTH_API_BASE: &str = "http://127.0.0.1:8000/api/v1";

/// Default base URL for the comic content API
const DEFAULT_CONTENT_API_BASE: &str = "https://apimangav2-ecru.vercel.app/manga/v2";

/// Path prefix identifying content API requests on the app's own origin
const CONTENT_PATH_PREFIX: &str = "/manga";

#[derive(Debug, Clone)]
pub struct Config {
    pub auth_api_base: String,
    pub content_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_api_base: DEFAULT_AUTH_API_BASE.to_string(),
            content_api_base: DEFAULT_CONTENT_API_BASE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Reads `PANELCACHE_AUTH_API_URL` and `PANELCACHE_CONTENT_API_URL`,
    /// loading a `.env` file first if one is present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            auth_api_base: std::env::var("PANELCACHE_AUTH_API_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_API_BASE.to_string()),
            content_api_base: std::env::var("PANELCACHE_CONTENT_API_URL")
                .unwrap_or_else(|_| DEFAULT_CONTENT_API_BASE.to_string()),
        }
    }

    // ===== Content API endpoints =====

    pub fn updates_url(&self) -> String {
        format!("{}/manga-update", self.content_api_base)
    }

    pub fn projects_url(&self) -> String {
        format!("{}/manga-project", self.content_api_base)
    }

    pub fn detail_url(&self, slug: &str) -> String {
        format!("{}/detail/{}", self.content_api_base, slug)
    }

    pub fn chapter_url(&self, slug: &str) -> String {
        format!("{}/chapter/{}", self.content_api_base, slug)
    }

    pub fn page_url(&self, page: u32) -> String {
        format!("{}/page/{}", self.content_api_base, page)
    }

    pub fn search_url(&self, page: u32, keyword: &str) -> String {
        format!("{}/page/{}/{}", self.content_api_base, page, keyword)
    }

    // ===== Auth endpoints =====

    pub fn logout_url(&self) -> String {
        format!("{}/auth/logout", self.auth_api_base)
    }

    pub fn save_keyword_url(&self) -> String {
        format!("{}/search", self.auth_api_base)
    }

    // ===== Router inputs =====

    /// Host of the content API, for request classification.
    pub fn content_api_host(&self) -> Option<String> {
        Url::parse(&self.content_api_base)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    /// Path prefix that marks same-origin content API requests.
    pub fn content_path_prefix(&self) -> &'static str {
        CONTENT_PATH_PREFIX
    }

    /// Platform cache directory for this application.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
