//! Fetch interception and per-resource-class cache routing.
//!
//! Every outgoing request is classified once, then dispatched to one of
//! four caching strategies. Classification is host/path-first: anything
//! aimed at the content API is dynamic content no matter what resource
//! kind the runtime declared for it.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use super::fetch::Network;
use super::request::{request_key, FetchRequest, ResourceKind, StoredResponse};
use super::store::RequestCache;

/// How a request was classified, deciding its caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Not intercepted; proceeds through the normal network path.
    Ineligible,
    /// Content API traffic: network-first with cache fallback.
    DynamicContent,
    /// Scripts, stylesheets, fonts: cache-first.
    StaticAsset,
    /// Images: cache-first with a placeholder on total failure.
    Image,
    /// Top-level page loads: network-first with the offline shell fallback.
    Navigation,
    /// Everything else: network-first with cache fallback.
    Default,
}

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The router does not handle this request.
    Passthrough,
    Response(StoredResponse),
    /// Network failed and no cached fallback exists.
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Origin the application itself is served from.
    pub app_origin: Url,
    /// Host of the remote content API.
    pub api_host: Option<String>,
    /// Path prefix marking same-origin content API requests.
    pub content_path_prefix: String,
    /// Cache namespace consulted and written by every strategy.
    pub namespace: String,
}

pub struct FetchRouter<C: RequestCache, N: Network> {
    cache: Arc<C>,
    network: Arc<N>,
    config: RouterConfig,
}

impl<C: RequestCache + 'static, N: Network> FetchRouter<C, N> {
    pub fn new(cache: Arc<C>, network: Arc<N>, config: RouterConfig) -> Self {
        Self {
            cache,
            network,
            config,
        }
    }

    /// Classify a request. Evaluated once per request; the router keeps no
    /// state between requests.
    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        if !request.is_read_method() {
            return RequestClass::Ineligible;
        }

        let same_origin = request.url.origin() == self.config.app_origin.origin();
        let looks_like_image =
            request.kind == ResourceKind::Image || request.url.as_str().contains("image");
        if !same_origin && !looks_like_image {
            return RequestClass::Ineligible;
        }

        // Content API traffic first: host/path decides, not the declared
        // resource kind.
        let api_host_hit = match (&self.config.api_host, request.url.host_str()) {
            (Some(api_host), Some(host)) => host == api_host,
            _ => false,
        };
        if request.url.path().starts_with(&self.config.content_path_prefix) || api_host_hit {
            return RequestClass::DynamicContent;
        }

        let path = request.url.path();
        if matches!(
            request.kind,
            ResourceKind::Style | ResourceKind::Script | ResourceKind::Font
        ) || path.ends_with(".js")
            || path.ends_with(".css")
        {
            return RequestClass::StaticAsset;
        }

        if request.kind == ResourceKind::Image {
            return RequestClass::Image;
        }

        if request.is_navigation {
            return RequestClass::Navigation;
        }

        RequestClass::Default
    }

    /// Route one request through its class's caching strategy.
    pub async fn handle(&self, request: &FetchRequest) -> RouteOutcome {
        match self.classify(request) {
            RequestClass::Ineligible => RouteOutcome::Passthrough,
            RequestClass::DynamicContent | RequestClass::Default => {
                self.network_first(request).await
            }
            RequestClass::StaticAsset => self.cache_first(request).await,
            RequestClass::Image => self.image_first(request).await,
            RequestClass::Navigation => self.navigation(request).await,
        }
    }

    // ===== Strategies =====

    /// Network-first: serve live, store a clone in the background, fall
    /// back to the exact-identity cache entry when the network fails.
    async fn network_first(&self, request: &FetchRequest) -> RouteOutcome {
        let key = request.key();
        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(key, response.clone());
                RouteOutcome::Response(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network failed, trying cache");
                match self.cached(&key) {
                    Some(cached) => RouteOutcome::Response(cached),
                    None => RouteOutcome::Unresolved,
                }
            }
        }
    }

    /// Cache-first: a hit is authoritative until evicted; a miss fetches
    /// and stores.
    async fn cache_first(&self, request: &FetchRequest) -> RouteOutcome {
        let key = request.key();
        if let Some(cached) = self.cached(&key) {
            return RouteOutcome::Response(cached);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(key, response.clone());
                RouteOutcome::Response(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Static asset unreachable and uncached");
                RouteOutcome::Unresolved
            }
        }
    }

    /// Cache-first for images, with a synthetic empty 404 when the fetch
    /// fails outright. A non-OK live response is returned but not stored.
    async fn image_first(&self, request: &FetchRequest) -> RouteOutcome {
        let key = request.key();
        if let Some(cached) = self.cached(&key) {
            return RouteOutcome::Response(cached);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store_in_background(key, response.clone());
                }
                RouteOutcome::Response(response)
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Image fetch failed, serving placeholder");
                RouteOutcome::Response(StoredResponse::not_found_placeholder())
            }
        }
    }

    /// Network-first for navigations, falling back to the cached root
    /// document rather than the request-specific entry.
    async fn navigation(&self, request: &FetchRequest) -> RouteOutcome {
        match self.network.fetch(request).await {
            Ok(response) => RouteOutcome::Response(response),
            Err(e) => {
                debug!(url = %request.url, error = %e, "Navigation offline, serving shell");
                match self.root_document_key().and_then(|key| self.cached(&key)) {
                    Some(shell) => RouteOutcome::Response(shell),
                    None => RouteOutcome::Unresolved,
                }
            }
        }
    }

    // ===== Cache plumbing =====

    fn root_document_key(&self) -> Option<String> {
        self.config
            .app_origin
            .join("/")
            .ok()
            .map(|root| request_key("GET", &root))
    }

    /// Read a cache entry; read errors are logged and count as a miss.
    fn cached(&self, key: &str) -> Option<StoredResponse> {
        match self.cache.get(&self.config.namespace, key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = key, error = %e, "Cache read failed");
                None
            }
        }
    }

    /// Fire-and-forget store of a response clone; never awaited by the
    /// request path, failures logged.
    fn store_in_background(&self, key: String, response: StoredResponse) {
        let cache = Arc::clone(&self.cache);
        let namespace = self.config.namespace.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.put(&namespace, &key, &response) {
                warn!(key = %key, error = %e, "Cache write failed");
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
