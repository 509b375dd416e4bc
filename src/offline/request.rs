//! Request and response types for the offline cache.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Declared destination of a request, as reported by the host runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Document,
    Script,
    Style,
    Font,
    Image,
    Other,
}

/// One intercepted outgoing request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: String,
    pub url: Url,
    pub kind: ResourceKind,
    /// True for a top-level page load.
    pub is_navigation: bool,
}

impl FetchRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            kind: ResourceKind::Other,
            is_navigation: false,
        }
    }

    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn navigation(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            kind: ResourceKind::Document,
            is_navigation: true,
        }
    }

    /// Whether the method is read-only and therefore cacheable.
    pub fn is_read_method(&self) -> bool {
        matches!(self.method.to_ascii_uppercase().as_str(), "GET" | "HEAD")
    }

    /// Cache key for this request's identity.
    pub fn key(&self) -> String {
        request_key(&self.method, &self.url)
    }
}

/// Pure request-identity key: uppercased method plus the fragment-stripped
/// URL, hashed to a stable fixed-length hex string.
pub fn request_key(method: &str, url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);

    let input = format!("{} {}", method.to_ascii_uppercase(), normalized);
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// A cached HTTP response: status, headers, and body bytes.
///
/// Stored and replaced wholesale; never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StoredResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Synthetic empty response used when an image fetch fails outright.
    pub fn not_found_placeholder() -> Self {
        Self {
            status: 404,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
