//! Network seam for the offline layer.

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;

use super::request::{FetchRequest, StoredResponse};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// The network as seen by the router and lifecycle manager.
///
/// A single suspension point per request: the fetch either resolves to a
/// full `StoredResponse` or fails with a transport error. Faked in tests.
pub trait Network: Send + Sync {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<StoredResponse, FetchError>>;
}

/// Real network backed by reqwest.
#[derive(Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Network for HttpNetwork {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<StoredResponse, FetchError>> {
        async move {
            let method: reqwest::Method = request
                .method
                .to_ascii_uppercase()
                .parse()
                .map_err(|_| FetchError::UnsupportedMethod(request.method.clone()))?;

            let response = self
                .client
                .request(method, request.url.clone())
                .send()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?
                .to_vec();

            Ok(StoredResponse {
                status,
                headers,
                body,
            })
        }
        .boxed()
    }
}
