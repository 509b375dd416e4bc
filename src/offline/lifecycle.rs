//! Versioned shell-cache lifecycle: install, activate, takeover control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use url::Url;

use super::fetch::Network;
use super::request::{FetchRequest, StoredResponse};
use super::store::RequestCache;

/// Current shell namespace. Bump the version suffix whenever the shell
/// assets change; activation deletes every namespace that doesn't match.
pub const SHELL_NAMESPACE: &str = "panelcache-shell-v1";

/// Shell assets cached on install, relative to the app origin.
const SHELL_ASSETS: &[&str] = &["/", "/index.html", "/manifest.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The shell namespace is fully populated and this instance is ready
    /// to take over.
    InstallReady,
    /// Stale namespaces are gone and this instance controls request
    /// handling.
    Activated,
}

/// Control signals from the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    /// Take over immediately instead of waiting for the next load.
    SkipWaiting,
}

pub trait LifecycleObserver: Send + Sync {
    fn on_event(&self, event: LifecycleEvent);
}

/// Handle for detaching a subscribed observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Manages the versioned shell cache across instance generations.
///
/// Install populates the current namespace all-or-nothing; activate
/// garbage-collects every other namespace and claims control. Observers
/// attach and detach in pairs through `subscribe`/`unsubscribe`.
pub struct Lifecycle<C: RequestCache, N: Network> {
    cache: Arc<C>,
    network: Arc<N>,
    app_origin: Url,
    namespace: String,
    skip_waiting: AtomicBool,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn LifecycleObserver>)>>,
    next_subscription: Mutex<u64>,
}

impl<C: RequestCache, N: Network> Lifecycle<C, N> {
    pub fn new(cache: Arc<C>, network: Arc<N>, app_origin: Url) -> Self {
        Self {
            cache,
            network,
            app_origin,
            namespace: SHELL_NAMESPACE.to_string(),
            skip_waiting: AtomicBool::new(false),
            observers: Mutex::new(Vec::new()),
            next_subscription: Mutex::new(0),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Install: populate the current namespace with the shell assets.
    ///
    /// All-or-nothing: every asset is fetched before anything is stored,
    /// and a failed store removes the namespace so a partial shell never
    /// survives. On success the instance signals readiness and requests
    /// immediate takeover.
    pub async fn install(&self) -> Result<()> {
        let mut fetched = Vec::with_capacity(SHELL_ASSETS.len());
        for asset in SHELL_ASSETS {
            let url = self
                .app_origin
                .join(asset)
                .with_context(|| format!("Invalid shell asset path: {}", asset))?;
            let request = FetchRequest::get(url);
            let response = self
                .network
                .fetch(&request)
                .await
                .with_context(|| format!("Failed to fetch shell asset: {}", asset))?;
            fetched.push((request.key(), response));
        }

        if let Err(e) = self.store_all(&fetched) {
            if let Err(cleanup) = self.cache.delete_namespace(&self.namespace) {
                warn!(namespace = %self.namespace, error = %cleanup, "Failed to remove partial shell namespace");
            }
            return Err(e);
        }

        info!(namespace = %self.namespace, assets = fetched.len(), "Shell cache populated");
        self.skip_waiting.store(true, Ordering::SeqCst);
        self.notify(LifecycleEvent::InstallReady);
        Ok(())
    }

    fn store_all(&self, entries: &[(String, StoredResponse)]) -> Result<()> {
        for (key, response) in entries {
            self.cache
                .put(&self.namespace, key, response)
                .with_context(|| format!("Failed to store shell asset under {}", key))?;
        }
        Ok(())
    }

    /// Activate: delete every namespace that isn't current, then claim
    /// control of request handling.
    pub async fn activate(&self) -> Result<()> {
        let names = self
            .cache
            .namespaces()
            .context("Failed to enumerate cache namespaces")?;

        for name in names {
            if name != self.namespace {
                debug!(namespace = %name, "Deleting stale cache namespace");
                self.cache
                    .delete_namespace(&name)
                    .with_context(|| format!("Failed to delete stale namespace {}", name))?;
            }
        }

        info!(namespace = %self.namespace, "Activated");
        self.notify(LifecycleEvent::Activated);
        Ok(())
    }

    /// Handle an explicit control signal from the host application.
    pub fn handle_message(&self, message: ControlMessage) {
        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting.store(true, Ordering::SeqCst);
            }
        }
    }

    /// Whether this instance should take over without waiting for the next
    /// page load.
    pub fn wants_immediate_activation(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    // ===== Observers =====

    pub fn subscribe(&self, observer: Arc<dyn LifecycleObserver>) -> SubscriptionId {
        let mut next = self
            .next_subscription
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = SubscriptionId(*next);
        *next += 1;
        drop(next);

        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((id, observer));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify(&self, event: LifecycleEvent) {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for (_, observer) in observers.iter() {
            observer.on_event(event);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::fetch::FetchError;
    use crate::offline::request::request_key;
    use crate::offline::store::MemoryRequestCache;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::sync::Mutex as StdMutex;

    /// Network double that serves every asset, optionally failing one path.
    struct ShellNetwork {
        failing_path: Option<String>,
    }

    impl Network for ShellNetwork {
        fn fetch<'a>(
            &'a self,
            request: &'a FetchRequest,
        ) -> BoxFuture<'a, Result<StoredResponse, FetchError>> {
            async move {
                if self.failing_path.as_deref() == Some(request.url.path()) {
                    return Err(FetchError::Transport("unreachable".to_string()));
                }
                Ok(StoredResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: request.url.path().as_bytes().to_vec(),
                })
            }
            .boxed()
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: StdMutex<Vec<LifecycleEvent>>,
    }

    impl LifecycleObserver for RecordingObserver {
        fn on_event(&self, event: LifecycleEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn origin() -> Url {
        Url::parse("https://reader.example.com/").unwrap()
    }

    fn lifecycle(
        cache: Arc<MemoryRequestCache>,
        failing_path: Option<&str>,
    ) -> Lifecycle<MemoryRequestCache, ShellNetwork> {
        Lifecycle::new(
            cache,
            Arc::new(ShellNetwork {
                failing_path: failing_path.map(String::from),
            }),
            origin(),
        )
    }

    #[tokio::test]
    async fn test_install_populates_shell_namespace() {
        let cache = Arc::new(MemoryRequestCache::new());
        let lifecycle = lifecycle(Arc::clone(&cache), None);

        lifecycle.install().await.expect("Install failed");

        // Every shell asset is present under its request identity
        for asset in ["/", "/index.html", "/manifest.json"] {
            let key = request_key("GET", &origin().join(asset).unwrap());
            assert!(
                cache.get(SHELL_NAMESPACE, &key).unwrap().is_some(),
                "missing shell asset {}",
                asset
            );
        }
        assert!(lifecycle.wants_immediate_activation());
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let cache = Arc::new(MemoryRequestCache::new());
        let lifecycle = lifecycle(Arc::clone(&cache), Some("/manifest.json"));

        assert!(lifecycle.install().await.is_err());
        // Nothing was committed for the failed generation
        assert!(cache.namespaces().unwrap().is_empty());
        assert!(!lifecycle.wants_immediate_activation());
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_namespaces() {
        let cache = Arc::new(MemoryRequestCache::new());
        let stale_response = StoredResponse {
            status: 200,
            headers: Vec::new(),
            body: b"old".to_vec(),
        };
        cache.put("panelcache-shell-v0", "k", &stale_response).unwrap();
        cache.put(SHELL_NAMESPACE, "k", &stale_response).unwrap();

        let lifecycle = lifecycle(Arc::clone(&cache), None);
        lifecycle.activate().await.expect("Activate failed");

        assert_eq!(cache.namespaces().unwrap(), vec![SHELL_NAMESPACE]);
    }

    #[tokio::test]
    async fn test_observers_attach_and_detach() {
        let cache = Arc::new(MemoryRequestCache::new());
        let lifecycle = lifecycle(Arc::clone(&cache), None);

        let observer = Arc::new(RecordingObserver::default());
        let id = lifecycle.subscribe(Arc::clone(&observer) as Arc<dyn LifecycleObserver>);

        lifecycle.install().await.unwrap();
        lifecycle.activate().await.unwrap();
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![LifecycleEvent::InstallReady, LifecycleEvent::Activated]
        );

        // After detach, no further deliveries
        lifecycle.unsubscribe(id);
        lifecycle.activate().await.unwrap();
        assert_eq!(observer.events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_skip_waiting_message() {
        let cache = Arc::new(MemoryRequestCache::new());
        let lifecycle = lifecycle(cache, None);

        assert!(!lifecycle.wants_immediate_activation());
        lifecycle.handle_message(ControlMessage::SkipWaiting);
        assert!(lifecycle.wants_immediate_activation());
    }
}
