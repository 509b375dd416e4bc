//! Offline request caching and routing.
//!
//! This module is the layer between the application and the network. Every
//! outgoing request can be handed to the `FetchRouter`, which classifies it
//! by destination and applies a per-class caching strategy against a named,
//! versioned cache namespace. The `Lifecycle` manager owns that namespace:
//! it pre-populates the app shell on install and garbage-collects stale
//! namespace versions on activation.

pub mod fetch;
pub mod lifecycle;
pub mod request;
pub mod router;
pub mod store;

pub use fetch::{FetchError, HttpNetwork, Network};
pub use lifecycle::{ControlMessage, Lifecycle, LifecycleEvent, LifecycleObserver, SHELL_NAMESPACE};
pub use request::{request_key, FetchRequest, ResourceKind, StoredResponse};
pub use router::{FetchRouter, RequestClass, RouteOutcome, RouterConfig};
pub use store::{FsRequestCache, MemoryRequestCache, RequestCache};
