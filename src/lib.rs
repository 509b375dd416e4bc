//! panelcache - core library for an offline-first comic reading client.
//!
//! This crate provides everything a reader UI needs short of rendering:
//! a typed client for the remote comic API, durable user state (favorites,
//! reading history, offline chapters) with bounded eviction, and an offline
//! request cache that routes fetches through per-resource caching policies
//! so the app keeps working without a network.

pub mod api;
pub mod auth;
pub mod config;
pub mod library;
pub mod models;
pub mod offline;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use auth::AuthSession;
pub use config::Config;
pub use library::Library;
pub use offline::{FetchRouter, Lifecycle, RouteOutcome};
pub use storage::{FsStorage, KvStore, MemoryStorage, ReadOutcome, Storage};
