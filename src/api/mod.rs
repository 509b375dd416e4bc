//! REST API client module for the comic content and auth services.
//!
//! This module provides the `ApiClient` for fetching listings, details,
//! and chapter pages from the content API, plus the small authenticated
//! surface of the auth backend (logout, search-keyword recording).
//!
//! Requests carry a JWT bearer token when one has been set.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
