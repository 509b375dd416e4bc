//! Local user library: favorites, reading history, offline chapters.
//!
//! This module provides the `Library` for the three persisted user
//! collections, each with a hard capacity enforced on insert:
//!
//! - Favorites: a set deduplicated by comic slug, toggled on and off
//! - History: most-recent-first, one entry per comic, capped at 50
//! - Chapter cache: full chapters saved for offline reading, capped at 20

pub mod store;

pub use store::{CachedChapter, FavoriteEntry, HistoryEntry, LastChapter, Library};
