//! Durable key-value persistence.
//!
//! This module is the single point of contact with local storage. The
//! `Storage` trait is the backend seam (filesystem in production, memory in
//! tests); `KvStore` is the fail-safe adapter every other component routes
//! through. A storage failure never crosses the adapter's boundary: reads
//! degrade to the type's default and writes report `false`, with the cause
//! logged.

pub mod backend;
pub mod kv;

pub use backend::{FsStorage, MemoryStorage, Storage, StorageError};
pub use kv::{KvStore, ReadOutcome};
