use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::backend::{Storage, StorageError};

/// Outcome of a fail-safe read.
///
/// A read always yields a usable value. `Degraded` carries the default in
/// place of data that could not be loaded, together with the cause, so
/// callers and tests can observe the degradation without the adapter ever
/// returning an error.
#[derive(Debug)]
pub enum ReadOutcome<T> {
    Ok(T),
    Degraded { value: T, cause: StorageError },
}

impl<T> ReadOutcome<T> {
    /// Unwrap to the carried value, degraded or not.
    pub fn value(self) -> T {
        match self {
            ReadOutcome::Ok(value) => value,
            ReadOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ReadOutcome::Degraded { .. })
    }
}

/// Fail-safe key-value adapter over a storage backend.
///
/// Values are JSON-encoded. Missing keys read as the type's default;
/// corrupt or unreadable values degrade to the default with the cause
/// attached. Writes report success as a bool. Nothing here panics or
/// propagates a storage error to callers.
pub struct KvStore<S: Storage> {
    backend: S,
}

impl<S: Storage> KvStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn read<T: DeserializeOwned + Default>(&self, key: &str) -> ReadOutcome<T> {
        match self.backend.get_raw(key) {
            Ok(None) => ReadOutcome::Ok(T::default()),
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => ReadOutcome::Ok(value),
                Err(e) => {
                    warn!(key = key, error = %e, "Corrupt value in storage, using default");
                    ReadOutcome::Degraded {
                        value: T::default(),
                        cause: e.into(),
                    }
                }
            },
            Err(e) => {
                warn!(key = key, error = %e, "Storage read failed, using default");
                ReadOutcome::Degraded {
                    value: T::default(),
                    cause: e,
                }
            }
        }
    }

    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to serialize value for storage");
                return false;
            }
        };

        match self.backend.set_raw(key, &raw) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = key, error = %e, "Storage write failed");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove_raw(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = key, error = %e, "Storage remove failed");
                false
            }
        }
    }
}
