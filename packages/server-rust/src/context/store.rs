//! Process-wide store of values attached to in-flight requests.
//!
//! Entries are keyed by [`RequestId`] and hold an untyped map of named
//! [`Value`]s. An entry is created on the first `set` for a request and
//! removed by `clear`, by dropping the request's [`ContextGuard`], or by
//! `purge` once it is older than the configured maximum age.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use reqscope_core::{RequestId, Value, ValueTypeError};
use tokio::time::Instant;
use tracing::debug;

use super::error::ContextError;

/// Values attached to one request, plus the time the first one was set.
#[derive(Debug)]
struct ContextEntry {
    values: HashMap<String, Value>,
    created_at: Instant,
}

impl ContextEntry {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            created_at: Instant::now(),
        }
    }
}

/// Concurrent map from request identity to that request's named values.
///
/// Shared across all request tasks behind an `Arc`. `DashMap` shards the
/// entries so requests touching different identities do not serialize on a
/// single lock.
#[derive(Debug)]
pub struct ContextStore {
    entries: DashMap<RequestId, ContextEntry>,
    next_id: AtomicU64,
}

impl ContextStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocates a fresh request identity.
    ///
    /// The returned guard clears everything stored for the identity when it
    /// is dropped. A `set` on the identity after that (e.g. from a task the
    /// request spawned) recreates the entry, which then lives until `clear`
    /// or the next `purge` that finds it older than the maximum age.
    #[must_use]
    pub fn begin(self: &Arc<Self>) -> ContextGuard {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(request_id = %id, "request context opened");
        ContextGuard {
            id,
            store: Arc::clone(self),
        }
    }

    /// Associates `value` with `key` for the given request, replacing any
    /// previous value under the same key.
    pub fn set(&self, id: RequestId, key: impl Into<String>, value: impl Into<Value>) {
        self.entries
            .entry(id)
            .or_insert_with(ContextEntry::new)
            .values
            .insert(key.into(), value.into());
    }

    /// Returns the value stored under `key`, or `None` if it was never set.
    #[must_use]
    pub fn get(&self, id: RequestId, key: &str) -> Option<Value> {
        self.entries
            .get(&id)
            .and_then(|entry| entry.values.get(key).cloned())
    }

    /// Like [`get`](Self::get), then converts the value to `T`.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::Missing` if nothing is stored under `key`, and
    /// `ContextError::TypeMismatch` if the stored value is not a `T`.
    pub fn require<T>(&self, id: RequestId, key: &str) -> Result<T, ContextError>
    where
        T: TryFrom<Value, Error = ValueTypeError>,
    {
        let value = self.get(id, key).ok_or_else(|| ContextError::Missing {
            request_id: id,
            key: key.to_string(),
        })?;
        T::try_from(value).map_err(|source| ContextError::TypeMismatch {
            request_id: id,
            key: key.to_string(),
            source,
        })
    }

    /// Returns a snapshot of every value stored for the request, or `None`
    /// if nothing was ever set for it.
    #[must_use]
    pub fn get_all(&self, id: RequestId) -> Option<HashMap<String, Value>> {
        self.entries.get(&id).map(|entry| entry.values.clone())
    }

    /// Removes a single key, returning the value it held.
    pub fn delete(&self, id: RequestId, key: &str) -> Option<Value> {
        self.entries
            .get_mut(&id)
            .and_then(|mut entry| entry.values.remove(key))
    }

    /// Removes every value stored for the request.
    pub fn clear(&self, id: RequestId) {
        if self.entries.remove(&id).is_some() {
            debug!(request_id = %id, "request context cleared");
        }
    }

    /// Removes entries whose first value was set more than `max_age` ago.
    ///
    /// A zero `max_age` removes every entry. Returns the number removed.
    pub fn purge(&self, max_age: Duration) -> usize {
        if max_age.is_zero() {
            let removed = self.entries.len();
            self.entries.clear();
            return removed;
        }

        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.created_at.elapsed() < max_age;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of requests that currently have values stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII handle for one request's identity in a [`ContextStore`].
///
/// Dropping the guard clears the request's values, including when the
/// handler panics or the request future is cancelled.
#[derive(Debug)]
pub struct ContextGuard {
    id: RequestId,
    store: Arc<ContextStore>,
}

impl ContextGuard {
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        self.store.clear(self.id);
    }
}
