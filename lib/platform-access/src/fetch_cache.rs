//! Memoization of JSON fetches.
//!
//! Identical requests (same method, URL and authorization) issued within the
//! time-to-live share one response. Concurrent identical requests share the
//! same in-flight fetch. Failed fetches are not remembered.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

/// Identity of a cached request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: &'static str,
    url: String,
    authorization: Option<String>,
}

impl RequestKey {
    /// Key for a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>, authorization: Option<String>) -> Self {
        Self {
            method: "GET",
            url: url.into(),
            authorization,
        }
    }

    /// Returns the request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug)]
struct Slot {
    created_at: DateTime<Utc>,
    value: OnceCell<JsonValue>,
}

impl Slot {
    fn new() -> Self {
        Self {
            created_at: Utc::now(),
            value: OnceCell::new(),
        }
    }

    /// A deadline past the representable range never expires.
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at
            .checked_add_signed(ttl)
            .is_some_and(|deadline| Utc::now() >= deadline)
    }
}

/// Cache of fetched JSON documents keyed by request.
#[derive(Debug)]
pub struct FetchCache {
    ttl: Duration,
    slots: Mutex<HashMap<RequestKey, Arc<Slot>>>,
}

impl FetchCache {
    /// Creates a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the time-to-live of entries.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value for `key`, running `fetch` when there is
    /// no live entry.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `fetch`; nothing is cached in that case.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: RequestKey, fetch: F) -> Result<JsonValue, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<JsonValue, E>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.retain(|_, slot| !slot.is_expired(self.ttl) || Arc::strong_count(slot) > 1);
            match slots.get(&key) {
                Some(slot) if !slot.is_expired(self.ttl) => Arc::clone(slot),
                _ => {
                    let slot = Arc::new(Slot::new());
                    slots.insert(key.clone(), Arc::clone(&slot));
                    slot
                }
            }
        };

        if slot.value.initialized() {
            debug!(url = %key.url, "fetch cache hit");
        }

        slot.value.get_or_try_init(fetch).await.cloned()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }
}
