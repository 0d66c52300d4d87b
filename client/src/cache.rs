//! Time-bounded in-memory event cache.
//!
//! Entries are keyed by event id and stamped with the clock reading at
//! insertion. A single-entry lookup treats entries older than [`CACHE_TTL`]
//! as absent. Expired entries are never evicted proactively: they stay in
//! the map until overwritten or cleared.
//!
//! Every operation holds the same lock, so a batch insert is never partially
//! visible and concurrent writers to one key produce a single winner.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use ticketing_sdk_core::environment::Clock;
use ticketing_sdk_core::types::{Event, EventId};

/// How long a cached event is served by [`EventCache::get`].
pub const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct CacheEntry {
    event: Event,
    inserted_at: DateTime<Utc>,
}

/// Concurrency-safe event cache with a fixed time-to-live.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use ticketing_sdk::cache::EventCache;
/// use ticketing_sdk_testing::{ManualClock, fixtures::mock_event, test_clock};
///
/// let clock = ManualClock::starting_at(test_clock().time());
/// let cache = EventCache::new(Arc::new(clock.clone()));
///
/// cache.put(mock_event("E1"));
/// assert!(cache.get(&"E1".into()).is_some());
///
/// clock.advance(chrono::Duration::seconds(300));
/// assert!(cache.get(&"E1".into()).is_none());
/// ```
pub struct EventCache {
    entries: Mutex<HashMap<EventId, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl EventCache {
    /// Create an empty cache reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    // Every mutation leaves the map consistent, so a poisoned lock is still
    // safe to use.
    fn entries(&self) -> MutexGuard<'_, HashMap<EventId, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(inserted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // A clock that moved backwards yields a negative age, which is fresh.
        now.signed_duration_since(inserted_at)
            .to_std()
            .map_or(true, |age| age < CACHE_TTL)
    }

    /// Every cached event, fresh or not, in no particular order.
    ///
    /// Returns `None` when the cache holds nothing.
    #[must_use]
    pub fn get_all(&self) -> Option<Vec<Event>> {
        let entries = self.entries();
        if entries.is_empty() {
            return None;
        }
        Some(entries.values().map(|entry| entry.event.clone()).collect())
    }

    /// The cached event for `id`, if it was inserted less than
    /// [`CACHE_TTL`] ago.
    #[must_use]
    pub fn get(&self, id: &EventId) -> Option<Event> {
        let entries = self.entries();
        let entry = entries.get(id)?;
        Self::is_fresh(entry.inserted_at, self.clock.now()).then(|| entry.event.clone())
    }

    /// Insert or overwrite every event, all stamped with one clock reading.
    pub fn put_many<I>(&self, events: I)
    where
        I: IntoIterator<Item = Event>,
    {
        let mut entries = self.entries();
        let inserted_at = self.clock.now();
        for event in events {
            entries.insert(event.id.clone(), CacheEntry { event, inserted_at });
        }
    }

    /// Insert or overwrite one event.
    pub fn put(&self, event: Event) {
        let mut entries = self.entries();
        let inserted_at = self.clock.now();
        entries.insert(event.id.clone(), CacheEntry { event, inserted_at });
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// When `id` was last inserted, even if the entry has expired.
    #[must_use]
    pub fn inserted_at(&self, id: &EventId) -> Option<DateTime<Utc>> {
        self.entries().get(id).map(|entry| entry.inserted_at)
    }

    /// Number of entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the cache holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl std::fmt::Debug for EventCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
