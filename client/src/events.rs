//! Event catalog reads and update subscriptions.
//!
//! [`EventService`] decides for every read whether the cache can answer it
//! or the transport has to be asked:
//!
//! | Operation                | Cache read         | Cache write |
//! |--------------------------|--------------------|-------------|
//! | `fetch_all_events`       | any entry, no TTL  | whole list  |
//! | `fetch_event`            | TTL-checked entry  | the event   |
//! | `search_events`          | never              | never       |
//! | `subscribe_to_updates`   | never              | never       |
//!
//! Transport failures are returned unchanged; retries, if any, happen
//! inside the transport.

use crate::cache::EventCache;
use crate::subscription::UpdateStream;
use std::sync::Arc;
use ticketing_sdk_core::endpoint::Endpoint;
use ticketing_sdk_core::environment::Clock;
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::{Transport, request_json};
use ticketing_sdk_core::types::{Event, EventId};

/// Default capacity of a subscription's update channel
pub const DEFAULT_UPDATE_BUFFER: usize = 64;

/// Cached access to the event catalog plus live update subscriptions.
///
/// Each service owns its cache; two services never share cached data.
pub struct EventService {
    transport: Arc<dyn Transport>,
    cache: EventCache,
    update_buffer: usize,
}

impl EventService {
    /// Create a service with an empty cache.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            cache: EventCache::new(clock),
            update_buffer: DEFAULT_UPDATE_BUFFER,
        }
    }

    /// Builder: set the capacity of each subscription's update channel.
    #[must_use]
    pub fn with_update_buffer(mut self, update_buffer: usize) -> Self {
        self.update_buffer = update_buffer.max(1);
        self
    }

    /// The full catalog.
    ///
    /// Any cached events are returned as they are, however old. Only an
    /// empty cache goes to the transport, and the result then fills the
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_all_events(&self) -> Result<Vec<Event>, NetworkError> {
        if let Some(events) = self.cache.get_all() {
            metrics::counter!("ticketing.cache.hits").increment(1);
            tracing::debug!(count = events.len(), "Event list served from cache");
            return Ok(events);
        }

        metrics::counter!("ticketing.cache.misses").increment(1);
        let events: Vec<Event> = request_json(self.transport.as_ref(), &Endpoint::Events).await?;
        self.cache.put_many(events.iter().cloned());
        tracing::debug!(count = events.len(), "Event list fetched");
        Ok(events)
    }

    /// One event, from the cache if it was stored less than five minutes ago.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    #[tracing::instrument(skip(self, id), fields(event_id = %id))]
    pub async fn fetch_event(&self, id: &EventId) -> Result<Event, NetworkError> {
        if let Some(event) = self.cache.get(id) {
            metrics::counter!("ticketing.cache.hits").increment(1);
            tracing::debug!("Event served from cache");
            return Ok(event);
        }

        metrics::counter!("ticketing.cache.misses").increment(1);
        let event: Event =
            request_json(self.transport.as_ref(), &Endpoint::Event { id: id.clone() }).await?;
        self.cache.put(event.clone());
        tracing::debug!("Event fetched");
        Ok(event)
    }

    /// Events matching `query`, always straight from the transport.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn search_events(&self, query: &str) -> Result<Vec<Event>, NetworkError> {
        request_json(
            self.transport.as_ref(),
            &Endpoint::SearchEvents {
                query: query.to_string(),
            },
        )
        .await
    }

    /// Follow live updates for `event_id`.
    ///
    /// Every call opens its own transport stream. Must be called from within
    /// a Tokio runtime.
    #[must_use]
    pub fn subscribe_to_updates(&self, event_id: &EventId) -> UpdateStream {
        UpdateStream::spawn(
            Arc::clone(&self.transport),
            event_id.clone(),
            self.update_buffer,
        )
    }

    /// Forget every cached event.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Event cache cleared");
    }
}

impl std::fmt::Debug for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventService")
            .field("cache", &self.cache)
            .field("update_buffer", &self.update_buffer)
            .finish_non_exhaustive()
    }
}
