//! In-memory transport for fast, deterministic tests.
//!
//! [`MockTransport`] replays canned responses keyed by
//! [`Endpoint::cache_key`], replays canned update streams keyed by event id,
//! and records everything the SDK asks of it so tests can assert on request
//! counts and stream lifecycles.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on poisoned test locks

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use ticketing_sdk_core::endpoint::Endpoint;
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::{RawUpdateStream, ResponseFuture, Transport};
use ticketing_sdk_core::update::{EventUpdate, RawUpdateRecord};

/// One request observed by a [`MockTransport`].
#[derive(Clone, Debug)]
pub struct MockRequest {
    /// [`Endpoint::cache_key`] of the request
    pub endpoint_key: String,
    /// The request itself
    pub endpoint: Endpoint,
    /// When the request was made
    pub timestamp: DateTime<Utc>,
}

type StreamItem = Result<RawUpdateRecord, NetworkError>;

#[derive(Default)]
struct MockState {
    responses: HashMap<String, Result<Vec<u8>, NetworkError>>,
    streams: HashMap<String, Vec<StreamItem>>,
    history: Vec<MockRequest>,
    network_delay: Duration,
    stream_delay: Duration,
    offline: bool,
    opened_streams: usize,
    closed_streams: usize,
}

/// Mock [`Transport`] with canned responses and update streams.
///
/// Unconfigured endpoints fail with [`NetworkError::NotFound`]; unconfigured
/// update streams end immediately without yielding anything.
///
/// Clones share state, so a test can keep a handle while the SDK owns
/// another.
///
/// # Example
///
/// ```
/// use ticketing_sdk_core::endpoint::Endpoint;
/// use ticketing_sdk_core::transport::request_json;
/// use ticketing_sdk_testing::MockTransport;
///
/// # tokio_test::block_on(async {
/// let transport = MockTransport::new();
/// transport.set_response(&Endpoint::Events, &vec!["a", "b"]);
///
/// let names: Vec<String> = request_json(&transport, &Endpoint::Events).await.unwrap();
/// assert_eq!(names, vec!["a", "b"]);
/// assert_eq!(transport.request_count(&Endpoint::Events), 1);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock with no canned data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Answer `endpoint` with `response` encoded as JSON.
    pub fn set_response<T: Serialize + ?Sized>(&self, endpoint: &Endpoint, response: &T) {
        let outcome = serde_json::to_vec(response).map_err(NetworkError::decoding);
        self.state().responses.insert(endpoint.cache_key(), outcome);
    }

    /// Answer `endpoint` with a raw body (e.g. malformed JSON).
    pub fn set_raw_response(&self, endpoint: &Endpoint, body: impl Into<Vec<u8>>) {
        self.state()
            .responses
            .insert(endpoint.cache_key(), Ok(body.into()));
    }

    /// Fail `endpoint` with `error`.
    pub fn set_error(&self, endpoint: &Endpoint, error: NetworkError) {
        self.state().responses.insert(endpoint.cache_key(), Err(error));
    }

    /// Stream `updates` to every subscriber of `event_id`.
    pub fn set_stream_updates(&self, event_id: &str, updates: &[EventUpdate]) {
        let items = updates.iter().map(|update| Ok(RawUpdateRecord::from(update))).collect();
        self.set_stream_items(event_id, items);
    }

    /// Stream arbitrary items (including failures) to every subscriber of
    /// `event_id`.
    pub fn set_stream_items(&self, event_id: &str, items: Vec<Result<RawUpdateRecord, NetworkError>>) {
        self.state().streams.insert(event_id.to_string(), items);
    }

    /// Delay every request by `delay`.
    pub fn set_network_delay(&self, delay: Duration) {
        self.state().network_delay = delay;
    }

    /// Pause for `delay` between consecutive stream items.
    pub fn set_stream_delay(&self, delay: Duration) {
        self.state().stream_delay = delay;
    }

    /// Simulate losing (or regaining) connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Clear canned data, history and counters.
    pub fn reset(&self) {
        *self.state() = MockState::default();
    }

    /// Every request made so far, oldest first.
    #[must_use]
    pub fn request_history(&self) -> Vec<MockRequest> {
        self.state().history.clone()
    }

    /// Number of requests made to `endpoint`.
    #[must_use]
    pub fn request_count(&self, endpoint: &Endpoint) -> usize {
        let key = endpoint.cache_key();
        self.state()
            .history
            .iter()
            .filter(|request| request.endpoint_key == key)
            .count()
    }

    /// Number of requests made to any endpoint.
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.state().history.len()
    }

    /// Whether `endpoint` was requested at least once.
    #[must_use]
    pub fn was_requested(&self, endpoint: &Endpoint) -> bool {
        self.request_count(endpoint) > 0
    }

    /// The most recent request to `endpoint`.
    #[must_use]
    pub fn last_request(&self, endpoint: &Endpoint) -> Option<MockRequest> {
        let key = endpoint.cache_key();
        self.state()
            .history
            .iter()
            .rev()
            .find(|request| request.endpoint_key == key)
            .cloned()
    }

    /// Number of update streams opened.
    #[must_use]
    pub fn opened_streams(&self) -> usize {
        self.state().opened_streams
    }

    /// Number of update streams released, either because they ran to the
    /// end or because they were dropped.
    #[must_use]
    pub fn closed_streams(&self) -> usize {
        self.state().closed_streams
    }
}

impl Transport for MockTransport {
    fn request<'a>(&'a self, endpoint: &'a Endpoint) -> ResponseFuture<'a> {
        Box::pin(async move {
            let (delay, outcome) = {
                let mut state = self.state();
                state.history.push(MockRequest {
                    endpoint_key: endpoint.cache_key(),
                    endpoint: endpoint.clone(),
                    timestamp: Utc::now(),
                });

                if state.offline {
                    (Duration::ZERO, Err(NetworkError::NoConnection))
                } else {
                    let outcome = state
                        .responses
                        .get(&endpoint.cache_key())
                        .cloned()
                        .unwrap_or(Err(NetworkError::NotFound));
                    (state.network_delay, outcome)
                }
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        })
    }

    fn open_stream(&self, subscription_key: &str) -> RawUpdateStream {
        let (items, delay) = {
            let mut state = self.state();
            state.opened_streams += 1;
            let items = if state.offline {
                vec![Err(NetworkError::NoConnection)]
            } else {
                state.streams.get(subscription_key).cloned().unwrap_or_default()
            };
            (items, state.stream_delay)
        };

        let guard = CloseGuard {
            state: Arc::clone(&self.state),
        };

        Box::pin(async_stream::stream! {
            let _guard = guard;
            for (index, item) in items.into_iter().enumerate() {
                if index > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield item;
            }
        })
    }
}

/// Counts a stream as closed when the stream is dropped or runs out.
struct CloseGuard {
    state: Arc<Mutex<MockState>>,
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.closed_streams += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn unconfigured_endpoint_is_not_found() {
        let transport = MockTransport::new();
        let result = transport.request(&Endpoint::Events).await;
        assert_eq!(result, Err(NetworkError::NotFound));
        assert_eq!(transport.total_requests(), 1);
    }

    #[tokio::test]
    async fn offline_requests_fail_without_connection() {
        let transport = MockTransport::new();
        transport.set_response(&Endpoint::Events, &Vec::<u32>::new());
        transport.set_offline(true);

        assert_eq!(
            transport.request(&Endpoint::Events).await,
            Err(NetworkError::NoConnection)
        );

        transport.set_offline(false);
        assert_eq!(transport.request(&Endpoint::Events).await, Ok(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn configured_error_is_replayed() {
        let transport = MockTransport::new();
        let endpoint = Endpoint::Event { id: "E1".into() };
        transport.set_error(&endpoint, NetworkError::RateLimited);

        assert_eq!(transport.request(&endpoint).await, Err(NetworkError::RateLimited));
        assert!(transport.was_requested(&endpoint));
        assert!(transport.last_request(&endpoint).is_some());
    }

    #[tokio::test]
    async fn stream_close_is_counted_once_when_exhausted() {
        let transport = MockTransport::new();
        let mut stream = transport.open_stream("E1");
        assert!(stream.next().await.is_none());
        drop(stream);

        assert_eq!(transport.opened_streams(), 1);
        assert_eq!(transport.closed_streams(), 1);
    }

    #[tokio::test]
    async fn dropping_unpolled_stream_counts_as_closed() {
        let transport = MockTransport::new();
        let stream = transport.open_stream("E1");
        drop(stream);
        assert_eq!(transport.closed_streams(), 1);
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let transport = MockTransport::new();
        transport.set_response(&Endpoint::Events, &Vec::<u32>::new());
        let _ = transport.request(&Endpoint::Events).await;
        transport.reset();

        assert_eq!(transport.total_requests(), 0);
        assert_eq!(
            transport.request(&Endpoint::Events).await,
            Err(NetworkError::NotFound)
        );
    }
}
