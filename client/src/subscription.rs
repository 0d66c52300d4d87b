//! Per-subscription update streams.
//!
//! Every subscription owns one transport stream, driven by a forwarding task
//! that decodes raw records and hands them to the subscriber over a bounded
//! channel. Records arrive in transport order. Malformed records are logged
//! and dropped. A connection failure or the remote closing the stream ends
//! the subscription without an error.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting ──first record──▶ Streaming ──┐
//!      │                                   ├──▶ Closed
//!      └───────────────────────────────────┘
//! ```
//!
//! `Closed` is reached on cancellation, on the end of the transport stream,
//! or on a connection failure. The transport stream is dropped exactly once,
//! at that transition.

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::Transport;
use ticketing_sdk_core::types::EventId;
use ticketing_sdk_core::update::EventUpdate;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Where a subscription is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionState {
    /// Transport stream opened, nothing received yet
    Connecting,
    /// At least one record received
    Streaming,
    /// Terminal; no further updates will be delivered
    Closed,
}

#[derive(Debug)]
enum CloseReason {
    Cancelled,
    Ended,
    Failed(NetworkError),
}

/// Cloneable control handle of a subscription.
///
/// Lets another task cancel the subscription or observe its state while the
/// [`UpdateStream`] itself is being consumed elsewhere.
#[derive(Clone, Debug)]
pub struct SubscriptionHandle {
    event_id: EventId,
    cancel: Arc<watch::Sender<bool>>,
    state: watch::Receiver<SubscriptionState>,
}

impl SubscriptionHandle {
    /// Event this subscription follows
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Stop delivery and release the transport stream.
    ///
    /// Idempotent: only the first call has any effect.
    pub fn cancel(&self) {
        let first = self.cancel.send_if_modified(|cancelled| {
            let changed = !*cancelled;
            *cancelled = true;
            changed
        });
        if first {
            tracing::debug!(event_id = %self.event_id, "Subscription cancel requested");
        }
    }

    /// Whether [`cancel`](Self::cancel) has been called
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        *self.state.borrow()
    }

    /// Wait until the subscription is closed and its transport stream
    /// released.
    pub async fn closed(&self) {
        let mut state = self.state.clone();
        // An error means the forwarding task is gone, which also means closed.
        let _ = state
            .wait_for(|state| *state == SubscriptionState::Closed)
            .await;
    }
}

/// Live updates for one event.
///
/// Yields [`EventUpdate`]s in the order the transport produced them and ends
/// when the subscription closes. Dropping the stream cancels the
/// subscription.
///
/// # Example
///
/// ```
/// use futures::StreamExt;
/// use std::sync::Arc;
/// use ticketing_sdk::EventService;
/// use ticketing_sdk_core::types::EventId;
/// use ticketing_sdk_testing::{MockTransport, test_clock};
///
/// # tokio_test::block_on(async {
/// let transport = Arc::new(MockTransport::with_common_mock_data());
/// let service = EventService::new(transport.clone(), Arc::new(test_clock()));
///
/// let updates: Vec<_> = service
///     .subscribe_to_updates(&EventId::new("event-1"))
///     .collect()
///     .await;
/// assert_eq!(updates.len(), 3);
/// # });
/// ```
#[derive(Debug)]
pub struct UpdateStream {
    updates: mpsc::Receiver<EventUpdate>,
    handle: SubscriptionHandle,
    task: Option<JoinHandle<()>>,
}

impl UpdateStream {
    /// Open a transport stream for `event_id` and start forwarding.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn(transport: Arc<dyn Transport>, event_id: EventId, buffer: usize) -> Self {
        let (updates_tx, updates) = mpsc::channel(buffer.max(1));
        let (cancel, cancel_rx) = watch::channel(false);
        let (state_tx, state) = watch::channel(SubscriptionState::Connecting);

        let task = tokio::spawn(forward(
            transport,
            event_id.clone(),
            updates_tx,
            cancel_rx,
            state_tx,
        ));

        Self {
            updates,
            handle: SubscriptionHandle {
                event_id,
                cancel: Arc::new(cancel),
                state,
            },
            task: Some(task),
        }
    }

    /// Event this stream follows
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        self.handle.event_id()
    }

    /// A handle for cancelling or observing this subscription from elsewhere
    #[must_use]
    pub fn handle(&self) -> SubscriptionHandle {
        self.handle.clone()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        self.handle.state()
    }

    /// Stop delivery immediately and release the transport stream.
    ///
    /// Updates already buffered but not yet read are discarded. Calling this
    /// more than once has no further effect.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Cancel and wait until the transport stream has been released.
    pub async fn shutdown(mut self) {
        self.cancel();
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                tracing::warn!(
                    event_id = %self.handle.event_id,
                    error = %error,
                    "Subscription task did not finish cleanly"
                );
            }
        }
    }
}

impl Stream for UpdateStream {
    type Item = EventUpdate;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.handle.is_cancelled() {
            return Poll::Ready(None);
        }
        this.updates.poll_recv(cx)
    }
}

impl Drop for UpdateStream {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

async fn forward(
    transport: Arc<dyn Transport>,
    event_id: EventId,
    updates: mpsc::Sender<EventUpdate>,
    mut cancel: watch::Receiver<bool>,
    state: watch::Sender<SubscriptionState>,
) {
    let mut raw = transport.open_stream(event_id.as_str());
    metrics::counter!("ticketing.subscriptions.opened").increment(1);
    tracing::info!(event_id = %event_id, "Subscription opened");

    let reason = loop {
        let next = tokio::select! {
            biased;
            () = cancelled(&mut cancel) => break CloseReason::Cancelled,
            next = raw.next() => next,
        };

        let record = match next {
            None => break CloseReason::Ended,
            Some(Err(NetworkError::DecodingFailed(reason))) => {
                mark_streaming(&state);
                drop_record(&event_id, &reason);
                continue;
            }
            Some(Err(error)) => break CloseReason::Failed(error),
            Some(Ok(record)) => record,
        };
        mark_streaming(&state);

        let update = match EventUpdate::try_from(record) {
            Ok(update) => update,
            Err(error) => {
                drop_record(&event_id, &error);
                continue;
            }
        };

        // Cancellation must win over a full channel.
        let sent = tokio::select! {
            biased;
            () = cancelled(&mut cancel) => break CloseReason::Cancelled,
            sent = updates.send(update) => sent,
        };
        if sent.is_err() {
            break CloseReason::Cancelled;
        }
        metrics::counter!("ticketing.updates.delivered").increment(1);
    };

    drop(raw);
    state.send_replace(SubscriptionState::Closed);
    metrics::counter!("ticketing.subscriptions.closed").increment(1);

    match reason {
        CloseReason::Failed(error) => {
            tracing::info!(event_id = %event_id, error = %error, "Subscription closed after transport failure");
        }
        reason => tracing::info!(event_id = %event_id, ?reason, "Subscription closed"),
    }
}

/// Resolves once cancellation is requested or every controller is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|cancelled| *cancelled).await;
}

fn mark_streaming(state: &watch::Sender<SubscriptionState>) {
    state.send_if_modified(|state| {
        let connecting = *state == SubscriptionState::Connecting;
        if connecting {
            *state = SubscriptionState::Streaming;
        }
        connecting
    });
}

fn drop_record(event_id: &EventId, reason: &dyn std::fmt::Display) {
    metrics::counter!("ticketing.updates.dropped").increment(1);
    tracing::warn!(event_id = %event_id, reason = %reason, "Dropped malformed update record");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use ticketing_sdk_core::update::RawUpdateRecord;
    use ticketing_sdk_testing::MockTransport;
    use ticketing_sdk_testing::fixtures::mock_updates;

    fn subscribe(transport: &MockTransport, event_id: &str) -> UpdateStream {
        UpdateStream::spawn(Arc::new(transport.clone()), EventId::new(event_id), 8)
    }

    #[tokio::test]
    async fn delivers_updates_in_order_then_closes() {
        let transport = MockTransport::new();
        transport.set_stream_updates("E9", &mock_updates("E9"));

        let stream = subscribe(&transport, "E9");
        let handle = stream.handle();
        let updates: Vec<_> = stream.collect().await;

        assert_eq!(updates, mock_updates("E9"));
        handle.closed().await;
        assert_eq!(handle.state(), SubscriptionState::Closed);
        assert_eq!(transport.closed_streams(), 1);
    }

    #[tokio::test]
    async fn state_moves_to_streaming_on_first_record() {
        let transport = MockTransport::new();
        transport.set_stream_updates("E9", &mock_updates("E9"));
        transport.set_stream_delay(Duration::from_secs(60));

        let mut stream = subscribe(&transport, "E9");
        assert!(stream.next().await.is_some());
        assert_eq!(stream.state(), SubscriptionState::Streaming);

        stream.shutdown().await;
    }

    #[tokio::test]
    async fn undecodable_records_are_skipped() {
        let transport = MockTransport::new();
        let updates = mock_updates("E9");
        let mut unknown = RawUpdateRecord::from(&updates[0]);
        unknown.kind = "teleported".to_string();

        transport.set_stream_items(
            "E9",
            vec![
                Err(NetworkError::DecodingFailed("bad frame".to_string())),
                Ok(unknown),
                Ok(RawUpdateRecord::from(&updates[0])),
                Ok(RawUpdateRecord::from(&updates[1])),
            ],
        );

        let delivered: Vec<_> = subscribe(&transport, "E9").collect().await;
        assert_eq!(delivered, updates[..2].to_vec());
    }

    #[tokio::test]
    async fn connection_failure_ends_stream_quietly() {
        let transport = MockTransport::new();
        let updates = mock_updates("E9");
        transport.set_stream_items(
            "E9",
            vec![
                Ok(RawUpdateRecord::from(&updates[0])),
                Err(NetworkError::NoConnection),
                Ok(RawUpdateRecord::from(&updates[1])),
            ],
        );

        let delivered: Vec<_> = subscribe(&transport, "E9").collect().await;
        assert_eq!(delivered, updates[..1].to_vec());
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_prompt() {
        let transport = MockTransport::new();
        transport.set_stream_updates("E9", &mock_updates("E9"));
        transport.set_stream_delay(Duration::from_secs(60));

        let mut stream = subscribe(&transport, "E9");
        assert!(stream.next().await.is_some());

        stream.cancel();
        stream.cancel();
        assert!(stream.handle().is_cancelled());
        assert!(stream.next().await.is_none());

        tokio::time::timeout(Duration::from_secs(1), stream.shutdown())
            .await
            .unwrap();
        assert_eq!(transport.opened_streams(), 1);
        assert_eq!(transport.closed_streams(), 1);
    }

    #[tokio::test]
    async fn cancel_discards_buffered_updates() {
        let transport = MockTransport::new();
        transport.set_stream_updates("E9", &mock_updates("E9"));

        let mut stream = subscribe(&transport, "E9");
        stream.handle().closed().await;

        stream.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn dropping_the_stream_releases_the_transport() {
        let transport = MockTransport::new();
        transport.set_stream_updates("E9", &mock_updates("E9"));
        transport.set_stream_delay(Duration::from_secs(60));

        let mut stream = subscribe(&transport, "E9");
        assert!(stream.next().await.is_some());
        let handle = stream.handle();
        drop(stream);

        tokio::time::timeout(Duration::from_secs(1), handle.closed())
            .await
            .unwrap();
        assert_eq!(transport.closed_streams(), 1);
    }

    #[tokio::test]
    async fn handle_cancels_from_another_task() {
        let transport = MockTransport::new();
        transport.set_stream_updates("E9", &mock_updates("E9"));
        transport.set_stream_delay(Duration::from_secs(60));

        let mut stream = subscribe(&transport, "E9");
        let handle = stream.handle();
        assert!(stream.next().await.is_some());

        tokio::spawn(async move { handle.cancel() }).await.unwrap();

        assert!(stream.next().await.is_none());
        stream.shutdown().await;
        assert_eq!(transport.closed_streams(), 1);
    }
}
