//! WebSocket update feed.
//!
//! Each [`UpdateFeed`] owns one socket, driven by a background task that
//! forwards frames over a bounded channel. The task is spawned on first poll,
//! so a feed that is never polled never connects. Dropping the feed tells the
//! task to send a `Going Away` close frame and exit.

use futures::{Stream, StreamExt};
use reqwest::Url;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::update::RawUpdateRecord;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

type FeedItem = Result<RawUpdateRecord, NetworkError>;

/// Stream of raw update records read from one WebSocket connection.
///
/// Yields `Err(DecodingFailed)` for frames that are not update records and
/// keeps going; yields one connection error and ends if the socket fails;
/// ends quietly when the server closes the connection.
pub struct UpdateFeed {
    state: FeedState,
}

enum FeedState {
    Idle {
        url: Url,
        buffer: usize,
    },
    Running {
        records: mpsc::Receiver<FeedItem>,
        // Dropped with the feed, which wakes the socket task.
        _shutdown: oneshot::Sender<()>,
    },
    Done,
}

impl UpdateFeed {
    /// Create a feed that connects to `url` when first polled.
    #[must_use]
    pub const fn connect(url: Url, buffer: usize) -> Self {
        Self {
            state: FeedState::Idle { url, buffer },
        }
    }

    fn start(url: Url, buffer: usize) -> FeedState {
        let (records_tx, records) = mpsc::channel(buffer.max(1));
        let (shutdown, shutdown_rx) = oneshot::channel();
        tokio::spawn(run_socket(url, records_tx, shutdown_rx));
        FeedState::Running {
            records,
            _shutdown: shutdown,
        }
    }
}

impl Stream for UpdateFeed {
    type Item = FeedItem;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if matches!(this.state, FeedState::Idle { .. }) {
            if let FeedState::Idle { url, buffer } = mem::replace(&mut this.state, FeedState::Done) {
                this.state = Self::start(url, buffer);
            }
        }

        match &mut this.state {
            FeedState::Running { records, .. } => records.poll_recv(cx),
            FeedState::Idle { .. } | FeedState::Done => Poll::Ready(None),
        }
    }
}

async fn run_socket(url: Url, records: mpsc::Sender<FeedItem>, mut shutdown: oneshot::Receiver<()>) {
    let connected = tokio::select! {
        biased;
        _ = &mut shutdown => return,
        result = tokio_tungstenite::connect_async(url.as_str()) => result,
    };

    let mut socket = match connected {
        Ok((socket, _response)) => socket,
        Err(error) => {
            tracing::warn!(error = %error, "Update socket connection failed");
            let _ = records.send(Err(map_connect_error(&error))).await;
            return;
        }
    };
    tracing::debug!(host = url.host_str().unwrap_or_default(), "Update socket connected");

    let going_away = loop {
        let message = tokio::select! {
            biased;
            _ = &mut shutdown => break true,
            message = socket.next() => message,
        };

        let item = match message {
            Some(Ok(Message::Text(text))) => RawUpdateRecord::from_json(text.as_bytes()),
            Some(Ok(Message::Binary(bytes))) => RawUpdateRecord::from_json(&bytes),
            Some(Ok(Message::Close(_))) | None => break false,
            Some(Ok(_)) => continue,
            Some(Err(error)) => {
                tracing::warn!(error = %error, "Update socket failed");
                let _ = records.send(Err(NetworkError::NoConnection)).await;
                break false;
            }
        };

        // A full channel must not keep the socket open past a shutdown.
        let sent = tokio::select! {
            biased;
            _ = &mut shutdown => break true,
            sent = records.send(item) => sent,
        };
        if sent.is_err() {
            break true;
        }
    };

    if going_away {
        let frame = CloseFrame {
            code: CloseCode::Away,
            reason: "".into(),
        };
        if let Err(error) = socket.close(Some(frame)).await {
            tracing::debug!(error = %error, "Update socket close handshake failed");
        }
    }
    tracing::debug!(going_away, "Update socket released");
}

fn map_connect_error(error: &WsError) -> NetworkError {
    match error {
        WsError::Http(response) => {
            NetworkError::from_status(response.status().as_u16()).unwrap_or(NetworkError::InvalidResponse)
        }
        WsError::Url(_) => NetworkError::InvalidUrl,
        WsError::Io(_) | WsError::ConnectionClosed | WsError::AlreadyClosed => NetworkError::NoConnection,
        _ => NetworkError::InvalidResponse,
    }
}
