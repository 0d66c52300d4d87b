//! The transport contract.
//!
//! A [`Transport`] performs network I/O on behalf of the SDK: single
//! request/response exchanges and long-lived update streams. It knows nothing
//! about caching. Failure handling and any retry policy live here, at the
//! level of a single call.
//!
//! # Dyn Compatibility
//!
//! The trait returns boxed futures and streams instead of using `async fn`
//! so that services can hold an `Arc<dyn Transport>` chosen at construction
//! time (production HTTP transport, mock transport in tests).

use crate::endpoint::Endpoint;
use crate::error::NetworkError;
use crate::update::RawUpdateRecord;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

/// Future returned by [`Transport::request`]: the raw response body.
pub type ResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<u8>, NetworkError>> + Send + 'a>>;

/// Lazy sequence of raw update records for one subscription.
///
/// Items are `Err` when a single frame could not be read or parsed
/// ([`NetworkError::DecodingFailed`]) or when the connection failed (any
/// other variant). The sequence ends when the remote side closes the
/// connection.
///
/// Dropping the stream is the close signal: implementations must release
/// the underlying connection when it is dropped.
pub type RawUpdateStream = Pin<Box<dyn Stream<Item = Result<RawUpdateRecord, NetworkError>> + Send>>;

/// Network transport used by the SDK services.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one transport instance is shared by
/// every service of a client and called concurrently.
pub trait Transport: Send + Sync {
    /// Perform one request/response exchange and return the response body.
    ///
    /// # Errors
    ///
    /// Returns a [`NetworkError`] describing why the exchange failed.
    fn request<'a>(&'a self, endpoint: &'a Endpoint) -> ResponseFuture<'a>;

    /// Open an update stream for one event.
    ///
    /// The connection is established lazily; connection failures surface as
    /// items of the returned stream.
    fn open_stream(&self, subscription_key: &str) -> RawUpdateStream;
}

/// Perform a request and decode the JSON response body into `T`.
///
/// # Errors
///
/// Returns the transport's error unchanged, or
/// [`NetworkError::DecodingFailed`] if the body does not decode into `T`.
pub async fn request_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    endpoint: &Endpoint,
) -> Result<T, NetworkError> {
    let body = transport.request(endpoint).await?;
    decode_body(&body)
}

/// Perform a request whose response body carries no information.
///
/// # Errors
///
/// Returns the transport's error unchanged.
pub async fn request_empty(transport: &dyn Transport, endpoint: &Endpoint) -> Result<(), NetworkError> {
    transport.request(endpoint).await.map(|_| ())
}

/// Decode a JSON response body.
///
/// # Errors
///
/// Returns [`NetworkError::DecodingFailed`] if the body does not decode into `T`.
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, NetworkError> {
    serde_json::from_slice(body).map_err(NetworkError::decoding)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::stream;

    struct StaticTransport(&'static [u8]);

    impl Transport for StaticTransport {
        fn request<'a>(&'a self, _endpoint: &'a Endpoint) -> ResponseFuture<'a> {
            let body = self.0.to_vec();
            Box::pin(async move { Ok(body) })
        }

        fn open_stream(&self, _subscription_key: &str) -> RawUpdateStream {
            Box::pin(stream::empty())
        }
    }

    #[test]
    fn transport_is_dyn_compatible() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Transport>();
    }

    #[test]
    fn decodes_typed_body() {
        let transport = StaticTransport(b"[1, 2, 3]");
        let values: Vec<u32> =
            futures::executor::block_on(request_json(&transport, &Endpoint::Events)).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn decode_failure_is_reported() {
        let transport = StaticTransport(b"{\"oops\": true}");
        let result: Result<Vec<u32>, _> =
            futures::executor::block_on(request_json(&transport, &Endpoint::Events));
        assert!(matches!(result, Err(NetworkError::DecodingFailed(_))));
    }

    #[test]
    fn empty_response_is_accepted() {
        let transport = StaticTransport(b"");
        let endpoint = Endpoint::CancelReservation { id: "r1".into() };
        assert_eq!(futures::executor::block_on(request_empty(&transport, &endpoint)), Ok(()));
    }
}
