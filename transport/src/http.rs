//! Production transport: reqwest for calls, WebSocket for update streams.

use crate::config::{ClientConfig, ConfigError};
use crate::retry::{RetryPolicy, retry_with_predicate};
use crate::websocket;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use std::time::Instant;
use ticketing_sdk_core::endpoint::{Endpoint, HttpMethod};
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::{RawUpdateStream, ResponseFuture, Transport};

/// [`Transport`] talking to the ticketing REST API and its update socket.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    ws_url: Url,
    api_key: String,
    retry: Option<RetryPolicy>,
    update_buffer: usize,
}

impl HttpTransport {
    /// Build a transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url()?,
            ws_url: config.ws_url()?,
            api_key: config.api_key.clone(),
            retry: config.retry.clone(),
            update_buffer: config.update_buffer,
        })
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL update streams connect to, before per-subscription parameters
    #[must_use]
    pub const fn ws_url(&self) -> &Url {
        &self.ws_url
    }

    fn url_for(&self, endpoint: &Endpoint) -> Result<Url, NetworkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| NetworkError::InvalidUrl)?
            .pop_if_empty()
            .extend(endpoint.segments());

        let query = endpoint.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send_once(&self, endpoint: &Endpoint) -> Result<Vec<u8>, NetworkError> {
        let url = self.url_for(endpoint)?;

        let mut request = self
            .client
            .request(to_method(endpoint.method()), url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        if let Some(body) = endpoint.body() {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        if let Some(error) = NetworkError::from_status(response.status().as_u16()) {
            return Err(error);
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }
}

impl Transport for HttpTransport {
    fn request<'a>(&'a self, endpoint: &'a Endpoint) -> ResponseFuture<'a> {
        Box::pin(async move {
            let started = Instant::now();

            let result = match &self.retry {
                Some(policy) if endpoint.method() == HttpMethod::Get => {
                    retry_with_predicate(
                        policy,
                        || self.send_once(endpoint),
                        NetworkError::is_retryable,
                    )
                    .await
                }
                _ => self.send_once(endpoint).await,
            };

            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &result {
                Ok(body) => tracing::debug!(
                    method = endpoint.method().as_str(),
                    path = %endpoint.path(),
                    bytes = body.len(),
                    elapsed_ms,
                    "Request completed"
                ),
                Err(error) => tracing::debug!(
                    method = endpoint.method().as_str(),
                    path = %endpoint.path(),
                    error = %error,
                    elapsed_ms,
                    "Request failed"
                ),
            }

            result
        })
    }

    fn open_stream(&self, subscription_key: &str) -> RawUpdateStream {
        let mut url = self.ws_url.clone();
        url.query_pairs_mut()
            .append_pair("eventId", subscription_key)
            .append_pair("apiKey", &self.api_key);

        Box::pin(websocket::UpdateFeed::connect(url, self.update_buffer))
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_reqwest_error(error: reqwest::Error) -> NetworkError {
    if error.is_builder() {
        NetworkError::InvalidUrl
    } else if error.is_timeout() || error.is_connect() || error.is_request() {
        NetworkError::NoConnection
    } else if error.is_decode() {
        NetworkError::decoding(error)
    } else {
        NetworkError::InvalidResponse
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn transport(base_url: &str) -> HttpTransport {
        HttpTransport::new(&ClientConfig::new(base_url, "key")).unwrap()
    }

    #[test]
    fn joins_base_path_and_query() {
        let transport = transport("https://api.example.com/");
        let url = transport
            .url_for(&Endpoint::SearchEvents {
                query: "rock & roll".to_string(),
            })
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/v1/events/search?q=rock+%26+roll"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let transport = transport("https://api.example.com/gateway");
        let url = transport.url_for(&Endpoint::Events).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/gateway/api/v1/events");
    }

    #[test]
    fn ids_are_encoded_as_one_segment() {
        let transport = transport("https://api.example.com");

        let url = transport
            .url_for(&Endpoint::Event { id: "a?b=1".into() })
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/events/a%3Fb=1");
        assert_eq!(url.query(), None);

        let url = transport
            .url_for(&Endpoint::Event {
                id: "x/../../admin".into(),
            })
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/v1/events/x%2F..%2F..%2Fadmin"
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(HttpTransport::new(&ClientConfig::new("not a url", "key")).is_err());
    }

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(to_method(HttpMethod::Get), Method::GET);
        assert_eq!(to_method(HttpMethod::Delete), Method::DELETE);
    }
}
