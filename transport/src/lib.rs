//! # Event Ticketing SDK Transport
//!
//! The production [`Transport`](ticketing_sdk_core::Transport) of the event
//! ticketing SDK.
//!
//! - [`HttpTransport`]: REST calls over reqwest, update streams over a
//!   WebSocket per subscription
//! - [`ClientConfig`]: base URL, API key, timeouts and stream settings,
//!   loadable from environment variables
//! - [`retry`]: exponential backoff for idempotent reads
//!
//! ## Example
//!
//! ```no_run
//! use ticketing_sdk_core::endpoint::Endpoint;
//! use ticketing_sdk_core::transport::request_json;
//! use ticketing_sdk_core::types::Event;
//! use ticketing_sdk_transport::{ClientConfig, HttpTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let transport = HttpTransport::new(&config)?;
//! let events: Vec<Event> = request_json(&transport, &Endpoint::Events).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod retry;
pub mod websocket;

pub use config::{ClientConfig, ConfigError, Environment};
pub use http::HttpTransport;
pub use retry::RetryPolicy;
