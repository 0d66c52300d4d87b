//! # Event Ticketing SDK
//!
//! Client-side access to an event ticketing platform.
//!
//! The heart of the crate is [`EventService`]: catalog reads served from a
//! time-bounded [`EventCache`](cache::EventCache) when possible, and live
//! [`UpdateStream`]s relaying price, availability and schedule changes for
//! one event at a time. [`TicketService`] and [`OrderService`] wrap the
//! reservation and purchase calls. [`EventTicketingClient`] bundles all
//! three over one shared transport.
//!
//! ## Example
//!
//! ```
//! use futures::StreamExt;
//! use std::sync::Arc;
//! use ticketing_sdk::EventTicketingClient;
//! use ticketing_sdk_core::types::EventId;
//! use ticketing_sdk_testing::{MockTransport, test_clock};
//!
//! # tokio_test::block_on(async {
//! let transport = Arc::new(MockTransport::with_common_mock_data());
//! let client = EventTicketingClient::with_transport(transport.clone(), Arc::new(test_clock()), 64);
//!
//! let events = client.fetch_all_events().await.unwrap();
//! let again = client.fetch_all_events().await.unwrap();
//! assert_eq!(events.len(), again.len());
//! assert_eq!(transport.total_requests(), 1);
//!
//! let mut updates = client.subscribe_to_updates(&EventId::new("event-1"));
//! while let Some(update) = updates.next().await {
//!     println!("{}: {:?}", update.event_id, update.kind);
//! }
//! # });
//! ```

pub mod cache;
pub mod client;
pub mod events;
pub mod orders;
pub mod subscription;
pub mod tickets;

pub use client::EventTicketingClient;
pub use events::EventService;
pub use orders::OrderService;
pub use subscription::{SubscriptionHandle, SubscriptionState, UpdateStream};
pub use tickets::TicketService;

pub use ticketing_sdk_core::{Event, EventId, EventUpdate, NetworkError, UpdateKind};
pub use ticketing_sdk_transport::{ClientConfig, ConfigError, Environment};
