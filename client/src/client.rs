//! The SDK entry point.

use crate::events::EventService;
use crate::orders::OrderService;
use crate::subscription::UpdateStream;
use crate::tickets::TicketService;
use std::sync::Arc;
use ticketing_sdk_core::environment::{Clock, SystemClock};
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::Transport;
use ticketing_sdk_core::types::{
    Event, EventId, Order, PaymentMethod, RefundRequest, RefundStatus, Ticket, TicketReservation,
};
use ticketing_sdk_transport::{ClientConfig, ConfigError, HttpTransport};

struct Services {
    events: EventService,
    tickets: TicketService,
    orders: OrderService,
}

/// Client for the event ticketing platform.
///
/// One transport is shared by the event, ticket and order services. Clones
/// share everything, the event cache included; separately constructed
/// clients share nothing.
///
/// # Example
///
/// ```no_run
/// use ticketing_sdk::EventTicketingClient;
/// use ticketing_sdk_transport::ClientConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = EventTicketingClient::new(&ClientConfig::new("https://api.example.com", "key"))?;
/// for event in client.fetch_all_events().await? {
///     println!("{} at {}", event.name, event.venue.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EventTicketingClient {
    services: Arc<Services>,
}

impl EventTicketingClient {
    /// Create a client talking to the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config)?;
        tracing::info!(
            base_url = %transport.base_url(),
            environment = ?config.environment,
            "Event ticketing client configured"
        );
        Ok(Self::with_transport(
            Arc::new(transport),
            Arc::new(SystemClock),
            config.update_buffer,
        ))
    }

    /// Create a client over an injected transport and clock.
    #[must_use]
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        update_buffer: usize,
    ) -> Self {
        let services = Services {
            events: EventService::new(Arc::clone(&transport), clock).with_update_buffer(update_buffer),
            tickets: TicketService::new(Arc::clone(&transport)),
            orders: OrderService::new(transport),
        };
        Self {
            services: Arc::new(services),
        }
    }

    /// The event service
    #[must_use]
    pub fn events(&self) -> &EventService {
        &self.services.events
    }

    /// The ticket service
    #[must_use]
    pub fn tickets(&self) -> &TicketService {
        &self.services.tickets
    }

    /// The order service
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.services.orders
    }

    // Events

    /// See [`EventService::fetch_all_events`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn fetch_all_events(&self) -> Result<Vec<Event>, NetworkError> {
        self.services.events.fetch_all_events().await
    }

    /// See [`EventService::fetch_event`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn fetch_event(&self, id: &EventId) -> Result<Event, NetworkError> {
        self.services.events.fetch_event(id).await
    }

    /// See [`EventService::search_events`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn search_events(&self, query: &str) -> Result<Vec<Event>, NetworkError> {
        self.services.events.search_events(query).await
    }

    /// See [`EventService::subscribe_to_updates`].
    #[must_use]
    pub fn subscribe_to_updates(&self, event_id: &EventId) -> UpdateStream {
        self.services.events.subscribe_to_updates(event_id)
    }

    /// Forget every cached event.
    pub fn clear_cache(&self) {
        self.services.events.clear_cache();
    }

    // Tickets

    /// See [`TicketService::available_tickets`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn available_tickets(&self, event_id: &EventId) -> Result<Vec<Ticket>, NetworkError> {
        self.services.tickets.available_tickets(event_id).await
    }

    /// See [`TicketService::reserve_tickets`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn reserve_tickets(
        &self,
        ticket_ids: &[String],
        event_id: &EventId,
    ) -> Result<TicketReservation, NetworkError> {
        self.services.tickets.reserve_tickets(ticket_ids, event_id).await
    }

    /// See [`TicketService::ticket`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn ticket(&self, id: &str) -> Result<Ticket, NetworkError> {
        self.services.tickets.ticket(id).await
    }

    /// See [`TicketService::reservation`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn reservation(&self, id: &str) -> Result<TicketReservation, NetworkError> {
        self.services.tickets.reservation(id).await
    }

    /// See [`TicketService::cancel_reservation`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn cancel_reservation(&self, id: &str) -> Result<(), NetworkError> {
        self.services.tickets.cancel_reservation(id).await
    }

    // Orders

    /// See [`OrderService::purchase_tickets`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn purchase_tickets(
        &self,
        reservation: &TicketReservation,
        payment_method: PaymentMethod,
    ) -> Result<Order, NetworkError> {
        self.services
            .orders
            .purchase_tickets(reservation, payment_method)
            .await
    }

    /// See [`OrderService::order`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn order(&self, id: &str) -> Result<Order, NetworkError> {
        self.services.orders.order(id).await
    }

    /// See [`OrderService::user_orders`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn user_orders(&self, user_id: &str) -> Result<Vec<Order>, NetworkError> {
        self.services.orders.user_orders(user_id).await
    }

    /// See [`OrderService::cancel_order`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn cancel_order(&self, id: &str) -> Result<Order, NetworkError> {
        self.services.orders.cancel_order(id).await
    }

    /// See [`OrderService::request_refund`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn request_refund(&self, order_id: &str, reason: &str) -> Result<RefundRequest, NetworkError> {
        self.services.orders.request_refund(order_id, reason).await
    }

    /// See [`OrderService::refund_status`].
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn refund_status(&self, order_id: &str) -> Result<RefundStatus, NetworkError> {
        self.services.orders.refund_status(order_id).await
    }
}

impl std::fmt::Debug for EventTicketingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTicketingClient")
            .field("events", &self.services.events)
            .finish_non_exhaustive()
    }
}
