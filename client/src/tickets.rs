//! Ticket availability and reservations.

use std::sync::Arc;
use ticketing_sdk_core::endpoint::Endpoint;
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::{Transport, request_empty, request_json};
use ticketing_sdk_core::types::{EventId, Ticket, TicketReservation};

/// Uncached access to tickets and reservations.
#[derive(Clone)]
pub struct TicketService {
    transport: Arc<dyn Transport>,
}

impl TicketService {
    /// Create a service calling `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Tickets still available for `event_id`.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn available_tickets(&self, event_id: &EventId) -> Result<Vec<Ticket>, NetworkError> {
        let endpoint = Endpoint::AvailableTickets {
            event_id: event_id.clone(),
        };
        request_json(self.transport.as_ref(), &endpoint).await
    }

    /// Hold `ticket_ids` of `event_id` for a limited time.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    #[tracing::instrument(skip(self, ticket_ids), fields(tickets = ticket_ids.len()))]
    pub async fn reserve_tickets(
        &self,
        ticket_ids: &[String],
        event_id: &EventId,
    ) -> Result<TicketReservation, NetworkError> {
        let endpoint = Endpoint::ReserveTickets {
            event_id: event_id.clone(),
            ticket_ids: ticket_ids.to_vec(),
        };
        let reservation: TicketReservation = request_json(self.transport.as_ref(), &endpoint).await?;
        tracing::debug!(
            reservation_id = %reservation.reservation_id,
            expires_at = %reservation.expires_at,
            "Tickets reserved"
        );
        Ok(reservation)
    }

    /// One ticket.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn ticket(&self, id: &str) -> Result<Ticket, NetworkError> {
        request_json(self.transport.as_ref(), &Endpoint::Ticket { id: id.to_string() }).await
    }

    /// One reservation.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn reservation(&self, id: &str) -> Result<TicketReservation, NetworkError> {
        request_json(
            self.transport.as_ref(),
            &Endpoint::Reservation { id: id.to_string() },
        )
        .await
    }

    /// Release a reservation before it expires.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn cancel_reservation(&self, id: &str) -> Result<(), NetworkError> {
        request_empty(
            self.transport.as_ref(),
            &Endpoint::CancelReservation { id: id.to_string() },
        )
        .await
    }
}

impl std::fmt::Debug for TicketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketService").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ticketing_sdk_testing::MockTransport;
    use ticketing_sdk_testing::fixtures::{mock_reservation, mock_tickets};

    fn service() -> (TicketService, MockTransport) {
        let transport = MockTransport::with_common_mock_data();
        (TicketService::new(Arc::new(transport.clone())), transport)
    }

    #[tokio::test]
    async fn lists_available_tickets() {
        let (service, _) = service();
        let tickets = service
            .available_tickets(&EventId::new("event-1"))
            .await
            .unwrap();
        assert_eq!(tickets, mock_tickets("event-1"));
    }

    #[tokio::test]
    async fn reserves_the_requested_tickets() {
        let (service, transport) = service();
        let ids = vec!["ticket-1".to_string(), "ticket-2".to_string()];
        let endpoint = Endpoint::ReserveTickets {
            event_id: EventId::new("event-1"),
            ticket_ids: ids.clone(),
        };
        transport.set_response(&endpoint, &mock_reservation("event-1"));

        let reservation = service
            .reserve_tickets(&ids, &EventId::new("event-1"))
            .await
            .unwrap();

        assert_eq!(reservation, mock_reservation("event-1"));
        assert_eq!(transport.last_request(&endpoint).unwrap().endpoint, endpoint);
    }

    #[tokio::test]
    async fn cancel_ignores_the_response_body() {
        let (service, transport) = service();
        let endpoint = Endpoint::CancelReservation {
            id: "reservation-1".to_string(),
        };
        transport.set_raw_response(&endpoint, "");

        service.cancel_reservation("reservation-1").await.unwrap();
        assert!(transport.was_requested(&endpoint));
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found() {
        let (service, _) = service();
        assert_eq!(
            service.ticket("missing").await,
            Err(NetworkError::NotFound)
        );
    }
}
