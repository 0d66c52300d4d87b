//! Purchases, orders and refunds.

use std::sync::Arc;
use ticketing_sdk_core::endpoint::{Endpoint, PurchaseRequest};
use ticketing_sdk_core::error::NetworkError;
use ticketing_sdk_core::transport::{Transport, request_json};
use ticketing_sdk_core::types::{Order, PaymentMethod, RefundRequest, RefundStatus, TicketReservation};

/// Uncached access to orders and refunds.
#[derive(Clone)]
pub struct OrderService {
    transport: Arc<dyn Transport>,
}

impl OrderService {
    /// Create a service calling `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Pay for a reservation.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    #[tracing::instrument(
        skip(self, reservation, payment_method),
        fields(reservation_id = %reservation.reservation_id, total = %reservation.total)
    )]
    pub async fn purchase_tickets(
        &self,
        reservation: &TicketReservation,
        payment_method: PaymentMethod,
    ) -> Result<Order, NetworkError> {
        let endpoint = Endpoint::PurchaseTickets(PurchaseRequest {
            reservation_id: reservation.reservation_id.clone(),
            payment_method,
        });
        let order: Order = request_json(self.transport.as_ref(), &endpoint).await?;
        tracing::info!(order_id = %order.id, status = ?order.status, "Tickets purchased");
        Ok(order)
    }

    /// One order.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn order(&self, id: &str) -> Result<Order, NetworkError> {
        request_json(self.transport.as_ref(), &Endpoint::Order { id: id.to_string() }).await
    }

    /// Every order placed by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn user_orders(&self, user_id: &str) -> Result<Vec<Order>, NetworkError> {
        request_json(
            self.transport.as_ref(),
            &Endpoint::UserOrders {
                user_id: user_id.to_string(),
            },
        )
        .await
    }

    /// Cancel an order, returning it in its cancelled state.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn cancel_order(&self, id: &str) -> Result<Order, NetworkError> {
        request_json(
            self.transport.as_ref(),
            &Endpoint::CancelOrder { id: id.to_string() },
        )
        .await
    }

    /// File a refund request for `order_id`.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    #[tracing::instrument(skip(self, reason))]
    pub async fn request_refund(&self, order_id: &str, reason: &str) -> Result<RefundRequest, NetworkError> {
        request_json(
            self.transport.as_ref(),
            &Endpoint::RequestRefund {
                order_id: order_id.to_string(),
                reason: reason.to_string(),
            },
        )
        .await
    }

    /// Processing status of the refund filed for `order_id`.
    ///
    /// # Errors
    ///
    /// Returns the transport's [`NetworkError`] unchanged.
    pub async fn refund_status(&self, order_id: &str) -> Result<RefundStatus, NetworkError> {
        request_json(
            self.transport.as_ref(),
            &Endpoint::RefundStatus {
                order_id: order_id.to_string(),
            },
        )
        .await
    }
}

impl std::fmt::Debug for OrderService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderService").finish_non_exhaustive()
    }
}
