//! Request descriptors for every call the SDK makes.
//!
//! An [`Endpoint`] is a transport-agnostic description of one
//! request/response exchange. Transports turn it into a concrete request;
//! mocks use [`Endpoint::cache_key`] to look up canned responses.

use crate::types::{EventId, PaymentMethod};
use serde::Serialize;
use serde_json::{Value, json};

/// HTTP method of an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// Body of a ticket purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PurchaseRequest {
    /// Reservation being converted into an order
    pub reservation_id: String,
    /// How to pay
    pub payment_method: PaymentMethod,
}

/// Every remote call of the SDK.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// List the event catalog
    Events,
    /// Fetch one event
    Event {
        /// Event to fetch
        id: EventId,
    },
    /// Full-text event search
    SearchEvents {
        /// Search terms
        query: String,
    },
    /// Tickets still on sale for an event
    AvailableTickets {
        /// Event whose tickets to list
        event_id: EventId,
    },
    /// Hold tickets for a limited time
    ReserveTickets {
        /// Event the tickets belong to
        event_id: EventId,
        /// Tickets to hold
        ticket_ids: Vec<String>,
    },
    /// Fetch one ticket
    Ticket {
        /// Ticket to fetch
        id: String,
    },
    /// Fetch a reservation
    Reservation {
        /// Reservation to fetch
        id: String,
    },
    /// Release a reservation
    CancelReservation {
        /// Reservation to release
        id: String,
    },
    /// Pay for a reservation
    PurchaseTickets(PurchaseRequest),
    /// Fetch an order
    Order {
        /// Order to fetch
        id: String,
    },
    /// All orders of a user
    UserOrders {
        /// Owner of the orders
        user_id: String,
    },
    /// Cancel an order
    CancelOrder {
        /// Order to cancel
        id: String,
    },
    /// File a refund request
    RequestRefund {
        /// Order to refund
        order_id: String,
        /// Customer-supplied reason
        reason: String,
    },
    /// Status of an order's refund
    RefundStatus {
        /// Order whose refund to check
        order_id: String,
    },
}

impl Endpoint {
    /// Path segments relative to the API base URL.
    ///
    /// Identifiers are returned as single segments, unescaped; transports
    /// must percent-encode each one so that `/`, `?` or `..` inside an id
    /// never changes the resource addressed.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        const API: [&str; 2] = ["api", "v1"];
        let tail: Vec<&str> = match self {
            Self::Events => vec!["events"],
            Self::Event { id } => vec!["events", id.as_str()],
            Self::SearchEvents { .. } => vec!["events", "search"],
            Self::AvailableTickets { event_id } => vec!["events", event_id.as_str(), "tickets"],
            Self::ReserveTickets { event_id, .. } => vec!["events", event_id.as_str(), "reserve"],
            Self::Ticket { id } => vec!["tickets", id.as_str()],
            Self::Reservation { id } => vec!["reservations", id.as_str()],
            Self::CancelReservation { id } => vec!["reservations", id.as_str(), "cancel"],
            Self::PurchaseTickets(_) => vec!["orders"],
            Self::Order { id } => vec!["orders", id.as_str()],
            Self::UserOrders { user_id } => vec!["users", user_id.as_str(), "orders"],
            Self::CancelOrder { id } => vec!["orders", id.as_str(), "cancel"],
            Self::RequestRefund { order_id, .. } => vec!["orders", order_id.as_str(), "refund"],
            Self::RefundStatus { order_id } => vec!["orders", order_id.as_str(), "refund", "status"],
        };
        API.into_iter().chain(tail).collect()
    }

    /// Path relative to the API base URL, for logs and diagnostics.
    ///
    /// Segments are joined verbatim; use [`segments`](Self::segments) to
    /// build request URLs.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        match self {
            Self::Events
            | Self::Event { .. }
            | Self::SearchEvents { .. }
            | Self::AvailableTickets { .. }
            | Self::Ticket { .. }
            | Self::Reservation { .. }
            | Self::Order { .. }
            | Self::UserOrders { .. }
            | Self::RefundStatus { .. } => HttpMethod::Get,
            Self::ReserveTickets { .. } | Self::PurchaseTickets(_) | Self::RequestRefund { .. } => {
                HttpMethod::Post
            }
            Self::CancelReservation { .. } | Self::CancelOrder { .. } => HttpMethod::Delete,
        }
    }

    /// Query string parameters.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::SearchEvents { query } => vec![("q", query.clone())],
            _ => Vec::new(),
        }
    }

    /// JSON request body, if the call carries one.
    #[must_use]
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::ReserveTickets { ticket_ids, .. } => Some(json!({ "ticket_ids": ticket_ids })),
            Self::PurchaseTickets(request) => serde_json::to_value(request).ok(),
            Self::RequestRefund { reason, .. } => Some(json!({ "reason": reason })),
            _ => None,
        }
    }

    /// Stable identity of the call, used to key canned responses and
    /// request history.
    ///
    /// # Examples
    ///
    /// ```
    /// use ticketing_sdk_core::endpoint::Endpoint;
    ///
    /// assert_eq!(Endpoint::Events.cache_key(), "events");
    /// assert_eq!(
    ///     Endpoint::SearchEvents { query: "jazz".into() }.cache_key(),
    ///     "searchEvents-jazz"
    /// );
    /// ```
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self {
            Self::Events => "events".to_string(),
            Self::Event { id } => format!("event-{id}"),
            Self::SearchEvents { query } => format!("searchEvents-{query}"),
            Self::AvailableTickets { event_id } => format!("availableTickets-{event_id}"),
            Self::ReserveTickets { event_id, ticket_ids } => {
                format!("reserveTickets-{event_id}-{}", ticket_ids.join(","))
            }
            Self::Ticket { id } => format!("ticket-{id}"),
            Self::Reservation { id } => format!("reservation-{id}"),
            Self::CancelReservation { id } => format!("cancelReservation-{id}"),
            Self::PurchaseTickets(request) => format!("purchaseTickets-{}", request.reservation_id),
            Self::Order { id } => format!("order-{id}"),
            Self::UserOrders { user_id } => format!("userOrders-{user_id}"),
            Self::CancelOrder { id } => format!("cancelOrder-{id}"),
            Self::RequestRefund { order_id, .. } => format!("requestRefund-{order_id}"),
            Self::RefundStatus { order_id } => format!("refundStatus-{order_id}"),
        }
    }
}
