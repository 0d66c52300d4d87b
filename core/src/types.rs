//! Domain types for the ticketing platform.
//!
//! Everything here is plain owned data that crosses the wire as JSON with
//! `snake_case` keys and ISO-8601 timestamps. The SDK never interprets these
//! values beyond [`Event::id`], which addresses the event cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier of an event.
///
/// Used as the cache key for event snapshots and as the subscription key for
/// real-time updates.
///
/// # Examples
///
/// ```
/// use ticketing_sdk_core::types::EventId;
///
/// let id = EventId::new("E1");
/// assert_eq!(id.as_str(), "E1");
/// assert_eq!(id.to_string(), "E1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new `EventId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors.
///
/// On the wire a price is a decimal number of currency units (`60.0`,
/// `49.99`). Deserialization rounds to the nearest cent and rejects negative
/// or non-finite values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from a decimal amount of currency units.
    ///
    /// Returns `None` for negative, non-finite or out-of-range amounts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn from_decimal(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents > u64::MAX as f64 {
            return None;
        }
        Some(Self(cents as u64))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount as a decimal number of currency units
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Self::from_decimal(amount)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid monetary amount: {amount}")))
    }
}

// ============================================================================
// Events
// ============================================================================

/// An event in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (cache key)
    pub id: EventId,
    /// Display name
    pub name: String,
    /// Long description
    pub description: String,
    /// Where the event takes place
    pub venue: Venue,
    /// When the event starts
    pub date: DateTime<Utc>,
    /// When the doors open
    pub doors: DateTime<Utc>,
    /// Promotional image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Ticket categories on offer
    pub ticket_types: Vec<TicketType>,
    /// Sales lifecycle status
    pub status: EventStatus,
}

/// Sales lifecycle of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventStatus {
    /// Announced, not yet on sale
    Upcoming,
    /// Tickets can be bought
    OnSale,
    /// No tickets left
    SoldOut,
    /// Called off
    Cancelled,
    /// Moved to a new date
    Rescheduled,
}

/// A venue hosting events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Unique identifier
    pub id: String,
    /// Venue name
    pub name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Maximum attendance
    pub capacity: u32,
}

/// A category of ticket offered for an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Unique identifier
    pub id: String,
    /// Display name (e.g. "General Admission")
    pub name: String,
    /// Description of what the ticket includes
    pub description: String,
    /// Unit price
    pub price: Money,
    /// Tickets of this type still available
    pub available_count: u32,
}

// ============================================================================
// Tickets and reservations
// ============================================================================

/// A single sellable ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier
    pub id: String,
    /// Event this ticket admits to
    pub event_id: EventId,
    /// Section name
    pub section: String,
    /// Row, if seated
    #[serde(default)]
    pub row: Option<String>,
    /// Seat, if seated
    #[serde(default)]
    pub seat: Option<String>,
    /// Price of this ticket
    pub price: Money,
    /// Ticket category
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    /// Whether the ticket can still be reserved
    pub available: bool,
}

/// A temporary hold on a set of tickets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReservation {
    /// Unique identifier
    pub reservation_id: String,
    /// Tickets being held
    pub tickets: Vec<Ticket>,
    /// When the hold lapses
    pub expires_at: DateTime<Utc>,
    /// Total price of the held tickets
    pub total: Money,
}

// ============================================================================
// Orders, payments and refunds
// ============================================================================

/// A completed purchase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier
    pub id: String,
    /// Purchased tickets
    pub tickets: Vec<Ticket>,
    /// Amount charged
    pub total: Money,
    /// Order lifecycle status
    pub status: OrderStatus,
    /// When the purchase happened
    pub purchase_date: DateTime<Utc>,
    /// Entry QR code payload
    pub qr_code: String,
}

/// Order lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment confirmation
    Pending,
    /// Paid
    Confirmed,
    /// Cancelled before fulfilment
    Cancelled,
    /// Money returned
    Refunded,
}

/// A tokenized payment instrument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Instrument kind
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    /// Opaque token issued by the payment provider
    pub token: String,
}

impl PaymentMethod {
    /// Create a new payment method
    #[must_use]
    pub fn new(payment_type: PaymentType, token: impl Into<String>) -> Self {
        Self {
            payment_type,
            token: token.into(),
        }
    }
}

/// Supported payment instrument kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentType {
    /// Credit or debit card
    CreditCard,
    /// Apple Pay
    ApplePay,
    /// Google Pay
    GooglePay,
    /// `PayPal`
    Paypal,
}

/// A refund request filed against an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Unique identifier
    pub id: String,
    /// Order being refunded
    pub order_id: String,
    /// Amount requested
    pub amount: Money,
    /// Customer-supplied reason
    pub reason: String,
    /// Processing status
    pub status: RefundStatus,
    /// When the refund was requested
    pub request_date: DateTime<Utc>,
}

/// Refund processing status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    /// Awaiting review
    Pending,
    /// Accepted, not yet paid out
    Approved,
    /// Paid out
    Processed,
    /// Rejected
    Denied,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn money_rounds_to_nearest_cent() {
        assert_eq!(Money::from_decimal(60.0), Some(Money::from_cents(6000)));
        assert_eq!(Money::from_decimal(49.99), Some(Money::from_cents(4999)));
        assert_eq!(Money::from_decimal(-1.0), None);
        assert_eq!(Money::from_decimal(f64::NAN), None);
    }

    #[test]
    fn money_displays_two_decimals() {
        assert_eq!(Money::from_cents(6000).to_string(), "60.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
    }

    #[test]
    fn money_wire_format_is_decimal() {
        let price: Money = serde_json::from_value(json!(55.5)).unwrap();
        assert_eq!(price.cents(), 5550);
        assert_eq!(serde_json::to_value(price).unwrap(), json!(55.5));
        assert!(serde_json::from_value::<Money>(json!(-3)).is_err());
    }

    #[test]
    fn event_decodes_from_snake_case_json() {
        let event: Event = serde_json::from_value(json!({
            "id": "E1",
            "name": "Jazz Night",
            "description": "Live jazz",
            "venue": {
                "id": "v1",
                "name": "Blue Room",
                "address": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "capacity": 300
            },
            "date": "2025-06-01T20:00:00Z",
            "doors": "2025-06-01T19:00:00Z",
            "ticket_types": [{
                "id": "ga",
                "name": "General Admission",
                "description": "Standing",
                "price": 45.0,
                "available_count": 120
            }],
            "status": "onSale"
        }))
        .unwrap();

        assert_eq!(event.id, EventId::new("E1"));
        assert_eq!(event.status, EventStatus::OnSale);
        assert_eq!(event.image_url, None);
        assert_eq!(event.ticket_types[0].price, Money::from_cents(4500));
    }

    #[test]
    fn ticket_type_field_is_renamed() {
        let ticket: Ticket = serde_json::from_value(json!({
            "id": "t1",
            "event_id": "E1",
            "section": "Floor",
            "price": 10.0,
            "type": {
                "id": "ga",
                "name": "GA",
                "description": "",
                "price": 10.0,
                "available_count": 1
            },
            "available": true
        }))
        .unwrap();

        assert_eq!(ticket.row, None);
        assert_eq!(ticket.ticket_type.id, "ga");
    }

    #[test]
    fn payment_type_uses_camel_case_values() {
        let method = PaymentMethod::new(PaymentType::ApplePay, "tok_123");
        assert_eq!(
            serde_json::to_value(&method).unwrap(),
            json!({ "type": "applePay", "token": "tok_123" })
        );
    }

    proptest! {
        /// Any whole-cent amount survives the decimal wire format unchanged.
        #[test]
        fn money_survives_wire_format(cents in 0u64..10_000_000_000_000) {
            let money = Money::from_cents(cents);
            let wire = serde_json::to_string(&money).unwrap();
            let decoded: Money = serde_json::from_str(&wire).unwrap();
            prop_assert_eq!(decoded, money);
        }

        /// Sums never wrap around silently.
        #[test]
        fn checked_add_matches_u64(a in any::<u64>(), b in any::<u64>()) {
            let sum = Money::from_cents(a).checked_add(Money::from_cents(b));
            prop_assert_eq!(sum.map(|m| m.cents()), a.checked_add(b));
        }
    }
}
