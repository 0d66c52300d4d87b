//! Real-time event updates.
//!
//! The transport yields [`RawUpdateRecord`]s exactly as they arrive on the
//! wire:
//!
//! ```json
//! { "event_id": "E9", "type": "price_changed", "timestamp": "2025-01-01T00:00:00Z", "data": 60.0 }
//! ```
//!
//! [`EventUpdate::try_from`] turns a record into a typed update. The payload
//! shape depends on the kind:
//!
//! | kind                | payload               |
//! |---------------------|-----------------------|
//! | `tickets_available` | integer count         |
//! | `sold_out`          | ignored               |
//! | `price_changed`     | decimal price         |
//! | `rescheduled`       | ISO-8601 date string  |
//! | `cancelled`         | ignored               |

use crate::error::{NetworkError, UpdateDecodeError};
use crate::types::{EventId, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire name of [`UpdateKind::TicketsAvailable`].
pub const TICKETS_AVAILABLE: &str = "tickets_available";
/// Wire name of [`UpdateKind::SoldOut`].
pub const SOLD_OUT: &str = "sold_out";
/// Wire name of [`UpdateKind::PriceChanged`].
pub const PRICE_CHANGED: &str = "price_changed";
/// Wire name of [`UpdateKind::Rescheduled`].
pub const RESCHEDULED: &str = "rescheduled";
/// Wire name of [`UpdateKind::Cancelled`].
pub const CANCELLED: &str = "cancelled";

/// An update record as produced by the transport, before interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawUpdateRecord {
    /// Event the update refers to
    pub event_id: EventId,
    /// Update kind (`tickets_available`, `sold_out`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// When the update happened
    pub timestamp: DateTime<Utc>,
    /// Kind-dependent payload
    #[serde(default, rename = "data", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl RawUpdateRecord {
    /// Parse a single wire frame.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DecodingFailed`] if the frame is not a JSON
    /// update record.
    pub fn from_json(frame: &[u8]) -> Result<Self, NetworkError> {
        serde_json::from_slice(frame).map_err(NetworkError::decoding)
    }
}

/// What changed about an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    /// A number of tickets became available
    TicketsAvailable {
        /// How many tickets are available now
        count: u32,
    },
    /// The last ticket was sold
    SoldOut,
    /// The ticket price changed
    PriceChanged {
        /// Price after the change
        new_price: Money,
    },
    /// The event moved to a new date
    Rescheduled {
        /// New start date
        new_date: DateTime<Utc>,
    },
    /// The event was called off
    Cancelled,
}

impl UpdateKind {
    /// Wire name of the kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TicketsAvailable { .. } => TICKETS_AVAILABLE,
            Self::SoldOut => SOLD_OUT,
            Self::PriceChanged { .. } => PRICE_CHANGED,
            Self::Rescheduled { .. } => RESCHEDULED,
            Self::Cancelled => CANCELLED,
        }
    }
}

/// A typed, immutable change notification for one event.
///
/// Updates are always delivered live and never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventUpdate {
    /// Event the update refers to
    pub event_id: EventId,
    /// What changed
    pub kind: UpdateKind,
    /// When it changed
    pub timestamp: DateTime<Utc>,
}

impl EventUpdate {
    /// Create a new update
    #[must_use]
    pub const fn new(event_id: EventId, kind: UpdateKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_id,
            kind,
            timestamp,
        }
    }
}

impl TryFrom<RawUpdateRecord> for EventUpdate {
    type Error = UpdateDecodeError;

    fn try_from(record: RawUpdateRecord) -> Result<Self, Self::Error> {
        let payload = record.payload.as_ref();
        let kind = match record.kind.as_str() {
            TICKETS_AVAILABLE => {
                let count = payload
                    .and_then(Value::as_u64)
                    .and_then(|count| u32::try_from(count).ok())
                    .ok_or_else(|| invalid(TICKETS_AVAILABLE, payload, "expected a ticket count"))?;
                UpdateKind::TicketsAvailable { count }
            }
            SOLD_OUT => UpdateKind::SoldOut,
            PRICE_CHANGED => {
                let new_price = payload
                    .and_then(Value::as_f64)
                    .and_then(Money::from_decimal)
                    .ok_or_else(|| invalid(PRICE_CHANGED, payload, "expected a price"))?;
                UpdateKind::PriceChanged { new_price }
            }
            RESCHEDULED => {
                let new_date = payload
                    .and_then(Value::as_str)
                    .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
                    .map(|date| date.with_timezone(&Utc))
                    .ok_or_else(|| invalid(RESCHEDULED, payload, "expected an ISO-8601 date"))?;
                UpdateKind::Rescheduled { new_date }
            }
            CANCELLED => UpdateKind::Cancelled,
            other => return Err(UpdateDecodeError::UnknownKind(other.to_string())),
        };

        Ok(Self {
            event_id: record.event_id,
            kind,
            timestamp: record.timestamp,
        })
    }
}

impl From<&EventUpdate> for RawUpdateRecord {
    fn from(update: &EventUpdate) -> Self {
        let payload = match &update.kind {
            UpdateKind::TicketsAvailable { count } => Some(Value::from(*count)),
            UpdateKind::PriceChanged { new_price } => Some(Value::from(new_price.as_decimal())),
            UpdateKind::Rescheduled { new_date } => Some(Value::from(new_date.to_rfc3339())),
            UpdateKind::SoldOut | UpdateKind::Cancelled => None,
        };
        Self {
            event_id: update.event_id.clone(),
            kind: update.kind.as_str().to_string(),
            timestamp: update.timestamp,
            payload,
        }
    }
}

fn invalid(kind: &'static str, payload: Option<&Value>, expected: &str) -> UpdateDecodeError {
    let reason = match payload {
        Some(value) => format!("{expected}, got {value}"),
        None => format!("{expected}, got nothing"),
    };
    UpdateDecodeError::InvalidPayload { kind, reason }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(kind: &str, payload: Option<Value>) -> RawUpdateRecord {
        RawUpdateRecord {
            event_id: EventId::new("E9"),
            kind: kind.to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            payload,
        }
    }

    #[test]
    fn decodes_every_known_kind() {
        let cases = [
            (record("tickets_available", Some(json!(50))), UpdateKind::TicketsAvailable { count: 50 }),
            (record("sold_out", None), UpdateKind::SoldOut),
            (
                record("price_changed", Some(json!(60.0))),
                UpdateKind::PriceChanged { new_price: Money::from_cents(6000) },
            ),
            (
                record("rescheduled", Some(json!("2025-03-01T20:00:00+01:00"))),
                UpdateKind::Rescheduled {
                    new_date: Utc.with_ymd_and_hms(2025, 3, 1, 19, 0, 0).unwrap(),
                },
            ),
            (record("cancelled", Some(json!({"ignored": true}))), UpdateKind::Cancelled),
        ];

        for (raw, expected) in cases {
            let update = EventUpdate::try_from(raw).unwrap();
            assert_eq!(update.kind, expected);
            assert_eq!(update.event_id.as_str(), "E9");
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert_eq!(
            EventUpdate::try_from(record("teleported", None)),
            Err(UpdateDecodeError::UnknownKind("teleported".to_string()))
        );
    }

    #[test]
    fn rejects_payload_of_wrong_shape() {
        assert!(EventUpdate::try_from(record("tickets_available", None)).is_err());
        assert!(EventUpdate::try_from(record("tickets_available", Some(json!("many")))).is_err());
        assert!(EventUpdate::try_from(record("tickets_available", Some(json!(-1)))).is_err());
        assert!(EventUpdate::try_from(record("price_changed", Some(json!("cheap")))).is_err());
        assert!(EventUpdate::try_from(record("rescheduled", Some(json!("next tuesday")))).is_err());
    }

    #[test]
    fn parses_wire_frame() {
        let frame = br#"{"event_id":"E9","type":"sold_out","timestamp":"2025-01-01T00:00:00Z"}"#;
        let raw = RawUpdateRecord::from_json(frame).unwrap();
        assert_eq!(raw.kind, "sold_out");
        assert_eq!(raw.payload, None);

        assert!(matches!(
            RawUpdateRecord::from_json(b"not json"),
            Err(NetworkError::DecodingFailed(_))
        ));
    }

    #[test]
    fn record_conversion_is_lossless_for_typed_updates() {
        let update = EventUpdate::try_from(record("price_changed", Some(json!(12.5)))).unwrap();
        let raw = RawUpdateRecord::from(&update);
        assert_eq!(raw.payload, Some(json!(12.5)));
        assert_eq!(EventUpdate::try_from(raw).unwrap(), update);
    }

    proptest! {
        /// Availability updates decode back to the same count after a trip
        /// through a wire frame.
        #[test]
        fn availability_survives_wire_frame(count in any::<u32>(), id in "[A-Za-z0-9-]{1,12}") {
            let update = EventUpdate::new(
                EventId::new(id),
                UpdateKind::TicketsAvailable { count },
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            );
            let frame = serde_json::to_vec(&RawUpdateRecord::from(&update)).unwrap();
            let raw = RawUpdateRecord::from_json(&frame).unwrap();
            prop_assert_eq!(EventUpdate::try_from(raw).unwrap(), update);
        }
    }
}
