//! Canned domain data for tests.
//!
//! All timestamps are derived from [`base_time`] so fixtures compare equal
//! across runs.

#![allow(clippy::unwrap_used)] // Hardcoded fixture data always parses

use crate::MockTransport;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ticketing_sdk_core::endpoint::Endpoint;
use ticketing_sdk_core::types::{
    Event, EventId, EventStatus, Money, Order, OrderStatus, Ticket, TicketReservation, TicketType,
    Venue,
};
use ticketing_sdk_core::update::{EventUpdate, UpdateKind};

/// Reference instant for fixture timestamps (2025-01-01 00:00:00 UTC).
#[must_use]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// A small venue.
#[must_use]
pub fn mock_venue() -> Venue {
    Venue {
        id: "venue-1".to_string(),
        name: "Mock Venue".to_string(),
        address: "123 Test Street".to_string(),
        city: "Test City".to_string(),
        state: "TS".to_string(),
        capacity: 1000,
    }
}

/// General admission at 50.00.
#[must_use]
pub fn mock_ticket_type() -> TicketType {
    TicketType {
        id: "ticket-type-1".to_string(),
        name: "General Admission".to_string(),
        description: "Standard ticket".to_string(),
        price: Money::from_cents(5000),
        available_count: 100,
    }
}

/// An on-sale event one day after [`base_time`].
#[must_use]
pub fn mock_event(id: &str) -> Event {
    let date = base_time() + Duration::days(1);
    Event {
        id: EventId::new(id),
        name: format!("Mock Event {id}"),
        description: "A test event for mocking".to_string(),
        venue: mock_venue(),
        date,
        doors: date - Duration::hours(1),
        image_url: Some(format!("https://example.com/{id}.jpg")),
        ticket_types: vec![mock_ticket_type()],
        status: EventStatus::OnSale,
    }
}

/// Two events: `event-1` (on sale) and `event-2` (upcoming).
#[must_use]
pub fn mock_events() -> Vec<Event> {
    let mut upcoming = mock_event("event-2");
    upcoming.status = EventStatus::Upcoming;
    upcoming.date += Duration::days(1);
    upcoming.doors += Duration::days(1);
    vec![mock_event("event-1"), upcoming]
}

/// Two unseated tickets for `event_id`.
#[must_use]
pub fn mock_tickets(event_id: &str) -> Vec<Ticket> {
    (1..=2)
        .map(|n| Ticket {
            id: format!("ticket-{n}"),
            event_id: EventId::new(event_id),
            section: "General".to_string(),
            row: None,
            seat: None,
            price: Money::from_cents(5000),
            ticket_type: mock_ticket_type(),
            available: true,
        })
        .collect()
}

/// A fifteen-minute hold on [`mock_tickets`].
#[must_use]
pub fn mock_reservation(event_id: &str) -> TicketReservation {
    TicketReservation {
        reservation_id: "reservation-1".to_string(),
        tickets: mock_tickets(event_id),
        expires_at: base_time() + Duration::minutes(15),
        total: Money::from_cents(10_000),
    }
}

/// A confirmed order for [`mock_tickets`].
#[must_use]
pub fn mock_order(event_id: &str) -> Order {
    Order {
        id: "order-1".to_string(),
        tickets: mock_tickets(event_id),
        total: Money::from_cents(10_000),
        status: OrderStatus::Confirmed,
        purchase_date: base_time(),
        qr_code: "QR-order-1".to_string(),
    }
}

/// Tickets available (50), price changed (55.00), sold out; one minute apart.
#[must_use]
pub fn mock_updates(event_id: &str) -> Vec<EventUpdate> {
    let id = EventId::new(event_id);
    vec![
        EventUpdate::new(id.clone(), UpdateKind::TicketsAvailable { count: 50 }, base_time()),
        EventUpdate::new(
            id.clone(),
            UpdateKind::PriceChanged {
                new_price: Money::from_cents(5500),
            },
            base_time() + Duration::minutes(1),
        ),
        EventUpdate::new(id, UpdateKind::SoldOut, base_time() + Duration::minutes(2)),
    ]
}

impl MockTransport {
    /// A mock answering the common catalog calls.
    ///
    /// - `events` → [`mock_events`]
    /// - `event-{id}` → each event of [`mock_events`]
    /// - `searchEvents-test` → the first event
    /// - `availableTickets-{id}` → [`mock_tickets`]
    /// - update stream of `event-1` → [`mock_updates`]
    #[must_use]
    pub fn with_common_mock_data() -> Self {
        let transport = Self::new();
        let events = mock_events();

        transport.set_response(&Endpoint::Events, &events);
        for event in &events {
            transport.set_response(&Endpoint::Event { id: event.id.clone() }, event);
            transport.set_response(
                &Endpoint::AvailableTickets {
                    event_id: event.id.clone(),
                },
                &mock_tickets(event.id.as_str()),
            );
        }
        transport.set_response(
            &Endpoint::SearchEvents {
                query: "test".to_string(),
            },
            &events[..1],
        );
        transport.set_stream_updates("event-1", &mock_updates("event-1"));

        transport
    }
}
