//! # Event Ticketing SDK Core
//!
//! Domain types and the transport contract shared by every crate of the
//! event ticketing SDK.
//!
//! This crate performs no I/O. It provides:
//!
//! - **Domain model**: events, venues, tickets, reservations, orders, refunds
//! - **Errors**: [`NetworkError`], the single error surface of the SDK
//! - **Endpoints**: transport-agnostic descriptors of every remote call
//! - **Transport**: the [`Transport`] trait that production and mock
//!   transports implement
//! - **Updates**: raw update records and their typed [`EventUpdate`] form
//! - **Environment**: the [`Clock`](environment::Clock) abstraction used for
//!   cache expiry
//!
//! ## Example
//!
//! ```
//! use ticketing_sdk_core::update::{EventUpdate, RawUpdateRecord, UpdateKind};
//!
//! let frame = br#"{"event_id":"E9","type":"tickets_available","timestamp":"2025-01-01T00:00:00Z","data":50}"#;
//! let record = RawUpdateRecord::from_json(frame)?;
//! let update = EventUpdate::try_from(record)?;
//! assert_eq!(update.kind, UpdateKind::TicketsAvailable { count: 50 });
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod endpoint;
pub mod error;
pub mod transport;
pub mod types;
pub mod update;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use endpoint::{Endpoint, HttpMethod};
pub use error::{NetworkError, UpdateDecodeError};
pub use transport::{RawUpdateStream, Transport};
pub use types::{Event, EventId, Money};
pub use update::{EventUpdate, RawUpdateRecord, UpdateKind};

/// Environment module - injected dependencies
///
/// External dependencies the SDK needs beyond the transport are abstracted
/// behind traits and injected at construction time.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use ticketing_sdk_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
