//! # Event Ticketing SDK Testing
//!
//! Testing utilities for the event ticketing SDK.
//!
//! This crate provides:
//! - [`MockTransport`]: canned responses and update streams with request
//!   history and stream lifecycle counters
//! - [`FixedClock`] and [`ManualClock`]: deterministic time for cache expiry
//! - [`fixtures`]: canned events, tickets, orders and updates
//!
//! ## Example
//!
//! ```
//! use ticketing_sdk_core::endpoint::Endpoint;
//! use ticketing_sdk_core::environment::Clock;
//! use ticketing_sdk_core::transport::request_json;
//! use ticketing_sdk_core::types::Event;
//! use ticketing_sdk_testing::fixtures::mock_events;
//! use ticketing_sdk_testing::{ManualClock, MockTransport, test_clock};
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::with_common_mock_data();
//! let events: Vec<Event> = request_json(&transport, &Endpoint::Events).await.unwrap();
//! assert_eq!(events, mock_events());
//! assert_eq!(transport.request_count(&Endpoint::Events), 1);
//!
//! let clock = ManualClock::starting_at(test_clock().time());
//! clock.advance(chrono::Duration::seconds(301));
//! assert_eq!(clock.now() - test_clock().time(), chrono::Duration::seconds(301));
//! # });
//! ```

use chrono::{DateTime, Utc};
use ticketing_sdk_core::environment::Clock;

pub mod fixtures;
pub mod transport_mock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketing_sdk_testing::mocks::FixedClock;
    /// use ticketing_sdk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// The time this clock reports
        #[must_use]
        pub const fn time(&self) -> DateTime<Utc> {
            self.time
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when a test advances it.
    ///
    /// Clones share the same time, so a test can keep one handle and give
    /// another to the code under test.
    ///
    /// # Example
    ///
    /// ```
    /// use ticketing_sdk_testing::ManualClock;
    /// use ticketing_sdk_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let clock = ManualClock::starting_at(start);
    /// clock.advance(Duration::seconds(400));
    /// assert_eq!(clock.now(), start + Duration::seconds(400));
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock reading `time`
        #[must_use]
        pub fn starting_at(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward (or backward, for a negative delta)
        pub fn advance(&self, delta: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += delta;
        }

        /// Jump to an absolute time
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = time;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(crate::fixtures::base_time())
    }
}

/// Install a `tracing` subscriber that writes to the test output.
///
/// Safe to call from every test; only the first call installs anything.
/// Honors `RUST_LOG`, defaulting to `debug` for the SDK crates.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ticketing_sdk=debug,ticketing_sdk_transport=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};
pub use transport_mock::{MockRequest, MockTransport};
