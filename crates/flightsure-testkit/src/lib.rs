//! Flightsure Testing Infrastructure
//!
//! Shared setup for ledger tests: deterministic addresses, a builder for
//! populated ledgers, payout sinks with scripted behaviour, assertion
//! macros and proptest strategies.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! flightsure-testkit = { path = "../flightsure-testkit" }
//! ```
//!
//! ```rust
//! use flightsure_testkit::*;
//!
//! let fixture = LedgerBuilder::new().with_airlines(3).with_flight("FS100", 1).build();
//! assert_eq!(fixture.ledger.registered_airline_count(), 3);
//! ```

pub mod assertions;
pub mod fixtures;
pub mod logging;
pub mod sinks;
pub mod strategies;

pub use fixtures::*;
pub use logging::init_test_tracing;
pub use sinks::*;
