//! # Flightsure Core
//!
//! Pure, effect-free types shared by the ledger state machine and its
//! tooling: identifiers and derived keys, amounts, flight status codes,
//! ledger events, configuration and the unified error type.
//!
//! Nothing in this crate holds mutable state; the ledger crate owns every
//! table and scalar.

pub mod amount;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod hash;
pub mod identifiers;
pub mod status;

pub use amount::{Amount, UNIT};
pub use config::{LedgerConfig, OracleConfig};
pub use context::CallContext;
pub use errors::{LedgerError, LedgerResult};
pub use events::LedgerEvent;
pub use identifiers::{Address, FlightKey, Hash32, InsuranceKey, OracleRequestKey};
pub use status::{FlightStatus, UnnamedCode};
