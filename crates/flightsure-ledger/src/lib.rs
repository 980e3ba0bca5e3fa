//! # Flightsure Ledger
//!
//! Permissioned airline membership and flight-delay insurance ledger.
//!
//! ## Components
//!
//! - [`access`]: owner, operational flag and authorized caller registry
//! - [`airlines`]: membership with threshold-consensus admission and funding
//! - [`flights`]: flight table keyed by `(airline, name, timestamp)`
//! - [`insurance`]: policies and passenger credit
//! - [`settlement`]: pooled balance and payout transfers
//! - [`oracles`]: oracle registration and quorum status reports
//!
//! Components never call each other. The [`Ledger`] facade hands each one
//! the access registry and configuration it needs and runs every mutation as
//! an all-or-nothing transaction.
//!
//! ## Example
//!
//! ```
//! use flightsure_core::{Address, Amount, CallContext, LedgerConfig, UNIT};
//! use flightsure_ledger::{DiscardSink, Ledger};
//!
//! let owner = Address::derived(b"owner");
//! let airline = Address::derived(b"airline");
//! let passenger = Address::derived(b"passenger");
//!
//! let mut ledger = Ledger::genesis(LedgerConfig::default(), owner, airline, "Genesis Air")?;
//! ledger.fund(airline, Amount::units(10))?;
//! ledger.register_flight(airline, "FS100", 1_700_000_000)?;
//! ledger.buy(
//!     CallContext::relayed(owner, passenger),
//!     passenger,
//!     airline,
//!     "FS100",
//!     1_700_000_000,
//!     Amount(UNIT / 10),
//! )?;
//! ledger.credit_insurees(airline, "FS100", 1_700_000_000)?;
//! assert_eq!(ledger.credit_of(&passenger), Amount(UNIT / 10 * 3 / 2));
//!
//! let payout = ledger.pay(passenger, Amount(UNIT / 10), &mut DiscardSink)?;
//! assert_eq!(payout.remaining_credit, Amount(UNIT / 20));
//! # Ok::<(), flightsure_core::LedgerError>(())
//! ```

pub mod access;
pub mod airlines;
pub mod flights;
pub mod insurance;
pub mod journal;
pub mod ledger;
pub mod oracles;
pub mod persistence;
pub mod settlement;
pub mod shared;

pub use access::AccessControl;
pub use airlines::{required_votes, Admission, Airline, AirlineRegistry, VoteRecord};
pub use flights::{Flight, FlightRegistry};
pub use insurance::{InsurancePolicy, InsurancePool, PassengerCredit};
pub use journal::Journal;
pub use ledger::Ledger;
pub use oracles::{Oracle, OracleDesk, OracleRequest, OracleResponse, ResponseOutcome};
pub use persistence::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use settlement::{DiscardSink, Payout, PayoutSink, SettlementLedger};
pub use shared::SharedLedger;
