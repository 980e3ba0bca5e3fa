//! Ledger events
//!
//! Events are observability records appended to the ledger journal when an
//! operation commits. They are never read back by the state machine, so
//! dropping them does not change correctness. An operation that fails emits
//! nothing.

use crate::amount::Amount;
use crate::identifiers::{Address, FlightKey, InsuranceKey, OracleRequestKey};
use crate::status::FlightStatus;
use serde::{Deserialize, Serialize};

/// Committed ledger event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Operational flag toggled by the owner
    OperatingStatusChanged {
        /// New flag value
        operational: bool,
    },

    /// Address added to the authorized-caller registry
    CallerAuthorized {
        /// Newly authorized caller
        caller: Address,
    },

    /// Address removed from the authorized-caller registry
    CallerDeauthorized {
        /// Removed caller
        caller: Address,
    },

    /// Airline admitted to membership
    AirlineRegistered {
        /// Admitted airline
        airline: Address,
        /// Display name
        name: String,
        /// Registered airline count after admission
        registered_count: usize,
    },

    /// Admission vote reached the live threshold
    AchievedMultiPartyConsensus {
        /// Admitted candidate
        candidate: Address,
        /// Votes cast
        votes: usize,
        /// Registered airlines when the threshold was evaluated
        registered: usize,
    },

    /// Admission vote recorded without reaching the threshold
    NotYetAchievedMultiPartyConsensus {
        /// Pending candidate
        candidate: Address,
        /// Votes cast so far
        votes: usize,
        /// Registered airlines when the threshold was evaluated
        registered: usize,
    },

    /// Value entered the pooled balance
    FundsReceived {
        /// Contributor
        from: Address,
        /// Amount received
        amount: Amount,
        /// Pooled balance afterwards
        pool_balance: Amount,
    },

    /// Airline contributed its funding stake
    AirlineFunded {
        /// Funding airline
        airline: Address,
        /// Amount of this contribution
        amount: Amount,
        /// Cumulative contribution
        total_contributed: Amount,
    },

    /// Flight recorded (or overwritten)
    FlightRegistered {
        /// Derived key
        flight: FlightKey,
        /// Owning airline
        airline: Address,
        /// Flight name
        name: String,
        /// Departure timestamp
        timestamp: u64,
    },

    /// Flight status changed
    FlightStatusUpdated {
        /// Flight
        flight: FlightKey,
        /// New status
        status: FlightStatus,
    },

    /// Policy issued
    InsurancePurchased {
        /// Policy key
        insurance: InsuranceKey,
        /// Insured passenger
        passenger: Address,
        /// Insured flight
        flight: FlightKey,
        /// Premium paid
        amount: Amount,
    },

    /// Passenger credit increased by a policy payout
    PassengerCredited {
        /// Credited passenger
        passenger: Address,
        /// Policy being paid
        insurance: InsuranceKey,
        /// Payout added
        payout: Amount,
        /// Credit balance afterwards
        balance: Amount,
    },

    /// Passenger withdrew credit
    PassengerPayout {
        /// Withdrawing passenger
        passenger: Address,
        /// Amount transferred
        amount: Amount,
        /// Remaining credit
        remaining_credit: Amount,
    },

    /// Oracle joined the network
    OracleRegistered {
        /// Oracle address
        oracle: Address,
        /// Assigned indexes
        indexes: [u8; 3],
    },

    /// Status request opened for oracles holding `index`
    OracleRequest {
        /// Request key
        request: OracleRequestKey,
        /// Routed index
        index: u8,
        /// Flight airline
        airline: Address,
        /// Flight name
        flight: String,
        /// Departure timestamp
        timestamp: u64,
    },

    /// Single oracle response
    OracleReport {
        /// Request key
        request: OracleRequestKey,
        /// Responding oracle
        oracle: Address,
        /// Reported status
        status: FlightStatus,
    },

    /// Oracle quorum settled a flight status
    FlightStatusInfo {
        /// Request key
        request: OracleRequestKey,
        /// Flight
        flight: FlightKey,
        /// Agreed status
        status: FlightStatus,
    },
}

impl LedgerEvent {
    /// Event type name for log keys
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::OperatingStatusChanged { .. } => "operating_status_changed",
            LedgerEvent::CallerAuthorized { .. } => "caller_authorized",
            LedgerEvent::CallerDeauthorized { .. } => "caller_deauthorized",
            LedgerEvent::AirlineRegistered { .. } => "airline_registered",
            LedgerEvent::AchievedMultiPartyConsensus { .. } => "achieved_multi_party_consensus",
            LedgerEvent::NotYetAchievedMultiPartyConsensus { .. } => {
                "not_yet_achieved_multi_party_consensus"
            }
            LedgerEvent::FundsReceived { .. } => "funds_received",
            LedgerEvent::AirlineFunded { .. } => "airline_funded",
            LedgerEvent::FlightRegistered { .. } => "flight_registered",
            LedgerEvent::FlightStatusUpdated { .. } => "flight_status_updated",
            LedgerEvent::InsurancePurchased { .. } => "insurance_purchased",
            LedgerEvent::PassengerCredited { .. } => "passenger_credited",
            LedgerEvent::PassengerPayout { .. } => "passenger_payout",
            LedgerEvent::OracleRegistered { .. } => "oracle_registered",
            LedgerEvent::OracleRequest { .. } => "oracle_request",
            LedgerEvent::OracleReport { .. } => "oracle_report",
            LedgerEvent::FlightStatusInfo { .. } => "flight_status_info",
        }
    }
}
