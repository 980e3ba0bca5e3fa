//! Ledger snapshots
//!
//! A [`LedgerSnapshot`] is the complete committed state in plain tables,
//! serialized as JSON. The event journal is not part of a snapshot; a
//! restored ledger starts with an empty journal.

use flightsure_core::{Address, Amount, LedgerConfig, LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::access::AccessControl;
use crate::airlines::{Airline, AirlineRegistry, VoteRecord};
use crate::flights::{Flight, FlightRegistry};
use crate::insurance::{InsurancePolicy, InsurancePool, PassengerCredit};
use crate::journal::Journal;
use crate::ledger::{Ledger, LedgerState};
use crate::oracles::{Oracle, OracleDesk, OracleRequest};
use crate::settlement::SettlementLedger;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable ledger state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Format version
    pub version: u32,
    /// Owning principal
    pub owner: Address,
    /// Operational flag
    pub operational: bool,
    /// Authorized caller registry
    pub authorized_callers: Vec<Address>,
    /// Airline table
    pub airlines: Vec<Airline>,
    /// Pending admission votes
    pub votes: Vec<VoteRecord>,
    /// Flight table
    pub flights: Vec<Flight>,
    /// Policy table
    pub insurances: Vec<InsurancePolicy>,
    /// Passenger credit balances
    pub credits: Vec<PassengerCredit>,
    /// Pooled balance
    pub pooled_balance: Amount,
    /// Oracle registry
    pub oracles: Vec<Oracle>,
    /// Oracle requests
    pub oracle_requests: Vec<OracleRequest>,
    /// Collected oracle fees
    pub oracle_fee_balance: Amount,
    /// Position of the index RNG stream
    pub oracle_rng_word_pos: u128,
}

impl LedgerSnapshot {
    /// Encode as pretty JSON
    pub fn to_json(&self) -> LedgerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON
    pub fn from_json(input: &str) -> LedgerResult<Self> {
        let snapshot: Self = serde_json::from_str(input)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(LedgerError::serialization(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// Write to `path`
    pub fn save_to_file(&self, path: &Path) -> LedgerResult<()> {
        std::fs::write(path, self.to_json()?).map_err(|e| {
            LedgerError::serialization(format!("writing {}: {e}", path.display()))
        })
    }

    /// Read from `path`
    pub fn load_from_file(path: &Path) -> LedgerResult<Self> {
        let input = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::serialization(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_json(&input)
    }
}

impl Ledger {
    /// Capture the committed state
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = &self.state;
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            owner: state.access.owner(),
            operational: state.access.is_operational(),
            authorized_callers: state.access.authorized_callers().copied().collect(),
            airlines: state.airlines.airlines().cloned().collect(),
            votes: state.airlines.vote_records(),
            flights: state.flights.flights().cloned().collect(),
            insurances: state.insurance.policies().cloned().collect(),
            credits: state.insurance.credits().collect(),
            pooled_balance: state.settlement.balance(),
            oracles: state.oracles.oracles().cloned().collect(),
            oracle_requests: state.oracles.requests().cloned().collect(),
            oracle_fee_balance: state.oracles.fee_balance(),
            oracle_rng_word_pos: state.oracles.rng_word_pos(),
        }
    }

    /// Rebuild a ledger from a snapshot under `config`.
    ///
    /// The oracle RNG is reseeded from `config.oracle.seed`, so restoring
    /// with a different seed changes future index draws.
    pub fn restore(config: LedgerConfig, snapshot: LedgerSnapshot) -> LedgerResult<Self> {
        config.validate()?;
        if snapshot.owner.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        if !snapshot.airlines.iter().any(|a| a.is_registered) {
            return Err(LedgerError::serialization(
                "snapshot has no registered airline",
            ));
        }

        let state = LedgerState {
            access: AccessControl::from_parts(
                snapshot.owner,
                snapshot.operational,
                snapshot.authorized_callers,
            ),
            airlines: AirlineRegistry::from_parts(
                snapshot.airlines,
                snapshot.votes,
                config.consensus_threshold,
            ),
            flights: FlightRegistry::from_flights(snapshot.flights),
            insurance: InsurancePool::from_parts(snapshot.insurances, snapshot.credits),
            settlement: SettlementLedger::with_balance(snapshot.pooled_balance),
            oracles: OracleDesk::from_parts(
                config.oracle.seed,
                snapshot.oracle_rng_word_pos,
                snapshot.oracles,
                snapshot.oracle_requests,
                snapshot.oracle_fee_balance,
            ),
        };
        tracing::info!(
            owner = %snapshot.owner,
            airlines = state.airlines.registered_count(),
            pool = %state.settlement.balance(),
            "ledger restored from snapshot"
        );
        Ok(Self {
            config,
            state,
            journal: Journal::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_mismatch_rejected() {
        let ledger = Ledger::genesis(
            LedgerConfig::default(),
            Address::derived(b"owner"),
            Address::derived(b"air"),
            "Air",
        )
        .unwrap();
        let mut snapshot = ledger.snapshot();
        snapshot.version = 99;
        let json = snapshot.to_json().unwrap();
        assert!(matches!(
            LedgerSnapshot::from_json(&json),
            Err(LedgerError::Serialization { .. })
        ));
    }

    #[test]
    fn empty_membership_rejected() {
        let ledger = Ledger::genesis(
            LedgerConfig::default(),
            Address::derived(b"owner"),
            Address::derived(b"air"),
            "Air",
        )
        .unwrap();
        let mut snapshot = ledger.snapshot();
        snapshot.airlines.clear();
        assert!(Ledger::restore(LedgerConfig::default(), snapshot).is_err());
    }
}
