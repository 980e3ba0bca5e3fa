//! Oracle network for flight status reports
//!
//! Oracles register for a fee and receive three distinct indexes. A status
//! request is routed to one index; only oracles holding that index may
//! answer. Once `min_responses` oracles agree on a status the request
//! closes and the status is settled.
//!
//! ```text
//! fetch_flight_status ──► request(index, flight) open
//!        submit_oracle_response × min_responses (same status)
//!                          ──► closed, FlightStatusInfo
//! ```

use flightsure_core::{
    Address, Amount, FlightKey, FlightStatus, LedgerConfig, LedgerError, LedgerEvent,
    LedgerResult, OracleRequestKey,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::access::AccessControl;
use crate::flights::Flight;
use crate::journal::Journal;

/// Registered oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oracle {
    /// Oracle address
    pub address: Address,
    /// Assigned request indexes
    pub indexes: [u8; 3],
}

impl Oracle {
    /// Whether this oracle may answer requests routed to `index`
    pub fn holds(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// One oracle's answer to a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleResponse {
    /// Responding oracle
    pub oracle: Address,
    /// Reported status
    pub status: FlightStatus,
}

/// Status request awaiting oracle responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Derived key
    pub key: OracleRequestKey,
    /// Routed index
    pub index: u8,
    /// Flight being queried
    pub flight: FlightKey,
    /// Who asked
    pub requester: Address,
    /// Accepting responses
    pub is_open: bool,
    /// Responses in arrival order
    pub responses: Vec<OracleResponse>,
}

impl OracleRequest {
    /// Responses reporting `status`
    pub fn count_for(&self, status: FlightStatus) -> usize {
        self.responses
            .iter()
            .filter(|response| response.status == status)
            .count()
    }

    fn has_responded(&self, oracle: &Address) -> bool {
        self.responses
            .iter()
            .any(|response| response.oracle == *oracle)
    }
}

/// Result of a successful oracle response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOutcome {
    /// Response counted; quorum not yet reached
    Recorded {
        /// Responses agreeing with this one so far
        matching: usize,
    },
    /// Quorum reached; request closed
    Settled {
        /// Agreed status
        status: FlightStatus,
        /// Total credited to passengers as a result
        credited: Amount,
    },
}

/// Oracle registry, open requests, fee balance and index RNG
#[derive(Debug, Clone)]
pub struct OracleDesk {
    oracles: BTreeMap<Address, Oracle>,
    requests: BTreeMap<OracleRequestKey, OracleRequest>,
    fee_balance: Amount,
    rng: ChaCha20Rng,
}

impl OracleDesk {
    /// Empty desk whose index draws are seeded by `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            oracles: BTreeMap::new(),
            requests: BTreeMap::new(),
            fee_balance: Amount::ZERO,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub(crate) fn from_parts(
        seed: u64,
        word_pos: u128,
        oracles: Vec<Oracle>,
        requests: Vec<OracleRequest>,
        fee_balance: Amount,
    ) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rng.set_word_pos(word_pos);
        Self {
            oracles: oracles.into_iter().map(|o| (o.address, o)).collect(),
            requests: requests.into_iter().map(|r| (r.key, r)).collect(),
            fee_balance,
            rng,
        }
    }

    pub(crate) fn rng_word_pos(&self) -> u128 {
        self.rng.get_word_pos()
    }

    /// Look up an oracle
    pub fn get(&self, oracle: &Address) -> Option<&Oracle> {
        self.oracles.get(oracle)
    }

    /// All oracles in address order
    pub fn oracles(&self) -> impl Iterator<Item = &Oracle> {
        self.oracles.values()
    }

    /// Look up a request
    pub fn request(&self, key: &OracleRequestKey) -> Option<&OracleRequest> {
        self.requests.get(key)
    }

    /// All requests in key order
    pub fn requests(&self) -> impl Iterator<Item = &OracleRequest> {
        self.requests.values()
    }

    /// Collected registration fees
    pub fn fee_balance(&self) -> Amount {
        self.fee_balance
    }

    /// Indexes assigned to a registered oracle
    pub fn indexes_of(&self, oracle: &Address) -> LedgerResult<[u8; 3]> {
        self.oracles
            .get(oracle)
            .map(|o| o.indexes)
            .ok_or(LedgerError::NotRegistered { address: *oracle })
    }

    /// Register an oracle and assign its indexes
    pub fn register(
        &mut self,
        access: &AccessControl,
        config: &LedgerConfig,
        oracle: Address,
        fee: Amount,
        journal: &mut Journal,
    ) -> LedgerResult<[u8; 3]> {
        access.require_operational()?;
        if oracle.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        if fee < config.oracle.registration_fee {
            return Err(LedgerError::InsufficientFunds {
                required: config.oracle.registration_fee,
                provided: fee,
            });
        }
        if self.oracles.contains_key(&oracle) {
            return Err(LedgerError::AlreadyRegistered { address: oracle });
        }

        let indexes = self.draw_indexes(config.oracle.index_space);
        self.fee_balance = self.fee_balance.checked_add(fee)?;
        self.oracles.insert(oracle, Oracle { address: oracle, indexes });

        tracing::info!(%oracle, ?indexes, "oracle registered");
        journal.record(LedgerEvent::OracleRegistered { oracle, indexes });
        Ok(indexes)
    }

    fn draw_indexes(&mut self, space: u8) -> [u8; 3] {
        let first = self.rng.gen_range(0..space);
        let mut second = self.rng.gen_range(0..space);
        while second == first {
            second = self.rng.gen_range(0..space);
        }
        let mut third = self.rng.gen_range(0..space);
        while third == first || third == second {
            third = self.rng.gen_range(0..space);
        }
        [first, second, third]
    }

    /// Open a status request for `flight`. Reopening a request clears its
    /// earlier responses.
    pub fn open_request(
        &mut self,
        access: &AccessControl,
        config: &LedgerConfig,
        requester: Address,
        flight: &Flight,
        journal: &mut Journal,
    ) -> LedgerResult<u8> {
        access.require_operational()?;
        let index = self.rng.gen_range(0..config.oracle.index_space);
        let key = OracleRequestKey::derive(index, &flight.key);
        self.requests.insert(
            key,
            OracleRequest {
                key,
                index,
                flight: flight.key,
                requester,
                is_open: true,
                responses: Vec::new(),
            },
        );

        tracing::debug!(request = %key, index, flight = %flight.key, "oracle request opened");
        journal.record(LedgerEvent::OracleRequest {
            request: key,
            index,
            airline: flight.airline,
            flight: flight.name.clone(),
            timestamp: flight.timestamp,
        });
        Ok(index)
    }

    /// Record a response. Returns the settled status once quorum is reached.
    pub fn record_response(
        &mut self,
        access: &AccessControl,
        config: &LedgerConfig,
        oracle: Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
        journal: &mut Journal,
    ) -> LedgerResult<(usize, Option<FlightStatus>)> {
        access.require_operational()?;
        let registered = self
            .oracles
            .get(&oracle)
            .ok_or(LedgerError::NotRegistered { address: oracle })?;
        if !registered.holds(index) {
            return Err(LedgerError::OracleIndexMismatch { oracle, index });
        }

        let key = OracleRequestKey::derive(index, flight);
        let request = match self.requests.get_mut(&key) {
            Some(request) if request.is_open => request,
            _ => return Err(LedgerError::RequestClosed { request: key }),
        };
        if request.has_responded(&oracle) {
            return Err(LedgerError::DuplicateVote { voter: oracle });
        }

        request.responses.push(OracleResponse { oracle, status });
        journal.record(LedgerEvent::OracleReport {
            request: key,
            oracle,
            status,
        });

        let matching = request.count_for(status);
        if matching < config.oracle.min_responses {
            return Ok((matching, None));
        }

        request.is_open = false;
        tracing::info!(request = %key, %status, matching, "oracle quorum reached");
        journal.record(LedgerEvent::FlightStatusInfo {
            request: key,
            flight: *flight,
            status,
        });
        Ok((matching, Some(status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_are_distinct_and_in_range() {
        let mut desk = OracleDesk::new(7);
        for space in [3u8, 4, 10] {
            for _ in 0..50 {
                let [a, b, c] = desk.draw_indexes(space);
                assert!(a != b && b != c && a != c);
                assert!(a < space && b < space && c < space);
            }
        }
    }

    #[test]
    fn same_seed_draws_same_indexes() {
        let mut a = OracleDesk::new(42);
        let mut b = OracleDesk::new(42);
        assert_eq!(a.draw_indexes(10), b.draw_indexes(10));
    }

    #[test]
    fn restored_rng_continues_the_sequence() {
        let mut desk = OracleDesk::new(9);
        desk.draw_indexes(10);
        let mut restored =
            OracleDesk::from_parts(9, desk.rng_word_pos(), vec![], vec![], Amount::ZERO);
        assert_eq!(desk.draw_indexes(10), restored.draw_indexes(10));
    }
}
