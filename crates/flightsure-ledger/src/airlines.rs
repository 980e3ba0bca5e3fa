//! Airline membership and threshold-consensus admission
//!
//! The registry owns the airline table and the pending vote sets. The only
//! way membership changes is [`AirlineRegistry::propose_or_vote`], which
//! enforces vote deduplication and the live admission threshold in one
//! place.
//!
//! # Admission rule
//!
//! ```text
//! n = registered airlines
//! n <  threshold  →  admitted on the first supporting call
//! n >= threshold  →  each call is a vote; admitted once votes >= n - votes
//! ```
//!
//! `n` is read fresh on every call, so a candidate's fate depends on the
//! membership at the time of the deciding vote, not when voting began.

use flightsure_core::{
    Address, Amount, CallContext, LedgerError, LedgerEvent, LedgerResult,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::access::AccessControl;
use crate::journal::Journal;
use crate::settlement::SettlementLedger;

/// Airline membership record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    /// Airline address
    pub address: Address,
    /// Display name
    pub name: String,
    /// Cumulative contribution to the pooled balance
    pub funds_contributed: Amount,
    /// Admitted to membership
    pub is_registered: bool,
    /// Contributed at least the minimum funding fee
    pub is_funded: bool,
}

impl Airline {
    fn admitted(address: Address, name: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            funds_contributed: Amount::ZERO,
            is_registered: true,
            is_funded: false,
        }
    }
}

/// Pending votes for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    /// Candidate airline
    pub candidate: Address,
    /// Airlines that voted for the candidate
    pub voters: Vec<Address>,
}

/// Result of a successful `register_airline` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    /// Candidate is now a registered airline
    Admitted,
    /// Vote recorded; candidate still pending
    VoteRecorded {
        /// Votes cast so far
        votes: usize,
        /// Votes that would admit at the current membership size
        required: usize,
    },
}

impl Admission {
    /// Whether the call admitted the candidate
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Votes needed to admit when `registered` airlines exist: the smallest `v`
/// with `v >= registered - v`.
pub fn required_votes(registered: usize) -> usize {
    registered.div_ceil(2)
}

/// Airline table plus pending vote sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirlineRegistry {
    airlines: BTreeMap<Address, Airline>,
    votes: BTreeMap<Address, BTreeSet<Address>>,
    registered: usize,
    threshold: usize,
}

impl AirlineRegistry {
    /// Registry containing only the genesis airline, registered and unfunded
    pub fn genesis(airline: Address, name: impl Into<String>, threshold: usize) -> Self {
        let mut airlines = BTreeMap::new();
        airlines.insert(airline, Airline::admitted(airline, name));
        Self {
            airlines,
            votes: BTreeMap::new(),
            registered: 1,
            threshold,
        }
    }

    pub(crate) fn from_parts(
        airlines: Vec<Airline>,
        votes: Vec<VoteRecord>,
        threshold: usize,
    ) -> Self {
        let registered = airlines.iter().filter(|a| a.is_registered).count();
        Self {
            airlines: airlines.into_iter().map(|a| (a.address, a)).collect(),
            votes: votes
                .into_iter()
                .map(|v| (v.candidate, v.voters.into_iter().collect()))
                .collect(),
            registered,
            threshold,
        }
    }

    /// Look up an airline record
    pub fn get(&self, address: &Address) -> Option<&Airline> {
        self.airlines.get(address)
    }

    /// All airline records in address order
    pub fn airlines(&self) -> impl Iterator<Item = &Airline> {
        self.airlines.values()
    }

    /// Pending vote sets in candidate order
    pub fn vote_records(&self) -> Vec<VoteRecord> {
        self.votes
            .iter()
            .map(|(candidate, voters)| VoteRecord {
                candidate: *candidate,
                voters: voters.iter().copied().collect(),
            })
            .collect()
    }

    /// Number of registered airlines
    pub fn registered_count(&self) -> usize {
        self.registered
    }

    /// Votes cast for a pending candidate
    pub fn votes_for(&self, candidate: &Address) -> usize {
        self.votes.get(candidate).map_or(0, BTreeSet::len)
    }

    /// Whether `address` is a registered airline
    pub fn is_airline(&self, address: &Address) -> LedgerResult<bool> {
        if address.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        Ok(self.is_registered(address))
    }

    fn is_registered(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .is_some_and(|airline| airline.is_registered)
    }

    /// Whether `address` is a funded airline
    pub fn is_funded(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .is_some_and(|airline| airline.is_registered && airline.is_funded)
    }

    /// Propose `candidate` for membership or vote for it.
    ///
    /// `ctx.origin` must be an authorized caller; `ctx.sender` is the voting
    /// airline and must be registered and funded.
    pub fn propose_or_vote(
        &mut self,
        access: &AccessControl,
        ctx: &CallContext,
        candidate: Address,
        name: &str,
        journal: &mut Journal,
    ) -> LedgerResult<Admission> {
        access.require_operational()?;
        access.require_authorized(&ctx.origin)?;
        if candidate.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        let voter = ctx.sender;
        if !self.is_registered(&voter) {
            return Err(LedgerError::NotRegistered { address: voter });
        }
        if !self.is_funded(&voter) {
            return Err(LedgerError::NotFunded { airline: voter });
        }
        if self.is_registered(&candidate) {
            return Err(LedgerError::AlreadyRegistered { address: candidate });
        }

        let registered = self.registered;
        if registered < self.threshold {
            self.admit(candidate, name, journal);
            return Ok(Admission::Admitted);
        }

        let voters = self.votes.entry(candidate).or_default();
        if !voters.insert(voter) {
            return Err(LedgerError::DuplicateVote { voter });
        }
        let votes = voters.len();
        let remaining = registered.saturating_sub(votes);

        if votes >= remaining {
            journal.record(LedgerEvent::AchievedMultiPartyConsensus {
                candidate,
                votes,
                registered,
            });
            self.admit(candidate, name, journal);
            Ok(Admission::Admitted)
        } else {
            journal.record(LedgerEvent::NotYetAchievedMultiPartyConsensus {
                candidate,
                votes,
                registered,
            });
            tracing::debug!(%candidate, %voter, votes, registered, "admission vote recorded");
            Ok(Admission::VoteRecorded {
                votes,
                required: required_votes(registered),
            })
        }
    }

    fn admit(&mut self, candidate: Address, name: &str, journal: &mut Journal) {
        self.airlines
            .insert(candidate, Airline::admitted(candidate, name));
        self.votes.remove(&candidate);
        self.registered += 1;
        tracing::info!(airline = %candidate, name, registered = self.registered, "airline admitted");
        journal.record(LedgerEvent::AirlineRegistered {
            airline: candidate,
            name: name.to_string(),
            registered_count: self.registered,
        });
    }

    /// Contribute `amount` to the pool on behalf of `airline`.
    ///
    /// Repeated contributions accumulate; the airline stays funded.
    pub fn fund(
        &mut self,
        access: &AccessControl,
        airline: Address,
        amount: Amount,
        min_funding_fee: Amount,
        settlement: &mut SettlementLedger,
        journal: &mut Journal,
    ) -> LedgerResult<Amount> {
        access.require_operational()?;
        let record = match self.airlines.get_mut(&airline) {
            Some(record) if record.is_registered => record,
            _ => return Err(LedgerError::NotRegistered { address: airline }),
        };
        if amount < min_funding_fee {
            return Err(LedgerError::InsufficientFunds {
                required: min_funding_fee,
                provided: amount,
            });
        }

        settlement.deposit(airline, amount, journal)?;
        record.funds_contributed = record.funds_contributed.checked_add(amount)?;
        record.is_funded = true;

        tracing::info!(%airline, %amount, total = %record.funds_contributed, "airline funded");
        journal.record(LedgerEvent::AirlineFunded {
            airline,
            amount,
            total_contributed: record.funds_contributed,
        });
        Ok(record.funds_contributed)
    }
}
