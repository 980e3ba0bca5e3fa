//! Transactional ledger facade
//!
//! [`Ledger`] owns every component and is the only public entry point for
//! mutations. Each mutating operation runs inside [`Ledger::transact`]: the
//! component state and journal length are captured first, and any error
//! restores them before it is returned. Callers therefore observe either the
//! full effect of an operation or only its error.
//!
//! The checkpoint is a clone of the whole component state, so each mutation
//! costs time and memory proportional to the ledger size. Transactions nest:
//! a re-entrant call from a [`PayoutSink`] takes its own checkpoint, and an
//! inner failure the caller handles rolls back only the inner call.

use flightsure_core::{
    Address, Amount, CallContext, FlightKey, FlightStatus, InsuranceKey, LedgerConfig,
    LedgerError, LedgerEvent, LedgerResult, OracleRequestKey,
};

use crate::access::AccessControl;
use crate::airlines::{Admission, Airline, AirlineRegistry};
use crate::flights::{Flight, FlightRegistry};
use crate::insurance::{InsurancePolicy, InsurancePool};
use crate::journal::Journal;
use crate::oracles::{OracleDesk, OracleRequest, ResponseOutcome};
use crate::settlement::{Payout, PayoutSink, SettlementLedger};

/// All mutable ledger state; cloned as a rollback checkpoint
#[derive(Debug, Clone)]
pub(crate) struct LedgerState {
    pub(crate) access: AccessControl,
    pub(crate) airlines: AirlineRegistry,
    pub(crate) flights: FlightRegistry,
    pub(crate) insurance: InsurancePool,
    pub(crate) settlement: SettlementLedger,
    pub(crate) oracles: OracleDesk,
}

struct Checkpoint {
    state: LedgerState,
    journal_len: usize,
}

/// Membership, insurance and settlement ledger
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(crate) config: LedgerConfig,
    pub(crate) state: LedgerState,
    pub(crate) journal: Journal,
}

impl Ledger {
    /// Create a ledger with one founding airline.
    ///
    /// The founding airline starts registered and unfunded. It and `owner`
    /// are the initial authorized callers.
    pub fn genesis(
        config: LedgerConfig,
        owner: Address,
        airline: Address,
        name: &str,
    ) -> LedgerResult<Self> {
        config.validate()?;
        if owner.is_null() || airline.is_null() {
            return Err(LedgerError::InvalidAddress);
        }

        let mut access = AccessControl::new(owner);
        let mut journal = Journal::default();
        access.authorize_caller(&owner, airline, &mut journal)?;
        let airlines = AirlineRegistry::genesis(airline, name, config.consensus_threshold);
        journal.record(LedgerEvent::AirlineRegistered {
            airline,
            name: name.to_string(),
            registered_count: airlines.registered_count(),
        });

        tracing::info!(%owner, %airline, name, "ledger initialised");
        Ok(Self {
            state: LedgerState {
                access,
                airlines,
                flights: FlightRegistry::default(),
                insurance: InsurancePool::default(),
                settlement: SettlementLedger::default(),
                oracles: OracleDesk::new(config.oracle.seed),
            },
            config,
            journal,
        })
    }

    /// Run `f` atomically: on error every state change and event it made is
    /// discarded.
    pub fn transact<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let checkpoint = Checkpoint {
            state: self.state.clone(),
            journal_len: self.journal.len(),
        };
        match f(self) {
            Ok(value) => {
                tracing::debug!(operation, "committed");
                Ok(value)
            }
            Err(err) => {
                self.state = checkpoint.state;
                self.journal.truncate(checkpoint.journal_len);
                tracing::warn!(operation, error = %err, kind = err.kind(), "rolled back");
                Err(err)
            }
        }
    }

    /// Active configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Access control
    // ------------------------------------------------------------------

    /// Current operational flag
    pub fn is_operational(&self) -> bool {
        self.state.access.is_operational()
    }

    /// Owning principal
    pub fn owner(&self) -> Address {
        self.state.access.owner()
    }

    /// Whether `address` is an authorized caller
    pub fn is_authorized(&self, address: &Address) -> bool {
        self.state.access.is_authorized(address)
    }

    /// Toggle the operational flag (owner only, allowed while halted)
    pub fn set_operating_status(&mut self, caller: Address, mode: bool) -> LedgerResult<()> {
        self.transact("set_operating_status", |ledger| {
            ledger
                .state
                .access
                .set_operating_status(&caller, mode, &mut ledger.journal)
        })
    }

    /// Add an authorized caller
    pub fn authorize_caller(&mut self, caller: Address, address: Address) -> LedgerResult<bool> {
        self.transact("authorize_caller", |ledger| {
            ledger
                .state
                .access
                .authorize_caller(&caller, address, &mut ledger.journal)
        })
    }

    /// Remove an authorized caller
    pub fn deauthorize_caller(
        &mut self,
        caller: Address,
        address: Address,
    ) -> LedgerResult<bool> {
        self.transact("deauthorize_caller", |ledger| {
            ledger
                .state
                .access
                .deauthorize_caller(&caller, address, &mut ledger.journal)
        })
    }

    // ------------------------------------------------------------------
    // Airlines
    // ------------------------------------------------------------------

    /// Propose or vote for a new airline on behalf of `ctx.sender`
    pub fn register_airline(
        &mut self,
        ctx: CallContext,
        candidate: Address,
        name: &str,
    ) -> LedgerResult<Admission> {
        self.transact("register_airline", |ledger| {
            let LedgerState {
                access, airlines, ..
            } = &mut ledger.state;
            airlines.propose_or_vote(access, &ctx, candidate, name, &mut ledger.journal)
        })
    }

    /// Contribute funds for a registered airline. Returns its cumulative
    /// contribution.
    pub fn fund(&mut self, airline: Address, amount: Amount) -> LedgerResult<Amount> {
        self.transact("fund", |ledger| {
            let min_fee = ledger.config.min_funding_fee;
            let LedgerState {
                access,
                airlines,
                settlement,
                ..
            } = &mut ledger.state;
            airlines.fund(
                access,
                airline,
                amount,
                min_fee,
                settlement,
                &mut ledger.journal,
            )
        })
    }

    /// Whether `address` is a registered airline
    pub fn is_airline(&self, address: &Address) -> LedgerResult<bool> {
        self.state.airlines.is_airline(address)
    }

    /// Airline record
    pub fn airline(&self, address: &Address) -> Option<&Airline> {
        self.state.airlines.get(address)
    }

    /// Whether `address` is a registered airline that has contributed funds
    pub fn is_funded(&self, address: &Address) -> bool {
        self.state.airlines.is_funded(address)
    }

    /// Number of registered airlines
    pub fn registered_airline_count(&self) -> usize {
        self.state.airlines.registered_count()
    }

    /// Votes cast for a pending candidate
    pub fn votes_for(&self, candidate: &Address) -> usize {
        self.state.airlines.votes_for(candidate)
    }

    // ------------------------------------------------------------------
    // Flights
    // ------------------------------------------------------------------

    /// Record a flight
    pub fn register_flight(
        &mut self,
        airline: Address,
        name: &str,
        timestamp: u64,
    ) -> LedgerResult<FlightKey> {
        self.transact("register_flight", |ledger| {
            let LedgerState {
                access, flights, ..
            } = &mut ledger.state;
            flights.register(access, airline, name, timestamp, &mut ledger.journal)
        })
    }

    /// Update a flight's status; `caller` must own the flight
    pub fn update_flight_status(
        &mut self,
        caller: Address,
        airline: Address,
        name: &str,
        timestamp: u64,
        status: FlightStatus,
    ) -> LedgerResult<()> {
        let key = FlightKey::derive(&airline, name, timestamp);
        self.transact("update_flight_status", |ledger| {
            let LedgerState {
                access, flights, ..
            } = &mut ledger.state;
            flights.update_status(access, &caller, &key, status, &mut ledger.journal)?;
            Ok(())
        })
    }

    /// Flight record
    pub fn flight(&self, key: &FlightKey) -> Option<&Flight> {
        self.state.flights.get(key)
    }

    /// Derived key for a flight triple
    pub fn flight_key(&self, airline: &Address, name: &str, timestamp: u64) -> FlightKey {
        FlightKey::derive(airline, name, timestamp)
    }

    // ------------------------------------------------------------------
    // Insurance and settlement
    // ------------------------------------------------------------------

    /// Sell `passenger` a policy on a registered flight
    pub fn buy(
        &mut self,
        ctx: CallContext,
        passenger: Address,
        airline: Address,
        name: &str,
        timestamp: u64,
        amount: Amount,
    ) -> LedgerResult<InsuranceKey> {
        let flight = FlightKey::derive(&airline, name, timestamp);
        self.transact("buy", |ledger| {
            let LedgerState {
                access,
                flights,
                insurance,
                settlement,
                ..
            } = &mut ledger.state;
            insurance.buy(
                access,
                &ledger.config,
                &ctx,
                passenger,
                flight,
                amount,
                flights,
                settlement,
                &mut ledger.journal,
            )
        })
    }

    /// Credit every policy on a flight. Returns the total credited.
    ///
    /// Not guarded against replay: a second call credits every policy again.
    pub fn credit_insurees(
        &mut self,
        airline: Address,
        name: &str,
        timestamp: u64,
    ) -> LedgerResult<Amount> {
        let flight = FlightKey::derive(&airline, name, timestamp);
        self.transact("credit_insurees", |ledger| {
            let LedgerState {
                access,
                flights,
                insurance,
                ..
            } = &mut ledger.state;
            insurance.credit_insurees(access, &ledger.config, &flight, flights, &mut ledger.journal)
        })
    }

    /// Withdraw `amount` of a passenger's credit through `sink`.
    ///
    /// Credit and pool are debited before the sink runs; the sink may call
    /// back into this ledger. A sink error undoes the whole withdrawal.
    pub fn pay(
        &mut self,
        passenger: Address,
        amount: Amount,
        sink: &mut dyn PayoutSink,
    ) -> LedgerResult<Payout> {
        self.transact("pay", |ledger| {
            ledger.state.access.require_operational()?;
            let remaining_credit = ledger.state.insurance.debit(&passenger, amount)?;
            ledger.state.settlement.withdraw(passenger, amount)?;

            let payout = Payout {
                passenger,
                amount,
                remaining_credit,
            };
            ledger.journal.record(LedgerEvent::PassengerPayout {
                passenger,
                amount,
                remaining_credit,
            });
            tracing::info!(%passenger, %amount, remaining = %remaining_credit, "payout debited");

            sink.transfer(ledger, &payout)?;
            Ok(payout)
        })
    }

    /// Policy record
    pub fn insurance(&self, key: &InsuranceKey) -> Option<&InsurancePolicy> {
        self.state.insurance.get(key)
    }

    /// Passenger credit balance
    pub fn credit_of(&self, passenger: &Address) -> Amount {
        self.state.insurance.credit_of(passenger)
    }

    /// Pooled balance
    pub fn pooled_balance(&self) -> Amount {
        self.state.settlement.balance()
    }

    // ------------------------------------------------------------------
    // Oracles
    // ------------------------------------------------------------------

    /// Register an oracle; returns its assigned indexes
    pub fn register_oracle(&mut self, oracle: Address, fee: Amount) -> LedgerResult<[u8; 3]> {
        self.transact("register_oracle", |ledger| {
            let LedgerState { access, oracles, .. } = &mut ledger.state;
            oracles.register(access, &ledger.config, oracle, fee, &mut ledger.journal)
        })
    }

    /// Indexes assigned to an oracle
    pub fn oracle_indexes(&self, oracle: &Address) -> LedgerResult<[u8; 3]> {
        self.state.oracles.indexes_of(oracle)
    }

    /// Collected oracle registration fees
    pub fn oracle_fee_balance(&self) -> Amount {
        self.state.oracles.fee_balance()
    }

    /// Oracle request record
    pub fn oracle_request(&self, key: &OracleRequestKey) -> Option<&OracleRequest> {
        self.state.oracles.request(key)
    }

    /// Ask the oracle network for a flight's status. Returns the index the
    /// request was routed to.
    pub fn fetch_flight_status(
        &mut self,
        requester: Address,
        airline: Address,
        name: &str,
        timestamp: u64,
    ) -> LedgerResult<u8> {
        let key = FlightKey::derive(&airline, name, timestamp);
        self.transact("fetch_flight_status", |ledger| {
            let LedgerState {
                access,
                flights,
                oracles,
                ..
            } = &mut ledger.state;
            let flight = flights.require(&key)?;
            oracles.open_request(access, &ledger.config, requester, flight, &mut ledger.journal)
        })
    }

    /// Submit an oracle's status report.
    ///
    /// When the report completes a quorum the flight status is settled, and
    /// an airline-caused delay credits the flight's insurees. Crediting only
    /// happens when the flight moves into that status, so a reopened request
    /// that settles the same delay again does not pay twice.
    pub fn submit_oracle_response(
        &mut self,
        oracle: Address,
        index: u8,
        airline: Address,
        name: &str,
        timestamp: u64,
        status: FlightStatus,
    ) -> LedgerResult<ResponseOutcome> {
        let flight = FlightKey::derive(&airline, name, timestamp);
        self.transact("submit_oracle_response", |ledger| {
            let LedgerState {
                access,
                flights,
                insurance,
                oracles,
                ..
            } = &mut ledger.state;
            let (matching, settled) = oracles.record_response(
                access,
                &ledger.config,
                oracle,
                index,
                &flight,
                status,
                &mut ledger.journal,
            )?;
            let Some(status) = settled else {
                return Ok(ResponseOutcome::Recorded { matching });
            };

            let previous = flights.set_status(&flight, status, &mut ledger.journal)?;
            let credited = if status.triggers_payout() && previous != status {
                insurance.credit_insurees(
                    access,
                    &ledger.config,
                    &flight,
                    flights,
                    &mut ledger.journal,
                )?
            } else {
                Amount::ZERO
            };
            Ok(ResponseOutcome::Settled { status, credited })
        })
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    /// Committed events
    pub fn events(&self) -> &[LedgerEvent] {
        self.journal.events()
    }

    /// Take the committed events
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        self.journal.drain()
    }
}
