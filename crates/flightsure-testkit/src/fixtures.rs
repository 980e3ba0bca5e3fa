//! Ledger fixtures
//!
//! Addresses are derived from fixed labels so every test run sees the same
//! keys. [`LedgerBuilder`] admits and funds members through the public
//! operations, so a built ledger is reachable by real calls.

use flightsure_core::{Address, Amount, CallContext, FlightKey, LedgerConfig, UNIT};
use flightsure_ledger::{Admission, Ledger};

/// Ledger owner
pub fn owner() -> Address {
    Address::derived(b"fixture/owner")
}

/// Member airline `n`; airline 0 is the genesis airline
pub fn airline(n: usize) -> Address {
    Address::derived(format!("fixture/airline/{n}").as_bytes())
}

/// Passenger `n`
pub fn passenger(n: usize) -> Address {
    Address::derived(format!("fixture/passenger/{n}").as_bytes())
}

/// Oracle `n`
pub fn oracle(n: usize) -> Address {
    Address::derived(format!("fixture/oracle/{n}").as_bytes())
}

/// Call relayed through the owner on behalf of `sender`
pub fn via_owner(sender: Address) -> CallContext {
    CallContext::relayed(owner(), sender)
}

/// Registered flight in a fixture
#[derive(Debug, Clone)]
pub struct FixtureFlight {
    /// Operating airline
    pub airline: Address,
    /// Flight name
    pub name: String,
    /// Departure timestamp
    pub timestamp: u64,
    /// Derived key
    pub key: FlightKey,
}

/// Built ledger plus the handles tests need
#[derive(Debug, Clone)]
pub struct LedgerFixture {
    /// Ledger under test
    pub ledger: Ledger,
    /// Member airlines in admission order
    pub airlines: Vec<Address>,
    /// Flights registered by airline 0
    pub flights: Vec<FixtureFlight>,
}

impl LedgerFixture {
    /// Flight at position `n`
    pub fn flight(&self, n: usize) -> &FixtureFlight {
        &self.flights[n]
    }

    /// Sell `passenger` a policy on flight `n`
    pub fn insure(&mut self, passenger: Address, n: usize, amount: Amount) {
        let flight = self.flights[n].clone();
        self.ledger
            .buy(
                via_owner(passenger),
                passenger,
                flight.airline,
                &flight.name,
                flight.timestamp,
                amount,
            )
            .expect("fixture purchase");
    }

    /// Credit every policy on flight `n`
    pub fn credit(&mut self, n: usize) -> Amount {
        let flight = self.flights[n].clone();
        self.ledger
            .credit_insurees(flight.airline, &flight.name, flight.timestamp)
            .expect("fixture credit")
    }
}

/// Builder for populated ledgers
#[derive(Debug, Clone)]
pub struct LedgerBuilder {
    config: LedgerConfig,
    airlines: usize,
    funding: Amount,
    flights: Vec<(String, u64)>,
    oracles: usize,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBuilder {
    /// One funded genesis airline, default config
    pub fn new() -> Self {
        Self {
            config: LedgerConfig::default(),
            airlines: 1,
            funding: Amount::units(10),
            flights: Vec::new(),
            oracles: 0,
        }
    }

    /// Use `config`
    pub fn with_config(mut self, config: LedgerConfig) -> Self {
        self.config = config;
        self
    }

    /// Total member airlines, all funded
    pub fn with_airlines(mut self, count: usize) -> Self {
        self.airlines = count.max(1);
        self
    }

    /// Contribution each airline makes
    pub fn with_funding(mut self, amount: Amount) -> Self {
        self.funding = amount;
        self
    }

    /// Register a flight under airline 0
    pub fn with_flight(mut self, name: &str, timestamp: u64) -> Self {
        self.flights.push((name.to_string(), timestamp));
        self
    }

    /// Register `count` oracles paying the configured fee
    pub fn with_oracles(mut self, count: usize) -> Self {
        self.oracles = count;
        self
    }

    /// Build the ledger.
    ///
    /// Each new airline is proposed by airline 0 and, above the consensus
    /// threshold, voted in by existing members in admission order.
    pub fn build(self) -> LedgerFixture {
        let mut ledger = Ledger::genesis(self.config.clone(), owner(), airline(0), "Airline 0")
            .expect("genesis");
        ledger.fund(airline(0), self.funding).expect("genesis funding");
        let mut members = vec![airline(0)];

        for n in 1..self.airlines {
            let candidate = airline(n);
            let name = format!("Airline {n}");
            let admitted = members.clone().into_iter().any(|voter| {
                ledger
                    .register_airline(via_owner(voter), candidate, &name)
                    .expect("admission vote")
                    .is_admitted()
            });
            assert!(admitted, "airline {n} was not admitted");
            ledger.fund(candidate, self.funding).expect("member funding");
            members.push(candidate);
        }

        let mut flights = Vec::new();
        for (name, timestamp) in self.flights {
            let key = ledger
                .register_flight(airline(0), &name, timestamp)
                .expect("flight registration");
            flights.push(FixtureFlight {
                airline: airline(0),
                name,
                timestamp,
                key,
            });
        }

        let fee = self.config.oracle.registration_fee;
        for n in 0..self.oracles {
            ledger.register_oracle(oracle(n), fee).expect("oracle registration");
        }

        ledger.drain_events();
        LedgerFixture {
            ledger,
            airlines: members,
            flights,
        }
    }
}

/// Admit `candidate` by voting with `voters` in order, stopping once it is
/// admitted. Returns the outcome of the last vote cast.
pub fn vote_in(
    ledger: &mut Ledger,
    voters: &[Address],
    candidate: Address,
    name: &str,
) -> Admission {
    let mut last = Admission::VoteRecorded {
        votes: 0,
        required: 0,
    };
    for voter in voters {
        last = ledger
            .register_airline(via_owner(*voter), candidate, name)
            .expect("vote");
        if last.is_admitted() {
            break;
        }
    }
    last
}

/// One tenth of a unit
pub const TENTH: Amount = Amount::fraction(1, 10);

/// Whole unit
pub const ONE: Amount = Amount(UNIT);
