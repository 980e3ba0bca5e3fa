//! Insurance policies and passenger credit
//!
//! Policies are bought per passenger and flight, credited when the flight
//! pays out, and drawn down through `pay`. Crediting only moves value into
//! a passenger's credit balance; the pool is untouched until withdrawal.

use flightsure_core::{
    Address, Amount, CallContext, FlightKey, InsuranceKey, LedgerConfig, LedgerError,
    LedgerEvent, LedgerResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::access::AccessControl;
use crate::flights::FlightRegistry;
use crate::journal::Journal;
use crate::settlement::SettlementLedger;

/// Insurance policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    /// Derived key
    pub key: InsuranceKey,
    /// Insured passenger
    pub passenger: Address,
    /// Insured flight
    pub flight: FlightKey,
    /// Premium paid; fixed at purchase
    pub amount: Amount,
    /// Set once the policy has been credited
    pub is_paid: bool,
}

/// Passenger credit balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerCredit {
    /// Passenger address
    pub passenger: Address,
    /// Withdrawable credit
    pub balance: Amount,
}

/// Policy and credit tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsurancePool {
    policies: BTreeMap<InsuranceKey, InsurancePolicy>,
    credits: BTreeMap<Address, Amount>,
}

impl InsurancePool {
    pub(crate) fn from_parts(policies: Vec<InsurancePolicy>, credits: Vec<PassengerCredit>) -> Self {
        Self {
            policies: policies.into_iter().map(|p| (p.key, p)).collect(),
            credits: credits
                .into_iter()
                .map(|c| (c.passenger, c.balance))
                .collect(),
        }
    }

    /// Look up a policy
    pub fn get(&self, key: &InsuranceKey) -> Option<&InsurancePolicy> {
        self.policies.get(key)
    }

    /// All policies in key order
    pub fn policies(&self) -> impl Iterator<Item = &InsurancePolicy> {
        self.policies.values()
    }

    /// All credit balances in passenger order
    pub fn credits(&self) -> impl Iterator<Item = PassengerCredit> + '_ {
        self.credits
            .iter()
            .map(|(passenger, balance)| PassengerCredit {
                passenger: *passenger,
                balance: *balance,
            })
    }

    /// Credit balance of a passenger; zero if never credited
    pub fn credit_of(&self, passenger: &Address) -> Amount {
        self.credits.get(passenger).copied().unwrap_or_default()
    }

    /// Sell a policy on a registered flight
    pub fn buy(
        &mut self,
        access: &AccessControl,
        config: &LedgerConfig,
        ctx: &CallContext,
        passenger: Address,
        flight: FlightKey,
        amount: Amount,
        flights: &mut FlightRegistry,
        settlement: &mut SettlementLedger,
        journal: &mut Journal,
    ) -> LedgerResult<InsuranceKey> {
        access.require_operational()?;
        access.require_authorized(&ctx.origin)?;
        if passenger.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        if amount < config.min_premium || amount > config.insurance_cap {
            return Err(LedgerError::AmountOutOfRange {
                amount,
                min: config.min_premium,
                max: config.insurance_cap,
            });
        }
        flights.require(&flight)?;

        let key = InsuranceKey::derive(&passenger, &flight);
        if self.policies.contains_key(&key) {
            return Err(LedgerError::AlreadyInsured { passenger, flight });
        }

        self.policies.insert(
            key,
            InsurancePolicy {
                key,
                passenger,
                flight,
                amount,
                is_paid: false,
            },
        );
        settlement.deposit(passenger, amount, journal)?;
        flights.attach_policy(&flight, key)?;

        tracing::info!(%passenger, %flight, %amount, "insurance purchased");
        journal.record(LedgerEvent::InsurancePurchased {
            insurance: key,
            passenger,
            flight,
            amount,
        });
        Ok(key)
    }

    /// Credit every policy on a flight with its payout.
    ///
    /// `is_paid` is set but not consulted: calling this twice for the same
    /// flight credits every policy twice. Returns the total credited.
    pub fn credit_insurees(
        &mut self,
        access: &AccessControl,
        config: &LedgerConfig,
        flight: &FlightKey,
        flights: &FlightRegistry,
        journal: &mut Journal,
    ) -> LedgerResult<Amount> {
        access.require_operational()?;
        let keys = flights.require(flight)?.insurance_keys.clone();

        let mut total = Amount::ZERO;
        for key in keys {
            let Some(policy) = self.policies.get_mut(&key) else {
                continue;
            };
            let payout = policy.amount.scale(
                u128::from(config.payout_numerator),
                u128::from(config.payout_denominator),
            )?;
            if policy.is_paid {
                tracing::warn!(insurance = %key, "crediting a policy that was already paid");
            }
            policy.is_paid = true;

            let passenger = policy.passenger;
            let balance = self.credits.entry(passenger).or_default();
            *balance = balance.checked_add(payout)?;
            total = total.checked_add(payout)?;

            journal.record(LedgerEvent::PassengerCredited {
                passenger,
                insurance: key,
                payout,
                balance: *balance,
            });
        }

        tracing::info!(%flight, %total, "insurees credited");
        Ok(total)
    }

    /// Reduce a passenger's credit. Returns the remaining balance.
    pub fn debit(&mut self, passenger: &Address, amount: Amount) -> LedgerResult<Amount> {
        let available = self.credit_of(passenger);
        if amount > available {
            return Err(LedgerError::InsufficientCredit {
                passenger: *passenger,
                requested: amount,
                available,
            });
        }
        if amount.is_zero() {
            return Ok(available);
        }
        let remaining = available.checked_sub(amount)?;
        self.credits.insert(*passenger, remaining);
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightsure_core::UNIT;

    struct Fixture {
        access: AccessControl,
        config: LedgerConfig,
        pool: InsurancePool,
        flights: FlightRegistry,
        settlement: SettlementLedger,
        journal: Journal,
        owner: Address,
        flight: FlightKey,
    }

    impl Fixture {
        fn new() -> Self {
            let owner = Address::derived(b"owner");
            let access = AccessControl::new(owner);
            let mut flights = FlightRegistry::default();
            let mut journal = Journal::default();
            let flight = flights
                .register(&access, Address::derived(b"airline"), "FS100", 7, &mut journal)
                .unwrap();
            Self {
                access,
                config: LedgerConfig::default(),
                pool: InsurancePool::default(),
                flights,
                settlement: SettlementLedger::default(),
                journal,
                owner,
                flight,
            }
        }

        fn buy(&mut self, passenger: Address, amount: Amount) -> LedgerResult<InsuranceKey> {
            self.pool.buy(
                &self.access,
                &self.config,
                &CallContext::relayed(self.owner, passenger),
                passenger,
                self.flight,
                amount,
                &mut self.flights,
                &mut self.settlement,
                &mut self.journal,
            )
        }

        fn credit(&mut self) -> LedgerResult<Amount> {
            self.pool.credit_insurees(
                &self.access,
                &self.config,
                &self.flight,
                &self.flights,
                &mut self.journal,
            )
        }
    }

    #[test]
    fn buy_bounds_are_inclusive() {
        let mut f = Fixture::new();
        let p = Address::derived(b"p");
        assert!(matches!(
            f.buy(p, Amount::ZERO),
            Err(LedgerError::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            f.buy(p, Amount(UNIT + 1)),
            Err(LedgerError::AmountOutOfRange { .. })
        ));
        f.buy(p, Amount(UNIT)).unwrap();
        f.buy(Address::derived(b"q"), Amount(1)).unwrap();
        assert_eq!(f.settlement.balance(), Amount(UNIT + 1));
    }

    #[test]
    fn second_policy_on_same_flight_rejected() {
        let mut f = Fixture::new();
        let p = Address::derived(b"p");
        f.buy(p, Amount(10)).unwrap();
        assert_eq!(
            f.buy(p, Amount(10)),
            Err(LedgerError::AlreadyInsured {
                passenger: p,
                flight: f.flight
            })
        );
    }

    #[test]
    fn credit_pays_one_and_a_half_truncated() {
        let mut f = Fixture::new();
        let p = Address::derived(b"p");
        let q = Address::derived(b"q");
        let kp = f.buy(p, Amount(101)).unwrap();
        f.buy(q, Amount(3)).unwrap();
        assert_eq!(f.credit().unwrap(), Amount(151 + 4));
        assert_eq!(f.pool.credit_of(&p), Amount(151));
        assert_eq!(f.pool.credit_of(&q), Amount(4));
        assert!(f.pool.get(&kp).unwrap().is_paid);
    }

    #[test]
    fn credit_replay_double_credits() {
        let mut f = Fixture::new();
        let p = Address::derived(b"p");
        f.buy(p, Amount(100)).unwrap();
        f.credit().unwrap();
        f.credit().unwrap();
        assert_eq!(f.pool.credit_of(&p), Amount(300));
    }

    #[test]
    fn debit_refuses_overdraw() {
        let mut f = Fixture::new();
        let p = Address::derived(b"p");
        f.buy(p, Amount(100)).unwrap();
        f.credit().unwrap();
        assert_eq!(f.pool.debit(&p, Amount(50)).unwrap(), Amount(100));
        assert_eq!(
            f.pool.debit(&p, Amount(101)),
            Err(LedgerError::InsufficientCredit {
                passenger: p,
                requested: Amount(101),
                available: Amount(100)
            })
        );
    }

    #[test]
    fn zero_debit_leaves_no_credit_row() {
        let mut f = Fixture::new();
        let stranger = Address::derived(b"stranger");
        assert_eq!(f.pool.debit(&stranger, Amount::ZERO).unwrap(), Amount::ZERO);
        assert_eq!(f.pool.credits().count(), 0);
    }

    #[test]
    fn unauthorized_origin_cannot_buy() {
        let mut f = Fixture::new();
        let p = Address::derived(b"p");
        let result = f.pool.buy(
            &f.access,
            &f.config,
            &CallContext::direct(p),
            p,
            f.flight,
            Amount(10),
            &mut f.flights,
            &mut f.settlement,
            &mut f.journal,
        );
        assert_eq!(result, Err(LedgerError::Unauthorized { caller: p }));
    }
}
