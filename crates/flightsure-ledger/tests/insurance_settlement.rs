//! Insurance purchase, crediting and payout tests

#![allow(clippy::unwrap_used)]

use flightsure_core::{Amount, CallContext, LedgerError, LedgerEvent, UNIT};
use flightsure_ledger::DiscardSink;
use flightsure_testkit::strategies::{arb_address, arb_premium};
use flightsure_testkit::*;
use proptest::prelude::*;

const FLIGHT_TS: u64 = 1_700_000_000;

fn insured_fixture() -> LedgerFixture {
    LedgerBuilder::new()
        .with_airlines(2)
        .with_flight("FS100", FLIGHT_TS)
        .with_flight("FS200", FLIGHT_TS + 3600)
        .build()
}

#[test]
fn buy_at_cap_then_again_is_rejected() {
    let mut fixture = insured_fixture();
    let pool_before = fixture.ledger.pooled_balance();
    let p = passenger(1);

    fixture.insure(p, 0, ONE);
    assert_pool!(fixture.ledger, pool_before.checked_add(ONE).unwrap());

    let flight = fixture.flight(0).clone();
    assert_ledger_error!(
        fixture.ledger.buy(
            via_owner(p),
            p,
            flight.airline,
            &flight.name,
            flight.timestamp,
            Amount(1)
        ),
        LedgerError::AlreadyInsured { .. }
    );
}

#[test]
fn premium_bounds_enforced() {
    let mut fixture = insured_fixture();
    let flight = fixture.flight(0).clone();
    for amount in [Amount::ZERO, Amount(UNIT + 1)] {
        assert_ledger_error!(
            fixture.ledger.buy(
                via_owner(passenger(1)),
                passenger(1),
                flight.airline,
                &flight.name,
                flight.timestamp,
                amount
            ),
            LedgerError::AmountOutOfRange { .. }
        );
    }
}

#[test]
fn buying_on_unregistered_flight_fails() {
    let mut fixture = insured_fixture();
    assert_ledger_error!(
        fixture.ledger.buy(
            via_owner(passenger(1)),
            passenger(1),
            airline(0),
            "NOPE",
            0,
            TENTH
        ),
        LedgerError::UnknownFlight { .. }
    );
}

#[test]
fn credit_pays_one_and_a_half() {
    let mut fixture = insured_fixture();
    let (p, q) = (passenger(1), passenger(2));
    fixture.insure(p, 0, Amount(101));
    fixture.insure(q, 0, Amount(3));

    assert_eq!(fixture.credit(0), Amount(151 + 4));
    assert_credit!(fixture.ledger, p, Amount(151));
    assert_credit!(fixture.ledger, q, Amount(4));
}

#[test]
fn credits_from_several_flights_add_up() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    fixture.insure(p, 0, Amount(100));
    fixture.insure(p, 1, Amount(200));
    fixture.credit(0);
    fixture.credit(1);
    assert_credit!(fixture.ledger, p, Amount(450));
}

#[test]
fn crediting_same_flight_twice_double_credits() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    fixture.insure(p, 0, Amount(100));
    fixture.credit(0);
    fixture.credit(0);
    assert_credit!(fixture.ledger, p, Amount(300));
}

#[test]
fn crediting_unknown_flight_fails() {
    let mut fixture = insured_fixture();
    assert_ledger_error!(
        fixture.ledger.credit_insurees(airline(0), "NOPE", 0),
        LedgerError::UnknownFlight { .. }
    );
}

#[test]
fn pay_draws_down_credit() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    fixture.insure(p, 0, Amount(200));
    fixture.credit(0);
    // credit is now 300; draw it down to 100 first
    fixture.ledger.pay(p, Amount(200), &mut DiscardSink).unwrap();
    assert_credit!(fixture.ledger, p, Amount(100));

    let mut sink = RecordingSink::default();
    let first = fixture.ledger.pay(p, Amount(30), &mut sink).unwrap();
    assert_eq!(first.remaining_credit, Amount(70));

    let pool_before = fixture.ledger.pooled_balance();
    assert_ledger_error!(
        fixture.ledger.pay(p, Amount(80), &mut sink),
        LedgerError::InsufficientCredit { .. }
    );
    assert_credit!(fixture.ledger, p, Amount(70));
    assert_pool!(fixture.ledger, pool_before);
    assert_eq!(sink.payouts, vec![first]);
}

#[test]
fn zero_pay_by_stranger_creates_no_credit_entry() {
    let mut fixture = insured_fixture();
    let stranger = passenger(77);
    let payout = fixture
        .ledger
        .pay(stranger, Amount::ZERO, &mut DiscardSink)
        .unwrap();
    assert_eq!(payout.remaining_credit, Amount::ZERO);
    assert!(fixture
        .ledger
        .snapshot()
        .credits
        .iter()
        .all(|credit| credit.passenger != stranger));
}

#[test]
fn pay_reduces_pool_and_emits_payout() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    fixture.insure(p, 0, Amount(100));
    fixture.credit(0);
    let pool_before = fixture.ledger.pooled_balance();
    fixture.ledger.drain_events();

    fixture.ledger.pay(p, Amount(150), &mut DiscardSink).unwrap();
    assert_pool!(fixture.ledger, pool_before.checked_sub(Amount(150)).unwrap());
    assert_eq!(
        fixture.ledger.drain_events(),
        vec![LedgerEvent::PassengerPayout {
            passenger: p,
            amount: Amount(150),
            remaining_credit: Amount::ZERO,
        }]
    );
}

#[test]
fn pay_fails_when_pool_cannot_cover() {
    // premiums only, no airline stake beyond the minimum
    let mut fixture = LedgerBuilder::new()
        .with_funding(TENTH)
        .with_flight("FS100", FLIGHT_TS)
        .build();
    let p = passenger(1);
    fixture.insure(p, 0, ONE);
    fixture.credit(0);
    assert_credit!(fixture.ledger, p, Amount(UNIT * 3 / 2));

    let ledger = &mut fixture.ledger;
    assert_unchanged!(ledger, {
        assert_ledger_error!(
            ledger.pay(p, Amount(UNIT * 3 / 2), &mut DiscardSink),
            LedgerError::InsufficientFunds { .. }
        );
    });
}

#[test]
fn failing_sink_rolls_back_everything() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    fixture.insure(p, 0, Amount(100));
    fixture.credit(0);

    let mut sink = FailingSink::default();
    let ledger = &mut fixture.ledger;
    assert_unchanged!(ledger, {
        assert_ledger_error!(
            ledger.pay(p, Amount(100), &mut sink),
            LedgerError::Transfer { .. }
        );
    });
    assert_eq!(sink.attempts, 1);
    assert_credit!(fixture.ledger, p, Amount(150));
}

#[test]
fn reentrant_sink_cannot_double_spend() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    fixture.insure(p, 0, Amount(100));
    fixture.credit(0);
    let pool_before = fixture.ledger.pooled_balance();

    // credit 150; each nested pay asks for 100 again
    let mut sink = ReentrantSink::new(3);
    let payout = fixture.ledger.pay(p, Amount(100), &mut sink).unwrap();

    assert_eq!(payout.remaining_credit, Amount(50));
    assert_eq!(sink.nested_successes(), 0);
    assert!(matches!(
        sink.nested[0],
        Err(LedgerError::InsufficientCredit {
            available: Amount(50),
            ..
        })
    ));
    assert_credit!(fixture.ledger, p, Amount(50));
    assert_pool!(fixture.ledger, pool_before.checked_sub(Amount(100)).unwrap());
}

#[test]
fn reentrant_sink_withdrawals_never_exceed_credit() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    fixture.insure(p, 0, Amount(200));
    fixture.credit(0);

    // credit 300; outer pay 100 plus up to two nested pays of 100
    let mut sink = ReentrantSink::new(5);
    fixture.ledger.pay(p, Amount(100), &mut sink).unwrap();
    assert_eq!(sink.nested_successes(), 2);
    assert_eq!(sink.delivered.len(), 3);
    assert_credit!(fixture.ledger, p, Amount::ZERO);
}

#[test]
fn unauthorized_origin_cannot_buy() {
    let mut fixture = insured_fixture();
    let p = passenger(1);
    assert_eq!(
        fixture.ledger.buy(
            CallContext::direct(p),
            p,
            airline(0),
            "FS100",
            FLIGHT_TS,
            TENTH
        ),
        Err(LedgerError::Unauthorized { caller: p })
    );
}

proptest! {
    #[test]
    fn credit_is_truncated_three_halves(premium in arb_premium()) {
        let mut fixture = insured_fixture();
        let p = passenger(1);
        fixture.insure(p, 0, premium);
        let credited = fixture.credit(0);
        prop_assert_eq!(credited, Amount(premium.0 * 3 / 2));
        prop_assert_eq!(fixture.ledger.credit_of(&p), credited);
    }

    #[test]
    fn every_insured_passenger_is_credited(
        passengers in prop::collection::btree_set(arb_address(), 1..6)
    ) {
        let mut fixture = insured_fixture();
        for p in &passengers {
            fixture.insure(*p, 0, TENTH);
        }
        let credited = fixture.credit(0);
        let each = Amount(TENTH.0 * 3 / 2);
        prop_assert_eq!(credited, Amount(each.0 * passengers.len() as u128));
        for p in &passengers {
            prop_assert_eq!(fixture.ledger.credit_of(p), each);
        }
    }
}
