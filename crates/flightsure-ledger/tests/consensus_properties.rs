//! Airline admission tests
//!
//! Covers direct admission below the threshold, vote-based admission at or
//! above it, and the guards that run before any vote is counted.

#![allow(clippy::unwrap_used)]

use assert_matches::assert_matches;
use flightsure_core::{CallContext, LedgerConfig, LedgerError, LedgerEvent};
use flightsure_ledger::{required_votes, Admission, Ledger};
use flightsure_testkit::strategies::arb_membership;
use flightsure_testkit::*;
use proptest::prelude::*;

#[test]
fn first_three_candidates_join_directly() {
    let mut fixture = LedgerBuilder::new().build();
    for n in 1..=3 {
        let admission = fixture
            .ledger
            .register_airline(via_owner(airline(0)), airline(n), "Member")
            .unwrap();
        assert_eq!(admission, Admission::Admitted);
    }
    assert_eq!(fixture.ledger.registered_airline_count(), 4);
}

#[test]
fn fifth_airline_needs_two_votes() {
    let mut fixture = LedgerBuilder::new().with_airlines(4).build();
    let candidate = airline(4);

    let first = fixture
        .ledger
        .register_airline(via_owner(airline(0)), candidate, "Fifth")
        .unwrap();
    assert_eq!(
        first,
        Admission::VoteRecorded {
            votes: 1,
            required: 2
        }
    );
    assert!(!fixture.ledger.is_airline(&candidate).unwrap());

    let second = fixture
        .ledger
        .register_airline(via_owner(airline(1)), candidate, "Fifth")
        .unwrap();
    assert_eq!(second, Admission::Admitted);
    assert_eq!(fixture.ledger.registered_airline_count(), 5);
    assert_eq!(fixture.ledger.votes_for(&candidate), 0);

    let events = fixture.ledger.drain_events();
    assert_matches!(
        events[0],
        LedgerEvent::NotYetAchievedMultiPartyConsensus { votes: 1, registered: 4, .. }
    );
    assert_matches!(
        events[1],
        LedgerEvent::AchievedMultiPartyConsensus { votes: 2, registered: 4, .. }
    );
    assert_matches!(
        events[2],
        LedgerEvent::AirlineRegistered { registered_count: 5, .. }
    );
}

#[test]
fn sixth_airline_needs_three_of_five() {
    let mut fixture = LedgerBuilder::new().with_airlines(5).build();
    let candidate = airline(5);
    for voter in 0..2 {
        let admission = fixture
            .ledger
            .register_airline(via_owner(airline(voter)), candidate, "Sixth")
            .unwrap();
        assert!(!admission.is_admitted());
    }
    let admission = fixture
        .ledger
        .register_airline(via_owner(airline(2)), candidate, "Sixth")
        .unwrap();
    assert!(admission.is_admitted());
}

#[test]
fn duplicate_vote_rejected_without_side_effects() {
    let mut fixture = LedgerBuilder::new().with_airlines(4).build();
    let candidate = airline(4);
    fixture
        .ledger
        .register_airline(via_owner(airline(0)), candidate, "Fifth")
        .unwrap();

    let ledger = &mut fixture.ledger;
    assert_unchanged!(ledger, {
        assert_ledger_error!(
            ledger.register_airline(via_owner(airline(0)), candidate, "Fifth"),
            LedgerError::DuplicateVote { .. }
        );
    });
    assert_eq!(ledger.votes_for(&candidate), 1);
}

#[test]
fn unfunded_member_cannot_vote() {
    let mut ledger = Ledger::genesis(LedgerConfig::default(), owner(), airline(0), "Zero").unwrap();
    assert_eq!(
        ledger.register_airline(via_owner(airline(0)), airline(1), "One"),
        Err(LedgerError::NotFunded { airline: airline(0) })
    );
}

#[test]
fn non_member_cannot_propose() {
    let mut fixture = LedgerBuilder::new().build();
    assert_eq!(
        fixture
            .ledger
            .register_airline(via_owner(airline(7)), airline(8), "Eight"),
        Err(LedgerError::NotRegistered { address: airline(7) })
    );
}

#[test]
fn unauthorized_origin_rejected() {
    let mut fixture = LedgerBuilder::new().build();
    let stranger = passenger(0);
    assert_eq!(
        fixture.ledger.register_airline(
            CallContext::relayed(stranger, airline(0)),
            airline(1),
            "One"
        ),
        Err(LedgerError::Unauthorized { caller: stranger })
    );
}

#[test]
fn registered_airline_cannot_be_proposed_again() {
    let mut fixture = LedgerBuilder::new().with_airlines(2).build();
    assert_eq!(
        fixture
            .ledger
            .register_airline(via_owner(airline(0)), airline(1), "One"),
        Err(LedgerError::AlreadyRegistered { address: airline(1) })
    );
}

#[test]
fn funding_below_minimum_rejected() {
    let mut ledger = Ledger::genesis(LedgerConfig::default(), owner(), airline(0), "Zero").unwrap();
    assert_ledger_error!(
        ledger.fund(airline(0), TENTH.checked_sub(flightsure_core::Amount(1)).unwrap()),
        LedgerError::InsufficientFunds { .. }
    );
    assert_eq!(ledger.fund(airline(0), TENTH).unwrap(), TENTH);
    assert!(ledger.airline(&airline(0)).unwrap().is_funded);
    assert_pool!(ledger, TENTH);
}

#[test]
fn membership_size_is_read_at_the_deciding_vote() {
    let mut fixture = LedgerBuilder::new().with_airlines(4).build();
    let slow = airline(10);
    fixture
        .ledger
        .register_airline(via_owner(airline(0)), slow, "Slow")
        .unwrap();

    // Membership grows to 6 while `slow` holds one vote.
    let members = fixture.airlines.clone();
    for n in 4..6 {
        vote_in(&mut fixture.ledger, &members, airline(n), "Fast");
        fixture.ledger.fund(airline(n), ONE).unwrap();
    }
    assert_eq!(fixture.ledger.registered_airline_count(), 6);

    // Two votes would have sufficed at n = 4; at n = 6 three are needed.
    let second = fixture
        .ledger
        .register_airline(via_owner(airline(1)), slow, "Slow")
        .unwrap();
    assert!(!second.is_admitted());
    let third = fixture
        .ledger
        .register_airline(via_owner(airline(2)), slow, "Slow")
        .unwrap();
    assert!(third.is_admitted());
}

proptest! {
    #[test]
    fn required_votes_is_smallest_half(n in 0usize..1000) {
        let v = required_votes(n);
        prop_assert!(v >= n - v);
        if v > 0 {
            prop_assert!(v - 1 < n - (v - 1));
        }
    }

    #[test]
    fn admission_takes_required_votes(members in arb_membership()) {
        let mut fixture = LedgerBuilder::new().with_airlines(members).build();
        let candidate = airline(100);
        let threshold = LedgerConfig::default().consensus_threshold;

        let mut cast = 0;
        for voter in fixture.airlines.clone() {
            cast += 1;
            let admission = fixture
                .ledger
                .register_airline(via_owner(voter), candidate, "Candidate")
                .unwrap();
            if admission.is_admitted() {
                break;
            }
        }

        let expected = if members < threshold { 1 } else { required_votes(members) };
        prop_assert_eq!(cast, expected);
        prop_assert_eq!(fixture.ledger.registered_airline_count(), members + 1);
    }
}
