//! Balance movement properties for funding and payouts

#![allow(clippy::unwrap_used)]

use flightsure_core::{Amount, LedgerError, UNIT};
use flightsure_ledger::DiscardSink;
use flightsure_testkit::*;
use proptest::prelude::*;

const FLIGHT_TS: u64 = 1_700_000_000;

proptest! {
    #[test]
    fn funding_only_ever_adds_the_amount_given(
        amounts in prop::collection::vec(0u128..=2 * UNIT, 1..10)
    ) {
        let mut fixture = LedgerBuilder::new().build();
        let min_fee = fixture.ledger.config().min_funding_fee;
        let member = airline(0);

        for amount in amounts.into_iter().map(Amount) {
            let pool = fixture.ledger.pooled_balance();
            let contributed = fixture.ledger.airline(&member).unwrap().funds_contributed;
            let result = fixture.ledger.fund(member, amount);

            let after_pool = fixture.ledger.pooled_balance();
            let after_contributed = fixture.ledger.airline(&member).unwrap().funds_contributed;
            if amount < min_fee {
                prop_assert!(
                    matches!(result, Err(LedgerError::InsufficientFunds { .. })),
                    "expected rejection below the minimum fee"
                );
                prop_assert_eq!(after_pool, pool);
                prop_assert_eq!(after_contributed, contributed);
            } else {
                prop_assert_eq!(result.unwrap(), after_contributed);
                prop_assert_eq!(after_pool, pool.checked_add(amount).unwrap());
                prop_assert_eq!(after_contributed, contributed.checked_add(amount).unwrap());
            }
        }
    }

    #[test]
    fn pay_moves_exactly_the_requested_amount(
        premium in 1u128..=UNIT,
        requests in prop::collection::vec(0u128..=UNIT, 1..8)
    ) {
        let mut fixture = LedgerBuilder::new()
            .with_flight("FS100", FLIGHT_TS)
            .build();
        let p = passenger(1);
        fixture.insure(p, 0, Amount(premium));
        fixture.credit(0);

        for amount in requests.into_iter().map(Amount) {
            let before = fixture.ledger.snapshot();
            let credit = fixture.ledger.credit_of(&p);
            let pool = fixture.ledger.pooled_balance();

            match fixture.ledger.pay(p, amount, &mut DiscardSink) {
                Ok(payout) => {
                    let remaining = credit.checked_sub(amount).unwrap();
                    prop_assert_eq!(payout.remaining_credit, remaining);
                    prop_assert_eq!(fixture.ledger.credit_of(&p), remaining);
                    prop_assert_eq!(
                        fixture.ledger.pooled_balance(),
                        pool.checked_sub(amount).unwrap()
                    );
                }
                Err(err) => {
                    prop_assert!(amount > credit, "unexpected failure: {err}");
                    prop_assert_eq!(fixture.ledger.snapshot(), before);
                }
            }
        }
    }
}
