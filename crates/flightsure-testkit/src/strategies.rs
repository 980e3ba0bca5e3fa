//! Property test strategies for flightsure types

use proptest::prelude::*;

pub use proptest;

use flightsure_core::{Address, Amount, FlightStatus, UNIT};

/// Addresses derived from small seeds; never null
pub fn arb_address() -> impl Strategy<Value = Address> {
    (0u32..10_000).prop_map(|seed| Address::derived(format!("arb/{seed}").as_bytes()))
}

/// Premiums inside the default purchase bounds `[1, UNIT]`
pub fn arb_premium() -> impl Strategy<Value = Amount> {
    prop_oneof![
        Just(Amount(1)),
        Just(Amount(UNIT)),
        (1u128..=UNIT).prop_map(Amount),
    ]
}

/// Any status code, named or not
pub fn arb_status() -> impl Strategy<Value = FlightStatus> {
    any::<u8>().prop_map(FlightStatus::from_code)
}

/// Membership sizes around the default threshold
pub fn arb_membership() -> impl Strategy<Value = usize> {
    1usize..=12
}
