//! Assertion macros for ledger tests

/// Assert that a result failed with an error matching `pattern`
#[macro_export]
macro_rules! assert_ledger_error {
    ($result:expr, $pattern:pat) => {
        match $result {
            Err(ref err) if matches!(err, $pattern) => {}
            Err(ref err) => panic!(
                "expected error matching {}, got {:?}",
                stringify!($pattern),
                err
            ),
            Ok(ref value) => panic!(
                "expected error matching {}, operation succeeded with {:?}",
                stringify!($pattern),
                value
            ),
        }
    };
}

/// Assert the pooled balance in base units
#[macro_export]
macro_rules! assert_pool {
    ($ledger:expr, $expected:expr) => {
        assert_eq!(
            $ledger.pooled_balance(),
            $expected,
            "pooled balance mismatch"
        )
    };
}

/// Assert a passenger's credit balance
#[macro_export]
macro_rules! assert_credit {
    ($ledger:expr, $passenger:expr, $expected:expr) => {
        assert_eq!(
            $ledger.credit_of(&$passenger),
            $expected,
            "credit mismatch for {}",
            $passenger
        )
    };
}

/// Assert that running `$body` left ledger state and journal untouched
#[macro_export]
macro_rules! assert_unchanged {
    ($ledger:expr, $body:block) => {{
        let before = $ledger.snapshot();
        let events_before = $ledger.events().len();
        let outcome = $body;
        assert_eq!($ledger.snapshot(), before, "ledger state changed");
        assert_eq!($ledger.events().len(), events_before, "events were committed");
        outcome
    }};
}
