//! Thread-shared ledger handle
//!
//! ## Lock Usage
//!
//! Uses `parking_lot::Mutex` because every ledger operation is synchronous
//! and the lock is never held across an await point. One lock covers the
//! whole ledger so each operation, including the payout sink it drives,
//! observes and commits a single consistent state.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::ledger::Ledger;

/// Cloneable handle serializing access to one [`Ledger`]
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    /// Wrap a ledger
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access
    pub fn execute<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Run `f` against the current state
    pub fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        let guard = self.inner.lock();
        f(&guard)
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
