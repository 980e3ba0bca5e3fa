//! Operational flag and authorized-caller registry
//!
//! Every other component receives an `&AccessControl` and runs its guards
//! before touching state. The flag toggle is the only mutation that works
//! while the ledger is halted, so a halted ledger can always be resumed.

use flightsure_core::{Address, LedgerError, LedgerEvent, LedgerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::journal::Journal;

/// Access control state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
    operational: bool,
    authorized: BTreeSet<Address>,
}

impl AccessControl {
    /// Operational access control whose owner is the only authorized caller
    pub fn new(owner: Address) -> Self {
        let mut authorized = BTreeSet::new();
        authorized.insert(owner);
        Self {
            owner,
            operational: true,
            authorized,
        }
    }

    pub(crate) fn from_parts(
        owner: Address,
        operational: bool,
        authorized: impl IntoIterator<Item = Address>,
    ) -> Self {
        Self {
            owner,
            operational,
            authorized: authorized.into_iter().collect(),
        }
    }

    /// Owning principal
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Current operational flag
    pub fn is_operational(&self) -> bool {
        self.operational
    }

    /// Whether `caller` is in the authorized-caller registry
    pub fn is_authorized(&self, caller: &Address) -> bool {
        self.authorized.contains(caller)
    }

    /// Authorized callers in address order
    pub fn authorized_callers(&self) -> impl Iterator<Item = &Address> {
        self.authorized.iter()
    }

    /// Guard: ledger must be operational
    pub fn require_operational(&self) -> LedgerResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(LedgerError::NotOperational)
        }
    }

    /// Guard: caller must be authorized
    pub fn require_authorized(&self, caller: &Address) -> LedgerResult<()> {
        if self.is_authorized(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { caller: *caller })
        }
    }

    /// Toggle the operational flag. Owner only; works while halted.
    pub fn set_operating_status(
        &mut self,
        caller: &Address,
        mode: bool,
        journal: &mut Journal,
    ) -> LedgerResult<()> {
        if *caller != self.owner {
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        self.operational = mode;
        journal.record(LedgerEvent::OperatingStatusChanged { operational: mode });
        Ok(())
    }

    /// Add `address` to the registry. Returns false if it was already present.
    pub fn authorize_caller(
        &mut self,
        caller: &Address,
        address: Address,
        journal: &mut Journal,
    ) -> LedgerResult<bool> {
        self.require_operational()?;
        self.require_authorized(caller)?;
        if address.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        let added = self.authorized.insert(address);
        if added {
            journal.record(LedgerEvent::CallerAuthorized { caller: address });
        }
        Ok(added)
    }

    /// Remove `address` from the registry. Returns false if it was absent.
    pub fn deauthorize_caller(
        &mut self,
        caller: &Address,
        address: Address,
        journal: &mut Journal,
    ) -> LedgerResult<bool> {
        self.require_operational()?;
        self.require_authorized(caller)?;
        if address.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        let removed = self.authorized.remove(&address);
        if removed {
            journal.record(LedgerEvent::CallerDeauthorized { caller: address });
        }
        Ok(removed)
    }
}
