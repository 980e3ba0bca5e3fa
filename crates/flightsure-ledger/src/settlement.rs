//! Pooled balance and payout transfers
//!
//! The pool backs both airline stakes and passenger payouts. It grows
//! through `fund` and `buy` and shrinks only through `pay`.
//!
//! `pay` is debit-then-transfer: credit and pool are reduced before the
//! [`PayoutSink`] runs. The sink receives `&mut Ledger` and may execute
//! arbitrary operations, including another `pay` for the same passenger;
//! it only ever sees the post-debit balances.

use flightsure_core::{Address, Amount, LedgerError, LedgerEvent, LedgerResult};
use serde::{Deserialize, Serialize};

use crate::journal::Journal;
use crate::ledger::Ledger;

/// Pooled balance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementLedger {
    pool: Amount,
}

impl SettlementLedger {
    pub(crate) fn with_balance(pool: Amount) -> Self {
        Self { pool }
    }

    /// Current pooled balance
    pub fn balance(&self) -> Amount {
        self.pool
    }

    /// Add `amount` received from `from`
    pub fn deposit(
        &mut self,
        from: Address,
        amount: Amount,
        journal: &mut Journal,
    ) -> LedgerResult<Amount> {
        self.pool = self.pool.checked_add(amount)?;
        journal.record(LedgerEvent::FundsReceived {
            from,
            amount,
            pool_balance: self.pool,
        });
        Ok(self.pool)
    }

    /// Remove `amount` bound for `to`
    pub fn withdraw(&mut self, to: Address, amount: Amount) -> LedgerResult<Amount> {
        if amount > self.pool {
            tracing::warn!(recipient = %to, %amount, pool = %self.pool, "pool cannot cover payout");
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                provided: self.pool,
            });
        }
        self.pool = self.pool.checked_sub(amount)?;
        Ok(self.pool)
    }
}

/// A debited payout about to be transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Recipient passenger
    pub passenger: Address,
    /// Amount leaving the pool
    pub amount: Amount,
    /// Passenger credit left after the debit
    pub remaining_credit: Amount,
}

/// Transfer effect executed after a payout is debited.
///
/// Returning an error aborts the whole `pay`: the debit is undone and no
/// event is committed.
pub trait PayoutSink {
    /// Deliver `payout` to its recipient
    fn transfer(&mut self, ledger: &mut Ledger, payout: &Payout) -> LedgerResult<()>;
}

/// Sink that accepts every transfer without side effects
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl PayoutSink for DiscardSink {
    fn transfer(&mut self, _ledger: &mut Ledger, _payout: &Payout) -> LedgerResult<()> {
        Ok(())
    }
}

impl<F> PayoutSink for F
where
    F: FnMut(&mut Ledger, &Payout) -> LedgerResult<()>,
{
    fn transfer(&mut self, ledger: &mut Ledger, payout: &Payout) -> LedgerResult<()> {
        self(ledger, payout)
    }
}
