//! Payout sinks with scripted behaviour

use flightsure_core::{LedgerError, LedgerResult};
use flightsure_ledger::{Ledger, Payout, PayoutSink};

/// Accepts every transfer and remembers it
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Transfers in delivery order
    pub payouts: Vec<Payout>,
}

impl PayoutSink for RecordingSink {
    fn transfer(&mut self, _ledger: &mut Ledger, payout: &Payout) -> LedgerResult<()> {
        self.payouts.push(*payout);
        Ok(())
    }
}

/// Rejects every transfer
#[derive(Debug, Clone, Default)]
pub struct FailingSink {
    /// Transfers attempted
    pub attempts: usize,
}

impl PayoutSink for FailingSink {
    fn transfer(&mut self, _ledger: &mut Ledger, payout: &Payout) -> LedgerResult<()> {
        self.attempts += 1;
        Err(LedgerError::transfer(payout.passenger, "recipient rejected transfer"))
    }
}

/// Calls `pay` again for the same passenger and amount from inside the
/// transfer, up to `max_depth` nested times.
///
/// Nested results are recorded and swallowed so the outer payout still
/// completes; tests inspect them to confirm no withdrawal exceeded credit.
#[derive(Debug, Clone)]
pub struct ReentrantSink {
    max_depth: usize,
    depth: usize,
    /// Outcome of every nested `pay`, innermost last
    pub nested: Vec<LedgerResult<Payout>>,
    /// Transfers that completed
    pub delivered: Vec<Payout>,
}

impl ReentrantSink {
    /// Re-enter at most `max_depth` times
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            depth: 0,
            nested: Vec::new(),
            delivered: Vec::new(),
        }
    }

    /// Nested withdrawals that succeeded
    pub fn nested_successes(&self) -> usize {
        self.nested.iter().filter(|result| result.is_ok()).count()
    }
}

impl PayoutSink for ReentrantSink {
    fn transfer(&mut self, ledger: &mut Ledger, payout: &Payout) -> LedgerResult<()> {
        if self.depth < self.max_depth {
            self.depth += 1;
            let result = ledger.pay(payout.passenger, payout.amount, self);
            self.nested.push(result);
        }
        self.delivered.push(*payout);
        Ok(())
    }
}
