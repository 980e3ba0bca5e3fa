//! Append-only event journal
//!
//! Events recorded during an operation are truncated away again if the
//! operation rolls back, so the journal only ever holds committed events.

use flightsure_core::LedgerEvent;

/// Committed event log of a ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    events: Vec<LedgerEvent>,
}

impl Journal {
    /// Append an event
    pub fn record(&mut self, event: LedgerEvent) {
        tracing::trace!(kind = event.kind(), "event recorded");
        self.events.push(event);
    }

    /// Number of events held
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are held
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in commit order
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take every held event, leaving the journal empty
    pub fn drain(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }
}
