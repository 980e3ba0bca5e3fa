//! Call context for operations that care who is calling

use crate::identifiers::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who submitted an operation and on whose behalf.
///
/// `origin` is the submitting process and is what the authorized-caller
/// registry checks. `sender` is the acting account (an airline or a
/// passenger). An orchestrator relaying for an airline is authorized without
/// being an airline itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallContext {
    /// Submitting process
    pub origin: Address,
    /// Acting account
    pub sender: Address,
}

impl CallContext {
    /// Account acting for itself
    pub fn direct(account: Address) -> Self {
        Self {
            origin: account,
            sender: account,
        }
    }

    /// Authorized `origin` relaying an operation for `sender`
    pub fn relayed(origin: Address, sender: Address) -> Self {
        Self { origin, sender }
    }
}

impl fmt::Display for CallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.origin == self.sender {
            write!(f, "{}", self.sender)
        } else {
            write!(f, "{} via {}", self.sender, self.origin)
        }
    }
}
