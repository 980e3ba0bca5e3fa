//! Unified error type for ledger operations
//!
//! Every failing operation returns one of these variants to its immediate
//! caller. A failed operation never leaves partial state behind; the ledger
//! restores its pre-call snapshot before the error surfaces.

use crate::amount::Amount;
use crate::identifiers::{Address, FlightKey, OracleRequestKey};
use serde::{Deserialize, Serialize};

/// Error type for all ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    /// The operational flag is off
    #[error("Ledger is not operational")]
    NotOperational,

    /// Caller lacks the privilege required by the operation
    #[error("Unauthorized caller: {caller}")]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },

    /// Address is not a registered airline or oracle
    #[error("Not registered: {address}")]
    NotRegistered {
        /// Unknown participant
        address: Address,
    },

    /// Airline has not contributed the minimum funding fee
    #[error("Airline has not funded the pool: {airline}")]
    NotFunded {
        /// Unfunded airline
        airline: Address,
    },

    /// Address is already registered
    #[error("Already registered: {address}")]
    AlreadyRegistered {
        /// Existing participant
        address: Address,
    },

    /// Voter already cast a vote or response for this subject
    #[error("Duplicate vote from {voter}")]
    DuplicateVote {
        /// Repeat voter
        voter: Address,
    },

    /// Transferred value is below the required minimum
    #[error("Insufficient funds: required {required}, provided {provided}")]
    InsufficientFunds {
        /// Minimum required amount
        required: Amount,
        /// Amount offered
        provided: Amount,
    },

    /// Amount lies outside the accepted inclusive range
    #[error("Amount {amount} outside [{min}, {max}]")]
    AmountOutOfRange {
        /// Offered amount
        amount: Amount,
        /// Inclusive lower bound
        min: Amount,
        /// Inclusive upper bound
        max: Amount,
    },

    /// A policy already exists for this passenger and flight
    #[error("Passenger {passenger} already insured for {flight}")]
    AlreadyInsured {
        /// Insured passenger
        passenger: Address,
        /// Insured flight
        flight: FlightKey,
    },

    /// Withdrawal exceeds the passenger's credit
    #[error("Insufficient credit for {passenger}: requested {requested}, available {available}")]
    InsufficientCredit {
        /// Passenger withdrawing
        passenger: Address,
        /// Requested amount
        requested: Amount,
        /// Current credit balance
        available: Amount,
    },

    /// Null address where a participant was required
    #[error("Invalid address")]
    InvalidAddress,

    /// Caller does not own the flight
    #[error("Caller {caller} does not own flight (owner {owner})")]
    NotFlightOwner {
        /// Rejected caller
        caller: Address,
        /// Recorded owning airline
        owner: Address,
    },

    /// No flight recorded at the derived key
    #[error("Unknown flight: {flight}")]
    UnknownFlight {
        /// Missing flight
        flight: FlightKey,
    },

    /// Oracle answered with an index it was not assigned
    #[error("Oracle {oracle} does not hold index {index}")]
    OracleIndexMismatch {
        /// Responding oracle
        oracle: Address,
        /// Claimed index
        index: u8,
    },

    /// Oracle request is missing or already settled
    #[error("Oracle request closed: {request}")]
    RequestClosed {
        /// Request key
        request: OracleRequestKey,
    },

    /// Arithmetic overflow or underflow
    #[error("Arithmetic overflow: {message}")]
    Overflow {
        /// Expression that overflowed
        message: String,
    },

    /// Configuration rejected by validation
    #[error("Invalid config: {message}")]
    InvalidConfig {
        /// Validation failure
        message: String,
    },

    /// Snapshot or config (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Underlying error
        message: String,
    },

    /// Payout transfer to the recipient failed
    #[error("Transfer to {recipient} failed: {message}")]
    Transfer {
        /// Payout recipient
        recipient: Address,
        /// Reason reported by the sink
        message: String,
    },
}

impl LedgerError {
    /// Create an overflow error
    pub fn overflow(message: impl Into<String>) -> Self {
        Self::Overflow {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a transfer failure
    pub fn transfer(recipient: Address, message: impl Into<String>) -> Self {
        Self::Transfer {
            recipient,
            message: message.into(),
        }
    }

    /// Stable short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::NotOperational => "not_operational",
            LedgerError::Unauthorized { .. } => "unauthorized",
            LedgerError::NotRegistered { .. } => "not_registered",
            LedgerError::NotFunded { .. } => "not_funded",
            LedgerError::AlreadyRegistered { .. } => "already_registered",
            LedgerError::DuplicateVote { .. } => "duplicate_vote",
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::AmountOutOfRange { .. } => "amount_out_of_range",
            LedgerError::AlreadyInsured { .. } => "already_insured",
            LedgerError::InsufficientCredit { .. } => "insufficient_credit",
            LedgerError::InvalidAddress => "invalid_address",
            LedgerError::NotFlightOwner { .. } => "not_flight_owner",
            LedgerError::UnknownFlight { .. } => "unknown_flight",
            LedgerError::OracleIndexMismatch { .. } => "oracle_index_mismatch",
            LedgerError::RequestClosed { .. } => "request_closed",
            LedgerError::Overflow { .. } => "overflow",
            LedgerError::InvalidConfig { .. } => "invalid_config",
            LedgerError::Serialization { .. } => "serialization",
            LedgerError::Transfer { .. } => "transfer",
        }
    }
}

/// Standard result type for ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::invalid_config(format!("io: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientCredit {
            passenger: Address::ZERO,
            requested: Amount(80),
            available: Amount(70),
        };
        assert!(err.to_string().starts_with("Insufficient credit"));
        assert_eq!(err.kind(), "insufficient_credit");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<u8>("not json").unwrap_err();
        assert!(matches!(
            LedgerError::from(json_err),
            LedgerError::Serialization { .. }
        ));
    }

    #[test]
    fn test_result_type() {
        fn test_function() -> LedgerResult<i32> {
            Ok(42)
        }

        assert_eq!(test_function().unwrap(), 42);
    }
}
