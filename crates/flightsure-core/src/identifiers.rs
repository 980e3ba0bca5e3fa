//! Core identifier types used across the ledger
//!
//! Accounts are plain 20-byte addresses. Flights, policies and oracle
//! requests are addressed by digests derived from their natural keys, so the
//! digest is an index over the tuple and never independent state.

use crate::hash::{self, KeyEncoder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 32-byte digest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// Wrap raw digest bytes
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex encoding of the digest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Account address for airlines, passengers, oracles and operators
///
/// The all-zero address is the null address and is rejected wherever a real
/// participant is expected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The null address
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive a stable address from a label.
    ///
    /// Used for fixtures and for operators that have no external key.
    pub fn derived(label: &[u8]) -> Self {
        let digest = hash::hash(label);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[12..]);
        Self(bytes)
    }

    /// Whether this is the null address
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_str = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(hex_str)?;
        if bytes.len() != 20 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut array = [0u8; 20];
        array.copy_from_slice(&bytes);
        Ok(Address(array))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

/// Flight key: digest of (airline, flight name, departure timestamp)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct FlightKey(pub Hash32);

impl FlightKey {
    /// Derive the key for a flight triple
    pub fn derive(airline: &Address, flight: &str, timestamp: u64) -> Self {
        Self(
            KeyEncoder::new("flight")
                .bytes(airline.as_bytes())
                .str(flight)
                .u64(timestamp)
                .finish(),
        )
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flight:{}", self.0)
    }
}

/// Insurance key: digest of (passenger, flight key)
///
/// At most one policy exists per key, hence per passenger and flight.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct InsuranceKey(pub Hash32);

impl InsuranceKey {
    /// Derive the key for a passenger's policy on a flight
    pub fn derive(passenger: &Address, flight: &FlightKey) -> Self {
        Self(
            KeyEncoder::new("insurance")
                .bytes(passenger.as_bytes())
                .bytes(flight.as_bytes())
                .finish(),
        )
    }
}

impl fmt::Display for InsuranceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insurance:{}", self.0)
    }
}

/// Oracle request key: digest of (index, flight key)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct OracleRequestKey(pub Hash32);

impl OracleRequestKey {
    /// Derive the key for a status request routed to `index`
    pub fn derive(index: u8, flight: &FlightKey) -> Self {
        Self(
            KeyEncoder::new("oracle-request")
                .u8(index)
                .bytes(flight.as_bytes())
                .finish(),
        )
    }
}

impl fmt::Display for OracleRequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "oracle-request:{}", self.0)
    }
}
