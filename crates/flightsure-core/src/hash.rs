//! Pure synchronous hashing for key derivation
//!
//! Every lookup key in the ledger (flight, insurance, oracle request) is a
//! digest over a canonical, domain-tagged byte encoding of its natural key.
//! Callers go through [`hash`] for labels and [`KeyEncoder`] for composite
//! keys; both are SHA-256.
//!
//! # Usage
//!
//! ```
//! use flightsure_core::hash::KeyEncoder;
//!
//! let a = KeyEncoder::new("flight").str("FS100").u64(1_700_000_000).finish();
//! let b = KeyEncoder::new("flight").str("FS100").u64(1_700_000_000).finish();
//! assert_eq!(a, b);
//! ```

use crate::identifiers::Hash32;
use sha2::{Digest, Sha256};

/// SHA-256 of `data`
pub fn hash(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Canonical encoder for composite keys.
///
/// The domain tag and every variable-length field are length-prefixed, so
/// `("ab", "c")` and `("a", "bc")` never encode to the same byte stream.
/// Fixed-width integers are written big-endian.
pub struct KeyEncoder {
    inner: Sha256,
}

impl KeyEncoder {
    /// Start a key in the given domain
    pub fn new(domain: &str) -> Self {
        let mut inner = Sha256::new();
        inner.update(b"flightsure/key/v1");
        let mut encoder = Self { inner };
        encoder.write_prefixed(domain.as_bytes());
        encoder
    }

    fn write_prefixed(&mut self, bytes: &[u8]) {
        self.inner.update(&(bytes.len() as u64).to_be_bytes());
        self.inner.update(bytes);
    }

    /// Append a length-prefixed byte field
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.write_prefixed(bytes);
        self
    }

    /// Append a UTF-8 string field
    pub fn str(self, value: &str) -> Self {
        self.bytes(value.as_bytes())
    }

    /// Append a big-endian u64
    pub fn u64(mut self, value: u64) -> Self {
        self.inner.update(&value.to_be_bytes());
        self
    }

    /// Append a single byte
    pub fn u8(mut self, value: u8) -> Self {
        self.inner.update(&[value]);
        self
    }

    /// Finish the key
    pub fn finish(self) -> Hash32 {
        Hash32::new(self.inner.finalize().into())
    }
}
