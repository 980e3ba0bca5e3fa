//! Value amounts in base units
//!
//! All balances are integer counts of base units. One whole unit is
//! [`UNIT`] base units, so "0.1 unit" is `UNIT / 10`.

use crate::errors::{LedgerError, LedgerResult};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Base units per whole unit
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Non-negative amount of value in base units
///
/// Serializes as an integer when it fits in `u64` and as a decimal string
/// otherwise, so TOML and JSON both carry full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Amount(pub u128);

impl Amount {
    /// Zero
    pub const ZERO: Amount = Amount(0);

    /// Amount from base units
    pub const fn from_base(base: u128) -> Self {
        Self(base)
    }

    /// Whole units
    pub const fn units(units: u128) -> Self {
        Self(units * UNIT)
    }

    /// Fraction of a unit expressed as `numerator / denominator`
    pub const fn fraction(numerator: u128, denominator: u128) -> Self {
        Self(UNIT * numerator / denominator)
    }

    /// Raw base-unit value
    pub fn base(&self) -> u128 {
        self.0
    }

    /// Whether this amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Amount) -> LedgerResult<Amount> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| LedgerError::overflow(format!("{self} + {other}")))
    }

    /// Checked subtraction; fails rather than going negative
    pub fn checked_sub(self, other: Amount) -> LedgerResult<Amount> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| LedgerError::overflow(format!("{self} - {other}")))
    }

    /// Scale by `numerator / denominator`, truncating toward zero
    pub fn scale(self, numerator: u128, denominator: u128) -> LedgerResult<Amount> {
        if denominator == 0 {
            return Err(LedgerError::invalid_config("ratio denominator is zero"));
        }
        self.0
            .checked_mul(numerator)
            .map(|scaled| Amount(scaled / denominator))
            .ok_or_else(|| LedgerError::overflow(format!("{self} * {numerator}/{denominator}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNIT;
        let frac = self.0 % UNIT;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let digits = format!("{frac:018}");
            write!(f, "{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(self.0) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a non-negative integer amount or decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(u128::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        u128::try_from(v)
            .map(Amount)
            .map_err(|_| E::custom(format!("negative amount {v}")))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
        Ok(Amount(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse::<u128>()
            .map(Amount)
            .map_err(|e| E::custom(format!("invalid amount '{v}': {e}")))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

impl From<u128> for Amount {
    fn from(base: u128) -> Self {
        Self(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_fractional_units() {
        assert_eq!(Amount::units(1).to_string(), "1");
        assert_eq!(Amount::fraction(1, 10).to_string(), "0.1");
        assert_eq!(Amount::from_base(1).to_string(), "0.000000000000000001");
    }

    #[test]
    fn scale_truncates_toward_zero() {
        assert_eq!(Amount(3).scale(3, 2).unwrap(), Amount(4));
        assert_eq!(Amount(1).scale(3, 2).unwrap(), Amount(1));
        assert_eq!(Amount(100).scale(3, 2).unwrap(), Amount(150));
    }

    #[test]
    fn checked_sub_refuses_to_go_negative() {
        assert!(Amount(5).checked_sub(Amount(6)).is_err());
        assert_eq!(Amount(5).checked_sub(Amount(5)).unwrap(), Amount::ZERO);
    }

    #[test]
    fn large_amounts_survive_json() {
        let big = Amount(u128::from(u64::MAX) * 4);
        let json = serde_json::to_string(&big).unwrap();
        assert!(json.starts_with('"'));
        assert_eq!(serde_json::from_str::<Amount>(&json).unwrap(), big);
        assert_eq!(serde_json::to_string(&Amount(7)).unwrap(), "7");
        assert_eq!(serde_json::from_str::<Amount>("7").unwrap(), Amount(7));
    }

    #[test]
    fn checked_add_detects_overflow() {
        assert!(Amount(u128::MAX).checked_add(Amount(1)).is_err());
    }
}
