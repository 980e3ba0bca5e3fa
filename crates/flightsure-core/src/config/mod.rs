//! Ledger configuration
//!
//! Economic constants and oracle parameters. Loaded from TOML, optionally
//! overridden by `FLIGHTSURE_*` environment variables, and validated before a
//! ledger is constructed.
//!
//! ```toml
//! min_funding_fee = 100000000000000000
//! insurance_cap = 1000000000000000000
//! consensus_threshold = 4
//!
//! [oracle]
//! min_responses = 3
//! ```

pub mod validation;

pub use validation::{ConfigValidator, ValidationError};

use crate::amount::{Amount, UNIT};
use crate::errors::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "FLIGHTSURE_";

/// Economic and governance parameters of a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Minimum contribution accepted by `fund`
    pub min_funding_fee: Amount,
    /// Smallest accepted premium
    pub min_premium: Amount,
    /// Largest accepted premium (inclusive)
    pub insurance_cap: Amount,
    /// Payout multiplier numerator
    pub payout_numerator: u64,
    /// Payout multiplier denominator
    pub payout_denominator: u64,
    /// Registered-airline count from which admission requires voting
    pub consensus_threshold: usize,
    /// Oracle network parameters
    pub oracle: OracleConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_funding_fee: Amount::fraction(1, 10),
            min_premium: Amount::from_base(1),
            insurance_cap: Amount::from_base(UNIT),
            payout_numerator: 3,
            payout_denominator: 2,
            consensus_threshold: 4,
            oracle: OracleConfig::default(),
        }
    }
}

/// Oracle network parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleConfig {
    /// Fee to register an oracle
    pub registration_fee: Amount,
    /// Matching responses needed to settle a request
    pub min_responses: usize,
    /// Indexes are drawn from `0..index_space`
    pub index_space: u8,
    /// Seed for index assignment
    pub seed: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            registration_fee: Amount::units(1),
            min_responses: 3,
            index_space: 10,
            seed: 0,
        }
    }
}

impl LedgerConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> LedgerResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> LedgerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `FLIGHTSURE_*` variables from the process environment
    pub fn merge_with_env(&mut self) -> LedgerResult<()> {
        self.merge_with_os_vars(std::env::vars_os())
    }

    /// Apply overrides from raw OS pairs.
    ///
    /// Names outside the prefix are skipped whatever their encoding; a
    /// prefixed name or value that is not UTF-8 is a config error.
    pub fn merge_with_os_vars<I>(&mut self, vars: I) -> LedgerResult<()>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut overrides = Vec::new();
        for (name, value) in vars {
            if !name.to_string_lossy().starts_with(ENV_PREFIX) {
                continue;
            }
            let name = name.into_string().map_err(|raw| {
                LedgerError::invalid_config(format!(
                    "variable name {} is not valid UTF-8",
                    raw.to_string_lossy()
                ))
            })?;
            let value = value.into_string().map_err(|_| {
                LedgerError::invalid_config(format!("{name}: value is not valid UTF-8"))
            })?;
            overrides.push((name, value));
        }
        self.merge_with_vars(overrides)
    }

    /// Apply overrides from `(name, value)` pairs.
    ///
    /// `FLIGHTSURE_INSURANCE_CAP` sets `insurance_cap`;
    /// `FLIGHTSURE_ORACLE_MIN_RESPONSES` sets `oracle.min_responses`.
    /// Variables without the prefix are ignored.
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> LedgerResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in vars {
            let Some(key) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = key.to_lowercase();
            let key = match key.strip_prefix("oracle_") {
                Some(rest) => format!("oracle.{rest}"),
                None => key,
            };
            self.set_from_string(&key, value.as_ref())?;
            tracing::debug!(key = %key, "config override applied from environment");
        }
        Ok(())
    }

    /// Set a single value by dotted key
    pub fn set_from_string(&mut self, key: &str, value: &str) -> LedgerResult<()> {
        match key {
            "min_funding_fee" => self.min_funding_fee = Amount(parse(key, value)?),
            "min_premium" => self.min_premium = Amount(parse(key, value)?),
            "insurance_cap" => self.insurance_cap = Amount(parse(key, value)?),
            "payout_numerator" => self.payout_numerator = parse(key, value)?,
            "payout_denominator" => self.payout_denominator = parse(key, value)?,
            "consensus_threshold" => self.consensus_threshold = parse(key, value)?,
            "oracle.registration_fee" => self.oracle.registration_fee = Amount(parse(key, value)?),
            "oracle.min_responses" => self.oracle.min_responses = parse(key, value)?,
            "oracle.index_space" => self.oracle.index_space = parse(key, value)?,
            "oracle.seed" => self.oracle.seed = parse(key, value)?,
            other => {
                return Err(LedgerError::invalid_config(format!(
                    "unknown config key '{other}'"
                )))
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> LedgerResult<()> {
        let mut validator = ConfigValidator::new();
        validator
            .at_least("min_premium", self.min_premium.base(), 1)
            .ordered(
                "min_premium",
                self.min_premium.base(),
                "insurance_cap",
                self.insurance_cap.base(),
            )
            .at_least("payout_denominator", u128::from(self.payout_denominator), 1)
            .at_least("consensus_threshold", self.consensus_threshold as u128, 1);

        let mut oracle = validator.for_field("oracle");
        oracle
            .at_least("min_responses", self.oracle.min_responses as u128, 1)
            .at_least("index_space", u128::from(self.oracle.index_space), 3);
        validator.merge(oracle);

        validator.finish()
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> LedgerResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| LedgerError::invalid_config(format!("{key}: {e}")))
}
