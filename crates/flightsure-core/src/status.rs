//! Flight status codes
//!
//! Codes travel as raw `u8` between oracles and the ledger. Known codes get
//! a named variant; anything else is kept verbatim in [`UnnamedCode`], which
//! only [`FlightStatus::from_code`] can build. Every code therefore has exactly
//! one representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a flight as reported by its airline or the oracle network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "u8", into = "u8")]
pub enum FlightStatus {
    /// No report yet
    #[default]
    Unknown,
    /// Departed on time
    OnTime,
    /// Delayed, airline at fault; the only status that pays out
    LateAirline,
    /// Delayed by weather
    LateWeather,
    /// Delayed by a technical fault
    LateTechnical,
    /// Delayed for another reason
    LateOther,
    /// Unrecognised code
    Other(UnnamedCode),
}

/// Wire code with no named [`FlightStatus`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnnamedCode(u8);

impl UnnamedCode {
    /// Raw code
    pub fn get(self) -> u8 {
        self.0
    }
}

impl FlightStatus {
    /// Wire code for this status
    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
            FlightStatus::Other(code) => code.get(),
        }
    }

    /// Parse a wire code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => FlightStatus::Unknown,
            10 => FlightStatus::OnTime,
            20 => FlightStatus::LateAirline,
            30 => FlightStatus::LateWeather,
            40 => FlightStatus::LateTechnical,
            50 => FlightStatus::LateOther,
            other => FlightStatus::Other(UnnamedCode(other)),
        }
    }

    /// Whether passengers holding policies on the flight are owed a payout
    pub fn triggers_payout(&self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }
}

impl From<u8> for FlightStatus {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl From<FlightStatus> for u8 {
    fn from(status: FlightStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightStatus::Unknown => write!(f, "unknown"),
            FlightStatus::OnTime => write!(f, "on-time"),
            FlightStatus::LateAirline => write!(f, "late-airline"),
            FlightStatus::LateWeather => write!(f, "late-weather"),
            FlightStatus::LateTechnical => write!(f, "late-technical"),
            FlightStatus::LateOther => write!(f, "late-other"),
            FlightStatus::Other(code) => write!(f, "code-{}", code.get()),
        }
    }
}
