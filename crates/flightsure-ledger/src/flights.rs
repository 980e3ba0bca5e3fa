//! Flight registry
//!
//! Flights live at `FlightKey::derive(airline, name, timestamp)`. The
//! insurance-key list on each flight is a back-reference into the insurance
//! pool, used to find the policies to credit.

use flightsure_core::{
    Address, FlightKey, FlightStatus, InsuranceKey, LedgerError, LedgerEvent, LedgerResult,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::access::AccessControl;
use crate::journal::Journal;

/// Flight record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    /// Derived key
    pub key: FlightKey,
    /// Owning airline
    pub airline: Address,
    /// Flight name
    pub name: String,
    /// Departure timestamp
    pub timestamp: u64,
    /// Latest status
    pub status: FlightStatus,
    /// Policies sold on this flight
    pub insurance_keys: Vec<InsuranceKey>,
}

/// Flight table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightRegistry {
    flights: BTreeMap<FlightKey, Flight>,
}

impl FlightRegistry {
    pub(crate) fn from_flights(flights: Vec<Flight>) -> Self {
        Self {
            flights: flights.into_iter().map(|f| (f.key, f)).collect(),
        }
    }

    /// Look up a flight
    pub fn get(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    /// All flights in key order
    pub fn flights(&self) -> impl Iterator<Item = &Flight> {
        self.flights.values()
    }

    /// Look up a flight or fail with `UnknownFlight`
    pub fn require(&self, key: &FlightKey) -> LedgerResult<&Flight> {
        self.flights
            .get(key)
            .ok_or(LedgerError::UnknownFlight { flight: *key })
    }

    /// Record a flight with unknown status and no policies.
    ///
    /// Re-registering the same triple replaces the record, including its
    /// policy back-references.
    pub fn register(
        &mut self,
        access: &AccessControl,
        airline: Address,
        name: &str,
        timestamp: u64,
        journal: &mut Journal,
    ) -> LedgerResult<FlightKey> {
        access.require_operational()?;
        if airline.is_null() {
            return Err(LedgerError::InvalidAddress);
        }
        let key = FlightKey::derive(&airline, name, timestamp);
        let replaced = self
            .flights
            .insert(
                key,
                Flight {
                    key,
                    airline,
                    name: name.to_string(),
                    timestamp,
                    status: FlightStatus::Unknown,
                    insurance_keys: Vec::new(),
                },
            )
            .is_some();
        if replaced {
            tracing::warn!(flight = %key, "flight re-registered; prior policy references dropped");
        }
        journal.record(LedgerEvent::FlightRegistered {
            flight: key,
            airline,
            name: name.to_string(),
            timestamp,
        });
        Ok(key)
    }

    /// Update the status of a flight owned by `caller`
    pub fn update_status(
        &mut self,
        access: &AccessControl,
        caller: &Address,
        key: &FlightKey,
        status: FlightStatus,
        journal: &mut Journal,
    ) -> LedgerResult<FlightStatus> {
        access.require_operational()?;
        let owner = self.require(key)?.airline;
        if owner != *caller {
            return Err(LedgerError::NotFlightOwner {
                caller: *caller,
                owner,
            });
        }
        self.set_status(key, status, journal)
    }

    /// Set the status without an ownership check. Returns the prior status.
    pub(crate) fn set_status(
        &mut self,
        key: &FlightKey,
        status: FlightStatus,
        journal: &mut Journal,
    ) -> LedgerResult<FlightStatus> {
        let flight = self
            .flights
            .get_mut(key)
            .ok_or(LedgerError::UnknownFlight { flight: *key })?;
        let previous = std::mem::replace(&mut flight.status, status);
        journal.record(LedgerEvent::FlightStatusUpdated {
            flight: *key,
            status,
        });
        Ok(previous)
    }

    pub(crate) fn attach_policy(
        &mut self,
        key: &FlightKey,
        insurance: InsuranceKey,
    ) -> LedgerResult<()> {
        let flight = self
            .flights
            .get_mut(key)
            .ok_or(LedgerError::UnknownFlight { flight: *key })?;
        flight.insurance_keys.push(insurance);
        Ok(())
    }
}
