// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-time device state.

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::protocol::codec::RetrieveReply;
use crate::types::BoilerStatus;

/// One complete read of thermostat state, obtained in a single retrieve exchange.
///
/// Temperatures are in °C, pressure in bar.
///
/// # Examples
///
/// ```
/// use atag_lib::state::DeviceSnapshot;
/// use atag_lib::types::BoilerStatus;
///
/// let snapshot = DeviceSnapshot::new("AABBCCDDEEFF", 20.5, 21.0, 1.6)
///     .with_boiler(BoilerStatus { heating: true, hot_water: false, flame: true });
///
/// assert!(snapshot.is_heating());
/// assert_eq!(snapshot.pressure(), 1.6);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceSnapshot {
    identifier: String,
    room_temperature: f64,
    target_temperature: f64,
    outside_temperature: Option<f64>,
    pressure: f64,
    boiler: BoilerStatus,
    retrieved_at: DateTime<Utc>,
}

impl DeviceSnapshot {
    /// Creates a snapshot with an idle boiler and no outside temperature.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        room_temperature: f64,
        target_temperature: f64,
        pressure: f64,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            room_temperature,
            target_temperature,
            outside_temperature: None,
            pressure,
            boiler: BoilerStatus::default(),
            retrieved_at: Utc::now(),
        }
    }

    /// Sets the outside temperature.
    #[must_use]
    pub fn with_outside_temperature(mut self, celsius: f64) -> Self {
        self.outside_temperature = Some(celsius);
        self
    }

    /// Sets the boiler status.
    #[must_use]
    pub fn with_boiler(mut self, boiler: BoilerStatus) -> Self {
        self.boiler = boiler;
        self
    }

    /// Assembles a snapshot from a decoded retrieve reply.
    ///
    /// `fallback_identifier` is used when the reply has no `status.device_id`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingField` if the reply lacks the report or
    /// control values a snapshot needs.
    pub fn from_reply(
        reply: &RetrieveReply,
        fallback_identifier: &str,
    ) -> Result<Self, ParseError> {
        let missing = |field: &str| ParseError::MissingField(field.to_string());

        let report = reply.report.as_ref().ok_or_else(|| missing("report"))?;
        let control = reply.control.as_ref().ok_or_else(|| missing("control"))?;

        let identifier = reply
            .status
            .as_ref()
            .and_then(|s| s.device_id.clone())
            .unwrap_or_else(|| fallback_identifier.to_string());

        Ok(Self {
            identifier,
            room_temperature: report.room_temp.ok_or_else(|| missing("report.room_temp"))?,
            target_temperature: control
                .ch_mode_temp
                .ok_or_else(|| missing("control.ch_mode_temp"))?,
            outside_temperature: report.outside_temp,
            pressure: report
                .ch_water_pres
                .ok_or_else(|| missing("report.ch_water_pres"))?,
            boiler: report
                .boiler()
                .ok_or_else(|| missing("report.boiler_status"))?,
            retrieved_at: Utc::now(),
        })
    }

    /// Returns the identifier the device reported, or the configured one.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the room temperature in °C.
    #[must_use]
    pub fn room_temperature(&self) -> f64 {
        self.room_temperature
    }

    /// Returns the heating setpoint in °C.
    #[must_use]
    pub fn target_temperature(&self) -> f64 {
        self.target_temperature
    }

    /// Returns the outside temperature in °C, if the device has a sensor.
    #[must_use]
    pub fn outside_temperature(&self) -> Option<f64> {
        self.outside_temperature
    }

    /// Returns the central-heating water pressure in bar.
    #[must_use]
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Returns the decoded boiler flags.
    #[must_use]
    pub fn boiler(&self) -> BoilerStatus {
        self.boiler
    }

    /// Returns `true` if central heating is active.
    #[must_use]
    pub fn is_heating(&self) -> bool {
        self.boiler.heating
    }

    /// Returns `true` if hot water is being produced.
    #[must_use]
    pub fn is_hot_water_active(&self) -> bool {
        self.boiler.hot_water
    }

    /// Returns `true` if the burner flame is on.
    #[must_use]
    pub fn is_flame_on(&self) -> bool {
        self.boiler.flame
    }

    /// Returns when this snapshot was assembled.
    #[must_use]
    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}
