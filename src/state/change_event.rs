// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change events derived from consecutive snapshots.
//!
//! # Events
//!
//! - [`ChangeEvent::RoomTemperatureChanged`] - room temperature differs
//! - [`ChangeEvent::TargetTemperatureChanged`] - setpoint differs
//! - [`ChangeEvent::PressureChanged`] - water pressure differs
//! - [`ChangeEvent::PressureBelowThreshold`] - emitted on every comparison,
//!   so threshold subscribers can evaluate each new pressure reading
//! - [`ChangeEvent::BoilerStarted`] / [`ChangeEvent::BoilerStopped`] -
//!   central-heating flag transitions
//!
//! Hot-water and flame changes are visible in the snapshot but produce no
//! event of their own.
//!
//! # Examples
//!
//! ```
//! use atag_lib::state::{ChangeEvent, DeviceSnapshot};
//!
//! let before = DeviceSnapshot::new("id", 20.0, 21.0, 1.5);
//! let after = DeviceSnapshot::new("id", 20.5, 21.0, 1.5);
//!
//! let events = ChangeEvent::diff(&before, &after);
//! assert_eq!(
//!     events,
//!     vec![
//!         ChangeEvent::RoomTemperatureChanged(20.5),
//!         ChangeEvent::PressureBelowThreshold(1.5),
//!     ]
//! );
//! ```

use super::DeviceSnapshot;

/// A discrete change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ChangeEvent {
    /// Room temperature changed (°C).
    RoomTemperatureChanged(f64),

    /// Heating setpoint changed (°C).
    TargetTemperatureChanged(f64),

    /// Water pressure changed (bar).
    PressureChanged(f64),

    /// Latest water pressure (bar), for threshold evaluation downstream.
    PressureBelowThreshold(f64),

    /// Central heating switched on.
    BoilerStarted,

    /// Central heating switched off.
    BoilerStopped,
}

impl ChangeEvent {
    /// Computes the events between `previous` and `current`.
    ///
    /// Values are compared exactly: the device reports rounded readings, so
    /// any difference is a real change.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn diff(previous: &DeviceSnapshot, current: &DeviceSnapshot) -> Vec<Self> {
        let mut events = Vec::new();

        if previous.room_temperature() != current.room_temperature() {
            events.push(Self::RoomTemperatureChanged(current.room_temperature()));
        }
        if previous.target_temperature() != current.target_temperature() {
            events.push(Self::TargetTemperatureChanged(current.target_temperature()));
        }
        if previous.pressure() != current.pressure() {
            events.push(Self::PressureChanged(current.pressure()));
        }
        events.push(Self::PressureBelowThreshold(current.pressure()));

        match (previous.is_heating(), current.is_heating()) {
            (false, true) => events.push(Self::BoilerStarted),
            (true, false) => events.push(Self::BoilerStopped),
            _ => {}
        }

        events
    }

    /// Returns the value carried by the event, if any.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::RoomTemperatureChanged(v)
            | Self::TargetTemperatureChanged(v)
            | Self::PressureChanged(v)
            | Self::PressureBelowThreshold(v) => Some(*v),
            Self::BoilerStarted | Self::BoilerStopped => None,
        }
    }

    /// Returns `true` for temperature events.
    #[must_use]
    pub fn is_temperature(&self) -> bool {
        matches!(
            self,
            Self::RoomTemperatureChanged(_) | Self::TargetTemperatureChanged(_)
        )
    }

    /// Returns `true` for pressure events.
    #[must_use]
    pub fn is_pressure(&self) -> bool {
        matches!(self, Self::PressureChanged(_) | Self::PressureBelowThreshold(_))
    }

    /// Returns `true` for boiler transitions.
    #[must_use]
    pub fn is_boiler(&self) -> bool {
        matches!(self, Self::BoilerStarted | Self::BoilerStopped)
    }
}
