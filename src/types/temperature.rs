// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target temperature type.
//!
//! The thermostat accepts setpoints between 4 °C and 27 °C in steps of
//! 0.5 °C. [`TargetTemperature`] guarantees both constraints.

use std::fmt;

use crate::error::ValueError;

/// A central-heating setpoint in degrees Celsius.
///
/// # Examples
///
/// ```
/// use atag_lib::types::TargetTemperature;
///
/// let t = TargetTemperature::new(20.3).unwrap();
/// assert_eq!(t.celsius(), 20.5);
///
/// let high = TargetTemperature::new(35.0).unwrap();
/// assert_eq!(high, TargetTemperature::MAX);
///
/// assert!(TargetTemperature::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct TargetTemperature(f64);

impl TargetTemperature {
    /// Lowest accepted setpoint.
    pub const MIN: Self = Self(4.0);

    /// Highest accepted setpoint.
    pub const MAX: Self = Self(27.0);

    /// Setpoint resolution.
    pub const STEP: f64 = 0.5;

    /// Creates a setpoint, clamping to `[4, 27]` and rounding to the nearest 0.5.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` for NaN or infinite input.
    pub fn new(celsius: f64) -> Result<Self, ValueError> {
        if !celsius.is_finite() {
            return Err(ValueError::NotFinite(celsius));
        }
        Ok(Self(clamp_and_round(celsius)))
    }

    /// Returns the setpoint in degrees Celsius.
    #[must_use]
    pub const fn celsius(&self) -> f64 {
        self.0
    }
}

/// Clamps a finite temperature to `[4, 27]` after rounding to the nearest 0.5.
#[must_use]
pub fn clamp_and_round(celsius: f64) -> f64 {
    let rounded = (celsius / TargetTemperature::STEP).round() * TargetTemperature::STEP;
    rounded.clamp(TargetTemperature::MIN.0, TargetTemperature::MAX.0)
}

impl fmt::Display for TargetTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} °C", self.0)
    }
}

impl From<TargetTemperature> for f64 {
    fn from(t: TargetTemperature) -> Self {
        t.0
    }
}
