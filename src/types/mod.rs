// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type-safe representations of thermostat values.
//!
//! Values with device-imposed constraints are validated at construction:
//! setpoints are clamped and rounded, identifiers are normalized, and poll
//! intervals are bounded.

mod authorization;
mod boiler;
mod identifier;
mod info_flags;
mod poll_interval;
mod temperature;

pub use authorization::AuthorizationStatus;
pub use boiler::BoilerStatus;
pub use identifier::{DeviceIdentifier, normalize};
pub use info_flags::InfoFlags;
pub use poll_interval::PollInterval;
pub use temperature::{TargetTemperature, clamp_and_round};
