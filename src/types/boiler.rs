// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded boiler status flags.

/// Boiler activity as named flags.
///
/// The thermostat reports these as a single bitmask; decoding it is the
/// codec's job (see [`crate::protocol::codec::decode_boiler_status`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BoilerStatus {
    /// Central heating is active.
    pub heating: bool,
    /// Domestic hot water is being produced.
    pub hot_water: bool,
    /// The burner flame is on.
    pub flame: bool,
}

impl BoilerStatus {
    /// Returns `true` if the boiler is doing anything at all.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.heating || self.hot_water || self.flame
    }
}
