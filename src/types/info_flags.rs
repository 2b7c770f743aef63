// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sub-report selection for retrieve requests.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask selecting which sub-reports a retrieve reply includes.
///
/// # Examples
///
/// ```
/// use atag_lib::types::InfoFlags;
///
/// let flags = InfoFlags::CONTROL | InfoFlags::REPORT | InfoFlags::STATUS;
/// assert_eq!(flags.bits(), 25);
/// assert!(flags.contains(InfoFlags::REPORT));
/// assert!(!flags.contains(InfoFlags::WIFI));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InfoFlags(u32);

impl InfoFlags {
    /// Current control settings (setpoints, modes).
    pub const CONTROL: Self = Self(1);
    /// Weekly schedules.
    pub const SCHEDULES: Self = Self(2);
    /// Installer configuration.
    pub const CONFIGURATION: Self = Self(4);
    /// Measurements (temperatures, pressure, boiler status).
    pub const REPORT: Self = Self(8);
    /// Device identity and connection state.
    pub const STATUS: Self = Self(16);
    /// Wireless network details.
    pub const WIFI: Self = Self(32);
    /// Extended boiler details.
    pub const DETAILS: Self = Self(64);

    /// No sub-reports.
    pub const NONE: Self = Self(0);

    /// Creates flags from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for InfoFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for InfoFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for InfoFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}
