// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling interval type.

use std::time::Duration;

use crate::error::ValueError;

/// Time between two poll cycles, bounded to 10-300 seconds.
///
/// # Examples
///
/// ```
/// use atag_lib::types::PollInterval;
///
/// let interval = PollInterval::new(30).unwrap();
/// assert_eq!(interval.as_secs(), 30);
///
/// assert!(PollInterval::new(5).is_err());
/// assert_eq!(PollInterval::clamped(5), PollInterval::MIN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollInterval(u64);

impl PollInterval {
    /// Shortest accepted interval (10 s).
    pub const MIN: Self = Self(10);

    /// Longest accepted interval (300 s).
    pub const MAX: Self = Self(300);

    /// Interval used when none is configured (60 s).
    pub const DEFAULT: Self = Self(60);

    /// Creates an interval of `secs` seconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if `secs` is outside `[10, 300]`.
    pub fn new(secs: u64) -> Result<Self, ValueError> {
        if secs < Self::MIN.0 || secs > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: Self::MIN.0,
                max: Self::MAX.0,
                actual: secs,
            });
        }
        Ok(Self(secs))
    }

    /// Creates an interval, clamping to the valid range.
    #[must_use]
    pub const fn clamped(secs: u64) -> Self {
        if secs < Self::MIN.0 {
            Self::MIN
        } else if secs > Self::MAX.0 {
            Self::MAX
        } else {
            Self(secs)
        }
    }

    /// Returns the interval in seconds.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns the interval as a [`Duration`].
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::DEFAULT
    }
}
