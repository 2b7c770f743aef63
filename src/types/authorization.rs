// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Authorization status reported by the thermostat.

use std::fmt;

use crate::error::ParseError;

/// The `acc_status` value of a reply.
///
/// Each pair request yields a fresh status; it is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum AuthorizationStatus {
    /// The thermostat has no record of this controller.
    NotAvailable,
    /// Waiting for someone to press YES on the thermostat.
    Pending,
    /// This controller may read and write state.
    Granted,
    /// The request was rejected on the thermostat.
    Denied,
}

impl AuthorizationStatus {
    /// Returns `true` once the handshake can no longer change.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Granted | Self::Denied)
    }

    /// Returns the wire code for this status.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NotAvailable => 0,
            Self::Pending => 1,
            Self::Granted => 2,
            Self::Denied => 3,
        }
    }
}

impl TryFrom<u64> for AuthorizationStatus {
    type Error = ParseError;

    fn try_from(code: u64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::NotAvailable),
            1 => Ok(Self::Pending),
            2 => Ok(Self::Granted),
            3 => Ok(Self::Denied),
            other => Err(ParseError::InvalidValue {
                field: "acc_status".to_string(),
                message: format!("unknown status code {other}"),
            }),
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotAvailable => "not available",
            Self::Pending => "pending",
            Self::Granted => "granted",
            Self::Denied => "denied",
        };
        f.write_str(s)
    }
}
