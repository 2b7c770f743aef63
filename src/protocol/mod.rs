// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol for ATAG One thermostats.
//!
//! The thermostat exposes three JSON endpoints on port 10000, all `POST`:
//!
//! | Endpoint | Request envelope | Reply envelope |
//! |----------|------------------|----------------|
//! | `/pair_message` | `pair_message` | `pair_reply` |
//! | `/retrieve` | `retrieve_message` | `retrieve_reply` |
//! | `/update` | `update_message` | `update_reply` |
//!
//! - [`codec`]: builds request envelopes and decodes replies (pure)
//! - [`Transport`]: one request/response exchange, no retries
//! - [`HttpTransport`]: the `reqwest`-based transport

pub mod codec;
#[cfg(feature = "http")]
mod http;
#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpTransport};

use std::fmt;
use std::future::Future;

use crate::error::ProtocolError;

/// The three endpoints of the thermostat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Pairing handshake.
    Pair,
    /// State retrieval.
    Retrieve,
    /// Control update.
    Update,
}

impl Endpoint {
    /// Returns the URL path for this endpoint.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Pair => "/pair_message",
            Self::Retrieve => "/retrieve",
            Self::Update => "/update",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Raw reply from the thermostat.
#[derive(Debug, Clone)]
pub struct Reply {
    body: String,
}

impl Reply {
    /// Creates a reply with the given body.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Returns the raw JSON reply body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A single request/response exchange with a thermostat.
///
/// Implementations must bound every exchange with a timeout and must not
/// retry; retry cadence is decided by the caller.
pub trait Transport: Send + Sync {
    /// Posts `body` to `endpoint` on `host` and returns the raw reply.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::ConnectionFailed` if the device cannot be
    /// reached or answers with a non-success status, and
    /// `ProtocolError::Timeout` if no reply arrives in time.
    fn post(
        &self,
        host: &str,
        endpoint: Endpoint,
        body: String,
    ) -> impl Future<Output = Result<Reply, ProtocolError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Pair.path(), "/pair_message");
        assert_eq!(Endpoint::Retrieve.path(), "/retrieve");
        assert_eq!(Endpoint::Update.path(), "/update");
    }
}
