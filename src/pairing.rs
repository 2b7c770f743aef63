// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pairing handshake.
//!
//! A new controller must be approved on the thermostat itself: after the
//! first pair request the thermostat shows a YES prompt, and until someone
//! presses it every pair request answers `Pending`. The handshake is
//! therefore polled at a fixed, human-scale interval.
//!
//! # Examples
//!
//! ```no_run
//! use atag_lib::pairing::PairingPolicy;
//! use atag_lib::settings::ConnectionSettings;
//! use atag_lib::Device;
//! use std::time::Duration;
//!
//! # async fn example() -> atag_lib::Result<()> {
//! let settings = ConnectionSettings::new("192.168.1.40", "aa:bb:cc:dd:ee:ff")
//!     .with_account_email("home@example.com");
//! let device = Device::http(settings).build()?;
//!
//! let policy = PairingPolicy::default().with_interval(Duration::from_secs(2));
//! let status = device
//!     .await_pairing_with(&policy, |status| println!("pairing: {status}"))
//!     .await?;
//! println!("finished with {status}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use crate::error::{AuthorizationError, Result};
use crate::types::AuthorizationStatus;

/// Something that can send a single pair request.
#[allow(async_fn_in_trait)]
pub trait PairingRequest {
    /// Sends one pair request and returns the status the thermostat reports.
    ///
    /// # Errors
    ///
    /// Returns transport and decode errors unchanged.
    async fn request_pairing(&self) -> Result<AuthorizationStatus>;
}

/// How long to wait for a pairing to be approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl PairingPolicy {
    /// Default number of pair requests.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
    /// Default pause between pair requests.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

    /// Creates a policy.
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Sets the maximum number of pair requests.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the pause between pair requests.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns the maximum number of pair requests.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the pause between pair requests.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for PairingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}

/// Requests pairing until the thermostat grants or denies it.
///
/// # Errors
///
/// See [`await_authorization_with`].
pub async fn await_authorization<P>(requester: &P, policy: &PairingPolicy) -> Result<AuthorizationStatus>
where
    P: PairingRequest + ?Sized,
{
    await_authorization_with(requester, policy, |_| {}).await
}

/// Requests pairing until the thermostat grants or denies it, reporting
/// every status to `on_status`.
///
/// Returns `Granted` or `Denied` as soon as either is reported. No pause
/// follows the last attempt.
///
/// # Errors
///
/// Returns `AuthorizationError::Timeout` if the status is still `Pending`
/// or `NotAvailable` after `policy.max_attempts()` requests, and propagates
/// transport or decode errors from any attempt.
pub async fn await_authorization_with<P, F>(
    requester: &P,
    policy: &PairingPolicy,
    mut on_status: F,
) -> Result<AuthorizationStatus>
where
    P: PairingRequest + ?Sized,
    F: FnMut(AuthorizationStatus),
{
    for attempt in 1..=policy.max_attempts {
        let status = requester.request_pairing().await?;
        tracing::debug!(attempt, %status, "Pairing attempt");
        on_status(status);

        if status.is_resolved() {
            tracing::info!(attempt, %status, "Pairing resolved");
            return Ok(status);
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    tracing::info!(attempts = policy.max_attempts, "Pairing not approved in time");
    Err(AuthorizationError::Timeout {
        attempts: policy.max_attempts,
    }
    .into())
}
