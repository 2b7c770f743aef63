// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! High-level client for one ATAG One thermostat.
//!
//! [`Device`] combines the codec, a [`Transport`] and the pairing handshake
//! behind a small API, and owns the [`ConnectionSettings`] used for every
//! request.
//!
//! ```no_run
//! use atag_lib::settings::ConnectionSettings;
//! use atag_lib::Device;
//!
//! # async fn example() -> atag_lib::Result<()> {
//! let settings = ConnectionSettings::new("192.168.1.40", "aa:bb:cc:dd:ee:ff")
//!     .with_account_email("home@example.com");
//! let device = Device::http(settings).build()?;
//!
//! let snapshot = device.get_data().await?;
//! println!("{} °C, {} bar", snapshot.room_temperature(), snapshot.pressure());
//!
//! device.set_target_temperature(20.5).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! A device serializes its requests: at most one exchange is outstanding at
//! any time, so sequence numbers never interleave on the wire. Each request
//! works on its own copy of the settings, so an update made while a
//! request is in flight applies to the next one.

#[cfg(feature = "http")]
mod http_builder;

#[cfg(feature = "http")]
pub use http_builder::HttpDeviceBuilder;

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{AuthorizationError, Result};
use crate::pairing::{self, PairingPolicy, PairingRequest};
use crate::protocol::codec::{self, RetrieveReply};
use crate::protocol::{Endpoint, Reply, Transport};
use crate::settings::{ConnectionSettings, SettingsUpdate};
use crate::state::DeviceSnapshot;
use crate::types::{AuthorizationStatus, InfoFlags, TargetTemperature};

/// Sub-reports requested by [`Device::get_data`].
const DATA_INFO: InfoFlags = InfoFlags::from_bits(
    InfoFlags::CONTROL.bits() | InfoFlags::REPORT.bits() | InfoFlags::STATUS.bits(),
);

/// A thermostat reached through the transport `T`.
///
/// Share it behind an `Arc` when a [`Poller`](crate::Poller) or
/// [`TemperatureOverride`](crate::TemperatureOverride) also needs it.
#[derive(Debug)]
pub struct Device<T: Transport> {
    transport: T,
    settings: RwLock<ConnectionSettings>,
    request_lock: tokio::sync::Mutex<()>,
    sequence: AtomicU32,
}

impl<T: Transport> Device<T> {
    /// Creates a device that talks through `transport`.
    pub fn new(transport: T, settings: ConnectionSettings) -> Self {
        Self {
            transport,
            settings: RwLock::new(settings),
            request_lock: tokio::sync::Mutex::new(()),
            sequence: AtomicU32::new(0),
        }
    }

    /// Returns a copy of the current connection settings.
    #[must_use]
    pub fn settings(&self) -> ConnectionSettings {
        self.settings.read().clone()
    }

    /// Merges a partial settings update. Returns `true` if anything changed.
    ///
    /// The identifier is normalized before it is stored.
    pub fn update_settings(&self, update: SettingsUpdate) -> bool {
        let changed = self.settings.write().apply(update);
        if changed {
            tracing::debug!("Connection settings updated");
        }
        changed
    }

    /// Returns the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn next_sequence(&self) -> u32 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Runs one request/reply exchange while holding the request lock.
    async fn exchange<F>(&self, endpoint: Endpoint, encode: F) -> Result<(ConnectionSettings, Reply)>
    where
        F: FnOnce(&ConnectionSettings, u32) -> Value,
    {
        let _guard = self.request_lock.lock().await;
        let settings = self.settings();
        let seqnr = self.next_sequence();
        let body = encode(&settings, seqnr).to_string();

        tracing::debug!(%endpoint, host = settings.host(), seqnr, "Sending request");
        let reply = self.transport.post(settings.host(), endpoint, body).await?;
        Ok((settings, reply))
    }

    /// Sends one pair request and returns the reported status.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged, and an invalid-reply error if
    /// the reply has no `acc_status`.
    pub async fn pair(&self) -> Result<AuthorizationStatus> {
        let (_, reply) = self.exchange(Endpoint::Pair, codec::encode_pair).await?;
        let status = codec::decode_pair_reply(reply.body())?.status()?;
        tracing::debug!(%status, "Pair reply");
        Ok(status)
    }

    /// Requests pairing until it is granted or denied.
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationError::Timeout` when `policy` runs out of
    /// attempts, or the first transport error.
    pub async fn await_pairing(&self, policy: &PairingPolicy) -> Result<AuthorizationStatus> {
        pairing::await_authorization(self, policy).await
    }

    /// Like [`await_pairing`](Self::await_pairing), reporting each
    /// intermediate status to `on_status`.
    ///
    /// # Errors
    ///
    /// See [`await_pairing`](Self::await_pairing).
    pub async fn await_pairing_with<F>(
        &self,
        policy: &PairingPolicy,
        on_status: F,
    ) -> Result<AuthorizationStatus>
    where
        F: FnMut(AuthorizationStatus),
    {
        pairing::await_authorization_with(self, policy, on_status).await
    }

    /// Retrieves the sub-reports selected by `info` without interpretation.
    ///
    /// # Errors
    ///
    /// Returns transport and decode errors, and an authorization error if the
    /// reply's `acc_status` is `Pending` or `Denied`.
    pub async fn retrieve(&self, info: InfoFlags) -> Result<RetrieveReply> {
        let (_, reply) = self.retrieve_raw(info).await?;
        check_authorization(reply.authorization()?)?;
        Ok(reply)
    }

    async fn retrieve_raw(&self, info: InfoFlags) -> Result<(ConnectionSettings, RetrieveReply)> {
        let (settings, reply) = self
            .exchange(Endpoint::Retrieve, |s, seqnr| codec::encode_retrieve(s, seqnr, info))
            .await?;
        let decoded = codec::decode_retrieve_reply(reply.body())?;
        Ok((settings, decoded))
    }

    /// Reads the current thermostat state.
    ///
    /// Requests the control, report and status sub-reports.
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationError::Denied` or `AuthorizationError::Pending`
    /// if the thermostat refuses this controller, transport errors
    /// unchanged, and an invalid-reply error if required values are missing.
    pub async fn get_data(&self) -> Result<DeviceSnapshot> {
        let (settings, reply) = self.retrieve_raw(DATA_INFO).await?;
        check_authorization(reply.authorization()?)?;
        let snapshot = DeviceSnapshot::from_reply(&reply, settings.identifier().as_str())?;
        Ok(snapshot)
    }

    /// Sets the heating setpoint and returns the value that was sent.
    ///
    /// `celsius` is rounded to the nearest 0.5 and clamped to `[4, 27]`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` for NaN or infinite input, plus the
    /// same errors as [`get_data`](Self::get_data).
    pub async fn set_target_temperature(&self, celsius: f64) -> Result<TargetTemperature> {
        let target = TargetTemperature::new(celsius)?;
        let (_, reply) = self
            .exchange(Endpoint::Update, |s, seqnr| codec::encode_update(s, seqnr, target))
            .await?;
        let decoded = codec::decode_update_reply(reply.body())?;
        check_authorization(decoded.authorization()?)?;
        tracing::debug!(%target, "Target temperature set");
        Ok(target)
    }

    /// Checks that the thermostat answers a status-only retrieve.
    ///
    /// Every failure maps to `false`. An authorization refusal still counts
    /// as reachable.
    pub async fn test_connection(&self) -> bool {
        match self.retrieve_raw(InfoFlags::STATUS).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Connection test failed");
                false
            }
        }
    }
}

impl<T: Transport> PairingRequest for Device<T> {
    async fn request_pairing(&self) -> Result<AuthorizationStatus> {
        self.pair().await
    }
}

#[cfg(feature = "http")]
impl Device<crate::protocol::HttpTransport> {
    /// Creates a builder for a thermostat reached over HTTP.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use atag_lib::settings::ConnectionSettings;
    /// use atag_lib::Device;
    /// use std::time::Duration;
    ///
    /// # fn example() -> atag_lib::Result<()> {
    /// let device = Device::http(ConnectionSettings::new("192.168.1.40", "AABBCCDDEEFF"))
    ///     .with_timeout(Duration::from_secs(5))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn http(settings: ConnectionSettings) -> HttpDeviceBuilder {
        HttpDeviceBuilder::new(settings)
    }
}

/// Maps a refusing `acc_status` on a retrieve or update reply to an error.
///
/// Whether firmware ever reports `Pending` or `Denied` here is unconfirmed;
/// a missing status or `NotAvailable` is accepted.
fn check_authorization(status: Option<AuthorizationStatus>) -> Result<()> {
    match status {
        Some(AuthorizationStatus::Denied) => Err(AuthorizationError::Denied.into()),
        Some(AuthorizationStatus::Pending) => Err(AuthorizationError::Pending.into()),
        _ => Ok(()),
    }
}
