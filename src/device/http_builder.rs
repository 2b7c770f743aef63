// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP device builder.

use std::time::Duration;

use crate::device::Device;
use crate::error::Error;
use crate::protocol::{HttpConfig, HttpTransport};
use crate::settings::ConnectionSettings;

/// Builder for thermostats reached over HTTP.
///
/// Created with [`Device::http`]. The port and timeout default to
/// [`HttpConfig::DEFAULT_PORT`] and [`HttpConfig::DEFAULT_TIMEOUT`].
///
/// # Examples
///
/// ```no_run
/// use atag_lib::settings::ConnectionSettings;
/// use atag_lib::Device;
///
/// # fn example() -> atag_lib::Result<()> {
/// let settings = ConnectionSettings::new("192.168.1.40", "AABBCCDDEEFF");
/// let device = Device::http(settings).with_port(10000).build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpDeviceBuilder {
    settings: ConnectionSettings,
    config: HttpConfig,
}

impl HttpDeviceBuilder {
    pub(crate) fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            config: HttpConfig::default(),
        }
    }

    /// Overrides the thermostat port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Replaces the whole HTTP configuration.
    #[must_use]
    pub fn with_config(mut self, config: HttpConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the HTTP configuration that will be used.
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Builds the device. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn build(self) -> Result<Device<HttpTransport>, Error> {
        let transport = self.config.into_transport()?;
        Ok(Device::new(transport, self.settings))
    }
}
