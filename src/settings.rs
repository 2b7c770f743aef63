// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection settings for a thermostat.
//!
//! [`ConnectionSettings`] holds everything the wire protocol needs to
//! address and authenticate to one thermostat. [`SettingsUpdate`] is a
//! partial update that the owning [`Device`](crate::Device) merges in place.
//!
//! # Examples
//!
//! ```
//! use atag_lib::settings::{ConnectionSettings, SettingsUpdate};
//!
//! let mut settings = ConnectionSettings::new("192.168.1.40", "aa:bb:cc:dd:ee:ff")
//!     .with_display_name("Living room")
//!     .with_account_email("home@example.com");
//!
//! settings.apply(SettingsUpdate::new().host("192.168.1.41"));
//! assert_eq!(settings.host(), "192.168.1.41");
//! assert_eq!(settings.identifier().as_str(), "AABBCCDDEEFF");
//! ```

use crate::types::DeviceIdentifier;

/// Address and account information for one thermostat.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionSettings {
    host: String,
    identifier: DeviceIdentifier,
    display_name: String,
    account_email: String,
}

impl ConnectionSettings {
    /// Display name used when none is configured.
    pub const DEFAULT_DISPLAY_NAME: &'static str = "atag_lib";

    /// Creates settings for the thermostat at `host`.
    ///
    /// The identifier is normalized before storage.
    #[must_use]
    pub fn new(host: impl Into<String>, identifier: impl AsRef<str>) -> Self {
        Self {
            host: host.into(),
            identifier: DeviceIdentifier::new(identifier),
            display_name: Self::DEFAULT_DISPLAY_NAME.to_string(),
            account_email: String::new(),
        }
    }

    /// Sets the name shown on the thermostat for this controller.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Sets the account email sent in every request.
    #[must_use]
    pub fn with_account_email(mut self, email: impl Into<String>) -> Self {
        self.account_email = email.into();
        self
    }

    /// Returns the host name or IP address.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the normalized hardware identifier.
    #[must_use]
    pub fn identifier(&self) -> &DeviceIdentifier {
        &self.identifier
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the account email.
    #[must_use]
    pub fn account_email(&self) -> &str {
        &self.account_email
    }

    /// Merges a partial update. Returns `true` if anything changed.
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        let before = self.clone();
        if let Some(host) = update.host {
            self.host = host;
        }
        if let Some(identifier) = update.identifier {
            self.identifier = DeviceIdentifier::new(identifier);
        }
        if let Some(name) = update.display_name {
            self.display_name = name;
        }
        if let Some(email) = update.account_email {
            self.account_email = email;
        }
        *self != before
    }
}

/// A partial update of [`ConnectionSettings`].
///
/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SettingsUpdate {
    /// New host name or IP address.
    pub host: Option<String>,
    /// New hardware identifier, in any notation.
    pub identifier: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New account email.
    pub account_email: Option<String>,
}

impl SettingsUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the identifier.
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the account email.
    #[must_use]
    pub fn account_email(mut self, email: impl Into<String>) -> Self {
        self.account_email = Some(email.into());
        self
    }

    /// Returns `true` if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.host.is_none()
            && self.identifier.is_none()
            && self.display_name.is_none()
            && self.account_email.is_none()
    }
}
