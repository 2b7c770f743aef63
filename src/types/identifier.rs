// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized hardware identifier.

use std::fmt;

/// A hardware identifier (MAC address) in its wire form.
///
/// The thermostat expects identifiers as uppercase characters with no
/// separators. Construction strips every non-alphanumeric character and
/// uppercases the rest, so any common notation is accepted.
///
/// # Examples
///
/// ```
/// use atag_lib::types::DeviceIdentifier;
///
/// let colons = DeviceIdentifier::new("aa:bb-cc-dd-ee-ff");
/// let plain = DeviceIdentifier::new("AABBCCDDEEFF");
/// assert_eq!(colons, plain);
/// assert_eq!(colons.as_str(), "AABBCCDDEEFF");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub struct DeviceIdentifier(String);

impl DeviceIdentifier {
    /// Creates a normalized identifier from any notation.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    /// Returns the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Strips separators and uppercases an identifier.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceIdentifier {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for DeviceIdentifier {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<DeviceIdentifier> for String {
    fn from(id: DeviceIdentifier) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_and_case_are_ignored() {
        assert_eq!(normalize("aa:bb-cc-dd-ee-ff"), "AABBCCDDEEFF");
        assert_eq!(normalize("AABBCCDDEEFF"), "AABBCCDDEEFF");
        assert_eq!(normalize("aa.bb cc_dd:ee-ff"), "AABBCCDDEEFF");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("0a:1b:2c:3d:4e:5f");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn deserialize_normalizes() {
        let id: DeviceIdentifier = serde_json::from_str("\"aa:bb:cc:dd:ee:ff\"").unwrap();
        assert_eq!(id.as_str(), "AABBCCDDEEFF");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"AABBCCDDEEFF\"");
    }

    #[test]
    fn empty_input() {
        assert!(DeviceIdentifier::new("::").is_empty());
    }
}
