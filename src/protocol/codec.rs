// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request envelopes and reply decoding.
//!
//! All wire-format knowledge lives here. Encoders turn settings into the
//! JSON envelopes the thermostat expects; decoders check the reply
//! envelope and deserialize its content into typed structures.
//!
//! A reply that is not JSON, or lacks its top-level envelope key, is
//! malformed ([`ParseError::Json`], [`ParseError::MissingEnvelope`]). A reply
//! whose content has the wrong shape is invalid ([`ParseError::InvalidValue`],
//! [`ParseError::MissingField`]).

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::error::ParseError;
use crate::settings::ConnectionSettings;
use crate::types::{AuthorizationStatus, BoilerStatus, InfoFlags, TargetTemperature};

/// Boiler status bit for active central heating.
pub const BOILER_CENTRAL_HEATING: u64 = 8;

/// Boiler status bit for active domestic hot water.
pub const BOILER_HOT_WATER: u64 = 4;

/// `account_type` value for a user account.
const ACCOUNT_TYPE_USER: u8 = 0;

fn account_auth(settings: &ConnectionSettings) -> Value {
    json!({
        "user_account": settings.account_email(),
        "mac_address": settings.identifier().as_str(),
    })
}

/// Builds a `pair_message` envelope.
#[must_use]
pub fn encode_pair(settings: &ConnectionSettings, seqnr: u32) -> Value {
    json!({
        "pair_message": {
            "seqnr": seqnr,
            "account_auth": account_auth(settings),
            "accounts": {
                "entries": [{
                    "user_account": settings.account_email(),
                    "mac_address": settings.identifier().as_str(),
                    "device_name": settings.display_name(),
                    "account_type": ACCOUNT_TYPE_USER,
                }]
            }
        }
    })
}

/// Builds a `retrieve_message` envelope requesting the sub-reports in `info`.
#[must_use]
pub fn encode_retrieve(settings: &ConnectionSettings, seqnr: u32, info: InfoFlags) -> Value {
    json!({
        "retrieve_message": {
            "seqnr": seqnr,
            "account_auth": account_auth(settings),
            "info": info.bits(),
        }
    })
}

/// Builds an `update_message` envelope setting the heating setpoint.
#[must_use]
pub fn encode_update(
    settings: &ConnectionSettings,
    seqnr: u32,
    target: TargetTemperature,
) -> Value {
    json!({
        "update_message": {
            "seqnr": seqnr,
            "account_auth": account_auth(settings),
            "control": {
                "ch_mode_temp": target.celsius(),
            }
        }
    })
}

/// Decodes the boiler status bitmask into named flags.
///
/// The flame is reported on whenever heating or hot water is active.
#[must_use]
pub fn decode_boiler_status(bits: u64) -> BoilerStatus {
    let heating = bits & BOILER_CENTRAL_HEATING != 0;
    let hot_water = bits & BOILER_HOT_WATER != 0;
    BoilerStatus {
        heating,
        hot_water,
        flame: heating || hot_water,
    }
}

fn decode_envelope<T: DeserializeOwned>(body: &str, key: &'static str) -> Result<T, ParseError> {
    let mut root: Value = serde_json::from_str(body)?;
    let content = root
        .get_mut(key)
        .map(Value::take)
        .ok_or(ParseError::MissingEnvelope(key))?;
    serde_json::from_value(content).map_err(|e| ParseError::InvalidValue {
        field: key.to_string(),
        message: e.to_string(),
    })
}

fn decode_status(acc_status: Option<u64>) -> Result<Option<AuthorizationStatus>, ParseError> {
    acc_status.map(AuthorizationStatus::try_from).transpose()
}

/// Content of a `pair_reply` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PairReply {
    /// Echoed sequence number.
    #[serde(default)]
    pub seqnr: Option<u64>,
    #[serde(default)]
    acc_status: Option<u64>,
}

impl PairReply {
    /// Returns the authorization status.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::MissingField` if the reply has no `acc_status`,
    /// or `ParseError::InvalidValue` for an unknown status code.
    pub fn status(&self) -> Result<AuthorizationStatus, ParseError> {
        decode_status(self.acc_status)?
            .ok_or_else(|| ParseError::MissingField("pair_reply.acc_status".to_string()))
    }
}

/// Decodes a `pair_reply`.
///
/// # Errors
///
/// Returns `ParseError` if the body is not JSON or lacks the envelope.
pub fn decode_pair_reply(body: &str) -> Result<PairReply, ParseError> {
    decode_envelope(body, "pair_reply")
}

/// Contents of the `status` sub-report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusReport {
    /// Identifier the thermostat reports for itself.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Device status code.
    #[serde(default)]
    pub device_status: Option<u64>,
    /// Connection status code.
    #[serde(default)]
    pub connection_status: Option<u64>,
    /// Fields not modeled explicitly.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Contents of the `report` sub-report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Report {
    /// Room temperature in °C.
    #[serde(default)]
    pub room_temp: Option<f64>,
    /// Outside temperature in °C.
    #[serde(default)]
    pub outside_temp: Option<f64>,
    /// Central-heating water pressure in bar.
    #[serde(default)]
    pub ch_water_pres: Option<f64>,
    /// Raw boiler status bitmask.
    #[serde(default)]
    pub boiler_status: Option<u64>,
    /// Fields not modeled explicitly.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Report {
    /// Returns the decoded boiler status, if reported.
    #[must_use]
    pub fn boiler(&self) -> Option<BoilerStatus> {
        self.boiler_status.map(decode_boiler_status)
    }
}

/// Contents of the `control` sub-report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ControlReport {
    /// Central-heating setpoint in °C.
    #[serde(default)]
    pub ch_mode_temp: Option<f64>,
    /// Fields not modeled explicitly.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Content of a `retrieve_reply` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrieveReply {
    /// Echoed sequence number.
    #[serde(default)]
    pub seqnr: Option<u64>,
    #[serde(default)]
    acc_status: Option<u64>,
    /// Device identity, present when [`InfoFlags::STATUS`] was requested.
    #[serde(default)]
    pub status: Option<StatusReport>,
    /// Measurements, present when [`InfoFlags::REPORT`] was requested.
    #[serde(default)]
    pub report: Option<Report>,
    /// Control settings, present when [`InfoFlags::CONTROL`] was requested.
    #[serde(default)]
    pub control: Option<ControlReport>,
    /// Other sub-reports (schedules, configuration, wifi, details).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl RetrieveReply {
    /// Returns the authorization status, if the reply carries one.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` for an unknown status code.
    pub fn authorization(&self) -> Result<Option<AuthorizationStatus>, ParseError> {
        decode_status(self.acc_status)
    }
}

/// Decodes a `retrieve_reply`.
///
/// # Errors
///
/// Returns `ParseError` if the body is not JSON, lacks the envelope, or
/// has fields of the wrong type.
pub fn decode_retrieve_reply(body: &str) -> Result<RetrieveReply, ParseError> {
    decode_envelope(body, "retrieve_reply")
}

/// Content of an `update_reply` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReply {
    /// Echoed sequence number.
    #[serde(default)]
    pub seqnr: Option<u64>,
    #[serde(default)]
    acc_status: Option<u64>,
    /// Fields not modeled explicitly.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl UpdateReply {
    /// Returns the authorization status, if the reply carries one.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` for an unknown status code.
    pub fn authorization(&self) -> Result<Option<AuthorizationStatus>, ParseError> {
        decode_status(self.acc_status)
    }
}

/// Decodes an `update_reply`.
///
/// # Errors
///
/// Returns `ParseError` if the body is not JSON or lacks the envelope.
pub fn decode_update_reply(body: &str) -> Result<UpdateReply, ParseError> {
    decode_envelope(body, "update_reply")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ConnectionSettings {
        ConnectionSettings::new("10.0.0.5", "aa:bb:cc:dd:ee:ff")
            .with_display_name("Hall")
            .with_account_email("owner@example.com")
    }

    #[test]
    fn pair_envelope_is_bit_exact() {
        let value = encode_pair(&settings(), 3);
        assert_eq!(
            value,
            json!({
                "pair_message": {
                    "seqnr": 3,
                    "account_auth": {
                        "user_account": "owner@example.com",
                        "mac_address": "AABBCCDDEEFF"
                    },
                    "accounts": {
                        "entries": [{
                            "user_account": "owner@example.com",
                            "mac_address": "AABBCCDDEEFF",
                            "device_name": "Hall",
                            "account_type": 0
                        }]
                    }
                }
            })
        );
    }

    #[test]
    fn retrieve_envelope_carries_info_mask() {
        let info = InfoFlags::CONTROL | InfoFlags::REPORT | InfoFlags::STATUS;
        let value = encode_retrieve(&settings(), 0, info);
        assert_eq!(value["retrieve_message"]["info"], 25);
        assert_eq!(
            value["retrieve_message"]["account_auth"]["mac_address"],
            "AABBCCDDEEFF"
        );
    }

    #[test]
    fn update_envelope_carries_setpoint() {
        let target = TargetTemperature::new(21.3).unwrap();
        let value = encode_update(&settings(), 9, target);
        assert_eq!(value["update_message"]["control"]["ch_mode_temp"], 21.5);
        assert_eq!(value["update_message"]["seqnr"], 9);
    }

    #[test]
    fn boiler_bits() {
        assert_eq!(decode_boiler_status(0), BoilerStatus::default());

        let heating = decode_boiler_status(8);
        assert!(heating.heating && heating.flame && !heating.hot_water);

        let water = decode_boiler_status(4);
        assert!(water.hot_water && water.flame && !water.heating);

        let both = decode_boiler_status(8 | 4 | 2);
        assert!(both.heating && both.hot_water && both.flame);
    }

    #[test]
    fn pair_reply_status() {
        let reply = decode_pair_reply(r#"{"pair_reply":{"seqnr":1,"acc_status":2}}"#).unwrap();
        assert_eq!(reply.status().unwrap(), AuthorizationStatus::Granted);
    }

    #[test]
    fn pair_reply_without_status_is_invalid() {
        let reply = decode_pair_reply(r#"{"pair_reply":{"seqnr":1}}"#).unwrap();
        assert!(matches!(reply.status(), Err(ParseError::MissingField(_))));
    }

    #[test]
    fn missing_envelope_is_malformed() {
        let err = decode_pair_reply(r#"{"retrieve_reply":{}}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingEnvelope("pair_reply")));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = decode_retrieve_reply("<html>busy</html>").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn wrong_field_type_is_invalid() {
        let err = decode_retrieve_reply(r#"{"retrieve_reply":{"report":{"room_temp":"warm"}}}"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { .. }));
    }

    #[test]
    fn retrieve_reply_sections() {
        let body = r#"{
            "retrieve_reply": {
                "seqnr": 4,
                "acc_status": 2,
                "status": {"device_id": "6808-1401-3109_15-30-001-544", "device_status": 16385},
                "report": {
                    "room_temp": 20.7,
                    "outside_temp": 8.1,
                    "ch_water_pres": 1.6,
                    "boiler_status": 8,
                    "dhw_water_temp": 48.2
                },
                "control": {"ch_mode_temp": 21.0, "dhw_temp_setp": 60.0},
                "wifi": {"ssid": "home"}
            }
        }"#;
        let reply = decode_retrieve_reply(body).unwrap();

        assert_eq!(reply.authorization().unwrap(), Some(AuthorizationStatus::Granted));
        let report = reply.report.as_ref().unwrap();
        assert_eq!(report.room_temp, Some(20.7));
        assert!(report.boiler().unwrap().heating);
        assert!(report.other.contains_key("dhw_water_temp"));
        assert_eq!(reply.control.as_ref().unwrap().ch_mode_temp, Some(21.0));
        assert!(reply.other.contains_key("wifi"));
    }

    #[test]
    fn update_reply_status() {
        let reply = decode_update_reply(r#"{"update_reply":{"seqnr":2,"acc_status":3}}"#).unwrap();
        assert_eq!(reply.authorization().unwrap(), Some(AuthorizationStatus::Denied));
    }
}
