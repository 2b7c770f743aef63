// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `atag_lib` library.
//!
//! Failures are grouped by where they originate: value validation, network
//! transport, reply decoding, and the device's authorization state. Use
//! [`Error::kind`] when only the category matters, for example to decide
//! whether to re-trigger pairing or to report the thermostat as offline.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during the HTTP exchange.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The reply could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The thermostat refused the request because of its authorization state.
    #[error("authorization error: {0}")]
    Authorization(#[from] AuthorizationError),
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Value(_) => ErrorKind::InvalidValue,
            Self::Protocol(ProtocolError::Timeout(_)) => ErrorKind::Timeout,
            Self::Protocol(_) => ErrorKind::ConnectionFailed,
            Self::Parse(ParseError::Json(_) | ParseError::MissingEnvelope(_)) => {
                ErrorKind::MalformedReply
            }
            Self::Parse(_) => ErrorKind::InvalidReply,
            Self::Authorization(AuthorizationError::Denied) => ErrorKind::AuthorizationDenied,
            Self::Authorization(AuthorizationError::Pending) => ErrorKind::AuthorizationPending,
            Self::Authorization(AuthorizationError::Timeout { .. }) => {
                ErrorKind::AuthorizationTimeout
            }
        }
    }

    /// Returns `true` if the error comes from the device's authorization state.
    ///
    /// These errors mean the thermostat is reachable but this controller must
    /// be paired (again) before it can read or write state.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Returns `true` if the error happened while talking to the device.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConnectionFailed | ErrorKind::Timeout | ErrorKind::MalformedReply
        )
    }

    /// Returns guidance suitable for showing to the person operating the controller.
    #[must_use]
    pub fn hint(&self) -> &'static str {
        self.kind().hint()
    }
}

/// Flat classification of every [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Network, DNS, or refused connection.
    ConnectionFailed,
    /// No reply within the transport timeout.
    Timeout,
    /// The reply body is not JSON or lacks its envelope.
    MalformedReply,
    /// The reply is well-formed JSON with an unexpected shape.
    InvalidReply,
    /// The thermostat denied this controller.
    AuthorizationDenied,
    /// The pairing request still awaits approval on the thermostat.
    AuthorizationPending,
    /// Pairing was not approved within the allowed attempts.
    AuthorizationTimeout,
    /// An input value was rejected before anything was sent.
    InvalidValue,
}

impl ErrorKind {
    /// Returns user-facing guidance for this kind of failure.
    #[must_use]
    pub fn hint(self) -> &'static str {
        match self {
            Self::ConnectionFailed | Self::Timeout => {
                "The thermostat could not be reached. Check that it is powered and connected to the network."
            }
            Self::MalformedReply | Self::InvalidReply => {
                "The thermostat sent an unexpected reply. Check that the address points to the thermostat."
            }
            Self::AuthorizationDenied => {
                "The thermostat does not authorize this controller. Pair it again and confirm with YES on the thermostat."
            }
            Self::AuthorizationPending | Self::AuthorizationTimeout => {
                "Pairing is not confirmed yet. Press YES on the thermostat to authorize this controller."
            }
            Self::InvalidValue => "The requested value is not valid.",
        }
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u64,
        /// Maximum allowed value.
        max: u64,
        /// The actual value that was provided.
        actual: u64,
    },

    /// A temperature was NaN or infinite.
    #[error("temperature {0} is not a finite number")]
    NotFinite(f64),
}

/// Errors related to the HTTP exchange with the thermostat.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The HTTP client could not be built or the request could not be formed.
    #[cfg(feature = "http")]
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to decoding thermostat replies.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The reply body is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The reply lacks its top-level envelope key.
    #[error("reply has no `{0}` envelope")]
    MissingEnvelope(&'static str),

    /// Expected field is missing from the reply.
    #[error("missing field in reply: {0}")]
    MissingField(String),

    /// A field holds a value outside its allowed domain.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors reported by the thermostat's authorization state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The thermostat denied this controller.
    #[error("authorization denied by the thermostat")]
    Denied,

    /// The thermostat has not yet confirmed this controller.
    #[error("authorization pending confirmation on the thermostat")]
    Pending,

    /// Pairing stayed unresolved for every allowed attempt.
    #[error("authorization not granted after {attempts} attempts")]
    Timeout {
        /// Number of pair requests that were sent.
        attempts: u32,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
