// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for ATAG One thermostats.

use std::net::Ipv6Addr;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ProtocolError;
use crate::protocol::{Endpoint, Reply, Transport};

// ============================================================================
// HttpConfig - Transport configuration
// ============================================================================

/// Configuration for the HTTP transport.
///
/// The host is not part of the configuration: it belongs to the device's
/// [`ConnectionSettings`](crate::settings::ConnectionSettings) and may change
/// while the transport is in use.
///
/// # Examples
///
/// ```
/// use atag_lib::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new()
///     .with_port(10001)
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.port(), 10001);
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    port: u16,
    timeout: Duration,
}

impl HttpConfig {
    /// Port the thermostat listens on.
    pub const DEFAULT_PORT: u16 = 10000;
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration with default port and timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the overall request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an `HttpTransport` from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_transport(self) -> Result<HttpTransport, ProtocolError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpTransport {
            client,
            port: self.port,
            timeout: self.timeout,
        })
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HttpTransport
// ============================================================================

/// `reqwest`-based transport.
///
/// Each exchange is an independent `POST` with a JSON body, bounded by the
/// configured timeout. A timed-out request is dropped together with its
/// connection before the error is returned.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    port: u16,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, ProtocolError> {
        HttpConfig::new().into_transport()
    }

    /// Returns the port requests are sent to.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Builds the URL for an endpoint on `host`.
    ///
    /// IPv6 literals are bracketed. A host that already carries a port is
    /// rejected.
    fn build_url(&self, host: &str, endpoint: Endpoint) -> Result<String, ProtocolError> {
        let invalid = || ProtocolError::InvalidAddress(host.to_string());
        let trimmed = host.trim();
        let trimmed = trimmed
            .strip_prefix("http://")
            .unwrap_or(trimmed)
            .trim_end_matches('/');
        if trimmed.is_empty() || trimmed.contains('/') {
            return Err(invalid());
        }

        let bare = trimmed
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(trimmed);
        let authority = match bare.parse::<Ipv6Addr>() {
            Ok(addr) => format!("[{addr}]"),
            Err(_) if bare.contains(':') => return Err(invalid()),
            Err(_) => bare.to_string(),
        };

        let url = format!("http://{authority}:{}{}", self.port, endpoint.path());
        Url::parse(&url).map_err(|_| invalid())?;
        Ok(url)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn map_error(&self, err: &reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            ProtocolError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ProtocolError::ConnectionFailed(err.to_string())
        }
    }
}

impl Transport for HttpTransport {
    async fn post(
        &self,
        host: &str,
        endpoint: Endpoint,
        body: String,
    ) -> Result<Reply, ProtocolError> {
        let url = self.build_url(host, endpoint)?;

        tracing::debug!(url = %url, body = %body, "Sending thermostat request");

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_error(&e))?;

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body = response.text().await.map_err(|e| self.map_error(&e))?;

        tracing::debug!(body = %body, "Received thermostat reply");

        Ok(Reply::new(body))
    }
}
