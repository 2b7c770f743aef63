// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `atag_lib` - A Rust library to monitor and control ATAG One thermostats.
//!
//! The thermostat speaks a JSON-over-HTTP protocol on port 10000. This
//! library provides async APIs for its three operations and the behavior
//! built on top of them.
//!
//! # Supported Features
//!
//! - **Pairing**: the on-device YES approval, polled with bounded retries
//! - **State**: room, target and outside temperature, water pressure, boiler flags
//! - **Control**: setting the heating setpoint, and temporary overrides that revert
//! - **Polling**: recurring reads with per-field change events and availability tracking
//!
//! # Quick Start
//!
//! ```no_run
//! use atag_lib::pairing::PairingPolicy;
//! use atag_lib::settings::ConnectionSettings;
//! use atag_lib::types::AuthorizationStatus;
//! use atag_lib::Device;
//!
//! #[tokio::main]
//! async fn main() -> atag_lib::Result<()> {
//!     let settings = ConnectionSettings::new("192.168.1.40", "aa:bb:cc:dd:ee:ff")
//!         .with_display_name("Home controller")
//!         .with_account_email("home@example.com");
//!     let device = Device::http(settings).build()?;
//!
//!     // Press YES on the thermostat while this runs.
//!     let status = device.await_pairing(&PairingPolicy::default()).await?;
//!     if status != AuthorizationStatus::Granted {
//!         return Ok(());
//!     }
//!
//!     let snapshot = device.get_data().await?;
//!     println!("Room: {} °C", snapshot.room_temperature());
//!
//!     device.set_target_temperature(20.5).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Polling with Callbacks
//!
//! ```no_run
//! use std::sync::Arc;
//! use atag_lib::settings::ConnectionSettings;
//! use atag_lib::subscription::Subscribable;
//! use atag_lib::types::PollInterval;
//! use atag_lib::{Device, Poller};
//!
//! #[tokio::main]
//! async fn main() -> atag_lib::Result<()> {
//!     let device = Arc::new(
//!         Device::http(ConnectionSettings::new("192.168.1.40", "AABBCCDDEEFF")).build()?,
//!     );
//!     let poller = Poller::new(device, PollInterval::DEFAULT);
//!
//!     poller.on_target_temperature_changed(|celsius| println!("Setpoint: {celsius} °C"));
//!     poller.on_unavailable(|reason| eprintln!("{}", reason.hint));
//!     poller.start();
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
//!     poller.stop();
//!     Ok(())
//! }
//! ```

mod device;
pub mod error;
pub mod pairing;
pub mod poller;
pub mod protocol;
pub mod schedule;
pub mod settings;
pub mod state;
pub mod subscription;
pub mod temporary;
pub mod types;

#[cfg(feature = "http")]
pub use device::HttpDeviceBuilder;
pub use device::Device;
pub use error::{
    AuthorizationError, Error, ErrorKind, ParseError, ProtocolError, Result, ValueError,
};
pub use pairing::PairingPolicy;
pub use poller::{Availability, PollCycle, Poller, UnavailableReason};
#[cfg(feature = "http")]
pub use protocol::{HttpConfig, HttpTransport};
pub use protocol::{Endpoint, Transport};
pub use settings::{ConnectionSettings, SettingsUpdate};
pub use state::{ChangeEvent, DeviceSnapshot};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use temporary::TemperatureOverride;
pub use types::{AuthorizationStatus, BoilerStatus, InfoFlags, PollInterval, TargetTemperature};
