// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for sources of thermostat events.

use crate::poller::UnavailableReason;
use crate::state::ChangeEvent;
use crate::subscription::SubscriptionId;

/// Types that emit thermostat change and availability events.
///
/// Implemented by [`Poller`](crate::Poller), which produces the events.
/// A [`Device`](crate::Device) alone answers requests but has no event
/// stream.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use atag_lib::settings::ConnectionSettings;
/// use atag_lib::subscription::Subscribable;
/// use atag_lib::types::PollInterval;
/// use atag_lib::{Device, Poller};
///
/// # async fn example() -> atag_lib::Result<()> {
/// let device = Arc::new(Device::http(ConnectionSettings::new("192.168.1.40", "AABBCCDDEEFF")).build()?);
/// let poller = Poller::new(device, PollInterval::DEFAULT);
///
/// poller.on_pressure_below(1.0, |bar| println!("Refill the system: {bar} bar"));
/// let id = poller.on_unavailable(|reason| println!("Offline: {}", reason.hint));
///
/// poller.start();
/// // ...
/// poller.unsubscribe(id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to room temperature changes (°C).
    fn on_room_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static;

    /// Subscribes to setpoint changes (°C).
    fn on_target_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static;

    /// Subscribes to water pressure changes (bar).
    fn on_pressure_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static;

    /// Subscribes to pressure readings below `threshold` bar.
    fn on_pressure_below<F>(&self, threshold: f64, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static;

    /// Subscribes to central heating switching on.
    fn on_boiler_started<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Subscribes to central heating switching off.
    fn on_boiler_stopped<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Subscribes to every change event.
    fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static;

    /// Subscribes to the device becoming available.
    fn on_available<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Subscribes to the device becoming unavailable.
    fn on_unavailable<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&UnavailableReason) + Send + Sync + 'static;

    /// Removes a subscription. Returns `true` if it existed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
