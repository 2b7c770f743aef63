// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recurring fetch-and-diff over a [`Device`].
//!
//! Every cycle reads one [`DeviceSnapshot`] and compares it with the last
//! successfully read one. The first successful cycle only records a
//! baseline. A failed cycle emits nothing, keeps the baseline, and reports
//! the device as unavailable.
//!
//! ```no_run
//! use std::sync::Arc;
//! use atag_lib::settings::ConnectionSettings;
//! use atag_lib::subscription::Subscribable;
//! use atag_lib::types::PollInterval;
//! use atag_lib::{Device, Poller};
//!
//! # async fn example() -> atag_lib::Result<()> {
//! let settings = ConnectionSettings::new("192.168.1.40", "AABBCCDDEEFF");
//! let device = Arc::new(Device::http(settings).build()?);
//!
//! let poller = Poller::new(device, PollInterval::new(30)?);
//! poller.on_room_temperature_changed(|celsius| println!("room: {celsius} °C"));
//! poller.on_boiler_started(|| println!("heating"));
//! poller.start();
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::Device;
use crate::error::{Error, ErrorKind, Result};
use crate::protocol::Transport;
use crate::schedule::{self, TaskHandle};
use crate::state::{ChangeEvent, DeviceSnapshot};
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::types::PollInterval;

/// Why the device is considered unavailable.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnavailableReason {
    /// Category of the failure.
    pub kind: ErrorKind,
    /// The error message.
    pub message: String,
    /// Guidance for the person operating the controller.
    pub hint: String,
}

impl UnavailableReason {
    /// Builds the reason reported for `error`.
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            hint: error.hint().to_string(),
        }
    }

    /// Returns `true` if re-pairing is the remedy rather than connectivity.
    #[must_use]
    pub fn needs_pairing(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::AuthorizationDenied
                | ErrorKind::AuthorizationPending
                | ErrorKind::AuthorizationTimeout
        )
    }
}

/// Availability as last reported to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// The last cycle succeeded.
    Available,
    /// The last cycle failed.
    Unavailable(UnavailableReason),
}

impl Availability {
    /// Returns `true` for [`Availability::Available`].
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    fn differs_from(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Available, Self::Available) => false,
            (Self::Unavailable(a), Self::Unavailable(b)) => a.kind != b.kind,
            _ => true,
        }
    }
}

/// Result of one successful cycle.
#[derive(Debug, Clone)]
pub struct PollCycle {
    /// The snapshot read in this cycle.
    pub snapshot: DeviceSnapshot,
    /// Events dispatched for this cycle, empty on the first one.
    pub changes: Vec<ChangeEvent>,
}

#[derive(Debug)]
struct PollerInner<T: Transport> {
    device: Arc<Device<T>>,
    previous: Mutex<Option<DeviceSnapshot>>,
    availability: Mutex<Option<Availability>>,
    callbacks: CallbackRegistry,
}

impl<T: Transport> PollerInner<T> {
    async fn poll_once(&self) -> Result<PollCycle> {
        let snapshot = match self.device.get_data().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Poll cycle failed");
                self.report(Availability::Unavailable(UnavailableReason::from_error(&e)));
                return Err(e);
            }
        };

        let changes = {
            let mut previous = self.previous.lock();
            let changes = previous
                .as_ref()
                .map(|p| ChangeEvent::diff(p, &snapshot))
                .unwrap_or_default();
            *previous = Some(snapshot.clone());
            changes
        };

        self.report(Availability::Available);

        let significant = changes
            .iter()
            .filter(|c| !matches!(c, ChangeEvent::PressureBelowThreshold(_)))
            .count();
        if significant == 0 {
            tracing::trace!(identifier = snapshot.identifier(), "Poll cycle without changes");
        } else {
            tracing::debug!(identifier = snapshot.identifier(), changes = significant, "Poll cycle");
        }

        for change in &changes {
            self.callbacks.dispatch(change);
        }

        Ok(PollCycle { snapshot, changes })
    }

    /// Records `next` and notifies subscribers if it is a transition.
    fn report(&self, next: Availability) {
        {
            let mut current = self.availability.lock();
            if current.as_ref().is_some_and(|c| !c.differs_from(&next)) {
                return;
            }
            *current = Some(next.clone());
        }

        match next {
            Availability::Available => {
                tracing::info!("Thermostat available");
                self.callbacks.dispatch_available();
            }
            Availability::Unavailable(reason) => {
                tracing::info!(kind = ?reason.kind, "Thermostat unavailable");
                self.callbacks.dispatch_unavailable(&reason);
            }
        }
    }
}

/// Periodically reads a device and dispatches change events.
///
/// Stopping the poller, or dropping it, prevents further cycles. A cycle
/// already in flight completes.
#[derive(Debug)]
pub struct Poller<T: Transport + 'static> {
    inner: Arc<PollerInner<T>>,
    interval: Mutex<PollInterval>,
    task: Mutex<Option<TaskHandle>>,
}

impl<T: Transport + 'static> Poller<T> {
    /// Creates a stopped poller for `device`.
    #[must_use]
    pub fn new(device: Arc<Device<T>>, interval: PollInterval) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                device,
                previous: Mutex::new(None),
                availability: Mutex::new(None),
                callbacks: CallbackRegistry::new(),
            }),
            interval: Mutex::new(interval),
            task: Mutex::new(None),
        }
    }

    /// Returns the polled device.
    #[must_use]
    pub fn device(&self) -> &Arc<Device<T>> {
        &self.inner.device
    }

    /// Returns the callback registry events are dispatched to.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.inner.callbacks
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn interval(&self) -> PollInterval {
        *self.interval.lock()
    }

    /// Changes the poll interval, restarting the schedule if it is running.
    pub fn set_interval(&self, interval: PollInterval) {
        *self.interval.lock() = interval;
        if self.stop() {
            self.start();
        }
    }

    /// Returns the last successfully read snapshot.
    #[must_use]
    pub fn previous(&self) -> Option<DeviceSnapshot> {
        self.inner.previous.lock().clone()
    }

    /// Returns the availability last reported, `None` before the first cycle.
    #[must_use]
    pub fn availability(&self) -> Option<Availability> {
        self.inner.availability.lock().clone()
    }

    /// Runs one cycle now and dispatches its events.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Device::get_data`]; the baseline snapshot is
    /// kept and unavailability is reported.
    pub async fn poll_once(&self) -> Result<PollCycle> {
        self.inner.poll_once().await
    }

    /// Starts polling, with the first cycle immediately. Returns `false` if
    /// already running.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        let interval = self.interval();
        let inner = Arc::clone(&self.inner);
        let handle = schedule::spawn_repeating(interval.as_duration(), move || {
            let inner = Arc::clone(&inner);
            async move {
                let _ = inner.poll_once().await;
            }
        });

        tracing::info!(interval_secs = interval.as_secs(), "Poller started");
        *task = Some(handle);
        true
    }

    /// Stops polling. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let Some(handle) = self.task.lock().take() else {
            return false;
        };
        handle.cancel();
        tracing::info!("Poller stopped");
        true
    }

    /// Returns `true` while the schedule is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_cancelled() && !t.is_finished())
    }
}

impl<T: Transport + 'static> Subscribable for Poller<T> {
    fn on_room_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_room_temperature_changed(callback)
    }

    fn on_target_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_target_temperature_changed(callback)
    }

    fn on_pressure_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_pressure_changed(callback)
    }

    fn on_pressure_below<F>(&self, threshold: f64, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_pressure_below(threshold, callback)
    }

    fn on_boiler_started<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.on_boiler_started(callback)
    }

    fn on_boiler_stopped<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.on_boiler_stopped(callback)
    }

    fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_change(callback)
    }

    fn on_available<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.callbacks.on_available(callback)
    }

    fn on_unavailable<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&UnavailableReason) + Send + Sync + 'static,
    {
        self.inner.callbacks.on_unavailable(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.callbacks.unsubscribe(id)
    }
}
