// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temporary setpoint overrides.
//!
//! An override sets a target temperature now and restores the previous one
//! after a delay. Only the most recent override's restoration runs, and it
//! restores the setpoint that was active before the first of a series of
//! overlapping overrides.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::device::Device;
use crate::error::Result;
use crate::protocol::Transport;
use crate::schedule::{self, TaskSlot};
use crate::types::TargetTemperature;

#[derive(Debug, Default)]
struct Pending {
    restore_to: Mutex<Option<TargetTemperature>>,
    generation: AtomicU64,
    /// Held by `apply` and by a firing restoration so they never interleave.
    turn: tokio::sync::Mutex<()>,
}

/// Applies setpoints that revert after a delay.
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use atag_lib::settings::ConnectionSettings;
/// use atag_lib::{Device, TemperatureOverride};
///
/// # async fn example() -> atag_lib::Result<()> {
/// let device = Arc::new(Device::http(ConnectionSettings::new("192.168.1.40", "AABBCCDDEEFF")).build()?);
/// let boost = TemperatureOverride::new(device);
///
/// // 23 °C for the next 45 minutes, then back to the current setpoint.
/// boost.apply(23.0, Duration::from_secs(45 * 60)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TemperatureOverride<T: Transport + 'static> {
    device: Arc<Device<T>>,
    slot: TaskSlot,
    pending: Arc<Pending>,
}

impl<T: Transport + 'static> TemperatureOverride<T> {
    /// Creates an override controller for `device`.
    #[must_use]
    pub fn new(device: Arc<Device<T>>) -> Self {
        Self {
            device,
            slot: TaskSlot::new(),
            pending: Arc::new(Pending::default()),
        }
    }

    /// Sets `celsius` now and restores the previous setpoint after `duration`.
    ///
    /// If a restoration is already pending it is replaced, and the new one
    /// restores the same original setpoint. A restoration that fires while
    /// this call is in progress waits for it and is then skipped. Returns the
    /// applied setpoint.
    ///
    /// # Errors
    ///
    /// Returns the error of reading the current setpoint or of setting the
    /// new one. Nothing is scheduled in that case.
    pub async fn apply(&self, celsius: f64, duration: Duration) -> Result<TargetTemperature> {
        let _turn = self.pending.turn.lock().await;

        let pending = *self.pending.restore_to.lock();
        let original = match pending {
            Some(original) => original,
            None => TargetTemperature::new(self.device.get_data().await?.target_temperature())?,
        };

        let applied = self.device.set_target_temperature(celsius).await?;
        *self.pending.restore_to.lock() = Some(original);
        let generation = self.pending.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let device = Arc::clone(&self.device);
        let state = Arc::clone(&self.pending);
        self.slot.replace(schedule::spawn_once(duration, move || async move {
            let _turn = state.turn.lock().await;
            // A newer override or a cancel took over while this one waited.
            if state.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(%original, "Superseded restoration skipped");
                return;
            }
            match device.set_target_temperature(original.celsius()).await {
                Ok(restored) => tracing::debug!(%restored, "Temporary override ended"),
                Err(e) => tracing::warn!(error = %e, "Failed to restore target temperature"),
            }
            if state.generation.load(Ordering::SeqCst) == generation {
                *state.restore_to.lock() = None;
            }
        }));

        tracing::debug!(%applied, %original, secs = duration.as_secs(), "Temporary override set");
        Ok(applied)
    }

    /// Drops the pending restoration; the current setpoint stays.
    ///
    /// Returns `true` if a restoration was pending.
    pub fn cancel(&self) -> bool {
        self.pending.generation.fetch_add(1, Ordering::SeqCst);
        self.pending.restore_to.lock().take();
        self.slot.cancel()
    }

    /// Returns the setpoint a pending restoration will apply.
    #[must_use]
    pub fn pending_restoration(&self) -> Option<TargetTemperature> {
        *self.pending.restore_to.lock()
    }
}
