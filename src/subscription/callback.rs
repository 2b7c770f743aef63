// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback storage and dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::poller::UnavailableReason;
use crate::state::ChangeEvent;

/// Identifies a registered callback so it can be removed again.
///
/// IDs are unique within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type ValueCallback = Arc<dyn Fn(f64) + Send + Sync>;
type SignalCallback = Arc<dyn Fn() + Send + Sync>;
type ChangeCallback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;
type UnavailableCallback = Arc<dyn Fn(&UnavailableReason) + Send + Sync>;

type Slots<C> = RwLock<HashMap<SubscriptionId, C>>;

fn notify_value(slots: &Slots<ValueCallback>, value: f64) {
    for callback in slots.read().values() {
        callback(value);
    }
}

fn notify_signal(slots: &Slots<SignalCallback>) {
    for callback in slots.read().values() {
        callback();
    }
}

/// Registry of thermostat event callbacks.
///
/// Callbacks run synchronously on the task that dispatches, in no
/// particular order. They must not register or remove callbacks on the
/// same registry.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    room_temperature: Slots<ValueCallback>,
    target_temperature: Slots<ValueCallback>,
    pressure: Slots<ValueCallback>,
    /// Pressure threshold subscriptions, keyed with their threshold in bar.
    pressure_below: Slots<(f64, ValueCallback)>,
    boiler_started: Slots<SignalCallback>,
    boiler_stopped: Slots<SignalCallback>,
    change: Slots<ChangeCallback>,
    available: Slots<SignalCallback>,
    unavailable: Slots<UnavailableCallback>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            room_temperature: RwLock::default(),
            target_temperature: RwLock::default(),
            pressure: RwLock::default(),
            pressure_below: RwLock::default(),
            boiler_started: RwLock::default(),
            boiler_stopped: RwLock::default(),
            change: RwLock::default(),
            available: RwLock::default(),
            unavailable: RwLock::default(),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn insert<C>(&self, slots: &Slots<C>, callback: C) -> SubscriptionId {
        let id = self.next_id();
        slots.write().insert(id, callback);
        id
    }

    /// Registers a callback for room temperature changes (°C).
    pub fn on_room_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let callback: ValueCallback = Arc::new(callback);
        self.insert(&self.room_temperature, callback)
    }

    /// Registers a callback for setpoint changes (°C).
    pub fn on_target_temperature_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let callback: ValueCallback = Arc::new(callback);
        self.insert(&self.target_temperature, callback)
    }

    /// Registers a callback for water pressure changes (bar).
    pub fn on_pressure_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let callback: ValueCallback = Arc::new(callback);
        self.insert(&self.pressure, callback)
    }

    /// Registers a callback that runs whenever an observed pressure is below
    /// `threshold` bar.
    ///
    /// The check runs on every poll after the first, whether or not the
    /// pressure changed.
    pub fn on_pressure_below<F>(&self, threshold: f64, callback: F) -> SubscriptionId
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        let callback: ValueCallback = Arc::new(callback);
        self.insert(&self.pressure_below, (threshold, callback))
    }

    /// Registers a callback for central heating switching on.
    pub fn on_boiler_started<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: SignalCallback = Arc::new(callback);
        self.insert(&self.boiler_started, callback)
    }

    /// Registers a callback for central heating switching off.
    pub fn on_boiler_stopped<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: SignalCallback = Arc::new(callback);
        self.insert(&self.boiler_stopped, callback)
    }

    /// Registers a callback that receives every change event.
    pub fn on_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let callback: ChangeCallback = Arc::new(callback);
        self.insert(&self.change, callback)
    }

    /// Registers a callback for the device becoming available.
    pub fn on_available<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback: SignalCallback = Arc::new(callback);
        self.insert(&self.available, callback)
    }

    /// Registers a callback for the device becoming unavailable.
    pub fn on_unavailable<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&UnavailableReason) + Send + Sync + 'static,
    {
        let callback: UnavailableCallback = Arc::new(callback);
        self.insert(&self.unavailable, callback)
    }

    /// Removes a callback. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.room_temperature.write().remove(&id).is_some()
            || self.target_temperature.write().remove(&id).is_some()
            || self.pressure.write().remove(&id).is_some()
            || self.pressure_below.write().remove(&id).is_some()
            || self.boiler_started.write().remove(&id).is_some()
            || self.boiler_stopped.write().remove(&id).is_some()
            || self.change.write().remove(&id).is_some()
            || self.available.write().remove(&id).is_some()
            || self.unavailable.write().remove(&id).is_some()
    }

    /// Removes all callbacks.
    pub fn clear(&self) {
        self.room_temperature.write().clear();
        self.target_temperature.write().clear();
        self.pressure.write().clear();
        self.pressure_below.write().clear();
        self.boiler_started.write().clear();
        self.boiler_stopped.write().clear();
        self.change.write().clear();
        self.available.write().clear();
        self.unavailable.write().clear();
    }

    /// Dispatches one change event to the generic and the matching specific
    /// callbacks.
    pub fn dispatch(&self, event: &ChangeEvent) {
        for callback in self.change.read().values() {
            callback(event);
        }

        match *event {
            ChangeEvent::RoomTemperatureChanged(v) => notify_value(&self.room_temperature, v),
            ChangeEvent::TargetTemperatureChanged(v) => notify_value(&self.target_temperature, v),
            ChangeEvent::PressureChanged(v) => notify_value(&self.pressure, v),
            ChangeEvent::PressureBelowThreshold(v) => {
                for (threshold, callback) in self.pressure_below.read().values() {
                    if v < *threshold {
                        callback(v);
                    }
                }
            }
            ChangeEvent::BoilerStarted => notify_signal(&self.boiler_started),
            ChangeEvent::BoilerStopped => notify_signal(&self.boiler_stopped),
        }
    }

    /// Dispatches the available transition.
    pub fn dispatch_available(&self) {
        notify_signal(&self.available);
    }

    /// Dispatches the unavailable transition.
    pub fn dispatch_unavailable(&self, reason: &UnavailableReason) {
        for callback in self.unavailable.read().values() {
            callback(reason);
        }
    }

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.room_temperature.read().len()
            + self.target_temperature.read().len()
            + self.pressure.read().len()
            + self.pressure_below.read().len()
            + self.boiler_started.read().len()
            + self.boiler_stopped.read().len()
            + self.change.read().len()
            + self.available.read().len()
            + self.unavailable.read().len()
    }

    /// Returns `true` if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    use parking_lot::Mutex;

    use crate::error::ErrorKind;

    fn counter() -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        let c = Arc::new(AtomicU32::new(0));
        (c.clone(), c)
    }

    #[test]
    fn subscription_id_display() {
        assert_eq!(SubscriptionId::new(42).to_string(), "Sub(42)");
    }

    #[test]
    fn value_callbacks_receive_new_values() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();

        registry.on_room_temperature_changed(move |v| sink.lock().push(v));
        registry.dispatch(&ChangeEvent::RoomTemperatureChanged(20.5));
        registry.dispatch(&ChangeEvent::TargetTemperatureChanged(22.0));

        assert_eq!(*received.lock(), vec![20.5]);
    }

    #[test]
    fn pressure_below_compares_against_threshold() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();

        registry.on_pressure_below(1.0, move |v| sink.lock().push(v));
        for value in [1.4, 0.9, 0.9, 1.0] {
            registry.dispatch(&ChangeEvent::PressureBelowThreshold(value));
        }

        assert_eq!(*received.lock(), vec![0.9, 0.9]);
    }

    #[test]
    fn boiler_and_generic_callbacks() {
        let registry = CallbackRegistry::new();
        let (started, started_seen) = counter();
        let (all, all_seen) = counter();

        registry.on_boiler_started(move || {
            started.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_change(move |_| {
            all.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&ChangeEvent::BoilerStarted);
        registry.dispatch(&ChangeEvent::BoilerStopped);
        registry.dispatch(&ChangeEvent::PressureChanged(1.2));

        assert_eq!(started_seen.load(Ordering::SeqCst), 1);
        assert_eq!(all_seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn availability_callbacks() {
        let registry = CallbackRegistry::new();
        let (up, up_seen) = counter();
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let sink = kinds.clone();

        registry.on_available(move || {
            up.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_unavailable(move |reason| sink.lock().push(reason.kind));

        registry.dispatch_available();
        registry.dispatch_unavailable(&UnavailableReason {
            kind: ErrorKind::Timeout,
            message: "request timed out".to_string(),
            hint: ErrorKind::Timeout.hint().to_string(),
        });

        assert_eq!(up_seen.load(Ordering::SeqCst), 1);
        assert_eq!(*kinds.lock(), vec![ErrorKind::Timeout]);
    }

    #[test]
    fn unsubscribe_and_clear() {
        let registry = CallbackRegistry::new();
        let (count, seen) = counter();

        let id = registry.on_pressure_changed(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });
        registry.on_boiler_stopped(|| {});
        registry.on_pressure_below(1.0, |_| {});
        assert_eq!(registry.callback_count(), 3);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.dispatch(&ChangeEvent::PressureChanged(1.1));
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_are_unique_across_event_types() {
        let registry = CallbackRegistry::new();
        let a = registry.on_available(|| {});
        let b = registry.on_change(|_| {});
        let c = registry.on_pressure_below(1.0, |_| {});
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.on_available(|| {});
        let debug = format!("{registry:?}");
        assert!(debug.contains("callback_count: 1"));
    }
}
