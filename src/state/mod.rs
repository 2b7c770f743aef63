// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state types.
//!
//! A [`DeviceSnapshot`] is one read of the thermostat. Comparing two
//! consecutive snapshots with [`ChangeEvent::diff`] yields the discrete
//! [`ChangeEvent`]s that the [`Poller`](crate::Poller) dispatches.

mod change_event;
mod snapshot;

pub use change_event::ChangeEvent;
pub use snapshot::DeviceSnapshot;
