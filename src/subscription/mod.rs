// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback-based event subscriptions.
//!
//! - [`SubscriptionId`] - returned by every registration, used to unsubscribe
//! - [`CallbackRegistry`] - stores callbacks and dispatches events to them
//! - [`Subscribable`] - the registration API, implemented by
//!   [`Poller`](crate::Poller)
//!
//! Change events come from comparing consecutive polls. Availability events
//! fire only on transitions, so a thermostat that stays offline for an hour
//! produces one `unavailable` callback, not one per poll.

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
