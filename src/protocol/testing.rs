// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::protocol::{Endpoint, Reply, Transport};

/// A request captured by [`ScriptedTransport`].
#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub host: String,
    pub endpoint: Endpoint,
    pub body: Value,
}

/// Replays queued replies in order and records every request.
///
/// Once the queue is empty, every request fails with a connection error.
/// With a latency set, each reply arrives that long after the request.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, ProtocolError>>>,
    sent: Mutex<Vec<SentRequest>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Highest number of requests that were awaiting a reply at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn reply(&self, body: Value) -> &Self {
        self.replies.lock().push_back(Ok(body.to_string()));
        self
    }

    pub fn reply_raw(&self, body: &str) -> &Self {
        self.replies.lock().push_back(Ok(body.to_string()));
        self
    }

    pub fn fail(&self, err: ProtocolError) -> &Self {
        self.replies.lock().push_back(Err(err));
        self
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, endpoint: Endpoint) -> Vec<SentRequest> {
        self.sent
            .lock()
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn post(
        &self,
        host: &str,
        endpoint: Endpoint,
        body: String,
    ) -> Result<Reply, ProtocolError> {
        self.sent.lock().push(SentRequest {
            host: host.to_string(),
            endpoint,
            body: serde_json::from_str(&body).unwrap_or(Value::Null),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.replies.lock().pop_front();
        match next {
            Some(result) => result.map(Reply::new),
            None => Err(ProtocolError::ConnectionFailed(
                "no scripted reply".to_string(),
            )),
        }
    }
}

/// Builds a granted `retrieve_reply` with the given measurements.
pub(crate) fn retrieve_reply(room: f64, target: f64, pressure: f64, boiler_bits: u64) -> Value {
    serde_json::json!({
        "retrieve_reply": {
            "seqnr": 0,
            "acc_status": 2,
            "status": {"device_id": "AABBCCDDEEFF"},
            "report": {
                "room_temp": room,
                "outside_temp": 9.5,
                "ch_water_pres": pressure,
                "boiler_status": boiler_bits
            },
            "control": {"ch_mode_temp": target}
        }
    })
}

/// Builds a `retrieve_reply` that only carries `acc_status`.
pub(crate) fn retrieve_status_reply(acc_status: u8) -> Value {
    serde_json::json!({"retrieve_reply": {"seqnr": 0, "acc_status": acc_status}})
}

/// Builds a `pair_reply` with the given status code.
pub(crate) fn pair_reply(acc_status: u8) -> Value {
    serde_json::json!({"pair_reply": {"seqnr": 0, "acc_status": acc_status}})
}

/// Builds an `update_reply` with the given status code.
pub(crate) fn update_reply(acc_status: u8) -> Value {
    serde_json::json!({"update_reply": {"seqnr": 0, "acc_status": acc_status}})
}
