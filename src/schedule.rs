// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cancellable background work.
//!
//! Recurring polls and delayed restorations both run as tokio tasks owned
//! by a [`TaskHandle`]. Cancelling a handle, or dropping it, stops the task
//! from starting another run. A run that is already executing finishes.
//!
//! ```no_run
//! use std::time::Duration;
//! use atag_lib::schedule;
//!
//! # async fn example() {
//! let handle = schedule::spawn_repeating(Duration::from_secs(60), || async {
//!     println!("tick");
//! });
//! // ...
//! handle.cancel();
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Owner of a scheduled task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    token: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    /// Prevents any further run from starting.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns `true` when the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancels the task and waits for an in-flight run to finish.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take()
            && let Err(e) = join.await
        {
            tracing::warn!(error = %e, "Scheduled task ended abnormally");
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Runs `job` immediately and then once per `period`.
///
/// Ticks missed while a run is slow are skipped, not queued.
pub fn spawn_repeating<F, Fut>(period: Duration, mut job: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();

    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = child.cancelled() => break,
                _ = ticker.tick() => {}
            }
            job().await;
        }
    });

    TaskHandle {
        token,
        join: Some(join),
    }
}

/// Runs `job` once after `delay`, unless cancelled first.
pub fn spawn_once<F, Fut>(delay: Duration, job: F) -> TaskHandle
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();

    let join = tokio::spawn(async move {
        tokio::select! {
            biased;
            () = child.cancelled() => {}
            () = tokio::time::sleep(delay) => job().await,
        }
    });

    TaskHandle {
        token,
        join: Some(join),
    }
}

/// Holds at most one task; installing a new one cancels the previous.
#[derive(Debug, Default)]
pub struct TaskSlot {
    current: Mutex<Option<TaskHandle>>,
}

impl TaskSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handle`, cancelling whatever was installed before.
    pub fn replace(&self, handle: TaskHandle) {
        let previous = self.current.lock().replace(handle);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// Cancels and removes the installed task. Returns `true` if there was one
    /// that had not finished yet.
    pub fn cancel(&self) -> bool {
        match self.current.lock().take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.cancel();
                pending
            }
            None => false,
        }
    }

    /// Returns `true` if the installed task has not finished.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished() && !h.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_job(counter: Arc<AtomicU32>) -> impl FnMut() -> std::future::Ready<()> {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_runs_every_period_until_cancelled() {
        let count = Arc::new(AtomicU32::new(0));
        let handle = spawn_repeating(Duration::from_secs(10), counting_job(count.clone()));

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_run_completes_after_cancel() {
        let started = Arc::new(AtomicU32::new(0));
        let finished = Arc::new(AtomicU32::new(0));
        let (s, f) = (started.clone(), finished.clone());

        let handle = spawn_repeating(Duration::from_secs(10), move || {
            let (s, f) = (s.clone(), f.clone());
            async move {
                s.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
                f.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.shutdown().await;

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(finished.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(started.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn once_runs_after_delay() {
        let count = Arc::new(AtomicU32::new(0));
        let handle = spawn_once(Duration::from_secs(30), counting_job(count.clone()));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let count = Arc::new(AtomicU32::new(0));
        drop(spawn_once(Duration::from_secs(5), counting_job(count.clone())));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slot_keeps_only_the_latest_task() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let slot = TaskSlot::new();

        slot.replace(spawn_once(Duration::from_secs(10), counting_job(first.clone())));
        tokio::time::sleep(Duration::from_secs(5)).await;
        slot.replace(spawn_once(Duration::from_secs(10), counting_job(second.clone())));
        assert!(slot.is_pending());

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert!(!slot.is_pending());
        assert!(!slot.cancel());
    }
}
