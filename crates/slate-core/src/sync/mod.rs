//! Debounced persistence of committed plan snapshots.
//!
//! A [`Synchronizer`] owns one worker thread and one [`PlanStore`]. Callers
//! hand it immutable snapshots (`Arc<Plan>`, `Arc<Requirements>`); every
//! schedule call re-arms the debounce deadline, so only the last snapshot of
//! a burst is written. The worker runs at most one flush at a time and never
//! retries a failed one.
//!
//! ```text
//! Idle ──schedule──▶ PendingFlush ──deadline──▶ Flushing ──▶ Idle
//!                      ▲   │schedule                │ schedule
//!                      └───┘                        ▼
//!                                              (PendingFlush after)
//! ```

pub mod store;

pub use store::{MemoryStore, PlanStore};

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::model::Requirements;
use crate::plan::Plan;
use crate::snapshot::StoredPlan;

/// Observable state of the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Idle,
    PendingFlush,
    Flushing,
}

/// Counters since the synchronizer started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Flushes that wrote every snapshot they carried.
    pub flushes: u64,
    /// Flushes where at least one write failed.
    pub failures: u64,
    pub plan_writes: u64,
    pub group_writes: u64,
}

#[derive(Default)]
struct Payload {
    plan: Option<Arc<Plan>>,
    groups: Option<Arc<Requirements>>,
}

impl Payload {
    const fn is_empty(&self) -> bool {
        self.plan.is_none() && self.groups.is_none()
    }
}

#[derive(Default)]
struct State {
    pending: Payload,
    deadline: Option<Instant>,
    flushing: bool,
    closing: bool,
    stats: SyncStats,
}

impl State {
    const fn status(&self) -> SyncStatus {
        if self.flushing {
            SyncStatus::Flushing
        } else if self.deadline.is_some() {
            SyncStatus::PendingFlush
        } else {
            SyncStatus::Idle
        }
    }
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Synchronizer {
    shared: Arc<Shared>,
    debounce: Duration,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("debounce", &self.debounce)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Synchronizer {
    /// Start the worker thread writing through `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn spawn<S>(store: S, debounce: Duration) -> Result<Self>
    where
        S: PlanStore + 'static,
    {
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("slate-sync".to_string())
            .spawn(move || run_worker(&worker_shared, store))
            .context("spawn synchronizer thread")?;

        Ok(Self {
            shared,
            debounce,
            worker: Some(worker),
        })
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Queue `plan` as the next snapshot to write and re-arm the deadline.
    pub fn schedule_plan(&self, plan: Arc<Plan>) {
        self.arm(|payload| payload.plan = Some(plan));
    }

    /// Queue `groups` as the next requirement list to write and re-arm the
    /// deadline.
    pub fn schedule_requirements(&self, groups: Arc<Requirements>) {
        self.arm(|payload| payload.groups = Some(groups));
    }

    fn arm(&self, merge: impl FnOnce(&mut Payload)) {
        let mut state = self.shared.lock();
        if state.closing {
            tracing::warn!("snapshot scheduled after close; ignoring");
            return;
        }
        merge(&mut state.pending);
        let rearmed = state.deadline.is_some();
        state.deadline = Some(Instant::now() + self.debounce);
        tracing::trace!(
            rearmed,
            debounce_ms = duration_ms(self.debounce),
            "flush armed"
        );
        drop(state);
        self.shared.wake.notify_all();
    }

    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.shared.lock().status()
    }

    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.shared.lock().stats
    }

    /// Block until nothing is pending or in flight, or `timeout` elapses.
    /// Returns whether the synchronizer went idle.
    #[must_use]
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        while state.status() != SyncStatus::Idle {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Flush any pending snapshot immediately, stop the worker, and return
    /// the final counters.
    pub fn close(mut self) -> SyncStats {
        self.shutdown();
        self.stats()
    }

    fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shared.lock().closing = true;
        self.shared.wake.notify_all();
        if worker.join().is_err() {
            tracing::error!("synchronizer thread panicked");
        }
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn run_worker<S: PlanStore>(shared: &Shared, mut store: S) {
    let mut state = shared.lock();
    loop {
        let Some(deadline) = state.deadline else {
            if state.closing {
                break;
            }
            state = shared
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        let now = Instant::now();
        if !state.closing && now < deadline {
            state = shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            continue;
        }

        let payload = std::mem::take(&mut state.pending);
        state.deadline = None;
        state.flushing = true;
        drop(state);

        let result = flush(&mut store, &payload);

        state = shared.lock();
        state.flushing = false;
        match result {
            Ok((plan_written, groups_written)) => {
                state.stats.flushes += 1;
                state.stats.plan_writes += u64::from(plan_written);
                state.stats.group_writes += u64::from(groups_written);
            }
            Err(()) => state.stats.failures += 1,
        }
        shared.wake.notify_all();
    }
    tracing::debug!(stats = ?state.stats, "synchronizer stopped");
}

/// Write every snapshot in `payload`, each in its own store transaction.
/// Failures are logged here; the caller only counts them.
fn flush<S: PlanStore>(store: &mut S, payload: &Payload) -> Result<(bool, bool), ()> {
    if payload.is_empty() {
        return Ok((false, false));
    }

    let started = Instant::now();
    let mut failed = false;
    let mut plan_written = false;
    let mut groups_written = false;

    if let Some(plan) = &payload.plan {
        let stored = StoredPlan::capture(plan);
        tracing::debug!(
            courses = stored.courses.len(),
            semesters = stored.semesters.len(),
            placements = stored.placements.len(),
            "flushing plan"
        );
        match store.save_plan(&stored) {
            Ok(()) => plan_written = true,
            Err(err) => {
                failed = true;
                tracing::warn!(error = %format!("{err:#}"), "plan flush failed; keeping in-memory state");
            }
        }
    }

    if let Some(groups) = &payload.groups {
        tracing::debug!(groups = groups.groups().len(), "flushing requirement groups");
        match store.save_requirements(groups.groups()) {
            Ok(()) => groups_written = true,
            Err(err) => {
                failed = true;
                tracing::warn!(error = %format!("{err:#}"), "requirement flush failed; keeping in-memory state");
            }
        }
    }

    let elapsed_ms = duration_ms(started.elapsed());
    if failed {
        tracing::error!(elapsed_ms, "flush failed; next mutation re-arms");
        Err(())
    } else {
        tracing::info!(elapsed_ms, plan_written, groups_written, "flushed");
        Ok((plan_written, groups_written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Course;

    const WAIT: Duration = Duration::from_secs(5);

    fn plan_with(ids: &[&str]) -> Arc<Plan> {
        let courses = ids
            .iter()
            .map(|id| Course::new(*id, id.to_uppercase(), "Course", 3))
            .collect();
        let mut plan = Plan::from_parts(courses, Vec::new());
        plan.ensure_mandatory();
        Arc::new(plan)
    }

    #[test]
    fn burst_is_coalesced_into_one_flush() {
        let store = MemoryStore::new();
        let sync = Synchronizer::spawn(store.clone(), Duration::from_millis(50)).expect("spawn");

        sync.schedule_plan(plan_with(&["a"]));
        sync.schedule_plan(plan_with(&["a", "b"]));
        sync.schedule_plan(plan_with(&["a", "b", "c"]));
        assert_eq!(sync.status(), SyncStatus::PendingFlush);

        assert!(sync.wait_idle(WAIT));
        assert_eq!(store.plan_saves(), 1);
        assert_eq!(store.plan().courses.len(), 3);
        assert_eq!(sync.stats().flushes, 1);
    }

    #[test]
    fn close_flushes_pending_snapshot() {
        let store = MemoryStore::new();
        let sync = Synchronizer::spawn(store.clone(), Duration::from_secs(60)).expect("spawn");
        sync.schedule_plan(plan_with(&["a"]));
        sync.schedule_requirements(Arc::new(Requirements::default()));

        let stats = sync.close();
        assert_eq!(stats.flushes, 1);
        assert_eq!(stats.plan_writes, 1);
        assert_eq!(stats.group_writes, 1);
        assert_eq!(store.plan().courses.len(), 1);
        assert_eq!(store.groups().len(), 3);
    }

    #[test]
    fn failure_is_counted_and_not_retried() {
        let store = MemoryStore::new();
        store.fail_next_saves(1);
        let sync = Synchronizer::spawn(store.clone(), Duration::from_millis(10)).expect("spawn");

        sync.schedule_plan(plan_with(&["a"]));
        assert!(sync.wait_idle(WAIT));
        assert_eq!(sync.stats().failures, 1);
        assert_eq!(store.plan_saves(), 0);

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(store.plan_saves(), 0);

        sync.schedule_plan(plan_with(&["a"]));
        assert!(sync.wait_idle(WAIT));
        assert_eq!(store.plan_saves(), 1);
    }

    #[test]
    fn schedule_during_flush_triggers_follow_up_flush() {
        let store = MemoryStore::new();
        store.set_save_delay(Duration::from_millis(100));
        let sync = Synchronizer::spawn(store.clone(), Duration::from_millis(5)).expect("spawn");

        sync.schedule_plan(plan_with(&["a"]));
        let started = Instant::now();
        while sync.status() != SyncStatus::Flushing {
            assert!(started.elapsed() < WAIT, "flush never started");
            std::thread::sleep(Duration::from_millis(1));
        }
        sync.schedule_plan(plan_with(&["a", "b"]));
        assert_eq!(sync.status(), SyncStatus::Flushing);

        assert!(sync.wait_idle(WAIT));
        assert_eq!(store.plan_saves(), 2);
        assert_eq!(store.plan().courses.len(), 2);
    }

    #[test]
    fn idle_close_writes_nothing() {
        let store = MemoryStore::new();
        let sync = Synchronizer::spawn(store.clone(), Duration::from_millis(10)).expect("spawn");
        assert_eq!(sync.status(), SyncStatus::Idle);
        let stats = sync.close();
        assert_eq!(stats, SyncStats::default());
        assert_eq!(store.plan_saves(), 0);
    }
}
