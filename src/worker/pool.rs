//! # WorkerPool: the slot-to-process registry.
//!
//! Owns all worker handles and guarantees a live, addressable process
//! per slot before a task executes against it. The raw map is never
//! exposed; callers get exactly three operations (`ensure_started`,
//! `restart`, `shutdown_all`) plus a read-only liveness snapshot.
//!
//! ## Locking model
//! One async mutex per slot: concurrent `ensure_started`/`restart`
//! calls for the **same** slot serialize; different slots proceed fully
//! independently. The batch scheduler never executes two tasks on one
//! slot at a time, but the per-slot lock makes the pool safe by itself.
//!
//! ## Readiness
//! After starting, the control endpoint is polled at a fixed cadence
//! (`readiness_poll`) until it responds or `readiness_timeout` expires.
//! Readiness failure is reported to the caller as
//! [`WorkerError::NeverReady`], not as a task failure — the handle stays
//! recorded so a later `restart` recycles it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::Config;
use crate::error::WorkerError;
use crate::events::{Bus, Event, EventKind};

use super::lifecycle::{Worker, WorkerLifecycle};

type Slot = Mutex<Option<Box<dyn Worker>>>;

/// Registry of supervised worker processes, one slot per task.
pub struct WorkerPool {
    slots: Vec<Slot>,
    lifecycle: Arc<dyn WorkerLifecycle>,
    bus: Bus,
    closed: AtomicBool,
    readiness_poll: Duration,
    readiness_timeout: Duration,
    terminate_grace: Duration,
}

impl WorkerPool {
    /// Creates a pool with `slot_count` empty slots.
    ///
    /// Slot indices passed to the other methods must be below
    /// `slot_count`; violating that is a caller bug and panics.
    pub fn new(slot_count: usize, lifecycle: Arc<dyn WorkerLifecycle>, bus: Bus, cfg: &Config) -> Self {
        Self {
            slots: (0..slot_count).map(|_| Mutex::new(None)).collect(),
            lifecycle,
            bus,
            closed: AtomicBool::new(false),
            readiness_poll: cfg.readiness_poll,
            readiness_timeout: cfg.readiness_timeout,
            terminate_grace: cfg.terminate_grace,
        }
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Guarantees a live, addressable worker for `slot`.
    ///
    /// Lazily starts a worker on first use, then polls the control
    /// endpoint until it is reachable or the readiness window closes.
    /// A recorded worker is re-polled too, so a process that died since
    /// the last batch surfaces here as a readiness failure instead of a
    /// confusing executor error.
    pub async fn ensure_started(&self, slot: u32, target: &str) -> Result<(), WorkerError> {
        let mut guard = self.slots[slot as usize].lock().await;
        // checked under the slot lock: a late attempt racing
        // `shutdown_all` either sees the flag or gets its worker torn
        // down by the teardown holding this lock after it
        if self.closed.load(Ordering::SeqCst) {
            return Err(WorkerError::PoolClosed { slot });
        }
        if guard.is_none() {
            self.start_into(&mut guard, slot, target).await?;
        }
        self.wait_ready(slot, target).await
    }

    /// Terminates and relaunches the worker for `slot`.
    ///
    /// Safe to call when no worker is recorded (plain start). The
    /// termination is graceful-then-forceful with the configured grace.
    pub async fn restart(&self, slot: u32, target: &str) -> Result<(), WorkerError> {
        let mut guard = self.slots[slot as usize].lock().await;
        if self.closed.load(Ordering::SeqCst) {
            return Err(WorkerError::PoolClosed { slot });
        }
        self.bus
            .publish(Event::now(EventKind::WorkerRestarting).with_slot(slot));
        if let Some(mut worker) = guard.take() {
            worker.terminate(self.terminate_grace).await;
            self.bus
                .publish(Event::now(EventKind::WorkerStopped).with_slot(slot));
        }
        self.start_into(&mut guard, slot, target).await?;
        self.wait_ready(slot, target).await
    }

    /// Terminates every recorded worker and closes the pool.
    ///
    /// Called once on controlled termination so no orphaned processes
    /// survive the scheduler. After this, `ensure_started` and
    /// `restart` refuse with [`WorkerError::PoolClosed`]; a straggler
    /// attempt abandoned by the grace window cannot leak a fresh
    /// process.
    pub async fn shutdown_all(&self) {
        self.closed.store(true, Ordering::SeqCst);
        for (slot, cell) in self.slots.iter().enumerate() {
            let mut guard = cell.lock().await;
            if let Some(mut worker) = guard.take() {
                worker.terminate(self.terminate_grace).await;
                self.bus
                    .publish(Event::now(EventKind::WorkerStopped).with_slot(slot as u32));
            }
        }
    }

    /// Slots that currently hold a recorded worker.
    pub async fn live_slots(&self) -> Vec<u32> {
        let mut live = Vec::new();
        for (slot, cell) in self.slots.iter().enumerate() {
            if cell.lock().await.is_some() {
                live.push(slot as u32);
            }
        }
        live
    }

    async fn start_into(
        &self,
        guard: &mut Option<Box<dyn Worker>>,
        slot: u32,
        target: &str,
    ) -> Result<(), WorkerError> {
        self.bus.publish(
            Event::now(EventKind::WorkerStarting)
                .with_slot(slot)
                .with_target(target),
        );
        let worker = self.lifecycle.start(slot, target).await?;
        *guard = Some(worker);
        Ok(())
    }

    /// Polls the control endpoint until reachable or the window closes.
    async fn wait_ready(&self, slot: u32, target: &str) -> Result<(), WorkerError> {
        let started = Instant::now();
        loop {
            if self.lifecycle.health_check(slot, target).await {
                self.bus
                    .publish(Event::now(EventKind::WorkerReady).with_slot(slot));
                return Ok(());
            }
            if started.elapsed() >= self.readiness_timeout {
                let err = WorkerError::NeverReady {
                    slot,
                    waited: self.readiness_timeout,
                };
                self.bus.publish(
                    Event::now(EventKind::WorkerUnready)
                        .with_slot(slot)
                        .with_reason(err.to_string()),
                );
                return Err(err);
            }
            tokio::time::sleep(self.readiness_poll).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted lifecycle: counts starts/terminations; readiness can be
    /// made to fail for the first `unready_checks` probes of a slot.
    struct FakeLifecycle {
        starts: AtomicUsize,
        stops: Arc<AtomicUsize>,
        unready_checks: AtomicUsize,
    }

    impl FakeLifecycle {
        fn healthy() -> Self {
            Self {
                starts: AtomicUsize::new(0),
                stops: Arc::new(AtomicUsize::new(0)),
                unready_checks: AtomicUsize::new(0),
            }
        }

        fn unready_for(n: usize) -> Self {
            let lc = Self::healthy();
            lc.unready_checks.store(n, Ordering::SeqCst);
            lc
        }
    }

    struct FakeWorker {
        stops: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Worker for FakeWorker {
        fn id(&self) -> Option<u32> {
            Some(4242)
        }
        async fn terminate(&mut self, _grace: Duration) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl WorkerLifecycle for FakeLifecycle {
        async fn start(&self, _slot: u32, _target: &str) -> Result<Box<dyn Worker>, WorkerError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeWorker {
                stops: self.stops.clone(),
            }))
        }

        async fn health_check(&self, _slot: u32, _target: &str) -> bool {
            let left = self.unready_checks.load(Ordering::SeqCst);
            if left > 0 {
                self.unready_checks.store(left - 1, Ordering::SeqCst);
                false
            } else {
                true
            }
        }
    }

    fn quick_cfg() -> Config {
        let mut cfg = Config::default();
        cfg.readiness_poll = Duration::from_millis(1);
        cfg.readiness_timeout = Duration::from_millis(20);
        cfg
    }

    #[tokio::test]
    async fn ensure_started_is_lazy_and_idempotent() {
        let lc = Arc::new(FakeLifecycle::healthy());
        let pool = WorkerPool::new(2, lc.clone(), Bus::new(64), &quick_cfg());

        pool.ensure_started(0, "t").await.unwrap();
        pool.ensure_started(0, "t").await.unwrap();
        assert_eq!(lc.starts.load(Ordering::SeqCst), 1);
        assert_eq!(pool.live_slots().await, vec![0]);
    }

    #[tokio::test]
    async fn readiness_polls_until_endpoint_answers() {
        let lc = Arc::new(FakeLifecycle::unready_for(3));
        let pool = WorkerPool::new(1, lc.clone(), Bus::new(64), &quick_cfg());
        pool.ensure_started(0, "t").await.unwrap();
    }

    #[tokio::test]
    async fn readiness_window_closes_with_never_ready() {
        let lc = Arc::new(FakeLifecycle::unready_for(usize::MAX));
        let pool = WorkerPool::new(1, lc.clone(), Bus::new(64), &quick_cfg());
        let err = pool.ensure_started(0, "t").await.unwrap_err();
        assert!(matches!(err, WorkerError::NeverReady { slot: 0, .. }));
        // handle stays recorded for a later restart to recycle
        assert_eq!(pool.live_slots().await, vec![0]);
    }

    #[tokio::test]
    async fn restart_without_recorded_worker_is_safe() {
        let lc = Arc::new(FakeLifecycle::healthy());
        let pool = WorkerPool::new(1, lc.clone(), Bus::new(64), &quick_cfg());
        pool.restart(0, "t").await.unwrap();
        assert_eq!(lc.starts.load(Ordering::SeqCst), 1);
        assert_eq!(lc.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn restart_recycles_the_recorded_worker() {
        let lc = Arc::new(FakeLifecycle::healthy());
        let pool = WorkerPool::new(1, lc.clone(), Bus::new(64), &quick_cfg());
        pool.ensure_started(0, "t").await.unwrap();
        pool.restart(0, "t").await.unwrap();
        assert_eq!(lc.starts.load(Ordering::SeqCst), 2);
        assert_eq!(lc.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_pool_refuses_new_workers() {
        let lc = Arc::new(FakeLifecycle::healthy());
        let pool = WorkerPool::new(2, lc.clone(), Bus::new(64), &quick_cfg());
        pool.ensure_started(0, "t").await.unwrap();

        pool.shutdown_all().await;

        // a straggler attempt cannot bring up a process the teardown
        // will never see
        let err = pool.ensure_started(1, "t").await.unwrap_err();
        assert!(matches!(err, WorkerError::PoolClosed { slot: 1 }));
        let err = pool.restart(0, "t").await.unwrap_err();
        assert!(matches!(err, WorkerError::PoolClosed { slot: 0 }));
        assert_eq!(lc.starts.load(Ordering::SeqCst), 1);
        assert!(pool.live_slots().await.is_empty());
    }

    #[tokio::test]
    async fn shutdown_all_terminates_every_recorded_worker() {
        let lc = Arc::new(FakeLifecycle::healthy());
        let pool = WorkerPool::new(3, lc.clone(), Bus::new(64), &quick_cfg());
        pool.ensure_started(0, "t").await.unwrap();
        pool.ensure_started(2, "t").await.unwrap();

        pool.shutdown_all().await;
        assert_eq!(lc.stops.load(Ordering::SeqCst), 2);
        assert!(pool.live_slots().await.is_empty());
    }
}
