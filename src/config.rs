//! # Global runtime configuration.
//!
//! Provides [`Config`], the centralized settings for the monitor runtime.
//!
//! The operator surface takes no required flags: every field has a
//! fixed default matching the production deployment, and a caller that
//! wants different pacing mutates the struct before building the
//! supervisor.
//!
//! ## Field groups
//! - **Scheduling**: `max_concurrent`, `interval`, `task_timeout`
//! - **Worker readiness**: `base_port`, `readiness_poll`, `readiness_timeout`
//! - **Shutdown**: `terminate_grace`, `grace`
//! - **Event system**: `bus_capacity`

use std::time::Duration;

/// Global configuration for the monitor runtime.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of tasks executing at the same time.
    ///
    /// One batch holds at most this many tasks, and batches run
    /// strictly one after another, so this is also the peak number of
    /// live bid attempts (and busy worker processes) at any instant.
    pub max_concurrent: usize,

    /// Fixed wall-clock cadence between round starts.
    ///
    /// After a round drains, the loop sleeps `interval - elapsed`. A
    /// round that overruns the interval compresses the cadence: the
    /// next round starts immediately, nothing is skipped or caught up.
    pub interval: Duration,

    /// Hard deadline for a single bid attempt.
    ///
    /// Enforced by the executor around the opaque bid operation.
    /// Cancellation past the deadline is advisory; the compensating
    /// action is a forced worker restart.
    pub task_timeout: Duration,

    /// First control-endpoint port; slot `i` listens on `base_port + i`.
    pub base_port: u16,

    /// Pause between readiness probes of a worker's control endpoint.
    pub readiness_poll: Duration,

    /// Total window to wait for a worker's control endpoint to become
    /// reachable before reporting a readiness failure.
    pub readiness_timeout: Duration,

    /// How long a worker gets between the graceful stop signal and the
    /// forced kill.
    pub terminate_grace: Duration,

    /// Maximum wait for the in-flight batch to finish after a shutdown
    /// signal, before workers are torn down anyway.
    pub grace: Duration,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip the oldest items. Minimum 1 (clamped).
    pub bus_capacity: usize,
}

impl Config {
    /// Batch size limit, never zero.
    ///
    /// A `max_concurrent` of 0 would make the drain loop spin forever
    /// on a non-empty queue, so it is clamped to 1.
    #[inline]
    pub fn batch_limit(&self) -> usize {
        self.max_concurrent.max(1)
    }

    /// Control-endpoint port for a slot.
    #[inline]
    pub fn port_for(&self, slot: u32) -> u16 {
        self.base_port.wrapping_add(slot as u16)
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration mirroring the production constants:
    ///
    /// - `max_concurrent = 50`
    /// - `interval = 60s`
    /// - `task_timeout = 60s`
    /// - `base_port = 9000`
    /// - `readiness_poll = 500ms`, `readiness_timeout = 10s`
    /// - `terminate_grace = 3s`, `grace = 30s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            max_concurrent: 50,
            interval: Duration::from_secs(60),
            task_timeout: Duration::from_secs(60),
            base_port: 9000,
            readiness_poll: Duration::from_millis(500),
            readiness_timeout: Duration::from_secs(10),
            terminate_grace: Duration::from_secs(3),
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_limit_is_never_zero() {
        let mut cfg = Config::default();
        cfg.max_concurrent = 0;
        assert_eq!(cfg.batch_limit(), 1);
        cfg.max_concurrent = 50;
        assert_eq!(cfg.batch_limit(), 50);
    }

    #[test]
    fn ports_are_slot_offsets() {
        let cfg = Config::default();
        assert_eq!(cfg.port_for(0), 9000);
        assert_eq!(cfg.port_for(17), 9017);
    }
}
