//! # Browser-backed worker lifecycle.
//!
//! Spawns one Chrome-like process per slot with an isolated profile
//! directory and a deterministic remote-debugging port
//! (`base_port + slot`). Health is a TCP connect to the debug port,
//! optionally extended with a tab-list probe (`GET /json`, target URL
//! substring match) for deployments where the operator navigates the
//! page by hand and the scheduler must wait for it.
//!
//! Termination follows the graceful-then-forceful policy: SIGTERM on
//! unix, a bounded wait, then a hard kill.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tracing::{debug, trace, warn};

use crate::error::WorkerError;

use super::lifecycle::{Worker, WorkerLifecycle};

/// Configuration of the browser lifecycle.
#[derive(Clone, Debug)]
pub struct BrowserConfig {
    /// Browser binary to launch.
    pub binary: PathBuf,
    /// Root under which per-slot profile directories are created
    /// (`<profile_root>/session-<slot>`).
    pub profile_root: PathBuf,
    /// First debug port; slot `i` listens on `base_port + i`.
    pub base_port: u16,
    /// When set, `health_check` additionally requires a tab whose URL
    /// contains the target reference (manual-navigation deployments).
    pub page_check: bool,
    /// Per-probe timeout for the TCP connect and the tab-list request.
    pub probe_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("google-chrome"),
            profile_root: PathBuf::from("/tmp/bidvisor-sessions"),
            base_port: 9000,
            page_check: false,
            probe_timeout: Duration::from_secs(2),
        }
    }
}

impl BrowserConfig {
    /// Debug port for a slot.
    #[inline]
    pub fn port_for(&self, slot: u32) -> u16 {
        self.base_port.wrapping_add(slot as u16)
    }

    /// Per-slot profile directory.
    #[inline]
    pub fn profile_for(&self, slot: u32) -> PathBuf {
        self.profile_root.join(format!("session-{slot}"))
    }
}

/// Lifecycle implementation spawning one browser process per slot.
pub struct BrowserLifecycle {
    cfg: BrowserConfig,
    http: reqwest::Client,
}

impl BrowserLifecycle {
    /// Creates the lifecycle for the given configuration.
    pub fn new(cfg: BrowserConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(cfg.probe_timeout)
            .build()
            .unwrap_or_default();
        Self { cfg, http }
    }

    /// Whether any open tab's URL contains the target reference.
    async fn page_open(&self, port: u16, target: &str) -> bool {
        let url = format!("http://127.0.0.1:{port}/json");
        let resp = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                trace!(port, error = %e, "tab list unreachable");
                return false;
            }
        };
        let tabs: Vec<serde_json::Value> = match resp.json().await {
            Ok(t) => t,
            Err(_) => return false,
        };
        tabs.iter()
            .filter_map(|tab| tab.get("url").and_then(|u| u.as_str()))
            .any(|u| u.contains(target))
    }
}

#[async_trait]
impl WorkerLifecycle for BrowserLifecycle {
    async fn start(&self, slot: u32, target: &str) -> Result<Box<dyn Worker>, WorkerError> {
        let port = self.cfg.port_for(slot);
        let profile = self.cfg.profile_for(slot);
        tokio::fs::create_dir_all(&profile)
            .await
            .map_err(|source| WorkerError::Spawn { slot, source })?;

        debug!(slot, port, target, "spawning browser");
        let child = Command::new(&self.cfg.binary)
            .arg(format!("--remote-debugging-port={port}"))
            .arg(format!("--user-data-dir={}", profile.display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-popup-blocking")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-component-update")
            .spawn()
            .map_err(|source| WorkerError::Spawn { slot, source })?;

        Ok(Box::new(BrowserWorker { child }))
    }

    async fn health_check(&self, slot: u32, target: &str) -> bool {
        let port = self.cfg.port_for(slot);
        let addr = ("127.0.0.1", port);
        let reachable = matches!(
            tokio::time::timeout(self.cfg.probe_timeout, TcpStream::connect(addr)).await,
            Ok(Ok(_))
        );
        if !reachable {
            return false;
        }
        if self.cfg.page_check {
            return self.page_open(port, target).await;
        }
        true
    }
}

/// One spawned browser process.
struct BrowserWorker {
    child: Child,
}

#[async_trait]
impl Worker for BrowserWorker {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn terminate(&mut self, grace: Duration) {
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            use nix::sys::signal::{Signal, kill};
            use nix::unistd::Pid;
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(?status, "browser exited after signal");
            }
            Ok(Err(e)) => {
                warn!(error = %e, "wait on browser failed; killing");
                let _ = self.child.kill().await;
            }
            Err(_elapsed) => {
                debug!("browser ignored signal; killing");
                let _ = self.child.kill().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_and_profiles_derive_from_slot() {
        let cfg = BrowserConfig {
            base_port: 9100,
            profile_root: PathBuf::from("/tmp/x"),
            ..BrowserConfig::default()
        };
        assert_eq!(cfg.port_for(7), 9107);
        assert_eq!(cfg.profile_for(7), PathBuf::from("/tmp/x/session-7"));
    }

    #[tokio::test]
    async fn health_check_fails_on_dark_port() {
        let cfg = BrowserConfig {
            // reserved port nothing listens on in the test environment
            base_port: 1,
            probe_timeout: Duration::from_millis(100),
            ..BrowserConfig::default()
        };
        let lc = BrowserLifecycle::new(cfg);
        assert!(!lc.health_check(0, "https://a.example/1").await);
    }
}
