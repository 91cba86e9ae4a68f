//! Liveness signalling while a session is authenticated.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::SessionStore;

/// Fixed signal period. The identity service treats an actor as online for
/// five minutes after the last signal, so this must stay well inside that.
pub const HEARTBEAT_PERIOD: Duration = Duration::from_secs(120);

/// Counters for signals sent by one scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeartbeatStats {
    pub sent: u64,
    pub failed: u64,
    pub last_sent_at: Option<DateTime<Utc>>,
}

type SharedStats = Arc<Mutex<HeartbeatStats>>;

fn record(stats: &SharedStats, ok: bool) {
    let mut stats = stats.lock().unwrap_or_else(|e| e.into_inner());
    if ok {
        stats.sent += 1;
        stats.last_sent_at = Some(Utc::now());
    } else {
        stats.failed += 1;
    }
}

/// Aborts the wrapped task when dropped.
struct Ticker(JoinHandle<()>);

impl Drop for Ticker {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Watches the session and keeps exactly one ticker alive per authenticated
/// session: the first signal goes out on entry, then every [`HEARTBEAT_PERIOD`].
pub struct HeartbeatScheduler {
    store: Arc<SessionStore>,
    shutdown: Arc<Notify>,
    stats: SharedStats,
}

impl HeartbeatScheduler {
    pub fn new(store: Arc<SessionStore>) -> Self {
        Self {
            store,
            shutdown: Arc::new(Notify::new()),
            stats: Arc::default(),
        }
    }

    /// Spawn the scheduler. Timers live exactly as long as the returned handle.
    pub fn start(self) -> HeartbeatHandle {
        let shutdown = self.shutdown.clone();
        let stats = self.stats.clone();
        let task = tokio::spawn(self.run());
        HeartbeatHandle {
            task,
            shutdown,
            stats,
        }
    }

    async fn run(self) {
        tracing::debug!("heartbeat scheduler started");
        let mut sessions = self.store.subscribe();
        let mut ticker: Option<(u64, Ticker)> = None;

        loop {
            let (authenticated, key) = {
                let session = sessions.borrow_and_update();
                (session.is_authenticated(), session.generation)
            };

            let running = ticker.as_ref().map(|(served, _)| *served);
            match (running, authenticated) {
                (Some(served), true) if served == key => {}
                (previous, true) => {
                    if previous.is_some() {
                        tracing::debug!("new session; restarting heartbeat");
                    }
                    let task = tokio::spawn(beat(self.store.clone(), self.stats.clone()));
                    ticker = Some((key, Ticker(task)));
                    tracing::info!(period_secs = HEARTBEAT_PERIOD.as_secs(), "heartbeat started");
                }
                (Some(_), false) => {
                    ticker = None;
                    tracing::info!("heartbeat stopped");
                }
                (None, false) => {}
            }

            tokio::select! {
                _ = self.shutdown.notified() => break,
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        drop(ticker);
        tracing::debug!("heartbeat scheduler stopped");
    }
}

async fn beat(store: Arc<SessionStore>, stats: SharedStats) {
    let mut interval = tokio::time::interval(HEARTBEAT_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match store.send_heartbeat().await {
            Ok(()) => {
                tracing::debug!("heartbeat sent");
                record(&stats, true);
            }
            Err(e) => {
                tracing::warn!(error = %e, "heartbeat failed");
                record(&stats, false);
            }
        }
    }
}

/// Owner of a running scheduler. Dropping it cancels every timer.
#[derive(Debug)]
pub struct HeartbeatHandle {
    task: JoinHandle<()>,
    shutdown: Arc<Notify>,
    stats: SharedStats,
}

impl HeartbeatHandle {
    pub fn stats(&self) -> HeartbeatStats {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Stop the scheduler and wait for it to release its timer.
    pub async fn shutdown(mut self) {
        self.shutdown.notify_one();
        if let Err(e) = (&mut self.task).await {
            if !e.is_cancelled() {
                tracing::error!(error = %e, "heartbeat scheduler panicked");
            }
        }
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
