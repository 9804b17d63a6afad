//! Background scheduler for contest refreshes.
//!
//! The first refresh runs after an initial delay, then on a fixed interval.
//! A failed tick is recorded and the next one happens on schedule; there is
//! no backoff.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{RwLock, mpsc};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{ServerError, ServerResult};

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Delay before the first refresh.
    pub initial_delay: Duration,
    /// Delay between refreshes after the first one.
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30 * 60),
            interval: Duration::from_secs(60 * 60),
        }
    }
}

impl SchedulerConfig {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
        }
    }
}

/// Commands that can be sent to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Run a refresh now; the periodic schedule is unchanged.
    SyncNow,
    /// Skip periodic ticks until resumed.
    Pause,
    Resume,
    Stop,
}

/// Scheduler state.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub paused: bool,
    pub consecutive_failures: u32,
    /// Last successful refresh.
    pub last_sync: Option<DateTime<Utc>>,
    /// Last refresh attempt, successful or not.
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Number of refreshes attempted.
    pub runs: u64,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.runs += 1;
        self.consecutive_failures = 0;
        self.last_sync = Some(Utc::now());
        self.last_attempt = self.last_sync;
        self.last_error = None;
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.runs += 1;
        self.consecutive_failures += 1;
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.into());
    }
}

/// Shared scheduler state.
pub type SharedSchedulerState = Arc<RwLock<SchedulerState>>;

/// The scheduler drives periodic background refreshes.
pub struct Scheduler {
    config: SchedulerConfig,
    state: SharedSchedulerState,
    command_tx: mpsc::Sender<SchedulerCommand>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    /// Creates a scheduler. A zero interval is refused, as the loop would
    /// never wait between ticks.
    pub fn new(config: SchedulerConfig) -> ServerResult<Self> {
        if config.interval.is_zero() {
            return Err(ServerError::config("scheduler interval must be positive"));
        }
        let (command_tx, command_rx) = mpsc::channel(16);
        Ok(Self {
            config,
            state: Arc::new(RwLock::new(SchedulerState::new())),
            command_tx,
            command_rx,
        })
    }

    /// Returns a handle for sending commands to the scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            command_tx: self.command_tx.clone(),
            state: self.state.clone(),
        }
    }

    /// Runs the scheduler loop until stopped.
    ///
    /// `sync_fn` returns `Ok(())` on success or an error message.
    pub async fn run<F, Fut>(mut self, sync_fn: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), String>> + Send,
    {
        info!(
            initial_delay_secs = self.config.initial_delay.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "scheduler started"
        );

        let mut next_tick = Instant::now() + self.config.initial_delay;

        loop {
            debug!(
                in_secs = next_tick.saturating_duration_since(Instant::now()).as_secs(),
                "next scheduled refresh"
            );

            tokio::select! {
                _ = tokio::time::sleep_until(next_tick) => {
                    next_tick += self.config.interval;
                    if self.state.read().await.paused {
                        debug!("scheduler paused, skipping refresh");
                        continue;
                    }
                    self.do_sync(&sync_fn).await;
                }
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::SyncNow) => {
                            debug!("received SyncNow command");
                            self.do_sync(&sync_fn).await;
                        }
                        Some(SchedulerCommand::Pause) => {
                            info!("scheduler paused");
                            self.state.write().await.paused = true;
                        }
                        Some(SchedulerCommand::Resume) => {
                            info!("scheduler resumed");
                            self.state.write().await.paused = false;
                        }
                        Some(SchedulerCommand::Stop) | None => {
                            info!("scheduler stopping");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn do_sync<F, Fut>(&self, sync_fn: &F)
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<(), String>>,
    {
        match sync_fn().await {
            Ok(()) => {
                debug!("scheduled refresh completed");
                self.state.write().await.record_success();
            }
            Err(e) => {
                warn!(error = %e, "scheduled refresh failed");
                self.state.write().await.record_failure(e);
            }
        }
    }
}

/// Handle for sending commands to a running scheduler.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: SharedSchedulerState,
}

impl SchedulerHandle {
    async fn send(&self, command: SchedulerCommand) -> Result<(), SendError<SchedulerCommand>> {
        self.command_tx.send(command).await
    }

    pub async fn sync_now(&self) -> Result<(), SendError<SchedulerCommand>> {
        self.send(SchedulerCommand::SyncNow).await
    }

    pub async fn pause(&self) -> Result<(), SendError<SchedulerCommand>> {
        self.send(SchedulerCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<(), SendError<SchedulerCommand>> {
        self.send(SchedulerCommand::Resume).await
    }

    /// Asks the loop to exit after the current refresh, if any.
    pub async fn stop(&self) -> Result<(), SendError<SchedulerCommand>> {
        self.send(SchedulerCommand::Stop).await
    }

    /// Returns a copy of the current scheduler state.
    pub async fn state(&self) -> SchedulerState {
        self.state.read().await.clone()
    }

    pub async fn is_paused(&self) -> bool {
        self.state.read().await.paused
    }
}
