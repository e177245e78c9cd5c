//! Shared engine handle and the periodic tick driver
//!
//! The engine lives behind one `RwLock`. Ticks and commands take the write
//! lock for their whole critical section, so readers only ever see the state
//! as of a completed tick or command. If a writer panics anyway, the state
//! is rolled back to the snapshot taken before the write, so a recovered
//! poisoned lock never exposes a half-applied tick.

use crate::events::{Alert, AgentMessage, MessageFilter};
use crate::simulation::{
    CommandOutcome, ControlCommand, EnvironmentState, SimulationEngine, SimulationError,
    SimulationResult, SimulationStatistics, TickReport,
};
use crate::types::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Cloneable handle to the single engine instance
#[derive(Debug, Clone)]
pub struct EngineHandle {
    inner: Arc<RwLock<SimulationEngine>>,
}

impl EngineHandle {
    /// Wrap an engine
    pub fn new(engine: SimulationEngine) -> Self {
        Self { inner: Arc::new(RwLock::new(engine)) }
    }

    /// Build an engine from configuration and wrap it
    pub fn from_config(config: SimulationConfig) -> SimulationResult<Self> {
        Ok(Self::new(SimulationEngine::new(config)?))
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, SimulationEngine> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, SimulationEngine> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure against the engine under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&SimulationEngine) -> R) -> R {
        let guard = self.read_guard();
        f(&*guard)
    }

    /// Run a closure against the engine under the write lock
    ///
    /// A panic inside `f` restores the environment state from before the call
    /// and is then re-raised. Logs and counters written before the panic stay.
    pub fn write<R>(&self, f: impl FnOnce(&mut SimulationEngine) -> R) -> R {
        let mut guard = self.write_guard();
        let last_good = guard.snapshot();
        match panic::catch_unwind(AssertUnwindSafe(|| f(&mut *guard))) {
            Ok(result) => result,
            Err(payload) => {
                error!("Engine write panicked, restoring state as of {}", last_good.simulation_time);
                guard.restore_state(last_good);
                panic::resume_unwind(payload)
            }
        }
    }

    /// Clone the current state
    pub fn snapshot(&self) -> EnvironmentState {
        self.read(SimulationEngine::snapshot)
    }

    /// Clone the current counters
    pub fn statistics(&self) -> SimulationStatistics {
        self.read(|engine| engine.statistics().clone())
    }

    /// Stored alerts
    pub fn alerts(&self) -> Vec<Alert> {
        self.read(SimulationEngine::alerts)
    }

    /// Stored messages matching a filter
    pub fn messages(&self, filter: &MessageFilter) -> Vec<AgentMessage> {
        self.read(|engine| engine.messages(filter))
    }

    /// Run one tick
    pub fn tick(&self, delta_minutes: f64) -> SimulationResult<TickReport> {
        self.write(|engine| engine.update(delta_minutes))
    }

    /// Apply a control command
    pub fn apply(&self, command: ControlCommand) -> CommandOutcome {
        self.write(|engine| engine.apply_command(command))
    }
}

/// How a driver run ended
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSummary {
    /// Ticks that completed
    pub ticks: u64,
    /// Ticks whose clock step failed
    pub failed_ticks: u64,
    /// Whether the run stopped because `max_ticks` was reached
    pub reached_max_ticks: bool,
}

/// Periodic driver invoking one engine update per real-time interval
///
/// The driver is best-effort: ticks that fall behind are skipped, not
/// bunched up.
#[derive(Debug, Clone)]
pub struct TickDriver {
    handle: EngineHandle,
    tick_interval: Duration,
    minutes_per_tick: f64,
    max_ticks: Option<u64>,
}

impl TickDriver {
    /// Create a driver with explicit timing
    pub fn new(handle: EngineHandle, tick_interval: Duration, minutes_per_tick: f64) -> Self {
        Self { handle, tick_interval, minutes_per_tick, max_ticks: None }
    }

    /// Create a driver using the timing of a configuration
    pub fn from_config(handle: EngineHandle, config: &SimulationConfig) -> Self {
        Self {
            handle,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            minutes_per_tick: config.minutes_per_tick,
            max_ticks: config.max_ticks,
        }
    }

    /// Stop after this many ticks
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Spawn the tick loop on the current tokio runtime
    pub fn start(self) -> RunningDriver {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        info!(
            "Starting tick driver: {:?} per tick, {} simulated minutes per tick",
            self.tick_interval, self.minutes_per_tick
        );
        let task = tokio::spawn(self.run(shutdown_rx));
        RunningDriver { shutdown: shutdown_tx, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) -> DriverSummary {
        let mut summary = DriverSummary::default();
        let mut timer = interval(self.tick_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match self.handle.tick(self.minutes_per_tick) {
                Ok(report) => {
                    summary.ticks += 1;
                    debug!("Driver completed tick {} at {}", report.tick, report.simulation_time);
                }
                Err(err) => {
                    summary.failed_ticks += 1;
                    err.log();
                }
            }

            if let Some(max_ticks) = self.max_ticks {
                if summary.ticks + summary.failed_ticks >= max_ticks {
                    summary.reached_max_ticks = true;
                    break;
                }
            }
        }

        info!(
            "Tick driver stopped after {} ticks ({} failed)",
            summary.ticks, summary.failed_ticks
        );
        summary
    }
}

/// A started driver
#[derive(Debug)]
pub struct RunningDriver {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<DriverSummary>,
}

impl RunningDriver {
    /// Ask the loop to stop after any in-flight tick
    pub fn stop(&self) {
        // The receiver is gone once the loop has ended on its own
        let _ = self.shutdown.send(true);
    }

    /// Whether the loop has ended
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to end on its own
    pub async fn wait(self) -> SimulationResult<DriverSummary> {
        self.task.await.map_err(join_error)
    }

    /// Stop the loop and wait for it
    pub async fn shutdown(self) -> SimulationResult<DriverSummary> {
        self.stop();
        self.wait().await
    }

    /// Run until the loop ends on its own or `signal` resolves, whichever is first
    pub async fn stop_on<F>(mut self, signal: F) -> SimulationResult<DriverSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            joined = &mut self.task => return joined.map_err(join_error),
            _ = signal => {}
        }
        self.shutdown().await
    }
}

fn join_error(err: JoinError) -> SimulationError {
    SimulationError::stage_error("driver", format!("tick task failed: {}", err))
}
