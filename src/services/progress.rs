//! Progress Reporting
//!
//! The orchestrator owns a [`ProgressTracker`] and moves it through the run
//! phases synchronously. The [`ProgressSimulator`] adds a cosmetic ticker on
//! top: fixed increments on a fixed interval, capped below 100, as a liveness
//! hint while a provider call is pending. It says nothing about real work.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::models::settings::ProgressSettings;

/// Percent published when a run is accepted.
pub const SUBMITTED_PERCENT: u8 = 0;
/// Percent published when the chain starts.
pub const RUNNING_PERCENT: u8 = 5;
/// Percent published once the result is available.
pub const COMPLETE_PERCENT: u8 = 100;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPhase {
    Idle,
    Submitted,
    Running,
    Completed,
    Failed,
}

impl AnalysisPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, AnalysisPhase::Submitted | AnalysisPhase::Running)
    }
}

impl std::fmt::Display for AnalysisPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AnalysisPhase::Idle => "idle",
            AnalysisPhase::Submitted => "submitted",
            AnalysisPhase::Running => "running",
            AnalysisPhase::Completed => "completed",
            AnalysisPhase::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Externally visible progress of the current (or last) run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub phase: AnalysisPhase,
    pub percent: u8,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            phase: AnalysisPhase::Idle,
            percent: 0,
        }
    }
}

/// Publishes [`ProgressState`] over a watch channel.
///
/// Within one run (from `begin` to the next `begin`) percent never decreases.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<ProgressState>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressState::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ProgressState {
        *self.tx.borrow()
    }

    /// Start a new run. The only place percent is allowed to go back down.
    pub fn begin(&self) {
        self.tx.send_replace(ProgressState {
            phase: AnalysisPhase::Submitted,
            percent: SUBMITTED_PERCENT,
        });
    }

    pub fn running(&self) {
        self.tx.send_modify(|state| {
            state.phase = AnalysisPhase::Running;
            state.percent = state.percent.max(RUNNING_PERCENT);
        });
    }

    /// Ticker step. Only moves while running and never past `cap`.
    ///
    /// Returns whether a new value was published.
    pub fn advance(&self, step: u8, cap: u8) -> bool {
        let cap = cap.min(COMPLETE_PERCENT - 1);
        self.tx.send_if_modified(|state| {
            if state.phase != AnalysisPhase::Running || state.percent >= cap {
                return false;
            }
            state.percent = state.percent.saturating_add(step).min(cap);
            true
        })
    }

    /// Result is available: publish 100 exactly once.
    pub fn complete(&self) {
        self.tx.send_if_modified(|state| {
            if state.phase == AnalysisPhase::Completed {
                return false;
            }
            state.phase = AnalysisPhase::Completed;
            state.percent = COMPLETE_PERCENT;
            true
        });
    }

    pub fn fail(&self) {
        self.tx.send_modify(|state| state.phase = AnalysisPhase::Failed);
    }

    /// Return to idle after a transient failure, keeping the last percent.
    pub fn idle(&self) {
        self.tx.send_modify(|state| state.phase = AnalysisPhase::Idle);
    }
}

/// Cosmetic progress ticker settings
#[derive(Debug, Clone, Copy)]
pub struct ProgressSimulator {
    interval: Duration,
    step: u8,
    cap: u8,
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::from_settings(&ProgressSettings::default())
    }
}

impl ProgressSimulator {
    pub fn new(interval: Duration, step: u8, cap: u8) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            step: step.max(1),
            cap: cap.min(COMPLETE_PERCENT - 1),
        }
    }

    pub fn from_settings(settings: &ProgressSettings) -> Self {
        Self::new(settings.tick_interval(), settings.step, settings.cap)
    }

    /// Spawn the ticker. Must be called inside a tokio runtime.
    pub fn start(&self, tracker: Arc<ProgressTracker>) -> ProgressTicker {
        let Self {
            interval,
            step,
            cap,
        } = *self;
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                tracker.advance(step, cap);
            }
        });
        ProgressTicker { handle }
    }
}

/// Handle to a running ticker. The task is aborted when the handle is
/// stopped or dropped, so no exit path leaves it running.
#[derive(Debug)]
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn stop(self) {}
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
