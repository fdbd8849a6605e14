//! Run state and per-step outcome records

use crate::error::ProvisionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Run is executing steps
    Running,
    /// Every step ran to its recorded outcome
    Completed,
    /// A fatal step failure stopped the run
    Aborted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Aborted)
    }
}

/// Terminal outcome of one step
#[derive(Debug)]
pub enum StepOutcome {
    /// Step did what it had to; `note` carries a no-op or warning detail
    Succeeded { note: Option<String> },
    /// Step was deliberately not executed (existing clone, declined reboot)
    Skipped { reason: String },
    /// Step failed; the error decides whether the run aborts
    Failed { error: ProvisionError },
}

/// One executed (or skipped) step, in run order
#[derive(Debug)]
pub struct StepRecord {
    pub name: &'static str,
    pub ordinal: u32,
    pub outcome: StepOutcome,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl StepRecord {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, StepOutcome::Succeeded { .. })
    }

    pub fn skipped(&self) -> bool {
        matches!(self.outcome, StepOutcome::Skipped { .. })
    }

    pub fn error(&self) -> Option<&ProvisionError> {
        match &self.outcome {
            StepOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Mutable state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Unique run ID
    pub run_id: Uuid,

    /// Current status
    pub status: RunStatus,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run completed or aborted
    pub completed_at: Option<DateTime<Utc>>,

    /// Total number of steps in the plan
    pub total_steps: usize,

    /// Number of steps that succeeded
    pub completed_steps: usize,

    /// Number of non-fatal failures recorded as warnings
    pub warned_steps: usize,

    /// Number of steps skipped (existing clone, declined reboot)
    pub skipped_steps: usize,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Pending,
            started_at: None,
            completed_at: None,
            total_steps: 0,
            completed_steps: 0,
            warned_steps: 0,
            skipped_steps: 0,
        }
    }

    pub fn start(&mut self, total_steps: usize) {
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
        self.total_steps = total_steps;
    }

    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn abort(&mut self) {
        self.status = RunStatus::Aborted;
        self.completed_at = Some(Utc::now());
    }

    /// Progress fraction (0.0 to 1.0) over recorded steps
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        (self.completed_steps + self.warned_steps + self.skipped_steps) as f64
            / self.total_steps as f64
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Overall run outcome
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step ran (successes, warnings, and skips included)
    Completed,
    /// Execution stopped at the named step
    Aborted { step: &'static str },
}

/// Final report of one run: outcome plus the ordered step records
#[derive(Debug)]
pub struct RunReport {
    pub state: RunState,
    pub outcome: RunOutcome,
    pub records: Vec<StepRecord>,
}

impl RunReport {
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }

    /// The error of the step that aborted the run, if any
    pub fn aborting_error(&self) -> Option<&ProvisionError> {
        match &self.outcome {
            RunOutcome::Aborted { step } => self
                .records
                .iter()
                .find(|r| r.name == *step)
                .and_then(|r| r.error()),
            RunOutcome::Completed => None,
        }
    }

    /// Process exit code for this run
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            RunOutcome::Completed => 0,
            RunOutcome::Aborted { .. } => {
                self.aborting_error().map(|e| e.exit_code()).unwrap_or(1)
            }
        }
    }

    /// Look up a record by step name
    pub fn record(&self, name: &str) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}
