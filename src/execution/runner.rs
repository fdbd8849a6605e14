//! Provisioning runner - the sequential fail-fast loop

use crate::{
    core::{Plan, ProvisionConfig, RunOutcome, RunReport, RunState, RunStatus, Step, StepOutcome,
        StepRecord},
    execution::{Confirmation, Confirmer, StepExecutor},
    host::Host,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events emitted while a run progresses
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: Uuid,
        total_steps: usize,
    },
    StepStarted {
        name: &'static str,
        ordinal: u32,
        total_steps: usize,
    },
    StepCompleted {
        name: &'static str,
        note: Option<String>,
    },
    StepSkipped {
        name: &'static str,
        reason: String,
    },
    /// Non-fatal failure; the run continues
    StepWarned {
        name: &'static str,
        error: String,
    },
    /// Fatal failure; the run aborts
    StepFailed {
        name: &'static str,
        error: String,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(RunEvent) + Send + Sync>;

/// Executes a plan to completion or first fatal failure.
///
/// Strictly sequential: each step's side effects are in place before
/// the next step starts. No retries, no rollback; a re-run starts again
/// from the first step.
pub struct ProvisionRunner<H> {
    executor: StepExecutor<H>,
    confirmer: Box<dyn Confirmer>,
    event_handlers: Vec<EventHandler>,
}

impl<H: Host> ProvisionRunner<H> {
    pub fn new(host: Arc<H>, config: ProvisionConfig, confirmer: Box<dyn Confirmer>) -> Self {
        Self {
            executor: StepExecutor::new(host, config),
            confirmer,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(RunEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: RunEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the plan
    pub async fn run(&self, plan: &Plan) -> RunReport {
        let mut state = RunState::new();
        let run_id = state.run_id;
        state.start(plan.len());

        info!("Starting provisioning run {}", run_id);
        self.emit(RunEvent::RunStarted {
            run_id,
            total_steps: plan.len(),
        });

        let mut records: Vec<StepRecord> = Vec::with_capacity(plan.len());
        let mut aborted_at: Option<&'static str> = None;

        for step in plan.steps() {
            self.emit(RunEvent::StepStarted {
                name: step.name,
                ordinal: step.ordinal,
                total_steps: plan.len(),
            });

            let started_at = Utc::now();
            let outcome = self.execute_gated(step).await;
            let completed_at = Utc::now();

            let abort = match &outcome {
                StepOutcome::Succeeded { note } => {
                    state.completed_steps += 1;
                    self.emit(RunEvent::StepCompleted {
                        name: step.name,
                        note: note.clone(),
                    });
                    false
                }
                StepOutcome::Skipped { reason } => {
                    state.skipped_steps += 1;
                    info!("Step '{}' skipped: {}", step.name, reason);
                    self.emit(RunEvent::StepSkipped {
                        name: step.name,
                        reason: reason.clone(),
                    });
                    false
                }
                StepOutcome::Failed { error } => {
                    if step.fatal || error.always_fatal() {
                        error!("Step '{}' failed: {}", step.name, error);
                        self.emit(RunEvent::StepFailed {
                            name: step.name,
                            error: error.to_string(),
                        });
                        true
                    } else {
                        state.warned_steps += 1;
                        warn!("Step '{}' failed (non-fatal): {}", step.name, error);
                        self.emit(RunEvent::StepWarned {
                            name: step.name,
                            error: error.to_string(),
                        });
                        false
                    }
                }
            };

            records.push(StepRecord {
                name: step.name,
                ordinal: step.ordinal,
                outcome,
                started_at,
                completed_at,
            });

            if abort {
                aborted_at = Some(step.name);
                break;
            }
        }

        let outcome = match aborted_at {
            Some(step) => {
                state.abort();
                RunOutcome::Aborted { step }
            }
            None => {
                state.complete();
                RunOutcome::Completed
            }
        };

        info!(
            "Provisioning run {} finished: {:?}",
            run_id, state.status
        );
        self.emit(RunEvent::RunFinished {
            run_id,
            status: state.status,
        });

        RunReport {
            state,
            outcome,
            records,
        }
    }

    /// Execute one step, passing it through the confirmation gate first
    /// when the step requires it.
    ///
    /// A declined or timed-out confirmation skips the step; the gated
    /// command is never issued without an explicit yes.
    async fn execute_gated(&self, step: &Step) -> StepOutcome {
        if step.confirm {
            let prompt = format!("{} now to finish provisioning?", step.name);
            match self.confirmer.confirm(&prompt).await {
                Confirmation::Yes => {}
                Confirmation::No => {
                    return StepOutcome::Skipped {
                        reason: "declined by operator; reboot manually to finish".to_string(),
                    }
                }
                Confirmation::TimedOut => {
                    return StepOutcome::Skipped {
                        reason: "confirmation timed out; reboot manually to finish".to_string(),
                    }
                }
            }
        }
        self.executor.execute(step).await
    }
}
