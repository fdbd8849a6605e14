//! rvm-setup - host provisioning for the RVM hypervisor

pub mod cli;
pub mod core;
pub mod error;
pub mod execution;
pub mod host;

// Re-export commonly used types
pub use crate::core::{
    ExistingSourcePolicy, Facet, Plan, ProvisionConfig, RunOutcome, RunReport, RunState,
    RunStatus, Step, StepAction, StepOutcome, StepRecord,
};
pub use crate::error::ProvisionError;
pub use crate::execution::{
    AutoConfirm, Confirmation, Confirmer, ProvisionRunner, RunEvent, StepExecutor,
    TerminalConfirm,
};
pub use crate::host::{
    CommandRunner, CommandSpec, Host, HostError, RewriteOutcome, SourcePresence, SystemHost,
};
