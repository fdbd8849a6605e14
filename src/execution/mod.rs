//! Provisioning execution engine

pub mod confirm;
pub mod executor;
pub mod runner;

pub use confirm::{AutoConfirm, Confirmation, Confirmer, TerminalConfirm};
pub use executor::StepExecutor;
pub use runner::{EventHandler, ProvisionRunner, RunEvent};
