//! Test utility functions for rvm-setup

use rvm_setup::core::{Plan, ProvisionConfig, RunOutcome, RunReport, StepOutcome};
use rvm_setup::execution::{Confirmation, Confirmer, ProvisionRunner};
use rvm_setup::host::{Host, HostError, RewriteOutcome, SourcePresence};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Mock host that records capability calls in order and fails on demand
pub struct MockHost {
    calls: Mutex<Vec<&'static str>>,
    fail: HashMap<&'static str, String>,
    deny: HashSet<&'static str>,
    presence: SourcePresence,
    rewrite: RewriteOutcome,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: HashMap::new(),
            deny: HashSet::new(),
            presence: SourcePresence::Absent,
            rewrite: RewriteOutcome::Rewritten,
        }
    }

    /// Make the named capability fail with a non-zero exit
    pub fn fail_on(mut self, capability: &'static str, stderr: &str) -> Self {
        self.fail.insert(capability, stderr.to_string());
        self
    }

    /// Make the named capability fail with a privilege refusal
    pub fn deny(mut self, capability: &'static str) -> Self {
        self.deny.insert(capability);
        self
    }

    pub fn with_presence(mut self, presence: SourcePresence) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_rewrite(mut self, rewrite: RewriteOutcome) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// Capability calls recorded so far, in invocation order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, capability: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| *c == capability)
    }

    pub fn call_count(&self, capability: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == capability)
            .count()
    }

    fn attempt(&self, capability: &'static str) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(capability);

        if self.deny.contains(capability) {
            return Err(HostError::PermissionDenied(capability.to_string()));
        }
        if let Some(stderr) = self.fail.get(capability) {
            return Err(HostError::NonZeroExit {
                program: capability.to_string(),
                code: 1,
                stderr: stderr.clone(),
            });
        }
        Ok(())
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Host for MockHost {
    async fn rewrite_package_source(
        &self,
        _stock: &str,
        _mirror: &str,
    ) -> Result<RewriteOutcome, HostError> {
        self.attempt("rewrite_package_source")?;
        Ok(self.rewrite)
    }

    async fn refresh_package_index(&self) -> Result<(), HostError> {
        self.attempt("refresh_package_index")
    }

    async fn install_packages(&self, _packages: &[String]) -> Result<(), HostError> {
        self.attempt("install_packages")
    }

    async fn ensure_directory(&self, _path: &Path) -> Result<(), HostError> {
        self.attempt("ensure_directory")
    }

    async fn link_file(&self, _target: &Path, _link: &Path) -> Result<(), HostError> {
        self.attempt("link_file")
    }

    async fn source_presence(
        &self,
        _dir: &Path,
        _remote: &str,
        _branch: &str,
    ) -> Result<SourcePresence, HostError> {
        self.attempt("source_presence")?;
        Ok(self.presence)
    }

    async fn clone_source(
        &self,
        _remote: &str,
        _branch: &str,
        _dir: &Path,
    ) -> Result<(), HostError> {
        self.attempt("clone_source")
    }

    async fn build_source(&self, _dir: &Path) -> Result<(), HostError> {
        self.attempt("build_source")
    }

    async fn update_kernel_cmdline(&self, _dir: &Path, _script: &Path) -> Result<(), HostError> {
        self.attempt("update_kernel_cmdline")
    }

    async fn apply_boot_config(&self) -> Result<(), HostError> {
        self.attempt("apply_boot_config")
    }

    async fn reboot(&self) -> Result<(), HostError> {
        self.attempt("reboot")
    }
}

/// Confirmer that returns a scripted answer and counts how often it was asked
pub struct ScriptedConfirm {
    answer: Confirmation,
    asked: Arc<AtomicUsize>,
}

impl ScriptedConfirm {
    pub fn new(answer: Confirmation) -> (Self, Arc<AtomicUsize>) {
        let asked = Arc::new(AtomicUsize::new(0));
        (
            Self {
                answer,
                asked: asked.clone(),
            },
            asked,
        )
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirm {
    async fn confirm(&self, _prompt: &str) -> Confirmation {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

/// Run the standard plan against a mock host
pub async fn run_standard_plan(
    host: Arc<MockHost>,
    config: ProvisionConfig,
    confirmer: Box<dyn Confirmer>,
) -> RunReport {
    let plan = Plan::standard();
    plan.validate().expect("standard plan must validate");

    let runner = ProvisionRunner::new(host, config, confirmer);
    runner.run(&plan).await
}

/// Assert the run completed (warnings and skips allowed)
pub fn assert_completed(report: &RunReport) {
    assert!(
        matches!(report.outcome, RunOutcome::Completed),
        "expected completed run, got {:?}",
        report.outcome
    );
}

/// Assert the run aborted at the named step
pub fn assert_aborted_at(report: &RunReport, name: &str) {
    match &report.outcome {
        RunOutcome::Aborted { step } => assert_eq!(
            *step, name,
            "expected abort at '{}', aborted at '{}'",
            name, step
        ),
        RunOutcome::Completed => panic!("expected abort at '{}', run completed", name),
    }

    // The aborting step is the last record; nothing after it ran
    assert_eq!(report.records.last().map(|r| r.name), Some(name));
}

/// Assert the named step was recorded as skipped
pub fn assert_step_skipped(report: &RunReport, name: &str) {
    let record = report
        .record(name)
        .unwrap_or_else(|| panic!("no record for step '{}'", name));
    assert!(
        matches!(record.outcome, StepOutcome::Skipped { .. }),
        "expected '{}' skipped, got {:?}",
        name,
        record.outcome
    );
}

/// Assert the named step was recorded as succeeded
pub fn assert_step_succeeded(report: &RunReport, name: &str) {
    let record = report
        .record(name)
        .unwrap_or_else(|| panic!("no record for step '{}'", name));
    assert!(
        record.succeeded(),
        "expected '{}' succeeded, got {:?}",
        name,
        record.outcome
    );
}
