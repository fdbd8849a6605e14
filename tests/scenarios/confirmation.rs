//! Test: Reboot confirmation gating

use crate::helpers::*;
use rvm_setup::core::ProvisionConfig;
use rvm_setup::execution::{AutoConfirm, Confirmation};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// A declined confirmation skips the reboot; the run still completes
#[tokio::test]
async fn test_declined_confirmation_skips_reboot() {
    let host = Arc::new(MockHost::new());
    let (confirmer, asked) = ScriptedConfirm::new(Confirmation::No);
    let report = run_standard_plan(
        host.clone(),
        ProvisionConfig::default(),
        Box::new(confirmer),
    )
    .await;

    assert_completed(&report);
    assert_eq!(report.exit_code(), 0);
    assert_step_skipped(&report, "Reboot");

    assert_eq!(asked.load(Ordering::SeqCst), 1);
    assert!(!host.called("reboot"));
}

/// A timed-out confirmation behaves like a decline
#[tokio::test]
async fn test_timed_out_confirmation_skips_reboot() {
    let host = Arc::new(MockHost::new());
    let (confirmer, _asked) = ScriptedConfirm::new(Confirmation::TimedOut);
    let report = run_standard_plan(
        host.clone(),
        ProvisionConfig::default(),
        Box::new(confirmer),
    )
    .await;

    assert_completed(&report);
    assert_step_skipped(&report, "Reboot");
    assert!(!host.called("reboot"));
}

/// Confirmation is never requested once a fatal step has aborted the run
#[tokio::test]
async fn test_no_confirmation_after_abort() {
    let host = Arc::new(MockHost::new().fail_on("build_source", "make failed"));
    let (confirmer, asked) = ScriptedConfirm::new(Confirmation::Yes);
    let report = run_standard_plan(
        host.clone(),
        ProvisionConfig::default(),
        Box::new(confirmer),
    )
    .await;

    assert_aborted_at(&report, "Build hypervisor source");
    assert_eq!(asked.load(Ordering::SeqCst), 0);
    assert!(!host.called("reboot"));
}

/// The bypass confirmer reboots without asking
#[tokio::test]
async fn test_auto_confirm_reboots() {
    let host = Arc::new(MockHost::new());
    let report = run_standard_plan(
        host.clone(),
        ProvisionConfig::default(),
        Box::new(AutoConfirm),
    )
    .await;

    assert_completed(&report);
    assert_step_succeeded(&report, "Reboot");
    assert_eq!(host.call_count("reboot"), 1);
}
