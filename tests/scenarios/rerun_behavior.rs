//! Test: Re-run behavior - the clone step against a provisioned host

use crate::helpers::*;
use rvm_setup::core::{ExistingSourcePolicy, ProvisionConfig};
use rvm_setup::execution::AutoConfirm;
use rvm_setup::host::SourcePresence;
use rvm_setup::ProvisionError;
use std::sync::Arc;

/// A matching clone from a prior run is skipped and the build proceeds
#[tokio::test]
async fn test_existing_matching_clone_is_skipped() {
    let host = Arc::new(MockHost::new().with_presence(SourcePresence::PresentMatching));
    let report = run_standard_plan(
        host.clone(),
        ProvisionConfig::default(),
        Box::new(AutoConfirm),
    )
    .await;

    assert_completed(&report);
    assert_step_skipped(&report, "Clone hypervisor source");

    assert!(!host.called("clone_source"));
    assert!(host.called("build_source"));
    assert!(host.called("reboot"));
}

/// With the fail policy a matching clone aborts with its own category,
/// not a generic clone failure
#[tokio::test]
async fn test_existing_matching_clone_fails_when_configured() {
    let host = Arc::new(MockHost::new().with_presence(SourcePresence::PresentMatching));
    let config = ProvisionConfig {
        on_existing_source: ExistingSourcePolicy::Fail,
        ..Default::default()
    };
    let report = run_standard_plan(host.clone(), config, Box::new(AutoConfirm)).await;

    assert_aborted_at(&report, "Clone hypervisor source");
    assert_eq!(report.exit_code(), 14);
    assert!(matches!(
        report.aborting_error(),
        Some(ProvisionError::SourceAlreadyExists { .. })
    ));

    assert!(!host.called("clone_source"));
    assert!(!host.called("build_source"));
}

/// A conflicting directory aborts regardless of the skip policy
#[tokio::test]
async fn test_conflicting_source_always_aborts() {
    let host = Arc::new(MockHost::new().with_presence(SourcePresence::PresentConflicting));
    let report = run_standard_plan(
        host.clone(),
        ProvisionConfig::default(),
        Box::new(AutoConfirm),
    )
    .await;

    assert_aborted_at(&report, "Clone hypervisor source");
    assert!(matches!(
        report.aborting_error(),
        Some(ProvisionError::SourceAlreadyExists { .. })
    ));
    assert!(!host.called("clone_source"));
}

/// The presence probe runs before every clone attempt
#[tokio::test]
async fn test_clone_is_probed_before_mutation() {
    let host = Arc::new(MockHost::new());
    let report = run_standard_plan(
        host.clone(),
        ProvisionConfig::default(),
        Box::new(AutoConfirm),
    )
    .await;

    assert_completed(&report);

    let calls = host.calls();
    let probe = calls.iter().position(|c| *c == "source_presence").unwrap();
    let clone = calls.iter().position(|c| *c == "clone_source").unwrap();
    assert!(probe < clone);
}
