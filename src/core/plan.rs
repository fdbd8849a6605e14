//! The provisioning plan - a fixed ordered catalog of steps

use crate::core::step::{Facet, Step, StepAction};
use anyhow::Result;
use serde::Serialize;
use std::collections::HashSet;

/// An immutable ordered sequence of provisioning steps
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    /// The standard host-provisioning catalog.
    ///
    /// Order is load-bearing: each step assumes the host state left by
    /// the steps before it, which `validate` checks via facets.
    pub fn standard() -> Self {
        let steps = vec![
            Step::new(
                "Repoint package mirror",
                1,
                StepAction::RepointMirror,
                false,
                true,
                &[],
                &[Facet::MirrorConfigured],
            ),
            Step::new(
                "Refresh package index",
                2,
                StepAction::RefreshIndex,
                true,
                true,
                &[Facet::MirrorConfigured],
                &[Facet::FreshIndex],
            ),
            Step::new(
                "Install build dependencies",
                3,
                StepAction::InstallPackages,
                true,
                true,
                &[Facet::FreshIndex],
                &[Facet::DepsInstalled],
            ),
            Step::new(
                "Create firmware directory",
                4,
                StepAction::CreateFirmwareDir,
                false,
                true,
                &[],
                &[Facet::FirmwareDir],
            ),
            Step::new(
                "Link firmware image",
                5,
                StepAction::LinkFirmware,
                true,
                true,
                &[Facet::FirmwareDir],
                &[Facet::FirmwareLinked],
            ),
            Step::new(
                "Clone hypervisor source",
                6,
                StepAction::CloneSource,
                true,
                false,
                &[Facet::DepsInstalled],
                &[Facet::SourcePresent],
            ),
            Step::new(
                "Build hypervisor source",
                7,
                StepAction::BuildSource,
                true,
                true,
                &[Facet::DepsInstalled, Facet::SourcePresent],
                &[Facet::SourceBuilt],
            ),
            Step::new(
                "Update kernel command line",
                8,
                StepAction::UpdateCmdline,
                true,
                false,
                &[Facet::SourcePresent, Facet::SourceBuilt],
                &[Facet::CmdlineUpdated],
            ),
            Step::new(
                "Apply boot-loader configuration",
                9,
                StepAction::ApplyBootConfig,
                true,
                true,
                &[Facet::CmdlineUpdated],
                &[Facet::BootConfigApplied],
            ),
            Step::new(
                "Reboot",
                10,
                StepAction::Reboot,
                true,
                false,
                &[
                    Facet::FirmwareLinked,
                    Facet::SourceBuilt,
                    Facet::BootConfigApplied,
                ],
                &[],
            )
            .with_confirmation(),
        ];

        Plan { steps }
    }

    /// Build a plan from an explicit step list (tests, trimmed runs)
    pub fn from_steps(steps: Vec<Step>) -> Self {
        Plan { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Validate plan structure before execution.
    ///
    /// Checks that ordinals are strictly increasing and unique, and that
    /// every facet a step requires is provided by some earlier step.
    pub fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            anyhow::bail!("plan contains no steps");
        }

        let mut last_ordinal = 0u32;
        let mut provided: HashSet<Facet> = HashSet::new();

        for step in &self.steps {
            if step.ordinal <= last_ordinal {
                anyhow::bail!(
                    "step '{}' has ordinal {} which does not increase past {}",
                    step.name,
                    step.ordinal,
                    last_ordinal
                );
            }
            last_ordinal = step.ordinal;

            for facet in step.requires {
                if !provided.contains(facet) {
                    anyhow::bail!(
                        "step '{}' requires {:?} which no earlier step provides",
                        step.name,
                        facet
                    );
                }
            }
            provided.extend(step.provides.iter().copied());
        }

        Ok(())
    }
}
