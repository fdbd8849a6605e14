//! Step executor - dispatches one step against the host capabilities

use crate::{
    core::{ExistingSourcePolicy, ProvisionConfig, Step, StepAction, StepOutcome},
    error::ProvisionError,
    host::{Host, HostError, RewriteOutcome, SourcePresence},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Translate a host-level failure into the failing step's error
/// category. Privilege refusals keep their own category regardless of
/// which step tripped them.
fn categorize(err: HostError, wrap: fn(String) -> ProvisionError) -> ProvisionError {
    match err {
        HostError::PermissionDenied(program) => {
            ProvisionError::PrivilegeDenied(format!("while running {}", program))
        }
        other => wrap(other.to_string()),
    }
}

fn ok() -> StepOutcome {
    StepOutcome::Succeeded { note: None }
}

fn ok_with(note: impl Into<String>) -> StepOutcome {
    StepOutcome::Succeeded {
        note: Some(note.into()),
    }
}

/// Executes a single step
pub struct StepExecutor<H> {
    host: Arc<H>,
    config: ProvisionConfig,
}

impl<H: Host> StepExecutor<H> {
    pub fn new(host: Arc<H>, config: ProvisionConfig) -> Self {
        Self { host, config }
    }

    /// Execute a step and return its terminal outcome
    pub async fn execute(&self, step: &Step) -> StepOutcome {
        info!("Executing step: {}", step.name);
        debug!("Step action: {:?}", step.action);

        match step.action {
            StepAction::RepointMirror => self.repoint_mirror().await,
            StepAction::RefreshIndex => self.refresh_index().await,
            StepAction::InstallPackages => self.install_packages().await,
            StepAction::CreateFirmwareDir => self.create_firmware_dir().await,
            StepAction::LinkFirmware => self.link_firmware().await,
            StepAction::CloneSource => self.clone_source().await,
            StepAction::BuildSource => self.build_source().await,
            StepAction::UpdateCmdline => self.update_cmdline().await,
            StepAction::ApplyBootConfig => self.apply_boot_config().await,
            StepAction::Reboot => self.reboot().await,
        }
    }

    async fn repoint_mirror(&self) -> StepOutcome {
        match self
            .host
            .rewrite_package_source(&self.config.stock_archive, &self.config.mirror)
            .await
        {
            Ok(RewriteOutcome::Rewritten) => ok(),
            Ok(RewriteOutcome::AlreadyApplied) => {
                info!("Mirror already configured; sources left unchanged");
                ok_with("mirror already configured")
            }
            Ok(RewriteOutcome::PatternMissing) => {
                warn!(
                    "Stock archive host '{}' not found in {}; sources left unchanged",
                    self.config.stock_archive,
                    self.config.sources_file.display()
                );
                ok_with("stock archive pattern not found; sources left unchanged")
            }
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::ConfigWrite),
            },
        }
    }

    async fn refresh_index(&self) -> StepOutcome {
        match self.host.refresh_package_index().await {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::PackageIndex),
            },
        }
    }

    async fn install_packages(&self) -> StepOutcome {
        match self.host.install_packages(&self.config.packages).await {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::PackageInstall),
            },
        }
    }

    async fn create_firmware_dir(&self) -> StepOutcome {
        match self.host.ensure_directory(&self.config.firmware_dir).await {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::Filesystem),
            },
        }
    }

    async fn link_firmware(&self) -> StepOutcome {
        let link = self.config.firmware_link();
        match self
            .host
            .link_file(&self.config.firmware_image, &link)
            .await
        {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::Filesystem),
            },
        }
    }

    async fn clone_source(&self) -> StepOutcome {
        let dir = &self.config.source_dir;

        let presence = match self
            .host
            .source_presence(dir, &self.config.repo_url, &self.config.branch)
            .await
        {
            Ok(p) => p,
            Err(e) => {
                return StepOutcome::Failed {
                    error: categorize(e, ProvisionError::Clone),
                }
            }
        };

        match presence {
            SourcePresence::Absent => {
                match self
                    .host
                    .clone_source(&self.config.repo_url, &self.config.branch, dir)
                    .await
                {
                    Ok(()) => ok(),
                    Err(e) => StepOutcome::Failed {
                        error: categorize(e, ProvisionError::Clone),
                    },
                }
            }
            SourcePresence::PresentMatching => match self.config.on_existing_source {
                ExistingSourcePolicy::Skip => {
                    info!(
                        "Source already cloned at {}; proceeding to build",
                        dir.display()
                    );
                    StepOutcome::Skipped {
                        reason: format!("source already cloned at {}", dir.display()),
                    }
                }
                ExistingSourcePolicy::Fail => StepOutcome::Failed {
                    error: ProvisionError::SourceAlreadyExists {
                        path: dir.clone(),
                        detail: "matching clone present; rerun with \
                                 --on-existing-source skip to reuse it"
                            .to_string(),
                    },
                },
            },
            SourcePresence::PresentConflicting => StepOutcome::Failed {
                error: ProvisionError::SourceAlreadyExists {
                    path: dir.clone(),
                    detail: format!(
                        "directory exists but does not match {} (branch {})",
                        self.config.repo_url, self.config.branch
                    ),
                },
            },
        }
    }

    async fn build_source(&self) -> StepOutcome {
        match self.host.build_source(&self.config.source_dir).await {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::Build),
            },
        }
    }

    async fn update_cmdline(&self) -> StepOutcome {
        match self
            .host
            .update_kernel_cmdline(&self.config.source_dir, &self.config.cmdline_script)
            .await
        {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::BootConfig),
            },
        }
    }

    async fn apply_boot_config(&self) -> StepOutcome {
        match self.host.apply_boot_config().await {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::BootConfig),
            },
        }
    }

    async fn reboot(&self) -> StepOutcome {
        match self.host.reboot().await {
            Ok(()) => ok(),
            Err(e) => StepOutcome::Failed {
                error: categorize(e, ProvisionError::BootConfig),
            },
        }
    }
}
