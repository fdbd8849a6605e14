//! CLI command definitions

use crate::core::{ExistingSourcePolicy, ProvisionConfig};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Execute the provisioning run
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to a provisioning YAML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Package mirror host to rewrite sources to
    #[arg(long)]
    pub mirror: Option<String>,

    /// Path to the hypervisor firmware image
    #[arg(long)]
    pub firmware_image: Option<PathBuf>,

    /// Hypervisor source repository URL
    #[arg(long)]
    pub repo: Option<String>,

    /// Branch to clone
    #[arg(long)]
    pub branch: Option<String>,

    /// Directory to clone the source into
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// What to do when a matching clone already exists
    #[arg(long, value_enum)]
    pub on_existing_source: Option<ExistingSourcePolicy>,

    /// Skip the interactive reboot confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl RunCommand {
    /// Resolve the effective configuration: file (or defaults), then
    /// flag overrides, then validation.
    pub fn resolve_config(&self) -> Result<ProvisionConfig> {
        let mut config = match &self.config {
            Some(path) => ProvisionConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ProvisionConfig::default(),
        };

        if let Some(mirror) = &self.mirror {
            config.mirror = mirror.clone();
        }
        if let Some(image) = &self.firmware_image {
            config.firmware_image = image.clone();
        }
        if let Some(repo) = &self.repo {
            config.repo_url = repo.clone();
        }
        if let Some(branch) = &self.branch {
            config.branch = branch.clone();
        }
        if let Some(dir) = &self.source_dir {
            config.source_dir = dir.clone();
        }
        if let Some(policy) = self.on_existing_source {
            config.on_existing_source = policy;
        }
        if self.yes {
            config.assume_yes = true;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Print the provisioning plan
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Path to a provisioning YAML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
