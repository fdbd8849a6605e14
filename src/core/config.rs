//! Provisioning configuration from YAML and CLI flags

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do when the hypervisor source directory already holds a
/// matching clone from a previous run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExistingSourcePolicy {
    /// Skip the clone step and proceed to the build
    Skip,
    /// Abort the run with a source-already-exists error
    Fail,
}

/// Top-level provisioning configuration
///
/// Every field has a default targeting a stock Ubuntu host being set up
/// for RVM; a YAML file and CLI flags can override any of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Package source configuration file rewritten by the mirror step
    #[serde(default = "default_sources_file")]
    pub sources_file: PathBuf,

    /// Archive host the stock sources file points at
    #[serde(default = "default_stock_archive")]
    pub stock_archive: String,

    /// Mirror host substituted for the stock archive
    #[serde(default = "default_mirror")]
    pub mirror: String,

    /// Build dependencies installed before the hypervisor build
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,

    /// Directory the firmware image is linked into
    #[serde(default = "default_firmware_dir")]
    pub firmware_dir: PathBuf,

    /// Path to the hypervisor firmware image
    #[serde(default = "default_firmware_image")]
    pub firmware_image: PathBuf,

    /// Hypervisor source repository
    #[serde(default = "default_repo_url")]
    pub repo_url: String,

    /// Branch cloned from the repository
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Directory the source is cloned into
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Kernel command-line updater script, relative to the source directory
    #[serde(default = "default_cmdline_script")]
    pub cmdline_script: PathBuf,

    /// Policy for a pre-existing matching clone
    #[serde(default = "default_existing_source_policy")]
    pub on_existing_source: ExistingSourcePolicy,

    /// Skip the interactive reboot confirmation
    #[serde(default)]
    pub assume_yes: bool,

    /// Seconds to wait for the reboot confirmation before skipping it
    #[serde(default = "default_confirm_wait_secs")]
    pub confirm_wait_secs: u64,
}

fn default_sources_file() -> PathBuf {
    PathBuf::from("/etc/apt/sources.list")
}

fn default_stock_archive() -> String {
    "archive.ubuntu.com".to_string()
}

fn default_mirror() -> String {
    "mirrors.tuna.tsinghua.edu.cn".to_string()
}

fn default_packages() -> Vec<String> {
    ["build-essential", "git", "python3", "python3-mako"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_firmware_dir() -> PathBuf {
    PathBuf::from("/lib/firmware")
}

fn default_firmware_image() -> PathBuf {
    PathBuf::from("rvm-intel.bin")
}

fn default_repo_url() -> String {
    "https://github.com/rcore-os/jailhouse.git".to_string()
}

fn default_branch() -> String {
    "rvm".to_string()
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("jailhouse")
}

fn default_cmdline_script() -> PathBuf {
    PathBuf::from("scripts/update-cmdline.sh")
}

fn default_existing_source_policy() -> ExistingSourcePolicy {
    ExistingSourcePolicy::Skip
}

fn default_confirm_wait_secs() -> u64 {
    60
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            sources_file: default_sources_file(),
            stock_archive: default_stock_archive(),
            mirror: default_mirror(),
            packages: default_packages(),
            firmware_dir: default_firmware_dir(),
            firmware_image: default_firmware_image(),
            repo_url: default_repo_url(),
            branch: default_branch(),
            source_dir: default_source_dir(),
            cmdline_script: default_cmdline_script(),
            on_existing_source: default_existing_source_policy(),
            assume_yes: false,
            confirm_wait_secs: default_confirm_wait_secs(),
        }
    }
}

impl ProvisionConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ProvisionConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.mirror.trim().is_empty() {
            anyhow::bail!("mirror host must not be empty");
        }
        if self.mirror == self.stock_archive {
            anyhow::bail!(
                "mirror host '{}' is identical to the stock archive host",
                self.mirror
            );
        }
        if self.packages.is_empty() {
            anyhow::bail!("package list must not be empty");
        }
        if self.branch.trim().is_empty() {
            anyhow::bail!("branch must not be empty");
        }
        if self.firmware_image.file_name().is_none() {
            anyhow::bail!(
                "firmware image path '{}' has no file name",
                self.firmware_image.display()
            );
        }
        Ok(())
    }

    /// Where the firmware image is linked to inside the firmware directory
    pub fn firmware_link(&self) -> PathBuf {
        // validate() guarantees the image path has a file name
        match self.firmware_image.file_name() {
            Some(name) => self.firmware_dir.join(name),
            None => self.firmware_dir.clone(),
        }
    }
}
