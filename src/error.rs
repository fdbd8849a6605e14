//! Provisioning error taxonomy and exit codes

use std::path::PathBuf;
use thiserror::Error;

/// Error raised by a provisioning step, categorized per step family
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("failed to rewrite package source configuration: {0}")]
    ConfigWrite(String),

    #[error("package index refresh failed: {0}")]
    PackageIndex(String),

    #[error("package install failed: {0}")]
    PackageInstall(String),

    #[error("filesystem operation failed: {0}")]
    Filesystem(String),

    #[error("hypervisor source already present at {}: {detail}", .path.display())]
    SourceAlreadyExists { path: PathBuf, detail: String },

    #[error("clone of hypervisor source failed: {0}")]
    Clone(String),

    #[error("hypervisor build failed: {0}")]
    Build(String),

    #[error("boot configuration update failed: {0}")]
    BootConfig(String),

    #[error("elevated privilege denied: {0}")]
    PrivilegeDenied(String),
}

impl ProvisionError {
    /// Process exit code for this error category.
    ///
    /// Calling automation distinguishes failure causes by exit code, so
    /// every category maps to its own value.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::ConfigWrite(_) => 10,
            ProvisionError::PackageIndex(_) => 11,
            ProvisionError::PackageInstall(_) => 12,
            ProvisionError::Filesystem(_) => 13,
            ProvisionError::SourceAlreadyExists { .. } => 14,
            ProvisionError::Clone(_) => 15,
            ProvisionError::Build(_) => 16,
            ProvisionError::BootConfig(_) => 17,
            ProvisionError::PrivilegeDenied(_) => 18,
        }
    }

    /// Whether this error aborts the run even when raised by a step
    /// whose catalog entry is non-fatal.
    ///
    /// The mirror-repoint step tolerates a no-op substitution, but an
    /// unwritable sources file or a privilege refusal must still stop
    /// the run before later steps build on a broken host.
    pub fn always_fatal(&self) -> bool {
        matches!(
            self,
            ProvisionError::PrivilegeDenied(_) | ProvisionError::ConfigWrite(_)
        )
    }

    /// Short category label used in reports and JSON output
    pub fn category(&self) -> &'static str {
        match self {
            ProvisionError::ConfigWrite(_) => "config-write",
            ProvisionError::PackageIndex(_) => "package-index",
            ProvisionError::PackageInstall(_) => "package-install",
            ProvisionError::Filesystem(_) => "filesystem",
            ProvisionError::SourceAlreadyExists { .. } => "source-already-exists",
            ProvisionError::Clone(_) => "clone",
            ProvisionError::Build(_) => "build",
            ProvisionError::BootConfig(_) => "boot-config",
            ProvisionError::PrivilegeDenied(_) => "privilege-denied",
        }
    }
}
