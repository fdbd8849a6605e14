//! Host capability boundary
//!
//! Every mutation of the machine goes through the [`Host`] trait, so the
//! orchestration layer can be exercised against fakes instead of a real
//! system.

pub mod command;
pub mod mirror;
pub mod system;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub use command::{CommandRunner, CommandSpec};
pub use mirror::RewritePlan;
pub use system::SystemHost;

/// Error types for external command invocation
#[derive(Debug, Error)]
pub enum HostError {
    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("{program} exited with code {code}: {stderr}")]
    NonZeroExit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("permission denied running {0}")]
    PermissionDenied(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the package-source rewrite actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Stock archive entries were rewritten to the mirror
    Rewritten,
    /// The mirror is already configured; nothing to do
    AlreadyApplied,
    /// Neither the stock archive nor the mirror appears in the file
    PatternMissing,
}

/// State of the hypervisor source directory before cloning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePresence {
    /// Directory does not exist; clone can proceed
    Absent,
    /// A clone of the requested remote and branch is already there
    PresentMatching,
    /// Something else occupies the directory
    PresentConflicting,
}

/// Capabilities the provisioning steps delegate to.
///
/// One method per collaborator operation; implementations report
/// success or failure and nothing else, mirroring the narrow interfaces
/// of the external tools they wrap.
#[async_trait]
pub trait Host: Send + Sync {
    /// Rewrite package sources from the stock archive to the mirror
    async fn rewrite_package_source(
        &self,
        stock: &str,
        mirror: &str,
    ) -> Result<RewriteOutcome, HostError>;

    /// Refresh the package index
    async fn refresh_package_index(&self) -> Result<(), HostError>;

    /// Install the given packages
    async fn install_packages(&self, packages: &[String]) -> Result<(), HostError>;

    /// Create a directory (and parents), tolerating pre-existence
    async fn ensure_directory(&self, path: &Path) -> Result<(), HostError>;

    /// Create or overwrite a symbolic link
    async fn link_file(&self, target: &Path, link: &Path) -> Result<(), HostError>;

    /// Probe the clone target before mutating it
    async fn source_presence(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
    ) -> Result<SourcePresence, HostError>;

    /// Clone a single branch of the hypervisor source
    async fn clone_source(&self, remote: &str, branch: &str, dir: &Path)
        -> Result<(), HostError>;

    /// Build the hypervisor source in place
    async fn build_source(&self, dir: &Path) -> Result<(), HostError>;

    /// Run the kernel command-line updater script inside the source tree
    async fn update_kernel_cmdline(&self, dir: &Path, script: &Path) -> Result<(), HostError>;

    /// Regenerate boot-loader configuration
    async fn apply_boot_config(&self) -> Result<(), HostError>;

    /// Reboot the machine
    async fn reboot(&self) -> Result<(), HostError>;
}
