//! Real host implementation - shells out to the system tools

use crate::host::{
    mirror::{self, RewritePlan},
    CommandRunner, CommandSpec, Host, HostError, RewriteOutcome, SourcePresence,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// `Host` implementation backed by the machine's own tooling: apt-get,
/// git, make, update-grub, reboot. Commands that mutate privileged
/// state run under sudo.
#[derive(Debug, Clone)]
pub struct SystemHost {
    runner: CommandRunner,
    sources_file: PathBuf,
}

impl SystemHost {
    pub fn new(sources_file: PathBuf) -> Self {
        Self {
            runner: CommandRunner::new(),
            sources_file,
        }
    }
}

#[async_trait]
impl Host for SystemHost {
    async fn rewrite_package_source(
        &self,
        stock: &str,
        mirror_host: &str,
    ) -> Result<RewriteOutcome, HostError> {
        let contents = tokio::fs::read_to_string(&self.sources_file).await?;

        match mirror::plan_rewrite(&contents, stock, mirror_host) {
            RewritePlan::AlreadyApplied => Ok(RewriteOutcome::AlreadyApplied),
            RewritePlan::PatternMissing => Ok(RewriteOutcome::PatternMissing),
            RewritePlan::Substitute => {
                let expr = format!("s|{}|{}|g", stock, mirror_host);
                let spec = CommandSpec::new("sed")
                    .arg("-i")
                    .arg(expr)
                    .arg(self.sources_file.display().to_string())
                    .elevated();
                self.runner.run(&spec).await?;
                info!(
                    "Repointed {} to {}",
                    self.sources_file.display(),
                    mirror_host
                );
                Ok(RewriteOutcome::Rewritten)
            }
        }
    }

    async fn refresh_package_index(&self) -> Result<(), HostError> {
        let spec = CommandSpec::new("apt-get").arg("update").elevated();
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn install_packages(&self, packages: &[String]) -> Result<(), HostError> {
        let spec = CommandSpec::new("apt-get")
            .args(["install", "-y"])
            .args(packages.iter().cloned())
            .elevated();
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn ensure_directory(&self, path: &Path) -> Result<(), HostError> {
        let spec = CommandSpec::new("mkdir")
            .arg("-p")
            .arg(path.display().to_string())
            .elevated();
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn link_file(&self, target: &Path, link: &Path) -> Result<(), HostError> {
        let spec = CommandSpec::new("ln")
            .arg("-sf")
            .arg(target.display().to_string())
            .arg(link.display().to_string())
            .elevated();
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn source_presence(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
    ) -> Result<SourcePresence, HostError> {
        match tokio::fs::metadata(dir).await {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SourcePresence::Absent)
            }
            Err(e) => return Err(HostError::Io(e)),
            Ok(_) => {}
        }

        if tokio::fs::metadata(dir.join(".git")).await.is_err() {
            debug!("{} exists but is not a git checkout", dir.display());
            return Ok(SourcePresence::PresentConflicting);
        }

        let dir_arg = dir.display().to_string();
        let origin = self
            .runner
            .run(
                &CommandSpec::new("git")
                    .args(["-C", &dir_arg])
                    .args(["remote", "get-url", "origin"]),
            )
            .await;
        let head = self
            .runner
            .run(
                &CommandSpec::new("git")
                    .args(["-C", &dir_arg])
                    .args(["rev-parse", "--abbrev-ref", "HEAD"]),
            )
            .await;

        match (origin, head) {
            (Ok(origin), Ok(head))
                if origin.trim() == remote && head.trim() == branch =>
            {
                Ok(SourcePresence::PresentMatching)
            }
            // A probe failure means the directory holds something git
            // cannot describe; report a conflict rather than an error so
            // the caller can surface it as source-already-exists
            _ => Ok(SourcePresence::PresentConflicting),
        }
    }

    async fn clone_source(
        &self,
        remote: &str,
        branch: &str,
        dir: &Path,
    ) -> Result<(), HostError> {
        let spec = CommandSpec::new("git")
            .args(["clone", "--depth", "1", "--single-branch", "--branch"])
            .arg(branch)
            .arg(remote)
            .arg(dir.display().to_string());
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn build_source(&self, dir: &Path) -> Result<(), HostError> {
        let spec = CommandSpec::new("make").current_dir(dir);
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn update_kernel_cmdline(&self, dir: &Path, script: &Path) -> Result<(), HostError> {
        let spec = CommandSpec::new("sh")
            .arg(script.display().to_string())
            .current_dir(dir)
            .elevated();
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn apply_boot_config(&self) -> Result<(), HostError> {
        let spec = CommandSpec::new("update-grub").elevated();
        self.runner.run(&spec).await?;
        Ok(())
    }

    async fn reboot(&self) -> Result<(), HostError> {
        let spec = CommandSpec::new("reboot").elevated();
        self.runner.run(&spec).await?;
        Ok(())
    }
}
