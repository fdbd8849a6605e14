//! Reboot confirmation gate

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// Result of asking the operator for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Operator approved (or approval was configured)
    Yes,
    /// Operator declined
    No,
    /// No answer arrived within the bounded wait
    TimedOut,
}

/// Obtains operator confirmation before a gated step runs
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> Confirmation;
}

/// Confirmation bypass for unattended automation (`--yes`)
pub struct AutoConfirm;

#[async_trait]
impl Confirmer for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> Confirmation {
        Confirmation::Yes
    }
}

/// Interactive terminal prompt with a bounded wait.
///
/// The wait bound keeps an unattended run from hanging forever at the
/// reboot gate; on timeout the gated step is skipped, not failed.
pub struct TerminalConfirm {
    wait: Duration,
}

impl TerminalConfirm {
    pub fn new(wait_secs: u64) -> Self {
        Self {
            wait: Duration::from_secs(wait_secs),
        }
    }
}

#[async_trait]
impl Confirmer for TerminalConfirm {
    async fn confirm(&self, prompt: &str) -> Confirmation {
        let prompt = format!("{} [y/N] ", prompt);

        let ask = tokio::task::spawn_blocking(move || {
            let term = console::Term::stderr();
            if term.write_str(&prompt).is_err() {
                return false;
            }
            match term.read_line() {
                Ok(line) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
                Err(_) => false,
            }
        });

        match timeout(self.wait, ask).await {
            Ok(Ok(true)) => Confirmation::Yes,
            Ok(Ok(false)) => Confirmation::No,
            Ok(Err(e)) => {
                warn!("Confirmation prompt failed: {}", e);
                Confirmation::No
            }
            Err(_) => {
                warn!(
                    "No confirmation within {}s",
                    self.wait.as_secs()
                );
                Confirmation::TimedOut
            }
        }
    }
}
