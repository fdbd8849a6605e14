//! Step domain model

use serde::Serialize;

/// A host fact that a step establishes or assumes.
///
/// Facets make the implicit ordering dependencies of the catalog
/// explicit, so a plan can be validated before anything touches the
/// host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Facet {
    /// Package sources point at the configured mirror (best effort)
    MirrorConfigured,
    /// The package index has been refreshed in this run
    FreshIndex,
    /// Build dependencies are installed
    DepsInstalled,
    /// The firmware directory exists
    FirmwareDir,
    /// The firmware image is linked into the firmware directory
    FirmwareLinked,
    /// The hypervisor source tree is present on disk
    SourcePresent,
    /// The hypervisor source tree has been built
    SourceBuilt,
    /// The kernel command line has been rewritten
    CmdlineUpdated,
    /// Boot-loader configuration has been regenerated
    BootConfigApplied,
}

/// Which host capability a step delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepAction {
    RepointMirror,
    RefreshIndex,
    InstallPackages,
    CreateFirmwareDir,
    LinkFirmware,
    CloneSource,
    BuildSource,
    UpdateCmdline,
    ApplyBootConfig,
    Reboot,
}

/// A single provisioning step
///
/// Steps are defined once at plan-construction time and never mutated;
/// runtime state lives in the runner's records, not here.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    /// Human-readable name, used when reporting the aborting step
    pub name: &'static str,

    /// Position in the plan; strictly increasing and unique
    pub ordinal: u32,

    /// The capability call this step delegates to
    pub action: StepAction,

    /// Whether a failure of this step aborts the run
    pub fatal: bool,

    /// Whether the step is safe to re-run against an already-provisioned host
    pub idempotent: bool,

    /// Whether the step requires operator confirmation before running
    pub confirm: bool,

    /// Host facts this step assumes earlier steps established
    pub requires: &'static [Facet],

    /// Host facts this step establishes
    pub provides: &'static [Facet],
}

impl Step {
    pub const fn new(
        name: &'static str,
        ordinal: u32,
        action: StepAction,
        fatal: bool,
        idempotent: bool,
        requires: &'static [Facet],
        provides: &'static [Facet],
    ) -> Self {
        Step {
            name,
            ordinal,
            action,
            fatal,
            idempotent,
            confirm: false,
            requires,
            provides,
        }
    }

    pub const fn with_confirmation(mut self) -> Self {
        self.confirm = true;
        self
    }
}
