//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{PlanCommand, RunCommand};

/// Host provisioning tool for the RVM hypervisor
#[derive(Debug, Parser, Clone)]
#[command(name = "rvm-setup")]
#[command(version = "0.1.0")]
#[command(about = "Provision a host to boot the RVM hypervisor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Execute the provisioning run
    Run(RunCommand),

    /// Print the provisioning plan without touching the host
    Plan(PlanCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
