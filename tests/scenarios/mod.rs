//! Scenario-based tests for rvm-setup

mod confirmation;
mod fresh_host;
mod rerun_behavior;
