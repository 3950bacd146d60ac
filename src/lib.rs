//! swaglabs-e2e library
//!
//! Exposes the configuration, suites and runner behind the `swaglabs` CLI
//! for integration testing.

pub mod cli;
pub mod config;
pub mod runner;
pub mod suites;

pub use config::{Backend, ConfigError, Settings};
pub use runner::{
    CaseReport, ChromiumFactory, Outcome, PortFactory, RunReport, SimFactory, SuiteRunner,
};
pub use suites::{all_cases, select, CaseContext, Suite, SuiteFilter, TestCase};
