use clap::Subcommand;

use super::config::ConfigArgs;
use super::run::RunArgs;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run scenario suites against the storefront
    Run(RunArgs),

    /// List suites and their cases
    List,

    /// Inspect the effective configuration
    Config(ConfigArgs),
}
