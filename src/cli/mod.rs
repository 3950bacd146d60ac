//! `swaglabs` command line
//!
//! Global flags live in [`env::CliArgs`], subcommands in [`commands`], and
//! [`app::run`] wires logging, configuration and dispatch together.

pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod list;
pub mod run;
pub mod runtime;
