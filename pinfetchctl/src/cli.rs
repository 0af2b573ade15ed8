//! Module describing all possible commands and sub-commands to the `pinfetchctl` main driver
//!
//! We have three main commands:
//!
//! - `run`
//! - `list`
//! - `completion`
//!
//! `run` executes the whole extraction pipeline: submit every report request,
//! wait for completion, download and merge the results into the output table.
//!
//! `list` groups the discovery helpers, they answer "what could I put in the
//! configuration": available ad accounts, stored report templates and the
//! valid report columns.
//!
//! `completion` is here just to configure the various shells completion system.
//!

use std::path::PathBuf;

use clap::{
    crate_authors, crate_description, crate_name, crate_version, Parser, ValueEnum,
};
use clap_complete::shells::Shell;

/// CLI options
#[derive(Parser)]
#[command(disable_version_flag = true)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// Data directory (configuration in, staged files & tables out).
    #[clap(short = 'd', long, default_value = "/data")]
    pub datadir: PathBuf,
    /// debug mode (hierarchical trace output).
    #[clap(short = 'D', long = "debug")]
    pub debug: bool,
    /// Verbose mode.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `completion SHELL`
/// `run`
/// `list (accounts|templates|columns)`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Run the report extraction pipeline
    Run,
    /// Discovery helpers
    List(ListOpts),
}

// ------

/// Options to generate completion files at runtime
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}

// ------

/// All `list` sub-commands:
///
/// `list accounts`
/// `list templates`
/// `list columns`
///
#[derive(Debug, Parser)]
pub struct ListOpts {
    #[clap(value_parser)]
    pub cmd: ListSubCommand,
}

/// These are the sub-commands for `list`
///
#[derive(Clone, Copy, Debug, Ord, PartialOrd, Eq, PartialEq, ValueEnum)]
pub enum ListSubCommand {
    /// List all accessible ad accounts
    Accounts,
    /// List stored report templates for the configured accounts
    Templates,
    /// List all valid report columns
    Columns,
}
