use std::io;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::Result;
use tracing::trace;

use pinfetch_common::init_logging;
use pinfetchctl::{
    build_client, list_accounts, list_columns, list_templates, run_extraction, ConfigError,
    ConfigFile, Configuration, ListSubCommand, Opts, PipelineError, SubCommand,
};
use pinfetch_sources::SourceError;

/// Binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

fn main() {
    let opts = Opts::parse();

    if let Err(e) = real_main(&opts) {
        eprintln!("{}: {:#}", NAME, e);
        // User-actionable problems exit with 1, everything else with 2.
        //
        let code = if is_user_error(&e) { 1 } else { 2 };
        std::process::exit(code);
    }
}

fn real_main(opts: &Opts) -> Result<()> {
    // Standalone completion generation
    //
    // NOTE: you can generate UNIX shells completion on Windows and vice-versa.  Not worth
    //       trying to limit depending on the OS.
    //
    if let SubCommand::Completion(copts) = &opts.subcmd {
        let generator = copts.shell;
        generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
        return Ok(());
    }

    // Everything else needs the configuration file from the data directory.
    //
    let file = ConfigFile::load(&opts.datadir)?;

    // Initialise logging, the configuration can ask for debug output too.
    //
    init_logging(NAME, opts.debug || file.parameters.debug)?;

    // Banner
    //
    banner();

    match &opts.subcmd {
        // Handle `run`
        //
        SubCommand::Run => {
            trace!("run");

            let cfg = Configuration::try_from(file)?;
            run_extraction(&opts.datadir, &cfg)
        }

        // Handle `list (accounts|templates|columns)`
        //
        SubCommand::List(lopts) => {
            trace!("list");

            let client = build_client(&file.auth(), file.parameters.api_url.as_deref())?;
            match lopts.cmd {
                ListSubCommand::Accounts => list_accounts(&client),
                ListSubCommand::Templates => list_templates(&client, &file.parameters.accounts),
                ListSubCommand::Columns => list_columns(&client, &file.parameters.accounts),
            }
        }

        SubCommand::Completion(_) => unreachable!(),
    }
}

/// Errors the operator can act upon (bad configuration, rejected report
/// specification, inconsistent report schemas).
///
fn is_user_error(e: &eyre::Report) -> bool {
    if e.downcast_ref::<ConfigError>().is_some() {
        return true;
    }
    if matches!(
        e.downcast_ref::<PipelineError>(),
        Some(
            PipelineError::HeaderMismatch(_)
                | PipelineError::Config(_)
                | PipelineError::Source(
                    SourceError::InvalidColumns { .. }
                        | SourceError::NoCredentials
                        | SourceError::TokenExchange(_)
                )
        )
    ) {
        return true;
    }
    matches!(
        e.downcast_ref::<SourceError>(),
        Some(
            SourceError::InvalidColumns { .. }
                | SourceError::NoCredentials
                | SourceError::TokenExchange(_)
        )
    )
}

/// Display banner
///
fn banner() {
    eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    )
}
