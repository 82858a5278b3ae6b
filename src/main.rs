use anyhow::Result;
use clap::{Parser, Subcommand};

mod api;
mod cmd;
mod helptext;
mod instance;
mod query;
mod session;
mod utils;

use cmd::{MethodsArgs, QueryArgs};

/// dtq - line-oriented query CLI for the DomainTools threat-intelligence API
///
/// Command layout:
///   dtq query   [QUERY | --file PATH] [--json] [--force] [-i <instance>] [-t <fixture>]
///   dtq methods [NAME|all] [--json] [-i <instance>] [-t <fixture>]
///
/// Query grammar:
///   line 1      endpoint identifier (e.g. iris_enrich, domain_profile, help)
///   lines 2..   argument body; grammar depends on the endpoint's transform
///               kind (plain string, key=value lines, or a positional first
///               line followed by key=value lines)
///
/// Global flags / env:
///   -v / -vv        Increase verbosity
///   -q / --quiet    Errors only
///   -i / --instance Instance name (or DTQ_INSTANCE env; default "default")
///   -t / --fixture  Fixture file backing the session (or DTQ_FIXTURE env)
///   DTQ_VERIFY_SSL / DTQ_RATE_LIMIT   Per-instance option overrides
///   DTQ_STATE       Rerun-state file (default: ~/.dtq_state.json)
///
/// Examples:
///   dtq query "available_api_calls" -t recorded.json
///   dtq query $'iris_enrich\ndomains=google.com,microsoft.com' -t recorded.json
///   dtq query $'reverse_whois\nexample.com\nmode=purchased' -t recorded.yaml --json
///   dtq query "help" -t recorded.json
///   dtq methods all -t recorded.json
#[derive(Parser, Debug)]
#[command(
    name = "dtq",
    version,
    about = "dtq - query interpreter for the DomainTools threat-intelligence API",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one query through the pipeline
    Query(QueryArgs),

    /// Show method documentation / endpoint availability
    Methods(MethodsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    match cli.command {
        Commands::Query(args) => cmd::execute_query(args),
        Commands::Methods(args) => cmd::execute_methods(args),
    }
}
