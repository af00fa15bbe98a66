use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod mcp;
mod relay;
mod servers;
mod utils;

use cmd::{CallArgs, GetArgs, ListArgs, ServeArgs};
use config::RelayConfig;

/// MCP Relay - thin MCP tool servers over git, scip indexers and SearXNG
///
/// Command layout:
///   mcp-relay serve <git-history|scip|searxng>
///   mcp-relay list  <profile> [--json]
///   mcp-relay get   <profile> [NAME] [--json]
///   mcp-relay call  <profile> <OPERATION> [--param k=v ...] [--param-file FILE] [--json]
///
/// Global flags / env:
///   -v / -vv              Increase verbosity (stderr)
///   -q / --quiet          Errors only
///   --timeout-secs N      Per-call timeout (or MCP_RELAY_TIMEOUT_SECS), default 60
///   SEARXNG_URL           SearXNG base URL; otherwise SEARXNG_HOST + SEARXNG_PORT
///   RUST_LOG              Overrides -v / -q when set
///
/// Examples:
///   mcp-relay serve git-history
///   mcp-relay get searxng search_packages
///   mcp-relay call git-history search_commits --param repoPath=. --param query=fix --json
#[derive(Parser, Debug)]
#[command(
    name = "mcp-relay",
    version,
    author,
    about = "MCP Relay - git history, scip indexing and SearXNG search as MCP tool servers",
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

    /// Upper bound for one external call, in seconds
    #[arg(
        long = "timeout-secs",
        env = "MCP_RELAY_TIMEOUT_SECS",
        global = true,
        value_name = "SECS"
    )]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve a profile over MCP stdio
    Serve(ServeArgs),

    /// List the operations of a profile
    List(ListArgs),

    /// Show parameter details for operations
    Get(GetArgs),

    /// Invoke one operation and print the result
    Call(CallArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    match cli.command {
        Commands::Serve(args) => {
            let config = RelayConfig::from_env(cli.timeout_secs)?;
            cmd::execute_serve(args, &config)
        }
        Commands::List(args) => cmd::execute_list(args),
        Commands::Get(args) => cmd::execute_get(args),
        Commands::Call(args) => {
            let config = RelayConfig::from_env(cli.timeout_secs)?;
            cmd::execute_call(args, &config)
        }
    }
}
