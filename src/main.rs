use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod error;
mod mcp;
mod registry;
mod sdk;
mod tools;
mod utils;

use cmd::{CallArgs, ServeArgs, ToolsArgs};

/// Lnfi MCP - exposes the Lnfi trading SDK as MCP tools.
///
/// Command layout:
///   lnfi-mcp serve [PRIVATE_KEY]                    MCP server on stdio
///   lnfi-mcp tools [NAME] [--json]                  browse the tool catalog
///   lnfi-mcp call <TOOL> [--param K=V]... [--json]  invoke one tool directly
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (logs go to stderr)
///   -q / --quiet    Errors only
///   RUST_LOG        Overrides the level derived from -v / -q
///
/// Connection (serve / call):
///   --env, --relay, --base-url, --bridge-url, --config, --private-key
///   LNFI_ENV, LNFI_RELAYS, LNFI_BASE_URL, LNFI_BRIDGE_URL, LNFI_PRIVATE_KEY
///
/// Examples:
///   lnfi-mcp serve $NSEC
///   lnfi-mcp tools LnfiTokenApprove
///   lnfi-mcp call LnfiAssetGetBalance --json
///   lnfi-mcp call LnfiTokenApprove --param tokenName=SATS --param amount=100 \
///       --param approveTo=MARKET_ROBOT_ADDR
#[derive(Parser, Debug)]
#[command(
    name = "lnfi-mcp",
    version,
    author,
    about = "Lnfi MCP - exposes the Lnfi trading SDK as MCP tools",
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
    /// Serve the tool catalog over MCP (stdio)
    Serve(ServeArgs),

    /// List tools, or show one tool's parameters
    Tools(ToolsArgs),

    /// Invoke a single tool without an MCP client
    Call(CallArgs),
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Serve(args) => cmd::execute_serve(args),
        Commands::Tools(args) => cmd::execute_tools(args),
        Commands::Call(args) => cmd::execute_call(args),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    if let Err(err) = run(cli.command) {
        // Startup configuration problems exit with 2, everything else with 1.
        let code = if err.downcast_ref::<config::ConfigError>().is_some() {
            2
        } else {
            1
        };
        eprintln!("error: {err:#}");
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lnfi-mcp", "tools", "-vv", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Tools(ToolsArgs { json: true, .. })));
    }

    #[test]
    fn clap_definitions_are_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_positional_key_and_flag() {
        let cli = Cli::try_parse_from([
            "lnfi-mcp",
            "serve",
            "7f3b4c1a9e2d5f6a8b0c1d2e3f4a5b6c7d8e9f0a1b2c3d4e5f6a7b8c9d0e1f2a",
            "--private-key",
            "other",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(args.key.is_some());
        assert_eq!(args.conn.private_key.as_deref(), Some("other"));
    }

    #[test]
    fn call_requires_tool_name() {
        assert!(Cli::try_parse_from(["lnfi-mcp", "call"]).is_err());
    }
}
