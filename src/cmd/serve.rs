/*!
`serve.rs`

Runs the MCP server on stdin/stdout:

  lnfi-mcp serve [PRIVATE_KEY] [--env ..] [--relay ..] [--base-url ..] [--bridge-url ..]

Configuration is resolved and validated before anything touches stdio, so a
bad key or URL fails fast with a `ConfigError` and a non-zero exit.
*/

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::cmd::shared::{ConnectionArgs, build_registry_from, load_config};
use crate::mcp::{LnfiMcpServer, serve_stdio};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Signer private key (overrides --private-key / LNFI_PRIVATE_KEY)
    #[arg(value_name = "PRIVATE_KEY")]
    pub key: Option<String>,

    #[command(flatten)]
    pub conn: ConnectionArgs,
}

pub fn execute_serve(args: ServeArgs) -> Result<()> {
    let config = load_config(&args.conn, args.key)?;
    let registry = build_registry_from(&config)?;
    info!(
        env = %config.env,
        tools = registry.len(),
        "lnfi-mcp ready"
    );

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(serve_stdio(LnfiMcpServer::new(Arc::new(registry))))
}
