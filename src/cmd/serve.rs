/*!
`serve.rs`

Implements `mcp-relay serve <profile>`: run one tool server on stdin/stdout until
the client disconnects. All diagnostics go to stderr.
*/

use anyhow::{Result, bail};
use clap::Args;
use std::sync::Arc;

use crate::cmd::shared::{load_registry, runtime};
use crate::config::RelayConfig;
use crate::mcp::{RelayServer, serve_stdio};
use crate::relay::ExternalInvoker;
use crate::servers::ServerKind;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Server profile to expose
    pub profile: ServerKind,
}

pub fn execute_serve(args: ServeArgs, config: &RelayConfig) -> Result<()> {
    let registry = load_registry(args.profile)?;
    if registry.is_empty() {
        bail!("profile '{}' registers no operations", args.profile);
    }
    tracing::debug!(
        profile = %args.profile,
        timeout_secs = config.timeout.as_secs(),
        searxng = %config.searxng_url,
        "starting server"
    );
    let invoker = ExternalInvoker::from_config(config)?;
    let server = RelayServer::new(args.profile, Arc::new(registry), invoker);
    runtime()?.block_on(serve_stdio(server))
}
