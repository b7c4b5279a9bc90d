//! Adapter runtime integration.
//!
//! Lets a synchronous `main` run the async server on its own runtime.

use tokio::runtime::Runtime;

use crate::config::AdapterConfig;
use crate::server::run_server;

/// Build a multi-threaded runtime and serve until the listener fails.
pub fn run_blocking(config: AdapterConfig) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    rt.block_on(run_server(config, None))
}
