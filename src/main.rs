//! Headless dig/chain server (default binary).
//!
//! Seeds one session from `DIG_CHAIN_*` variables and serves it over the
//! JSON adapter. Log filtering comes from `DIG_CHAIN_LOG` (default `info`).

use anyhow::Result;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use dig_chain::adapter::{run_blocking, AdapterConfig};

fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_env("DIG_CHAIN_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let config = AdapterConfig::from_env();
    config.board.validate()?;
    info!(
        height = config.board.height,
        width = config.board.width,
        colors = config.board.colors,
        rise_ms = config.server.rise_interval_ms,
        "starting dig-chain"
    );

    run_blocking(config)
}
