//! Headless 2048 host (default binary).
//!
//! Owns one game, serves it over the TCP adapter, and applies commands from
//! the controller one at a time. Rendering and input belong to the client.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tiles2048::adapter::Adapter;
use tiles2048::host::{Host, HostConfig};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = HostConfig::from_env();

    let Some(mut adapter) = Adapter::start_from_env()? else {
        info!("adapter disabled via TILES2048_DISABLED, nothing to serve");
        return Ok(());
    };

    let mut host = Host::new(config);
    info!(addr = %adapter.local_addr(), "host ready");
    info!("initial board\n{}", host.game().board());

    while let Some(inbound) = adapter.recv_blocking() {
        for msg in host.handle(inbound) {
            adapter.send(msg);
        }
    }

    info!("adapter stopped, exiting");
    Ok(())
}
