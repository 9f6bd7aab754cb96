//! TCP listener and top-level server wiring.
//!
//! - Binds a TCP listener (with a small port-bump retry).
//! - Spawns the central engine task that owns the `Exchange`.
//! - Accepts connections, assigns `ClientId`s, spawns per-client tasks.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::types::{ClientId, ClientRegistry, EngineRx, EngineTx, OutboundRx, OutboundTx};

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    ClientId(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Max number of times we'll bump the port if it's in use.
const MAX_PORT_RETRIES: u16 = 3;

/// Run the TCP server with the given configuration.
pub async fn run(mut config: Config) -> Result<()> {
    let (listener, final_port) = bind_with_retry(&config).await?;
    config.port = final_port;

    info!(
        addr = %config.socket_addr_string(),
        max_clients = config.max_clients,
        bhavcopy_secs = config.bhavcopy_secs,
        "gateway listening"
    );

    let clients: ClientRegistry = Arc::new(tokio::sync::RwLock::new(Default::default()));
    let (engine_tx, engine_rx): (EngineTx, EngineRx) = mpsc::unbounded_channel();

    {
        let clients = clients.clone();
        let config = config.clone();
        tokio::spawn(async move {
            crate::engine_task::run_engine_loop(engine_rx, clients, config).await;
        });
    }

    loop {
        let (stream, peer_addr) = listener.accept().await?;

        let current_clients = clients.read().await.len();
        if current_clients >= config.max_clients {
            warn!(%peer_addr, max = config.max_clients, "rejecting connection: client limit");
            continue;
        }

        let client_id = next_client_id();
        info!(client = client_id.0, %peer_addr, "accepted connection");

        let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();
        {
            let mut guard = clients.write().await;
            guard.insert(client_id, out_tx);
        }

        let clients = clients.clone();
        let engine_tx = engine_tx.clone();
        tokio::spawn(async move {
            if let Err(err) =
                crate::client::run_client(client_id, stream, engine_tx, out_rx, clients).await
            {
                error!(client = client_id.0, %err, "client task failed");
            } else {
                info!(client = client_id.0, "client disconnected");
            }
        });
    }
}

/// Try to bind, bumping the port by +1 on `AddrInUse`, up to
/// `MAX_PORT_RETRIES` attempts.
async fn bind_with_retry(config: &Config) -> Result<(TcpListener, u16)> {
    let mut port = config.port;
    for attempt in 1..=MAX_PORT_RETRIES {
        let addr = format!("{}:{}", config.bind_addr, port);
        match TcpListener::bind(&addr).await {
            Ok(listener) => return Ok((listener, port)),
            Err(err) if err.kind() == io::ErrorKind::AddrInUse && attempt < MAX_PORT_RETRIES => {
                warn!(%addr, attempt, "port in use, trying next");
                port += 1;
            }
            Err(err) => bail!("failed to bind {}: {}", addr, err),
        }
    }
    bail!(
        "failed to bind after {} attempts; last tried {}:{}",
        MAX_PORT_RETRIES,
        config.bind_addr,
        port
    )
}
