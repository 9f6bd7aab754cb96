//! Per-client TCP handler.
//!
//! The NNF wire protocol is self-framing (`MessageLength` in each header),
//! so the reader forwards raw socket chunks to the engine task as-is; the
//! engine's framer handles partial and multi-message buffers. A concurrent
//! writer drains the client's outbound queue of already-encoded frames.

use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::types::{ClientId, ClientRegistry, EngineRequest, EngineTx, OutboundRx};

const READ_CHUNK: usize = 4096;

pub async fn run_client(
    client_id: ClientId,
    stream: TcpStream,
    engine_tx: EngineTx,
    mut out_rx: OutboundRx,
    clients: ClientRegistry,
) -> Result<()> {
    let peer_addr = stream.peer_addr().ok();
    let (mut reader, mut writer) = stream.into_split();

    // Writer task: frames are already encoded; just push them out.
    let writer_handle = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if let Err(error) = writer.write_all(&frame).await {
                warn!(client = client_id.0, %error, "write failed");
                break;
            }
        }
    });

    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => {
                debug!(client = client_id.0, ?peer_addr, "client closed connection");
                break;
            }
            Ok(n) => {
                let request = EngineRequest::Bytes {
                    client_id,
                    data: chunk[..n].to_vec(),
                };
                if engine_tx.send(request).is_err() {
                    warn!(client = client_id.0, "engine channel closed");
                    break;
                }
            }
            Err(error) => {
                warn!(client = client_id.0, ?peer_addr, %error, "read failed");
                break;
            }
        }
    }

    let _ = engine_tx.send(EngineRequest::Disconnected { client_id });
    {
        let mut guard = clients.write().await;
        guard.remove(&client_id);
    }

    // Dropping the registry entry closes out_rx's sender side; wait for
    // the writer to finish flushing.
    let _ = writer_handle.await;

    Ok(())
}
