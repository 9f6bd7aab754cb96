//! Central engine loop.
//!
//! This task owns the single [`Exchange`] instance, which keeps the engine
//! strictly single-threaded: client tasks forward raw bytes, the loop feeds
//! them through the re-entrant framer against a per-client carry buffer, and
//! every frame the engine emits during one `parse` call is routed back to
//! the originating client. Periodic bhavcopy output fans out to everyone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::{Buf, BytesMut};
use tracing::{info, warn};

use gateway_core::{Exchange, SimOracle};

use crate::config::Config;
use crate::types::{ClientId, ClientRegistry, EngineRequest, EngineRx};

/// Microseconds since the Unix epoch, the engine's clock domain.
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros() as u64
}

/// Frames collected from the engine sink during one dispatch.
type Outbox = Arc<Mutex<Vec<Vec<u8>>>>;

pub async fn run_engine_loop(mut engine_rx: EngineRx, clients: ClientRegistry, config: Config) {
    let seed = config.oracle_seed.unwrap_or_else(now_micros);
    let mut engine = Exchange::new(Box::new(SimOracle::new(seed)));
    engine.set_market_status(true, true, true, true);

    let outbox: Outbox = Arc::new(Mutex::new(Vec::new()));
    {
        let outbox = outbox.clone();
        engine.set_sink(move |frame| {
            outbox.lock().expect("sink outbox poisoned").push(frame.to_vec());
        });
    }

    // Per-client carry buffers for partial frames.
    let mut carry: HashMap<ClientId, BytesMut> = HashMap::new();

    let bhavcopy_period = if config.bhavcopy_secs > 0 {
        Some(Duration::from_secs(config.bhavcopy_secs))
    } else {
        None
    };
    let mut bhavcopy_tick = tokio::time::interval(
        bhavcopy_period.unwrap_or_else(|| Duration::from_secs(3600)),
    );
    bhavcopy_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first interval tick fires immediately; swallow it.
    bhavcopy_tick.tick().await;

    loop {
        tokio::select! {
            request = engine_rx.recv() => {
                let Some(request) = request else {
                    info!("engine loop shutting down (request channel closed)");
                    break;
                };
                match request {
                    EngineRequest::Bytes { client_id, data } => {
                        let buffer = carry.entry(client_id).or_default();
                        buffer.extend_from_slice(&data);

                        let (consumed, error) = engine.parse(buffer, now_micros());
                        buffer.advance(consumed);
                        if error {
                            // The tail is structurally broken; the engine
                            // will not interpret these bytes.
                            warn!(client = client_id.0, discarded = buffer.len(),
                                  "framing error, discarding buffered bytes");
                            buffer.clear();
                        }

                        route_to_client(client_id, &outbox, &clients).await;
                    }
                    EngineRequest::Disconnected { client_id } => {
                        carry.remove(&client_id);
                    }
                }
            }
            _ = bhavcopy_tick.tick(), if bhavcopy_period.is_some() => {
                engine.generate_and_broadcast_bhavcopy(b'F', now_micros());
                broadcast_to_all(&outbox, &clients).await;
            }
        }
    }
}

/// Deliver everything the engine just emitted to the originating client.
async fn route_to_client(client_id: ClientId, outbox: &Outbox, clients: &ClientRegistry) {
    let frames = drain(outbox);
    if frames.is_empty() {
        return;
    }
    let guard = clients.read().await;
    if let Some(tx) = guard.get(&client_id) {
        for frame in frames {
            let _ = tx.send(frame);
        }
    }
}

/// Deliver everything the engine just emitted to every connected client.
async fn broadcast_to_all(outbox: &Outbox, clients: &ClientRegistry) {
    let frames = drain(outbox);
    if frames.is_empty() {
        return;
    }
    let guard = clients.read().await;
    for tx in guard.values() {
        for frame in &frames {
            let _ = tx.send(frame.clone());
        }
    }
}

fn drain(outbox: &Outbox) -> Vec<Vec<u8>> {
    std::mem::take(&mut *outbox.lock().expect("sink outbox poisoned"))
}
