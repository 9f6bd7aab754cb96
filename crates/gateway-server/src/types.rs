//! Shared types for the gateway TCP server.
//!
//! - `ClientId`: a lightweight handle for connected clients
//! - channel aliases between client tasks and the engine loop
//! - `EngineRequest`: raw bytes (or disconnects) flowing into the engine

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Identifier for a connected client, unique over the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// Encoded frames from the engine to one client.
pub type OutboundTx = mpsc::UnboundedSender<Vec<u8>>;
pub type OutboundRx = mpsc::UnboundedReceiver<Vec<u8>>;

/// Registry of connected clients and their outbound channels.
pub type ClientRegistry = Arc<RwLock<HashMap<ClientId, OutboundTx>>>;

/// Message flowing from a client task into the central engine task.
///
/// The engine task owns the per-client carry buffers, so clients forward
/// raw socket reads without interpreting them.
#[derive(Debug)]
pub enum EngineRequest {
    Bytes { client_id: ClientId, data: Vec<u8> },
    Disconnected { client_id: ClientId },
}

/// Channel from client tasks into the engine task.
pub type EngineTx = mpsc::UnboundedSender<EngineRequest>;
pub type EngineRx = mpsc::UnboundedReceiver<EngineRequest>;
