//! gateway-server
//!
//! Multi-client async TCP front end for the simulated NSE NNF/NEAT gateway.
//!
//! This crate glues together `gateway-core` and `gateway-protocol` and
//! exposes a `server::run(Config)` entrypoint. Each connection gets a
//! reader/writer task pair; a single engine task owns the `Exchange` so the
//! engine itself stays single-threaded.

pub mod client;
pub mod config;
pub mod engine_task;
pub mod server;
pub mod types;
