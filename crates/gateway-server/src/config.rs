//! Configuration for the gateway TCP server.
//!
//! Values come from environment variables with CLI overrides (CLI wins):
//!
//! - `GATEWAY_BIND_ADDR`     (default: "0.0.0.0")
//! - `GATEWAY_PORT`          (default: 9000)
//! - `GATEWAY_MAX_CLIENTS`   (default: 1024)
//! - `GATEWAY_BHAVCOPY_SECS` (default: 0 = periodic bhavcopy disabled)
//! - `GATEWAY_ORACLE_SEED`   (default: derived from the wall clock)

use clap::Parser;

/// Server configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "gateway-server", about = "Simulated NSE NNF/NEAT gateway")]
pub struct Config {
    /// IP address / interface to bind to.
    #[arg(long, env = "GATEWAY_BIND_ADDR", default_value = "0.0.0.0")]
    pub bind_addr: String,

    /// TCP port to listen on.
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 9000)]
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    #[arg(long, env = "GATEWAY_MAX_CLIENTS", default_value_t = 1024)]
    pub max_clients: usize,

    /// Period of the automatic bhavcopy broadcast, in seconds. 0 disables.
    #[arg(long, env = "GATEWAY_BHAVCOPY_SECS", default_value_t = 0)]
    pub bhavcopy_secs: u64,

    /// Seed for the simulated match oracle; unset means wall-clock seeded.
    #[arg(long, env = "GATEWAY_ORACLE_SEED")]
    pub oracle_seed: Option<u64>,
}

impl Config {
    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
