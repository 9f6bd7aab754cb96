//! gateway-core
//!
//! The message-processing engine of the simulated NSE NNF/NEAT exchange
//! gateway:
//! - stream framer and transaction-code dispatch
//! - trader sessions and broker policy
//! - regular order book, spread book and trade ledger state machines
//! - bhavcopy and unsolicited broadcast generators
//!
//! The engine is synchronous: it consumes byte buffers through
//! [`Exchange::parse`] and pushes every outgoing frame through a single
//! injected byte sink. Matching outcomes come from the [`oracle::MatchOracle`]
//! seam, so behavior is fully deterministic under test.

pub mod broadcast;
pub mod broker;
pub mod engine;
pub mod ids;
pub mod market;
pub mod oracle;
pub mod session;

mod orders;
mod refdata;
mod spreads;
mod trades;

pub use broker::{BrokerPolicy, BrokerType};
pub use engine::{Exchange, MessageSink};
pub use ids::{ActivityReferenceFactory, OrderNumberFactory};
pub use market::MarketStatusStore;
pub use oracle::{
    EntryOutcome, FillStyle, FreezeKind, MatchOracle, MultiLegOutcome, ScriptedOracle, SimOracle,
};
pub use session::SessionRegistry;
