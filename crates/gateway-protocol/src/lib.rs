//! gateway-protocol
//!
//! Wire-level encoding/decoding for the simulated NSE NNF/NEAT gateway.
//!
//! Every frame on this protocol is a packed little-endian record headed by
//! the common 24-byte [`MessageHeader`]; the header's `TransactionCode`
//! selects the record layout and `MessageLength` covers header + body.
//!
//! - [`header`]  : the common message header and the framer pre-peek
//! - [`codes`]   : transaction / error / reason code tables
//! - [`flags`]   : the packed order-flag bit layout
//! - [`records`] : the fixed-layout request, response and broadcast records
//! - [`codec`]   : field-level readers/writers shared by the record types

pub mod codec;
pub mod codes;
pub mod flags;
pub mod header;
pub mod records;

pub use codec::ProtocolError;
pub use codes::{broker_types, error_codes, reason_codes, transaction_codes};
pub use flags::OrderFlags;
pub use header::{peek_transaction_code, MessageHeader, HEADER_SIZE};
