//! The 24-byte message header carried by every frame on the wire.
//!
//! Layout (little-endian, offsets fixed):
//!
//! ```text
//! off  field            type
//! 0    TransactionCode  i16
//! 2    LogTime          i32
//! 6    AlphaChar        [u8; 2]
//! 8    TraderId         i32
//! 12   ErrorCode        i16
//! 14   Timestamp        i64
//! 22   MessageLength    i16   (covers header + body)
//! ```

use crate::codec::{ProtocolError, Reader, Writer};

/// Size of the common message header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Common header at the front of every request, response and broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub transaction_code: i16,
    pub log_time: i32,
    pub alpha_char: [u8; 2],
    pub trader_id: i32,
    pub error_code: i16,
    pub timestamp: i64,
    pub message_length: i16,
}

impl MessageHeader {
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Self::read(&mut r)
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(MessageHeader {
            transaction_code: r.i16()?,
            log_time: r.i32()?,
            alpha_char: r.bytes::<2>()?,
            trader_id: r.i32()?,
            error_code: r.i16()?,
            timestamp: r.i64()?,
            message_length: r.i16()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.i16(self.transaction_code);
        w.i32(self.log_time);
        w.bytes(&self.alpha_char);
        w.i32(self.trader_id);
        w.i16(self.error_code);
        w.i64(self.timestamp);
        w.i16(self.message_length);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(HEADER_SIZE);
        self.write(&mut w);
        w.into_inner()
    }
}

/// Peek the transaction code from the first two bytes of a buffer, if present.
///
/// The framer uses this before a full header is available, to short-circuit
/// the reserved TR request codes.
pub fn peek_transaction_code(buf: &[u8]) -> Option<i16> {
    if buf.len() < 2 {
        return None;
    }
    Some(i16::from_le_bytes([buf[0], buf[1]]))
}
