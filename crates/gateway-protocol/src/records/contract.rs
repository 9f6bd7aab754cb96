//! Contract descriptor embedded in order, spread and trade records.

use crate::codec::{ProtocolError, Reader, Writer};

/// Security contract descriptor, 28 bytes on the wire:
///
/// ```text
/// InstrumentName  [6]
/// Symbol          [10]
/// ExpiryDate      i32
/// StrikePrice     i32
/// OptionType      [2]
/// CALevel         i16
/// ```
///
/// Empty strings / zero numerics act as wildcards in contract filters
/// (kill-switch scoping); `Symbol` is always compared strictly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractDesc {
    pub instrument_name: String,
    pub symbol: String,
    pub expiry_date: i32,
    pub strike_price: i32,
    pub option_type: String,
    pub ca_level: i16,
}

impl ContractDesc {
    pub const SIZE: usize = 28;

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(ContractDesc {
            instrument_name: r.fixed_str(6)?,
            symbol: r.fixed_str(10)?,
            expiry_date: r.i32()?,
            strike_price: r.i32()?,
            option_type: r.fixed_str(2)?,
            ca_level: r.i16()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.fixed_str(&self.instrument_name, 6);
        w.fixed_str(&self.symbol, 10);
        w.i32(self.expiry_date);
        w.i32(self.strike_price);
        w.fixed_str(&self.option_type, 2);
        w.i16(self.ca_level);
    }
}
