//! Spread and multi-leg order records plus the spread-combination master.

use crate::codec::{ProtocolError, Reader, Writer};
use crate::flags::OrderFlags;
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::records::contract::ContractDesc;

/// One leg of a spread / 2L / 3L order (46 bytes):
///
/// ```text
/// TokenNo              i32
/// ContractDesc         28
/// BuySellIndicator     i16
/// Volume               i32
/// TotalVolRemaining    i32
/// DisclosedVolume      i32
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadLeg {
    pub token_no: i32,
    pub contract: ContractDesc,
    pub buy_sell_indicator: i16,
    pub volume: i32,
    pub total_vol_remaining: i32,
    pub disclosed_volume: i32,
}

impl SpreadLeg {
    pub const SIZE: usize = 4 + ContractDesc::SIZE + 2 + 4 + 4 + 4;

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(SpreadLeg {
            token_no: r.i32()?,
            contract: ContractDesc::read(&mut *r)?,
            buy_sell_indicator: r.i16()?,
            volume: r.i32()?,
            total_vol_remaining: r.i32()?,
            disclosed_volume: r.i32()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.i32(self.token_no);
        self.contract.write(w);
        w.i16(self.buy_sell_indicator);
        w.i32(self.volume);
        w.i32(self.total_vol_remaining);
        w.i32(self.disclosed_volume);
    }
}

/// Spread / 2L / 3L order record (212 bytes). The record always carries
/// three leg slots; `LegCount` says how many are live (2 for spreads and
/// 2L orders, 3 for 3L). Unused slots are zeroed.
///
/// ```text
/// Header                 24
/// LegCount               i16
/// Legs                   3 x 46
/// PriceDiff              i32
/// OrderFlags             u16
/// BookType               i16
/// ProClient              i16
/// BrokerId               [5]
/// AccountNumber          [10]
/// GoodTillDate           i32
/// OrderNumber1           f64
/// LastActivityReference  u64
/// ReasonCode             i16
/// CloseoutFlag           u8
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadOrderRecord {
    pub header: MessageHeader,
    pub leg_count: i16,
    pub legs: [SpreadLeg; 3],
    pub price_diff: i32,
    pub order_flags: OrderFlags,
    pub book_type: i16,
    pub pro_client: i16,
    pub broker_id: String,
    pub account_number: String,
    pub good_till_date: i32,
    pub order_number1: f64,
    pub last_activity_reference: u64,
    pub reason_code: i16,
    pub closeout_flag: u8,
}

impl SpreadOrderRecord {
    pub const SIZE: usize = HEADER_SIZE + 2 + 3 * SpreadLeg::SIZE + 48;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(SpreadOrderRecord {
            header: MessageHeader::read(&mut r)?,
            leg_count: r.i16()?,
            legs: [
                SpreadLeg::read(&mut r)?,
                SpreadLeg::read(&mut r)?,
                SpreadLeg::read(&mut r)?,
            ],
            price_diff: r.i32()?,
            order_flags: OrderFlags::from_bits(r.u16()?),
            book_type: r.i16()?,
            pro_client: r.i16()?,
            broker_id: r.fixed_str(5)?,
            account_number: r.fixed_str(10)?,
            good_till_date: r.i32()?,
            order_number1: r.f64()?,
            last_activity_reference: r.u64()?,
            reason_code: r.i16()?,
            closeout_flag: r.u8()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i16(self.leg_count);
        for leg in &self.legs {
            leg.write(&mut w);
        }
        w.i32(self.price_diff);
        w.u16(self.order_flags.to_bits());
        w.i16(self.book_type);
        w.i16(self.pro_client);
        w.fixed_str(&self.broker_id, 5);
        w.fixed_str(&self.account_number, 10);
        w.i32(self.good_till_date);
        w.f64(self.order_number1);
        w.u64(self.last_activity_reference);
        w.i16(self.reason_code);
        w.u8(self.closeout_flag);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }

    /// Live legs, per `LegCount`.
    pub fn active_legs(&self) -> &[SpreadLeg] {
        let n = (self.leg_count.clamp(0, 3)) as usize;
        &self.legs[..n]
    }
}

/// Spread-combination master entry (30 bytes):
///
/// ```text
/// Token1               i32
/// Token2               i32
/// ReferencePrice       i32
/// DayLowPriceRange     i32
/// DayHighPriceRange    i32
/// OpLowPriceRange      i32
/// OpHighPriceRange     i32
/// Eligibility          u8   (0/1)
/// DeleteFlag           u8   ('N'/'Y')
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadUpdateInfo {
    pub token1: i32,
    pub token2: i32,
    pub reference_price: i32,
    pub day_low_price_range: i32,
    pub day_high_price_range: i32,
    pub op_low_price_range: i32,
    pub op_high_price_range: i32,
    pub eligibility: u8,
    pub delete_flag: u8,
}

impl Default for SpreadUpdateInfo {
    fn default() -> Self {
        SpreadUpdateInfo {
            token1: 0,
            token2: 0,
            reference_price: 0,
            day_low_price_range: 0,
            day_high_price_range: 0,
            op_low_price_range: 0,
            op_high_price_range: 0,
            eligibility: 0,
            delete_flag: b'N',
        }
    }
}

impl SpreadUpdateInfo {
    pub const SIZE: usize = 30;

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(SpreadUpdateInfo {
            token1: r.i32()?,
            token2: r.i32()?,
            reference_price: r.i32()?,
            day_low_price_range: r.i32()?,
            day_high_price_range: r.i32()?,
            op_low_price_range: r.i32()?,
            op_high_price_range: r.i32()?,
            eligibility: r.u8()?,
            delete_flag: r.u8()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.i32(self.token1);
        w.i32(self.token2);
        w.i32(self.reference_price);
        w.i32(self.day_low_price_range);
        w.i32(self.day_high_price_range);
        w.i32(self.op_low_price_range);
        w.i32(self.op_high_price_range);
        w.u8(self.eligibility);
        w.u8(self.delete_flag);
    }
}

/// Spread-master change broadcast (54 bytes): header + the full entry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpreadMasterBroadcast {
    pub header: MessageHeader,
    pub update_info: SpreadUpdateInfo,
}

impl SpreadMasterBroadcast {
    pub const SIZE: usize = HEADER_SIZE + SpreadUpdateInfo::SIZE;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(SpreadMasterBroadcast {
            header: MessageHeader::read(&mut r)?,
            update_info: SpreadUpdateInfo::read(&mut r)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        self.update_info.write(&mut w);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_record_round_trips() {
        let mut rec = SpreadOrderRecord {
            leg_count: 2,
            price_diff: -150,
            broker_id: "B0001".into(),
            account_number: "CLI42".into(),
            pro_client: 1,
            order_number1: 100000000000007.0,
            ..Default::default()
        };
        rec.legs[0].token_no = 100000001;
        rec.legs[0].volume = 50;
        rec.legs[0].buy_sell_indicator = 1;
        rec.legs[1].token_no = 100000002;
        rec.legs[1].volume = 50;
        rec.legs[1].buy_sell_indicator = 2;

        let bytes = rec.encode();
        assert_eq!(bytes.len(), SpreadOrderRecord::SIZE);
        assert_eq!(SpreadOrderRecord::decode(&bytes).unwrap(), rec);
        assert_eq!(rec.active_legs().len(), 2);
    }
}
