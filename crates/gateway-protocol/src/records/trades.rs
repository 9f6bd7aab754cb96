//! Trade records: the modify/cancel inquiry record and the trade-confirm
//! frame shared by trade confirmations and unsolicited notifications.

use crate::codec::{ProtocolError, Reader, Writer};
use crate::flags::OrderFlags;
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::records::contract::ContractDesc;

/// Trade modification / cancellation record (106 bytes):
///
/// ```text
/// Header              24
/// FillNumber          i32
/// FillQuantity        i32
/// FillPrice           i32
/// TokenNo             i32
/// MktType             u8   ('1'..'4')
/// BuyOpenClose        u8   ('O'/'C')
/// SellOpenClose       u8   ('O'/'C')
/// RequestedBy         u8   ('1' buy, '2' sell, '3' both)
/// BuyBrokerId         [5]
/// SellBrokerId        [5]
/// BuyAccountNumber    [10]
/// SellAccountNumber   [10]
/// TraderId            i32
/// ContractDesc        28
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeRecord {
    pub header: MessageHeader,
    pub fill_number: i32,
    pub fill_quantity: i32,
    pub fill_price: i32,
    pub token_no: i32,
    pub mkt_type: u8,
    pub buy_open_close: u8,
    pub sell_open_close: u8,
    pub requested_by: u8,
    pub buy_broker_id: String,
    pub sell_broker_id: String,
    pub buy_account_number: String,
    pub sell_account_number: String,
    pub trader_id: i32,
    pub contract: ContractDesc,
}

impl TradeRecord {
    pub const SIZE: usize = HEADER_SIZE + 82;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(TradeRecord {
            header: MessageHeader::read(&mut r)?,
            fill_number: r.i32()?,
            fill_quantity: r.i32()?,
            fill_price: r.i32()?,
            token_no: r.i32()?,
            mkt_type: r.u8()?,
            buy_open_close: r.u8()?,
            sell_open_close: r.u8()?,
            requested_by: r.u8()?,
            buy_broker_id: r.fixed_str(5)?,
            sell_broker_id: r.fixed_str(5)?,
            buy_account_number: r.fixed_str(10)?,
            sell_account_number: r.fixed_str(10)?,
            trader_id: r.i32()?,
            contract: ContractDesc::read(&mut r)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.fill_number);
        w.i32(self.fill_quantity);
        w.i32(self.fill_price);
        w.i32(self.token_no);
        w.u8(self.mkt_type);
        w.u8(self.buy_open_close);
        w.u8(self.sell_open_close);
        w.u8(self.requested_by);
        w.fixed_str(&self.buy_broker_id, 5);
        w.fixed_str(&self.sell_broker_id, 5);
        w.fixed_str(&self.buy_account_number, 10);
        w.fixed_str(&self.sell_account_number, 10);
        w.i32(self.trader_id);
        self.contract.write(&mut w);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Trade-confirmation frame (137 bytes), also the carrier for unsolicited
/// order notifications (stop-loss / MIT triggers, freeze approvals mirror
/// order frames instead):
///
/// ```text
/// Header                   24
/// ResponseOrderNumber      f64
/// BrokerId                 [5]
/// TraderNumber             i32
/// AccountNumber            [10]
/// BuySellIndicator         i16
/// OriginalVolume           i32
/// DisclosedVolume          i32
/// RemainingVolume          i32
/// DisclosedVolumeRemaining i32
/// Price                    i32
/// OrderFlags               u16
/// GoodTillDate             i32
/// FillNumber               i32
/// FillQuantity             i32
/// FillPrice                i32
/// VolumeFilledToday        i32
/// ActivityType             [2]
/// ActivityTime             i32
/// TokenNo                  i32
/// ContractDesc             28
/// BookType                 i16
/// ParticipantType          u8
/// OpenClose                u8
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeConfirmRecord {
    pub header: MessageHeader,
    pub response_order_number: f64,
    pub broker_id: String,
    pub trader_number: i32,
    pub account_number: String,
    pub buy_sell_indicator: i16,
    pub original_volume: i32,
    pub disclosed_volume: i32,
    pub remaining_volume: i32,
    pub disclosed_volume_remaining: i32,
    pub price: i32,
    pub order_flags: OrderFlags,
    pub good_till_date: i32,
    pub fill_number: i32,
    pub fill_quantity: i32,
    pub fill_price: i32,
    pub volume_filled_today: i32,
    pub activity_type: String,
    pub activity_time: i32,
    pub token_no: i32,
    pub contract: ContractDesc,
    pub book_type: i16,
    pub participant_type: u8,
    pub open_close: u8,
}

impl TradeConfirmRecord {
    pub const SIZE: usize = HEADER_SIZE + 113;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(TradeConfirmRecord {
            header: MessageHeader::read(&mut r)?,
            response_order_number: r.f64()?,
            broker_id: r.fixed_str(5)?,
            trader_number: r.i32()?,
            account_number: r.fixed_str(10)?,
            buy_sell_indicator: r.i16()?,
            original_volume: r.i32()?,
            disclosed_volume: r.i32()?,
            remaining_volume: r.i32()?,
            disclosed_volume_remaining: r.i32()?,
            price: r.i32()?,
            order_flags: OrderFlags::from_bits(r.u16()?),
            good_till_date: r.i32()?,
            fill_number: r.i32()?,
            fill_quantity: r.i32()?,
            fill_price: r.i32()?,
            volume_filled_today: r.i32()?,
            activity_type: r.fixed_str(2)?,
            activity_time: r.i32()?,
            token_no: r.i32()?,
            contract: ContractDesc::read(&mut r)?,
            book_type: r.i16()?,
            participant_type: r.u8()?,
            open_close: r.u8()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.f64(self.response_order_number);
        w.fixed_str(&self.broker_id, 5);
        w.i32(self.trader_number);
        w.fixed_str(&self.account_number, 10);
        w.i16(self.buy_sell_indicator);
        w.i32(self.original_volume);
        w.i32(self.disclosed_volume);
        w.i32(self.remaining_volume);
        w.i32(self.disclosed_volume_remaining);
        w.i32(self.price);
        w.u16(self.order_flags.to_bits());
        w.i32(self.good_till_date);
        w.i32(self.fill_number);
        w.i32(self.fill_quantity);
        w.i32(self.fill_price);
        w.i32(self.volume_filled_today);
        w.fixed_str(&self.activity_type, 2);
        w.i32(self.activity_time);
        w.i32(self.token_no);
        self.contract.write(&mut w);
        w.i16(self.book_type);
        w.u8(self.participant_type);
        w.u8(self.open_close);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_record_round_trips() {
        let rec = TradeRecord {
            fill_number: 555,
            fill_quantity: 100,
            fill_price: 2500,
            token_no: 35001,
            mkt_type: b'1',
            buy_open_close: b'O',
            sell_open_close: b'C',
            requested_by: b'1',
            buy_broker_id: "B0001".into(),
            sell_broker_id: "S0002".into(),
            buy_account_number: "BUYACC".into(),
            sell_account_number: "SELLACC".into(),
            trader_id: 101,
            ..Default::default()
        };
        let bytes = rec.encode();
        assert_eq!(bytes.len(), TradeRecord::SIZE);
        assert_eq!(TradeRecord::decode(&bytes).unwrap(), rec);
    }
}
