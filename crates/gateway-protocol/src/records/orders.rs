//! Regular order traffic: entry/cancel/kill-switch requests and every order
//! response family share [`OrderRecord`]; price modification uses the
//! shorter [`PriceModRecord`].

use crate::codec::{ProtocolError, Reader, Writer};
use crate::flags::OrderFlags;
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::records::contract::ContractDesc;

/// Order record (141 bytes), used for order entry, cancellation and
/// kill-switch requests and mirrored back in confirmations, rejections and
/// batch-cancel broadcasts.
///
/// ```text
/// Header                    24
/// ParticipantType           u8
/// CloseoutFlag              u8
/// BookType                  i16
/// BuySellIndicator          i16   (1 = buy, 2 = sell)
/// DisclosedVolume           i32
/// DisclosedVolumeRemaining  i32
/// TotalVolumeRemaining      i32
/// Volume                    i32
/// VolumeFilledToday         i32
/// Price                     i32
/// GoodTillDate              i32
/// EntryDateTime             i32
/// LastModified              i32
/// OrderFlags                u16
/// BranchId                  i16
/// TraderId                  i32   (owning user; header TraderId is the requester)
/// BrokerId                  [5]
/// AccountNumber             [10]
/// ProClient                 i16   (1 = client, 2 = pro)
/// TokenNo                   i32
/// ContractDesc              28
/// OrderNumber               f64
/// LastActivityReference     u64
/// ReasonCode                i16
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRecord {
    pub header: MessageHeader,
    pub participant_type: u8,
    pub closeout_flag: u8,
    pub book_type: i16,
    pub buy_sell_indicator: i16,
    pub disclosed_volume: i32,
    pub disclosed_volume_remaining: i32,
    pub total_volume_remaining: i32,
    pub volume: i32,
    pub volume_filled_today: i32,
    pub price: i32,
    pub good_till_date: i32,
    pub entry_date_time: i32,
    pub last_modified: i32,
    pub order_flags: OrderFlags,
    pub branch_id: i16,
    pub trader_id: i32,
    pub broker_id: String,
    pub account_number: String,
    pub pro_client: i16,
    pub token_no: i32,
    pub contract: ContractDesc,
    pub order_number: f64,
    pub last_activity_reference: u64,
    pub reason_code: i16,
}

impl OrderRecord {
    pub const SIZE: usize = HEADER_SIZE + 117;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(OrderRecord {
            header: MessageHeader::read(&mut r)?,
            participant_type: r.u8()?,
            closeout_flag: r.u8()?,
            book_type: r.i16()?,
            buy_sell_indicator: r.i16()?,
            disclosed_volume: r.i32()?,
            disclosed_volume_remaining: r.i32()?,
            total_volume_remaining: r.i32()?,
            volume: r.i32()?,
            volume_filled_today: r.i32()?,
            price: r.i32()?,
            good_till_date: r.i32()?,
            entry_date_time: r.i32()?,
            last_modified: r.i32()?,
            order_flags: OrderFlags::from_bits(r.u16()?),
            branch_id: r.i16()?,
            trader_id: r.i32()?,
            broker_id: r.fixed_str(5)?,
            account_number: r.fixed_str(10)?,
            pro_client: r.i16()?,
            token_no: r.i32()?,
            contract: ContractDesc::read(&mut r)?,
            order_number: r.f64()?,
            last_activity_reference: r.u64()?,
            reason_code: r.i16()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.u8(self.participant_type);
        w.u8(self.closeout_flag);
        w.i16(self.book_type);
        w.i16(self.buy_sell_indicator);
        w.i32(self.disclosed_volume);
        w.i32(self.disclosed_volume_remaining);
        w.i32(self.total_volume_remaining);
        w.i32(self.volume);
        w.i32(self.volume_filled_today);
        w.i32(self.price);
        w.i32(self.good_till_date);
        w.i32(self.entry_date_time);
        w.i32(self.last_modified);
        w.u16(self.order_flags.to_bits());
        w.i16(self.branch_id);
        w.i32(self.trader_id);
        w.fixed_str(&self.broker_id, 5);
        w.fixed_str(&self.account_number, 10);
        w.i16(self.pro_client);
        w.i32(self.token_no);
        self.contract.write(&mut w);
        w.f64(self.order_number);
        w.u64(self.last_activity_reference);
        w.i16(self.reason_code);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Price/volume modification request (60 bytes):
///
/// ```text
/// Header                 24
/// OrderNumber            f64
/// TokenNo                i32
/// BuySellIndicator       i16
/// Price                  i32
/// Volume                 i32
/// DisclosedVolume        i32
/// LastActivityReference  u64
/// OrderFlags             u16
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceModRecord {
    pub header: MessageHeader,
    pub order_number: f64,
    pub token_no: i32,
    pub buy_sell_indicator: i16,
    pub price: i32,
    pub volume: i32,
    pub disclosed_volume: i32,
    pub last_activity_reference: u64,
    pub order_flags: OrderFlags,
}

impl PriceModRecord {
    pub const SIZE: usize = HEADER_SIZE + 36;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(PriceModRecord {
            header: MessageHeader::read(&mut r)?,
            order_number: r.f64()?,
            token_no: r.i32()?,
            buy_sell_indicator: r.i16()?,
            price: r.i32()?,
            volume: r.i32()?,
            disclosed_volume: r.i32()?,
            last_activity_reference: r.u64()?,
            order_flags: OrderFlags::from_bits(r.u16()?),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.f64(self.order_number);
        w.i32(self.token_no);
        w.i16(self.buy_sell_indicator);
        w.i32(self.price);
        w.i32(self.volume);
        w.i32(self.disclosed_volume);
        w.u64(self.last_activity_reference);
        w.u16(self.order_flags.to_bits());
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}
