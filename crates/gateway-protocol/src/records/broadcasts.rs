//! Broadcast frames: free-text journal messages, bhavcopy (market
//! statistics) header/data/trailer, index reports, control messages and
//! limit updates.
//!
//! Data-packet frames are the only variable-length records on the wire; the
//! header's `MessageLength` reflects the actual record count.

use crate::codec::{ProtocolError, Reader, Writer};
use crate::header::{MessageHeader, HEADER_SIZE};
use crate::records::contract::ContractDesc;

/// Fixed free-text area carried by journal broadcasts and control messages.
pub const BROADCAST_TEXT_WIDTH: usize = 239;

/// Free-text journal broadcast (276 bytes):
///
/// ```text
/// Header                  24
/// BranchNumber            i16
/// BrokerNumber            [5]
/// ActionCode              [3]
/// Filler                  u8
/// BroadcastMessageLength  i16
/// BroadcastMessage        [239]
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastMessageRecord {
    pub header: MessageHeader,
    pub branch_number: i16,
    pub broker_number: String,
    pub action_code: String,
    pub broadcast_message: String,
}

impl BroadcastMessageRecord {
    pub const SIZE: usize = HEADER_SIZE + 13 + BROADCAST_TEXT_WIDTH;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        let header = MessageHeader::read(&mut r)?;
        let branch_number = r.i16()?;
        let broker_number = r.fixed_str(5)?;
        let action_code = r.fixed_str(3)?;
        let _filler = r.u8()?;
        let msg_length = r.i16()?;
        let text = r.fixed_str(BROADCAST_TEXT_WIDTH)?;
        let take = (msg_length.max(0) as usize).min(text.len());
        let broadcast_message = text.get(..take).unwrap_or(&text).to_string();
        Ok(BroadcastMessageRecord {
            header,
            branch_number,
            broker_number,
            action_code,
            broadcast_message,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i16(self.branch_number);
        w.fixed_str(&self.broker_number, 5);
        w.fixed_str(&self.action_code, 3);
        w.u8(0);
        let len = self.broadcast_message.len().min(BROADCAST_TEXT_WIDTH);
        w.i16(len as i16);
        w.fixed_str(&self.broadcast_message, BROADCAST_TEXT_WIDTH);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Control message to a single trader (273 bytes):
///
/// ```text
/// Header         24
/// TraderId       i32
/// ActionCode     [3]
/// Filler         u8
/// MessageLength  i16
/// Message        [239]
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlMessageRecord {
    pub header: MessageHeader,
    pub trader_id: i32,
    pub action_code: String,
    pub message: String,
}

impl ControlMessageRecord {
    pub const SIZE: usize = HEADER_SIZE + 10 + BROADCAST_TEXT_WIDTH;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        let header = MessageHeader::read(&mut r)?;
        let trader_id = r.i32()?;
        let action_code = r.fixed_str(3)?;
        let _filler = r.u8()?;
        let msg_length = r.i16()?;
        let text = r.fixed_str(BROADCAST_TEXT_WIDTH)?;
        let take = (msg_length.max(0) as usize).min(text.len());
        let message = text.get(..take).unwrap_or(&text).to_string();
        Ok(ControlMessageRecord {
            header,
            trader_id,
            action_code,
            message,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.trader_id);
        w.fixed_str(&self.action_code, 3);
        w.u8(0);
        let len = self.message.len().min(BROADCAST_TEXT_WIDTH);
        w.i16(len as i16);
        w.fixed_str(&self.message, BROADCAST_TEXT_WIDTH);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// One market-statistics record (72 bytes):
///
/// ```text
/// ContractDesc            28
/// OpenPrice               i32
/// HighPrice               i32
/// LowPrice                i32
/// ClosingPrice            i32
/// TotalQuantityTraded     i32
/// TotalValueTraded        f64
/// PreviousClosePrice      i32
/// OpenInterest            i32
/// ChgOpenInterest         i32
/// IndicativeClosingPrice  i32
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MktStatsData {
    pub contract: ContractDesc,
    pub open_price: i32,
    pub high_price: i32,
    pub low_price: i32,
    pub closing_price: i32,
    pub total_quantity_traded: i32,
    pub total_value_traded: f64,
    pub previous_close_price: i32,
    pub open_interest: i32,
    pub chg_open_interest: i32,
    pub indicative_closing_price: i32,
}

impl MktStatsData {
    pub const SIZE: usize = ContractDesc::SIZE + 44;

    fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(MktStatsData {
            contract: ContractDesc::read(&mut *r)?,
            open_price: r.i32()?,
            high_price: r.i32()?,
            low_price: r.i32()?,
            closing_price: r.i32()?,
            total_quantity_traded: r.i32()?,
            total_value_traded: r.f64()?,
            previous_close_price: r.i32()?,
            open_interest: r.i32()?,
            chg_open_interest: r.i32()?,
            indicative_closing_price: r.i32()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        self.contract.write(w);
        w.i32(self.open_price);
        w.i32(self.high_price);
        w.i32(self.low_price);
        w.i32(self.closing_price);
        w.i32(self.total_quantity_traded);
        w.f64(self.total_value_traded);
        w.i32(self.previous_close_price);
        w.i32(self.open_interest);
        w.i32(self.chg_open_interest);
        w.i32(self.indicative_closing_price);
    }
}

/// One spread-statistics record (36 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpreadStatsData {
    pub token1: i32,
    pub token2: i32,
    pub open_price_diff: i32,
    pub high_price_diff: i32,
    pub low_price_diff: i32,
    pub close_price_diff: i32,
    pub total_quantity: i32,
    pub total_value: f64,
}

impl SpreadStatsData {
    pub const SIZE: usize = 36;

    fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(SpreadStatsData {
            token1: r.i32()?,
            token2: r.i32()?,
            open_price_diff: r.i32()?,
            high_price_diff: r.i32()?,
            low_price_diff: r.i32()?,
            close_price_diff: r.i32()?,
            total_quantity: r.i32()?,
            total_value: r.f64()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.i32(self.token1);
        w.i32(self.token2);
        w.i32(self.open_price_diff);
        w.i32(self.high_price_diff);
        w.i32(self.low_price_diff);
        w.i32(self.close_price_diff);
        w.i32(self.total_quantity);
        w.f64(self.total_value);
    }
}

/// Bhavcopy report header frame (29 bytes): header + session type +
/// report date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BhavcopyHeader {
    pub header: MessageHeader,
    pub message_type: u8,
    pub report_date: i32,
}

impl BhavcopyHeader {
    pub const SIZE: usize = HEADER_SIZE + 5;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(BhavcopyHeader {
            header: MessageHeader::read(&mut r)?,
            message_type: r.u8()?,
            report_date: r.i32()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.u8(self.message_type);
        w.i32(self.report_date);
        w.into_inner()
    }
}

/// Market-statistics data packet. Regular reports carry one record per
/// packet; the enhanced report packs up to [`Self::MAX_RECORDS`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MktStatsPacket {
    pub header: MessageHeader,
    pub message_type: u8,
    pub records: Vec<MktStatsData>,
}

impl MktStatsPacket {
    pub const BASE_SIZE: usize = HEADER_SIZE + 3;
    pub const MAX_RECORDS: usize = 4;

    pub fn wire_size(&self) -> usize {
        Self::BASE_SIZE + self.records.len() * MktStatsData::SIZE
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        let header = MessageHeader::read(&mut r)?;
        let message_type = r.u8()?;
        let count = r.i16()?;
        if !(0..=Self::MAX_RECORDS as i16).contains(&count) {
            return Err(ProtocolError::InvalidField("NumberOfRecords"));
        }
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            records.push(MktStatsData::read(&mut r)?);
        }
        Ok(MktStatsPacket {
            header,
            message_type,
            records,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.records.len() <= Self::MAX_RECORDS);
        let mut w = Writer::with_capacity(self.wire_size());
        self.header.write(&mut w);
        w.u8(self.message_type);
        w.i16(self.records.len() as i16);
        for rec in &self.records {
            rec.write(&mut w);
        }
        w.into_inner()
    }
}

/// Spread-statistics data packet; up to three records per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadStatsPacket {
    pub header: MessageHeader,
    pub message_type: u8,
    pub records: Vec<SpreadStatsData>,
}

impl SpreadStatsPacket {
    pub const BASE_SIZE: usize = HEADER_SIZE + 3;
    pub const MAX_RECORDS: usize = 3;

    pub fn wire_size(&self) -> usize {
        Self::BASE_SIZE + self.records.len() * SpreadStatsData::SIZE
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        let header = MessageHeader::read(&mut r)?;
        let message_type = r.u8()?;
        let count = r.i16()?;
        if !(0..=Self::MAX_RECORDS as i16).contains(&count) {
            return Err(ProtocolError::InvalidField("NumberOfRecords"));
        }
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            records.push(SpreadStatsData::read(&mut r)?);
        }
        Ok(SpreadStatsPacket {
            header,
            message_type,
            records,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.records.len() <= Self::MAX_RECORDS);
        let mut w = Writer::with_capacity(self.wire_size());
        self.header.write(&mut w);
        w.u8(self.message_type);
        w.i16(self.records.len() as i16);
        for rec in &self.records {
            rec.write(&mut w);
        }
        w.into_inner()
    }
}

/// Bhavcopy trailer frame (27 bytes): header + session type + packet count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BhavcopyTrailer {
    pub header: MessageHeader,
    pub message_type: u8,
    pub number_of_packets: i16,
}

impl BhavcopyTrailer {
    pub const SIZE: usize = HEADER_SIZE + 3;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(BhavcopyTrailer {
            header: MessageHeader::read(&mut r)?,
            message_type: r.u8()?,
            number_of_packets: r.i16()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.u8(self.message_type);
        w.i16(self.number_of_packets);
        w.into_inner()
    }
}

/// Market index values (49 bytes): name + seven i32 metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MktIndexData {
    pub index_name: String,
    pub market_index_value: i32,
    pub high_index_value: i32,
    pub low_index_value: i32,
    pub opening_index: i32,
    pub closing_index: i32,
    pub percent_change: i32,
    pub net_change: i32,
}

impl MktIndexData {
    pub const SIZE: usize = 21 + 28;

    fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(MktIndexData {
            index_name: r.fixed_str(21)?,
            market_index_value: r.i32()?,
            high_index_value: r.i32()?,
            low_index_value: r.i32()?,
            opening_index: r.i32()?,
            closing_index: r.i32()?,
            percent_change: r.i32()?,
            net_change: r.i32()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.fixed_str(&self.index_name, 21);
        w.i32(self.market_index_value);
        w.i32(self.high_index_value);
        w.i32(self.low_index_value);
        w.i32(self.opening_index);
        w.i32(self.closing_index);
        w.i32(self.percent_change);
        w.i32(self.net_change);
    }
}

/// Market index report frame (73 bytes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketIndexReport {
    pub header: MessageHeader,
    pub index: MktIndexData,
}

impl MarketIndexReport {
    pub const SIZE: usize = HEADER_SIZE + MktIndexData::SIZE;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(MarketIndexReport {
            header: MessageHeader::read(&mut r)?,
            index: MktIndexData::read(&mut r)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        self.index.write(&mut w);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// One industry or sector index entry (19 bytes): name + value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndustryIndexEntry {
    pub name: String,
    pub index_value: i32,
}

impl IndustryIndexEntry {
    pub const SIZE: usize = 19;

    fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(IndustryIndexEntry {
            name: r.fixed_str(15)?,
            index_value: r.i32()?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.fixed_str(&self.name, 15);
        w.i32(self.index_value);
    }
}

/// Industry index report; up to [`Self::MAX_RECORDS`] entries per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndustryIndexReport {
    pub header: MessageHeader,
    pub records: Vec<IndustryIndexEntry>,
}

impl IndustryIndexReport {
    pub const BASE_SIZE: usize = HEADER_SIZE + 2;
    pub const MAX_RECORDS: usize = 10;

    pub fn wire_size(&self) -> usize {
        Self::BASE_SIZE + self.records.len() * IndustryIndexEntry::SIZE
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        let header = MessageHeader::read(&mut r)?;
        let count = r.i16()?;
        if !(0..=Self::MAX_RECORDS as i16).contains(&count) {
            return Err(ProtocolError::InvalidField("NumberOfRecords"));
        }
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            records.push(IndustryIndexEntry::read(&mut r)?);
        }
        Ok(IndustryIndexReport { header, records })
    }

    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.records.len() <= Self::MAX_RECORDS);
        let mut w = Writer::with_capacity(self.wire_size());
        self.header.write(&mut w);
        w.i16(self.records.len() as i16);
        for rec in &self.records {
            rec.write(&mut w);
        }
        w.into_inner()
    }
}

/// Sector index report, scoped to one industry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorIndexReport {
    pub header: MessageHeader,
    pub industry_name: String,
    pub records: Vec<IndustryIndexEntry>,
}

impl SectorIndexReport {
    pub const BASE_SIZE: usize = HEADER_SIZE + 17;
    pub const MAX_RECORDS: usize = 10;

    pub fn wire_size(&self) -> usize {
        Self::BASE_SIZE + self.records.len() * IndustryIndexEntry::SIZE
    }

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        let header = MessageHeader::read(&mut r)?;
        let industry_name = r.fixed_str(15)?;
        let count = r.i16()?;
        if !(0..=Self::MAX_RECORDS as i16).contains(&count) {
            return Err(ProtocolError::InvalidField("NumberOfRecords"));
        }
        let mut records = Vec::with_capacity(count as usize);
        for _ in 0..count {
            records.push(IndustryIndexEntry::read(&mut r)?);
        }
        Ok(SectorIndexReport {
            header,
            industry_name,
            records,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.records.len() <= Self::MAX_RECORDS);
        let mut w = Writer::with_capacity(self.wire_size());
        self.header.write(&mut w);
        w.fixed_str(&self.industry_name, 15);
        w.i16(self.records.len() as i16);
        for rec in &self.records {
            rec.write(&mut w);
        }
        w.into_inner()
    }
}

/// User order-value limit update (36 bytes): header + user id + limit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserOrderLimitRecord {
    pub header: MessageHeader,
    pub user_id: i32,
    pub order_value_limit: f64,
}

impl UserOrderLimitRecord {
    pub const SIZE: usize = HEADER_SIZE + 12;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(UserOrderLimitRecord {
            header: MessageHeader::read(&mut r)?,
            user_id: r.i32()?,
            order_value_limit: r.f64()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.user_id);
        w.f64(self.order_value_limit);
        w.into_inner()
    }
}

/// Dealer order limit update (36 bytes): header + dealer id + limit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DealerLimitRecord {
    pub header: MessageHeader,
    pub dealer_id: i32,
    pub order_limit: f64,
}

impl DealerLimitRecord {
    pub const SIZE: usize = HEADER_SIZE + 12;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(DealerLimitRecord {
            header: MessageHeader::read(&mut r)?,
            dealer_id: r.i32()?,
            order_limit: r.f64()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.dealer_id);
        w.f64(self.order_limit);
        w.into_inner()
    }
}

/// Spread order limit update (36 bytes): header + user id + limit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpreadLimitRecord {
    pub header: MessageHeader,
    pub user_id: i32,
    pub spread_order_limit: f64,
}

impl SpreadLimitRecord {
    pub const SIZE: usize = HEADER_SIZE + 12;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(SpreadLimitRecord {
            header: MessageHeader::read(&mut r)?,
            user_id: r.i32()?,
            spread_order_limit: r.f64()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.user_id);
        w.f64(self.spread_order_limit);
        w.into_inner()
    }
}
