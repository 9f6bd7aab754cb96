//! Reference-data records: system info, local-database refresh, exchange
//! portfolio, message download.

use crate::codec::{ProtocolError, Reader, Writer};
use crate::header::{MessageHeader, HEADER_SIZE};

/// One market-status quadruple (8 bytes): `Normal, Oddlot, Spot, Auction`,
/// each an i16 in {0, 1}.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarketStatusSet {
    pub normal: i16,
    pub oddlot: i16,
    pub spot: i16,
    pub auction: i16,
}

impl MarketStatusSet {
    pub const SIZE: usize = 8;

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(MarketStatusSet {
            normal: r.i16()?,
            oddlot: r.i16()?,
            spot: r.i16()?,
            auction: r.i16()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.i16(self.normal);
        w.i16(self.oddlot);
        w.i16(self.spot);
        w.i16(self.auction);
    }
}

/// System information request (28 bytes): header + `LastUpdatePortfolioDt i32`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemInfoRequest {
    pub header: MessageHeader,
    pub last_update_portfolio_dt: i32,
}

impl SystemInfoRequest {
    pub const SIZE: usize = HEADER_SIZE + 4;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(SystemInfoRequest {
            header: MessageHeader::read(&mut r)?,
            last_update_portfolio_dt: r.i32()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.last_update_portfolio_dt);
        w.into_inner()
    }
}

/// System information payload, also used for `PARTIAL_SYSTEM_INFORMATION`
/// (87 bytes):
///
/// ```text
/// Header                         24
/// MarketStatus                   8
/// ExMarketStatus                 8
/// PlMarketStatus                 8
/// UpdatePortfolio                u8
/// MarketIndex                    i32
/// DefaultSettlementPeriodNormal  i16
/// DefaultSettlementPeriodSpot    i16
/// DefaultSettlementPeriodAuction i16
/// CompetitorPeriod               i16
/// SolicitorPeriod                i16
/// WarningPercent                 i16
/// VolumeFreezePercent            i16
/// SnapQuoteTime                  i16
/// BoardLotQuantity               i32
/// TickSize                       i32
/// MaximumGtcDays                 i16
/// StockEligibleIndicators        u16  (bit0 AON, bit1 MinimumFill, bit2 BooksMerged)
/// DisclosedQuantityPercent       i16
/// RiskFreeInterestRate           i32
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemInfoData {
    pub header: MessageHeader,
    pub market_status: MarketStatusSet,
    pub ex_market_status: MarketStatusSet,
    pub pl_market_status: MarketStatusSet,
    pub update_portfolio: u8,
    pub market_index: i32,
    pub settlement_period_normal: i16,
    pub settlement_period_spot: i16,
    pub settlement_period_auction: i16,
    pub competitor_period: i16,
    pub solicitor_period: i16,
    pub warning_percent: i16,
    pub volume_freeze_percent: i16,
    pub snap_quote_time: i16,
    pub board_lot_quantity: i32,
    pub tick_size: i32,
    pub maximum_gtc_days: i16,
    pub stock_eligible_indicators: u16,
    pub disclosed_quantity_percent: i16,
    pub risk_free_interest_rate: i32,
}

impl SystemInfoData {
    pub const SIZE: usize = HEADER_SIZE + 63;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(SystemInfoData {
            header: MessageHeader::read(&mut r)?,
            market_status: MarketStatusSet::read(&mut r)?,
            ex_market_status: MarketStatusSet::read(&mut r)?,
            pl_market_status: MarketStatusSet::read(&mut r)?,
            update_portfolio: r.u8()?,
            market_index: r.i32()?,
            settlement_period_normal: r.i16()?,
            settlement_period_spot: r.i16()?,
            settlement_period_auction: r.i16()?,
            competitor_period: r.i16()?,
            solicitor_period: r.i16()?,
            warning_percent: r.i16()?,
            volume_freeze_percent: r.i16()?,
            snap_quote_time: r.i16()?,
            board_lot_quantity: r.i32()?,
            tick_size: r.i32()?,
            maximum_gtc_days: r.i16()?,
            stock_eligible_indicators: r.u16()?,
            disclosed_quantity_percent: r.i16()?,
            risk_free_interest_rate: r.i32()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        self.market_status.write(&mut w);
        self.ex_market_status.write(&mut w);
        self.pl_market_status.write(&mut w);
        w.u8(self.update_portfolio);
        w.i32(self.market_index);
        w.i16(self.settlement_period_normal);
        w.i16(self.settlement_period_spot);
        w.i16(self.settlement_period_auction);
        w.i16(self.competitor_period);
        w.i16(self.solicitor_period);
        w.i16(self.warning_percent);
        w.i16(self.volume_freeze_percent);
        w.i16(self.snap_quote_time);
        w.i32(self.board_lot_quantity);
        w.i32(self.tick_size);
        w.i16(self.maximum_gtc_days);
        w.u16(self.stock_eligible_indicators);
        w.i16(self.disclosed_quantity_percent);
        w.i32(self.risk_free_interest_rate);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Local-database refresh request (66 bytes): header, four last-update
/// timestamps, open-order flag and the trader's cached copy of the three
/// market-status quadruples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateLocalDatabase {
    pub header: MessageHeader,
    pub last_update_security_time: i32,
    pub last_update_participant_time: i32,
    pub last_update_instrument_time: i32,
    pub last_update_index_time: i32,
    pub request_for_open_orders: u8,
    pub filler: u8,
    pub market_status: MarketStatusSet,
    pub ex_market_status: MarketStatusSet,
    pub pl_market_status: MarketStatusSet,
}

impl UpdateLocalDatabase {
    pub const SIZE: usize = HEADER_SIZE + 42;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(UpdateLocalDatabase {
            header: MessageHeader::read(&mut r)?,
            last_update_security_time: r.i32()?,
            last_update_participant_time: r.i32()?,
            last_update_instrument_time: r.i32()?,
            last_update_index_time: r.i32()?,
            request_for_open_orders: r.u8()?,
            filler: r.u8()?,
            market_status: MarketStatusSet::read(&mut r)?,
            ex_market_status: MarketStatusSet::read(&mut r)?,
            pl_market_status: MarketStatusSet::read(&mut r)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.last_update_security_time);
        w.i32(self.last_update_participant_time);
        w.i32(self.last_update_instrument_time);
        w.i32(self.last_update_index_time);
        w.u8(self.request_for_open_orders);
        w.u8(self.filler);
        self.market_status.write(&mut w);
        self.ex_market_status.write(&mut w);
        self.pl_market_status.write(&mut w);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Local-database download header frame: bare message header.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UpdateLdbHeader {
    pub header: MessageHeader,
}

impl UpdateLdbHeader {
    pub const SIZE: usize = HEADER_SIZE;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        Ok(UpdateLdbHeader {
            header: MessageHeader::decode(buf)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.header.encode()
    }
}

/// Local-database data frame (112 bytes): outer header, inner header and a
/// fixed 64-byte data area (unused in the simulation, kept for layout).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateLdbData {
    pub header: MessageHeader,
    pub inner_header: MessageHeader,
    pub data: [u8; 64],
}

impl Default for UpdateLdbData {
    fn default() -> Self {
        UpdateLdbData {
            header: MessageHeader::default(),
            inner_header: MessageHeader::default(),
            data: [0; 64],
        }
    }
}

impl UpdateLdbData {
    pub const SIZE: usize = HEADER_SIZE * 2 + 64;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(UpdateLdbData {
            header: MessageHeader::read(&mut r)?,
            inner_header: MessageHeader::read(&mut r)?,
            data: r.bytes::<64>()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        self.inner_header.write(&mut w);
        w.bytes(&self.data);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Exchange portfolio request (28 bytes): header + `LastUpdateDtTime i32`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortfolioRequest {
    pub header: MessageHeader,
    pub last_update_dt_time: i32,
}

impl PortfolioRequest {
    pub const SIZE: usize = HEADER_SIZE + 4;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(PortfolioRequest {
            header: MessageHeader::read(&mut r)?,
            last_update_dt_time: r.i32()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.last_update_dt_time);
        w.into_inner()
    }
}

/// One portfolio entry (19 bytes): `Portfolio [10], Token i32,
/// LastUpdateDtTime i32, DeleteFlag u8`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioData {
    pub portfolio: String,
    pub token: i32,
    pub last_update_dt_time: i32,
    pub delete_flag: u8,
}

impl PortfolioData {
    pub const SIZE: usize = 19;

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self, ProtocolError> {
        Ok(PortfolioData {
            portfolio: r.fixed_str(10)?,
            token: r.i32()?,
            last_update_dt_time: r.i32()?,
            delete_flag: r.u8()?,
        })
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.fixed_str(&self.portfolio, 10);
        w.i32(self.token);
        w.i32(self.last_update_dt_time);
        w.u8(self.delete_flag);
    }
}

/// Exchange portfolio response (47 bytes): header, record count, more-records
/// flag, filler, one portfolio entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioResponse {
    pub header: MessageHeader,
    pub no_of_records: i16,
    pub more_records: u8,
    pub filler: u8,
    pub portfolio_data: PortfolioData,
}

impl PortfolioResponse {
    pub const SIZE: usize = HEADER_SIZE + 4 + PortfolioData::SIZE;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(PortfolioResponse {
            header: MessageHeader::read(&mut r)?,
            no_of_records: r.i16()?,
            more_records: r.u8()?,
            filler: r.u8()?,
            portfolio_data: PortfolioData::read(&mut r)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i16(self.no_of_records);
        w.u8(self.more_records);
        w.u8(self.filler);
        self.portfolio_data.write(&mut w);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Message download request (32 bytes): header + `SequenceNumber f64`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MessageDownloadRequest {
    pub header: MessageHeader,
    pub sequence_number: f64,
}

impl MessageDownloadRequest {
    pub const SIZE: usize = HEADER_SIZE + 8;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(MessageDownloadRequest {
            header: MessageHeader::read(&mut r)?,
            sequence_number: r.f64()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.f64(self.sequence_number);
        w.into_inner()
    }
}

/// Message download header frame: bare message header.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MessageDownloadHeader {
    pub header: MessageHeader,
}

impl MessageDownloadHeader {
    pub const SIZE: usize = HEADER_SIZE;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        Ok(MessageDownloadHeader {
            header: MessageHeader::decode(buf)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.header.encode()
    }
}

/// Message download data frame (112 bytes): outer header, inner header and a
/// 64-byte text area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageDownloadData {
    pub header: MessageHeader,
    pub inner_header: MessageHeader,
    pub inner_data: [u8; 64],
}

impl Default for MessageDownloadData {
    fn default() -> Self {
        MessageDownloadData {
            header: MessageHeader::default(),
            inner_header: MessageHeader::default(),
            inner_data: [0; 64],
        }
    }
}

impl MessageDownloadData {
    pub const SIZE: usize = HEADER_SIZE * 2 + 64;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(MessageDownloadData {
            header: MessageHeader::read(&mut r)?,
            inner_header: MessageHeader::read(&mut r)?,
            inner_data: r.bytes::<64>()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        self.inner_header.write(&mut w);
        w.bytes(&self.inner_data);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Message download trailer frame: bare message header.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MessageDownloadTrailer {
    pub header: MessageHeader,
}

impl MessageDownloadTrailer {
    pub const SIZE: usize = HEADER_SIZE;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        Ok(MessageDownloadTrailer {
            header: MessageHeader::decode(buf)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        self.header.encode()
    }
}
