//! Fixed-layout wire records, grouped by traffic family.
//!
//! Each record documents its field order; offsets are the running sum of the
//! field sizes (packed, little-endian). Request records decode from inbound
//! frames; response and broadcast records encode for the outbound sink. Most
//! types implement both directions so tests can decode what the engine emits.

pub mod broadcasts;
pub mod contract;
pub mod orders;
pub mod refdata;
pub mod session;
pub mod spreads;
pub mod trades;

pub use broadcasts::{
    BhavcopyHeader, BhavcopyTrailer, BroadcastMessageRecord, ControlMessageRecord,
    DealerLimitRecord, IndustryIndexEntry, IndustryIndexReport, MarketIndexReport, MktIndexData,
    MktStatsData, MktStatsPacket, SectorIndexReport, SpreadStatsData, SpreadStatsPacket,
    UserOrderLimitRecord, SpreadLimitRecord,
};
pub use contract::ContractDesc;
pub use orders::{OrderRecord, PriceModRecord};
pub use refdata::{
    MarketStatusSet, MessageDownloadData, MessageDownloadHeader, MessageDownloadRequest,
    MessageDownloadTrailer, PortfolioData, PortfolioRequest, PortfolioResponse, SystemInfoData,
    SystemInfoRequest, UpdateLdbData, UpdateLdbHeader, UpdateLocalDatabase,
};
pub use session::{SignoffRecord, SignonRecord};
pub use spreads::{SpreadLeg, SpreadMasterBroadcast, SpreadOrderRecord, SpreadUpdateInfo};
pub use trades::{TradeConfirmRecord, TradeRecord};
