//! Market-status store: three parallel status quadruples plus the sticky
//! markets-opening flag.

use gateway_protocol::records::{MarketStatusSet, UpdateLocalDatabase};

/// The exchange's view of market state. Mutations always write the same
/// four flags into all three quadruples.
#[derive(Debug, Default)]
pub struct MarketStatusStore {
    pub status: MarketStatusSet,
    pub ex_status: MarketStatusSet,
    pub pl_status: MarketStatusSet,
    pub markets_are_opening: bool,
}

impl MarketStatusStore {
    pub fn new() -> Self {
        MarketStatusStore::default()
    }

    pub fn set_market_status(
        &mut self,
        normal_open: bool,
        oddlot_open: bool,
        spot_open: bool,
        auction_open: bool,
    ) {
        let set = MarketStatusSet {
            normal: normal_open as i16,
            oddlot: oddlot_open as i16,
            spot: spot_open as i16,
            auction: auction_open as i16,
        };
        self.status = set;
        self.ex_status = set;
        self.pl_status = set;
    }

    pub fn normal_is_open(&self) -> bool {
        self.status.normal == 1
    }

    /// True when the trader's cached copy disagrees with any of the twelve
    /// current flags, meaning the trader must be refreshed via partial
    /// system information.
    pub fn trader_copy_is_stale(&self, req: &UpdateLocalDatabase) -> bool {
        req.market_status != self.status
            || req.ex_market_status != self.ex_status
            || req.pl_market_status != self.pl_status
    }
}
