//! The exchange engine: owns all session, book and broadcast state, and
//! drives the stream framer + transaction-code dispatch.
//!
//! The engine is synchronous and single-threaded: `parse` takes a byte
//! slice plus a timestamp, routes complete frames to handlers, and every
//! response is pushed through the injected sink before the handler returns.
//! Callers append bytes to their buffer and re-invoke `parse` with the
//! growing buffer; the returned count says how much was consumed.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use gateway_protocol::records::{
    IndustryIndexEntry, MessageDownloadRequest, MktIndexData, MktStatsData, OrderRecord,
    PortfolioRequest, PriceModRecord, SignoffRecord, SignonRecord, SpreadOrderRecord,
    SpreadStatsData, SpreadUpdateInfo, SystemInfoRequest, TradeRecord, UpdateLocalDatabase,
};
use gateway_protocol::transaction_codes as tc;
use gateway_protocol::{peek_transaction_code, MessageHeader, HEADER_SIZE};

use crate::broker::{BrokerPolicy, BrokerType};
use crate::ids::{order_key, ActivityReferenceFactory, OrderNumberFactory};
use crate::market::MarketStatusStore;
use crate::oracle::MatchOracle;
use crate::session::SessionRegistry;

/// Byte sink for outgoing frames. Treated as non-blocking and infallible.
pub type MessageSink = Box<dyn FnMut(&[u8]) + Send>;

/// The simulated exchange engine for one gateway session.
pub struct Exchange {
    pub(crate) sink: Option<MessageSink>,
    pub(crate) oracle: Box<dyn MatchOracle + Send>,

    pub(crate) sessions: SessionRegistry,
    pub(crate) brokers: BrokerPolicy,
    pub(crate) market: MarketStatusStore,

    /// Active regular orders keyed by order number. Cancelled orders stay
    /// with `Volume == 0` as tombstones.
    pub(crate) active_orders: BTreeMap<u64, OrderRecord>,
    pub(crate) active_spread_orders: BTreeMap<u64, SpreadOrderRecord>,
    pub(crate) spread_combinations: BTreeMap<(i32, i32), SpreadUpdateInfo>,

    pub(crate) executed_trades: BTreeMap<i32, TradeRecord>,
    pub(crate) trade_mod_requests: HashSet<(i32, i32)>,
    pub(crate) trade_cancel_requests: HashSet<(i32, i32)>,

    // Bhavcopy source stores, seeded through the admin surface.
    pub(crate) market_statistics: BTreeMap<String, MktStatsData>,
    pub(crate) spread_statistics: BTreeMap<String, SpreadStatsData>,
    pub(crate) market_indices: BTreeMap<String, MktIndexData>,
    pub(crate) industry_indices: Vec<IndustryIndexEntry>,
    pub(crate) sector_indices: BTreeMap<String, Vec<IndustryIndexEntry>>,

    pub(crate) order_numbers: OrderNumberFactory,
    pub(crate) activity_refs: ActivityReferenceFactory,
    pub(crate) regular_lot: i32,
}

impl Exchange {
    /// Engine with the given oracle and counters starting at 1.
    pub fn new(oracle: Box<dyn MatchOracle + Send>) -> Self {
        Exchange {
            sink: None,
            oracle,
            sessions: SessionRegistry::new(),
            brokers: BrokerPolicy::new(),
            market: MarketStatusStore::new(),
            active_orders: BTreeMap::new(),
            active_spread_orders: BTreeMap::new(),
            spread_combinations: BTreeMap::new(),
            executed_trades: BTreeMap::new(),
            trade_mod_requests: HashSet::new(),
            trade_cancel_requests: HashSet::new(),
            market_statistics: BTreeMap::new(),
            spread_statistics: BTreeMap::new(),
            market_indices: BTreeMap::new(),
            industry_indices: Vec::new(),
            sector_indices: BTreeMap::new(),
            order_numbers: OrderNumberFactory::new(),
            activity_refs: ActivityReferenceFactory::new(),
            regular_lot: 1,
        }
    }

    /// Engine with seeded identifier counters, for deterministic replays.
    pub fn with_counter_seeds(
        oracle: Box<dyn MatchOracle + Send>,
        order_seq: u64,
        activity_seq: u64,
    ) -> Self {
        let mut engine = Exchange::new(oracle);
        engine.order_numbers = OrderNumberFactory::with_seed(order_seq);
        engine.activity_refs = ActivityReferenceFactory::with_seed(activity_seq);
        engine
    }

    /// Install the byte sink all outgoing frames are routed through.
    pub fn set_sink(&mut self, sink: impl FnMut(&[u8]) + Send + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub(crate) fn emit(&mut self, frame: &[u8]) {
        if let Some(sink) = self.sink.as_mut() {
            sink(frame);
        }
    }

    // -------------------------------------------------------------------------
    // Framer & dispatcher
    // -------------------------------------------------------------------------

    /// Consume as many complete frames as the buffer holds.
    ///
    /// Returns `(consumed, error)`. A short trailing frame is not an error:
    /// the caller appends more bytes and calls again. `error` is set only
    /// when a frame declares a `MessageLength` smaller than its record's
    /// wire size, i.e. the frame is structurally impossible.
    pub fn parse(&mut self, buf: &[u8], ts: u64) -> (usize, bool) {
        let mut error = false;
        let mut total_seen = 0;

        while total_seen < buf.len() {
            let seen = self.try_parse_message(&buf[total_seen..], ts, &mut error);
            if seen == 0 || error {
                break;
            }
            total_seen += seen;
        }

        (total_seen, error)
    }

    /// Attempt to parse one message from the head of `buf`; returns the
    /// number of bytes consumed (0 = need more data, or stop on error).
    fn try_parse_message(&mut self, buf: &[u8], ts: u64, error: &mut bool) -> usize {
        *error = false;

        let code = match peek_transaction_code(buf) {
            Some(code) => code,
            None => return 0,
        };

        // Interactive "TR" requests are reserved; leave the buffer alone.
        if code == tc::ORDER_ENTRY_REQUEST_TR || code == tc::ORDER_MODIFY_REQUEST_TR {
            return 0;
        }

        if buf.len() < HEADER_SIZE {
            return 0;
        }
        let header = match MessageHeader::decode(buf) {
            Ok(header) => header,
            Err(_) => return 0,
        };

        // Incomplete or corrupt length: wait for more bytes.
        if header.message_length < HEADER_SIZE as i16
            || header.message_length as usize > buf.len()
        {
            return 0;
        }
        let msg_len = header.message_length as usize;
        let frame = &buf[..msg_len];

        macro_rules! dispatch {
            ($record:ty, $handler:ident) => {{
                if msg_len < <$record>::SIZE {
                    *error = true;
                    return 0;
                }
                match <$record>::decode(frame) {
                    Ok(req) => self.$handler(&req, ts),
                    Err(_) => {
                        *error = true;
                        return 0;
                    }
                }
            }};
        }

        match header.transaction_code {
            tc::SIGNON_REQUEST_IN => dispatch!(SignonRecord, handle_signon),
            tc::SIGN_OFF_REQUEST_IN => dispatch!(SignoffRecord, handle_signoff),
            tc::SYSTEM_INFO_REQUEST => dispatch!(SystemInfoRequest, handle_system_info),
            tc::UPDATE_LOCAL_DATABASE => {
                dispatch!(UpdateLocalDatabase, handle_update_local_database)
            }
            tc::EXCHANGE_PORTFOLIO_REQUEST => dispatch!(PortfolioRequest, handle_portfolio),
            tc::MESSAGE_DOWNLOAD => dispatch!(MessageDownloadRequest, handle_message_download),
            tc::ORDER_ENTRY_REQUEST => dispatch!(OrderRecord, handle_order_entry),
            tc::PRICE_MODIFICATION_REQUEST => {
                dispatch!(PriceModRecord, handle_price_modification)
            }
            tc::ORDER_CANCEL_IN => dispatch!(OrderRecord, handle_order_cancellation),
            tc::KILL_SWITCH_IN => dispatch!(OrderRecord, handle_kill_switch),
            tc::SP_BOARD_LOT_IN | tc::SP_BOARD_LOT_ACK_IN => {
                dispatch!(SpreadOrderRecord, handle_spread_entry)
            }
            tc::SP_ORDER_MOD_IN => dispatch!(SpreadOrderRecord, handle_spread_modification),
            tc::SP_ORDER_CANCEL_IN => dispatch!(SpreadOrderRecord, handle_spread_cancellation),
            tc::TWOL_BOARD_LOT_IN | tc::TWOL_BOARD_LOT_ACK_IN => {
                dispatch!(SpreadOrderRecord, handle_two_leg_entry)
            }
            tc::THRL_BOARD_LOT_IN | tc::THRL_BOARD_LOT_ACK_IN => {
                dispatch!(SpreadOrderRecord, handle_three_leg_entry)
            }
            tc::TRADE_MOD_IN => dispatch!(TradeRecord, handle_trade_modification),
            tc::TRADE_CANCEL_IN => dispatch!(TradeRecord, handle_trade_cancellation),
            unknown => {
                warn!(code = unknown, "ignoring unknown transaction code");
            }
        }

        msg_len
    }

    // -------------------------------------------------------------------------
    // Administrative surface
    // -------------------------------------------------------------------------

    pub fn set_market_status(
        &mut self,
        normal_open: bool,
        oddlot_open: bool,
        spot_open: bool,
        auction_open: bool,
    ) {
        self.market
            .set_market_status(normal_open, oddlot_open, spot_open, auction_open);
    }

    pub fn set_markets_opening(&mut self, opening: bool) {
        self.market.markets_are_opening = opening;
    }

    pub fn set_broker_closeout_status(&mut self, broker_id: &str, is_closeout: bool) {
        self.brokers.set_closeout(broker_id, is_closeout);
    }

    pub fn set_broker_deactivated_status(&mut self, broker_id: &str, is_deactivated: bool) {
        self.brokers.set_deactivated(broker_id, is_deactivated);
    }

    pub fn set_broker_type(&mut self, broker_id: &str, broker_type: BrokerType) {
        self.brokers.set_type(broker_id, broker_type);
    }

    /// Minimum tradable lot used by the quantity-multiple checks.
    pub fn set_regular_lot(&mut self, regular_lot: i32) {
        self.regular_lot = regular_lot.max(1);
    }

    /// Put an executed trade into the ledger so the two-party trade
    /// modification/cancellation protocol can reference it.
    pub fn record_trade(&mut self, trade: TradeRecord) {
        self.executed_trades.insert(trade.fill_number, trade);
    }

    // Bhavcopy source data ---------------------------------------------------

    pub fn set_market_statistics(&mut self, symbol: &str, stats: MktStatsData) {
        self.market_statistics.insert(symbol.to_string(), stats);
    }

    pub fn set_spread_statistics(&mut self, key: &str, stats: SpreadStatsData) {
        self.spread_statistics.insert(key.to_string(), stats);
    }

    pub fn set_market_index(&mut self, name: &str, index: MktIndexData) {
        self.market_indices.insert(name.to_string(), index);
    }

    pub fn set_industry_indices(&mut self, indices: Vec<IndustryIndexEntry>) {
        self.industry_indices = indices;
    }

    pub fn set_sector_indices(&mut self, industry: &str, sectors: Vec<IndustryIndexEntry>) {
        self.sector_indices.insert(industry.to_string(), sectors);
    }

    // -------------------------------------------------------------------------
    // Introspection (admin tooling and tests)
    // -------------------------------------------------------------------------

    pub fn is_logged_in(&self, trader_id: i32) -> bool {
        self.sessions.is_logged_in(trader_id)
    }

    pub fn order(&self, order_number: f64) -> Option<&OrderRecord> {
        self.active_orders.get(&order_key(order_number))
    }

    pub fn spread_order(&self, order_number: f64) -> Option<&SpreadOrderRecord> {
        self.active_spread_orders.get(&order_key(order_number))
    }

    pub fn spread_combination(&self, token1: i32, token2: i32) -> Option<&SpreadUpdateInfo> {
        self.spread_combinations.get(&(token1, token2))
    }

    pub fn trade(&self, fill_number: i32) -> Option<&TradeRecord> {
        self.executed_trades.get(&fill_number)
    }

    /// Seconds-since-epoch view of the caller's microsecond clock, used for
    /// `LastModified`, `EntryDateTime` and report dates.
    pub(crate) fn wall_seconds(ts: u64) -> i32 {
        (ts / 1_000_000) as i32
    }
}
