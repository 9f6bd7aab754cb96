//! Shared test harness: an engine wired to a capturing sink, plus request
//! builders that encode frames exactly as a trading front-end would.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use gateway_core::{Exchange, MatchOracle, ScriptedOracle};
use gateway_protocol::records::{
    ContractDesc, OrderRecord, PriceModRecord, SignoffRecord, SignonRecord, SpreadOrderRecord,
    TradeRecord,
};
use gateway_protocol::{transaction_codes as tc, MessageHeader};

/// Microsecond timestamp used throughout the tests (2023-11-14 22:13:20 UTC).
pub const TS: u64 = 1_700_000_000_000_000;

pub struct Harness {
    pub engine: Exchange,
    frames: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Harness {
    pub fn new() -> Self {
        Harness::with_oracle(Box::new(ScriptedOracle::new()))
    }

    pub fn with_oracle(oracle: Box<dyn MatchOracle + Send>) -> Self {
        let frames = Arc::new(Mutex::new(Vec::new()));
        let mut engine = Exchange::new(oracle);
        let sink = frames.clone();
        engine.set_sink(move |frame| sink.lock().unwrap().push(frame.to_vec()));
        Harness { engine, frames }
    }

    /// Feed one buffer through the framer at [`TS`].
    pub fn feed(&mut self, buf: &[u8]) -> (usize, bool) {
        self.engine.parse(buf, TS)
    }

    pub fn feed_at(&mut self, buf: &[u8], ts: u64) -> (usize, bool) {
        self.engine.parse(buf, ts)
    }

    /// Take every frame emitted since the last drain.
    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.frames.lock().unwrap())
    }

    /// Sign a trader on and swallow the responses.
    pub fn sign_on(&mut self, trader: i32, broker: &str) {
        let frame = signon_frame(trader, broker);
        let (consumed, error) = self.feed(&frame);
        assert_eq!(consumed, frame.len());
        assert!(!error);
        self.drain();
    }

    /// Enter an order through the wire and return the confirmation record.
    pub fn confirm_order(&mut self, order: &OrderRecord) -> OrderRecord {
        let frame = order.encode();
        self.feed(&frame);
        let frames = self.drain();
        let confirm = frames
            .iter()
            .find(|f| tx_code(f) == tc::ORDER_CONFIRMATION_OUT)
            .expect("no order confirmation emitted");
        OrderRecord::decode(confirm).unwrap()
    }
}

// -----------------------------------------------------------------------------
// Frame inspection
// -----------------------------------------------------------------------------

pub fn tx_code(frame: &[u8]) -> i16 {
    MessageHeader::decode(frame).unwrap().transaction_code
}

pub fn err_code(frame: &[u8]) -> i16 {
    MessageHeader::decode(frame).unwrap().error_code
}

// -----------------------------------------------------------------------------
// Request builders
// -----------------------------------------------------------------------------

pub fn header(code: i16, trader: i32, len: usize) -> MessageHeader {
    MessageHeader {
        transaction_code: code,
        trader_id: trader,
        message_length: len as i16,
        ..Default::default()
    }
}

pub fn signon_frame(trader: i32, broker: &str) -> Vec<u8> {
    SignonRecord {
        header: header(tc::SIGNON_REQUEST_IN, trader, SignonRecord::SIZE),
        user_id: trader,
        broker_id: broker.to_string(),
        trader_name: "TESTER".to_string(),
        ..Default::default()
    }
    .encode()
}

pub fn signoff_frame(trader: i32) -> Vec<u8> {
    SignoffRecord {
        header: header(tc::SIGN_OFF_REQUEST_IN, trader, SignoffRecord::SIZE),
        user_id: trader,
    }
    .encode()
}

/// Plain limit order on the regular book.
pub fn order_request(trader: i32, broker: &str, symbol: &str, token: i32) -> OrderRecord {
    OrderRecord {
        header: header(tc::ORDER_ENTRY_REQUEST, trader, OrderRecord::SIZE),
        book_type: 1,
        buy_sell_indicator: 1,
        volume: 100,
        price: 2500,
        trader_id: trader,
        broker_id: broker.to_string(),
        account_number: "ACC001".to_string(),
        pro_client: 1,
        token_no: token,
        contract: ContractDesc {
            symbol: symbol.to_string(),
            instrument_name: "FUTSTK".to_string(),
            expiry_date: 20260827,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn cancel_request(confirm: &OrderRecord, trader: i32, broker: &str) -> OrderRecord {
    let mut req = confirm.clone();
    req.header = header(tc::ORDER_CANCEL_IN, trader, OrderRecord::SIZE);
    req.broker_id = broker.to_string();
    req
}

pub fn price_mod_request(confirm: &OrderRecord, trader: i32, price: i32, volume: i32) -> PriceModRecord {
    PriceModRecord {
        header: header(tc::PRICE_MODIFICATION_REQUEST, trader, PriceModRecord::SIZE),
        order_number: confirm.order_number,
        token_no: confirm.token_no,
        buy_sell_indicator: confirm.buy_sell_indicator,
        price,
        volume,
        last_activity_reference: confirm.last_activity_reference,
        ..Default::default()
    }
}

/// Well-formed two-leg spread between consecutive tokens of one stream.
pub fn spread_request(trader: i32, broker: &str, token1: i32, token2: i32) -> SpreadOrderRecord {
    let mut req = SpreadOrderRecord {
        header: header(tc::SP_BOARD_LOT_IN, trader, SpreadOrderRecord::SIZE),
        leg_count: 2,
        price_diff: 150,
        book_type: 1,
        pro_client: 1,
        broker_id: broker.to_string(),
        account_number: "CLI001".to_string(),
        ..Default::default()
    };
    req.legs[0].token_no = token1;
    req.legs[0].buy_sell_indicator = 1;
    req.legs[0].volume = 50;
    req.legs[0].contract.symbol = "NIFTY".to_string();
    req.legs[0].contract.expiry_date = 20260827;
    req.legs[1].token_no = token2;
    req.legs[1].buy_sell_indicator = 2;
    req.legs[1].volume = 50;
    req.legs[1].contract.symbol = "NIFTY".to_string();
    req.legs[1].contract.expiry_date = 20260924;
    req
}

/// Well-formed IOC multi-leg order; `legs` is 2 or 3.
pub fn multi_leg_request(trader: i32, broker: &str, legs: i16) -> SpreadOrderRecord {
    let code = if legs == 3 {
        tc::THRL_BOARD_LOT_IN
    } else {
        tc::TWOL_BOARD_LOT_IN
    };
    let mut req = SpreadOrderRecord {
        header: header(code, trader, SpreadOrderRecord::SIZE),
        leg_count: legs,
        book_type: 1,
        pro_client: 1,
        broker_id: broker.to_string(),
        account_number: "CLI001".to_string(),
        ..Default::default()
    };
    req.order_flags.ioc = true;
    for (i, leg) in req.legs.iter_mut().take(legs as usize).enumerate() {
        leg.token_no = 100_000_001 + i as i32;
        leg.buy_sell_indicator = if i % 2 == 0 { 1 } else { 2 };
        leg.volume = 60;
        leg.contract.symbol = "NIFTY".to_string();
        leg.contract.expiry_date = 20260827 + i as i32;
    }
    req
}

/// Executed trade for the ledger plus a matching modification request.
pub fn ledger_trade(fill_number: i32, trader: i32) -> TradeRecord {
    TradeRecord {
        header: header(0, trader, TradeRecord::SIZE),
        fill_number,
        fill_quantity: 100,
        fill_price: 2500,
        token_no: 35001,
        mkt_type: b'1',
        buy_open_close: b'O',
        sell_open_close: b'C',
        buy_broker_id: "B0001".to_string(),
        sell_broker_id: "S0002".to_string(),
        buy_account_number: "BUYACC".to_string(),
        sell_account_number: "SELLACC".to_string(),
        trader_id: trader,
        ..Default::default()
    }
}

pub fn trade_mod_request(trade: &TradeRecord, trader: i32) -> TradeRecord {
    let mut req = trade.clone();
    req.header = header(tc::TRADE_MOD_IN, trader, TradeRecord::SIZE);
    req.requested_by = b'1';
    req
}

pub fn trade_cancel_request(trade: &TradeRecord, trader: i32) -> TradeRecord {
    let mut req = trade.clone();
    req.header = header(tc::TRADE_CANCEL_IN, trader, TradeRecord::SIZE);
    req
}
