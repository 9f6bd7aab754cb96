//! End-to-end scenarios driven through encoded wire frames.

mod common;

use common::{
    cancel_request, err_code, ledger_trade, order_request, signon_frame, spread_request, tx_code,
    trade_mod_request, Harness,
};

use gateway_protocol::records::{
    OrderRecord, SpreadUpdateInfo, SystemInfoData, UpdateLocalDatabase,
};
use gateway_protocol::{error_codes, transaction_codes as tc};

#[test]
fn sign_on_order_cancel_round_trip() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    assert!(confirm.order_number > 0.0);
    assert!(confirm.last_activity_reference > 0);
    assert_eq!(confirm.header.error_code, error_codes::SUCCESS);

    let cancel = cancel_request(&confirm, 101, "B0001");
    h.feed(&cancel.encode());
    let frames = h.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(tx_code(&frames[0]), tc::ORDER_CANCEL_CONFIRM_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);

    let stored = h.engine.order(confirm.order_number).unwrap();
    assert_eq!(stored.volume, 0);
}

#[test]
fn closeout_broker_is_restricted_to_normal_book_ioc() {
    let mut h = Harness::new();
    h.engine.set_market_status(true, true, true, true);
    h.sign_on(101, "B0001");
    h.engine.set_broker_closeout_status("B0001", true);

    // Book type 2: rejected.
    let mut bad = order_request(101, "B0001", "RELIANCE", 35001);
    bad.book_type = 2;
    h.feed(&bad.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_ERROR_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::CLOSEOUT_NOT_ALLOWED);

    // Regular book + IOC in an open Normal market: proceeds, flagged 'C'.
    let mut ok = order_request(101, "B0001", "RELIANCE", 35001);
    ok.order_flags.ioc = true;
    let confirm = h.confirm_order(&ok);
    assert_eq!(confirm.closeout_flag, b'C');
}

#[test]
fn closeout_broker_participant_order_is_always_rejected() {
    let mut h = Harness::new();
    h.engine.set_market_status(true, true, true, true);
    h.sign_on(101, "B0001");
    h.engine.set_broker_closeout_status("B0001", true);

    let mut req = order_request(101, "B0001", "RELIANCE", 35001);
    req.order_flags.ioc = true;
    req.participant_type = b'P';
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_ERROR_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::CLOSEOUT_ORDER_REJECT);
}

#[test]
fn kill_switch_with_wildcard_token_cancels_everything() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    for (token, symbol) in [(10, "TOKTEN"), (20, "TOKTWENTY"), (30, "TOKTHIRTY")] {
        h.confirm_order(&order_request(101, "B0001", symbol, token));
    }

    let mut kill = order_request(101, "B0001", "", 0);
    kill.header.transaction_code = tc::KILL_SWITCH_IN;
    kill.token_no = -1;
    kill.contract = Default::default();
    h.feed(&kill.encode());

    let frames = h.drain();
    assert_eq!(frames.len(), 3);
    assert!(frames
        .iter()
        .all(|f| tx_code(f) == tc::ORDER_CANCEL_CONFIRM_OUT));
}

#[test]
fn kill_switch_with_contract_scope_cancels_only_matching_orders() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let mut confirms = Vec::new();
    for (token, symbol) in [(10, "TOKTEN"), (20, "TOKTWENTY"), (30, "TOKTHIRTY")] {
        confirms.push(h.confirm_order(&order_request(101, "B0001", symbol, token)));
    }

    let mut kill = order_request(101, "B0001", "TOKTWENTY", 20);
    kill.header.transaction_code = tc::KILL_SWITCH_IN;
    // Only the symbol scopes; the rest of the filter stays wildcard.
    kill.contract.instrument_name.clear();
    kill.contract.expiry_date = 0;
    h.feed(&kill.encode());

    let frames = h.drain();
    assert_eq!(frames.len(), 1);
    let cancelled = OrderRecord::decode(&frames[0]).unwrap();
    assert_eq!(cancelled.token_no, 20);

    assert_eq!(h.engine.order(confirms[0].order_number).unwrap().volume, 100);
    assert_eq!(h.engine.order(confirms[1].order_number).unwrap().volume, 0);
    assert_eq!(h.engine.order(confirms[2].order_number).unwrap().volume, 100);
}

#[test]
fn kill_switch_with_no_matches_reports_cannot_cancel() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let mut kill = order_request(101, "B0001", "", 0);
    kill.header.transaction_code = tc::KILL_SWITCH_IN;
    kill.token_no = -1;
    h.feed(&kill.encode());

    let frames = h.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(tx_code(&frames[0]), tc::ORDER_ERROR_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::OE_ORD_CANNOT_CANCEL);
}

#[test]
fn spread_entry_requires_a_registered_combination() {
    let mut h = Harness::new();
    h.engine.set_market_status(true, true, true, true);
    h.sign_on(101, "B0001");

    let req = spread_request(101, "B0001", 100_000_001, 100_000_002);
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::SP_ORDER_ERROR);
    assert_eq!(err_code(&frames[0]), error_codes::E_INVALID_CONTRACT_COMB);

    h.engine.add_spread_combination(SpreadUpdateInfo {
        token1: 100_000_001,
        token2: 100_000_002,
        eligibility: 1,
        delete_flag: b'N',
        ..Default::default()
    });

    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::SP_ORDER_CONFIRMATION);
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);
}

#[test]
fn duplicate_trade_modification_is_suppressed() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));

    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.buy_account_number = "NEWACC".to_string();

    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_MOD_IN);
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);
    assert_eq!(
        h.engine.trade(555).unwrap().buy_account_number,
        "NEWACC"
    );

    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_ERROR);
    assert_eq!(err_code(&frames[0]), error_codes::E_DUP_REQUEST);
}

#[test]
fn stale_ldb_copy_gets_partial_system_information() {
    let mut h = Harness::new();
    h.engine.set_market_status(true, true, true, true);
    h.sign_on(101, "B0001");

    let mut req = UpdateLocalDatabase {
        header: common::header(
            tc::UPDATE_LOCAL_DATABASE,
            101,
            UpdateLocalDatabase::SIZE,
        ),
        ..Default::default()
    };
    // The trader's cached copy disagrees on the Normal flag.
    req.market_status.normal = 0;
    req.market_status.oddlot = 1;
    req.market_status.spot = 1;
    req.market_status.auction = 1;
    req.ex_market_status = req.market_status;
    req.pl_market_status = req.market_status;

    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(tx_code(&frames[0]), tc::PARTIAL_SYSTEM_INFORMATION);

    let info = SystemInfoData::decode(&frames[0]).unwrap();
    assert_eq!(info.market_status.normal, 1);
}

#[test]
fn fresh_ldb_copy_gets_header_and_data_download() {
    let mut h = Harness::new();
    h.engine.set_market_status(true, true, true, true);
    h.sign_on(101, "B0001");

    let mut req = UpdateLocalDatabase {
        header: common::header(
            tc::UPDATE_LOCAL_DATABASE,
            101,
            UpdateLocalDatabase::SIZE,
        ),
        ..Default::default()
    };
    req.market_status.normal = 1;
    req.market_status.oddlot = 1;
    req.market_status.spot = 1;
    req.market_status.auction = 1;
    req.ex_market_status = req.market_status;
    req.pl_market_status = req.market_status;

    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert_eq!(tx_code(&frames[0]), tc::UPDATE_LOCAL_DATABASE_HEADER);
    assert_eq!(tx_code(&frames[1]), tc::UPDATE_LOCAL_DATABASE_DATA);
}

#[test]
fn markets_opening_forces_the_partial_path_even_when_fresh() {
    let mut h = Harness::new();
    h.engine.set_market_status(true, true, true, true);
    h.engine.set_markets_opening(true);
    h.sign_on(101, "B0001");

    let mut req = UpdateLocalDatabase {
        header: common::header(
            tc::UPDATE_LOCAL_DATABASE,
            101,
            UpdateLocalDatabase::SIZE,
        ),
        ..Default::default()
    };
    req.market_status.normal = 1;
    req.market_status.oddlot = 1;
    req.market_status.spot = 1;
    req.market_status.auction = 1;
    req.ex_market_status = req.market_status;
    req.pl_market_status = req.market_status;

    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(tx_code(&frames[0]), tc::PARTIAL_SYSTEM_INFORMATION);
}

#[test]
fn recovering_trader_gets_sign_off_ack_before_sign_on() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    h.feed(&common::signoff_frame(101));
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::SIGN_OFF_REQUEST_OUT);
    assert!(!h.engine.is_logged_in(101));

    h.feed(&signon_frame(101, "B0001"));
    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert_eq!(tx_code(&frames[0]), tc::SIGN_OFF_REQUEST_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);
    assert_eq!(tx_code(&frames[1]), tc::SIGNON_REQUEST_OUT);
    assert!(h.engine.is_logged_in(101));

    // The recovery ack is one-shot: a third sign-on is just a sign-on.
    h.feed(&signon_frame(101, "B0001"));
    let frames = h.drain();
    assert_eq!(frames.len(), 1);
    assert_eq!(tx_code(&frames[0]), tc::SIGNON_REQUEST_OUT);
}
