//! Two-party trade modification / cancellation protocol.

mod common;

use common::{
    err_code, ledger_trade, trade_cancel_request, trade_mod_request, tx_code, Harness,
};

use gateway_protocol::{error_codes, transaction_codes as tc};

#[test]
fn modification_needs_a_session_and_a_known_fill() {
    let mut h = Harness::new();

    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.buy_account_number = "NEWACC".to_string();

    // Not signed on.
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_ERROR);
    assert_eq!(err_code(&frames[0]), error_codes::USER_NOT_FOUND);

    // Signed on, but the fill is not in the ledger.
    h.sign_on(101, "B0001");
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::E_INVALID_FILL_NUMBER);
}

#[test]
fn field_validation_rejects_malformed_trades() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));

    // Non-positive fill number.
    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.fill_number = 0;
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::E_INVALID_FILL_NUMBER);

    // Market type outside '1'..'4'.
    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.mkt_type = b'9';
    req.buy_account_number = "NEWACC".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::ERR_INVALID_TRADE_DETAILS);

    // Open/close indicator outside {'O','C'}.
    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.sell_open_close = b'X';
    req.buy_account_number = "NEWACC".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::ERR_INVALID_TRADE_DETAILS);
}

#[test]
fn quantity_changes_are_refused() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));

    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.fill_quantity = 150;
    req.buy_account_number = "NEWACC".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::OE_DIFF_TRD_MOD_VOL);
}

#[test]
fn unchanged_accounts_are_refused() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));

    let req = trade_mod_request(&ledger_trade(555, 101), 101);
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::ERR_DATA_NOT_CHANGED);
}

#[test]
fn requested_by_routes_the_account_change() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));

    // Sell-side change requested by '2'.
    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.requested_by = b'2';
    req.sell_account_number = "NEWSELL".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);

    let trade = h.engine.trade(555).unwrap();
    assert_eq!(trade.sell_account_number, "NEWSELL");
    assert_eq!(trade.buy_account_number, "BUYACC");
}

#[test]
fn both_sides_change_with_requested_by_three() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(556, 101));

    let mut req = trade_mod_request(&ledger_trade(556, 101), 101);
    req.requested_by = b'3';
    req.buy_account_number = "NEWBUY".to_string();
    req.sell_account_number = "NEWSELL".to_string();
    h.feed(&req.encode());
    h.drain();

    let trade = h.engine.trade(556).unwrap();
    assert_eq!(trade.buy_account_number, "NEWBUY");
    assert_eq!(trade.sell_account_number, "NEWSELL");
}

#[test]
fn invalid_requested_by_is_refused() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));

    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.requested_by = b'7';
    req.buy_account_number = "NEWACC".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::ERR_INVALID_TRADE_DETAILS);
}

#[test]
fn foreign_trader_cannot_touch_the_fill() {
    let mut h = Harness::new();
    h.sign_on(999, "X9999");
    h.engine.record_trade(ledger_trade(555, 101));

    let mut req = trade_mod_request(&ledger_trade(555, 101), 999);
    req.buy_broker_id = "X9999".to_string();
    req.sell_broker_id = "X9999".to_string();
    req.buy_account_number = "NEWACC".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::E_NOT_YOUR_FILL);
}

#[test]
fn cross_slotted_broker_ids_do_not_grant_ownership() {
    let mut h = Harness::new();
    h.sign_on(999, "S0002");
    h.engine.record_trade(ledger_trade(555, 101));

    // The trade's broker ids swapped into the wrong slots: buy slot holds
    // the sell broker and vice versa. Neither side matches, so the
    // request is not from a party to the fill.
    let mut req = trade_mod_request(&ledger_trade(555, 101), 999);
    req.buy_broker_id = "S0002".to_string();
    req.sell_broker_id = "B0001".to_string();
    req.buy_account_number = "NEWACC".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_ERROR);
    assert_eq!(err_code(&frames[0]), error_codes::E_NOT_YOUR_FILL);
}

#[test]
fn closeout_buy_broker_blocks_trade_modification() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));
    h.engine.set_broker_closeout_status("B0001", true);

    let mut req = trade_mod_request(&ledger_trade(555, 101), 101);
    req.buy_account_number = "NEWACC".to_string();
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::CLOSEOUT_TRDMOD_REJECT);
}

#[test]
fn cancellation_is_recorded_per_party_without_finalizing() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.sign_on(202, "S0002");
    h.engine.record_trade(ledger_trade(555, 101));

    // First party's request: acknowledged.
    let req = trade_cancel_request(&ledger_trade(555, 101), 101);
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_CANCEL_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);

    // Duplicate from the same party: suppressed.
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_ERROR);
    assert_eq!(err_code(&frames[0]), error_codes::E_DUP_TRD_CXL_REQUEST);

    // Counterparty's own request still goes through.
    let mut counter = trade_cancel_request(&ledger_trade(555, 101), 202);
    counter.trader_id = 101;
    h.feed(&counter.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_CANCEL_OUT);

    // Both requests recorded, yet the trade stays in the ledger.
    assert!(h.engine.trade(555).is_some());
}

#[test]
fn modify_and_cancel_duplicate_sets_are_independent() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.engine.record_trade(ledger_trade(555, 101));

    let cancel = trade_cancel_request(&ledger_trade(555, 101), 101);
    h.feed(&cancel.encode());
    let frames = h.drain();
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);

    // A modification for the same fill by the same trader is not a dup.
    let mut modify = trade_mod_request(&ledger_trade(555, 101), 101);
    modify.buy_account_number = "NEWACC".to_string();
    h.feed(&modify.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::TRADE_MOD_IN);
    assert_eq!(err_code(&frames[0]), error_codes::SUCCESS);
}
