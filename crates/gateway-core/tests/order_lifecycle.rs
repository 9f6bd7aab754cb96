//! Order-book properties: identifier uniqueness, activity-reference
//! monotonicity, tombstones, modification rules and broker hierarchy.

mod common;

use common::{
    cancel_request, err_code, order_request, price_mod_request, tx_code, Harness, TS,
};

use gateway_core::{BrokerType, ScriptedOracle};
use gateway_protocol::records::OrderRecord;
use gateway_protocol::{error_codes, transaction_codes as tc};

#[test]
fn order_numbers_are_pairwise_distinct() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let mut seen = Vec::new();
    for i in 0..20 {
        let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001 + i));
        assert!(
            !seen.contains(&confirm.order_number.to_bits()),
            "duplicate order number {}",
            confirm.order_number
        );
        seen.push(confirm.order_number.to_bits());
    }
}

#[test]
fn every_mutation_strictly_increases_the_activity_reference() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    let mut last = confirm.last_activity_reference;

    // Two modifications, then a cancel; each rotates the reference.
    for (price, volume) in [(2600, 100), (2600, 80)] {
        let stored_ref = h
            .engine
            .order(confirm.order_number)
            .unwrap()
            .last_activity_reference;
        let req = price_mod_request(
            &OrderRecord {
                order_number: confirm.order_number,
                token_no: confirm.token_no,
                buy_sell_indicator: confirm.buy_sell_indicator,
                last_activity_reference: stored_ref,
                ..confirm.clone()
            },
            101,
            price,
            volume,
        );
        h.feed(&req.encode());
        let frames = h.drain();
        assert_eq!(tx_code(&frames[0]), tc::ORDER_MOD_CONFIRM_OUT);

        let current = h
            .engine
            .order(confirm.order_number)
            .unwrap()
            .last_activity_reference;
        assert!(current > last);
        last = current;
    }

    let mut cancel = cancel_request(&confirm, 101, "B0001");
    cancel.last_activity_reference = last;
    h.feed(&cancel.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_CANCEL_CONFIRM_OUT);

    let current = h
        .engine
        .order(confirm.order_number)
        .unwrap()
        .last_activity_reference;
    assert!(current > last);
}

#[test]
fn cancelled_order_is_a_tombstone_and_cannot_cancel_twice() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    let cancel = cancel_request(&confirm, 101, "B0001");
    h.feed(&cancel.encode());
    h.drain();

    // Still present, volume zeroed.
    let stored = h.engine.order(confirm.order_number).unwrap();
    assert_eq!(stored.volume, 0);

    // Second attempt: rejected. Reference check is skipped with zero.
    let mut again = cancel.clone();
    again.last_activity_reference = 0;
    h.feed(&again.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_CXL_REJ_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::OE_ORD_CANNOT_CANCEL);
}

#[test]
fn stale_activity_reference_blocks_cancellation() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    let mut cancel = cancel_request(&confirm, 101, "B0001");
    cancel.last_activity_reference = confirm.last_activity_reference + 999;

    h.feed(&cancel.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_CXL_REJ_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::OE_ORD_CANNOT_CANCEL);
    assert_eq!(h.engine.order(confirm.order_number).unwrap().volume, 100);
}

#[test]
fn modification_updates_the_stored_order_in_place() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    let req = price_mod_request(&confirm, 101, 2750, 60);
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_MOD_CONFIRM_OUT);

    let response = OrderRecord::decode(&frames[0]).unwrap();
    assert_eq!(response.price, 2750);
    assert_eq!(response.volume, 60);

    let stored = h.engine.order(confirm.order_number).unwrap();
    assert_eq!(stored.price, 2750);
    assert_eq!(stored.volume, 60);
    assert_eq!(
        stored.last_activity_reference,
        response.last_activity_reference
    );
}

#[test]
fn modification_of_someone_elses_order_is_rejected() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");
    h.sign_on(202, "B0002");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    let req = price_mod_request(&confirm, 202, 2750, 60);
    h.feed(&req.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_MOD_REJ_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::E_NOT_YOUR_ORDER);
}

#[test]
fn modification_freeze_rejection_leaves_the_order_untouched() {
    let mut oracle = ScriptedOracle::new();
    oracle.modification_freezes.push_back(true);
    oracle.freeze_approvals.push_back(false);
    let mut h = Harness::with_oracle(Box::new(oracle));
    h.sign_on(101, "B0001");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    let req = price_mod_request(&confirm, 101, 2750, 60);
    h.feed(&req.encode());

    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert_eq!(tx_code(&frames[0]), tc::FREEZE_TO_CONTROL);
    assert_eq!(tx_code(&frames[1]), tc::ORDER_MOD_REJ_OUT);
    assert_eq!(err_code(&frames[1]), error_codes::OE_ORD_CANNOT_MODIFY);

    let stored = h.engine.order(confirm.order_number).unwrap();
    assert_eq!(stored.price, 2500);
    assert_eq!(stored.volume, 100);
}

#[test]
fn deactivated_broker_cannot_cancel() {
    let mut h = Harness::new();
    h.sign_on(101, "B0001");

    let confirm = h.confirm_order(&order_request(101, "B0001", "RELIANCE", 35001));
    h.engine.set_broker_deactivated_status("B0001", true);

    let cancel = cancel_request(&confirm, 101, "B0001");
    h.feed(&cancel.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_CXL_REJ_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::OE_IS_NOT_ACTIVE);
}

#[test]
fn branch_manager_cancels_dealer_orders_but_not_the_reverse() {
    let mut h = Harness::new();
    h.engine.set_broker_type("BM001", BrokerType::BranchManager);
    h.engine.set_broker_type("DL001", BrokerType::Dealer);
    h.sign_on(101, "DL001");
    h.sign_on(202, "BM001");

    // Dealer's order, cancelled by the branch manager: allowed.
    let confirm = h.confirm_order(&order_request(101, "DL001", "RELIANCE", 35001));
    let cancel = cancel_request(&confirm, 202, "BM001");
    h.feed(&cancel.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_CANCEL_CONFIRM_OUT);

    // Branch manager's order, cancelled by the dealer: refused.
    let confirm = h.confirm_order(&order_request(202, "BM001", "RELIANCE", 35002));
    let cancel = cancel_request(&confirm, 101, "DL001");
    h.feed(&cancel.encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_CXL_REJ_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::OE_ORD_CANNOT_CANCEL);
}

#[test]
fn market_order_gets_priced_before_confirmation() {
    let mut oracle = ScriptedOracle::new();
    oracle.market_prices.push_back(10250);
    let mut h = Harness::with_oracle(Box::new(oracle));
    h.engine.set_market_status(true, true, true, true);
    h.sign_on(101, "B0001");

    let mut req = order_request(101, "B0001", "RELIANCE", 35001);
    req.order_flags.market = true;
    req.price = 0;
    h.feed(&req.encode());

    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert_eq!(tx_code(&frames[0]), tc::PRICE_CONFIRMATION);
    assert_eq!(tx_code(&frames[1]), tc::ORDER_CONFIRMATION_OUT);

    // Buys carry the synthesized price negated, and the Market flag drops.
    let priced = OrderRecord::decode(&frames[0]).unwrap();
    assert_eq!(priced.price, -10250);
    assert!(!priced.order_flags.market);
}

#[test]
fn entry_freeze_path_resolves_to_confirm_or_error() {
    use gateway_core::{EntryOutcome, FreezeKind};

    // Approved price freeze.
    let mut oracle = ScriptedOracle::new();
    oracle
        .entry_outcomes
        .push_back(EntryOutcome::Freeze(FreezeKind::Price));
    oracle.freeze_approvals.push_back(true);
    let mut h = Harness::with_oracle(Box::new(oracle));
    h.sign_on(101, "B0001");
    h.feed(&order_request(101, "B0001", "RELIANCE", 35001).encode());
    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert_eq!(tx_code(&frames[0]), tc::FREEZE_TO_CONTROL);
    assert_eq!(tx_code(&frames[1]), tc::ORDER_CONFIRMATION_OUT);

    // Rejected quantity freeze.
    let mut oracle = ScriptedOracle::new();
    oracle
        .entry_outcomes
        .push_back(EntryOutcome::Freeze(FreezeKind::Quantity));
    oracle.freeze_approvals.push_back(false);
    let mut h = Harness::with_oracle(Box::new(oracle));
    h.sign_on(101, "B0001");
    h.feed(&order_request(101, "B0001", "RELIANCE", 35001).encode());
    let frames = h.drain();
    assert_eq!(frames.len(), 2);
    assert_eq!(tx_code(&frames[0]), tc::FREEZE_TO_CONTROL);
    assert_eq!(tx_code(&frames[1]), tc::ORDER_ERROR_OUT);
    assert_eq!(err_code(&frames[1]), error_codes::OE_QTY_FREEZE_CAN);
}

#[test]
fn handlers_require_a_session() {
    let mut h = Harness::new();
    // No sign-on at all.
    h.feed(&order_request(101, "B0001", "RELIANCE", 35001).encode());
    let frames = h.drain();
    assert_eq!(tx_code(&frames[0]), tc::ORDER_ERROR_OUT);
    assert_eq!(err_code(&frames[0]), error_codes::USER_NOT_FOUND);

    let ts_check = h.feed_at(&[], TS);
    assert_eq!(ts_check, (0, false));
}
