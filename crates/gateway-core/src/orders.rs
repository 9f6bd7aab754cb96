//! Regular order lifecycle: entry, price modification, cancellation and the
//! kill switch.
//!
//! Orders live in the active map keyed by order number. Cancellation zeroes
//! `Volume` but keeps the record (tombstone): the order stays visible to
//! kill-switch enumeration and to later lookups, and a second cancel fails.

use tracing::{debug, info, warn};

use gateway_protocol::records::{ContractDesc, OrderRecord, PriceModRecord};
use gateway_protocol::{error_codes, reason_codes, transaction_codes as tc};

use crate::engine::Exchange;
use crate::ids::order_key;
use crate::oracle::{EntryOutcome, FreezeKind};

impl Exchange {
    // -------------------------------------------------------------------------
    // Order entry
    // -------------------------------------------------------------------------

    pub(crate) fn handle_order_entry(&mut self, req: &OrderRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            token = req.token_no,
            symbol = %req.contract.symbol,
            buy_sell = req.buy_sell_indicator,
            volume = req.volume,
            price = req.price,
            "order entry request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_order_response(
                req,
                ts,
                tc::ORDER_ERROR_OUT,
                error_codes::USER_NOT_FOUND,
                reason_codes::NORMAL_CONFIRMATION,
            );
            return;
        }

        if self.brokers.is_in_closeout(&req.broker_id) {
            // Closeout brokers may only square off: Normal market, regular
            // book, IOC. Participant orders are rejected outright.
            if !self.is_valid_closeout_order(req) {
                self.send_order_response(
                    req,
                    ts,
                    tc::ORDER_ERROR_OUT,
                    error_codes::CLOSEOUT_NOT_ALLOWED,
                    reason_codes::NORMAL_CONFIRMATION,
                );
                return;
            }
            if req.participant_type == b'P' {
                self.send_order_response(
                    req,
                    ts,
                    tc::ORDER_ERROR_OUT,
                    error_codes::CLOSEOUT_ORDER_REJECT,
                    reason_codes::NORMAL_CONFIRMATION,
                );
                return;
            }
        }

        // Market orders in an open Normal market get priced first.
        if req.order_flags.market && self.market.normal_is_open() {
            self.send_order_response(
                req,
                ts,
                tc::PRICE_CONFIRMATION,
                error_codes::SUCCESS,
                reason_codes::NORMAL_CONFIRMATION,
            );
        }

        match self.oracle.entry_outcome() {
            EntryOutcome::Confirmed => {
                self.send_order_response(
                    req,
                    ts,
                    tc::ORDER_CONFIRMATION_OUT,
                    error_codes::SUCCESS,
                    reason_codes::NORMAL_CONFIRMATION,
                );
            }
            EntryOutcome::Freeze(kind) => {
                let reason = match kind {
                    FreezeKind::Price => reason_codes::PRICE_FREEZE,
                    FreezeKind::Quantity => reason_codes::QUANTITY_FREEZE,
                };
                self.send_order_response(
                    req,
                    ts,
                    tc::FREEZE_TO_CONTROL,
                    error_codes::SUCCESS,
                    reason,
                );
                if self.oracle.freeze_approved() {
                    self.send_order_response(
                        req,
                        ts,
                        tc::ORDER_CONFIRMATION_OUT,
                        error_codes::SUCCESS,
                        reason,
                    );
                } else {
                    let error = match kind {
                        FreezeKind::Price => error_codes::OE_PRICE_FREEZE_CAN,
                        FreezeKind::Quantity => error_codes::OE_QTY_FREEZE_CAN,
                    };
                    self.send_order_response(req, ts, tc::ORDER_ERROR_OUT, error, reason);
                }
            }
            EntryOutcome::Rejected => {
                self.send_order_response(
                    req,
                    ts,
                    tc::ORDER_ERROR_OUT,
                    error_codes::INVALID_ORDER,
                    reason_codes::NORMAL_CONFIRMATION,
                );
            }
        }
    }

    fn is_valid_closeout_order(&self, req: &OrderRecord) -> bool {
        self.market.normal_is_open() && req.book_type == 1 && req.order_flags.ioc
    }

    /// Shared composer for all regular-order responses: copies the request,
    /// sets transaction/error/reason, stamps identifiers on confirmations
    /// and stores the confirmed order.
    pub(crate) fn send_order_response(
        &mut self,
        req: &OrderRecord,
        ts: u64,
        transaction_code: i16,
        error_code: i16,
        reason_code: i16,
    ) {
        let mut response = req.clone();
        response.header.transaction_code = transaction_code;
        response.header.error_code = error_code;
        response.header.message_length = OrderRecord::SIZE as i16;
        response.reason_code = reason_code;

        if transaction_code == tc::ORDER_CONFIRMATION_OUT
            || transaction_code == tc::PRICE_CONFIRMATION
        {
            response.entry_date_time = Self::wall_seconds(ts);
        }

        if transaction_code == tc::ORDER_CONFIRMATION_OUT {
            response.order_number = self.order_numbers.next(ts);
            response.last_activity_reference = self.activity_refs.next(ts);
            response.last_modified = Self::wall_seconds(ts);
        }

        // Market order pricing: negative for buys, positive for sells, and
        // the Market flag drops now that a price exists.
        if transaction_code == tc::PRICE_CONFIRMATION && req.order_flags.market {
            let market_price = self.oracle.market_price();
            response.price = if req.buy_sell_indicator == 1 {
                -market_price
            } else {
                market_price
            };
            response.order_flags.market = false;
            debug!(price = market_price, "market order priced");
        }

        if (transaction_code == tc::ORDER_CONFIRMATION_OUT
            || transaction_code == tc::ORDER_CANCEL_CONFIRM_OUT
            || transaction_code == tc::ORDER_ERROR_OUT)
            && self.brokers.is_in_closeout(&req.broker_id)
        {
            response.closeout_flag = b'C';
        }

        if transaction_code == tc::ORDER_CONFIRMATION_OUT {
            self.active_orders
                .insert(order_key(response.order_number), response.clone());
            debug!(order_number = response.order_number, "order stored");
        }

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Price modification
    // -------------------------------------------------------------------------

    pub(crate) fn handle_price_modification(&mut self, req: &PriceModRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            order_number = req.order_number,
            price = req.price,
            volume = req.volume,
            "price modification request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_modification_response(
                req,
                ts,
                tc::ORDER_MOD_REJ_OUT,
                error_codes::USER_NOT_FOUND,
            );
            return;
        }

        let original = match self.active_orders.get(&order_key(req.order_number)) {
            Some(order) => order,
            None => {
                self.send_modification_response(
                    req,
                    ts,
                    tc::ORDER_MOD_REJ_OUT,
                    error_codes::ERR_INVALID_ORDER_NUMBER,
                );
                return;
            }
        };

        if original.header.trader_id != req.header.trader_id {
            self.send_modification_response(
                req,
                ts,
                tc::ORDER_MOD_REJ_OUT,
                error_codes::E_NOT_YOUR_ORDER,
            );
            return;
        }

        if self.brokers.is_in_closeout(&original.broker_id) {
            self.send_modification_response(
                req,
                ts,
                tc::ORDER_MOD_REJ_OUT,
                error_codes::CLOSEOUT_TRDMOD_REJECT,
            );
            return;
        }

        if !Self::is_valid_modification(original, req) {
            self.send_modification_response(
                req,
                ts,
                tc::ORDER_MOD_REJ_OUT,
                error_codes::OE_ORD_CANNOT_MODIFY,
            );
            return;
        }

        if self.oracle.modification_freezes() {
            self.send_modification_response(req, ts, tc::FREEZE_TO_CONTROL, error_codes::SUCCESS);
            if self.oracle.freeze_approved() {
                self.apply_modification(req, ts);
            } else {
                self.send_modification_response(
                    req,
                    ts,
                    tc::ORDER_MOD_REJ_OUT,
                    error_codes::OE_ORD_CANNOT_MODIFY,
                );
            }
        } else {
            self.apply_modification(req, ts);
        }
    }

    fn is_valid_modification(original: &OrderRecord, req: &PriceModRecord) -> bool {
        if req.volume <= 0 {
            return false;
        }
        if req.price <= 0 && !original.order_flags.market {
            return false;
        }
        true
    }

    /// Priority is forfeited when price changes, quantity grows, or an
    /// ATO/Market order changes quantity at all.
    fn is_time_priority_lost(original: &OrderRecord, req: &PriceModRecord) -> bool {
        if original.price != req.price {
            return true;
        }
        if req.volume > original.volume {
            return true;
        }
        if (original.order_flags.ato || original.order_flags.market)
            && req.volume != original.volume
        {
            return true;
        }
        false
    }

    fn apply_modification(&mut self, req: &PriceModRecord, ts: u64) {
        let last_modified = Self::wall_seconds(ts);
        let reference = self.activity_refs.next(ts);

        if let Some(order) = self.active_orders.get_mut(&order_key(req.order_number)) {
            if Self::is_time_priority_lost(order, req) {
                warn!(
                    order_number = req.order_number,
                    "modification forfeits time priority"
                );
            }
            order.price = req.price;
            order.volume = req.volume;
            order.last_modified = last_modified;
            order.last_activity_reference = reference;
        }

        self.send_modification_response(req, ts, tc::ORDER_MOD_CONFIRM_OUT, error_codes::SUCCESS);
    }

    fn send_modification_response(
        &mut self,
        req: &PriceModRecord,
        _ts: u64,
        transaction_code: i16,
        error_code: i16,
    ) {
        // Confirmations answer with the stored order (already mutated);
        // rejections echo just the identifying fields.
        let mut response = if transaction_code == tc::ORDER_MOD_CONFIRM_OUT {
            self.active_orders
                .get(&order_key(req.order_number))
                .cloned()
                .unwrap_or_default()
        } else {
            OrderRecord::default()
        };

        response.header = req.header;
        response.header.transaction_code = transaction_code;
        response.header.error_code = error_code;
        response.header.message_length = OrderRecord::SIZE as i16;
        response.order_number = req.order_number;

        if transaction_code == tc::ORDER_MOD_CONFIRM_OUT
            && error_code == error_codes::SUCCESS
            && self.brokers.is_in_closeout(&response.broker_id)
        {
            response.closeout_flag = b'C';
        }

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------

    pub(crate) fn handle_order_cancellation(&mut self, req: &OrderRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            order_number = req.order_number,
            activity_reference = req.last_activity_reference,
            "order cancellation request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_cancellation_response(
                req,
                ts,
                tc::ORDER_CXL_REJ_OUT,
                error_codes::USER_NOT_FOUND,
            );
            return;
        }

        let (owner_broker, stored_reference, stored_volume) =
            match self.active_orders.get(&order_key(req.order_number)) {
                Some(order) => (
                    order.broker_id.clone(),
                    order.last_activity_reference,
                    order.volume,
                ),
                None => {
                    self.send_cancellation_response(
                        req,
                        ts,
                        tc::ORDER_CXL_REJ_OUT,
                        error_codes::ERR_INVALID_ORDER_NUMBER,
                    );
                    return;
                }
            };

        if self.brokers.is_deactivated(&req.broker_id) {
            self.send_cancellation_response(
                req,
                ts,
                tc::ORDER_CXL_REJ_OUT,
                error_codes::OE_IS_NOT_ACTIVE,
            );
            return;
        }

        if !self.brokers.can_cancel(&req.broker_id, &owner_broker) {
            self.send_cancellation_response(
                req,
                ts,
                tc::ORDER_CXL_REJ_OUT,
                error_codes::OE_ORD_CANNOT_CANCEL,
            );
            return;
        }

        // Optimistic concurrency: a non-zero reference must match the
        // stored order's current one.
        if req.last_activity_reference != 0 && req.last_activity_reference != stored_reference {
            self.send_cancellation_response(
                req,
                ts,
                tc::ORDER_CXL_REJ_OUT,
                error_codes::OE_ORD_CANNOT_CANCEL,
            );
            return;
        }

        if stored_volume == 0 {
            self.send_cancellation_response(
                req,
                ts,
                tc::ORDER_CXL_REJ_OUT,
                error_codes::OE_ORD_CANNOT_CANCEL,
            );
            return;
        }

        if self.oracle.cancellation_accepted() {
            self.apply_cancellation(req, ts);
        } else {
            self.send_cancellation_response(
                req,
                ts,
                tc::ORDER_CXL_REJ_OUT,
                error_codes::OE_ORD_CANNOT_CANCEL,
            );
        }
    }

    fn apply_cancellation(&mut self, req: &OrderRecord, ts: u64) {
        let last_modified = Self::wall_seconds(ts);
        let reference = self.activity_refs.next(ts);

        if let Some(order) = self.active_orders.get_mut(&order_key(req.order_number)) {
            let cancelled_volume = order.volume;
            order.volume = 0;
            order.last_modified = last_modified;
            order.last_activity_reference = reference;
            debug!(
                order_number = req.order_number,
                cancelled_volume, "order cancelled"
            );
        }

        self.send_cancellation_response(
            req,
            ts,
            tc::ORDER_CANCEL_CONFIRM_OUT,
            error_codes::SUCCESS,
        );
    }

    fn send_cancellation_response(
        &mut self,
        req: &OrderRecord,
        _ts: u64,
        transaction_code: i16,
        error_code: i16,
    ) {
        let mut response = if transaction_code == tc::ORDER_CANCEL_CONFIRM_OUT {
            self.active_orders
                .get(&order_key(req.order_number))
                .cloned()
                .unwrap_or_else(|| req.clone())
        } else {
            req.clone()
        };

        response.header = req.header;
        response.header.transaction_code = transaction_code;
        response.header.error_code = error_code;
        response.header.message_length = OrderRecord::SIZE as i16;
        response.order_number = req.order_number;

        if transaction_code == tc::ORDER_CANCEL_CONFIRM_OUT
            && error_code == error_codes::SUCCESS
            && self.brokers.is_in_closeout(&response.broker_id)
        {
            response.closeout_flag = b'C';
        }

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Kill switch
    // -------------------------------------------------------------------------

    pub(crate) fn handle_kill_switch(&mut self, req: &OrderRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            target_user = req.trader_id,
            token = req.token_no,
            "kill switch request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_kill_switch_error(req, error_codes::USER_NOT_FOUND);
            return;
        }

        if req.trader_id == 0 {
            self.send_kill_switch_error(req, error_codes::ERR_INVALID_TRADER_ID);
            return;
        }

        if self.brokers.is_deactivated(&req.broker_id) {
            self.send_kill_switch_error(req, error_codes::OE_IS_NOT_ACTIVE);
            return;
        }

        let cancelled = self.run_kill_switch(req, ts);
        if cancelled == 0 {
            self.send_kill_switch_error(req, error_codes::OE_ORD_CANNOT_CANCEL);
        } else {
            info!(cancelled, "kill switch complete");
        }
    }

    /// Cancel every live order in scope. `TokenNo == -1` means all of the
    /// target trader's orders; otherwise the contract descriptor filters,
    /// with unset fields acting as wildcards.
    fn run_kill_switch(&mut self, req: &OrderRecord, ts: u64) -> u32 {
        let cancel_all = req.token_no == -1;

        let mut to_cancel = Vec::new();
        for (key, order) in &self.active_orders {
            if order.volume == 0 {
                continue;
            }
            if order.trader_id != req.trader_id && order.header.trader_id != req.header.trader_id
            {
                continue;
            }
            if !self.brokers.can_cancel(&req.broker_id, &order.broker_id) {
                debug!(
                    order_number = order.order_number,
                    "kill switch: insufficient privileges, skipping"
                );
                continue;
            }
            if cancel_all || Self::is_contract_match(order, &req.contract) {
                to_cancel.push(*key);
            }
        }

        let mut cancelled = 0;
        for key in to_cancel {
            let last_modified = Self::wall_seconds(ts);
            let reference = self.activity_refs.next(ts);
            let snapshot = match self.active_orders.get_mut(&key) {
                Some(order) => {
                    order.volume = 0;
                    order.last_modified = last_modified;
                    order.last_activity_reference = reference;
                    order.clone()
                }
                None => continue,
            };
            cancelled += 1;
            self.send_cancellation_response(
                &snapshot,
                ts,
                tc::ORDER_CANCEL_CONFIRM_OUT,
                error_codes::SUCCESS,
            );
        }
        cancelled
    }

    fn send_kill_switch_error(&mut self, req: &OrderRecord, error_code: i16) {
        let mut response = req.clone();
        response.header.transaction_code = tc::ORDER_ERROR_OUT;
        response.header.error_code = error_code;
        response.header.message_length = OrderRecord::SIZE as i16;
        let frame = response.encode();
        self.emit(&frame);
    }

    /// Contract filter match. Symbol compares strictly; an empty instrument
    /// or option type and a zero expiry or strike act as wildcards.
    pub(crate) fn is_contract_match(order: &OrderRecord, filter: &ContractDesc) -> bool {
        if order.contract.symbol != filter.symbol {
            return false;
        }
        if !filter.instrument_name.is_empty()
            && order.contract.instrument_name != filter.instrument_name
        {
            return false;
        }
        if filter.expiry_date != 0 && order.contract.expiry_date != filter.expiry_date {
            return false;
        }
        if filter.strike_price != 0 && order.contract.strike_price != filter.strike_price {
            return false;
        }
        if !filter.option_type.is_empty() && order.contract.option_type != filter.option_type {
            return false;
        }
        true
    }
}
