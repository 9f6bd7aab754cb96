//! Spread-book handlers: spread entry/modify/cancel, the IOC-only 2L/3L
//! order flows, and the spread-combination master.

use tracing::{debug, info};

use gateway_protocol::records::{SpreadMasterBroadcast, SpreadOrderRecord, SpreadUpdateInfo};
use gateway_protocol::{error_codes, reason_codes, transaction_codes as tc, MessageHeader};

use crate::engine::Exchange;
use crate::ids::order_key;
use crate::oracle::{EntryOutcome, FillStyle, FreezeKind, MultiLegOutcome};

/// Token high digits; 2L/3L legs must share this stream component.
fn token_stream(token: i32) -> i32 {
    token / 100_000_000
}

impl Exchange {
    // -------------------------------------------------------------------------
    // Spread entry
    // -------------------------------------------------------------------------

    pub(crate) fn handle_spread_entry(&mut self, req: &SpreadOrderRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            token1 = req.legs[0].token_no,
            token2 = req.legs[1].token_no,
            price_diff = req.price_diff,
            "spread order entry request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_spread_response(
                req,
                ts,
                tc::SP_ORDER_ERROR,
                error_codes::USER_NOT_FOUND,
                reason_codes::NORMAL_CONFIRMATION,
            );
            return;
        }

        if let Err(error) = self.validate_spread_entry(req) {
            self.send_spread_response(
                req,
                ts,
                tc::SP_ORDER_ERROR,
                error,
                reason_codes::NORMAL_CONFIRMATION,
            );
            return;
        }

        match self.oracle.spread_entry_outcome() {
            EntryOutcome::Confirmed => {
                self.send_spread_response(
                    req,
                    ts,
                    tc::SP_ORDER_CONFIRMATION,
                    error_codes::SUCCESS,
                    reason_codes::NORMAL_CONFIRMATION,
                );
            }
            EntryOutcome::Freeze(kind) => {
                let reason = match kind {
                    FreezeKind::Price => reason_codes::PRICE_FREEZE,
                    FreezeKind::Quantity => reason_codes::QUANTITY_FREEZE,
                };
                self.send_spread_response(
                    req,
                    ts,
                    tc::FREEZE_TO_CONTROL,
                    error_codes::SUCCESS,
                    reason,
                );
                if self.oracle.freeze_approved() {
                    self.send_spread_response(
                        req,
                        ts,
                        tc::SP_ORDER_CONFIRMATION,
                        error_codes::SUCCESS,
                        reason,
                    );
                } else {
                    let error = match kind {
                        FreezeKind::Price => error_codes::OE_PRICE_FREEZE_CAN,
                        FreezeKind::Quantity => error_codes::OE_QTY_FREEZE_CAN,
                    };
                    self.send_spread_response(req, ts, tc::SP_ORDER_ERROR, error, reason);
                }
            }
            EntryOutcome::Rejected => {
                self.send_spread_response(
                    req,
                    ts,
                    tc::SP_ORDER_ERROR,
                    error_codes::INVALID_ORDER,
                    reason_codes::NORMAL_CONFIRMATION,
                );
            }
        }
    }

    fn validate_spread_entry(&self, req: &SpreadOrderRecord) -> Result<(), i16> {
        if req.leg_count != 2 {
            return Err(error_codes::INVALID_ORDER);
        }
        if req.order_flags.gtc || req.good_till_date != 0 {
            return Err(error_codes::E_GTCGTD_NOT_ALLOWED);
        }
        if !self.market.normal_is_open() {
            return Err(error_codes::ERR_MARKET_CLOSED);
        }
        if self.brokers.is_in_closeout(&req.broker_id) {
            return Err(error_codes::CLOSEOUT_NOT_ALLOWED);
        }
        if self.brokers.is_deactivated(&req.broker_id) {
            return Err(error_codes::OE_IS_NOT_ACTIVE);
        }
        if req.order_flags.ioc {
            return Err(error_codes::INVALID_ORDER);
        }
        if req.active_legs().iter().any(|leg| leg.disclosed_volume != 0) {
            return Err(error_codes::INVALID_ORDER);
        }
        // Spread legs must sit in different expiries of the same underlying.
        if req.legs[0].contract.expiry_date == req.legs[1].contract.expiry_date {
            return Err(error_codes::E_INVALID_CONTRACT_COMB);
        }
        if !self.is_valid_spread_combination(req.legs[0].token_no, req.legs[1].token_no) {
            return Err(error_codes::E_INVALID_CONTRACT_COMB);
        }
        self.validate_account_discipline(req)?;
        if req
            .active_legs()
            .iter()
            .any(|leg| leg.volume <= 0 || leg.volume % self.regular_lot != 0)
        {
            return Err(error_codes::OE_QUANTITY_NOT_MULT_RL);
        }
        if req.price_diff.unsigned_abs() > 99_999_999 {
            return Err(error_codes::E_PRICE_DIFF_OUT_OF_RANGE);
        }
        Ok(())
    }

    /// PRO orders must carry the broker's own (or no) account; CLI orders
    /// must carry a client account distinct from the broker id.
    fn validate_account_discipline(&self, req: &SpreadOrderRecord) -> Result<(), i16> {
        match req.pro_client {
            2 => {
                if !req.account_number.is_empty() && req.account_number != req.broker_id {
                    return Err(error_codes::E_INVALID_PRO_CLIENT);
                }
            }
            1 => {
                if req.account_number.is_empty() || req.account_number == req.broker_id {
                    return Err(error_codes::E_INVALID_CLI_AC);
                }
            }
            _ => return Err(error_codes::E_INVALID_PRO_CLIENT),
        }
        Ok(())
    }

    fn send_spread_response(
        &mut self,
        req: &SpreadOrderRecord,
        ts: u64,
        transaction_code: i16,
        error_code: i16,
        reason_code: i16,
    ) {
        let mut response = req.clone();
        response.header.transaction_code = transaction_code;
        response.header.error_code = error_code;
        response.header.message_length = SpreadOrderRecord::SIZE as i16;
        response.reason_code = reason_code;

        if transaction_code == tc::SP_ORDER_CONFIRMATION {
            response.order_number1 = self.order_numbers.next(ts);
            response.last_activity_reference = self.activity_refs.next(ts);
        }

        if (transaction_code == tc::SP_ORDER_CONFIRMATION
            || transaction_code == tc::SP_ORDER_CXL_CONFIRMATION
            || transaction_code == tc::SP_ORDER_ERROR)
            && self.brokers.is_in_closeout(&req.broker_id)
        {
            response.closeout_flag = b'C';
        }

        if transaction_code == tc::SP_ORDER_CONFIRMATION {
            self.active_spread_orders
                .insert(order_key(response.order_number1), response.clone());
            debug!(order_number = response.order_number1, "spread order stored");
        }

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Spread modification
    // -------------------------------------------------------------------------

    pub(crate) fn handle_spread_modification(&mut self, req: &SpreadOrderRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            order_number = req.order_number1,
            "spread modification request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_spread_mod_response(req, ts, error_codes::USER_NOT_FOUND, false);
            return;
        }

        // A modification must name the exact order state it saw.
        if req.last_activity_reference == 0 {
            self.send_spread_mod_response(req, ts, error_codes::OE_ORD_CANNOT_MODIFY, false);
            return;
        }

        let original = match self.active_spread_orders.get(&order_key(req.order_number1)) {
            Some(order) => order,
            None => {
                self.send_spread_mod_response(
                    req,
                    ts,
                    error_codes::ERR_INVALID_ORDER_NUMBER,
                    false,
                );
                return;
            }
        };

        if original.header.trader_id != req.header.trader_id {
            self.send_spread_mod_response(req, ts, error_codes::E_NOT_YOUR_ORDER, false);
            return;
        }
        if self.brokers.is_in_closeout(&original.broker_id) {
            self.send_spread_mod_response(req, ts, error_codes::CLOSEOUT_TRDMOD_REJECT, false);
            return;
        }
        if self.brokers.is_deactivated(&original.broker_id) {
            self.send_spread_mod_response(req, ts, error_codes::OE_IS_NOT_ACTIVE, false);
            return;
        }

        let original = &self.active_spread_orders[&order_key(req.order_number1)];
        if let Err(error) = Self::validate_spread_modification(original, req) {
            self.send_spread_mod_response(req, ts, error, false);
            return;
        }

        self.apply_spread_modification(req, ts);
    }

    fn validate_spread_modification(
        original: &SpreadOrderRecord,
        req: &SpreadOrderRecord,
    ) -> Result<(), i16> {
        if original.order_flags.frozen {
            return Err(error_codes::OE_ORD_CANNOT_MODIFY);
        }
        if original.active_legs().iter().all(|leg| leg.volume == 0) {
            return Err(error_codes::OE_ORD_CANNOT_MODIFY);
        }
        if req.order_flags.gtc || req.good_till_date != 0 {
            return Err(error_codes::E_GTCGTD_NOT_ALLOWED);
        }
        // A resting day order cannot become IOC mid-flight.
        if req.order_flags.ioc {
            return Err(error_codes::OE_ORD_CANNOT_MODIFY);
        }
        if req.last_activity_reference != original.last_activity_reference {
            return Err(error_codes::OE_ORD_CANNOT_MODIFY);
        }
        for (stored, wanted) in original.active_legs().iter().zip(req.active_legs()) {
            if stored.buy_sell_indicator != wanted.buy_sell_indicator {
                return Err(error_codes::OE_ORD_CANNOT_MODIFY);
            }
            if stored.token_no != wanted.token_no || stored.contract != wanted.contract {
                return Err(error_codes::OE_ORD_CANNOT_MODIFY);
            }
            if wanted.disclosed_volume != 0 {
                return Err(error_codes::INVALID_ORDER);
            }
        }
        Ok(())
    }

    fn apply_spread_modification(&mut self, req: &SpreadOrderRecord, ts: u64) {
        let reference = self.activity_refs.next(ts);
        if let Some(order) = self
            .active_spread_orders
            .get_mut(&order_key(req.order_number1))
        {
            order.price_diff = req.price_diff;
            for (stored, wanted) in order.legs.iter_mut().zip(req.legs.iter()) {
                stored.volume = wanted.volume;
                stored.total_vol_remaining = wanted.volume;
            }
            order.last_activity_reference = reference;
        }
        self.send_spread_mod_response(req, ts, error_codes::SUCCESS, true);
    }

    fn send_spread_mod_response(
        &mut self,
        req: &SpreadOrderRecord,
        _ts: u64,
        error_code: i16,
        confirmed: bool,
    ) {
        let mut response = if confirmed {
            self.active_spread_orders
                .get(&order_key(req.order_number1))
                .cloned()
                .unwrap_or_else(|| req.clone())
        } else {
            req.clone()
        };
        response.header = req.header;
        response.header.transaction_code = if confirmed {
            tc::SP_ORDER_MOD_CON_OUT
        } else {
            tc::SP_ORDER_MOD_REJ_OUT
        };
        response.header.error_code = error_code;
        response.header.message_length = SpreadOrderRecord::SIZE as i16;

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Spread cancellation
    // -------------------------------------------------------------------------

    pub(crate) fn handle_spread_cancellation(&mut self, req: &SpreadOrderRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            order_number = req.order_number1,
            "spread cancellation request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_spread_cxl_response(req, ts, error_codes::USER_NOT_FOUND, false);
            return;
        }
        if req.last_activity_reference == 0 {
            self.send_spread_cxl_response(req, ts, error_codes::OE_ORD_CANNOT_CANCEL, false);
            return;
        }

        let (owner_broker, stored_reference, live) =
            match self.active_spread_orders.get(&order_key(req.order_number1)) {
                Some(order) => (
                    order.broker_id.clone(),
                    order.last_activity_reference,
                    order.active_legs().iter().any(|leg| leg.volume > 0),
                ),
                None => {
                    self.send_spread_cxl_response(
                        req,
                        ts,
                        error_codes::ERR_INVALID_ORDER_NUMBER,
                        false,
                    );
                    return;
                }
            };

        if self.brokers.is_deactivated(&req.broker_id) {
            self.send_spread_cxl_response(req, ts, error_codes::OE_IS_NOT_ACTIVE, false);
            return;
        }
        if !self.brokers.can_cancel(&req.broker_id, &owner_broker) {
            self.send_spread_cxl_response(req, ts, error_codes::OE_ORD_CANNOT_CANCEL, false);
            return;
        }
        if req.last_activity_reference != stored_reference {
            self.send_spread_cxl_response(req, ts, error_codes::OE_ORD_CANNOT_CANCEL, false);
            return;
        }
        if !live {
            self.send_spread_cxl_response(req, ts, error_codes::OE_ORD_CANNOT_CANCEL, false);
            return;
        }

        if !self.oracle.cancellation_accepted() {
            self.send_spread_cxl_response(req, ts, error_codes::OE_ORD_CANNOT_CANCEL, false);
            return;
        }

        let reference = self.activity_refs.next(ts);
        if let Some(order) = self
            .active_spread_orders
            .get_mut(&order_key(req.order_number1))
        {
            for leg in order.legs.iter_mut() {
                leg.volume = 0;
                leg.total_vol_remaining = 0;
            }
            order.last_activity_reference = reference;
        }
        self.send_spread_cxl_response(req, ts, error_codes::SUCCESS, true);
    }

    fn send_spread_cxl_response(
        &mut self,
        req: &SpreadOrderRecord,
        _ts: u64,
        error_code: i16,
        confirmed: bool,
    ) {
        let mut response = if confirmed {
            self.active_spread_orders
                .get(&order_key(req.order_number1))
                .cloned()
                .unwrap_or_else(|| req.clone())
        } else {
            req.clone()
        };
        response.header = req.header;
        response.header.transaction_code = if confirmed {
            tc::SP_ORDER_CXL_CONFIRMATION
        } else {
            tc::SP_ORDER_CXL_REJ_OUT
        };
        response.header.error_code = error_code;
        response.header.message_length = SpreadOrderRecord::SIZE as i16;

        if confirmed && self.brokers.is_in_closeout(&response.broker_id) {
            response.closeout_flag = b'C';
        }

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // 2L / 3L IOC orders
    // -------------------------------------------------------------------------

    pub(crate) fn handle_two_leg_entry(&mut self, req: &SpreadOrderRecord, ts: u64) {
        self.handle_multi_leg_entry(
            req,
            ts,
            2,
            tc::TWOL_ORDER_CONFIRMATION,
            tc::TWOL_ORDER_CXL_CONFIRMATION,
            tc::TWOL_ORDER_ERROR,
        );
    }

    pub(crate) fn handle_three_leg_entry(&mut self, req: &SpreadOrderRecord, ts: u64) {
        self.handle_multi_leg_entry(
            req,
            ts,
            3,
            tc::THRL_ORDER_CONFIRMATION,
            tc::THRL_ORDER_CXL_CONFIRMATION,
            tc::THRL_ORDER_ERROR,
        );
    }

    fn handle_multi_leg_entry(
        &mut self,
        req: &SpreadOrderRecord,
        ts: u64,
        legs_expected: i16,
        confirm_code: i16,
        cancel_code: i16,
        error_code_out: i16,
    ) {
        info!(
            trader = req.header.trader_id,
            legs = legs_expected,
            "multi-leg order entry request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_multi_leg_frame(req, error_code_out, error_codes::USER_NOT_FOUND, 0.0, 0);
            return;
        }

        if let Err(error) = self.validate_multi_leg_entry(req, legs_expected) {
            self.send_multi_leg_frame(req, error_code_out, error, 0.0, 0);
            return;
        }

        let order_number = self.order_numbers.next(ts);
        let reference = self.activity_refs.next(ts);

        match self.oracle.multi_leg_outcome() {
            MultiLegOutcome::FullMatch => {
                let remaining = self.fill_remainder(req);
                self.send_multi_leg_fill(req, confirm_code, order_number, reference, remaining);
            }
            MultiLegOutcome::PartialMatch => {
                let remaining = self.fill_remainder(req);
                self.send_multi_leg_fill(req, confirm_code, order_number, reference, remaining);
                // IOC remainder does not rest; confirm its cancellation.
                self.send_multi_leg_frame(
                    req,
                    cancel_code,
                    error_codes::SUCCESS,
                    order_number,
                    reference,
                );
            }
            MultiLegOutcome::Unmatched => {
                self.send_multi_leg_frame(
                    req,
                    cancel_code,
                    error_codes::SUCCESS,
                    order_number,
                    reference,
                );
            }
        }
    }

    fn validate_multi_leg_entry(
        &self,
        req: &SpreadOrderRecord,
        legs_expected: i16,
    ) -> Result<(), i16> {
        if req.leg_count != legs_expected {
            return Err(error_codes::INVALID_ORDER);
        }
        if req.order_flags.gtc || req.good_till_date != 0 {
            return Err(error_codes::E_GTCGTD_NOT_ALLOWED);
        }
        if !req.order_flags.ioc {
            return Err(error_codes::INVALID_ORDER);
        }
        let legs = req.active_legs();
        if legs.iter().any(|leg| leg.disclosed_volume != 0) {
            return Err(error_codes::INVALID_ORDER);
        }
        if legs.iter().any(|leg| leg.volume != legs[0].volume) {
            return Err(error_codes::E_QTY_SHOULD_BE_SAME);
        }
        for (i, a) in legs.iter().enumerate() {
            for b in &legs[i + 1..] {
                if a.token_no == b.token_no {
                    return Err(error_codes::E_INVALID_CONTRACT_COMB);
                }
            }
        }
        if legs
            .iter()
            .any(|leg| token_stream(leg.token_no) != token_stream(legs[0].token_no))
        {
            return Err(error_codes::E_INVALID_CONTRACT_COMB);
        }
        if legs
            .iter()
            .any(|leg| leg.volume <= 0 || leg.volume % self.regular_lot != 0)
        {
            return Err(error_codes::OE_QUANTITY_NOT_MULT_RL);
        }
        Ok(())
    }

    /// Per-leg remaining volume after the fill draw: zero for a full fill,
    /// half the entered volume for a 50% fill.
    fn fill_remainder(&mut self, req: &SpreadOrderRecord) -> i32 {
        match self.oracle.fill_style() {
            FillStyle::Full => 0,
            FillStyle::Half => req.legs[0].volume / 2,
        }
    }

    fn send_multi_leg_fill(
        &mut self,
        req: &SpreadOrderRecord,
        code: i16,
        order_number: f64,
        reference: u64,
        remaining: i32,
    ) {
        let mut response = req.clone();
        response.header.transaction_code = code;
        response.header.error_code = error_codes::SUCCESS;
        response.header.message_length = SpreadOrderRecord::SIZE as i16;
        response.order_number1 = order_number;
        response.last_activity_reference = reference;
        for leg in response.legs.iter_mut() {
            leg.total_vol_remaining = remaining.min(leg.volume);
        }
        let frame = response.encode();
        self.emit(&frame);
    }

    fn send_multi_leg_frame(
        &mut self,
        req: &SpreadOrderRecord,
        code: i16,
        error_code: i16,
        order_number: f64,
        reference: u64,
    ) {
        let mut response = req.clone();
        response.header.transaction_code = code;
        response.header.error_code = error_code;
        response.header.message_length = SpreadOrderRecord::SIZE as i16;
        response.order_number1 = order_number;
        response.last_activity_reference = reference;
        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Spread combination master
    // -------------------------------------------------------------------------

    /// Register a tradable token pair without broadcasting.
    pub fn add_spread_combination(&mut self, info: SpreadUpdateInfo) {
        self.spread_combinations
            .insert((info.token1, info.token2), info);
    }

    /// Mutate the master and broadcast the change.
    pub fn broadcast_spread_combination_update(&mut self, info: SpreadUpdateInfo, ts: u64) {
        self.spread_combinations
            .insert((info.token1, info.token2), info);
        self.send_spread_master(info, ts, tc::BCAST_SPD_MSTR_CHG);
    }

    /// Periodic re-broadcast of a master entry; the store is not touched.
    pub fn broadcast_periodic_spread_combination_update(
        &mut self,
        info: SpreadUpdateInfo,
        ts: u64,
    ) {
        self.send_spread_master(info, ts, tc::BCAST_SPD_MSTR_CHG_PERIODIC);
    }

    fn send_spread_master(&mut self, info: SpreadUpdateInfo, ts: u64, code: i16) {
        let mut frame = SpreadMasterBroadcast {
            header: MessageHeader {
                transaction_code: code,
                timestamp: ts as i64,
                message_length: SpreadMasterBroadcast::SIZE as i16,
                ..Default::default()
            },
            update_info: info,
        };
        frame.header.log_time = Self::wall_seconds(ts);
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    /// A pair is tradable when registered, eligible and not deleted.
    pub(crate) fn is_valid_spread_combination(&self, token1: i32, token2: i32) -> bool {
        match self.spread_combinations.get(&(token1, token2)) {
            Some(info) => info.eligibility == 1 && info.delete_flag == b'N',
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_share_a_stream_by_high_digits() {
        assert_eq!(token_stream(100000001), 1);
        assert_eq!(token_stream(100000002), 1);
        assert_eq!(token_stream(200000001), 2);
    }
}
