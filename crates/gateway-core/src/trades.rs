//! Trade ledger and the two-party trade modification / cancellation
//! protocol.
//!
//! The engine records each counterparty request and acknowledges it;
//! duplicate requests from the same trader are suppressed per fill and
//! operation. Cancellation needs both counterparties before it would be
//! final, so the ledger entry itself is never removed here.

use tracing::{debug, info};

use gateway_protocol::records::TradeRecord;
use gateway_protocol::{error_codes, transaction_codes as tc};

use crate::engine::Exchange;

impl Exchange {
    pub(crate) fn handle_trade_modification(&mut self, req: &TradeRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            fill = req.fill_number,
            requested_by = req.requested_by,
            "trade modification request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::USER_NOT_FOUND);
            return;
        }

        let request_key = (req.fill_number, req.header.trader_id);
        if self.trade_mod_requests.contains(&request_key) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::E_DUP_REQUEST);
            return;
        }

        if let Err(error) = Self::validate_trade_fields(req) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error);
            return;
        }

        let trade = match self.executed_trades.get(&req.fill_number) {
            Some(trade) => trade,
            None => {
                self.send_trade_response(
                    req,
                    ts,
                    tc::TRADE_ERROR,
                    error_codes::E_INVALID_FILL_NUMBER,
                );
                return;
            }
        };

        if !Self::is_trade_party(trade, req) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::E_NOT_YOUR_FILL);
            return;
        }

        if self.brokers.is_in_closeout(&trade.buy_broker_id) {
            self.send_trade_response(
                req,
                ts,
                tc::TRADE_ERROR,
                error_codes::CLOSEOUT_TRDMOD_REJECT,
            );
            return;
        }

        if !matches!(req.requested_by, b'1' | b'2' | b'3') {
            self.send_trade_response(
                req,
                ts,
                tc::TRADE_ERROR,
                error_codes::ERR_INVALID_TRADE_DETAILS,
            );
            return;
        }

        // Quantity changes are disallowed over this protocol.
        if req.fill_quantity != trade.fill_quantity {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::OE_DIFF_TRD_MOD_VOL);
            return;
        }

        let buy_changed = req.buy_account_number != trade.buy_account_number;
        let sell_changed = req.sell_account_number != trade.sell_account_number;
        if !buy_changed && !sell_changed {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::ERR_DATA_NOT_CHANGED);
            return;
        }

        // Apply the side(s) named by RequestedBy.
        let buy_account = req.buy_account_number.clone();
        let sell_account = req.sell_account_number.clone();
        if let Some(trade) = self.executed_trades.get_mut(&req.fill_number) {
            if req.requested_by == b'1' || req.requested_by == b'3' {
                trade.buy_account_number = buy_account;
            }
            if req.requested_by == b'2' || req.requested_by == b'3' {
                trade.sell_account_number = sell_account;
            }
        }
        self.trade_mod_requests.insert(request_key);
        debug!(fill = req.fill_number, "trade modification applied");

        self.send_trade_response(req, ts, tc::TRADE_MOD_IN, error_codes::SUCCESS);
    }

    pub(crate) fn handle_trade_cancellation(&mut self, req: &TradeRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            fill = req.fill_number,
            "trade cancellation request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::USER_NOT_FOUND);
            return;
        }

        let request_key = (req.fill_number, req.header.trader_id);
        if self.trade_cancel_requests.contains(&request_key) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::E_DUP_TRD_CXL_REQUEST);
            return;
        }

        if let Err(error) = Self::validate_trade_fields(req) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error);
            return;
        }

        let trade = match self.executed_trades.get(&req.fill_number) {
            Some(trade) => trade,
            None => {
                self.send_trade_response(
                    req,
                    ts,
                    tc::TRADE_ERROR,
                    error_codes::E_INVALID_FILL_NUMBER,
                );
                return;
            }
        };

        if !Self::is_trade_party(trade, req) {
            self.send_trade_response(req, ts, tc::TRADE_ERROR, error_codes::E_NOT_YOUR_FILL);
            return;
        }

        if self.brokers.is_in_closeout(&trade.buy_broker_id) {
            self.send_trade_response(
                req,
                ts,
                tc::TRADE_ERROR,
                error_codes::CLOSEOUT_TRDMOD_REJECT,
            );
            return;
        }

        // Record this party's request and acknowledge. The trade itself is
        // only gone once both counterparties have asked, which the
        // simulation never finalizes.
        self.trade_cancel_requests.insert(request_key);
        debug!(fill = req.fill_number, "trade cancellation request recorded");

        self.send_trade_response(req, ts, tc::TRADE_CANCEL_OUT, error_codes::SUCCESS);
    }

    fn validate_trade_fields(req: &TradeRecord) -> Result<(), i16> {
        if req.fill_number <= 0 {
            return Err(error_codes::E_INVALID_FILL_NUMBER);
        }
        if req.fill_quantity <= 0 || req.fill_price <= 0 || req.token_no <= 0 {
            return Err(error_codes::ERR_INVALID_TRADE_DETAILS);
        }
        if !matches!(req.mkt_type, b'1'..=b'4') {
            return Err(error_codes::ERR_INVALID_TRADE_DETAILS);
        }
        if !matches!(req.buy_open_close, b'O' | b'C')
            || !matches!(req.sell_open_close, b'O' | b'C')
        {
            return Err(error_codes::ERR_INVALID_TRADE_DETAILS);
        }
        Ok(())
    }

    /// The requester owns the fill when their trader id matches, or their
    /// broker sits on the matching side of the trade.
    fn is_trade_party(trade: &TradeRecord, req: &TradeRecord) -> bool {
        if trade.trader_id == req.header.trader_id {
            return true;
        }
        trade.buy_broker_id == req.buy_broker_id || trade.sell_broker_id == req.sell_broker_id
    }

    fn send_trade_response(
        &mut self,
        req: &TradeRecord,
        _ts: u64,
        transaction_code: i16,
        error_code: i16,
    ) {
        let mut response = req.clone();
        response.header.transaction_code = transaction_code;
        response.header.error_code = error_code;
        response.header.message_length = TradeRecord::SIZE as i16;

        let frame = response.encode();
        self.emit(&frame);
    }
}
