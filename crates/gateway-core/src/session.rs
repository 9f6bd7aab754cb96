//! Trader session state and the sign-on / sign-off handlers.
//!
//! A trader id lives in at most one of the two structures: signing off moves
//! it from the logged-in set to the last-logoff map, and a later sign-on
//! first acknowledges the old session with a synthetic sign-off confirmation
//! (crash-recovery ack) before clearing the entry.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use gateway_protocol::records::{SignoffRecord, SignonRecord};
use gateway_protocol::{error_codes, transaction_codes as tc};

use crate::engine::Exchange;

/// Logged-in traders and last-logoff times (seconds since epoch).
#[derive(Debug, Default)]
pub struct SessionRegistry {
    logged_in: BTreeSet<i32>,
    last_logoff: BTreeMap<i32, i32>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    pub fn is_logged_in(&self, trader_id: i32) -> bool {
        self.logged_in.contains(&trader_id)
    }

    /// Register a sign-on; returns the prior logoff time if the trader is
    /// returning after a sign-off or crash.
    pub fn sign_on(&mut self, trader_id: i32) -> Option<i32> {
        let previous = self.last_logoff.remove(&trader_id);
        self.logged_in.insert(trader_id);
        previous
    }

    /// Register a sign-off at `logoff_secs`. Returns false when the trader
    /// was not logged in.
    pub fn sign_off(&mut self, trader_id: i32, logoff_secs: i32) -> bool {
        if !self.logged_in.remove(&trader_id) {
            return false;
        }
        self.last_logoff.insert(trader_id, logoff_secs);
        true
    }

    pub fn logged_in_count(&self) -> usize {
        self.logged_in.len()
    }
}

impl Exchange {
    pub(crate) fn handle_signon(&mut self, req: &SignonRecord, ts: u64) {
        info!(
            trader = req.header.trader_id,
            user = req.user_id,
            broker = %req.broker_id,
            "sign-on request"
        );

        // A stored logoff time means the trader is recovering a previous
        // session; acknowledge that session's end before the new sign-on.
        if let Some(previous) = self.sessions.sign_on(req.header.trader_id) {
            debug!(
                trader = req.header.trader_id,
                logoff_time = previous,
                "sending recovery sign-off confirmation"
            );
            let mut ack = SignoffRecord {
                header: req.header,
                user_id: req.header.trader_id,
            };
            ack.header.transaction_code = tc::SIGN_OFF_REQUEST_OUT;
            ack.header.error_code = error_codes::SUCCESS;
            ack.header.message_length = SignoffRecord::SIZE as i16;
            let frame = ack.encode();
            self.emit(&frame);
        }

        self.send_signon_response(req, ts, error_codes::SUCCESS);
    }

    fn send_signon_response(&mut self, req: &SignonRecord, ts: u64, error_code: i16) {
        let mut response = if error_code == error_codes::SUCCESS {
            let mut ok = req.clone();
            ok.end_time = Self::wall_seconds(ts) + 28_800; // 8h session window
            ok.broker_status = b'1';
            ok.show_index = b'1';
            ok
        } else {
            SignonRecord {
                header: req.header,
                ..Default::default()
            }
        };
        response.header.transaction_code = tc::SIGNON_REQUEST_OUT;
        response.header.error_code = error_code;
        response.header.message_length = SignonRecord::SIZE as i16;

        let frame = response.encode();
        self.emit(&frame);
    }

    pub(crate) fn handle_signoff(&mut self, req: &SignoffRecord, ts: u64) {
        info!(trader = req.header.trader_id, "sign-off request");

        if !self.sessions.sign_off(req.header.trader_id, Self::wall_seconds(ts)) {
            self.send_signoff_response(req, error_codes::USER_NOT_FOUND);
            return;
        }

        self.send_signoff_response(req, error_codes::SUCCESS);
    }

    fn send_signoff_response(&mut self, req: &SignoffRecord, error_code: i16) {
        let mut response = SignoffRecord {
            header: req.header,
            user_id: if error_code == error_codes::SUCCESS {
                req.header.trader_id
            } else {
                0
            },
        };
        response.header.transaction_code = tc::SIGN_OFF_REQUEST_OUT;
        response.header.error_code = error_code;
        response.header.message_length = SignoffRecord::SIZE as i16;

        let frame = response.encode();
        self.emit(&frame);
    }
}
