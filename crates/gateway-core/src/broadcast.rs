//! Broadcast generators: bhavcopy (market statistics, index reports),
//! unsolicited order/trade notifications, limit updates and free-text
//! control/broadcast messages.
//!
//! Everything here is driven by explicit calls from the host (timed ticks
//! or admin actions); nothing is scheduled inside the engine.

use tracing::{debug, info};

use gateway_protocol::records::{
    BhavcopyHeader, BhavcopyTrailer, BroadcastMessageRecord, ControlMessageRecord,
    DealerLimitRecord, IndustryIndexEntry, MarketIndexReport, MktStatsPacket, OrderRecord,
    SectorIndexReport, SpreadLimitRecord, SpreadOrderRecord, SpreadStatsPacket,
    TradeConfirmRecord, UserOrderLimitRecord,
};
use gateway_protocol::{error_codes, transaction_codes as tc, MessageHeader};

use crate::engine::Exchange;

impl Exchange {
    fn broadcast_header(&self, code: i16, ts: u64, message_length: usize) -> MessageHeader {
        MessageHeader {
            transaction_code: code,
            log_time: Self::wall_seconds(ts),
            timestamp: ts as i64,
            error_code: error_codes::SUCCESS,
            message_length: message_length as i16,
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------------
    // Unsolicited order notifications
    // -------------------------------------------------------------------------

    /// Stop-loss order triggered; the notification reuses the trade-confirm
    /// frame with the SL flag set.
    pub fn send_stop_loss_notification(&mut self, order: &OrderRecord, ts: u64) {
        self.send_trigger_notification(order, ts, true);
    }

    /// Market-if-touched order triggered.
    pub fn send_mit_notification(&mut self, order: &OrderRecord, ts: u64) {
        self.send_trigger_notification(order, ts, false);
    }

    fn send_trigger_notification(&mut self, order: &OrderRecord, ts: u64, stop_loss: bool) {
        let mut frame = TradeConfirmRecord {
            header: self.broadcast_header(tc::ON_STOP_NOTIFICATION, ts, TradeConfirmRecord::SIZE),
            response_order_number: order.order_number,
            broker_id: order.broker_id.clone(),
            trader_number: order.trader_id,
            account_number: order.account_number.clone(),
            buy_sell_indicator: order.buy_sell_indicator,
            original_volume: order.volume,
            disclosed_volume: order.disclosed_volume,
            remaining_volume: order.total_volume_remaining,
            disclosed_volume_remaining: order.disclosed_volume_remaining,
            price: order.price,
            order_flags: order.order_flags,
            good_till_date: order.good_till_date,
            volume_filled_today: order.volume_filled_today,
            activity_type: "T".to_string(),
            activity_time: Self::wall_seconds(ts),
            token_no: order.token_no,
            contract: order.contract.clone(),
            book_type: order.book_type,
            participant_type: order.participant_type,
            ..Default::default()
        };
        frame.header.trader_id = order.header.trader_id;
        frame.order_flags.sl = stop_loss;
        frame.order_flags.mit = !stop_loss;
        info!(
            order_number = order.order_number,
            stop_loss, "trigger notification"
        );
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    /// Control approved a frozen order; the live order goes out as a
    /// regular confirmation frame.
    pub fn send_freeze_approval(&mut self, order: &OrderRecord, ts: u64) {
        let mut response = order.clone();
        response.header.transaction_code = tc::ORDER_CONFIRMATION_OUT;
        response.header.error_code = error_codes::SUCCESS;
        response.header.message_length = OrderRecord::SIZE as i16;
        response.order_flags.frozen = false;
        response.last_modified = Self::wall_seconds(ts);
        response.last_activity_reference = self.activity_refs.next(ts);
        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Trade notifications
    // -------------------------------------------------------------------------

    /// Unsolicited trade confirmation.
    pub fn send_trade_confirmation(&mut self, trade: &TradeConfirmRecord, ts: u64) {
        self.send_trade_notice(trade, ts, tc::TRADE_CONFIRMATION, error_codes::SUCCESS);
    }

    pub fn send_trade_modification_confirmation(&mut self, trade: &TradeConfirmRecord, ts: u64) {
        self.send_trade_notice(trade, ts, tc::TRADE_MODIFY_CONFIRM, error_codes::SUCCESS);
    }

    pub fn send_trade_modification_rejection(
        &mut self,
        trade: &TradeConfirmRecord,
        error_code: i16,
        ts: u64,
    ) {
        self.send_trade_notice(trade, ts, tc::TRADE_MODIFY_REJECT, error_code);
    }

    pub fn send_trade_cancellation_confirmation(&mut self, trade: &TradeConfirmRecord, ts: u64) {
        self.send_trade_notice(trade, ts, tc::TRADE_CANCEL_CONFIRM, error_codes::SUCCESS);
    }

    pub fn send_trade_cancellation_rejection(
        &mut self,
        trade: &TradeConfirmRecord,
        error_code: i16,
        ts: u64,
    ) {
        self.send_trade_notice(trade, ts, tc::TRADE_CANCEL_REJECT, error_code);
    }

    fn send_trade_notice(
        &mut self,
        trade: &TradeConfirmRecord,
        ts: u64,
        code: i16,
        error_code: i16,
    ) {
        let mut frame = trade.clone();
        frame.header.transaction_code = code;
        frame.header.error_code = error_code;
        frame.header.message_length = TradeConfirmRecord::SIZE as i16;
        frame.activity_time = Self::wall_seconds(ts);
        frame.order_flags.traded = true;
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    // -------------------------------------------------------------------------
    // Limit updates
    // -------------------------------------------------------------------------

    pub fn send_user_order_limit_update(&mut self, user_id: i32, limit: f64, ts: u64) {
        let frame = UserOrderLimitRecord {
            header: self.broadcast_header(
                tc::USER_ORDER_LIMIT_UPDATE_OUT,
                ts,
                UserOrderLimitRecord::SIZE,
            ),
            user_id,
            order_value_limit: limit,
        };
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    pub fn send_dealer_limit_update(&mut self, dealer_id: i32, limit: f64, ts: u64) {
        let frame = DealerLimitRecord {
            header: self.broadcast_header(
                tc::DEALER_LIMIT_UPDATE_OUT,
                ts,
                DealerLimitRecord::SIZE,
            ),
            dealer_id,
            order_limit: limit,
        };
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    pub fn send_spread_order_limit_update(&mut self, user_id: i32, limit: f64, ts: u64) {
        let frame = SpreadLimitRecord {
            header: self.broadcast_header(
                tc::SPD_ORD_LIMIT_UPDATE_OUT,
                ts,
                SpreadLimitRecord::SIZE,
            ),
            user_id,
            spread_order_limit: limit,
        };
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    // -------------------------------------------------------------------------
    // Control / free-text broadcast
    // -------------------------------------------------------------------------

    pub fn send_control_message(
        &mut self,
        trader_id: i32,
        action_code: &str,
        message: &str,
        ts: u64,
    ) {
        let mut frame = ControlMessageRecord {
            header: self.broadcast_header(tc::CTRL_MSG_TO_TRADER, ts, ControlMessageRecord::SIZE),
            trader_id,
            action_code: action_code.to_string(),
            message: message.to_string(),
        };
        frame.header.trader_id = trader_id;
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    pub fn send_broadcast_message(
        &mut self,
        broker_id: &str,
        action_code: &str,
        message: &str,
        ts: u64,
    ) {
        self.send_journal_message(tc::BCAST_JRNL_VCT_MSG, broker_id, action_code, message, ts);
    }

    fn send_journal_message(
        &mut self,
        code: i16,
        broker_id: &str,
        action_code: &str,
        message: &str,
        ts: u64,
    ) {
        let frame = BroadcastMessageRecord {
            header: self.broadcast_header(code, ts, BroadcastMessageRecord::SIZE),
            branch_number: 0,
            broker_number: broker_id.to_string(),
            action_code: action_code.to_string(),
            broadcast_message: message.to_string(),
        };
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    // -------------------------------------------------------------------------
    // Batch cancellations
    // -------------------------------------------------------------------------

    /// Exchange-initiated batch cancellation of a regular order.
    pub fn send_batch_order_cancel(&mut self, order: &OrderRecord, ts: u64) {
        let mut response = order.clone();
        response.header.transaction_code = tc::BATCH_ORDER_CANCEL;
        response.header.error_code = error_codes::SUCCESS;
        response.header.message_length = OrderRecord::SIZE as i16;
        response.volume = 0;
        response.last_modified = Self::wall_seconds(ts);
        response.last_activity_reference = self.activity_refs.next(ts);
        let frame = response.encode();
        self.emit(&frame);
    }

    /// Exchange-initiated batch cancellation of a spread order.
    pub fn send_batch_spread_cancel(&mut self, order: &SpreadOrderRecord, ts: u64) {
        let mut response = order.clone();
        response.header.transaction_code = tc::BATCH_SPREAD_CXL_OUT;
        response.header.error_code = error_codes::SUCCESS;
        response.header.message_length = SpreadOrderRecord::SIZE as i16;
        for leg in response.legs.iter_mut() {
            leg.total_vol_remaining = 0;
        }
        response.last_activity_reference = self.activity_refs.next(ts);
        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Bhavcopy
    // -------------------------------------------------------------------------

    /// Full regular bhavcopy sequence: start notice, header, one data packet
    /// per statistics record, trailer, then market / industry / sector index
    /// reports.
    pub fn generate_and_broadcast_bhavcopy(&mut self, session_type: u8, ts: u64) {
        info!(session_type, "bhavcopy generation");
        self.send_bhavcopy_start_notification(ts, false);
        self.send_bhavcopy_header(session_type, Self::wall_seconds(ts), ts);

        let stats: Vec<_> = self.market_statistics.values().cloned().collect();
        let mut packets = 0i16;
        for record in stats {
            let mut packet = MktStatsPacket {
                header: self.broadcast_header(tc::RPRT_MARKET_STATS_OUT_RPT, ts, 0),
                message_type: session_type,
                records: vec![record],
            };
            packet.header.message_length = packet.wire_size() as i16;
            packets += 1;
            let bytes = packet.encode();
            self.emit(&bytes);
        }

        self.send_bhavcopy_trailer(session_type, packets, ts);
        self.send_index_reports(ts);
    }

    /// Enhanced bhavcopy data pass: up to four records per packet, using the
    /// enhanced report transaction code. Returns the packet count.
    pub fn send_enhanced_bhavcopy_data(&mut self, session_type: u8, ts: u64) -> i16 {
        let stats: Vec<_> = self.market_statistics.values().cloned().collect();
        let mut packets = 0i16;
        for chunk in stats.chunks(MktStatsPacket::MAX_RECORDS) {
            let mut packet = MktStatsPacket {
                header: self.broadcast_header(tc::ENHNCD_RPRT_MARKET_STATS_OUT_RPT, ts, 0),
                message_type: session_type,
                records: chunk.to_vec(),
            };
            packet.header.message_length = packet.wire_size() as i16;
            packets += 1;
            let bytes = packet.encode();
            self.emit(&bytes);
        }
        packets
    }

    /// Full spread bhavcopy sequence: start notice, header, packets of up to
    /// three spread records, trailer, and the closing success notice.
    pub fn generate_and_broadcast_spread_bhavcopy(&mut self, session_type: u8, ts: u64) {
        info!(session_type, "spread bhavcopy generation");
        self.send_bhavcopy_start_notification(ts, true);
        self.send_bhavcopy_header(session_type, Self::wall_seconds(ts), ts);

        let stats: Vec<_> = self.spread_statistics.values().copied().collect();
        let mut packets = 0i16;
        for chunk in stats.chunks(SpreadStatsPacket::MAX_RECORDS) {
            let mut packet = SpreadStatsPacket {
                header: self.broadcast_header(tc::RPRT_MARKET_STATS_OUT_RPT, ts, 0),
                message_type: session_type,
                records: chunk.to_vec(),
            };
            packet.header.message_length = packet.wire_size() as i16;
            packets += 1;
            let bytes = packet.encode();
            self.emit(&bytes);
        }

        self.send_bhavcopy_trailer(session_type, packets, ts);
        self.send_journal_message(
            tc::SPD_BC_JRNL_VCT_MSG,
            "",
            "SYS",
            "Spread bhavcopy broadcast completed successfully",
            ts,
        );
    }

    pub fn send_bhavcopy_start_notification(&mut self, ts: u64, is_spread: bool) {
        let (code, text) = if is_spread {
            (
                tc::SPD_BC_JRNL_VCT_MSG,
                "Spread bhavcopy broadcast starting",
            )
        } else {
            (tc::BCAST_JRNL_VCT_MSG, "Market statistics report broadcast starting")
        };
        self.send_journal_message(code, "", "SYS", text, ts);
    }

    pub fn send_bhavcopy_header(&mut self, session_type: u8, report_date: i32, ts: u64) {
        let frame = BhavcopyHeader {
            header: self.broadcast_header(tc::RPRT_MARKET_STATS_OUT_RPT, ts, BhavcopyHeader::SIZE),
            message_type: session_type,
            report_date,
        };
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    pub fn send_bhavcopy_trailer(&mut self, session_type: u8, number_of_packets: i16, ts: u64) {
        let frame = BhavcopyTrailer {
            header: self.broadcast_header(
                tc::RPRT_MARKET_STATS_OUT_RPT,
                ts,
                BhavcopyTrailer::SIZE,
            ),
            message_type: session_type,
            number_of_packets,
        };
        debug!(number_of_packets, "bhavcopy trailer");
        let bytes = frame.encode();
        self.emit(&bytes);
    }

    fn send_index_reports(&mut self, ts: u64) {
        // Market index first.
        let indices: Vec<_> = self.market_indices.values().cloned().collect();
        for index in indices {
            let frame = MarketIndexReport {
                header: self.broadcast_header(tc::MKT_IDX_RPT_DATA, ts, MarketIndexReport::SIZE),
                index,
            };
            let bytes = frame.encode();
            self.emit(&bytes);
        }

        // Then industry packets, up to ten entries per frame.
        let industries = self.industry_indices.clone();
        for chunk in industries.chunks(10) {
            self.send_industry_index_report(chunk.to_vec(), ts);
        }

        // Then per-industry sector packets.
        let sectors: Vec<_> = self
            .sector_indices
            .iter()
            .map(|(industry, entries)| (industry.clone(), entries.clone()))
            .collect();
        for (industry, entries) in sectors {
            self.send_sector_index_report(&industry, entries, ts);
        }
    }

    pub fn send_industry_index_report(&mut self, records: Vec<IndustryIndexEntry>, ts: u64) {
        use gateway_protocol::records::IndustryIndexReport;
        for chunk in records.chunks(IndustryIndexReport::MAX_RECORDS) {
            let mut frame = IndustryIndexReport {
                header: self.broadcast_header(tc::IND_IDX_RPT_DATA_CODE, ts, 0),
                records: chunk.to_vec(),
            };
            frame.header.message_length = frame.wire_size() as i16;
            let bytes = frame.encode();
            self.emit(&bytes);
        }
    }

    pub fn send_sector_index_report(
        &mut self,
        industry: &str,
        records: Vec<IndustryIndexEntry>,
        ts: u64,
    ) {
        for chunk in records.chunks(SectorIndexReport::MAX_RECORDS) {
            let mut frame = SectorIndexReport {
                header: self.broadcast_header(tc::SECT_IDX_RPT_DATA_CODE, ts, 0),
                industry_name: industry.to_string(),
                records: chunk.to_vec(),
            };
            frame.header.message_length = frame.wire_size() as i16;
            let bytes = frame.encode();
            self.emit(&bytes);
        }
    }
}
