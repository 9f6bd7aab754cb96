//! Reference-data handlers: system information, local-database refresh,
//! exchange portfolio and message download.

use tracing::{debug, info};

use gateway_protocol::records::{
    MessageDownloadData, MessageDownloadHeader, MessageDownloadRequest, MessageDownloadTrailer,
    PortfolioData, PortfolioRequest, PortfolioResponse, SystemInfoData, SystemInfoRequest,
    UpdateLdbData, UpdateLdbHeader, UpdateLocalDatabase,
};
use gateway_protocol::{error_codes, transaction_codes as tc};

use crate::engine::Exchange;

impl Exchange {
    // -------------------------------------------------------------------------
    // System information
    // -------------------------------------------------------------------------

    pub(crate) fn handle_system_info(&mut self, req: &SystemInfoRequest, ts: u64) {
        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_system_info_response(req, ts, error_codes::USER_NOT_FOUND);
            return;
        }
        self.send_system_info_response(req, ts, error_codes::SUCCESS);
    }

    fn send_system_info_response(&mut self, req: &SystemInfoRequest, _ts: u64, error_code: i16) {
        let mut response = SystemInfoData {
            header: req.header,
            ..Default::default()
        };
        response.header.transaction_code = tc::SYSTEM_INFO_DATA;
        response.header.error_code = error_code;
        response.header.message_length = SystemInfoData::SIZE as i16;

        if error_code == error_codes::SUCCESS {
            // The simulation reports every market segment open and unit
            // values for the tunable system parameters.
            for status in [
                &mut response.market_status,
                &mut response.ex_market_status,
                &mut response.pl_market_status,
            ] {
                status.normal = 1;
                status.oddlot = 1;
                status.spot = 1;
                status.auction = 1;
            }
            response.update_portfolio = b'Y';
            response.market_index = 1;
            response.settlement_period_normal = 1;
            response.settlement_period_spot = 1;
            response.settlement_period_auction = 1;
            response.competitor_period = 1;
            response.solicitor_period = 1;
            response.warning_percent = 1;
            response.volume_freeze_percent = 1;
            response.snap_quote_time = 1;
            response.board_lot_quantity = 1;
            response.tick_size = 1;
            response.maximum_gtc_days = 1;
            // AON + MinimumFill + BooksMerged eligible.
            response.stock_eligible_indicators = 0b111;
            response.disclosed_quantity_percent = 1;
            response.risk_free_interest_rate = 1;
        }

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Local database refresh
    // -------------------------------------------------------------------------

    pub(crate) fn handle_update_local_database(&mut self, req: &UpdateLocalDatabase, ts: u64) {
        info!(
            trader = req.header.trader_id,
            security_time = req.last_update_security_time,
            participant_time = req.last_update_participant_time,
            "update local database request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_update_local_database_response(req, ts, error_codes::USER_NOT_FOUND);
            return;
        }

        // A stale market-status copy, or markets in their opening sequence,
        // forces the short partial-information path instead of a download.
        if self.market.trader_copy_is_stale(req) || self.market.markets_are_opening {
            debug!(
                trader = req.header.trader_id,
                opening = self.market.markets_are_opening,
                "stale market status; sending partial system information"
            );
            self.send_partial_system_info(req);
            return;
        }

        self.send_update_local_database_response(req, ts, error_codes::SUCCESS);
    }

    fn send_partial_system_info(&mut self, req: &UpdateLocalDatabase) {
        let mut response = SystemInfoData {
            header: req.header,
            market_status: self.market.status,
            ex_market_status: self.market.ex_status,
            pl_market_status: self.market.pl_status,
            ..Default::default()
        };
        response.header.transaction_code = tc::PARTIAL_SYSTEM_INFORMATION;
        response.header.error_code = error_codes::SUCCESS;
        response.header.message_length = SystemInfoData::SIZE as i16;

        let frame = response.encode();
        self.emit(&frame);
    }

    fn send_update_local_database_response(
        &mut self,
        req: &UpdateLocalDatabase,
        _ts: u64,
        error_code: i16,
    ) {
        let mut header_frame = UpdateLdbHeader { header: req.header };
        header_frame.header.transaction_code = tc::UPDATE_LOCAL_DATABASE_HEADER;
        header_frame.header.error_code = error_code;
        header_frame.header.message_length = UpdateLdbHeader::SIZE as i16;
        let frame = header_frame.encode();
        self.emit(&frame);

        if error_code != error_codes::SUCCESS {
            return;
        }

        // Data frame: the inner header advertises the partial-master-change
        // stream; the data area itself stays empty in the simulation.
        let mut data_frame = UpdateLdbData {
            header: req.header,
            inner_header: req.header,
            ..Default::default()
        };
        data_frame.header.transaction_code = tc::UPDATE_LOCAL_DATABASE_DATA;
        data_frame.header.error_code = error_codes::SUCCESS;
        data_frame.header.message_length = UpdateLdbData::SIZE as i16;
        data_frame.inner_header.transaction_code = tc::BCAST_PART_MSTR_CHG;
        data_frame.inner_header.error_code = error_codes::SUCCESS;
        data_frame.inner_header.message_length = 0;
        let frame = data_frame.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Exchange portfolio
    // -------------------------------------------------------------------------

    pub(crate) fn handle_portfolio(&mut self, req: &PortfolioRequest, ts: u64) {
        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_portfolio_response(req, ts, error_codes::USER_NOT_FOUND);
            return;
        }
        self.send_portfolio_response(req, ts, error_codes::SUCCESS);
    }

    fn send_portfolio_response(&mut self, req: &PortfolioRequest, ts: u64, error_code: i16) {
        let mut response = PortfolioResponse {
            header: req.header,
            more_records: b'N',
            ..Default::default()
        };
        response.header.transaction_code = tc::EXCHANGE_PORTFOLIO_RESPONSE;
        response.header.error_code = error_code;
        response.header.message_length = PortfolioResponse::SIZE as i16;

        if error_code == error_codes::SUCCESS {
            response.no_of_records = 1;
            response.portfolio_data = PortfolioData {
                portfolio: "DEMO".to_string(),
                token: 1,
                last_update_dt_time: Self::wall_seconds(ts),
                delete_flag: b'N',
            };
        }

        let frame = response.encode();
        self.emit(&frame);
    }

    // -------------------------------------------------------------------------
    // Message download
    // -------------------------------------------------------------------------

    pub(crate) fn handle_message_download(&mut self, req: &MessageDownloadRequest, ts: u64) {
        info!(
            trader = req.header.trader_id,
            sequence = req.sequence_number,
            "message download request"
        );

        if !self.sessions.is_logged_in(req.header.trader_id) {
            self.send_message_download_response(req, ts, error_codes::USER_NOT_FOUND);
            return;
        }
        self.send_message_download_response(req, ts, error_codes::SUCCESS);
    }

    fn send_message_download_response(
        &mut self,
        req: &MessageDownloadRequest,
        _ts: u64,
        error_code: i16,
    ) {
        let mut header_frame = MessageDownloadHeader { header: req.header };
        header_frame.header.transaction_code = tc::MESSAGE_DOWNLOAD_HEADER;
        header_frame.header.error_code = error_code;
        header_frame.header.message_length = MessageDownloadHeader::SIZE as i16;
        let frame = header_frame.encode();
        self.emit(&frame);

        // On error only the header goes out.
        if error_code != error_codes::SUCCESS {
            return;
        }

        let mut data_frame = MessageDownloadData {
            header: req.header,
            inner_header: req.header,
            ..Default::default()
        };
        data_frame.header.transaction_code = tc::MESSAGE_DOWNLOAD_DATA;
        data_frame.header.error_code = error_codes::SUCCESS;
        data_frame.header.message_length = MessageDownloadData::SIZE as i16;
        data_frame.inner_header.transaction_code = tc::MESSAGE_DOWNLOAD_DATA;
        data_frame.inner_header.error_code = error_codes::SUCCESS;
        data_frame.inner_header.message_length = gateway_protocol::HEADER_SIZE as i16;
        let sample = b"Sample trader message data for download";
        data_frame.inner_data[..sample.len()].copy_from_slice(sample);
        let frame = data_frame.encode();
        self.emit(&frame);

        let mut trailer_frame = MessageDownloadTrailer { header: req.header };
        trailer_frame.header.transaction_code = tc::MESSAGE_DOWNLOAD_TRAILER;
        trailer_frame.header.error_code = error_codes::SUCCESS;
        trailer_frame.header.message_length = MessageDownloadTrailer::SIZE as i16;
        let frame = trailer_frame.encode();
        self.emit(&frame);
    }
}
