//! Transaction, error and reason code tables.
//!
//! Codes are flat `i16` constants carried in the message header. The
//! transaction code selects the record layout; the error code reports the
//! outcome; the reason code qualifies order confirmations (normal vs freeze).

/// Transaction codes, keyed into the header's `TransactionCode` field.
pub mod transaction_codes {
    // Session
    pub const SIGNON_REQUEST_IN: i16 = 2300;
    pub const SIGNON_REQUEST_OUT: i16 = 2301;
    pub const SIGN_OFF_REQUEST_IN: i16 = 2320;
    pub const SIGN_OFF_REQUEST_OUT: i16 = 2321;

    // Reference data
    pub const SYSTEM_INFO_REQUEST: i16 = 1600;
    pub const SYSTEM_INFO_DATA: i16 = 1601;
    pub const PARTIAL_SYSTEM_INFORMATION: i16 = 7321;
    pub const UPDATE_LOCAL_DATABASE: i16 = 7300;
    pub const UPDATE_LOCAL_DATABASE_HEADER: i16 = 7307;
    pub const UPDATE_LOCAL_DATABASE_DATA: i16 = 7308;
    pub const BCAST_PART_MSTR_CHG: i16 = 7306;
    pub const EXCHANGE_PORTFOLIO_REQUEST: i16 = 1775;
    pub const EXCHANGE_PORTFOLIO_RESPONSE: i16 = 1776;
    pub const MESSAGE_DOWNLOAD: i16 = 7000;
    pub const MESSAGE_DOWNLOAD_HEADER: i16 = 7011;
    pub const MESSAGE_DOWNLOAD_DATA: i16 = 7021;
    pub const MESSAGE_DOWNLOAD_TRAILER: i16 = 7031;

    // Regular orders
    pub const ORDER_ENTRY_REQUEST: i16 = 2000;
    pub const ORDER_CONFIRMATION_OUT: i16 = 2073;
    pub const PRICE_CONFIRMATION: i16 = 2012;
    pub const FREEZE_TO_CONTROL: i16 = 2170;
    pub const ORDER_ERROR_OUT: i16 = 2231;
    pub const PRICE_MODIFICATION_REQUEST: i16 = 2040;
    pub const ORDER_MOD_CONFIRM_OUT: i16 = 2074;
    pub const ORDER_MOD_REJ_OUT: i16 = 2042;
    pub const ORDER_CANCEL_IN: i16 = 2070;
    pub const ORDER_CANCEL_CONFIRM_OUT: i16 = 2075;
    pub const ORDER_CXL_REJ_OUT: i16 = 2072;
    pub const KILL_SWITCH_IN: i16 = 2062;

    // Reserved interactive ("TR") request codes. The framer recognizes
    // these from the two-byte pre-peek and stops without consuming.
    pub const ORDER_ENTRY_REQUEST_TR: i16 = 20000;
    pub const ORDER_MODIFY_REQUEST_TR: i16 = 20040;

    // Spread orders
    pub const SP_BOARD_LOT_IN: i16 = 2100;
    pub const SP_BOARD_LOT_ACK_IN: i16 = 2109;
    pub const SP_ORDER_MOD_IN: i16 = 2101;
    pub const SP_ORDER_CANCEL_IN: i16 = 2102;
    pub const SP_ORDER_CONFIRMATION: i16 = 2103;
    pub const SP_ORDER_ERROR: i16 = 2104;
    pub const SP_ORDER_MOD_CON_OUT: i16 = 2105;
    pub const SP_ORDER_MOD_REJ_OUT: i16 = 2106;
    pub const SP_ORDER_CXL_CONFIRMATION: i16 = 2107;
    pub const SP_ORDER_CXL_REJ_OUT: i16 = 2108;

    // Two- and three-leg IOC orders
    pub const TWOL_BOARD_LOT_IN: i16 = 2110;
    pub const TWOL_BOARD_LOT_ACK_IN: i16 = 2114;
    pub const TWOL_ORDER_CONFIRMATION: i16 = 2111;
    pub const TWOL_ORDER_CXL_CONFIRMATION: i16 = 2112;
    pub const TWOL_ORDER_ERROR: i16 = 2113;
    pub const THRL_BOARD_LOT_IN: i16 = 2120;
    pub const THRL_BOARD_LOT_ACK_IN: i16 = 2124;
    pub const THRL_ORDER_CONFIRMATION: i16 = 2121;
    pub const THRL_ORDER_CXL_CONFIRMATION: i16 = 2122;
    pub const THRL_ORDER_ERROR: i16 = 2123;

    // Trade modification / cancellation
    pub const TRADE_MOD_IN: i16 = 5445;
    pub const TRADE_CANCEL_IN: i16 = 5440;
    pub const TRADE_CANCEL_OUT: i16 = 5441;
    pub const TRADE_ERROR: i16 = 5442;
    pub const TRADE_CONFIRMATION: i16 = 2222;
    pub const TRADE_MODIFY_CONFIRM: i16 = 2287;
    pub const TRADE_MODIFY_REJECT: i16 = 2288;
    pub const TRADE_CANCEL_CONFIRM: i16 = 2282;
    pub const TRADE_CANCEL_REJECT: i16 = 2286;

    // Broadcasts
    pub const BCAST_SPD_MSTR_CHG: i16 = 7309;
    pub const BCAST_SPD_MSTR_CHG_PERIODIC: i16 = 7310;
    pub const BCAST_JRNL_VCT_MSG: i16 = 6501;
    pub const SPD_BC_JRNL_VCT_MSG: i16 = 6502;
    pub const RPRT_MARKET_STATS_OUT_RPT: i16 = 1833;
    pub const ENHNCD_RPRT_MARKET_STATS_OUT_RPT: i16 = 1834;
    pub const MKT_IDX_RPT_DATA: i16 = 1836;
    pub const IND_IDX_RPT_DATA_CODE: i16 = 1837;
    pub const SECT_IDX_RPT_DATA_CODE: i16 = 1838;
    pub const ON_STOP_NOTIFICATION: i16 = 2212;
    pub const CTRL_MSG_TO_TRADER: i16 = 5295;
    pub const USER_ORDER_LIMIT_UPDATE_OUT: i16 = 5731;
    pub const DEALER_LIMIT_UPDATE_OUT: i16 = 5732;
    pub const SPD_ORD_LIMIT_UPDATE_OUT: i16 = 5733;
    pub const BATCH_ORDER_CANCEL: i16 = 9002;
    pub const BATCH_SPREAD_CXL_OUT: i16 = 9003;
}

/// Error codes carried in the header's `ErrorCode` field.
pub mod error_codes {
    pub const SUCCESS: i16 = 0;

    // Session / lookup
    pub const USER_NOT_FOUND: i16 = 16053;
    pub const ERR_INVALID_TRADER_ID: i16 = 16104;
    pub const ERR_INVALID_ORDER_NUMBER: i16 = 16117;
    pub const E_INVALID_FILL_NUMBER: i16 = 16119;

    // Ownership
    pub const E_NOT_YOUR_ORDER: i16 = 16121;
    pub const E_NOT_YOUR_FILL: i16 = 16120;

    // Validation
    pub const INVALID_ORDER: i16 = 16122;
    pub const OE_ORD_CANNOT_MODIFY: i16 = 16123;
    pub const OE_ORD_CANNOT_CANCEL: i16 = 16124;
    pub const OE_QUANTITY_NOT_MULT_RL: i16 = 16125;
    pub const OE_DIFF_TRD_MOD_VOL: i16 = 16126;
    pub const E_QTY_SHOULD_BE_SAME: i16 = 16127;
    pub const E_INVALID_CONTRACT_COMB: i16 = 16128;
    pub const E_INVALID_PRO_CLIENT: i16 = 16129;
    pub const E_INVALID_CLI_AC: i16 = 16130;
    pub const E_GTCGTD_NOT_ALLOWED: i16 = 16131;
    pub const ERR_DATA_NOT_CHANGED: i16 = 16132;
    pub const E_PRICE_DIFF_OUT_OF_RANGE: i16 = 16133;
    pub const ERR_MARKET_CLOSED: i16 = 16142;
    pub const ERR_INVALID_TRADE_DETAILS: i16 = 16143;

    // Authorization
    pub const OE_IS_NOT_ACTIVE: i16 = 16134;
    pub const CLOSEOUT_NOT_ALLOWED: i16 = 16135;
    pub const CLOSEOUT_ORDER_REJECT: i16 = 16136;
    pub const CLOSEOUT_TRDMOD_REJECT: i16 = 16137;

    // Freeze outcomes
    pub const OE_PRICE_FREEZE_CAN: i16 = 16138;
    pub const OE_QTY_FREEZE_CAN: i16 = 16139;

    // Duplicate trade-protocol requests
    pub const E_DUP_REQUEST: i16 = 16140;
    pub const E_DUP_TRD_CXL_REQUEST: i16 = 16141;
}

/// Reason codes qualifying order confirmations and freeze notices.
pub mod reason_codes {
    pub const NORMAL_CONFIRMATION: i16 = 0;
    pub const PRICE_FREEZE: i16 = 5;
    pub const QUANTITY_FREEZE: i16 = 6;
}

/// Broker type characters for the CM > BM > DL hierarchy.
pub mod broker_types {
    pub const CORPORATE_MANAGER: u8 = b'C';
    pub const BRANCH_MANAGER: u8 = b'B';
    pub const DEALER: u8 = b'D';
}
