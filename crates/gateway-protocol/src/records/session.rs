//! Sign-on / sign-off records.

use crate::codec::{ProtocolError, Reader, Writer};
use crate::header::{MessageHeader, HEADER_SIZE};

/// Sign-on request and response share one layout (122 bytes):
///
/// ```text
/// Header                     24
/// UserId                     i32
/// Password                   [8]
/// BrokerId                   [5]
/// TraderName                 [26]
/// BranchId                   i32
/// VersionNumber              i32
/// UserType                   i16
/// SequenceNumber             f64
/// BrokerEligibilityPerMarket u16
/// MemberType                 i16
/// ClearingStatus             u8
/// BrokerName                 [26]
/// EndTime                    i32
/// BrokerStatus               u8
/// ShowIndex                  u8
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignonRecord {
    pub header: MessageHeader,
    pub user_id: i32,
    pub password: String,
    pub broker_id: String,
    pub trader_name: String,
    pub branch_id: i32,
    pub version_number: i32,
    pub user_type: i16,
    pub sequence_number: f64,
    pub broker_eligibility_per_market: u16,
    pub member_type: i16,
    pub clearing_status: u8,
    pub broker_name: String,
    pub end_time: i32,
    pub broker_status: u8,
    pub show_index: u8,
}

impl SignonRecord {
    pub const SIZE: usize = HEADER_SIZE + 98;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(SignonRecord {
            header: MessageHeader::read(&mut r)?,
            user_id: r.i32()?,
            password: r.fixed_str(8)?,
            broker_id: r.fixed_str(5)?,
            trader_name: r.fixed_str(26)?,
            branch_id: r.i32()?,
            version_number: r.i32()?,
            user_type: r.i16()?,
            sequence_number: r.f64()?,
            broker_eligibility_per_market: r.u16()?,
            member_type: r.i16()?,
            clearing_status: r.u8()?,
            broker_name: r.fixed_str(26)?,
            end_time: r.i32()?,
            broker_status: r.u8()?,
            show_index: r.u8()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.user_id);
        w.fixed_str(&self.password, 8);
        w.fixed_str(&self.broker_id, 5);
        w.fixed_str(&self.trader_name, 26);
        w.i32(self.branch_id);
        w.i32(self.version_number);
        w.i16(self.user_type);
        w.f64(self.sequence_number);
        w.u16(self.broker_eligibility_per_market);
        w.i16(self.member_type);
        w.u8(self.clearing_status);
        w.fixed_str(&self.broker_name, 26);
        w.i32(self.end_time);
        w.u8(self.broker_status);
        w.u8(self.show_index);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

/// Sign-off request and response (28 bytes): header + `UserId i32`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignoffRecord {
    pub header: MessageHeader,
    pub user_id: i32,
}

impl SignoffRecord {
    pub const SIZE: usize = HEADER_SIZE + 4;

    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = Reader::new(buf);
        Ok(SignoffRecord {
            header: MessageHeader::read(&mut r)?,
            user_id: r.i32()?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(Self::SIZE);
        self.header.write(&mut w);
        w.i32(self.user_id);
        debug_assert_eq!(w.len(), Self::SIZE);
        w.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signon_round_trips() {
        let rec = SignonRecord {
            user_id: 101,
            password: "secret".into(),
            broker_id: "B0001".into(),
            trader_name: "ALICE".into(),
            branch_id: 7,
            version_number: 75300,
            sequence_number: 12.0,
            broker_name: "ACME SECURITIES".into(),
            broker_status: b'1',
            show_index: b'1',
            ..Default::default()
        };
        let bytes = rec.encode();
        assert_eq!(bytes.len(), SignonRecord::SIZE);
        assert_eq!(SignonRecord::decode(&bytes).unwrap(), rec);
    }
}
