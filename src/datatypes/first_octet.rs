// ABOUTME: First octet of an SMS-DELIVER TPDU: message type indicator and header/reply flags
// ABOUTME: Only DELIVER (and the reserved value, which TS 23.040 says to treat as DELIVER) is accepted

use crate::codec::PduFormatError;

const MTI_MASK: u8 = 0b0000_0011;
const MORE_MESSAGES: u8 = 0b0000_0100;
const LOOP_PREVENTION: u8 = 0b0000_1000;
const STATUS_REPORT: u8 = 0b0010_0000;
const USER_DATA_HEADER: u8 = 0b0100_0000;
const REPLY_PATH: u8 = 0b1000_0000;

const MTI_DELIVER: u8 = 0b00;
const MTI_RESERVED: u8 = 0b11;

/// Flags carried in the first octet of an SMS-DELIVER.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeliverFirstOctet {
    /// Service centre has more messages waiting for this recipient
    pub more_messages: bool,
    pub loop_prevention: bool,
    /// Sender asked for a status report
    pub status_report: bool,
    /// User data starts with a header
    pub user_data_header: bool,
    pub reply_path: bool,
}

impl DeliverFirstOctet {
    pub fn from_byte(value: u8) -> Result<Self, PduFormatError> {
        let mti = value & MTI_MASK;
        if mti != MTI_DELIVER && mti != MTI_RESERVED {
            return Err(PduFormatError::UnsupportedMessageType(mti));
        }

        Ok(Self {
            // TP-MMS is inverted: a clear bit means more messages are waiting
            more_messages: value & MORE_MESSAGES == 0,
            loop_prevention: value & LOOP_PREVENTION != 0,
            status_report: value & STATUS_REPORT != 0,
            user_data_header: value & USER_DATA_HEADER != 0,
            reply_path: value & REPLY_PATH != 0,
        })
    }
}
