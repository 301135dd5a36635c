// ABOUTME: Data coding schemes accepted on received SMS-DELIVER PDUs
// ABOUTME: Only the GSM default alphabet, 8-bit data and UCS-2 are decoded; anything else is rejected

use crate::codec::DecodeError;
use num_enum::{IntoPrimitive, TryFromPrimitive, TryFromPrimitiveError};
use std::fmt;

/// Data coding scheme of the user data.
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DataCoding {
    /// GSM 03.38 default alphabet, packed septets. UDL counts septets.
    Gsm7 = 0x00,
    /// 8-bit data. UDL counts octets.
    EightBit = 0x04,
    /// UCS-2, big-endian. UDL counts octets.
    Ucs2 = 0x08,
}

impl DataCoding {
    /// Returns true when the user data length is a septet count
    pub fn counts_septets(&self) -> bool {
        matches!(self, DataCoding::Gsm7)
    }

    /// Number of payload octets carrying `udl` units of this coding
    pub fn payload_octets(&self, udl: u8) -> usize {
        match self {
            DataCoding::Gsm7 => crate::encoding::gsm7::octets_for(udl as usize),
            DataCoding::EightBit | DataCoding::Ucs2 => udl as usize,
        }
    }

    /// Returns the character set name for this encoding
    pub fn charset_name(&self) -> &'static str {
        match self {
            DataCoding::Gsm7 => "GSM 7-bit Default",
            DataCoding::EightBit => "8-bit",
            DataCoding::Ucs2 => "UCS-2",
        }
    }
}

impl From<TryFromPrimitiveError<DataCoding>> for DecodeError {
    fn from(err: TryFromPrimitiveError<DataCoding>) -> Self {
        DecodeError::UnsupportedScheme(err.number)
    }
}

impl fmt::Display for DataCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.charset_name())
    }
}
