//! Character set handling for SMS user data and address fields.
//!
//! [`decode_text`] dispatches on the data coding scheme octet. The packed
//! 7-bit and semi-octet decoders are public for callers that already know
//! how their data is laid out.

pub mod digits;
pub mod gsm7;

pub use digits::decode_semi_octets;

use crate::codec::DecodeError;
use crate::datatypes::DataCoding;

/// Decode a user data payload according to its data coding scheme.
///
/// For the GSM default alphabet the septet count is inferred from the
/// payload length; see [`gsm7::decode_packed`].
pub fn decode_text(payload: &[u8], dcs: u8) -> Result<String, DecodeError> {
    match DataCoding::try_from(dcs)? {
        DataCoding::Gsm7 => Ok(gsm7::decode_packed(payload)),
        DataCoding::EightBit => Ok(decode_8bit(payload)),
        DataCoding::Ucs2 => decode_ucs2(payload),
    }
}

/// Each octet is taken as the code point of the same value.
pub fn decode_8bit(payload: &[u8]) -> String {
    payload.iter().copied().map(char::from).collect()
}

/// Big-endian UTF-16.
pub fn decode_ucs2(payload: &[u8]) -> Result<String, DecodeError> {
    if payload.len() % 2 != 0 {
        return Err(DecodeError::OddUcs2Length(payload.len()));
    }
    let units: Vec<u16> = payload
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16(&units)?)
}
