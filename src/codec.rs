// SMS-DELIVER codec primitives
//
// Length-checked cursor helpers, hex input handling and the error types shared
// by every decoder in the crate. Higher-level records (addresses, timestamps,
// user data) build on these rather than indexing into raw slices.

use bytes::Buf;
use hex::FromHexError;
use std::io::Cursor;
use std::string::FromUtf16Error;
use thiserror::Error;

/// Structural problems with the PDU itself: bad hex, lengths that do not
/// agree with the buffer, impossible field values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PduFormatError {
    #[error("Truncated PDU: field '{field}' needs {needed} octets, {remaining} remaining")]
    Truncated {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid hex encoding at offset {position}")]
    InvalidHexEncoding { position: usize },

    #[error("Invalid timestamp field '{field}'")]
    InvalidTimestamp { field: &'static str },

    #[error("{extra} unexpected octets after user data")]
    TrailingData { extra: usize },

    #[error("TPDU length mismatch: transport reported {reported}, PDU carries {actual}")]
    LengthMismatch { reported: usize, actual: usize },

    #[error("Unsupported message type indicator: {0:#04b}")]
    UnsupportedMessageType(u8),
}

/// Problems turning a user data payload into text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unsupported data coding scheme: {0:#04x}")]
    UnsupportedScheme(u8),

    #[error("UCS-2 payload has odd length {0}")]
    OddUcs2Length(usize),

    #[error("Invalid UCS-2 payload: unpaired surrogate")]
    InvalidUcs2,
}

impl From<FromUtf16Error> for DecodeError {
    fn from(_: FromUtf16Error) -> Self {
        DecodeError::InvalidUcs2
    }
}

/// Error returned by a full PDU decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PduError {
    #[error(transparent)]
    Format(#[from] PduFormatError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type PduResult<T> = Result<T, PduError>;

/// Decode a single octet
pub fn decode_u8(buf: &mut Cursor<&[u8]>, field: &'static str) -> Result<u8, PduFormatError> {
    ensure_remaining(buf, 1, field)?;
    Ok(buf.get_u8())
}

/// Borrow the next `len` octets and advance past them.
pub fn decode_slice<'a>(
    buf: &mut Cursor<&'a [u8]>,
    len: usize,
    field: &'static str,
) -> Result<&'a [u8], PduFormatError> {
    ensure_remaining(buf, len, field)?;
    let start = buf.position() as usize;
    let inner: &'a [u8] = *buf.get_ref();
    buf.advance(len);
    Ok(&inner[start..start + len])
}

fn ensure_remaining(
    buf: &Cursor<&[u8]>,
    needed: usize,
    field: &'static str,
) -> Result<(), PduFormatError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(PduFormatError::Truncated {
            field,
            needed,
            remaining,
        });
    }
    Ok(())
}

/// Decode a hex string into octets. Surrounding whitespace is ignored, case is not significant.
pub fn decode_hex(hex: &str) -> Result<Vec<u8>, PduFormatError> {
    let hex = hex.trim();
    hex::decode(hex).map_err(|e| {
        let position = match e {
            FromHexError::InvalidHexCharacter { index, .. } => index,
            _ => hex.len(),
        };
        PduFormatError::InvalidHexEncoding { position }
    })
}

/// Renders octets as uppercase hex, for logging raw PDUs.
#[derive(Debug)]
pub struct HexData<'a>(pub &'a [u8]);

impl std::fmt::Display for HexData<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}
