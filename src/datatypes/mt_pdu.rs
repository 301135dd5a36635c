// ABOUTME: Full SMS-DELIVER (mobile terminated) PDU decoding from the modem's hex representation
// ABOUTME: Every length field is checked against the remaining buffer; nothing is silently truncated

use crate::codec::{
    DecodeError, PduError, PduFormatError, PduResult, decode_hex, decode_slice, decode_u8,
};
use crate::datatypes::{Address, DataCoding, DeliverFirstOctet, LengthUnit, Timestamp, UserData};
use bytes::Buf;
use std::fmt;
use std::io::Cursor;
use tracing::debug;

/// Decoder settings
///
/// # Example
///
/// ```rust
/// use smspdu::DecoderConfig;
///
/// // Time stamps from a 1990s archive
/// let config = DecoderConfig::default().with_century(1900);
/// assert_eq!(config.century, 1900);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Added to the two-digit SCTS year (default: 2000)
    pub century: i32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { century: 2000 }
    }
}

impl DecoderConfig {
    /// Set the century base for two-digit years
    pub fn with_century(mut self, century: i32) -> Self {
        self.century = century;
        self
    }
}

/// A received short message (SMS-DELIVER).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MtPdu {
    pub service_center_address: Address,
    pub first_octet: DeliverFirstOctet,
    pub originating_address: Address,
    pub protocol_id: u8,
    pub data_coding: DataCoding,
    pub timestamp: Timestamp,
    pub user_data: UserData,
}

impl MtPdu {
    /// Decode a hex PDU with the default configuration.
    pub fn decode(hex: &str) -> PduResult<Self> {
        MtPduDecoder::default().decode(hex)
    }

    /// The message text
    pub fn text(&self) -> &str {
        &self.user_data.text
    }

    /// Returns true if this PDU is one segment of a concatenated message
    pub fn is_segment(&self) -> bool {
        self.user_data.header.is_some()
    }
}

impl fmt::Display for MtPdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FROM: {}, TIME: {}, CONTENT: {:?}",
            self.originating_address, self.timestamp, self.user_data.text
        )
    }
}

/// Decodes SMS-DELIVER PDUs. Holds no per-message state.
#[derive(Debug, Clone, Default)]
pub struct MtPduDecoder {
    config: DecoderConfig,
}

impl MtPduDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one hex-encoded PDU, service centre address included.
    pub fn decode(&self, hex: &str) -> PduResult<MtPdu> {
        let octets = decode_hex(hex)?;
        self.decode_bytes(&octets)
    }

    /// Decode and check the TPDU length reported by the modem.
    ///
    /// The reported length excludes the service centre address field.
    pub fn decode_with_length(&self, hex: &str, tpdu_len: usize) -> PduResult<MtPdu> {
        let octets = decode_hex(hex)?;
        let actual = tpdu_length(&octets)?;
        if actual != tpdu_len {
            return Err(PduFormatError::LengthMismatch {
                reported: tpdu_len,
                actual,
            }
            .into());
        }
        self.decode_bytes(&octets)
    }

    /// Decode a PDU that is already in binary form.
    pub fn decode_bytes(&self, octets: &[u8]) -> PduResult<MtPdu> {
        let mut buf = Cursor::new(octets);

        let service_center_address = Address::read(&mut buf, LengthUnit::Octets)?;
        let first_octet = DeliverFirstOctet::from_byte(decode_u8(&mut buf, "first octet")?)?;
        let originating_address = Address::read(&mut buf, LengthUnit::SemiOctets)?;
        let protocol_id = decode_u8(&mut buf, "protocol identifier")?;
        let data_coding = DataCoding::try_from(decode_u8(&mut buf, "data coding scheme")?)
            .map_err(DecodeError::from)?;

        let scts: &[u8; Timestamp::SIZE] =
            decode_slice(&mut buf, Timestamp::SIZE, "service centre time stamp")?
                .try_into()
                .map_err(|_| PduFormatError::InvalidTimestamp { field: "length" })?;
        let timestamp = Timestamp::decode(scts, self.config.century)?;

        let udl = decode_u8(&mut buf, "user data length")?;
        let payload = decode_slice(&mut buf, data_coding.payload_octets(udl), "user data")?;
        if buf.has_remaining() {
            return Err(PduFormatError::TrailingData {
                extra: buf.remaining(),
            }
            .into());
        }

        let user_data = UserData::decode(payload, udl, data_coding, first_octet.user_data_header)?;

        let pdu = MtPdu {
            service_center_address,
            first_octet,
            originating_address,
            protocol_id,
            data_coding,
            timestamp,
            user_data,
        };
        debug!(
            from = %pdu.originating_address,
            coding = %pdu.data_coding,
            segment = ?pdu.user_data.header,
            "Decoded SMS-DELIVER"
        );
        Ok(pdu)
    }
}

/// Octet length of the TPDU, i.e. the PDU without its service centre address field.
pub fn tpdu_length(octets: &[u8]) -> Result<usize, PduError> {
    let sca_len = *octets.first().ok_or(PduFormatError::Truncated {
        field: "service centre address length",
        needed: 1,
        remaining: 0,
    })? as usize;
    octets
        .len()
        .checked_sub(sca_len + 1)
        .ok_or_else(|| {
            PduFormatError::Truncated {
                field: "service centre address",
                needed: sca_len,
                remaining: octets.len() - 1,
            }
            .into()
        })
}
