// ABOUTME: TP-User-Data decoding: optional user data header (information elements) and message text
// ABOUTME: Extracts concatenation info and locates the text after the header in octets or septets

use crate::codec::{PduError, PduFormatError};
use crate::datatypes::DataCoding;
use crate::encoding::{decode_8bit, decode_ucs2, gsm7};
use tracing::warn;

/// Concatenated short message, 8-bit reference
pub const IEI_CONCAT_8BIT: u8 = 0x00;
/// Concatenated short message, 16-bit reference
pub const IEI_CONCAT_16BIT: u8 = 0x08;

/// One information element of a user data header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InformationElement {
    pub id: u8,
    pub data: Vec<u8>,
}

/// Position of one segment within a concatenated message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConcatenationHeader {
    /// Shared by every segment of the same message
    pub reference: u16,
    pub total_parts: u8,
    /// 1-based
    pub sequence_index: u8,
}

impl ConcatenationHeader {
    /// Interpret a concatenation element. Returns `None` for other
    /// elements and for concatenation elements TS 23.040 says to ignore.
    pub fn from_element(element: &InformationElement) -> Option<Self> {
        let (reference, total_parts, sequence_index) = match (element.id, element.data.as_slice()) {
            (IEI_CONCAT_8BIT, &[reference, total, index]) => (u16::from(reference), total, index),
            (IEI_CONCAT_16BIT, &[hi, lo, total, index]) => (u16::from_be_bytes([hi, lo]), total, index),
            (IEI_CONCAT_8BIT | IEI_CONCAT_16BIT, data) => {
                warn!(iei = element.id, len = data.len(), "Ignoring concatenation element with bad length");
                return None;
            }
            _ => return None,
        };

        if total_parts == 0 || sequence_index == 0 || sequence_index > total_parts {
            warn!(
                reference,
                total_parts,
                sequence_index,
                "Ignoring concatenation element with invalid numbering"
            );
            return None;
        }

        Some(Self {
            reference,
            total_parts,
            sequence_index,
        })
    }
}

/// A parsed user data header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserDataHeader {
    /// Header length octet (UDHL), which excludes itself
    pub length: u8,
    pub elements: Vec<InformationElement>,
}

impl UserDataHeader {
    /// Parse the header at the start of `data`, which begins with the UDHL octet.
    pub fn parse(data: &[u8]) -> Result<Self, PduFormatError> {
        let (&length, rest) = data.split_first().ok_or(PduFormatError::Truncated {
            field: "user data header length",
            needed: 1,
            remaining: 0,
        })?;
        let mut body = rest.get(..length as usize).ok_or(PduFormatError::Truncated {
            field: "user data header",
            needed: length as usize,
            remaining: rest.len(),
        })?;

        let mut elements = Vec::new();
        while let [id, len, tail @ ..] = body {
            let value = tail.get(..*len as usize).ok_or(PduFormatError::Truncated {
                field: "information element",
                needed: *len as usize,
                remaining: tail.len(),
            })?;
            elements.push(InformationElement {
                id: *id,
                data: value.to_vec(),
            });
            body = &tail[*len as usize..];
        }
        if !body.is_empty() {
            // A lone octet cannot hold an element id and length
            return Err(PduFormatError::Truncated {
                field: "information element",
                needed: 2,
                remaining: body.len(),
            });
        }

        Ok(Self { length, elements })
    }

    /// Octets occupied by the header, its length octet included
    pub fn octets(&self) -> usize {
        self.length as usize + 1
    }

    /// Septets occupied by the header when it shares a packed 7-bit stream
    pub fn septets(&self) -> usize {
        (self.octets() * 8).div_ceil(7)
    }

    /// Where the text starts: septets for the GSM default alphabet, octets otherwise
    pub fn payload_offset(&self, coding: DataCoding) -> usize {
        if coding.counts_septets() {
            self.septets()
        } else {
            self.octets()
        }
    }

    /// The first valid concatenation element, if any
    pub fn concatenation(&self) -> Option<ConcatenationHeader> {
        self.elements.iter().find_map(ConcatenationHeader::from_element)
    }
}

/// Decoded user data of one PDU.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserData {
    pub header: Option<ConcatenationHeader>,
    /// Every element of the user data header, concatenation included
    pub elements: Vec<InformationElement>,
    pub text: String,
}

impl UserData {
    /// Decode a user data payload.
    ///
    /// `udl` is the user data length as sent: septets for the GSM default
    /// alphabet, octets otherwise. `payload` must be exactly the octets
    /// that length covers.
    pub fn decode(
        payload: &[u8],
        udl: u8,
        coding: DataCoding,
        has_header: bool,
    ) -> Result<Self, PduError> {
        let udh = if has_header {
            Some(UserDataHeader::parse(payload)?)
        } else {
            None
        };

        let skip = udh.as_ref().map_or(0, |udh| udh.payload_offset(coding));
        let text = match coding {
            DataCoding::Gsm7 => {
                if skip > udl as usize {
                    return Err(header_overrun(skip, udl as usize));
                }
                gsm7::decode_septets(payload, udl as usize, skip)
            }
            DataCoding::EightBit | DataCoding::Ucs2 => {
                let body = payload
                    .get(skip..)
                    .ok_or_else(|| header_overrun(skip, payload.len()))?;
                if coding == DataCoding::Ucs2 {
                    decode_ucs2(body)?
                } else {
                    decode_8bit(body)
                }
            }
        };

        let (header, elements) = match udh {
            Some(udh) => (udh.concatenation(), udh.elements),
            None => (None, Vec::new()),
        };

        Ok(Self {
            header,
            elements,
            text,
        })
    }
}

fn header_overrun(needed: usize, remaining: usize) -> PduError {
    PduFormatError::Truncated {
        field: "user data header",
        needed,
        remaining,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::gsm7::tests::pack;

    #[test]
    fn test_parse_concatenation_8bit() {
        let udh = UserDataHeader::parse(&[0x05, 0x00, 0x03, 0x90, 0x03, 0x01, 0xAA]).unwrap();
        assert_eq!(udh.payload_offset(DataCoding::Ucs2), 6);
        assert_eq!(udh.payload_offset(DataCoding::Gsm7), 7);
        assert_eq!(
            udh.concatenation(),
            Some(ConcatenationHeader {
                reference: 0x90,
                total_parts: 3,
                sequence_index: 1
            })
        );
    }

    #[test]
    fn test_parse_concatenation_16bit_among_other_elements() {
        let data = [0x0B, 0x24, 0x01, 0x01, 0x08, 0x04, 0x12, 0x34, 0x02, 0x02, 0x70, 0x00];
        let udh = UserDataHeader::parse(&data).unwrap();
        assert_eq!(udh.elements.len(), 3);
        assert_eq!(udh.elements[0], InformationElement { id: 0x24, data: vec![0x01] });
        assert_eq!(udh.elements[2], InformationElement { id: 0x70, data: vec![] });
        assert_eq!(
            udh.concatenation(),
            Some(ConcatenationHeader {
                reference: 0x1234,
                total_parts: 2,
                sequence_index: 2
            })
        );
    }

    #[test]
    fn test_invalid_numbering_ignored() {
        for value in [[0x01, 0x00, 0x01], [0x01, 0x02, 0x00], [0x01, 0x02, 0x03]] {
            let element = InformationElement { id: IEI_CONCAT_8BIT, data: value.to_vec() };
            assert_eq!(ConcatenationHeader::from_element(&element), None);
        }
        let short = InformationElement { id: IEI_CONCAT_8BIT, data: vec![0x01, 0x02] };
        assert_eq!(ConcatenationHeader::from_element(&short), None);
    }

    #[test]
    fn test_header_overruns_data() {
        assert!(matches!(
            UserDataHeader::parse(&[0x05, 0x00, 0x03]),
            Err(PduFormatError::Truncated { field: "user data header", .. })
        ));
        assert!(matches!(
            UserDataHeader::parse(&[0x03, 0x00, 0x03, 0x01]),
            Err(PduFormatError::Truncated { field: "information element", .. })
        ));
        assert!(matches!(
            UserDataHeader::parse(&[]),
            Err(PduFormatError::Truncated { field: "user data header length", .. })
        ));
    }

    #[test]
    fn test_ucs2_with_header_skips_octets() {
        let payload = [0x05, 0x00, 0x03, 0x2A, 0x02, 0x02, 0x00, 0x48, 0x00, 0x69];
        let ud = UserData::decode(&payload, payload.len() as u8, DataCoding::Ucs2, true).unwrap();
        assert_eq!(ud.text, "Hi");
        assert_eq!(ud.header.map(|h| h.sequence_index), Some(2));
        assert_eq!(ud.elements.len(), 1);
    }

    #[test]
    fn test_gsm7_with_header_skips_septets() {
        // Header of 6 octets occupies 7 septets: 48 bits plus one fill bit
        let (packed, count) = pack("@@@@@@@Segment text");
        let mut payload = packed;
        payload[..6].copy_from_slice(&[0x05, 0x00, 0x03, 0x07, 0x03, 0x03]);
        let ud = UserData::decode(&payload, count as u8, DataCoding::Gsm7, true).unwrap();
        assert_eq!(ud.text, "Segment text");
        assert_eq!(
            ud.header,
            Some(ConcatenationHeader {
                reference: 7,
                total_parts: 3,
                sequence_index: 3
            })
        );
    }

    #[test]
    fn test_without_header() {
        let ud = UserData::decode(&[0xE8, 0x34], 2, DataCoding::Gsm7, false).unwrap();
        assert_eq!(ud.text, "hi");
        assert!(ud.header.is_none());
        assert!(ud.elements.is_empty());
    }

    #[test]
    fn test_septet_header_longer_than_udl() {
        let payload = [0x05, 0x00, 0x03, 0x07, 0x03, 0x03];
        assert!(matches!(
            UserData::decode(&payload, 6, DataCoding::Gsm7, true),
            Err(PduError::Format(PduFormatError::Truncated { .. }))
        ));
    }
}
