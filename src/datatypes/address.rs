// ABOUTME: TS 23.040 address fields (service centre and originating address) with TON/NPI
// ABOUTME: Numeric addresses are swapped-BCD digits; alphanumeric senders are packed GSM 7-bit text

use crate::codec::{PduFormatError, decode_slice, decode_u8};
use crate::datatypes::{NumberingPlan, TypeOfNumber};
use crate::encoding::{decode_semi_octets, gsm7};
use std::fmt;
use std::io::Cursor;

/// What an address length octet counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    /// Octets following the length octet, type octet included (service centre address)
    Octets,
    /// Useful semi-octets in the value, type octet excluded (originating address)
    SemiOctets,
}

/// A decoded address.
///
/// `value` holds digits without filler, or the text of an alphanumeric
/// sender. The `+` of an international number is added when displayed, not
/// stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    pub type_of_number: TypeOfNumber,
    pub numbering_plan: NumberingPlan,
    pub value: String,
}

impl Address {
    /// Decode an address from its semi-octet length, type octet and value octets.
    ///
    /// `value_octets` must hold at least `ceil(length / 2)` octets; anything
    /// beyond that is ignored.
    pub fn decode(length: u8, type_octet: u8, value_octets: &[u8]) -> Self {
        let type_of_number = TypeOfNumber::from_type_octet(type_octet);
        let numbering_plan = NumberingPlan::from_type_octet(type_octet);

        let octets = (length as usize).div_ceil(2).min(value_octets.len());
        let value_octets = &value_octets[..octets];

        let value = if type_of_number == TypeOfNumber::Alphanumeric {
            // Length counts semi-octets of packed septets
            let semi_octets = length as usize;
            let mut septets = gsm7::unpack_septets(value_octets, semi_octets * 4 / 7);
            // A multiple of seven octets ends in a septet made only of fill bits
            if semi_octets % 2 == 0 && semi_octets * 4 % 7 == 0 && septets.last() == Some(&0) {
                septets.pop();
            }
            gsm7::septets_to_string(&septets)
        } else {
            decode_semi_octets(value_octets)
        };

        Self {
            type_of_number,
            numbering_plan,
            value,
        }
    }

    /// Read a complete address field (length, type and value) from a PDU.
    pub fn read(buf: &mut Cursor<&[u8]>, unit: LengthUnit) -> Result<Self, PduFormatError> {
        match unit {
            LengthUnit::Octets => {
                let length = decode_u8(buf, "service centre address length")?;
                if length == 0 {
                    // Service centre address omitted
                    return Ok(Self::empty());
                }
                let field = decode_slice(buf, length as usize, "service centre address")?;
                let (type_octet, value) = (field[0], &field[1..]);

                let type_of_number = TypeOfNumber::from_type_octet(type_octet);
                // No digit count here, so septets and filler are inferred from the octets
                let value = if type_of_number == TypeOfNumber::Alphanumeric {
                    gsm7::decode_packed(value)
                } else {
                    decode_semi_octets(value)
                };
                Ok(Self {
                    type_of_number,
                    numbering_plan: NumberingPlan::from_type_octet(type_octet),
                    value,
                })
            }
            LengthUnit::SemiOctets => {
                let length = decode_u8(buf, "originating address length")?;
                let type_octet = decode_u8(buf, "originating address type")?;
                let value = decode_slice(
                    buf,
                    (length as usize).div_ceil(2),
                    "originating address",
                )?;
                Ok(Self::decode(length, type_octet, value))
            }
        }
    }

    /// An absent address
    pub fn empty() -> Self {
        Self {
            type_of_number: TypeOfNumber::Unknown,
            numbering_plan: NumberingPlan::Unknown,
            value: String::new(),
        }
    }

    /// Returns true if no address value is present
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns true for international numbers
    pub fn is_international(&self) -> bool {
        self.type_of_number == TypeOfNumber::International
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_international() {
            write!(f, "+{}", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::gsm7::tests::pack;

    #[test]
    fn test_international_renders_plus() {
        let addr = Address::decode(13, 0x91, &[0x68, 0x31, 0x29, 0x63, 0x41, 0x52, 0xF6]);
        assert_eq!(addr.type_of_number, TypeOfNumber::International);
        assert_eq!(addr.numbering_plan, NumberingPlan::Isdn);
        assert_eq!(addr.value, "8613923614256");
        assert_eq!(addr.to_string(), "+8613923614256");
    }

    #[test]
    fn test_unknown_type_has_no_plus() {
        let addr = Address::decode(5, 0x81, &[0x01, 0x80, 0xF6]);
        assert_eq!(addr.type_of_number, TypeOfNumber::Unknown);
        assert_eq!(addr.to_string(), "10086");
    }

    #[test]
    fn test_alphanumeric_sender() {
        let addr = Address::decode(14, 0xD0, &[0xE7, 0xB4, 0xD9, 0x7C, 0x0E, 0x9B, 0xCD]);
        assert_eq!(addr.type_of_number, TypeOfNumber::Alphanumeric);
        assert_eq!(addr.value, "giffgaff");
        assert_eq!(addr.to_string(), "giffgaff");
    }

    #[test]
    fn test_alphanumeric_sender_fill_septet_dropped() {
        // Seven characters fill seven octets; the length octet then counts 14 semi-octets
        let (packed, count) = pack("ABCDEFG");
        assert_eq!((packed.len(), count), (7, 7));
        let addr = Address::decode(14, 0xD0, &packed);
        assert_eq!(addr.value, "ABCDEFG");
    }

    #[test]
    fn test_alphanumeric_sender_trailing_at_kept() {
        // Eight septets where the last is a real '@'
        let (packed, count) = pack("ABCDEFG@");
        assert_eq!((packed.len(), count), (7, 8));
        let addr = Address::decode(15, 0xD0, &packed);
        assert_eq!(addr.value, "ABCDEFG@");
    }

    #[test]
    fn test_read_service_centre_counts_type_octet() {
        let data = [0x07, 0x91, 0x44, 0x87, 0x20, 0x00, 0x30, 0x23, 0x60];
        let mut cursor = Cursor::new(&data[..]);
        let sca = Address::read(&mut cursor, LengthUnit::Octets).unwrap();
        assert_eq!(sca.to_string(), "+447802000332");
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_read_originating_counts_semi_octets() {
        let data = [0x0B, 0x91, 0x44, 0x77, 0x09, 0x00, 0x21, 0xF3, 0x00];
        let mut cursor = Cursor::new(&data[..]);
        let oa = Address::read(&mut cursor, LengthUnit::SemiOctets).unwrap();
        assert_eq!(oa.to_string(), "+44779000123");
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_read_omitted_service_centre() {
        let data = [0x00, 0x04];
        let mut cursor = Cursor::new(&data[..]);
        let sca = Address::read(&mut cursor, LengthUnit::Octets).unwrap();
        assert!(sca.is_empty());
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_read_truncated() {
        let data = [0x0B, 0x91, 0x44, 0x77];
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            Address::read(&mut cursor, LengthUnit::SemiOctets),
            Err(PduFormatError::Truncated { field: "originating address", .. })
        ));

        let data = [0x09, 0x91, 0x44];
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            Address::read(&mut cursor, LengthUnit::Octets),
            Err(PduFormatError::Truncated { field: "service centre address", needed: 9, remaining: 2 })
        ));
    }
}
