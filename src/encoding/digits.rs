// ABOUTME: Semi-octet (swapped BCD) digit decoding for addresses and timestamps
// ABOUTME: Low nibble is read first; trailing 0xF filler nibbles are stripped

/// Character for one semi-octet, per TS 23.040 address field coding.
fn semi_octet_char(nibble: u8) -> char {
    match nibble {
        0..=9 => char::from(b'0' + nibble),
        0xA => '*',
        0xB => '#',
        0xC => 'a',
        0xD => 'b',
        0xE => 'c',
        _ => 'f',
    }
}

/// Decode swapped-nibble digits, e.g. `[0x21, 0x43]` becomes `"1234"`.
pub fn decode_semi_octets(data: &[u8]) -> String {
    let mut digits = String::with_capacity(data.len() * 2);
    for &b in data {
        digits.push(semi_octet_char(b & 0x0F));
        digits.push(semi_octet_char(b >> 4));
    }
    let kept = digits.trim_end_matches('f').len();
    digits.truncate(kept);
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swapped_pair() {
        assert_eq!(decode_semi_octets(&[0x21]), "12");
    }

    #[test]
    fn test_trailing_filler_stripped() {
        // Filler sits in the high nibble of the last octet
        assert_eq!(decode_semi_octets(&[0xF2]), "2");
        // A high digit with filler below it is read low nibble first
        assert_eq!(decode_semi_octets(&[0x2F]), "f2");
        assert_eq!(decode_semi_octets(&[0x68, 0x31, 0x08, 0x20, 0x01, 0x05, 0xF0]), "8613800210500");
        assert_eq!(decode_semi_octets(&[0xFF]), "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_semi_octets(&[]), "");
    }

    #[test]
    fn test_special_semi_octets() {
        assert_eq!(decode_semi_octets(&[0xBA]), "*#");
        assert_eq!(decode_semi_octets(&[0xDC, 0xFE]), "abc");
    }
}
