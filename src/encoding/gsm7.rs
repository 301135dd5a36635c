// ABOUTME: GSM 03.38 default alphabet tables and packed 7-bit (septet) unpacking
// ABOUTME: Septets are pulled out of the octet stream with integer shifts, low bits first

/// Escape septet: the following septet is looked up in the extension table.
pub const ESCAPE: u8 = 0x1B;

/// GSM 03.38 default alphabet, indexed by septet value.
const DEFAULT_ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', //
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1b}', 'Æ', 'æ', 'ß', 'É', //
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?', //
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', //
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', //
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', //
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à', //
];

/// Extension table entry for a septet that followed an escape.
fn extension_char(code: u8) -> Option<char> {
    match code {
        0x0A => Some('\u{0c}'),
        0x14 => Some('^'),
        0x28 => Some('{'),
        0x29 => Some('}'),
        0x2F => Some('\\'),
        0x3C => Some('['),
        0x3D => Some('~'),
        0x3E => Some(']'),
        0x40 => Some('|'),
        0x65 => Some('€'),
        _ => None,
    }
}

/// Look up one septet in the default alphabet.
pub fn default_char(code: u8) -> char {
    DEFAULT_ALPHABET[(code & 0x7F) as usize]
}

/// Number of whole septets carried by `len` octets.
pub fn septets_in(len: usize) -> usize {
    len * 8 / 7
}

/// Number of octets needed to carry `septets` packed septets.
pub fn octets_for(septets: usize) -> usize {
    (septets * 7).div_ceil(8)
}

/// Extract `count` septets from a packed octet stream.
///
/// Septet `n` starts at bit `7n` of the stream, where bit 0 is the least
/// significant bit of the first octet. Septets that would run past the end
/// of `data` are not produced.
pub fn unpack_septets(data: &[u8], count: usize) -> Vec<u8> {
    let count = count.min(septets_in(data.len()));
    let mut septets = Vec::with_capacity(count);

    for n in 0..count {
        let bit = n * 7;
        let index = bit / 8;
        let shift = bit % 8;

        let mut value = u16::from(data[index]) >> shift;
        if shift > 1 {
            if let Some(&next) = data.get(index + 1) {
                value |= u16::from(next) << (8 - shift);
            }
        }
        septets.push((value & 0x7F) as u8);
    }

    septets
}

/// Map a septet sequence through the default and extension tables.
pub fn septets_to_string(septets: &[u8]) -> String {
    let mut text = String::with_capacity(septets.len());
    let mut iter = septets.iter().copied();

    while let Some(code) = iter.next() {
        if code != ESCAPE {
            text.push(default_char(code));
            continue;
        }
        // A trailing escape with nothing after it is dropped
        if let Some(ext) = iter.next() {
            text.push(extension_char(ext).unwrap_or_else(|| default_char(ext)));
        }
    }

    text
}

/// Decode exactly `count` septets, discarding the first `skip` of them.
///
/// Used when the user data length is known, so no padding heuristics apply.
/// `skip` covers a user data header that shares the septet stream.
pub fn decode_septets(data: &[u8], count: usize, skip: usize) -> String {
    let septets = unpack_septets(data, count);
    septets_to_string(septets.get(skip..).unwrap_or_default())
}

/// Decode a whole packed payload whose septet count is not known.
///
/// When the octet count is a multiple of seven the final septet is made up
/// entirely of fill bits; a zero there is padding rather than an `@`.
pub fn decode_packed(data: &[u8]) -> String {
    let mut septets = unpack_septets(data, septets_in(data.len()));
    if data.len() % 7 == 0 && septets.last() == Some(&0) {
        septets.pop();
    }
    septets_to_string(&septets)
}
