//! Unsigned LEB128 variable-length integers
//!
//! Seven payload bits per byte, least-significant group first. Every byte
//! except the last carries the continuation bit (0x80).

const CONTINUATION: u8 = 0x80;
const PAYLOAD_MASK: u64 = 0x7f;

/// Number of bytes `value` occupies once encoded
pub const fn encoded_len(mut value: u64) -> usize {
    let mut len = 1;
    while value > PAYLOAD_MASK {
        value >>= 7;
        len += 1;
    }
    len
}

/// Append the encoding of `value` to `out`
pub fn encode_into(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & PAYLOAD_MASK) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | CONTINUATION);
    }
}

/// Encode `value` into a fresh buffer
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    encode_into(value, &mut out);
    out
}

/// Decode a value from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends mid-value or the value does not fit in a `u64`.
pub fn decode(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in bytes.iter().enumerate() {
        let shift = 7 * i as u32;
        if shift >= 64 {
            return None;
        }
        let group = u64::from(byte) & PAYLOAD_MASK;
        if shift > 0 && group >> (64 - shift) != 0 {
            return None;
        }
        value |= group << shift;
        if byte & CONTINUATION == 0 {
            return Some((value, i + 1));
        }
    }
    None
}
