//! Fixed-width radix-36 (`0-9a-z`) codec for 64-bit values.
//!
//! Output is always [`ENCODED_LEN`] characters, zero padded on the left, so
//! that lexicographic order of encoded strings matches numeric order.

use crate::error::ParseIdError;

/// Number of characters needed to represent any `u64` in radix 36.
pub const ENCODED_LEN: usize = 13;

const RADIX: u64 = 36;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub(crate) fn encode(mut value: u64) -> String {
    let mut buf = [b'0'; ENCODED_LEN];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(value % RADIX) as usize];
        value /= RADIX;
        if value == 0 {
            break;
        }
    }
    // Only ASCII from `ALPHABET` was written.
    buf.iter().map(|&b| b as char).collect()
}

pub(crate) fn decode(s: &str) -> Result<u64, ParseIdError> {
    if s.is_empty() {
        return Err(ParseIdError::Empty);
    }
    if s.len() > ENCODED_LEN {
        return Err(ParseIdError::TooLong {
            len: s.len(),
            max: ENCODED_LEN,
        });
    }

    let mut value: u64 = 0;
    for (index, ch) in s.char_indices() {
        let digit = ch
            .to_digit(RADIX as u32)
            .ok_or(ParseIdError::InvalidDigit { ch, index })?;
        value = value
            .checked_mul(RADIX)
            .and_then(|v| v.checked_add(u64::from(digit)))
            .ok_or(ParseIdError::Overflow)?;
    }
    Ok(value)
}
