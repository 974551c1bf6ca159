//! Base58 rendering of packet UIDs
//!
//! The daemon prints device UIDs in a base58 dialect whose alphabet puts
//! lowercase before uppercase and drops `0`, `O`, `I` and `l`. Digits are
//! emitted most significant first with no padding, so `0` encodes as `"1"`.

use thiserror::Error;

pub const ALPHABET: &[u8; 58] = b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

const RADIX: u64 = 58;

/// Longest possible encoding of a `u64` (58^11 > 2^64 > 58^10).
pub const MAX_ENCODED_LEN: usize = 11;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base58Error {
    #[error("empty base58 string")]
    Empty,

    #[error("invalid base58 digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },

    #[error("base58 value does not fit in 64 bits")]
    Overflow,
}

/// Encode `value` in the daemon's base58 alphabet.
pub fn encode(mut value: u64) -> String {
    let mut reversed = Vec::with_capacity(MAX_ENCODED_LEN);

    while value >= RADIX {
        reversed.push(ALPHABET[(value % RADIX) as usize]);
        value /= RADIX;
    }
    reversed.push(ALPHABET[value as usize]);

    reversed.iter().rev().map(|&b| b as char).collect()
}

/// Decode a string produced by [`encode`].
pub fn decode(text: &str) -> Result<u64, Base58Error> {
    if text.is_empty() {
        return Err(Base58Error::Empty);
    }

    text.chars().enumerate().try_fold(0u64, |value, (position, digit)| {
        let index = digit_value(digit).ok_or(Base58Error::InvalidDigit { digit, position })?;
        value
            .checked_mul(RADIX)
            .and_then(|v| v.checked_add(index))
            .ok_or(Base58Error::Overflow)
    })
}

fn digit_value(digit: char) -> Option<u64> {
    if !digit.is_ascii() {
        return None;
    }
    ALPHABET
        .iter()
        .position(|&b| b == digit as u8)
        .map(|index| index as u64)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn encode__zero__then_single_first_symbol() {
        assert_eq!(encode(0), "1");
    }

    #[test]
    fn encode__radix_boundaries__then_expected_digits() {
        assert_eq!(encode(33), "z");
        assert_eq!(encode(57), "Z");
        assert_eq!(encode(58), "21");
        assert_eq!(encode(58 * 58 - 1), "ZZ");
        assert_eq!(encode(58 * 58), "211");
    }

    #[test]
    fn encode__u64_max__then_max_length() {
        let encoded = encode(u64::MAX);
        assert_eq!(encoded.len(), MAX_ENCODED_LEN);
        assert_eq!(decode(&encoded), Ok(u64::MAX));
    }

    #[test]
    fn alphabet__ambiguous_symbols__then_absent() {
        for ambiguous in [b'0', b'O', b'I', b'l'] {
            assert!(!ALPHABET.contains(&ambiguous));
        }
    }

    #[test]
    fn decode__known_uid__then_matches_encode() {
        // Same values the daemon's base58 self-test uses.
        assert_eq!(encode(54544), "hdq");
        assert_eq!(decode("hdq"), Ok(54544));
        assert_eq!(encode(u64::from(u32::MAX)), "7xwQ9g");
        assert_eq!(decode("7xwQ9g"), Ok(u64::from(u32::MAX)));
    }

    #[test]
    fn decode__empty__then_error() {
        assert_eq!(decode(""), Err(Base58Error::Empty));
    }

    #[test]
    fn decode__ambiguous_digit__then_invalid_digit_with_position() {
        assert_eq!(
            decode("a0b"),
            Err(Base58Error::InvalidDigit {
                digit: '0',
                position: 1
            })
        );
        assert!(matches!(
            decode("ä"),
            Err(Base58Error::InvalidDigit { digit: 'ä', .. })
        ));
    }

    #[test]
    fn decode__beyond_u64__then_overflow() {
        assert_eq!(decode("zzzzzzzzzzzz"), Err(Base58Error::Overflow));
    }
}
