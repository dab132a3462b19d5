//! Base57 codec for short code segments.
//!
//! The alphabet is the 62 ASCII alphanumerics minus `0`, `1`, `I`, `O` and
//! `l`, so codes read back unambiguously when typed from a screen or print.

use thiserror::Error;

/// The encoding alphabet, in digit order.
pub const ALPHABET: &[u8; 57] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const BASE: u64 = ALPHABET.len() as u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("empty input")]
    Empty,
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// Encodes `n`, most significant digit first. Zero encodes to `"2"`.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return char::from(ALPHABET[0]).to_string();
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    digits.reverse();

    // every byte comes from the ASCII alphabet
    digits.into_iter().map(char::from).collect()
}

/// Decodes a string produced by [`encode`].
pub fn decode(encoded: &str) -> Result<u64, CodecError> {
    if encoded.is_empty() {
        return Err(CodecError::Empty);
    }

    encoded
        .chars()
        .enumerate()
        .try_fold(0u64, |acc, (position, character)| {
            let digit = digit_of(character)
                .ok_or(CodecError::InvalidCharacter { character, position })?;
            acc.checked_mul(BASE)
                .and_then(|v| v.checked_add(digit))
                .ok_or(CodecError::Overflow)
        })
}

fn digit_of(c: char) -> Option<u64> {
    if !c.is_ascii() {
        return None;
    }
    ALPHABET
        .iter()
        .position(|&b| b == c as u8)
        .map(|i| i as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_has_no_ambiguous_glyphs() {
        assert_eq!(ALPHABET.len(), 57);
        for c in [b'0', b'1', b'I', b'O', b'l', b'-'] {
            assert!(!ALPHABET.contains(&c), "{} must not be in the alphabet", c as char);
        }
        let mut sorted = ALPHABET.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 57, "alphabet symbols must be distinct");
    }

    #[test]
    fn zero_is_first_symbol() {
        assert_eq!(encode(0), "2");
        assert_eq!(decode("2"), Ok(0));
    }

    #[test]
    fn known_values() {
        assert_eq!(encode(1), "3");
        assert_eq!(encode(56), "z");
        assert_eq!(encode(57), "32");
        assert_eq!(encode(57 * 57), "322");
        assert_eq!(decode("zz"), Ok(57 * 57 - 1));
    }

    #[test]
    fn decode_inverts_encode() {
        let samples = [
            0,
            1,
            2,
            56,
            57,
            58,
            3_249,
            1_000_000,
            123_456_789_012,
            u64::MAX / 57,
            u64::MAX - 1,
            u64::MAX,
        ];
        for n in samples {
            assert_eq!(decode(&encode(n)), Ok(n), "round trip failed for {n}");
        }
    }

    #[test]
    fn encode_inverts_decode() {
        for s in ["2", "3", "z", "32", "HeNNo", "abcXYZ", "9zz9"] {
            let n = decode(s).unwrap();
            assert_eq!(encode(n), s);
        }
    }

    #[test]
    fn decode_rejects_foreign_characters() {
        assert_eq!(
            decode("ab0"),
            Err(CodecError::InvalidCharacter {
                character: '0',
                position: 2
            })
        );
        assert!(matches!(decode("3-2"), Err(CodecError::InvalidCharacter { character: '-', .. })));
        assert!(matches!(decode("é"), Err(CodecError::InvalidCharacter { .. })));
        assert_eq!(decode(""), Err(CodecError::Empty));
    }

    #[test]
    fn decode_rejects_overflow() {
        let too_big = format!("{}2", encode(u64::MAX));
        assert_eq!(decode(&too_big), Err(CodecError::Overflow));
    }
}
