use percent_encoding::percent_decode_str;
use std::fmt;

/// Stands in for peer id bytes outside the ASCII range
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// A peer id recovered from aria2's percent-encoded `peerId` field
///
/// Holds exactly one char per raw byte: ASCII bytes map to themselves and
/// every other byte becomes [`REPLACEMENT`], so positions in the string line
/// up with byte offsets in the original id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedPeerId {
    chars: Vec<char>,
}

impl DecodedPeerId {
    pub fn as_chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of raw bytes the id decoded to
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        let mut own = self.chars.iter();
        prefix.chars().all(|c| own.next() == Some(&c))
    }
}

impl fmt::Display for DecodedPeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

/// Decode a percent-encoded peer id. Never fails.
///
/// Malformed escapes (`%`, `%G1`) are kept as literal bytes and `+` is not
/// treated as a space, matching how aria2 escapes raw bytes.
pub fn decode(raw_identifier: &str) -> DecodedPeerId {
    let chars = percent_decode_str(raw_identifier)
        .map(|byte| if byte.is_ascii() { byte as char } else { REPLACEMENT })
        .collect();

    DecodedPeerId { chars }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_ascii() {
        let decoded = decode("-qB4690-abcdefghijkl");
        assert_eq!(decoded.to_string(), "-qB4690-abcdefghijkl");
        assert_eq!(decoded.len(), 20);
    }

    #[test]
    fn test_decode_percent_escapes() {
        let decoded = decode("%2DXL0012%2D");
        assert_eq!(decoded.to_string(), "-XL0012-");
        assert_eq!(decoded.len(), 8);
    }

    #[test]
    fn test_decode_non_ascii_bytes_replaced() {
        // 20-byte id with binary tail
        let decoded = decode("-TR4040-%e5%9f%ba%00%ff%80abcdef");
        assert_eq!(decoded.len(), 20);
        assert_eq!(decoded.as_chars()[8], REPLACEMENT);
        assert_eq!(decoded.as_chars()[11], '\0');
        assert_eq!(decoded.as_chars()[12], REPLACEMENT);
        assert!(decoded.starts_with("-TR4040-"));
    }

    #[test]
    fn test_decode_malformed_escape_kept_literal() {
        assert_eq!(decode("%").to_string(), "%");
        assert_eq!(decode("%4").to_string(), "%4");
        assert_eq!(decode("%GG").to_string(), "%GG");
        assert_eq!(decode("100%").len(), 4);
    }

    #[test]
    fn test_decode_plus_is_literal() {
        assert_eq!(decode("a+b").to_string(), "a+b");
    }

    #[test]
    fn test_decode_empty() {
        let decoded = decode("");
        assert!(decoded.is_empty());
        assert!(!decoded.starts_with("-"));
        assert!(decoded.starts_with(""));
    }

    #[test]
    fn test_decode_length_matches_byte_count() {
        for raw in ["%ff%fe%fd", "abc%20def", "%", "-XL%00%01", "\u{00e9}"] {
            let bytes: Vec<u8> = percent_decode_str(raw).collect();
            assert_eq!(decode(raw).len(), bytes.len(), "input {:?}", raw);
        }
    }
}
