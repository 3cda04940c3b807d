//! MIME encoding utilities.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 header encoding.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum line length for Quoted-Printable encoding, soft break included.
const MAX_LINE_LENGTH: usize = 76;

/// Raw bytes per RFC 2047 encoded-word, keeping each word within 75 characters.
const MAX_WORD_BYTES: usize = 45;

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks (`\n` or `\r\n`) become CRLF hard breaks; long lines get soft
/// breaks; whitespace at the end of a line is encoded so transports cannot
/// strip it.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 8);

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            result.push_str("\r\n");
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        encode_qp_line(line.as_bytes(), &mut result);
    }

    result
}

fn encode_qp_line(bytes: &[u8], result: &mut String) {
    let mut line_length = 0;

    for (index, &byte) in bytes.iter().enumerate() {
        let at_end = index + 1 == bytes.len();
        let literal = match byte {
            b'!'..=b'<' | b'>'..=b'~' => true,
            b' ' | b'\t' => !at_end,
            _ => false,
        };
        let width = if literal { 1 } else { 3 };

        // Leave room for the '=' of a soft break
        if line_length + width > MAX_LINE_LENGTH - 1 {
            result.push_str("=\r\n");
            line_length = 0;
        }

        if literal {
            result.push(char::from(byte));
        } else {
            let _ = write!(result, "={byte:02X}");
        }
        line_length += width;
    }
}

/// Decodes Quoted-Printable text (RFC 2045).
///
/// Soft breaks are removed and CRLF hard breaks become `\n`.
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences or the
/// decoded bytes are not UTF-8.
pub fn decode_quoted_printable(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        if rest.starts_with(b"=\r\n") {
            i += 3;
        } else if rest.starts_with(b"=\n") {
            i += 2;
        } else if rest[0] == b'=' {
            let hex = rest
                .get(1..3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .ok_or_else(|| Error::InvalidEncoding("Incomplete escape sequence".to_string()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|e| Error::InvalidEncoding(format!("Invalid hex {hex:?}: {e}")))?;
            result.push(byte);
            i += 3;
        } else if rest.starts_with(b"\r\n") {
            result.push(b'\n');
            i += 2;
        } else {
            result.push(rest[0]);
            i += 1;
        }
    }

    String::from_utf8(result).map_err(Into::into)
}

/// Encodes a header value using RFC 2047 `B` encoding when needed.
///
/// Plain ASCII is returned unchanged. Longer values are split into several
/// encoded-words on character boundaries, joined by folding whitespace.
#[must_use]
pub fn encode_rfc2047(text: &str, charset: &str) -> String {
    let needs_encoding =
        text.contains("=?") || text.chars().any(|c| !c.is_ascii() || c.is_ascii_control());
    if !needs_encoding {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in text.chars() {
        if chunk.len() + ch.len_utf8() > MAX_WORD_BYTES {
            words.push(format!("=?{charset}?B?{}?=", encode_base64(chunk.as_bytes())));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(format!("=?{charset}?B?{}?=", encode_base64(chunk.as_bytes())));
    }

    words.join("\r\n ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_encode() {
        assert_eq!(encode_base64(b"Hello, World!"), "SGVsbG8sIFdvcmxkIQ==");
    }

    #[test]
    fn test_quoted_printable_ascii_unchanged() {
        assert_eq!(encode_quoted_printable("Muffin\t5"), "Muffin\t5");
    }

    #[test]
    fn test_quoted_printable_non_ascii_and_equals() {
        let encoded = encode_quoted_printable("Crème=1");
        assert_eq!(encoded, "Cr=C3=A8me=3D1");
    }

    #[test]
    fn test_quoted_printable_hard_breaks_and_trailing_space() {
        let encoded = encode_quoted_printable("a \nb\r\nc");
        assert_eq!(encoded, "a=20\r\nb\r\nc");
    }

    #[test]
    fn test_quoted_printable_soft_breaks() {
        let line = "x".repeat(200);
        let encoded = encode_quoted_printable(&line);
        assert!(encoded.lines().all(|l| l.len() <= MAX_LINE_LENGTH));
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), line);
    }

    #[test]
    fn test_quoted_printable_escape_not_split() {
        let text = format!("{}é", "x".repeat(73));
        let encoded = encode_quoted_printable(&text);
        assert!(encoded.lines().all(|l| l.len() <= MAX_LINE_LENGTH));
        assert!(encoded.contains("=C3=A9") || encoded.contains("=C3=\r\n=A9"));
        assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
    }

    #[test]
    fn test_quoted_printable_decode_errors() {
        assert!(decode_quoted_printable("bad=").is_err());
        assert!(decode_quoted_printable("bad=ZZ").is_err());
    }

    #[test]
    fn test_rfc2047_plain_ascii() {
        assert_eq!(encode_rfc2047("Daily Inventory", "utf-8"), "Daily Inventory");
    }

    #[test]
    fn test_rfc2047_encodes_non_ascii() {
        let encoded = encode_rfc2047("Why Not Pie – Daily", "utf-8");
        assert!(encoded.starts_with("=?utf-8?B?"));
        assert!(encoded.ends_with("?="));
    }

    #[test]
    fn test_rfc2047_splits_long_values() {
        let encoded = encode_rfc2047(&"é".repeat(60), "utf-8");
        let words: Vec<&str> = encoded.split("\r\n ").collect();
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(|w| w.len() <= 75));
    }

    proptest! {
        #[test]
        fn quoted_printable_round_trips(text in "[a-zA-Z0-9 =\t\n.é€]{0,300}") {
            let encoded = encode_quoted_printable(&text);
            prop_assert!(encoded.lines().all(|l| l.len() <= MAX_LINE_LENGTH));
            prop_assert_eq!(decode_quoted_printable(&encoded).unwrap(), text);
        }
    }
}
