//! String scanning and escaping helpers.

use std::fmt::Write as _;
use std::str::Chars;

use super::error::StreamError;

/// Find the position of the closing `"` of a JSON string starting at `x`.
///
/// `x` must point to the first character after the opening `"`. The returned
/// index is the position of the closing `"`.
///
/// Handles backslash escaping: `\"` inside the string does not terminate it.
pub(crate) fn find_ending_quote(data: &[u8], mut x: usize) -> Result<usize, StreamError> {
    let start = x;
    let len = data.len();
    let mut prev: u8 = 0;
    while x < len {
        let ch = data[x];
        if ch == b'"' && prev != b'\\' {
            return Ok(x);
        }
        // double-backslash cancels the escape
        if ch == b'\\' && prev == b'\\' {
            prev = 0;
        } else {
            prev = ch;
        }
        x += 1;
    }
    Err(StreamError::UnterminatedString(start.saturating_sub(1)))
}

/// Decode the body of a JSON string literal. `offset` is the byte position of
/// `raw` in the input, used for error reporting.
pub(crate) fn unescape(raw: &str, offset: usize) -> Result<String, StreamError> {
    if !raw.bytes().any(|b| b == b'\\' || b < 0x20) {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    let mut pos = offset;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let escape_at = pos;
                let esc = chars.next().ok_or(StreamError::InvalidEscape(escape_at))?;
                pos += 1;
                match esc {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    '/' => out.push('/'),
                    'b' => out.push('\u{8}'),
                    'f' => out.push('\u{c}'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'u' => {
                        let high = read_hex4(&mut chars, escape_at)?;
                        pos += 4;
                        let code = if (0xD800..0xDC00).contains(&high) {
                            if chars.next() != Some('\\') || chars.next() != Some('u') {
                                return Err(StreamError::InvalidEscape(escape_at));
                            }
                            let low = read_hex4(&mut chars, escape_at)?;
                            pos += 6;
                            if !(0xDC00..0xE000).contains(&low) {
                                return Err(StreamError::InvalidEscape(escape_at));
                            }
                            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                        } else {
                            high
                        };
                        let decoded =
                            char::from_u32(code).ok_or(StreamError::InvalidEscape(escape_at))?;
                        out.push(decoded);
                    }
                    _ => return Err(StreamError::InvalidEscape(escape_at)),
                }
            }
            c if (c as u32) < 0x20 => {
                return Err(StreamError::Syntax {
                    message: "unescaped control character in string",
                    offset: pos,
                });
            }
            c => out.push(c),
        }
        pos += ch.len_utf8();
    }
    Ok(out)
}

fn read_hex4(chars: &mut Chars<'_>, offset: usize) -> Result<u32, StreamError> {
    let mut code = 0u32;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or(StreamError::InvalidEscape(offset))?;
        code = (code << 4) | digit;
    }
    Ok(code)
}

/// Append `value` to `out` as a quoted JSON string literal.
pub(crate) fn write_quoted(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ending_quote_skips_escaped_quotes() {
        let data = br#"ab\"c" tail"#;
        assert_eq!(find_ending_quote(data, 0).unwrap(), 5);
        let data = br#"ab\\" tail"#;
        assert_eq!(find_ending_quote(data, 0).unwrap(), 4);
    }

    #[test]
    fn ending_quote_reports_unterminated() {
        assert!(matches!(
            find_ending_quote(b"abc", 1),
            Err(StreamError::UnterminatedString(0))
        ));
    }

    #[test]
    fn unescape_handles_all_short_escapes() {
        let raw = r#"\"\\\/\b\f\n\r\t"#;
        assert_eq!(unescape(raw, 0).unwrap(), "\"\\/\u{8}\u{c}\n\r\t");
    }

    #[test]
    fn unescape_decodes_surrogate_pairs() {
        assert_eq!(unescape(r"\ud83d\ude00", 0).unwrap(), "\u{1F600}");
        assert_eq!(unescape(r"\u00e9", 0).unwrap(), "\u{e9}");
        assert!(unescape(r"\ud83d", 0).is_err());
        assert!(unescape(r"\ude00", 0).is_err());
    }

    #[test]
    fn unescape_rejects_raw_control_characters() {
        assert!(unescape("a\nb", 0).is_err());
        assert!(unescape(r"\x", 0).is_err());
    }

    #[test]
    fn quoting_escapes_control_and_separator_characters() {
        let mut out = String::new();
        write_quoted(&mut out, "a\"b\\c\n\u{1}\u{2028}");
        assert_eq!(out, r#""a\"b\\c\n\u0001\u2028""#);
    }
}
