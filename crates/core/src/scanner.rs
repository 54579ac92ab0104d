//! Permissive scanning over JSON-shaped text.
//!
//! Nothing here builds a document model. Lookups locate the first `"key"` that sits in key
//! position and hand back a byte offset to its value; the value helpers then decode a string
//! literal, cut a balanced `{...}`/`[...]` span, or measure a numeric prefix. Every helper
//! treats malformed input as "not found" instead of failing.

/// JSON insignificant whitespace.
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Returns the first offset at or after `from` that is not whitespace.
pub fn skip_whitespace(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut pos = from;
    while pos < bytes.len() && is_whitespace(bytes[pos]) {
        pos += 1;
    }
    pos
}

/// Byte offset of the value stored under `key`, leading whitespace skipped.
///
/// A quoted occurrence of `key` qualifies only when it is preceded (ignoring whitespace) by
/// `{`, `,` or the start of the text, and followed (ignoring whitespace) by `:`. This keeps a
/// key name that also appears inside another value's string from matching.
///
/// The search is not depth-aware: the first qualifying occurrence wins even when it belongs to
/// a nested object that precedes the intended key.
pub fn find_value(text: &str, key: &str) -> Option<usize> {
    let needle = format!("\"{key}\"");
    let bytes = text.as_bytes();
    let mut from = 0;

    while let Some(offset) = text[from..].find(&needle) {
        let pos = from + offset;
        from = pos + 1;

        if !in_key_position(bytes, pos) {
            continue;
        }

        let colon = skip_whitespace(text, pos + needle.len());
        if bytes.get(colon) == Some(&b':') {
            return Some(skip_whitespace(text, colon + 1));
        }
    }

    None
}

fn in_key_position(bytes: &[u8], quote: usize) -> bool {
    bytes[..quote]
        .iter()
        .rev()
        .find(|b| !is_whitespace(**b))
        .is_none_or(|b| *b == b'{' || *b == b',')
}

/// Decodes the string literal whose opening quote is at `start`.
///
/// Stops at the first unescaped `"` (or the end of the text when the literal is unterminated)
/// and keeps at most `capacity` bytes, cutting on a character boundary. Returns `None` when
/// `start` does not point at a quote.
pub fn decode_string(text: &str, start: usize, capacity: usize) -> Option<String> {
    if text.as_bytes().get(start) != Some(&b'"') {
        return None;
    }

    let mut out = String::new();
    let mut chars = text[start + 1..].chars();

    while let Some(ch) = chars.next() {
        let decoded = match ch {
            '"' => break,
            '\\' => match chars.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('b') => '\u{8}',
                Some('f') => '\u{c}',
                Some('u') => decode_unicode_escape(&mut chars).unwrap_or('u'),
                Some(other) => other,
                None => break,
            },
            other => other,
        };

        if out.len() + decoded.len_utf8() > capacity {
            break;
        }
        out.push(decoded);
    }

    Some(out)
}

// Consumes the four hex digits after `\u` only when all of them are present.
fn decode_unicode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let digits = chars.as_str().get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let code = u32::from_str_radix(digits, 16).ok()?;
    for _ in 0..4 {
        chars.next();
    }
    Some(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Cuts the balanced `{...}` or `[...]` span opening at `start`.
///
/// Depth counting ignores brackets inside string literals and is aware of escaped quotes
/// within them. An unterminated span runs to the end of the text.
pub fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let (open, close) = match bytes.get(start)? {
        b'{' => (b'{', b'}'),
        b'[' => (b'[', b']'),
        _ => return None,
    };

    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut pos = start + 1;

    while pos < bytes.len() && depth > 0 {
        let byte = bytes[pos];
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
        } else if byte == b'"' {
            in_string = true;
        } else if byte == open {
            depth += 1;
        } else if byte == close {
            depth -= 1;
        }
        pos += 1;
    }

    Some(&text[start..pos])
}

/// The longest numeric literal at `start`: sign, digits, fraction and exponent.
pub fn number_prefix(text: &str, start: usize) -> &str {
    let bytes = text.as_bytes();
    let mut pos = start;

    if matches!(bytes.get(pos), Some(b'+' | b'-')) {
        pos += 1;
    }
    let int_start = pos;
    pos = skip_digits(bytes, pos);
    let mut digits = pos - int_start;

    if bytes.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        let frac_end = skip_digits(bytes, frac_start);
        digits += frac_end - frac_start;
        pos = frac_end;
    }

    if digits == 0 {
        return &text[start..start];
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = skip_digits(bytes, exp);
        if exp_end > exp {
            pos = exp_end;
        }
    }

    &text[start..pos]
}

/// The longest integer literal at `start`: optional sign followed by digits.
pub fn integer_prefix(text: &str, start: usize) -> &str {
    let bytes = text.as_bytes();
    let mut pos = start;
    if matches!(bytes.get(pos), Some(b'+' | b'-')) {
        pos += 1;
    }
    let end = skip_digits(bytes, pos);
    if end == pos {
        return &text[start..start];
    }
    &text[start..end]
}

fn skip_digits(bytes: &[u8], from: usize) -> usize {
    let mut pos = from;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}

/// The longest prefix of `text` that fits in `capacity` bytes without splitting a character.
pub fn prefix_within(text: &str, capacity: usize) -> &str {
    if text.len() <= capacity {
        return text;
    }
    let mut end = capacity;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
