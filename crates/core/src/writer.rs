//! Size-bounded response assembly.
//!
//! All output goes through [`BoundedWriter`], which never grows past its capacity. Writes past
//! the limit are dropped, and the writer remembers how many bytes the full output would have
//! needed so callers can detect truncation. Once a write has been cut, later writes are only
//! counted, so the buffer always holds a prefix of the intended output.

use std::fmt;

use crate::scanner::prefix_within;

pub const JSONRPC_VERSION: &str = "2.0";

/// Scratch capacity for an escaped error message.
pub const ERROR_MESSAGE_CAPACITY: usize = 1023;

/// Scratch capacity for escaped tool result text.
pub const TOOL_TEXT_CAPACITY: usize = 32767;

#[derive(Debug, Clone)]
pub struct BoundedWriter {
    buf: String,
    capacity: usize,
    required: usize,
    truncated: bool,
}

impl BoundedWriter {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: String::new(),
            capacity,
            required: 0,
            truncated: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// Bytes the output would occupy with unlimited capacity.
    pub fn required(&self) -> usize {
        self.required
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    /// Appends the longest prefix of `s` that fits. Returns false when anything was dropped.
    pub fn push_str(&mut self, s: &str) -> bool {
        self.required += s.len();
        if self.truncated {
            return false;
        }
        if s.len() <= self.remaining() {
            self.buf.push_str(s);
            return true;
        }
        let prefix = prefix_within(s, self.remaining());
        self.buf.push_str(prefix);
        self.truncated = true;
        false
    }

    /// Appends `s` only if all of it fits; otherwise writes nothing and marks truncation.
    pub fn push_unit(&mut self, s: &str) -> bool {
        self.required += s.len();
        if self.truncated || s.len() > self.remaining() {
            self.truncated = true;
            return false;
        }
        self.buf.push_str(s);
        true
    }
}

impl fmt::Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

/// Writes `input` as JSON string content (no surrounding quotes).
///
/// Escapes are written whole or not at all: when the next escape unit would overflow, writing
/// stops cleanly before it. Returns the bytes the full escaped text needs, which exceeds what
/// was written when the output was truncated.
pub fn escape_string(out: &mut BoundedWriter, input: &str) -> usize {
    let start = out.required();
    let mut utf8 = [0u8; 4];

    for ch in input.chars() {
        match ch {
            '"' => out.push_unit("\\\""),
            '\\' => out.push_unit("\\\\"),
            '\n' => out.push_unit("\\n"),
            '\r' => out.push_unit("\\r"),
            '\t' => out.push_unit("\\t"),
            c if (c as u32) < 0x20 => out.push_unit(&format!("\\u{:04x}", c as u32)),
            c => out.push_unit(c.encode_utf8(&mut utf8)),
        };
    }

    out.required() - start
}

/// Escapes `input` into a fresh string of at most `capacity` bytes.
pub fn escape_to_string(input: &str, capacity: usize) -> String {
    let mut out = BoundedWriter::new(capacity);
    escape_string(&mut out, input);
    out.into_string()
}

/// Writes `{"jsonrpc":"2.0","id":<id>,"result":<result>}`.
///
/// `id` and `result` are inserted verbatim. Returns the bytes this envelope needed, which
/// exceeds what was written when the output was truncated.
pub fn success_envelope(out: &mut BoundedWriter, id: &str, result: &str) -> usize {
    let start = out.required();
    out.push_str("{\"jsonrpc\":\"");
    out.push_str(JSONRPC_VERSION);
    out.push_str("\",\"id\":");
    out.push_str(id);
    out.push_str(",\"result\":");
    out.push_str(result);
    out.push_str("}");
    out.required() - start
}

/// Writes `{"jsonrpc":"2.0","id":<id>,"error":{"code":<code>,"message":"<message>"}}`.
pub fn error_envelope(out: &mut BoundedWriter, id: &str, code: i32, message: &str) -> usize {
    let message = escape_to_string(message, ERROR_MESSAGE_CAPACITY);
    let start = out.required();
    out.push_str("{\"jsonrpc\":\"");
    out.push_str(JSONRPC_VERSION);
    out.push_str("\",\"id\":");
    out.push_str(id);
    out.push_str(",\"error\":{\"code\":");
    out.push_str(&code.to_string());
    out.push_str(",\"message\":\"");
    out.push_str(&message);
    out.push_str("\"}}");
    out.required() - start
}

/// Wraps plain text as a single text content block, flagged when `is_error` is set.
pub fn tool_result(out: &mut BoundedWriter, text: &str, is_error: bool) -> usize {
    let text = escape_to_string(text, TOOL_TEXT_CAPACITY);
    let start = out.required();
    out.push_str("{\"content\":[{\"type\":\"text\",\"text\":\"");
    out.push_str(&text);
    out.push_str("\"}]");
    if is_error {
        out.push_str(",\"isError\":true");
    }
    out.push_str("}");
    out.required() - start
}
