use globe_mcp_core::reader::{read_integer, read_string};
use globe_mcp_core::writer::escape_to_string;
use thiserror::Error;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// Capacity of a string request id.
const ID_CAPACITY: usize = 63;

/// Failures reported to the caller as JSON-RPC error envelopes.
///
/// Domain misses (unknown place, missing camera) are not protocol errors; they come back as
/// successful tool results carrying diagnostic text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Missing jsonrpc field")]
    MissingVersion,

    #[error("Invalid JSON-RPC version")]
    InvalidVersion,

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Missing tool name")]
    MissingToolName,

    #[error("Missing uri")]
    MissingUri,

    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

impl ProtocolError {
    pub fn code(&self) -> i32 {
        match self {
            Self::MissingVersion | Self::InvalidVersion => INVALID_REQUEST,
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::MissingToolName | Self::MissingUri | Self::UnknownResource(_) => INVALID_PARAMS,
        }
    }
}

/// A request id as it is echoed back in the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestId {
    Number(i64),
    Text(String),
    Null,
}

impl RequestId {
    /// Prefers an integer id (a quoted integer counts), then a string id, else null.
    pub fn read(message: &str) -> Self {
        if let Some(n) = read_integer(message, "id") {
            return Self::Number(n);
        }
        match read_string(message, "id", ID_CAPACITY) {
            Some(text) => Self::Text(text),
            None => Self::Null,
        }
    }

    /// JSON text for the `id` member of a response.
    pub fn render(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(text) => format!("\"{}\"", escape_to_string(text, ID_CAPACITY * 6)),
            Self::Null => "null".to_string(),
        }
    }
}
