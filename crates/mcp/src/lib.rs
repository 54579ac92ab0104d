//! MCP command server for a 3D globe renderer.
//!
//! Requests arrive as raw JSON-RPC text, tool calls become renderer commands, and every response
//! fits a fixed byte budget.

pub mod config;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;

pub use config::ServerConfig;
pub use protocol::{ProtocolError, RequestId};
pub use server::McpServer;
pub use session::{CameraState, Session};
pub use tools::{call_tool, list_tools, Tool, ToolContext, ToolOutput};
