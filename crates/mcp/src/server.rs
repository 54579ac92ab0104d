use globe_mcp_core::reader::{read_object, read_string};
use globe_mcp_core::writer::{error_envelope, success_envelope, tool_result, BoundedWriter};
use globe_mcp_core::LocationIndex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::protocol::{ProtocolError, RequestId, PROTOCOL_VERSION};
use crate::session::{CameraState, Session};
use crate::tools::{self, location_entry, resolution, round_to, ToolContext, ARGUMENTS_CAPACITY};

const SERVER_NAME: &str = "globe-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const VERSION_CAPACITY: usize = 7;
const METHOD_CAPACITY: usize = 63;
const PARAMS_CAPACITY: usize = 8191;
const TOOL_NAME_CAPACITY: usize = 127;
const URI_CAPACITY: usize = 255;

const MIME_JSON: &str = "application/json";

pub const SCENE_RESOURCE: &str = "cesium://scene/state";
pub const ENTITIES_RESOURCE: &str = "cesium://entities";
pub const CAMERA_RESOURCE: &str = "cesium://camera";
pub const LOCATIONS_RESOURCE: &str = "cesium://locations";

/// One protocol endpoint: a location index plus the session its tool calls mutate.
///
/// Calls run one at a time through `&mut self`; hosts that share a server across threads wrap
/// it in a lock.
pub struct McpServer {
    session: Session,
    index: LocationIndex,
    config: ServerConfig,
}

impl McpServer {
    /// A server over the built-in location table with default settings.
    pub fn new() -> Self {
        Self::with_index(LocationIndex::builtin().clone(), ServerConfig::default())
    }

    pub fn with_index(index: LocationIndex, config: ServerConfig) -> Self {
        Self {
            session: Session::new(),
            index,
            config,
        }
    }

    /// Opens the configured database, or the built-in table when none is set.
    pub fn from_config(config: ServerConfig) -> anyhow::Result<Self> {
        let index = config.open_index()?;
        Ok(Self::with_index(index, config))
    }

    pub fn index(&self) -> &LocationIndex {
        &self.index
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handles one raw request. Notifications and other non-requests produce `None`.
    pub fn handle_request(&mut self, message: &str) -> Option<String> {
        let response = self.handle_message(message);
        (!response.is_empty()).then_some(response)
    }

    /// Handles one raw request and returns the response text, empty for non-requests.
    ///
    /// The response never exceeds the configured capacity; longer responses are cut short.
    pub fn handle_message(&mut self, message: &str) -> String {
        let mut out = BoundedWriter::new(self.config.response_capacity);
        let required = self.respond(message, &mut out);
        if out.is_truncated() {
            warn!(
                required,
                capacity = out.capacity(),
                "response truncated to capacity"
            );
        }
        out.into_string()
    }

    fn respond(&mut self, message: &str, out: &mut BoundedWriter) -> usize {
        if let Err(err) = check_version(message) {
            warn!(error = %err, "rejected request");
            return error_envelope(out, "null", err.code(), &err.to_string());
        }

        let id = RequestId::read(message).render();
        let Some(method) = read_string(message, "method", METHOD_CAPACITY) else {
            debug!("message without method ignored");
            return 0;
        };
        let params = read_object(message, "params", PARAMS_CAPACITY);
        let params = params.raw().unwrap_or_default();

        debug!(%method, %id, "request");
        match self.route(&method, params) {
            Ok(Some(result)) => success_envelope(out, &id, &result),
            Ok(None) => 0,
            Err(err) => {
                warn!(%method, error = %err, "request failed");
                error_envelope(out, &id, err.code(), &err.to_string())
            }
        }
    }

    fn route(&mut self, method: &str, params: &str) -> Result<Option<String>, ProtocolError> {
        let result = match method {
            "initialize" => initialize_result(),
            "initialized" => return Ok(None),
            "tools/list" => format!("{{\"tools\":{}}}", tools::definitions_json()),
            "tools/call" => self.call_tool(params)?,
            "resources/list" => resources_list(),
            "resources/read" => self.read_resource(params)?,
            "ping" => "{}".to_string(),
            other => return Err(ProtocolError::MethodNotFound(other.to_string())),
        };
        Ok(Some(result))
    }

    fn call_tool(&mut self, params: &str) -> Result<String, ProtocolError> {
        let name = read_string(params, "name", TOOL_NAME_CAPACITY)
            .filter(|n| !n.is_empty())
            .ok_or(ProtocolError::MissingToolName)?;
        let arguments = read_object(params, "arguments", ARGUMENTS_CAPACITY);
        let arguments = arguments.raw().unwrap_or("{}");

        let mut ctx = ToolContext {
            session: &mut self.session,
            index: &self.index,
            fuzzy_max_distance: self.config.fuzzy_max_distance,
        };
        let text = tools::call_tool(&name, arguments, &mut ctx).into_text();

        let mut result = BoundedWriter::new(self.config.response_capacity);
        tool_result(&mut result, &text, false);
        Ok(result.into_string())
    }

    fn read_resource(&self, params: &str) -> Result<String, ProtocolError> {
        let uri = read_string(params, "uri", URI_CAPACITY)
            .filter(|u| !u.is_empty())
            .ok_or(ProtocolError::MissingUri)?;

        let text = match uri.as_str() {
            SCENE_RESOURCE => json!({"mode": self.session.scene_mode()}).to_string(),
            ENTITIES_RESOURCE => json!(self.session.entities()).to_string(),
            CAMERA_RESOURCE => self.camera_resource().to_string(),
            LOCATIONS_RESOURCE => {
                let names: Vec<&str> = self.index.iter().map(|r| r.name.as_str()).collect();
                json!(names).to_string()
            }
            _ => return Err(ProtocolError::UnknownResource(uri)),
        };
        Ok(json!({
            "contents": [{"uri": uri, "mimeType": MIME_JSON, "text": text}]
        })
        .to_string())
    }

    fn camera_resource(&self) -> Value {
        match self.session.camera() {
            Some(camera) => json!(camera),
            None => json!({"longitude": 0, "latitude": 0, "height": 10_000_000}),
        }
    }

    /// Records the host's camera; "here" tools are unavailable until the first call.
    pub fn set_camera_state(
        &mut self,
        longitude: f64,
        latitude: f64,
        height: f64,
        target_longitude: f64,
        target_latitude: f64,
    ) {
        self.session.set_camera(CameraState {
            longitude,
            latitude,
            height,
            target_longitude,
            target_latitude,
        });
    }

    /// `{"valid":true, ...}` with the camera and its ground target, or `{"valid":false}`.
    pub fn camera_target_json(&self) -> String {
        let Some(camera) = self.session.camera() else {
            return json!({"valid": false}).to_string();
        };
        json!({
            "valid": true,
            "longitude": round_to(camera.longitude, 6),
            "latitude": round_to(camera.latitude, 6),
            "height": round_to(camera.height, 1),
            "targetLongitude": round_to(camera.target_longitude, 6),
            "targetLatitude": round_to(camera.target_latitude, 6),
        })
        .to_string()
    }

    /// Direct lookup outside the protocol envelope.
    pub fn resolve_location_json(&self, name: &str) -> String {
        resolution(&self.index, name, self.config.fuzzy_max_distance).to_string()
    }

    /// Every known location as a JSON array, in storage order.
    pub fn list_locations_json(&self) -> String {
        let entries: Vec<Value> = self.index.iter().map(location_entry).collect();
        Value::Array(entries).to_string()
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

fn check_version(message: &str) -> Result<(), ProtocolError> {
    if !message.contains("\"jsonrpc\"") {
        return Err(ProtocolError::MissingVersion);
    }
    match read_string(message, "jsonrpc", VERSION_CAPACITY) {
        Some(version) if version == globe_mcp_core::writer::JSONRPC_VERSION => Ok(()),
        _ => Err(ProtocolError::InvalidVersion),
    }
}

fn initialize_result() -> String {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        "capabilities": {"tools": {}, "resources": {}}
    })
    .to_string()
}

fn resources_list() -> String {
    let resource = |uri: &str, name: &str| json!({"uri": uri, "name": name, "mimeType": MIME_JSON});
    json!({
        "resources": [
            resource(SCENE_RESOURCE, "Scene State"),
            resource(ENTITIES_RESOURCE, "Entity List"),
            resource(CAMERA_RESOURCE, "Camera State"),
            resource(LOCATIONS_RESOURCE, "Known Locations"),
        ]
    })
    .to_string()
}
