use std::cell::RefCell;

use globe_mcp::McpServer;
use globe_mcp_core::{database_fingerprint, LocationDatabase, LocationIndex};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

thread_local! {
    static SERVER: RefCell<McpServer> = RefCell::new(McpServer::new());
}

fn with_server<T>(f: impl FnOnce(&mut McpServer) -> T) -> T {
    SERVER.with(|server| f(&mut server.borrow_mut()))
}

/// Resets the module to a fresh session over the built-in location table.
#[wasm_bindgen]
pub fn init() {
    with_server(|server| *server = McpServer::new());
}

/// Swaps in a binary location database and starts a fresh session. Returns the record count.
#[wasm_bindgen]
pub fn load_database(bytes: &[u8]) -> Result<usize, JsError> {
    let db = LocationDatabase::from_bytes(bytes).map_err(|e| JsError::new(&e.to_string()))?;
    let index = LocationIndex::from_database(&db).map_err(|e| JsError::new(&e.to_string()))?;
    let count = index.len();
    with_server(|server| {
        let config = server.config().clone();
        *server = McpServer::with_index(index, config);
    });
    Ok(count)
}

#[wasm_bindgen]
pub fn handle_message(message: &str) -> String {
    with_server(|server| server.handle_message(message))
}

#[wasm_bindgen]
pub fn get_tool_definitions() -> String {
    globe_mcp::tools::definitions_json().to_string()
}

#[wasm_bindgen]
pub fn resolve_location(name: &str) -> String {
    with_server(|server| server.resolve_location_json(name))
}

#[wasm_bindgen]
pub fn list_locations() -> String {
    with_server(|server| server.list_locations_json())
}

#[wasm_bindgen]
pub fn set_camera_state(
    longitude: f64,
    latitude: f64,
    height: f64,
    target_longitude: f64,
    target_latitude: f64,
) {
    with_server(|server| {
        server.set_camera_state(longitude, latitude, height, target_longitude, target_latitude)
    });
}

#[wasm_bindgen]
pub fn get_camera_target() -> String {
    with_server(|server| server.camera_target_json())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchOptions {
    #[serde(default)]
    max_distance: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
}

/// Ranked fuzzy matches as plain JS objects, closest first.
#[wasm_bindgen]
pub fn search_locations(query: &str, options_js: JsValue) -> Result<JsValue, JsError> {
    let options: SearchOptions = from_value(options_js).unwrap_or_default();
    with_server(|server| {
        let max_distance = options
            .max_distance
            .unwrap_or(server.config().fuzzy_max_distance);
        let limit = options.limit.unwrap_or(10);
        let hits = server.index().search_fuzzy_ranked(query, max_distance, limit);
        to_value(&hits).map_err(|e| JsError::new(&e.to_string()))
    })
}

/// BLAKE3 fingerprint of a binary location database.
#[wasm_bindgen]
pub fn fingerprint_database(bytes: &[u8]) -> Result<String, JsError> {
    let db = LocationDatabase::from_bytes(bytes).map_err(|e| JsError::new(&e.to_string()))?;
    Ok(database_fingerprint(&db))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_share_one_session() {
        init();
        assert_eq!(get_camera_target(), r#"{"valid":false}"#);
        set_camera_state(1.0, 2.0, 300.0, 1.5, 2.5);
        assert!(get_camera_target().starts_with(r#"{"valid":true"#));

        let response = handle_message(
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"addPointHere","arguments":{}}}"#,
        );
        assert!(response.contains("entity-1"));

        init();
        assert_eq!(get_camera_target(), r#"{"valid":false}"#);
    }

    #[test]
    fn direct_lookups() {
        init();
        assert!(resolve_location("paris").starts_with(r#"{"found":true"#));
        assert!(resolve_location("nowhere at all").contains("Location not found: nowhere at all"));
        assert!(get_tool_definitions().starts_with('['));
        assert!(list_locations().contains("\"name\":\"paris\""));
    }
}
