use serde_json::json;

use super::args::{Args, MODE_CAPACITY};
use super::{missing, Command, Tool, ToolContext, ToolDefinition, ToolOutput};

const SCENE_MODES: [&str; 3] = ["3D", "2D", "columbus"];

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            Tool::FlyTo,
            "Fly the camera to a specific geographic location",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number", "minimum": -180, "maximum": 180},
                    "latitude": {"type": "number", "minimum": -90, "maximum": 90},
                    "height": {"type": "number"},
                    "duration": {"type": "number"}
                },
                "required": ["longitude", "latitude"]
            }),
        ),
        ToolDefinition::new(
            Tool::LookAt,
            "Orient the camera to look at a specific location",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "range": {"type": "number"}
                },
                "required": ["longitude", "latitude"]
            }),
        ),
        ToolDefinition::new(
            Tool::Zoom,
            "Zoom the camera in or out",
            json!({
                "type": "object",
                "properties": {"amount": {"type": "number"}},
                "required": ["amount"]
            }),
        ),
        ToolDefinition::new(
            Tool::SetView,
            "Set camera view instantly (no animation)",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "height": {"type": "number"},
                    "heading": {"type": "number"},
                    "pitch": {"type": "number"},
                    "roll": {"type": "number"}
                },
                "required": ["longitude", "latitude"]
            }),
        ),
        ToolDefinition::new(
            Tool::GetCamera,
            "Get current camera position and orientation",
            json!({"type": "object", "properties": {}}),
        ),
        ToolDefinition::new(
            Tool::SetSceneMode,
            "Set scene mode: '3D', '2D', or 'columbus' (2.5D)",
            json!({
                "type": "object",
                "properties": {
                    "mode": {"type": "string", "enum": SCENE_MODES}
                },
                "required": ["mode"]
            }),
        ),
        ToolDefinition::new(
            Tool::FlyToEntity,
            "Fly the camera to focus on an entity by ID",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "duration": {"type": "number"},
                    "offset": {"type": "object"}
                },
                "required": ["id"]
            }),
        ),
    ]
}

pub fn fly_to(args: &Args<'_>) -> ToolOutput {
    Command::new("flyTo")
        .position(args.number_or("longitude", 0.0), args.number_or("latitude", 0.0))
        .meters("height", args.number_or("height", 10_000.0))
        .meters("duration", args.number_or("duration", 2.0))
        .into()
}

pub fn look_at(args: &Args<'_>) -> ToolOutput {
    Command::new("lookAt")
        .position(args.number_or("longitude", 0.0), args.number_or("latitude", 0.0))
        .meters("range", args.number_or("range", 10_000.0))
        .into()
}

pub fn zoom(args: &Args<'_>) -> ToolOutput {
    Command::new("zoom")
        .factor("amount", args.number_or("amount", 1.0))
        .into()
}

pub fn set_view(args: &Args<'_>) -> ToolOutput {
    Command::new("setView")
        .position(args.number_or("longitude", 0.0), args.number_or("latitude", 0.0))
        .meters("height", args.number_or("height", 10_000.0))
        .meters("heading", args.number_or("heading", 0.0))
        .meters("pitch", args.number_or("pitch", -90.0))
        .meters("roll", args.number_or("roll", 0.0))
        .into()
}

/// The host fills in the actual camera values.
pub fn get_camera() -> ToolOutput {
    Command::new("getCamera").into()
}

pub fn set_scene_mode(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let mode = args.text_or("mode", MODE_CAPACITY, "3D");
    if !SCENE_MODES.contains(&mode.as_str()) {
        return ToolOutput::Text(format!(
            "Unknown scene mode: {mode}. Use: {}",
            SCENE_MODES.join(", ")
        ));
    }
    ctx.session.set_scene_mode(mode.as_str());
    Command::new("setSceneMode").field("mode", mode).into()
}

pub fn fly_to_entity(args: &Args<'_>) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    Command::new("flyToEntity")
        .field("id", id)
        .meters("duration", args.number_or("duration", 2.0))
        .maybe("offset", args.parsed("offset"))
        .into()
}

#[cfg(test)]
mod tests {
    use super::super::tests::{command, run};
    use super::*;
    use crate::session::Session;
    use globe_mcp_core::LocationIndex;
    use serde_json::json;

    #[test]
    fn fly_to_defaults() {
        let mut session = Session::new();
        let out = run(Tool::FlyTo, "{}", &mut session, LocationIndex::builtin());
        assert_eq!(
            command(out),
            json!({"type": "flyTo", "longitude": 0.0, "latitude": 0.0, "height": 10000.0, "duration": 2.0})
        );
    }

    #[test]
    fn set_view_keeps_explicit_orientation() {
        let mut session = Session::new();
        let out = run(
            Tool::SetView,
            r#"{"longitude":-74.0445,"latitude":40.6892,"pitch":-30,"heading":45}"#,
            &mut session,
            LocationIndex::builtin(),
        );
        let cmd = command(out);
        assert_eq!(cmd["pitch"], -30.0);
        assert_eq!(cmd["heading"], 45.0);
        assert_eq!(cmd["height"], 10000.0);
    }

    #[test]
    fn zoom_rounds_to_hundredths() {
        let mut session = Session::new();
        let out = run(Tool::Zoom, r#"{"amount":1.23456}"#, &mut session, LocationIndex::builtin());
        assert_eq!(command(out)["amount"], 1.23);
    }

    #[test]
    fn scene_mode_is_recorded() {
        let mut session = Session::new();
        let out = run(Tool::SetSceneMode, r#"{"mode":"2D"}"#, &mut session, LocationIndex::builtin());
        assert_eq!(command(out), json!({"type": "setSceneMode", "mode": "2D"}));
        assert_eq!(session.scene_mode(), "2D");

        let out = run(Tool::SetSceneMode, r#"{"mode":"4D"}"#, &mut session, LocationIndex::builtin());
        assert_eq!(
            out,
            ToolOutput::text("Unknown scene mode: 4D. Use: 3D, 2D, columbus")
        );
        assert_eq!(session.scene_mode(), "2D");
    }

    #[test]
    fn fly_to_entity_needs_an_id() {
        let mut session = Session::new();
        let index = LocationIndex::builtin();
        assert_eq!(
            run(Tool::FlyToEntity, "{}", &mut session, index),
            ToolOutput::text("Missing 'id' parameter")
        );
        let out = run(
            Tool::FlyToEntity,
            r#"{"id":"entity-3","offset":{"heading":0,"range":500}}"#,
            &mut session,
            index,
        );
        assert_eq!(
            command(out),
            json!({"type": "flyToEntity", "id": "entity-3", "duration": 2.0, "offset": {"heading": 0, "range": 500}})
        );
    }
}
