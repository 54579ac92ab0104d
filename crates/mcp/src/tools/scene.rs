use serde_json::json;

use super::args::{Args, SHORT_CAPACITY};
use super::{missing, round_to, Command, Tool, ToolContext, ToolDefinition, ToolOutput};

const TIME_CAPACITY: usize = 63;

pub fn load_tileset(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let source = match (args.ion_asset_id(), args.url()) {
        (Some(asset), _) => ("ionAssetId", json!(asset)),
        (None, Some(url)) => ("url", json!(url)),
        (None, None) => return ToolOutput::text("Missing 'ionAssetId' or 'url' parameter"),
    };
    Command::new("loadTileset")
        .field("id", ctx.session.next_tileset_id())
        .field(source.0, source.1)
        .field("name", args.name_or("tileset"))
        .field("show", args.flag_or("show", true))
        .into()
}

pub fn set_imagery(args: &Args<'_>) -> ToolOutput {
    let Some(provider) = args.text("provider", SHORT_CAPACITY) else {
        return missing("provider");
    };
    let cmd = Command::new("setImagery").field("provider", provider);
    match (args.url(), args.ion_asset_id()) {
        (Some(url), _) => cmd.field("url", url),
        (None, Some(asset)) => cmd.field("ionAssetId", asset),
        (None, None) => cmd,
    }
    .into()
}

pub fn set_terrain(args: &Args<'_>) -> ToolOutput {
    let Some(provider) = args.text("provider", SHORT_CAPACITY) else {
        return missing("provider");
    };
    Command::new("setTerrain")
        .field("provider", provider)
        .maybe("ionAssetId", args.ion_asset_id())
        .factor("exaggeration", args.number_or("exaggeration", 1.0))
        .into()
}

pub fn toggle_layer_visibility(args: &Args<'_>) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    Command::new("toggleLayerVisibility")
        .field("id", id)
        .field("visible", args.flag_or("visible", true))
        .into()
}

/// An ISO 8601 instant wins over a Julian date.
pub fn set_time(args: &Args<'_>) -> ToolOutput {
    let cmd = Command::new("setTime");
    if let Some(iso) = args.text("iso8601", TIME_CAPACITY) {
        return cmd.field("iso8601", iso).into();
    }
    match args.number("julianDate").filter(|jd| *jd > 0.0) {
        Some(julian) => cmd.field("julianDate", round_to(julian, 6)).into(),
        None => ToolOutput::text("Missing 'iso8601' or 'julianDate' parameter"),
    }
}

pub fn set_clock_range(args: &Args<'_>) -> ToolOutput {
    Command::new("setClockRange")
        .maybe("startTime", args.text("startTime", TIME_CAPACITY))
        .maybe("endTime", args.text("endTime", TIME_CAPACITY))
        .factor("multiplier", args.number_or("multiplier", 1.0))
        .field("shouldAnimate", args.flag_or("shouldAnimate", true))
        .into()
}

pub fn animation(play: bool) -> ToolOutput {
    Command::new(if play { "playAnimation" } else { "pauseAnimation" }).into()
}

pub fn definitions() -> Vec<ToolDefinition> {
    let empty = json!({"type": "object", "properties": {}});
    vec![
        ToolDefinition::new(
            Tool::LoadTileset,
            "Load a 3D Tileset from Cesium Ion or URL",
            json!({
                "type": "object",
                "properties": {
                    "ionAssetId": {"type": "number"},
                    "url": {"type": "string"},
                    "name": {"type": "string"},
                    "show": {"type": "boolean"}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            Tool::SetImagery,
            "Set the imagery layer. Use 'bing', 'osm', 'arcgis', 'sentinel', or a custom URL.",
            json!({
                "type": "object",
                "properties": {
                    "provider": {"type": "string"},
                    "url": {"type": "string"},
                    "ionAssetId": {"type": "number"}
                },
                "required": ["provider"]
            }),
        ),
        ToolDefinition::new(
            Tool::SetTerrain,
            "Set terrain provider. Use 'cesium' for Cesium World Terrain, 'ellipsoid' for flat, or custom URL.",
            json!({
                "type": "object",
                "properties": {
                    "provider": {"type": "string"},
                    "ionAssetId": {"type": "number"},
                    "exaggeration": {"type": "number"}
                },
                "required": ["provider"]
            }),
        ),
        ToolDefinition::new(
            Tool::ToggleLayerVisibility,
            "Toggle visibility of a layer or tileset by ID",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "visible": {"type": "boolean"}
                },
                "required": ["id", "visible"]
            }),
        ),
        ToolDefinition::new(
            Tool::SetTime,
            "Set the scene's current time for 4D visualization",
            json!({
                "type": "object",
                "properties": {
                    "iso8601": {"type": "string"},
                    "julianDate": {"type": "number"}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(
            Tool::SetClockRange,
            "Set the clock range and speed for time animation",
            json!({
                "type": "object",
                "properties": {
                    "startTime": {"type": "string"},
                    "endTime": {"type": "string"},
                    "multiplier": {"type": "number"},
                    "shouldAnimate": {"type": "boolean"}
                },
                "required": []
            }),
        ),
        ToolDefinition::new(Tool::PlayAnimation, "Start the clock animation", empty.clone()),
        ToolDefinition::new(Tool::PauseAnimation, "Pause the clock animation", empty),
    ]
}
