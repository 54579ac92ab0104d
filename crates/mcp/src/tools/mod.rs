mod args;
mod camera;
mod entities;
mod here;
mod located;
mod scene;

use std::sync::LazyLock;

use globe_mcp_core::{LocationIndex, LocationRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::session::Session;

pub use args::{Args, ARGUMENTS_CAPACITY};
pub use located::{location_entry, ranked_entry, resolution};

pub const CAMERA_UNAVAILABLE: &str =
    "Camera not yet available. Please wait for the camera to initialize.";

macro_rules! tools {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Every tool the dispatcher knows, one variant per wire name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Tool {
            $($variant),+
        }

        impl Tool {
            pub const ALL: &'static [Tool] = &[$(Tool::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Tool::$variant => $name),+
                }
            }

            pub fn from_name(name: &str) -> Option<Tool> {
                match name {
                    $($name => Some(Tool::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

tools! {
    FlyTo => "flyTo",
    LookAt => "lookAt",
    Zoom => "zoom",
    SetView => "setView",
    GetCamera => "getCamera",
    SetSceneMode => "setSceneMode",
    FlyToEntity => "flyToEntity",
    AddPoint => "addPoint",
    AddLabel => "addLabel",
    AddSphere => "addSphere",
    AddBox => "addBox",
    AddCylinder => "addCylinder",
    AddPolyline => "addPolyline",
    AddPolygon => "addPolygon",
    AddModel => "addModel",
    AddCircle => "addCircle",
    AddRectangle => "addRectangle",
    RemoveEntity => "removeEntity",
    ClearAll => "clearAll",
    RotateEntity => "rotateEntity",
    ResizeEntity => "resizeEntity",
    MoveEntity => "moveEntity",
    ShowEntity => "showEntity",
    HideEntity => "hideEntity",
    SetEntityStyle => "setEntityStyle",
    ResolveLocation => "resolveLocation",
    ListLocations => "listLocations",
    SearchLocations => "searchLocations",
    ListTopCities => "listTopCities",
    FlyToLocation => "flyToLocation",
    AddSphereAtLocation => "addSphereAtLocation",
    AddBoxAtLocation => "addBoxAtLocation",
    AddPointAtLocation => "addPointAtLocation",
    AddLabelAtLocation => "addLabelAtLocation",
    AddModelAtLocation => "addModelAtLocation",
    AddSphereHere => "addSphereHere",
    AddBoxHere => "addBoxHere",
    AddPointHere => "addPointHere",
    AddLabelHere => "addLabelHere",
    AddCylinderHere => "addCylinderHere",
    AddCircleHere => "addCircleHere",
    AddModelHere => "addModelHere",
    AddPolygonHere => "addPolygonHere",
    AddEntityHere => "addEntityHere",
    LoadTileset => "loadTileset",
    SetImagery => "setImagery",
    SetTerrain => "setTerrain",
    ToggleLayerVisibility => "toggleLayerVisibility",
    SetTime => "setTime",
    SetClockRange => "setClockRange",
    PlayAnimation => "playAnimation",
    PauseAnimation => "pauseAnimation",
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(tool: Tool, description: &str, input_schema: Value) -> Self {
        Self {
            name: tool.name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

pub fn list_tools() -> Vec<ToolDefinition> {
    let mut tools = Vec::with_capacity(Tool::ALL.len());
    tools.extend(camera::definitions());
    tools.extend(entities::definitions());
    tools.extend(located::definitions());
    tools.extend(here::definitions());
    tools.extend(scene::definitions());
    tools
}

static DEFINITIONS_JSON: LazyLock<String> = LazyLock::new(|| {
    serde_json::to_string(&list_tools()).unwrap_or_else(|_| "[]".to_string())
});

/// The tool descriptor array as JSON text, serialized once.
pub fn definitions_json() -> &'static str {
    &DEFINITIONS_JSON
}

/// A renderer command: a JSON object tagged with `type`.
///
/// Coordinates keep six decimals, lengths one, factors two.
#[derive(Debug, Clone, PartialEq)]
pub struct Command(Map<String, Value>);

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

impl Command {
    pub fn new(kind: &str) -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(kind));
        Self(map)
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn maybe(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    pub fn degrees(self, key: &str, value: f64) -> Self {
        self.field(key, round_to(value, 6))
    }

    pub fn meters(self, key: &str, value: f64) -> Self {
        self.field(key, round_to(value, 1))
    }

    pub fn factor(self, key: &str, value: f64) -> Self {
        self.field(key, round_to(value, 2))
    }

    pub fn maybe_meters(self, key: &str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.meters(key, value),
            None => self,
        }
    }

    pub fn maybe_factor(self, key: &str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.factor(key, value),
            None => self,
        }
    }

    pub fn position(self, longitude: f64, latitude: f64) -> Self {
        self.degrees("longitude", longitude)
            .degrees("latitude", latitude)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// What a tool produced: structured JSON for the host, or a diagnostic sentence.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Json(Value),
    Text(String),
}

impl ToolOutput {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text,
        }
    }
}

impl From<Command> for ToolOutput {
    fn from(command: Command) -> Self {
        Self::Json(command.into_value())
    }
}

/// State a tool call may read or update.
pub struct ToolContext<'a> {
    pub session: &'a mut Session,
    pub index: &'a LocationIndex,
    pub fuzzy_max_distance: usize,
}

impl<'a> ToolContext<'a> {
    pub fn resolve(&self, name: &str) -> Option<&'a LocationRecord> {
        self.index.resolve(name, self.fuzzy_max_distance)
    }
}

pub(crate) fn missing(parameter: &str) -> ToolOutput {
    ToolOutput::Text(format!("Missing '{parameter}' parameter"))
}

pub(crate) fn not_found(location: &str) -> ToolOutput {
    ToolOutput::Text(format!("Location '{location}' not found"))
}

/// Runs `name` against the raw arguments text. Unknown names echo back as a diagnostic.
pub fn call_tool(name: &str, arguments: &str, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let Some(tool) = Tool::from_name(name) else {
        debug!(tool = name, "unknown tool passed through");
        return ToolOutput::Text(format!("Tool '{name}' executed with args: {arguments}"));
    };
    let args = Args::new(arguments);
    let output = dispatch(tool, &args, ctx);
    debug!(tool = name, diagnostic = output.is_diagnostic(), "tool call");
    output
}

fn dispatch(tool: Tool, args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    match tool {
        Tool::FlyTo => camera::fly_to(args),
        Tool::LookAt => camera::look_at(args),
        Tool::Zoom => camera::zoom(args),
        Tool::SetView => camera::set_view(args),
        Tool::GetCamera => camera::get_camera(),
        Tool::SetSceneMode => camera::set_scene_mode(args, ctx),
        Tool::FlyToEntity => camera::fly_to_entity(args),
        Tool::AddPoint => entities::add_point(args, ctx),
        Tool::AddLabel => entities::add_label(args, ctx),
        Tool::AddSphere => entities::add_sphere(args, ctx),
        Tool::AddBox => entities::add_box(args, ctx),
        Tool::AddCylinder => entities::add_cylinder(args, ctx),
        Tool::AddPolyline => entities::add_polyline(args, ctx),
        Tool::AddPolygon => entities::add_polygon(args, ctx),
        Tool::AddModel => entities::add_model(args, ctx),
        Tool::AddCircle => entities::add_circle(args, ctx),
        Tool::AddRectangle => entities::add_rectangle(args, ctx),
        Tool::RemoveEntity => entities::remove_entity(args, ctx),
        Tool::ClearAll => entities::clear_all(ctx),
        Tool::RotateEntity => entities::rotate_entity(args),
        Tool::ResizeEntity => entities::resize_entity(args),
        Tool::MoveEntity => entities::move_entity(args),
        Tool::ShowEntity => entities::set_visibility(args, true),
        Tool::HideEntity => entities::set_visibility(args, false),
        Tool::SetEntityStyle => entities::set_entity_style(args),
        Tool::ResolveLocation => located::resolve_location(args, ctx),
        Tool::ListLocations => located::list_locations(args, ctx),
        Tool::SearchLocations => located::search_locations(args, ctx),
        Tool::ListTopCities => located::list_top_cities(args, ctx),
        Tool::FlyToLocation => located::fly_to_location(args, ctx),
        Tool::AddSphereAtLocation => located::add_sphere(args, ctx),
        Tool::AddBoxAtLocation => located::add_box(args, ctx),
        Tool::AddPointAtLocation => located::add_point(args, ctx),
        Tool::AddLabelAtLocation => located::add_label(args, ctx),
        Tool::AddModelAtLocation => located::add_model(args, ctx),
        Tool::AddSphereHere => here::add_sphere(args, ctx),
        Tool::AddBoxHere => here::add_box(args, ctx),
        Tool::AddPointHere => here::add_point(args, ctx),
        Tool::AddLabelHere => here::add_label(args, ctx),
        Tool::AddCylinderHere => here::add_cylinder(args, ctx),
        Tool::AddCircleHere => here::add_circle(args, ctx),
        Tool::AddModelHere => here::add_model(args, ctx),
        Tool::AddPolygonHere => here::add_polygon(args, ctx),
        Tool::AddEntityHere => here::add_entity(args, ctx),
        Tool::LoadTileset => scene::load_tileset(args, ctx),
        Tool::SetImagery => scene::set_imagery(args),
        Tool::SetTerrain => scene::set_terrain(args),
        Tool::ToggleLayerVisibility => scene::toggle_layer_visibility(args),
        Tool::SetTime => scene::set_time(args),
        Tool::SetClockRange => scene::set_clock_range(args),
        Tool::PlayAnimation => scene::animation(true),
        Tool::PauseAnimation => scene::animation(false),
    }
}

/// Sphere radius: 100 when absent, 50 when outside `[1, 1000]`.
pub(crate) fn sphere_radius(radius: Option<f64>) -> f64 {
    match radius {
        None => 100.0,
        Some(r) if (1.0..=1000.0).contains(&r) => r,
        Some(_) => 50.0,
    }
}

/// Height above ground for spheres: 0 when outside `[0, 1000]`.
pub(crate) fn sphere_height(height: Option<f64>) -> f64 {
    match height {
        Some(h) if (0.0..=1000.0).contains(&h) => h,
        _ => 0.0,
    }
}
