use globe_mcp_core::LocationRecord;
use serde_json::{json, Value};

use super::args::{box_dimensions, Args, COLOR_CAPACITY, TEXT_CAPACITY};
use super::{
    missing, not_found, sphere_height, sphere_radius, Command, Tool, ToolContext, ToolDefinition,
    ToolOutput,
};
use crate::session::CameraState;

/// A ground position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Spot {
    pub longitude: f64,
    pub latitude: f64,
}

impl From<&LocationRecord> for Spot {
    fn from(record: &LocationRecord) -> Self {
        Self {
            longitude: f64::from(record.longitude),
            latitude: f64::from(record.latitude),
        }
    }
}

impl From<&CameraState> for Spot {
    fn from(camera: &CameraState) -> Self {
        Self {
            longitude: camera.target_longitude,
            latitude: camera.target_latitude,
        }
    }
}

impl Command {
    pub(crate) fn entity(kind: &str, ctx: &mut ToolContext<'_>) -> Self {
        Command::new(kind).field("id", ctx.session.next_entity_id())
    }

    pub(crate) fn at(self, spot: Spot) -> Self {
        self.position(spot.longitude, spot.latitude)
    }
}

pub(crate) fn sphere(
    args: &Args<'_>,
    ctx: &mut ToolContext<'_>,
    spot: Spot,
    default_name: &str,
    default_radius: Option<f64>,
) -> ToolOutput {
    let radius = sphere_radius(args.number("radius").or(default_radius));
    let height = sphere_height(args.number("height"));
    Command::entity("addSphere", ctx)
        .at(spot)
        .meters("height", height)
        .meters("radius", radius)
        .field("color", args.color_or("red"))
        .field("name", args.name_or(default_name))
        .into()
}

pub(crate) fn point(
    args: &Args<'_>,
    ctx: &mut ToolContext<'_>,
    spot: Spot,
    default_name: &str,
) -> ToolOutput {
    Command::entity("addPoint", ctx)
        .at(spot)
        .field("color", args.color_or("white"))
        .field("name", args.name_or(default_name))
        .into()
}

pub(crate) fn label(ctx: &mut ToolContext<'_>, spot: Spot, text: String) -> ToolOutput {
    Command::entity("addLabel", ctx)
        .at(spot)
        .field("text", text)
        .into()
}

/// Ion assets win over URLs; with neither the URL is left empty for the host to reject.
pub(crate) fn model(
    args: &Args<'_>,
    ctx: &mut ToolContext<'_>,
    spot: Spot,
    height: f64,
    default_heading: f64,
    default_name: &str,
) -> ToolOutput {
    let mut cmd = Command::entity("addModel", ctx)
        .at(spot)
        .meters("height", height);
    cmd = match args.ion_asset_id() {
        Some(asset) => cmd.field("ionAssetId", asset),
        None => cmd.field("url", args.url().unwrap_or_default()),
    };
    cmd.factor("scale", args.number_or("scale", 1.0))
        .meters("heading", args.number_or("heading", default_heading))
        .field("name", args.name_or(default_name))
        .into()
}

pub(crate) fn circle(
    args: &Args<'_>,
    ctx: &mut ToolContext<'_>,
    spot: Spot,
    radius: f64,
) -> ToolOutput {
    Command::entity("addCircle", ctx)
        .at(spot)
        .meters("radius", radius)
        .meters("height", args.number_or("height", 0.0))
        .field("color", args.color_or("blue"))
        .maybe_meters("extrudedHeight", extruded_height(args))
        .field("name", args.name_or("circle"))
        .into()
}

pub(crate) fn extruded_height(args: &Args<'_>) -> Option<f64> {
    args.number("extrudedHeight").filter(|h| *h >= 0.0)
}

/// Where a coordinate tool places its entity: a named `location` when given, else the raw
/// coordinates. The location name doubles as the default entity name.
fn placement(
    args: &Args<'_>,
    ctx: &ToolContext<'_>,
    default_name: &str,
) -> Result<(Spot, String), ToolOutput> {
    match args.location() {
        Some(location) => match ctx.resolve(&location) {
            Some(record) => Ok((Spot::from(record), location)),
            None => Err(not_found(&location)),
        },
        None => Ok((coordinates(args), default_name.to_string())),
    }
}

fn coordinates(args: &Args<'_>) -> Spot {
    Spot {
        longitude: args.number_or("longitude", 0.0),
        latitude: args.number_or("latitude", 0.0),
    }
}

fn positions(args: &Args<'_>) -> Option<Value> {
    args.parsed("positions").filter(Value::is_array)
}

pub fn add_point(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    match placement(args, ctx, "point") {
        Ok((spot, name)) => point(args, ctx, spot, &name),
        Err(diagnostic) => diagnostic,
    }
}

pub fn add_label(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let Some(text) = args.text("text", TEXT_CAPACITY) else {
        return missing("text");
    };
    label(ctx, coordinates(args), text)
}

pub fn add_sphere(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    match placement(args, ctx, "sphere") {
        Ok((spot, name)) => sphere(args, ctx, spot, &name, None),
        Err(diagnostic) => diagnostic,
    }
}

pub fn add_box(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let [x, y, z] = box_dimensions(args, [100.0, 100.0, 50.0]);
    Command::entity("addBox", ctx)
        .at(coordinates(args))
        .meters("height", args.number_or("height", 0.0))
        .meters("dimensionX", x)
        .meters("dimensionY", y)
        .meters("dimensionZ", z)
        .field("color", args.color_or("blue"))
        .field("name", args.name_or("box"))
        .into()
}

pub fn add_cylinder(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    Command::entity("addCylinder", ctx)
        .at(coordinates(args))
        .meters("height", args.number_or("height", 0.0))
        .meters("topRadius", args.number_or("topRadius", 100.0))
        .meters("bottomRadius", args.number_or("bottomRadius", 100.0))
        .meters("cylinderHeight", args.number_or("cylinderHeight", 100.0))
        .field("color", args.color_or("green"))
        .field("name", args.name_or("cylinder"))
        .into()
}

pub fn add_polyline(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let Some(positions) = positions(args) else {
        return missing("positions");
    };
    Command::entity("addPolyline", ctx)
        .field("positions", positions)
        .field("color", args.color_or("white"))
        .meters("width", args.number_or("width", 2.0))
        .field("clampToGround", args.flag_or("clampToGround", false))
        .field("name", args.name_or("polyline"))
        .into()
}

pub fn add_polygon(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let Some(positions) = positions(args) else {
        return missing("positions");
    };
    Command::entity("addPolygon", ctx)
        .field("positions", positions)
        .field("color", args.color_or("blue"))
        .field(
            "outlineColor",
            args.text_or("outlineColor", COLOR_CAPACITY, "white"),
        )
        .meters("height", args.number_or("height", 0.0))
        .maybe_meters("extrudedHeight", extruded_height(args))
        .field("name", args.name_or("polygon"))
        .into()
}

pub fn add_model(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let height = args.number_or("height", 0.0);
    model(args, ctx, coordinates(args), height, 0.0, "model")
}

pub fn add_circle(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let radius = args.number_or("radius", 1000.0);
    circle(args, ctx, coordinates(args), radius)
}

pub fn add_rectangle(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    Command::entity("addRectangle", ctx)
        .degrees("west", args.number_or("west", 0.0))
        .degrees("south", args.number_or("south", 0.0))
        .degrees("east", args.number_or("east", 0.0))
        .degrees("north", args.number_or("north", 0.0))
        .meters("height", args.number_or("height", 0.0))
        .field("color", args.color_or("blue"))
        .maybe_meters("extrudedHeight", extruded_height(args))
        .field("name", args.name_or("rectangle"))
        .into()
}

pub fn remove_entity(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    ctx.session.forget_entity(&id);
    Command::new("removeEntity").field("id", id).into()
}

pub fn clear_all(ctx: &mut ToolContext<'_>) -> ToolOutput {
    ctx.session.clear_entities();
    Command::new("clearAll").into()
}

pub fn rotate_entity(args: &Args<'_>) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    Command::new("rotateEntity")
        .field("id", id)
        .meters("heading", args.number_or("heading", 0.0))
        .into()
}

/// A positive `scale` wins; otherwise only the positive dimensions that were given.
pub fn resize_entity(args: &Args<'_>) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    let cmd = Command::new("resizeEntity").field("id", id);
    if let Some(scale) = args.number("scale").filter(|s| *s > 0.0) {
        return cmd.factor("scale", scale).into();
    }

    let dims = ["dimensionX", "dimensionY", "dimensionZ"]
        .map(|key| (key, args.number(key).filter(|d| *d > 0.0)));
    if dims.iter().all(|(_, dim)| dim.is_none()) {
        return ToolOutput::text("Missing 'scale' or dimension parameters");
    }
    dims.into_iter()
        .fold(cmd, |cmd, (key, dim)| cmd.maybe_meters(key, dim))
        .into()
}

pub fn move_entity(args: &Args<'_>) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    let cmd = Command::new("moveEntity").field("id", id);
    if let (Some(longitude), Some(latitude)) = (args.number("longitude"), args.number("latitude")) {
        return cmd
            .position(longitude, latitude)
            .maybe_meters("height", args.number("height"))
            .into();
    }

    let offsets = ["offsetX", "offsetY", "offsetZ"].map(|key| (key, args.number_or(key, 0.0)));
    if offsets.iter().all(|(_, offset)| *offset == 0.0) {
        return ToolOutput::text("Missing position (longitude/latitude) or offset parameters");
    }
    offsets
        .into_iter()
        .fold(cmd, |cmd, (key, offset)| cmd.meters(key, offset))
        .into()
}

/// `showEntity` and `hideEntity` both emit a `showEntity` command.
pub fn set_visibility(args: &Args<'_>, show: bool) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    Command::new("showEntity")
        .field("id", id)
        .field("show", show)
        .into()
}

pub fn set_entity_style(args: &Args<'_>) -> ToolOutput {
    let Some(id) = args.id() else {
        return missing("id");
    };
    Command::new("setEntityStyle")
        .field("id", id)
        .maybe("color", args.text("color", COLOR_CAPACITY))
        .maybe_factor("opacity", args.number("opacity").filter(|o| *o >= 0.0))
        .maybe("outlineColor", args.text("outlineColor", COLOR_CAPACITY))
        .maybe_meters(
            "outlineWidth",
            args.number("outlineWidth").filter(|w| *w >= 0.0),
        )
        .into()
}

pub fn definitions() -> Vec<ToolDefinition> {
    let id_only = json!({
        "type": "object",
        "properties": {"id": {"type": "string"}},
        "required": ["id"]
    });
    let position = json!({
        "type": "object",
        "properties": {
            "longitude": {"type": "number"},
            "latitude": {"type": "number"},
            "height": {"type": "number"}
        }
    });

    vec![
        ToolDefinition::new(
            Tool::AddPoint,
            "Add a point marker. Use 'location' for named places or longitude/latitude for coordinates.",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string", "description": "Named location (e.g. 'statue of liberty')"},
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "name": {"type": "string"},
                    "color": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddLabel,
            "Add a text label",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "text": {"type": "string"}
                },
                "required": ["longitude", "latitude", "text"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddSphere,
            "Add a 3D sphere/orb. Use 'location' for named places. Radius should be 10-500 meters for most uses.",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string", "description": "Named location (e.g. 'statue of liberty')"},
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "height": {"type": "number", "description": "Height above ground in meters (0-1000)", "maximum": 1000},
                    "radius": {"type": "number", "description": "Radius in meters (10-500 typical)", "minimum": 1, "maximum": 1000},
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddBox,
            "Add a 3D box",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "height": {"type": "number"},
                    "dimensions": {
                        "type": "object",
                        "properties": {
                            "x": {"type": "number"},
                            "y": {"type": "number"},
                            "z": {"type": "number"}
                        }
                    },
                    "dimensionX": {"type": "number"},
                    "dimensionY": {"type": "number"},
                    "dimensionZ": {"type": "number"},
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                },
                "required": ["longitude", "latitude"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddCylinder,
            "Add a 3D cylinder",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "height": {"type": "number"},
                    "topRadius": {"type": "number"},
                    "bottomRadius": {"type": "number"},
                    "cylinderHeight": {"type": "number"},
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                },
                "required": ["longitude", "latitude", "cylinderHeight"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddPolyline,
            "Add a polyline (line/path) between points",
            json!({
                "type": "object",
                "properties": {
                    "positions": {"type": "array", "items": position},
                    "color": {"type": "string"},
                    "width": {"type": "number"},
                    "clampToGround": {"type": "boolean"},
                    "name": {"type": "string"}
                },
                "required": ["positions"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddPolygon,
            "Add a polygon (filled area)",
            json!({
                "type": "object",
                "properties": {
                    "positions": {"type": "array", "items": position},
                    "color": {"type": "string"},
                    "outlineColor": {"type": "string"},
                    "height": {"type": "number"},
                    "extrudedHeight": {"type": "number"},
                    "name": {"type": "string"}
                },
                "required": ["positions"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddModel,
            "Add a 3D model (glTF/glb) at a location",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "height": {"type": "number"},
                    "url": {"type": "string"},
                    "ionAssetId": {"type": "number"},
                    "scale": {"type": "number"},
                    "heading": {"type": "number"},
                    "name": {"type": "string"}
                },
                "required": ["longitude", "latitude"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddCircle,
            "Add a circle on the ground or at height",
            json!({
                "type": "object",
                "properties": {
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "radius": {"type": "number"},
                    "color": {"type": "string"},
                    "height": {"type": "number"},
                    "extrudedHeight": {"type": "number"},
                    "name": {"type": "string"}
                },
                "required": ["longitude", "latitude", "radius"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddRectangle,
            "Add a rectangle (bounding box on ground)",
            json!({
                "type": "object",
                "properties": {
                    "west": {"type": "number"},
                    "south": {"type": "number"},
                    "east": {"type": "number"},
                    "north": {"type": "number"},
                    "color": {"type": "string"},
                    "height": {"type": "number"},
                    "extrudedHeight": {"type": "number"},
                    "name": {"type": "string"}
                },
                "required": ["west", "south", "east", "north"]
            }),
        ),
        ToolDefinition::new(Tool::RemoveEntity, "Remove an entity by ID", id_only.clone()),
        ToolDefinition::new(
            Tool::ClearAll,
            "Remove all entities",
            json!({"type": "object", "properties": {}}),
        ),
        ToolDefinition::new(
            Tool::RotateEntity,
            "Rotate an entity by heading (degrees). 0=North, 90=East, 180=South, 270=West.",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "heading": {"type": "number"}
                },
                "required": ["id", "heading"]
            }),
        ),
        ToolDefinition::new(
            Tool::ResizeEntity,
            "Resize an entity by scale factor (1.0=current, 2.0=double, 0.5=half) or by specific dimensions",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "scale": {"type": "number"},
                    "dimensionX": {"type": "number"},
                    "dimensionY": {"type": "number"},
                    "dimensionZ": {"type": "number"}
                },
                "required": ["id"]
            }),
        ),
        ToolDefinition::new(
            Tool::MoveEntity,
            "Move an entity to new coordinates or by offset",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "longitude": {"type": "number"},
                    "latitude": {"type": "number"},
                    "height": {"type": "number"},
                    "offsetX": {"type": "number"},
                    "offsetY": {"type": "number"},
                    "offsetZ": {"type": "number"}
                },
                "required": ["id"]
            }),
        ),
        ToolDefinition::new(Tool::ShowEntity, "Make an entity visible", id_only.clone()),
        ToolDefinition::new(Tool::HideEntity, "Hide an entity (make invisible)", id_only),
        ToolDefinition::new(
            Tool::SetEntityStyle,
            "Change an entity's style (color, opacity, outline)",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "color": {"type": "string"},
                    "opacity": {"type": "number"},
                    "outlineColor": {"type": "string"},
                    "outlineWidth": {"type": "number"}
                },
                "required": ["id"]
            }),
        ),
    ]
}
