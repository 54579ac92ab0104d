//! Tools that place entities at the ground point the camera is looking at.

use std::f64::consts::PI;

use serde_json::{json, Value};

use super::args::{box_dimensions, Args, SHORT_CAPACITY, TEXT_CAPACITY};
use super::entities::{circle, extruded_height, label, model, point, sphere, Spot};
use super::{
    missing, round_to, Command, Tool, ToolContext, ToolDefinition, ToolOutput,
    CAMERA_UNAVAILABLE,
};

const ENTITY_TYPES: [&str; 7] = ["sphere", "box", "cylinder", "point", "label", "circle", "model"];
const METERS_PER_DEGREE: f64 = 111_000.0;

fn target(ctx: &ToolContext<'_>) -> Result<Spot, ToolOutput> {
    ctx.session
        .camera()
        .map(Spot::from)
        .ok_or_else(|| ToolOutput::text(CAMERA_UNAVAILABLE))
}

macro_rules! here {
    ($ctx:expr) => {
        match target($ctx) {
            Ok(spot) => spot,
            Err(diagnostic) => return diagnostic,
        }
    };
}

pub fn add_sphere(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    sphere(args, ctx, spot, "sphere", None)
}

pub fn add_box(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    let [x, y, z] = box_dimensions(args, [100.0, 100.0, 50.0]).map(|d| d.max(10.0));
    Command::entity("addBox", ctx)
        .at(spot)
        .meters("height", z / 2.0)
        .meters("dimensionX", x)
        .meters("dimensionY", y)
        .meters("dimensionZ", z)
        .meters("heading", args.number_or("heading", 0.0))
        .field("color", args.color_or("blue"))
        .field("name", args.name_or("box"))
        .into()
}

pub fn add_point(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    point(args, ctx, spot, "point")
}

pub fn add_label(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    let Some(text) = args.text("text", TEXT_CAPACITY) else {
        return missing("text");
    };
    label(ctx, spot, text)
}

pub fn add_cylinder(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    Command::entity("addCylinder", ctx)
        .at(spot)
        .meters("height", 0.0)
        .meters("topRadius", args.number_or("topRadius", 50.0))
        .meters("bottomRadius", args.number_or("bottomRadius", 50.0))
        .meters("cylinderHeight", args.number_or("cylinderHeight", 100.0))
        .field("color", args.color_or("green"))
        .field("name", args.name_or("cylinder"))
        .into()
}

pub fn add_circle(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    let radius = args.number_or("radius", 100.0);
    circle(args, ctx, spot, radius)
}

pub fn add_model(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    model(args, ctx, spot, 0.0, 0.0, "model")
}

/// Vertices of a regular polygon of `radius` meters around `center`, counter-clockwise from east.
fn polygon_vertices(center: Spot, radius: f64, sides: usize) -> Vec<Value> {
    let lat_per_meter = 1.0 / METERS_PER_DEGREE;
    // +0.001 keeps the scale finite at the poles
    let lon_per_meter = lat_per_meter / (center.latitude.to_radians().cos() + 0.001);
    (0..sides)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / sides as f64;
            json!({
                "longitude": round_to(center.longitude + radius * angle.cos() * lon_per_meter, 6),
                "latitude": round_to(center.latitude + radius * angle.sin() * lat_per_meter, 6),
            })
        })
        .collect()
}

pub fn add_polygon(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    let sides = args.number_or("sides", 6.0).clamp(3.0, 32.0) as usize;
    let radius = args.number_or("radius", 100.0);
    Command::entity("addPolygon", ctx)
        .field("positions", polygon_vertices(spot, radius, sides))
        .field("color", args.color_or("blue"))
        .meters("height", args.number_or("height", 0.0))
        .maybe_meters("extrudedHeight", extruded_height(args))
        .field("name", args.name_or("polygon"))
        .into()
}

/// One entry point for every entity kind. `radius` sizes whichever shape is chosen.
pub fn add_entity(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let spot = here!(ctx);
    let kind = args.text_or("entityType", SHORT_CAPACITY, "sphere");
    if !ENTITY_TYPES.contains(&kind.as_str()) {
        return ToolOutput::Text(format!(
            "Unknown entity type: {kind}. Use: {}",
            ENTITY_TYPES.join(", ")
        ));
    }
    if kind == "sphere" {
        return sphere(args, ctx, spot, "sphere", Some(50.0));
    }

    let radius = args.number_or("radius", 50.0);
    let sized = |fallback: f64| if radius > 0.0 { radius } else { fallback };
    let height = args.number_or("height", 0.0);
    let color = args.color_or("red");
    let cmd = match kind.as_str() {
        "box" => {
            let dim = sized(50.0);
            Command::entity("addBox", ctx)
                .at(spot)
                .meters("height", dim / 2.0)
                .meters("dimensionX", dim)
                .meters("dimensionY", dim)
                .meters("dimensionZ", dim)
                .field("color", color)
        }
        "cylinder" => {
            let r = sized(50.0);
            Command::entity("addCylinder", ctx)
                .at(spot)
                .meters("height", 0.0)
                .meters("topRadius", r)
                .meters("bottomRadius", r)
                .meters("cylinderHeight", r * 2.0)
                .field("color", color)
        }
        "point" => Command::entity("addPoint", ctx).at(spot).field("color", color),
        "label" => {
            let text = args.text_or("text", TEXT_CAPACITY, "Label");
            return label(ctx, spot, text);
        }
        "circle" => Command::entity("addCircle", ctx)
            .at(spot)
            .meters("radius", sized(100.0))
            .meters("height", height)
            .field("color", color),
        _ => Command::entity("addModel", ctx)
            .at(spot)
            .meters("height", height)
            .field("url", "")
            .factor("scale", 1.0)
            .meters("heading", 0.0),
    };
    cmd.field("name", args.name_or(&kind)).into()
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            Tool::AddSphereHere,
            "Add a sphere at current camera view center (where camera is looking). Use when user says 'add sphere' without specifying a location.",
            json!({
                "type": "object",
                "properties": {
                    "radius": {"type": "number", "description": "Radius in meters (10-500 typical)", "minimum": 1, "maximum": 1000},
                    "height": {"type": "number", "description": "Height above ground (0-1000m)", "maximum": 1000},
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddBoxHere,
            "Add a box at current camera view center. Use when user says 'add box' without specifying a location.",
            json!({
                "type": "object",
                "properties": {
                    "dimensionX": {"type": "number"},
                    "dimensionY": {"type": "number"},
                    "dimensionZ": {"type": "number"},
                    "color": {"type": "string"},
                    "heading": {"type": "number"},
                    "name": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddPointHere,
            "Add a point marker at current camera view center.",
            json!({
                "type": "object",
                "properties": {
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddLabelHere,
            "Add a label at current camera view center.",
            json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddCylinderHere,
            "Add a cylinder at current camera view center.",
            json!({
                "type": "object",
                "properties": {
                    "topRadius": {"type": "number"},
                    "bottomRadius": {"type": "number"},
                    "cylinderHeight": {"type": "number"},
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddCircleHere,
            "Add a circle on the ground at current camera view center.",
            json!({
                "type": "object",
                "properties": {
                    "radius": {"type": "number"},
                    "color": {"type": "string"},
                    "height": {"type": "number"},
                    "extrudedHeight": {"type": "number"},
                    "name": {"type": "string"}
                },
                "required": ["radius"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddModelHere,
            "Add a 3D model (glTF/glb) at current camera view center.",
            json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "ionAssetId": {"type": "number"},
                    "scale": {"type": "number"},
                    "heading": {"type": "number"},
                    "name": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddPolygonHere,
            "Add a polygon centered at current camera view.",
            json!({
                "type": "object",
                "properties": {
                    "radius": {"type": "number", "description": "Radius in meters to generate polygon vertices around center"},
                    "sides": {"type": "number", "description": "Number of sides (3=triangle, 4=square, 6=hexagon, etc)", "minimum": 3, "maximum": 32},
                    "color": {"type": "string"},
                    "height": {"type": "number"},
                    "extrudedHeight": {"type": "number"},
                    "name": {"type": "string"}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::AddEntityHere,
            "Generic tool to add any entity at current camera view center. Specify entityType: sphere, box, cylinder, point, label, circle, model.",
            json!({
                "type": "object",
                "properties": {
                    "entityType": {"type": "string", "enum": ENTITY_TYPES},
                    "radius": {"type": "number"},
                    "color": {"type": "string"},
                    "height": {"type": "number"},
                    "name": {"type": "string"},
                    "text": {"type": "string"}
                },
                "required": ["entityType"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::tests::{command, run};
    use super::*;
    use crate::session::{CameraState, Session};
    use globe_mcp_core::LocationIndex;

    fn looking_at(longitude: f64, latitude: f64) -> Session {
        let mut session = Session::new();
        session.set_camera(CameraState {
            longitude,
            latitude: latitude - 0.1,
            height: 5_000.0,
            target_longitude: longitude,
            target_latitude: latitude,
        });
        session
    }

    #[test]
    fn every_here_tool_waits_for_the_camera() {
        let here = [
            Tool::AddSphereHere,
            Tool::AddBoxHere,
            Tool::AddPointHere,
            Tool::AddLabelHere,
            Tool::AddCylinderHere,
            Tool::AddCircleHere,
            Tool::AddModelHere,
            Tool::AddPolygonHere,
            Tool::AddEntityHere,
        ];
        let mut session = Session::new();
        for tool in here {
            let out = run(tool, r#"{"text":"hi"}"#, &mut session, LocationIndex::builtin());
            assert_eq!(out, ToolOutput::text(CAMERA_UNAVAILABLE), "{}", tool.name());
        }
        assert_eq!(session.next_entity_id(), "entity-1");
    }

    #[test]
    fn sphere_lands_on_camera_target() {
        let mut session = looking_at(-74.0445, 40.6892);
        let cmd = command(run(Tool::AddSphereHere, "{}", &mut session, LocationIndex::builtin()));
        assert_eq!(cmd["longitude"], -74.0445);
        assert_eq!(cmd["latitude"], 40.6892);
        assert_eq!(cmd["radius"], 100.0);
    }

    #[test]
    fn box_here_sits_on_the_ground() {
        let mut session = looking_at(10.0, 20.0);
        let cmd = command(run(
            Tool::AddBoxHere,
            r#"{"dimensionZ":80,"dimensionX":2}"#,
            &mut session,
            LocationIndex::builtin(),
        ));
        assert_eq!(cmd["height"], 40.0);
        assert_eq!(cmd["dimensionX"], 10.0);
        assert_eq!(cmd["heading"], 0.0);
    }

    #[test]
    fn polygon_sides_are_clamped() {
        let mut session = looking_at(0.0, 0.0);
        let index = LocationIndex::builtin();
        let cmd = command(run(Tool::AddPolygonHere, r#"{"sides":1}"#, &mut session, index));
        assert_eq!(cmd["positions"].as_array().map(Vec::len), Some(3));
        let cmd = command(run(Tool::AddPolygonHere, r#"{"sides":64}"#, &mut session, index));
        assert_eq!(cmd["positions"].as_array().map(Vec::len), Some(32));
        let cmd = command(run(Tool::AddPolygonHere, "{}", &mut session, index));
        assert_eq!(cmd["positions"].as_array().map(Vec::len), Some(6));
    }

    #[test]
    fn first_vertex_lies_east_of_center() {
        let vertices = polygon_vertices(Spot { longitude: 0.0, latitude: 0.0 }, 111.0, 4);
        let lon = vertices[0]["longitude"].as_f64().unwrap();
        assert!(lon > 0.0009 && lon < 0.0011, "{lon}");
        assert_eq!(vertices[0]["latitude"], 0.0);
    }

    #[test]
    fn entity_here_dispatches_on_type() {
        let mut session = looking_at(1.0, 2.0);
        let index = LocationIndex::builtin();

        let cmd = command(run(Tool::AddEntityHere, r#"{"entityType":"box","radius":30}"#, &mut session, index));
        assert_eq!(cmd["type"], "addBox");
        assert_eq!(cmd["dimensionZ"], 30.0);
        assert_eq!(cmd["height"], 15.0);
        assert_eq!(cmd["color"], "red");

        let cmd = command(run(Tool::AddEntityHere, r#"{"entityType":"cylinder"}"#, &mut session, index));
        assert_eq!(cmd["cylinderHeight"], 100.0);

        let cmd = command(run(Tool::AddEntityHere, r#"{"entityType":"label"}"#, &mut session, index));
        assert_eq!(cmd["text"], "Label");

        let cmd = command(run(Tool::AddEntityHere, "{}", &mut session, index));
        assert_eq!(cmd["type"], "addSphere");
        assert_eq!(cmd["radius"], 50.0);

        let out = run(Tool::AddEntityHere, r#"{"entityType":"cone"}"#, &mut session, index);
        assert_eq!(
            out,
            ToolOutput::text(
                "Unknown entity type: cone. Use: sphere, box, cylinder, point, label, circle, model"
            )
        );
        assert_eq!(session.next_entity_id(), "entity-5");
    }
}
