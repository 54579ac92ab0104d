use globe_mcp_core::{Category, FuzzyMatch, LocationIndex, LocationRecord};
use serde_json::{json, Map, Value};

use super::args::{box_dimensions, Args, LOCATION_CAPACITY, SHORT_CAPACITY, TEXT_CAPACITY};
use super::entities::{label, model, point, sphere, Spot};
use super::{missing, not_found, round_to, Command, Tool, ToolContext, ToolDefinition, ToolOutput};

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
const MIN_BOX_DIMENSION: f64 = 10.0;

/// `{name, longitude, latitude, heading?}` for listings.
pub fn location_entry(record: &LocationRecord) -> Value {
    let mut entry = json!({
        "name": record.name,
        "longitude": round_to(f64::from(record.longitude), 6),
        "latitude": round_to(f64::from(record.latitude), 6),
    });
    if let Some(heading) = record.heading {
        entry["heading"] = json!(round_to(f64::from(heading), 1));
    }
    entry
}

/// Lookup result for hosts that bypass the protocol envelope.
pub fn resolution(index: &LocationIndex, name: &str, max_distance: usize) -> Value {
    match index.resolve(name, max_distance) {
        Some(record) => {
            let mut found = Map::new();
            found.insert("found".to_string(), Value::Bool(true));
            if let Value::Object(entry) = location_entry(record) {
                found.extend(entry.into_iter().filter(|(key, _)| key != "name"));
            }
            Value::Object(found)
        }
        None => json!({"found": false, "error": format!("Location not found: {name}")}),
    }
}

pub fn ranked_entry(hit: &FuzzyMatch<'_>) -> Value {
    let mut entry = location_entry(hit.record);
    entry["distance"] = json!(hit.distance);
    entry
}

fn located<'a>(
    args: &Args<'_>,
    ctx: &ToolContext<'a>,
) -> Result<(&'a LocationRecord, String), ToolOutput> {
    let location = args.location().ok_or_else(|| missing("location"))?;
    match ctx.resolve(&location) {
        Some(record) => Ok((record, location)),
        None => Err(not_found(&location)),
    }
}

pub fn resolve_location(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let Some(location) = args.location() else {
        return missing("location");
    };
    let Some(record) = ctx.resolve(&location) else {
        return ToolOutput::Text(format!("Location '{location}' not found in database"));
    };

    let mut text = format!(
        "Location '{location}' resolved to: longitude={:.6}, latitude={:.6}",
        record.longitude, record.latitude
    );
    if let Some(heading) = record.heading {
        text.push_str(&format!(", heading={heading:.1}"));
    }
    ToolOutput::Text(text)
}

pub fn list_locations(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let limit = args.count_or("limit", DEFAULT_LIST_LIMIT);
    let entries: Vec<Value> = match args.text("prefix", SHORT_CAPACITY) {
        Some(prefix) => ctx
            .index
            .search_prefix(&prefix, limit)
            .into_iter()
            .map(location_entry)
            .collect(),
        None => ctx.index.iter().take(limit).map(location_entry).collect(),
    };
    ToolOutput::Json(Value::Array(entries))
}

pub fn search_locations(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let Some(query) = args.text("query", LOCATION_CAPACITY) else {
        return missing("query");
    };
    let max_distance = args.count_or("maxDistance", ctx.fuzzy_max_distance);
    let limit = args.count_or("limit", DEFAULT_SEARCH_LIMIT);

    let hits = ctx.index.search_fuzzy_ranked(&query, max_distance, limit);
    if hits.is_empty() {
        return ToolOutput::Text(format!("No locations match '{query}'"));
    }
    ToolOutput::Json(Value::Array(hits.iter().map(ranked_entry).collect()))
}

/// Known-population cities, largest first.
pub fn list_top_cities(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let min_population = args
        .number("minPopulation")
        .map_or(0, |n| n.clamp(0.0, f64::from(u32::MAX)) as u32)
        .max(1);
    let limit = args.count_or("limit", DEFAULT_SEARCH_LIMIT);

    let cities: Vec<Value> = ctx
        .index
        .top_by_population(min_population, usize::MAX)
        .into_iter()
        .filter(|r| r.category.contains(Category::CITY))
        .take(limit)
        .map(|r| {
            json!({
                "name": r.name,
                "longitude": round_to(f64::from(r.longitude), 6),
                "latitude": round_to(f64::from(r.latitude), 6),
                "population": r.population,
            })
        })
        .collect();
    if cities.is_empty() {
        return ToolOutput::Text(format!("No cities with population >= {min_population}"));
    }
    ToolOutput::Json(Value::Array(cities))
}

pub fn fly_to_location(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let (record, _) = match located(args, ctx) {
        Ok(found) => found,
        Err(diagnostic) => return diagnostic,
    };

    let height = match args.number_or("height", 10_000.0) {
        h if h > 100_000.0 => 10_000.0,
        h if h < 100.0 => 1_000.0,
        h => h,
    };
    let duration = match args.number_or("duration", 2.0) {
        d if d < 0.5 => 2.0,
        d if d > 10.0 => 3.0,
        d => d,
    };
    Command::new("flyTo")
        .at(Spot::from(record))
        .meters("height", height)
        .meters("duration", duration)
        .into()
}

pub fn add_sphere(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    match located(args, ctx) {
        Ok((record, location)) => sphere(args, ctx, Spot::from(record), &location, None),
        Err(diagnostic) => diagnostic,
    }
}

/// Sits the box on the ground and faces it along the stored heading unless one is given.
pub fn add_box(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let (record, location) = match located(args, ctx) {
        Ok(found) => found,
        Err(diagnostic) => return diagnostic,
    };

    let [x, y, z] = box_dimensions(args, [100.0, 100.0, 50.0]).map(|d| d.max(MIN_BOX_DIMENSION));
    let heading = args
        .number("heading")
        .or(record.heading.map(f64::from))
        .filter(|h| *h >= 0.0);
    Command::entity("addBox", ctx)
        .at(Spot::from(record))
        .meters("height", z / 2.0)
        .meters("dimensionX", x)
        .meters("dimensionY", y)
        .meters("dimensionZ", z)
        .maybe_meters("heading", heading)
        .field("color", args.color_or("blue"))
        .field("name", args.name_or(&location))
        .into()
}

pub fn add_point(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    match located(args, ctx) {
        Ok((record, location)) => point(args, ctx, Spot::from(record), &location),
        Err(diagnostic) => diagnostic,
    }
}

pub fn add_label(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    let (record, _) = match located(args, ctx) {
        Ok(found) => found,
        Err(diagnostic) => return diagnostic,
    };
    let Some(text) = args.text("text", TEXT_CAPACITY) else {
        return missing("text");
    };
    label(ctx, Spot::from(record), text)
}

pub fn add_model(args: &Args<'_>, ctx: &mut ToolContext<'_>) -> ToolOutput {
    match located(args, ctx) {
        Ok((record, location)) => {
            let heading = record.heading.map_or(0.0, f64::from);
            model(args, ctx, Spot::from(record), 0.0, heading, &location)
        }
        Err(diagnostic) => diagnostic,
    }
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            Tool::ResolveLocation,
            "Resolve a location name to coordinates",
            json!({
                "type": "object",
                "properties": {"location": {"type": "string"}},
                "required": ["location"]
            }),
        ),
        ToolDefinition::new(
            Tool::ListLocations,
            "List known locations",
            json!({
                "type": "object",
                "properties": {
                    "prefix": {"type": "string"},
                    "limit": {"type": "number", "description": "Maximum entries (default 100)", "minimum": 0}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::SearchLocations,
            "Find known locations with names close to a query, closest first",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "maxDistance": {"type": "number", "description": "Maximum edit distance", "minimum": 0},
                    "limit": {"type": "number", "description": "Maximum results (default 10)", "minimum": 0}
                },
                "required": ["query"]
            }),
        ),
        ToolDefinition::new(
            Tool::ListTopCities,
            "List the most populous known cities",
            json!({
                "type": "object",
                "properties": {
                    "minPopulation": {"type": "number", "minimum": 0},
                    "limit": {"type": "number", "description": "Maximum results (default 10)", "minimum": 0}
                }
            }),
        ),
        ToolDefinition::new(
            Tool::FlyToLocation,
            "Fly camera to a named location. Height 1000-50000m typical.",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string"},
                    "height": {"type": "number", "description": "Camera height in meters (1000-50000 typical)", "minimum": 100, "maximum": 100000},
                    "duration": {"type": "number", "description": "Flight duration in seconds (1-5)"}
                },
                "required": ["location"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddSphereAtLocation,
            "Add sphere at named location. Radius 10-500m typical.",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string"},
                    "radius": {"type": "number", "description": "Radius in meters (10-500 typical)", "minimum": 1, "maximum": 1000},
                    "height": {"type": "number", "description": "Height above ground (0-1000m)", "maximum": 1000},
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                },
                "required": ["location"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddBoxAtLocation,
            "Add box at named location. Auto-uses database heading if available; override with heading param (0=North, 90=East).",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string"},
                    "dimensionX": {"type": "number"},
                    "dimensionY": {"type": "number"},
                    "dimensionZ": {"type": "number"},
                    "color": {"type": "string"},
                    "heading": {"type": "number"},
                    "name": {"type": "string"}
                },
                "required": ["location"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddPointAtLocation,
            "Add point at named location",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string"},
                    "color": {"type": "string"},
                    "name": {"type": "string"}
                },
                "required": ["location"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddLabelAtLocation,
            "Add label at named location",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string"},
                    "text": {"type": "string"}
                },
                "required": ["location", "text"]
            }),
        ),
        ToolDefinition::new(
            Tool::AddModelAtLocation,
            "Add a 3D model at a named location",
            json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string"},
                    "url": {"type": "string"},
                    "ionAssetId": {"type": "number"},
                    "scale": {"type": "number"},
                    "heading": {"type": "number"},
                    "name": {"type": "string"}
                },
                "required": ["location"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::super::tests::{command, run};
    use super::*;
    use crate::session::Session;

    #[test]
    fn resolve_reports_heading_when_stored() {
        let mut session = Session::new();
        let index = LocationIndex::builtin();
        let out = run(Tool::ResolveLocation, r#"{"location":"Statue of Liberty"}"#, &mut session, index);
        assert_eq!(
            out,
            ToolOutput::text(
                "Location 'Statue of Liberty' resolved to: longitude=-74.044502, latitude=40.689201, heading=225.0"
            )
        );
        let out = run(Tool::ResolveLocation, r#"{"location":"Narnia"}"#, &mut session, index);
        assert_eq!(out, ToolOutput::text("Location 'Narnia' not found in database"));
        let out = run(Tool::ResolveLocation, "{}", &mut session, index);
        assert_eq!(out, ToolOutput::text("Missing 'location' parameter"));
    }

    #[test]
    fn fuzzy_fallback_on_typos() {
        let mut session = Session::new();
        let out = run(Tool::FlyToLocation, r#"{"location":"Pari"}"#, &mut session, LocationIndex::builtin());
        let cmd = command(out);
        assert_eq!(cmd["type"], "flyTo");
        assert_eq!(cmd["longitude"], 2.3522);
    }

    #[test]
    fn fly_to_location_clamps() {
        let mut session = Session::new();
        let index = LocationIndex::builtin();
        let cmd = command(run(
            Tool::FlyToLocation,
            r#"{"location":"Tokyo","height":500000,"duration":0.1}"#,
            &mut session,
            index,
        ));
        assert_eq!(cmd["height"], 10000.0);
        assert_eq!(cmd["duration"], 2.0);

        let cmd = command(run(
            Tool::FlyToLocation,
            r#"{"locationName":"Tokyo","height":50,"duration":30}"#,
            &mut session,
            index,
        ));
        assert_eq!(cmd["height"], 1000.0);
        assert_eq!(cmd["duration"], 3.0);
    }

    #[test]
    fn box_at_landmark_uses_stored_heading() {
        let mut session = Session::new();
        let index = LocationIndex::builtin();
        let cmd = command(run(
            Tool::AddBoxAtLocation,
            r#"{"location":"Eiffel Tower","dimensionX":4,"dimensionZ":300}"#,
            &mut session,
            index,
        ));
        assert_eq!(cmd["dimensionX"], 10.0);
        assert_eq!(cmd["dimensionZ"], 300.0);
        assert_eq!(cmd["height"], 150.0);
        assert_eq!(cmd["heading"], 320.0);
        assert_eq!(cmd["name"], "Eiffel Tower");

        let cmd = command(run(
            Tool::AddBoxAtLocation,
            r#"{"location":"Eiffel Tower","heading":10}"#,
            &mut session,
            index,
        ));
        assert_eq!(cmd["heading"], 10.0);

        let cmd = command(run(Tool::AddBoxAtLocation, r#"{"location":"Berlin"}"#, &mut session, index));
        assert!(cmd.get("heading").is_none());
    }

    #[test]
    fn label_at_location_needs_text() {
        let mut session = Session::new();
        let index = LocationIndex::builtin();
        let out = run(Tool::AddLabelAtLocation, r#"{"location":"Rome"}"#, &mut session, index);
        assert_eq!(out, ToolOutput::text("Missing 'text' parameter"));
        let cmd = command(run(
            Tool::AddLabelAtLocation,
            r#"{"location":"Rome","text":"Ciao"}"#,
            &mut session,
            index,
        ));
        assert_eq!(cmd["id"], "entity-1");
        assert_eq!(cmd["text"], "Ciao");
    }

    #[test]
    fn model_at_location_defaults_to_stored_heading() {
        let mut session = Session::new();
        let cmd = command(run(
            Tool::AddModelAtLocation,
            r#"{"location":"Big Ben","url":"clock.glb"}"#,
            &mut session,
            LocationIndex::builtin(),
        ));
        assert_eq!(cmd["heading"], 90.0);
        assert_eq!(cmd["height"], 0.0);
        assert_eq!(cmd["url"], "clock.glb");
        assert_eq!(cmd["name"], "Big Ben");
    }

    #[test]
    fn list_by_prefix() {
        let mut session = Session::new();
        let out = run(Tool::ListLocations, r#"{"prefix":"New"}"#, &mut session, LocationIndex::builtin());
        let cmd = command(out);
        let names: Vec<&str> = cmd
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["new york", "new york city"]);
    }

    #[test]
    fn search_ranks_by_distance() {
        let mut session = Session::new();
        let index = LocationIndex::builtin();
        let cmd = command(run(Tool::SearchLocations, r#"{"query":"rone","maxDistance":1}"#, &mut session, index));
        assert_eq!(cmd[0]["name"], "rome");
        assert_eq!(cmd[0]["distance"], 1);

        let out = run(Tool::SearchLocations, r#"{"query":"qqqqqqqq"}"#, &mut session, index);
        assert_eq!(out, ToolOutput::text("No locations match 'qqqqqqqq'"));
    }

    #[test]
    fn top_cities_are_population_ordered() {
        let mut session = Session::new();
        let cmd = command(run(
            Tool::ListTopCities,
            r#"{"limit":3}"#,
            &mut session,
            LocationIndex::builtin(),
        ));
        let populations: Vec<u64> = cmd
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["population"].as_u64().unwrap())
            .collect();
        assert_eq!(populations.len(), 3);
        assert!(populations.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn direct_resolution_shape() {
        let index = LocationIndex::builtin();
        assert_eq!(
            resolution(index, "Paris", 2).to_string(),
            r#"{"found":true,"longitude":2.3522,"latitude":48.8566}"#
        );
        assert_eq!(
            resolution(index, "Xanadu", 0),
            json!({"found": false, "error": "Location not found: Xanadu"})
        );
    }
}
