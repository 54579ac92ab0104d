use globe_mcp_core::reader::{
    read_array, read_bool, read_number, read_object, read_string, RawField,
};
use serde_json::Value;

pub const ARGUMENTS_CAPACITY: usize = 4095;
pub const LOCATION_CAPACITY: usize = 255;
pub const NAME_CAPACITY: usize = 127;
pub const COLOR_CAPACITY: usize = 31;
pub const ID_CAPACITY: usize = 63;
pub const URL_CAPACITY: usize = 511;
pub const TEXT_CAPACITY: usize = 255;
pub const SHORT_CAPACITY: usize = 63;
pub const MODE_CAPACITY: usize = 15;
pub const NESTED_CAPACITY: usize = 255;
pub const POSITIONS_CAPACITY: usize = 4095;

/// Typed, defaulting access to the raw `arguments` object of a tool call.
///
/// Every accessor treats a missing key, a `null`, a value of the wrong type and an empty string
/// the same way: absent.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    raw: &'a str,
}

impl<'a> Args<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn text(&self, key: &str, capacity: usize) -> Option<String> {
        read_string(self.raw, key, capacity).filter(|s| !s.is_empty())
    }

    pub fn text_or(&self, key: &str, capacity: usize, default: &str) -> String {
        self.text(key, capacity)
            .unwrap_or_else(|| default.to_string())
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        read_number(self.raw, key).filter(|n| n.is_finite())
    }

    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// A non-negative whole number, truncated.
    pub fn count_or(&self, key: &str, default: usize) -> usize {
        self.number(key)
            .filter(|n| *n >= 0.0)
            .map_or(default, |n| n as usize)
    }

    pub fn flag_or(&self, key: &str, default: bool) -> bool {
        read_bool(self.raw, key).unwrap_or(default)
    }

    pub fn object(&self, key: &str) -> RawField {
        read_object(self.raw, key, NESTED_CAPACITY)
    }

    /// A nested array or object, parsed. Truncated or malformed text is absent.
    pub fn parsed(&self, key: &str) -> Option<Value> {
        let field = match read_array(self.raw, key, POSITIONS_CAPACITY) {
            RawField::Absent => read_object(self.raw, key, POSITIONS_CAPACITY),
            other => other,
        };
        serde_json::from_str(field.value()?).ok()
    }

    /// The place name, accepting the legacy `locationName` key.
    pub fn location(&self) -> Option<String> {
        self.text("location", LOCATION_CAPACITY)
            .or_else(|| self.text("locationName", LOCATION_CAPACITY))
    }

    pub fn id(&self) -> Option<String> {
        self.text("id", ID_CAPACITY)
    }

    pub fn name_or(&self, default: &str) -> String {
        self.text_or("name", NAME_CAPACITY, default)
    }

    pub fn color_or(&self, default: &str) -> String {
        self.text_or("color", COLOR_CAPACITY, default)
    }

    pub fn url(&self) -> Option<String> {
        self.text("url", URL_CAPACITY)
    }

    /// Positive ion asset ids only.
    pub fn ion_asset_id(&self) -> Option<i64> {
        self.number("ionAssetId")
            .filter(|n| *n > 0.0)
            .map(|n| n.round() as i64)
    }
}

/// X/Y/Z box dimensions read from flat `dimensionX`.. keys, then a nested `dimensions` object.
pub fn box_dimensions(args: &Args<'_>, default: [f64; 3]) -> [f64; 3] {
    let mut dims = [
        args.number_or("dimensionX", default[0]),
        args.number_or("dimensionY", default[1]),
        args.number_or("dimensionZ", default[2]),
    ];
    if let Some(nested) = args.object("dimensions").value() {
        let nested = Args::new(nested);
        for (dim, key) in dims.iter_mut().zip(["x", "y", "z"]) {
            if let Some(value) = nested.number(key) {
                *dim = value;
            }
        }
    }
    dims
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_string_is_absent() {
        let args = Args::new(r#"{"name":"","color":"red"}"#);
        assert_eq!(args.name_or("sphere"), "sphere");
        assert_eq!(args.color_or("blue"), "red");
    }

    #[test]
    fn location_falls_back_to_legacy_key() {
        let args = Args::new(r#"{"locationName":"Paris"}"#);
        assert_eq!(args.location().as_deref(), Some("Paris"));
    }

    #[test]
    fn parses_nested_positions() {
        let args = Args::new(r#"{"positions":[{"longitude":1,"latitude":2}],"width":3}"#);
        assert_eq!(
            args.parsed("positions"),
            Some(json!([{"longitude": 1, "latitude": 2}]))
        );
        assert_eq!(args.parsed("width"), None);
    }

    #[test]
    fn dimensions_prefer_nested_object() {
        let args = Args::new(r#"{"dimensionX":20,"dimensions":{"y":30}}"#);
        assert_eq!(box_dimensions(&args, [100.0, 100.0, 50.0]), [20.0, 30.0, 50.0]);
    }

    #[test]
    fn ion_asset_id_must_be_positive() {
        assert_eq!(Args::new(r#"{"ionAssetId":96188}"#).ion_asset_id(), Some(96188));
        assert_eq!(Args::new(r#"{"ionAssetId":-1}"#).ion_asset_id(), None);
    }
}
