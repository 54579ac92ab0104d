use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::location::{Category, LocationBuilder, LocationIndex, LocationRecord};

/// A small index with known population order and a few near-miss names.
pub fn sample_index() -> LocationIndex {
    let mut builder = LocationBuilder::new();
    for record in [
        LocationRecord::new("Paris", 2.3522, 48.8566)
            .with_population(2_161_000)
            .with_category(Category::CITY),
        LocationRecord::new("London", -0.1276, 51.5072)
            .with_population(8_982_000)
            .with_category(Category::CITY),
        LocationRecord::new("Tokyo", 139.6917, 35.6895)
            .with_population(13_960_000)
            .with_category(Category::CITY),
        LocationRecord::new("New York", -74.0060, 40.7128)
            .with_population(8_336_817)
            .with_category(Category::CITY),
        LocationRecord::new("New York City", -74.0060, 40.7128).with_category(Category::CITY),
        LocationRecord::new("New Delhi", 77.2090, 28.6139)
            .with_population(249_998)
            .with_category(Category::CITY),
        LocationRecord::new("Statue of Liberty", -74.0445, 40.6892)
            .with_heading(225.0)
            .with_category(Category::LANDMARK),
    ] {
        builder.add(record);
    }
    builder.into_index()
}

/// A temp directory with one JSON and one YAML location source, plus a file to ignore.
pub fn create_source_dir() -> TempDir {
    let dir = TempDir::new().unwrap();

    write_source(
        dir.path(),
        "lisbon.json",
        r#"[
  {"name": "Lisbon", "lon": -9.1393, "lat": 38.7223, "population": 545000, "categories": ["city"]},
  {"name": "Belem Tower", "longitude": -9.2160, "latitude": 38.6916, "heading": 180, "categories": ["landmark"]}
]"#,
    );

    fs::create_dir(dir.path().join("north")).unwrap();
    write_source(
        dir.path().join("north"),
        "porto.yaml",
        "locations:\n  - name: Porto\n    longitude: -8.6291\n    latitude: 41.1579\n    population: 231800\n    categories: [city]\n",
    );

    write_source(dir.path(), "README.md", "# not a source\n");

    dir
}

fn write_source(dir: impl AsRef<Path>, name: &str, content: &str) {
    fs::write(dir.as_ref().join(name), content).unwrap();
}
