use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::builtin::builtin_records;
use super::database::{encode_database, DatabaseError};
use super::normalize::normalize;
use super::{Category, LocationIndex, LocationRecord};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("unsupported source file {}", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("location entry has an empty name")]
    EmptyName,

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// One curated entry as written in a JSON or YAML source file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SourceEntry {
    pub name: String,
    #[serde(alias = "lon")]
    pub longitude: f32,
    #[serde(alias = "lat")]
    pub latitude: f32,
    #[serde(default)]
    pub heading: Option<f32>,
    #[serde(default)]
    pub population: u32,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Extra names that resolve to the same coordinate. Aliases carry no population.
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SourceFile {
    List(Vec<SourceEntry>),
    Wrapped { locations: Vec<SourceEntry> },
}

impl SourceFile {
    fn into_entries(self) -> Vec<SourceEntry> {
        match self {
            Self::List(entries) | Self::Wrapped { locations: entries } => entries,
        }
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e, "json" | "yaml" | "yml"))
        .unwrap_or(false)
}

fn parse_source_file(path: &Path) -> Result<Vec<SourceEntry>, BuildError> {
    let text = fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file: SourceFile = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(|source| BuildError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Some("yaml" | "yml") => serde_yaml::from_str(&text).map_err(|source| BuildError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(BuildError::UnsupportedSource(path.to_path_buf())),
    };

    let entries = file.into_entries();
    debug!(path = %path.display(), entries = entries.len(), "parsed location source");
    Ok(entries)
}

/// Collects location entries and produces the population-ordered table.
///
/// Names are normalized on insertion. When two entries normalize to the same name, the one added
/// first is kept.
#[derive(Debug, Default, Clone)]
pub struct LocationBuilder {
    entries: Vec<LocationRecord>,
}

impl LocationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder seeded with the built-in table.
    pub fn with_builtin() -> Self {
        let mut builder = Self::new();
        for record in builtin_records() {
            builder.add(record);
        }
        builder
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, mut record: LocationRecord) {
        record.name = normalize(&record.name);
        self.entries.push(record);
    }

    /// Adds an entry and one record per alias.
    pub fn add_entry(&mut self, entry: SourceEntry) -> Result<(), BuildError> {
        if normalize(&entry.name).is_empty() {
            return Err(BuildError::EmptyName);
        }

        let mut category = Category::NONE;
        for name in &entry.categories {
            category |= Category::from_name(name)
                .ok_or_else(|| BuildError::UnknownCategory(name.clone()))?;
        }

        let primary = LocationRecord {
            name: entry.name,
            longitude: entry.longitude,
            latitude: entry.latitude,
            heading: entry.heading,
            population: entry.population,
            category,
        };

        let primary_name = normalize(&primary.name);
        self.add(primary.clone());
        for alias in entry.aliases {
            let alias = normalize(&alias);
            if alias.is_empty() {
                return Err(BuildError::EmptyName);
            }
            if alias == primary_name {
                continue;
            }
            self.add(LocationRecord {
                name: alias,
                population: 0,
                ..primary.clone()
            });
        }
        Ok(())
    }

    pub fn add_source_file(&mut self, path: &Path) -> Result<usize, BuildError> {
        let entries = parse_source_file(path)?;
        let count = entries.len();
        for entry in entries {
            self.add_entry(entry)?;
        }
        Ok(count)
    }

    /// Loads every JSON/YAML source under `paths`, walking directories in name order.
    ///
    /// Files are parsed in parallel; entries are added in a deterministic order regardless.
    /// Returns the number of source entries read.
    pub fn add_source_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<usize, BuildError> {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if path.is_file() {
                files.push(path.to_path_buf());
                continue;
            }
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && is_source_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        }

        let parsed: Vec<Vec<SourceEntry>> = files
            .par_iter()
            .map(|path| parse_source_file(path))
            .collect::<Result<_, _>>()?;

        let mut count = 0;
        for entries in parsed {
            count += entries.len();
            for entry in entries {
                self.add_entry(entry)?;
            }
        }
        info!(files = files.len(), entries = count, "loaded location sources");
        Ok(count)
    }

    /// Deduplicates and sorts: population descending, then name ascending.
    pub fn finish(self) -> Vec<LocationRecord> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut records = Vec::with_capacity(self.entries.len());

        for record in self.entries {
            if record.name.is_empty() {
                warn!("skipping location with empty name");
                continue;
            }
            if !seen.insert(record.name.clone()) {
                debug!(name = %record.name, "dropping duplicate location");
                continue;
            }
            records.push(record);
        }

        records.sort_by(|a, b| {
            b.population
                .cmp(&a.population)
                .then_with(|| a.name.cmp(&b.name))
        });
        records
    }

    pub fn into_index(self) -> LocationIndex {
        LocationIndex::from_ordered(self.finish())
    }

    /// Serializes the finished table, stamped with the current time.
    pub fn build_database(self) -> Result<Vec<u8>, BuildError> {
        self.to_bytes_at(Utc::now())
    }

    pub fn to_bytes_at(self, created: DateTime<Utc>) -> Result<Vec<u8>, BuildError> {
        let records = self.finish();
        let bytes = encode_database(&records, created, created)?;
        info!(records = records.len(), bytes = bytes.len(), "encoded location database");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::database::LocationDatabase;
    use crate::testutils::create_source_dir;
    use chrono::TimeZone;

    #[test]
    fn finish_sorts_by_population_then_name() {
        let mut builder = LocationBuilder::new();
        builder.add(LocationRecord::new("b", 0.0, 0.0).with_population(5));
        builder.add(LocationRecord::new("a", 0.0, 0.0).with_population(5));
        builder.add(LocationRecord::new("c", 0.0, 0.0).with_population(9));
        builder.add(LocationRecord::new("d", 0.0, 0.0));

        let names: Vec<String> = builder.finish().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["c", "a", "b", "d"]);
    }

    #[test]
    fn first_duplicate_wins() {
        let mut builder = LocationBuilder::new();
        builder.add(LocationRecord::new("Springfield", 1.0, 1.0));
        builder.add(LocationRecord::new("springfield ", 2.0, 2.0));

        let records = builder.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].longitude, 1.0);
    }

    #[test]
    fn entry_aliases_share_coordinates() {
        let mut builder = LocationBuilder::new();
        builder
            .add_entry(SourceEntry {
                name: "New York".into(),
                longitude: -74.006,
                latitude: 40.7128,
                heading: None,
                population: 8_336_817,
                categories: vec!["city".into()],
                aliases: vec!["NYC".into()],
            })
            .unwrap();

        let index = builder.into_index();
        let alias = index.resolve_exact("nyc").unwrap();
        let primary = index.resolve_exact("new york").unwrap();
        assert_eq!(alias.longitude, primary.longitude);
        assert_eq!(alias.population, 0);
        assert!(primary.category.contains(Category::CITY));
    }

    #[test]
    fn alias_spelling_of_primary_keeps_population() {
        let mut builder = LocationBuilder::new();
        builder
            .add_entry(SourceEntry {
                name: "New York".into(),
                longitude: -74.006,
                latitude: 40.7128,
                heading: None,
                population: 8_336_817,
                categories: vec!["city".into()],
                aliases: vec!["new-york".into(), "NEW YORK".into()],
            })
            .unwrap();

        let index = builder.into_index();
        let record = index.resolve_exact("New York").unwrap();
        assert_eq!(record.population, 8_336_817);
        assert!(record.category.contains(Category::CITY));
        assert_eq!(index.top_by_population(1, usize::MAX).len(), 1);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut builder = LocationBuilder::new();
        let err = builder
            .add_entry(SourceEntry {
                name: "x".into(),
                longitude: 0.0,
                latitude: 0.0,
                heading: None,
                population: 0,
                categories: vec!["moon".into()],
                aliases: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, BuildError::UnknownCategory(c) if c == "moon"));
    }

    #[test]
    fn loads_json_and_yaml_sources_from_directory() {
        let dir = create_source_dir();
        let mut builder = LocationBuilder::new();
        let count = builder.add_source_paths(&[dir.path()]).unwrap();
        assert_eq!(count, 3);

        let index = builder.into_index();
        assert!(index.resolve_exact("Lisbon").is_some());
        assert!(index.resolve_exact("Porto").is_some());
        assert_eq!(index.resolve_exact("Belem Tower").unwrap().heading, Some(180.0));
    }

    #[test]
    fn malformed_source_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = LocationBuilder::new().add_source_paths(&[&path]).unwrap_err();
        assert!(matches!(err, BuildError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn database_bytes_load_back_as_index() {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bytes = LocationBuilder::with_builtin().to_bytes_at(stamp).unwrap();
        let db = LocationDatabase::from_bytes(&bytes).unwrap();
        assert_eq!(db.header().record_count as usize, db.records().count());

        let index = LocationIndex::from_database(&db).unwrap();
        assert_eq!(index.len(), LocationIndex::builtin().len());
        assert_eq!(
            index.resolve_exact("paris"),
            LocationIndex::builtin().resolve_exact("paris")
        );
    }
}
