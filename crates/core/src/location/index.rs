use std::collections::HashSet;
use std::sync::LazyLock;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::database::LocationDatabase;
use super::normalize::{levenshtein, normalize};
use super::{LocationBuilder, LocationRecord};

#[derive(Error, Debug, PartialEq)]
pub enum IndexError {
    #[error("duplicate location name '{0}'")]
    DuplicateName(String),
    #[error("location name '{name}' is not normalized (expected '{normalized}')")]
    UnnormalizedName { name: String, normalized: String },
    #[error("location '{name}' at position {position} has more population than its predecessor")]
    PopulationOrder { name: String, position: usize },
}

/// A fuzzy hit together with its edit distance from the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuzzyMatch<'a> {
    pub record: &'a LocationRecord,
    pub distance: usize,
}

/// Read-only location table.
///
/// Records are stored in descending population order; `by_name` holds record positions sorted
/// by name for exact lookup.
#[derive(Debug, Clone)]
pub struct LocationIndex {
    records: Vec<LocationRecord>,
    by_name: Vec<usize>,
}

static BUILTIN: LazyLock<LocationIndex> = LazyLock::new(|| {
    let index = LocationBuilder::with_builtin().into_index();
    info!(locations = index.len(), "built-in location index ready");
    index
});

impl LocationIndex {
    /// Validates that names are normalized and unique, and that population never increases along
    /// the table.
    pub fn new(records: Vec<LocationRecord>) -> Result<Self, IndexError> {
        for (position, pair) in records.windows(2).enumerate() {
            if pair[1].population > pair[0].population {
                return Err(IndexError::PopulationOrder {
                    name: pair[1].name.clone(),
                    position: position + 1,
                });
            }
        }

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            let normalized = normalize(&record.name);
            if normalized != record.name {
                return Err(IndexError::UnnormalizedName {
                    name: record.name.clone(),
                    normalized,
                });
            }
            if !seen.insert(record.name.as_str()) {
                return Err(IndexError::DuplicateName(record.name.clone()));
            }
        }

        Ok(Self::from_ordered(records))
    }

    /// Builds the name index over records the caller already validated.
    pub(crate) fn from_ordered(records: Vec<LocationRecord>) -> Self {
        let mut by_name: Vec<usize> = (0..records.len()).collect();
        by_name.sort_by(|a, b| records[*a].name.cmp(&records[*b].name));
        Self { records, by_name }
    }

    /// Copies every record out of a loaded database and validates the result.
    pub fn from_database(db: &LocationDatabase<'_>) -> Result<Self, IndexError> {
        let records: Vec<LocationRecord> = db.records().map(|view| view.to_record()).collect();
        let index = Self::new(records)?;
        info!(locations = index.len(), "location index loaded from database");
        Ok(index)
    }

    /// The shared built-in table, built on first use.
    pub fn builtin() -> &'static LocationIndex {
        &BUILTIN
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in storage (population) order.
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocationRecord> {
        self.records.iter()
    }

    /// Exact match on the normalized name.
    pub fn resolve_exact(&self, name: &str) -> Option<&LocationRecord> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        self.by_name
            .binary_search_by(|pos| self.records[*pos].name.as_str().cmp(&key))
            .ok()
            .map(|slot| &self.records[self.by_name[slot]])
    }

    /// Closest record within `max_distance` edits. Ties go to the earlier record.
    pub fn resolve_fuzzy(&self, name: &str, max_distance: usize) -> Option<FuzzyMatch<'_>> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }

        let mut best: Option<FuzzyMatch<'_>> = None;
        for record in &self.records {
            let distance = levenshtein(&key, &record.name, Some(max_distance));
            if distance > max_distance {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(FuzzyMatch { record, distance });
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Every record within `max_distance` edits, closest first, at most `limit` of them.
    pub fn search_fuzzy_ranked(
        &self,
        name: &str,
        max_distance: usize,
        limit: usize,
    ) -> Vec<FuzzyMatch<'_>> {
        let key = normalize(name);
        if key.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut matches: Vec<FuzzyMatch<'_>> = self
            .records
            .iter()
            .filter_map(|record| {
                let distance = levenshtein(&key, &record.name, Some(max_distance));
                (distance <= max_distance).then_some(FuzzyMatch { record, distance })
            })
            .collect();
        // stable: equal distances keep storage order
        matches.sort_by_key(|m| m.distance);
        matches.truncate(limit);
        matches
    }

    /// Records whose name starts with the normalized `prefix`, in storage order.
    pub fn search_prefix(&self, prefix: &str, limit: usize) -> Vec<&LocationRecord> {
        let key = normalize(prefix);
        self.records
            .iter()
            .filter(|r| r.name.starts_with(&key))
            .take(limit)
            .collect()
    }

    /// Records whose name contains the normalized `needle`, in storage order.
    pub fn search_substring(&self, needle: &str, limit: usize) -> Vec<&LocationRecord> {
        let key = normalize(needle);
        self.records
            .iter()
            .filter(|r| r.name.contains(&key))
            .take(limit)
            .collect()
    }

    /// The first `limit` records with at least `min_population`.
    ///
    /// Relies on storage order; stops at the first record below the threshold.
    pub fn top_by_population(&self, min_population: u32, limit: usize) -> Vec<&LocationRecord> {
        self.records
            .iter()
            .take_while(|r| r.population >= min_population)
            .take(limit)
            .collect()
    }

    /// Number of records with a known (non-zero) population.
    pub fn populated_count(&self) -> usize {
        self.records.partition_point(|r| r.population > 0)
    }

    /// Exact lookup, then the closest fuzzy match when `max_distance` allows one.
    pub fn resolve(&self, name: &str, max_distance: usize) -> Option<&LocationRecord> {
        if let Some(record) = self.resolve_exact(name) {
            return Some(record);
        }
        if max_distance == 0 {
            return None;
        }
        let hit = self.resolve_fuzzy(name, max_distance)?;
        debug!(
            query = name,
            matched = %hit.record.name,
            distance = hit.distance,
            "fuzzy location match"
        );
        Some(hit.record)
    }
}
