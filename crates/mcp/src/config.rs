use std::path::{Path, PathBuf};

use anyhow::Context;
use globe_mcp_core::{LocationDatabase, LocationIndex};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_RESPONSE_CAPACITY: usize = 65536;
pub const DEFAULT_FUZZY_MAX_DISTANCE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Binary location database; the built-in table is used when unset.
    pub database: Option<PathBuf>,
    /// Upper bound on a single response, in bytes.
    pub response_capacity: usize,
    /// Edit distance allowed when a place name has no exact match. Zero disables fuzzy matching.
    pub fuzzy_max_distance: usize,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database: None,
            response_capacity: DEFAULT_RESPONSE_CAPACITY,
            fuzzy_max_distance: DEFAULT_FUZZY_MAX_DISTANCE,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(Into::into)
    }

    /// Loads the configured database, or copies the built-in table.
    pub fn open_index(&self) -> anyhow::Result<LocationIndex> {
        let Some(path) = &self.database else {
            return Ok(LocationIndex::builtin().clone());
        };

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read database {}", path.display()))?;
        let db = LocationDatabase::from_bytes(&bytes)
            .with_context(|| format!("invalid database {}", path.display()))?;
        let index = LocationIndex::from_database(&db)?;
        info!(path = %path.display(), locations = index.len(), "opened location database");
        Ok(index)
    }
}
