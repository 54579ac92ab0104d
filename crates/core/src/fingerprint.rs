use blake3::Hasher;

use crate::location::LocationDatabase;

pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}

pub fn hash_file(path: &std::path::Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(hash_bytes(&content))
}

/// Content fingerprint of a location database.
///
/// Covers the format version, flags and every record, but not the timestamps, so rebuilding the
/// same table yields the same fingerprint.
pub fn database_fingerprint(db: &LocationDatabase<'_>) -> String {
    let header = db.header();
    let mut hasher = Hasher::new();
    hasher.update(&header.version.to_le_bytes());
    hasher.update(&header.flags.to_le_bytes());
    hasher.update(&header.record_count.to_le_bytes());
    hasher.update(db.record_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationBuilder;
    use chrono::{TimeZone, Utc};

    #[test]
    fn consistent_hash() {
        assert_eq!(hash_bytes(b"GLOBELOC"), hash_bytes(b"GLOBELOC"));
        assert_ne!(hash_bytes(b"a"), hash_bytes(b"b"));
        assert_eq!(hash_bytes(b"test").len(), 64);
    }

    #[test]
    fn fingerprint_ignores_build_time() {
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let a = LocationBuilder::with_builtin().to_bytes_at(early).unwrap();
        let b = LocationBuilder::with_builtin().to_bytes_at(late).unwrap();
        assert_ne!(hash_bytes(&a), hash_bytes(&b));

        let a = LocationDatabase::from_bytes(&a).unwrap();
        let b = LocationDatabase::from_bytes(&b).unwrap();
        assert_eq!(database_fingerprint(&a), database_fingerprint(&b));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let full = LocationBuilder::with_builtin().to_bytes_at(stamp).unwrap();
        let empty = LocationBuilder::new().to_bytes_at(stamp).unwrap();
        let full = LocationDatabase::from_bytes(&full).unwrap();
        let empty = LocationDatabase::from_bytes(&empty).unwrap();
        assert_ne!(database_fingerprint(&full), database_fingerprint(&empty));
    }
}
