//! Fixed-layout binary location database.
//!
//! ```text
//! header (64 bytes, little-endian)
//!   0   magic          [u8; 8]   "GLOBELOC"
//!   8   version        u32
//!   12  flags          u32
//!   16  record_count   u32
//!   20  reserved       u32
//!   24  created        i64       unix seconds
//!   32  modified       i64       unix seconds
//!   40  reserved       [u8; 24]
//!
//! record (148 bytes, little-endian)
//!   0   name           [u8; 128] NUL-terminated UTF-8
//!   128 longitude      f32
//!   132 latitude       f32
//!   136 heading        f32       -1.0 when unset
//!   140 population     u32
//!   144 category       u16
//!   146 reserved       u16
//! ```
//!
//! The layout is fixed so a host runtime can read records straight out of the buffer.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{Category, LocationRecord};

pub const MAGIC: [u8; 8] = *b"GLOBELOC";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 64;
pub const RECORD_SIZE: usize = 148;
pub const NAME_SIZE: usize = 128;

/// Records are stored in descending population order.
pub const FLAG_POPULATION_ORDER: u32 = 0x1;

const HEADING_UNSET: f32 = -1.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("database truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("bad magic signature")]
    BadMagic,

    #[error("unsupported database version {0}")]
    UnsupportedVersion(u32),

    #[error("database length {actual} does not match {expected} bytes for the declared records")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("record {0} name is not NUL-terminated")]
    NameNotTerminated(usize),

    #[error("record {0} name is not valid UTF-8")]
    InvalidName(usize),

    #[error("location name '{0}' does not fit in {NAME_SIZE} bytes")]
    NameTooLong(String),

    #[error("{0} records exceed the format's record count")]
    TooManyRecords(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseHeader {
    pub version: u32,
    pub flags: u32,
    pub record_count: u32,
    pub created: i64,
    pub modified: i64,
}

impl DatabaseHeader {
    pub fn new(record_count: u32, created: DateTime<Utc>, modified: DateTime<Utc>) -> Self {
        Self {
            version: FORMAT_VERSION,
            flags: FLAG_POPULATION_ORDER,
            record_count,
            created: created.timestamp(),
            modified: modified.timestamp(),
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..8].copy_from_slice(&MAGIC);
        out[8..12].copy_from_slice(&self.version.to_le_bytes());
        out[12..16].copy_from_slice(&self.flags.to_le_bytes());
        out[16..20].copy_from_slice(&self.record_count.to_le_bytes());
        out[24..32].copy_from_slice(&self.created.to_le_bytes());
        out[32..40].copy_from_slice(&self.modified.to_le_bytes());
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, DatabaseError> {
        if bytes.len() < HEADER_SIZE {
            return Err(DatabaseError::Truncated {
                needed: HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0..8] != MAGIC {
            return Err(DatabaseError::BadMagic);
        }

        let header = Self {
            version: u32_at(bytes, 8),
            flags: u32_at(bytes, 12),
            record_count: u32_at(bytes, 16),
            created: i64_at(bytes, 24),
            modified: i64_at(bytes, 32),
        };
        if header.version != FORMAT_VERSION {
            return Err(DatabaseError::UnsupportedVersion(header.version));
        }
        Ok(header)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created, 0)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.modified, 0)
    }

    /// Total buffer length implied by `record_count`, or `None` when it does not fit in `usize`.
    pub fn expected_len(&self) -> Option<usize> {
        usize::try_from(self.record_count)
            .ok()?
            .checked_mul(RECORD_SIZE)?
            .checked_add(HEADER_SIZE)
    }
}

fn array_at<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(array_at(bytes, at))
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(array_at(bytes, at))
}

fn i64_at(bytes: &[u8], at: usize) -> i64 {
    i64::from_le_bytes(array_at(bytes, at))
}

fn f32_at(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes(array_at(bytes, at))
}

/// A validated database borrowed from a byte buffer.
#[derive(Debug, Clone, Copy)]
pub struct LocationDatabase<'a> {
    header: DatabaseHeader,
    records: &'a [u8],
}

impl<'a> LocationDatabase<'a> {
    /// Checks the header, the total length and every record name.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, DatabaseError> {
        let header = DatabaseHeader::parse(bytes)?;
        let expected = header.expected_len().unwrap_or(usize::MAX);
        if bytes.len() != expected {
            return Err(DatabaseError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        let records = &bytes[HEADER_SIZE..];
        for (index, chunk) in records.chunks_exact(RECORD_SIZE).enumerate() {
            let name = &chunk[..NAME_SIZE];
            let end = name
                .iter()
                .position(|b| *b == 0)
                .ok_or(DatabaseError::NameNotTerminated(index))?;
            std::str::from_utf8(&name[..end]).map_err(|_| DatabaseError::InvalidName(index))?;
        }

        Ok(Self { header, records })
    }

    pub fn header(&self) -> &DatabaseHeader {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.header.record_count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw record array following the header.
    pub fn record_bytes(&self) -> &'a [u8] {
        self.records
    }

    pub fn record(&self, index: usize) -> Option<RecordView<'a>> {
        let start = index.checked_mul(RECORD_SIZE)?;
        let bytes = self.records.get(start..start.checked_add(RECORD_SIZE)?)?;
        Some(RecordView { bytes })
    }

    pub fn records(self) -> impl Iterator<Item = RecordView<'a>> {
        self.records
            .chunks_exact(RECORD_SIZE)
            .map(|bytes| RecordView { bytes })
    }
}

/// Zero-copy view of one 148-byte record.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    bytes: &'a [u8],
}

impl<'a> RecordView<'a> {
    pub fn name(&self) -> &'a str {
        let bytes: &'a [u8] = self.bytes;
        let raw = &bytes[..NAME_SIZE];
        let end = raw.iter().position(|b| *b == 0).unwrap_or(NAME_SIZE);
        // validated in `LocationDatabase::from_bytes`
        std::str::from_utf8(&raw[..end]).unwrap_or_default()
    }

    pub fn longitude(&self) -> f32 {
        f32_at(self.bytes, 128)
    }

    pub fn latitude(&self) -> f32 {
        f32_at(self.bytes, 132)
    }

    pub fn heading(&self) -> Option<f32> {
        let heading = f32_at(self.bytes, 136);
        (heading >= 0.0).then_some(heading)
    }

    pub fn population(&self) -> u32 {
        u32_at(self.bytes, 140)
    }

    pub fn category(&self) -> Category {
        Category::from_bits(u16_at(self.bytes, 144))
    }

    pub fn to_record(&self) -> LocationRecord {
        LocationRecord {
            name: self.name().to_string(),
            longitude: self.longitude(),
            latitude: self.latitude(),
            heading: self.heading(),
            population: self.population(),
            category: self.category(),
        }
    }
}

/// Appends the 148-byte encoding of `record` to `out`.
pub fn encode_record(record: &LocationRecord, out: &mut Vec<u8>) -> Result<(), DatabaseError> {
    let name = record.name.as_bytes();
    if name.len() >= NAME_SIZE {
        return Err(DatabaseError::NameTooLong(record.name.clone()));
    }

    let mut buf = [0u8; RECORD_SIZE];
    buf[..name.len()].copy_from_slice(name);
    buf[128..132].copy_from_slice(&record.longitude.to_le_bytes());
    buf[132..136].copy_from_slice(&record.latitude.to_le_bytes());
    let heading = record.heading.unwrap_or(HEADING_UNSET);
    buf[136..140].copy_from_slice(&heading.to_le_bytes());
    buf[140..144].copy_from_slice(&record.population.to_le_bytes());
    buf[144..146].copy_from_slice(&record.category.bits().to_le_bytes());
    out.extend_from_slice(&buf);
    Ok(())
}

/// Serializes a complete database: header followed by every record in order.
pub fn encode_database(
    records: &[LocationRecord],
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
) -> Result<Vec<u8>, DatabaseError> {
    let count =
        u32::try_from(records.len()).map_err(|_| DatabaseError::TooManyRecords(records.len()))?;
    let header = DatabaseHeader::new(count, created, modified);

    let mut out = Vec::with_capacity(header.expected_len().unwrap_or_default());
    out.extend_from_slice(&header.to_bytes());
    for record in records {
        encode_record(record, &mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn records() -> Vec<LocationRecord> {
        vec![
            LocationRecord::new("tokyo", 139.6917, 35.6895)
                .with_population(13_960_000)
                .with_category(Category::CITY),
            LocationRecord::new("statue of liberty", -74.0445, 40.6892)
                .with_heading(225.0)
                .with_category(Category::LANDMARK),
        ]
    }

    #[test]
    fn header_layout_is_bit_exact() {
        let header = DatabaseHeader::new(3, stamp(), stamp());
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..8], b"GLOBELOC");
        assert_eq!(&bytes[8..12], &1u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &3u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &[0; 4]);
        assert_eq!(&bytes[24..32], &stamp().timestamp().to_le_bytes());
        assert_eq!(&bytes[40..64], &[0; 24]);
        assert_eq!(DatabaseHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn record_layout_is_bit_exact() {
        let mut out = Vec::new();
        encode_record(&records()[1], &mut out).unwrap();
        assert_eq!(out.len(), RECORD_SIZE);
        assert_eq!(&out[..17], b"statue of liberty");
        assert_eq!(out[17], 0);
        assert_eq!(&out[128..132], &(-74.0445f32).to_le_bytes());
        assert_eq!(&out[136..140], &225.0f32.to_le_bytes());
        assert_eq!(&out[144..146], &Category::LANDMARK.bits().to_le_bytes());
        assert_eq!(&out[146..148], &[0, 0]);
    }

    #[test]
    fn loaded_count_matches_iterable_records() {
        let bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 2 * RECORD_SIZE);

        let db = LocationDatabase::from_bytes(&bytes).unwrap();
        assert_eq!(db.header().record_count as usize, db.records().count());
        assert_eq!(db.header().created_at(), Some(stamp()));

        let decoded: Vec<LocationRecord> = db.records().map(|r| r.to_record()).collect();
        assert_eq!(decoded, records());
        assert_eq!(db.record(1).unwrap().name(), "statue of liberty");
        assert!(db.record(2).is_none());
    }

    #[test]
    fn unset_heading_round_trips_as_none() {
        let bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        let db = LocationDatabase::from_bytes(&bytes).unwrap();
        assert_eq!(db.record(0).unwrap().heading(), None);
        assert_eq!(&bytes[HEADER_SIZE + 136..HEADER_SIZE + 140], &(-1.0f32).to_le_bytes());
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        bytes[0] = b'X';
        assert_eq!(
            LocationDatabase::from_bytes(&bytes).unwrap_err(),
            DatabaseError::BadMagic
        );
    }

    #[test]
    fn rejects_short_and_mismatched_buffers() {
        assert!(matches!(
            LocationDatabase::from_bytes(&[0u8; 10]),
            Err(DatabaseError::Truncated { needed: 64, actual: 10 })
        ));

        let bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        assert!(matches!(
            LocationDatabase::from_bytes(&bytes[..bytes.len() - 1]),
            Err(DatabaseError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn oversized_record_count_is_a_length_mismatch() {
        let mut bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            LocationDatabase::from_bytes(&bytes),
            Err(DatabaseError::LengthMismatch { .. })
        ));

        let header = DatabaseHeader::parse(&bytes).unwrap();
        assert_eq!(header.record_count, u32::MAX);
        let expected = (u32::MAX as usize)
            .checked_mul(RECORD_SIZE)
            .and_then(|n| n.checked_add(HEADER_SIZE));
        assert_eq!(header.expected_len(), expected);
    }

    #[test]
    fn record_lookup_past_the_end_is_none() {
        let bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        let db = LocationDatabase::from_bytes(&bytes).unwrap();
        assert!(db.record(db.len()).is_none());
        assert!(db.record(usize::MAX / RECORD_SIZE).is_none());
        assert!(db.record(usize::MAX).is_none());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        bytes[8..12].copy_from_slice(&9u32.to_le_bytes());
        assert_eq!(
            LocationDatabase::from_bytes(&bytes).unwrap_err(),
            DatabaseError::UnsupportedVersion(9)
        );
    }

    #[test]
    fn rejects_unterminated_name() {
        let mut bytes = encode_database(&records(), stamp(), stamp()).unwrap();
        bytes[HEADER_SIZE..HEADER_SIZE + NAME_SIZE].fill(b'a');
        assert_eq!(
            LocationDatabase::from_bytes(&bytes).unwrap_err(),
            DatabaseError::NameNotTerminated(0)
        );
    }

    #[test]
    fn long_names_are_refused() {
        let record = LocationRecord::new("x".repeat(NAME_SIZE), 0.0, 0.0);
        assert!(matches!(
            encode_record(&record, &mut Vec::new()),
            Err(DatabaseError::NameTooLong(_))
        ));
    }
}
