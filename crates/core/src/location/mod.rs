//! Place-name resolution over a static, read-only location table.

mod builder;
mod builtin;
pub mod database;
mod index;
mod normalize;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

pub use builder::{BuildError, LocationBuilder, SourceEntry};
pub use builtin::builtin_records;
pub use database::{DatabaseError, DatabaseHeader, LocationDatabase, RecordView};
pub use index::{FuzzyMatch, IndexError, LocationIndex};
pub use normalize::{levenshtein, normalize};

/// Bit-flag classification of a location entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(u16);

impl Category {
    pub const NONE: Self = Self(0);
    pub const STATE: Self = Self(1 << 0);
    pub const CITY: Self = Self(1 << 1);
    pub const LANDMARK: Self = Self(1 << 2);
    pub const COUNTRY: Self = Self(1 << 3);
    pub const REGION: Self = Self(1 << 4);
    pub const AIRPORT: Self = Self(1 << 5);

    const NAMED: [(Self, &'static str); 6] = [
        (Self::STATE, "state"),
        (Self::CITY, "city"),
        (Self::LANDMARK, "landmark"),
        (Self::COUNTRY, "country"),
        (Self::REGION, "region"),
        (Self::AIRPORT, "airport"),
    ];

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::NAMED
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, n)| *n)
            .collect()
    }
}

impl BitOr for Category {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Category {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

/// One entry of the location table. `name` is the normalized lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub longitude: f32,
    pub latitude: f32,
    /// Degrees clockwise from north; `None` when the entry has no preferred orientation.
    pub heading: Option<f32>,
    /// Zero when unknown.
    pub population: u32,
    pub category: Category,
}

impl LocationRecord {
    pub fn new(name: impl Into<String>, longitude: f32, latitude: f32) -> Self {
        Self {
            name: name.into(),
            longitude,
            latitude,
            heading: None,
            population: 0,
            category: Category::NONE,
        }
    }

    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn with_population(mut self, population: u32) -> Self {
        self.population = population;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_flags_combine() {
        let both = Category::CITY | Category::AIRPORT;
        assert!(both.contains(Category::CITY));
        assert!(both.contains(Category::AIRPORT));
        assert!(!both.contains(Category::STATE));
        assert_eq!(both.to_string(), "city|airport");
        assert_eq!(Category::NONE.to_string(), "none");
    }

    #[test]
    fn category_from_name() {
        assert_eq!(Category::from_name(" Landmark "), Some(Category::LANDMARK));
        assert_eq!(Category::from_name("planet"), None);
    }
}
