pub mod fingerprint;
pub mod location;
pub mod reader;
pub mod scanner;
#[cfg(test)]
mod testutils;
pub mod writer;

pub use fingerprint::{database_fingerprint, hash_bytes, hash_file};
pub use location::{
    levenshtein, normalize, BuildError, Category, DatabaseError, DatabaseHeader, FuzzyMatch,
    IndexError, LocationBuilder, LocationDatabase, LocationIndex, LocationRecord, RecordView,
    SourceEntry,
};
pub use reader::{read_array, read_bool, read_integer, read_number, read_object, read_string, RawField};
pub use writer::{
    error_envelope, escape_string, escape_to_string, success_envelope, tool_result, BoundedWriter,
};
