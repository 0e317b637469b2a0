//! FoodTracker Core Library
//!
//! Meal records, their Automerge archive, and the ordered collection that
//! keeps the two in step.

pub mod archive;
pub mod collection;
pub mod models;

pub use archive::{ArchiveError, DecodeError, EncodeError, MealArchive, ARCHIVE_FILENAME};
pub use collection::{CollectionError, MealCollection};
pub use models::{Meal, ValidationError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
