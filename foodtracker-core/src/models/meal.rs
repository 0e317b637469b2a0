use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised when a meal's fields break its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Meal name cannot be empty")]
    EmptyName,

    #[error("Rating cannot be negative, got {0}")]
    NegativeRating(i64),
}

/// A single meal entry.
///
/// Fields are only reachable through accessors, so a `Meal` that exists is
/// always valid: its name is non-empty and its rating is at least zero.
/// Editing a meal means building a new one with the `with_*` methods, each of
/// which re-runs validation.
///
/// `Meal` also implements serde's traits for embedders that want their own
/// format. Deserializing goes through the same validation as [`Meal::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MealFields")]
pub struct Meal {
    name: String,
    #[serde(with = "serde_bytes")]
    photo: Option<Vec<u8>>,
    rating: i64,
}

/// Unvalidated field set used when deserializing with serde.
#[derive(Deserialize)]
struct MealFields {
    name: String,
    #[serde(default, with = "serde_bytes")]
    photo: Option<Vec<u8>>,
    #[serde(default)]
    rating: i64,
}

impl TryFrom<MealFields> for Meal {
    type Error = ValidationError;

    fn try_from(fields: MealFields) -> Result<Self, Self::Error> {
        Meal::new(fields.name, fields.photo, fields.rating)
    }
}

impl Meal {
    /// Builds a meal, failing if `name` is empty or `rating` is negative.
    ///
    /// No upper bound is placed on `rating`; the number of stars offered is
    /// decided by whoever produces the value.
    pub fn new(
        name: impl Into<String>,
        photo: Option<Vec<u8>>,
        rating: i64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if rating < 0 {
            return Err(ValidationError::NegativeRating(rating));
        }

        Ok(Self {
            name,
            photo,
            rating,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn photo(&self) -> Option<&[u8]> {
        self.photo.as_deref()
    }

    pub fn rating(&self) -> i64 {
        self.rating
    }

    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    pub fn with_name(self, name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(name, self.photo, self.rating)
    }

    pub fn with_photo(self, photo: Option<Vec<u8>>) -> Self {
        Self { photo, ..self }
    }

    pub fn with_rating(self, rating: i64) -> Result<Self, ValidationError> {
        Self::new(self.name, self.photo, rating)
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;
        writeln!(f, "Rating: {}", self.rating)?;

        match &self.photo {
            Some(photo) => writeln!(f, "Photo: {} bytes", photo.len())?,
            None => writeln!(f, "Photo: none")?,
        }

        Ok(())
    }
}
