//! Ordered, archive-backed collection of meals.
//!
//! The collection is the single owner of the session's meals. Every mutation
//! saves the full list through its [`MealArchive`] before returning. A failed
//! save is reported as [`CollectionError::Unsaved`] but the in-memory change
//! is kept: the collection stays the source of truth for the session.

use thiserror::Error;

use crate::archive::{ArchiveError, MealArchive};
use crate::models::Meal;

/// Errors returned by collection mutations.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The position does not refer to a meal. Nothing was changed.
    #[error("No meal at position {position} (collection has {len})")]
    IndexOutOfBounds { position: usize, len: usize },

    /// The change was applied in memory but could not be saved.
    #[error("Meal at position {position} changed but was not saved: {source}")]
    Unsaved {
        position: usize,
        #[source]
        source: ArchiveError,
    },
}

/// Meals in insertion order, saved on every change.
#[derive(Debug)]
pub struct MealCollection {
    archive: MealArchive,
    meals: Vec<Meal>,
}

impl MealCollection {
    /// Loads the collection from `archive`.
    ///
    /// If the archive file doesn't exist, returns an empty collection.
    /// If it can't be read or decoded, logs a warning and returns an empty
    /// collection.
    pub fn load(archive: MealArchive) -> Self {
        let meals = match archive.load() {
            Ok(Some(meals)) => {
                tracing::info!("Loaded {} meal(s)", meals.len());
                meals
            }
            Ok(None) => {
                tracing::info!(
                    "No archive at {}, starting with 0 meals",
                    archive.path().display()
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to load meals, starting empty: {}", e);
                Vec::new()
            }
        };

        Self { archive, meals }
    }

    /// Returns the archive this collection saves to.
    pub fn archive(&self) -> &MealArchive {
        &self.archive
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn get(&self, position: usize) -> Option<&Meal> {
        self.meals.get(position)
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Meal> {
        self.meals.iter()
    }

    /// Adds a meal at the end and returns its position.
    pub fn append(&mut self, meal: Meal) -> Result<usize, CollectionError> {
        let position = self.meals.len();
        self.meals.push(meal);
        self.persist(position)?;
        Ok(position)
    }

    /// Replaces the meal at `position`, leaving every other position as is.
    pub fn replace_at(&mut self, position: usize, meal: Meal) -> Result<(), CollectionError> {
        self.check_bounds(position)?;
        self.meals[position] = meal;
        self.persist(position)
    }

    /// Removes the meal at `position`; later meals move down by one.
    pub fn remove_at(&mut self, position: usize) -> Result<(), CollectionError> {
        self.check_bounds(position)?;
        let removed = self.meals.remove(position);
        tracing::debug!("Removed meal '{}' at position {}", removed.name(), position);
        self.persist(position)
    }

    /// Saves an edited meal.
    ///
    /// With a `selected` position the meal replaces the one there; without
    /// one it is appended. Returns the position the meal now occupies.
    pub fn upsert(
        &mut self,
        meal: Meal,
        selected: Option<usize>,
    ) -> Result<usize, CollectionError> {
        match selected {
            Some(position) => {
                self.replace_at(position, meal)?;
                Ok(position)
            }
            None => self.append(meal),
        }
    }

    /// Saves the current meals to the archive.
    pub fn save(&self) -> Result<(), ArchiveError> {
        self.archive.save(&self.meals)
    }

    fn check_bounds(&self, position: usize) -> Result<(), CollectionError> {
        if position < self.meals.len() {
            Ok(())
        } else {
            Err(CollectionError::IndexOutOfBounds {
                position,
                len: self.meals.len(),
            })
        }
    }

    fn persist(&self, position: usize) -> Result<(), CollectionError> {
        self.save().map_err(|source| {
            tracing::debug!("Failed to save meals: {}", source);
            CollectionError::Unsaved { position, source }
        })
    }
}

impl<'a> IntoIterator for &'a MealCollection {
    type Item = &'a Meal;
    type IntoIter = std::slice::Iter<'a, Meal>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
