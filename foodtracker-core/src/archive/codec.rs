//! Field-by-field encoding of meals into Automerge documents.

use automerge::{
    transaction::Transactable, AutoCommit, AutomergeError, ObjId, ObjType, ReadDoc, ScalarValue,
    Value, ROOT,
};
use thiserror::Error;

use crate::models::{Meal, ValidationError};

const MEALS_KEY: &str = "meals";
const NAME_KEY: &str = "name";
const PHOTO_KEY: &str = "photo";
const RATING_KEY: &str = "rating";

/// Errors raised while turning stored bytes back into meals.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Automerge error: {0}")]
    Automerge(#[from] AutomergeError),

    #[error("Meal record has no name")]
    MissingName,

    #[error("Meal record is invalid: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Archive has no 'meals' list")]
    MissingList,

    #[error("Archive entry {0} is not a meal record")]
    NotARecord(usize),

    #[error("Archive entry {position}: {source}")]
    Entry {
        position: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

/// Error raised while writing meals into an Automerge document.
#[derive(Debug, Error)]
#[error("Failed to encode meals: {0}")]
pub struct EncodeError(#[from] AutomergeError);

/// Writes a meal's fields into the map at `obj`.
///
/// The photo key is only written when the meal has a photo.
pub fn write_meal(doc: &mut AutoCommit, obj: &ObjId, meal: &Meal) -> Result<(), EncodeError> {
    doc.put(obj, NAME_KEY, meal.name())?;
    if let Some(photo) = meal.photo() {
        doc.put(obj, PHOTO_KEY, ScalarValue::Bytes(photo.to_vec()))?;
    }
    doc.put(obj, RATING_KEY, meal.rating())?;
    Ok(())
}

/// Reads a meal from the map at `obj`.
///
/// A missing or non-text name fails the read. A rating that is missing or not
/// an integer reads as 0, and a missing photo reads as no photo.
pub fn read_meal(doc: &AutoCommit, obj: &ObjId) -> Result<Meal, DecodeError> {
    let name = match doc.get(obj, NAME_KEY)? {
        Some((value, _)) => value.into_string().map_err(|_| DecodeError::MissingName)?,
        None => return Err(DecodeError::MissingName),
    };

    let photo = match doc.get(obj, PHOTO_KEY)? {
        Some((Value::Scalar(scalar), _)) => match scalar.as_ref() {
            ScalarValue::Bytes(bytes) => Some(bytes.clone()),
            _ => None,
        },
        _ => None,
    };

    let rating = match doc.get(obj, RATING_KEY)? {
        Some((Value::Scalar(scalar), _)) => match scalar.as_ref() {
            ScalarValue::Int(i) => *i,
            ScalarValue::Uint(u) => i64::try_from(*u).unwrap_or(0),
            _ => 0,
        },
        _ => 0,
    };

    Ok(Meal::new(name, photo, rating)?)
}

/// Encodes an ordered list of meals as a complete archive document.
pub fn encode_archive(meals: &[Meal]) -> Result<Vec<u8>, EncodeError> {
    let mut doc = AutoCommit::new();
    let list = doc.put_object(ROOT, MEALS_KEY, ObjType::List)?;

    for (i, meal) in meals.iter().enumerate() {
        let obj = doc.insert_object(&list, i, ObjType::Map)?;
        write_meal(&mut doc, &obj, meal)?;
    }

    Ok(doc.save())
}

/// Decodes a complete archive document.
///
/// Any entry that fails to decode fails the whole archive, so positions are
/// never silently shifted by a dropped record.
pub fn decode_archive(bytes: &[u8]) -> Result<Vec<Meal>, DecodeError> {
    let doc = AutoCommit::load(bytes)?;

    let list = match doc.get(ROOT, MEALS_KEY)? {
        Some((Value::Object(ObjType::List), list)) => list,
        _ => return Err(DecodeError::MissingList),
    };

    let len = doc.length(&list);
    let mut meals = Vec::with_capacity(len);

    for i in 0..len {
        let obj = match doc.get(&list, i)? {
            Some((Value::Object(ObjType::Map), obj)) => obj,
            _ => return Err(DecodeError::NotARecord(i)),
        };

        let meal = read_meal(&doc, &obj).map_err(|source| DecodeError::Entry {
            position: i,
            source: Box::new(source),
        })?;
        meals.push(meal);
    }

    Ok(meals)
}

impl Meal {
    /// Serializes this meal as a standalone Automerge document.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut doc = AutoCommit::new();
        write_meal(&mut doc, &ROOT, self)?;
        Ok(doc.save())
    }

    /// Reads a meal back from [`Meal::to_bytes`] output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let doc = AutoCommit::load(bytes)?;
        read_meal(&doc, &ROOT)
    }
}
