mod meal;

pub use meal::{Meal, ValidationError};
