//! Star rating control.
//!
//! Turns star taps into the plain integer rating a meal stores. Tapping the
//! star that matches the current rating clears it back to zero.

use std::fmt;

const FILLED_STAR: char = '★';
const EMPTY_STAR: char = '☆';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarOutOfRange {
    pub star: u32,
    pub star_count: u32,
}

impl fmt::Display for StarOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Star {} is out of range. Valid stars: 1-{}",
            self.star, self.star_count
        )
    }
}

impl std::error::Error for StarOutOfRange {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingControl {
    star_count: u32,
    rating: i64,
}

impl RatingControl {
    pub fn new(star_count: u32, rating: i64) -> Self {
        Self { star_count, rating }
    }

    pub fn rating(&self) -> i64 {
        self.rating
    }

    pub fn star_count(&self) -> u32 {
        self.star_count
    }

    /// Applies a tap on `star` (1-based) and returns the new rating.
    pub fn tap(&mut self, star: u32) -> Result<i64, StarOutOfRange> {
        if star == 0 || star > self.star_count {
            return Err(StarOutOfRange {
                star,
                star_count: self.star_count,
            });
        }

        let selected = i64::from(star);
        self.rating = if selected == self.rating { 0 } else { selected };
        Ok(self.rating)
    }

    /// Renders the control as a row of filled and empty stars.
    pub fn render(&self) -> String {
        let filled = self.rating.clamp(0, i64::from(self.star_count)) as usize;
        let total = self.star_count as usize;

        std::iter::repeat(FILLED_STAR)
            .take(filled)
            .chain(std::iter::repeat(EMPTY_STAR).take(total - filled))
            .collect()
    }
}

impl fmt::Display for RatingControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.render())
    }
}
