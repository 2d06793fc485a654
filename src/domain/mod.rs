//! Domain identifiers for the movie dataset.
//!
//! Follows the Newtype pattern so MovieLens ids, IMDb numbers and derived
//! IMDb string ids cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MovieLens identifier of a movie (`movieId` column).
///
/// # Examples
///
/// ```rust
/// use movielens_explorer::domain::MovieId;
///
/// let id = MovieId::new(42);
/// assert_eq!(id.value(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MovieId(i64);

impl MovieId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MovieId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl From<MovieId> for i64 {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl Serialize for MovieId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        i64::deserialize(deserializer).map(Self::new)
    }
}

/// IMDb title identifier in its string form (`tt0000027`).
///
/// The numeric part is zero-padded to seven digits; wider numbers are kept
/// as-is.
///
/// # Examples
///
/// ```rust
/// use movielens_explorer::domain::ImdbId;
///
/// let id = ImdbId::from_numeric(27);
/// assert_eq!(id.as_str(), "tt0000027");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImdbId(String);

impl ImdbId {
    pub const PREFIX: &'static str = "tt";

    #[must_use]
    pub fn from_numeric(number: u64) -> Self {
        Self(format!("{}{number:07}", Self::PREFIX))
    }

    /// Builds an id from a raw table value, rejecting negative numbers.
    #[must_use]
    pub fn try_from_raw(number: i64) -> Option<Self> {
        u64::try_from(number).ok().map(Self::from_numeric)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive release-year range used by the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    /// Creates a range, swapping the bounds when given in reverse.
    #[must_use]
    pub const fn new(from: i32, to: i32) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        year >= self.from && year <= self.to
    }

    /// Restricts the range to `bounds`, falling back to `bounds` when the
    /// two do not overlap.
    #[must_use]
    pub fn clamp_to(&self, bounds: Self) -> Self {
        if self.to < bounds.from || self.from > bounds.to {
            return bounds;
        }
        Self::new(self.from.max(bounds.from), self.to.min(bounds.to))
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}
