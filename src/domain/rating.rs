use std::fmt;

use serde::{Deserialize, Serialize};

/// A forum rating on a scale of 0 to 5 stars.
///
/// The value is never NaN and never leaves the `[0, 5]` range. New ratings
/// are folded in with [`Rating::blend`], which averages the previous value
/// with the incoming one, so the range is closed under every update.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(f64);

impl Rating {
    /// The lowest possible rating.
    pub const MIN: f64 = 0.0;
    /// The highest possible rating.
    pub const MAX: f64 = 5.0;

    /// Creates a rating from a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] if the value is NaN or outside `[0, 5]`.
    pub fn new(value: f64) -> Result<Self, RatingError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError(value))
        }
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Folds an incoming rating into this one.
    ///
    /// The result is the mean of the two values.
    #[must_use]
    pub fn blend(self, incoming: Self) -> Self {
        Self((self.0 + incoming.0) / 2.0)
    }
}

impl TryFrom<f64> for Rating {
    type Error = RatingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Error returned when a rating value is NaN or outside `[0, 5]`.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("rating {0} is outside the range 0 to 5")]
pub struct RatingError(pub f64);
