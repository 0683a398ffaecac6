//! Rating aggregation policies.
//!
//! Two formulas have been used for salon ratings and they are not
//! equivalent, so the registry takes the formula as a policy value instead of
//! hard-coding one. Neither formula clamps its result, but a non-finite
//! result is never produced by `try_apply`: `WeightedAverage` divides by zero
//! once a rating reaches -1, and both formulas overflow on huge rates.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Formula used to fold a submitted rate into a salon's stored rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingPolicy {
    /// `(R * R + r) / (R + 1)`: the stored rating weighs itself.
    #[default]
    WeightedAverage,
    /// `(R + r) / 5`.
    DivideByFive,
}

impl RatingPolicy {
    /// Computes the next rating from the `current` stored value and a submitted `rate`.
    pub fn apply(self, current: f32, rate: f32) -> f32 {
        match self {
            Self::WeightedAverage => (current * current + rate) / (current + 1.0),
            Self::DivideByFive => (current + rate) / 5.0,
        }
    }

    /// Like [`RatingPolicy::apply`], but `None` when either input or the
    /// result is not finite.
    pub fn try_apply(self, current: f32, rate: f32) -> Option<f32> {
        if !current.is_finite() || !rate.is_finite() {
            return None;
        }
        Some(self.apply(current, rate)).filter(|next| next.is_finite())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeightedAverage => "weighted_average",
            Self::DivideByFive => "divide_by_five",
        }
    }
}

impl Display for RatingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRatingPolicy(pub String);

impl Display for UnknownRatingPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown rating policy `{}`; expected weighted_average|divide_by_five",
            self.0
        )
    }
}

impl Error for UnknownRatingPolicy {}

impl FromStr for RatingPolicy {
    type Err = UnknownRatingPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "weighted_average" => Ok(Self::WeightedAverage),
            "divide_by_five" => Ok(Self::DivideByFive),
            _ => Err(UnknownRatingPolicy(value.to_string())),
        }
    }
}
