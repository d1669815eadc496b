//! Forecast horizon time steps.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ForecastError;

/// Index into the forecast horizon, 3 hours per step from the analysis time.
///
/// Always within `0..=TimeStep::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TimeStep(u8);

impl TimeStep {
    /// Last step of the 72 hour horizon.
    pub const MAX: u8 = 24;
    /// Hours between consecutive steps.
    pub const HOURS_PER_STEP: u32 = 3;

    pub const ZERO: TimeStep = TimeStep(0);

    /// Create a time step, rejecting values beyond the horizon.
    pub fn new(step: u8) -> Result<Self, ForecastError> {
        if step > Self::MAX {
            return Err(ForecastError::Config(format!(
                "time step {} is outside 0..={}",
                step,
                Self::MAX
            )));
        }
        Ok(Self(step))
    }

    pub fn index(&self) -> u8 {
        self.0
    }

    /// Lead time in hours.
    pub fn hours(&self) -> u32 {
        self.0 as u32 * Self::HOURS_PER_STEP
    }

    /// Next step; the last step wraps around to the analysis time.
    pub fn next(&self) -> Self {
        if self.0 >= Self::MAX {
            Self(0)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Previous step, never going below the analysis time.
    pub fn prev(&self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    pub fn can_go_previous(&self) -> bool {
        self.0 > 0
    }

    /// The step `offset` ahead, or `None` past the horizon.
    pub fn checked_add(&self, offset: u8) -> Option<Self> {
        let step = self.0.checked_add(offset)?;
        (step <= Self::MAX).then_some(Self(step))
    }

    /// Valid time of this step for a given analysis (base) time.
    pub fn valid_time(&self, base: DateTime<Utc>) -> DateTime<Utc> {
        base + Duration::hours(self.hours() as i64)
    }

    /// Every step of the horizon in order.
    pub fn all() -> impl Iterator<Item = TimeStep> {
        (0..=Self::MAX).map(TimeStep)
    }
}

impl TryFrom<u8> for TimeStep {
    type Error = ForecastError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeStep> for u8 {
    fn from(step: TimeStep) -> Self {
        step.0
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
