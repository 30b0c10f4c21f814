use crate::error::{CoreError, Result};
use std::fmt::Display;

/// An inclusive range of Unix timestamps in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeRange {
    min: u64,
    max: u64,
}

impl TimeRange {
    /// Creates a range covering `[min, max]`.
    ///
    /// Fails when `min > max`.
    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min > max {
            return Err(CoreError::InvalidRange(format!(
                "lower bound {min} is greater than upper bound {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// A range matching exactly one second.
    pub fn at(second: u64) -> Self {
        Self {
            min: second,
            max: second,
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn contains(&self, second: u64) -> bool {
        (self.min..=self.max).contains(&second)
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
