use crate::error::{Error, Result};

/// Inclusive window of the time axis currently shown in the chart.
///
/// Only finite bounds can be constructed. `min > max` is allowed and simply
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    min: f64,
    max: f64,
}

impl VisibleRange {
    /// Validate raw bounds as extracted from a chart layout or the command line.
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        match (min, max) {
            (Some(lo), Some(hi)) if lo.is_finite() && hi.is_finite() => Ok(Self { min: lo, max: hi }),
            _ => Err(Error::InvalidRange { min, max }),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }
}
