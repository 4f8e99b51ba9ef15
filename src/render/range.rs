use std::fmt;
use std::str::FromStr;

use crate::error::{FlatSurfError, Result};
use crate::math::stats::nan_bounds;

/// How the bounds of a [`ValueRange`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Bounds are data values.
    Absolute,
    /// Bounds are percentages of the data's `[min, max]` span.
    Percentile,
}

/// A lower and upper bound used for colour scaling and thresholding.
///
/// The textual form is
///
/// - `"a"`: absolute `(-a, a)`
/// - `"a_b"`: absolute `(a, b)`
/// - `"a_b%"`: percentages `a` and `b` of the data span
/// - `"a%"`: same as `"a_{100 - a}%"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub mode: RangeMode,
    pub low: f64,
    pub high: f64,
}

impl ValueRange {
    #[must_use]
    pub fn absolute(low: f64, high: f64) -> Self {
        Self {
            mode: RangeMode::Absolute,
            low,
            high,
        }
    }

    #[must_use]
    pub fn percentile(low: f64, high: f64) -> Self {
        Self {
            mode: RangeMode::Percentile,
            low,
            high,
        }
    }

    /// The absolute range `(-radius, radius)`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` if `radius` is negative or NaN.
    pub fn symmetric(radius: f64) -> Result<Self> {
        if radius.is_nan() || radius < 0.0 {
            return Err(FlatSurfError::InvalidRange(format!(
                "single value should be non-negative, got {radius}"
            )));
        }
        Ok(Self::absolute(-radius, radius))
    }

    /// Resolves the range to concrete `(min, max)` values for `data`.
    ///
    /// Percentages are mapped linearly onto the NaN-aware span of `data`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRange` for a percentile range over data with no
    /// defined value.
    pub fn resolve(&self, data: &[f64]) -> Result<(f64, f64)> {
        match self.mode {
            RangeMode::Absolute => Ok((self.low, self.high)),
            RangeMode::Percentile => {
                let (min, max) = nan_bounds(data).ok_or_else(|| {
                    FlatSurfError::InvalidRange("percentile range of undefined data".into())
                })?;
                let span = max - min;
                Ok((
                    self.low * 0.01 * span + min,
                    self.high * 0.01 * span + min,
                ))
            }
        }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::percentile(2.0, 98.0)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            RangeMode::Absolute => write!(f, "{}_{}", self.low, self.high),
            RangeMode::Percentile => write!(f, "{}_{}%", self.low, self.high),
        }
    }
}

fn parse_bound(s: &str, whole: &str) -> Result<f64> {
    let valid = !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.');
    s.parse::<f64>()
        .ok()
        .filter(|_| valid)
        .ok_or_else(|| FlatSurfError::InvalidRange(format!("not understood: {whole:?}")))
}

impl FromStr for ValueRange {
    type Err = FlatSurfError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let (body, percent) = match text.strip_suffix('%') {
            Some(body) => (body, true),
            None => (text, false),
        };

        if !percent {
            if let Ok(radius) = body.parse::<f64>() {
                return Self::symmetric(radius);
            }
        }

        match body.split_once('_') {
            Some((low, high)) => {
                let low = parse_bound(low, s)?;
                let high = parse_bound(high, s)?;
                Ok(if percent {
                    Self::percentile(low, high)
                } else {
                    Self::absolute(low, high)
                })
            }
            None if percent => {
                let low = parse_bound(body, s)?;
                Ok(Self::percentile(low, 100.0 - low))
            }
            None => Err(FlatSurfError::InvalidRange(format!("not understood: {s:?}"))),
        }
    }
}
