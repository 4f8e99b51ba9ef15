use tracing::debug;

use crate::error::{FlatSurfError, Result};
use crate::math::stats::nan_bounds;

/// Relative slack applied before rounding step counts up, so that a
/// quotient like `2 / (2 / 3) = 3.0000000000000004` is not counted as 4 steps.
const STEP_EPSILON: f64 = 1e-9;

/// Cell-centre coordinates of a uniform grid.
///
/// `xi[k] = (k + 0.5) * delta + xmin`, and likewise for `yi`. The shorter
/// side has exactly `min_nsteps` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAxes {
    xi: Vec<f64>,
    yi: Vec<f64>,
    delta: f64,
}

impl GridAxes {
    /// Derives grid axes from scattered `(x, y)` coordinates.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `x` and `y` differ in length.
    /// - `InvalidParameters` if `min_nsteps < 2`.
    /// - `DegenerateGeometry` if either coordinate range is zero or undefined.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn from_scattered(x: &[f64], y: &[f64], min_nsteps: usize) -> Result<Self> {
        if x.len() != y.len() {
            return Err(FlatSurfError::ShapeMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }
        if min_nsteps < 2 {
            return Err(FlatSurfError::InvalidParameters(format!(
                "min_nsteps must be at least 2, got {min_nsteps}"
            )));
        }

        let (xmin, xmax) = nan_bounds(x).ok_or_else(|| no_coordinates("x"))?;
        let (ymin, ymax) = nan_bounds(y).ok_or_else(|| no_coordinates("y"))?;
        let xran = xmax - xmin;
        let yran = ymax - ymin;

        let delta = xran.min(yran) / (min_nsteps - 1) as f64;
        if !(delta.is_finite() && delta > 0.0) {
            return Err(FlatSurfError::DegenerateGeometry(format!(
                "coordinate ranges {xran} x {yran} cannot span a grid"
            )));
        }

        let steps = |range: f64| {
            let ratio = range / delta;
            1 + (ratio - ratio * STEP_EPSILON).ceil() as usize
        };
        let axis = |min: f64, n: usize| -> Vec<f64> {
            (0..n).map(|k| (k as f64 + 0.5) * delta + min).collect()
        };

        let xi = axis(xmin, steps(xran));
        let yi = axis(ymin, steps(yran));
        debug!(
            "Grid axes: {} x {} cells, delta = {delta}",
            xi.len(),
            yi.len()
        );

        Ok(Self { xi, yi, delta })
    }

    /// Cell-centre x coordinates (grid columns).
    #[must_use]
    pub fn xi(&self) -> &[f64] {
        &self.xi
    }

    /// Cell-centre y coordinates (grid rows).
    #[must_use]
    pub fn yi(&self) -> &[f64] {
        &self.yi
    }

    /// Uniform cell spacing in both directions.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// `(rows, cols)` of a grid over these axes.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.yi.len(), self.xi.len())
    }

    pub(crate) fn into_vectors(self) -> (Vec<f64>, Vec<f64>) {
        (self.xi, self.yi)
    }
}

fn no_coordinates(axis: &str) -> FlatSurfError {
    FlatSurfError::DegenerateGeometry(format!("no defined {axis} coordinates"))
}
