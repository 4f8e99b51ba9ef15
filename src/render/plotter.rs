use ndarray::{Array2, Zip};
use tracing::debug;

use crate::error::{FlatSurfError, Result};
use crate::math::stats::{nan_bounds, rescale_value};
use crate::mesh::FlatSurface;
use crate::operations::{rasterize, GridMask, Mask};

use super::{GridInterpolator, LinearInterpolator, ValueRange};

/// Parameters controlling how surface data is laid out and scaled.
#[derive(Debug, Clone, Copy)]
pub struct PlotParams {
    /// Number of cells along the shorter side of the image.
    pub min_nsteps: usize,
    /// Data range mapped onto `[0, 1]`.
    pub range: ValueRange,
    /// Values strictly inside this range are hidden.
    pub threshold: Option<ValueRange>,
    /// Flatness tolerance passed to the projection.
    pub max_deformation: f64,
}

impl Default for PlotParams {
    fn default() -> Self {
        Self {
            min_nsteps: 500,
            range: ValueRange::default(),
            threshold: None,
            max_deformation: 0.5,
        }
    }
}

/// One cell of a composed image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pixel {
    /// Outside the surface, or no data and no underlay.
    Empty,
    /// Underlay intensity in `[0, 1]`.
    Underlay(f64),
    /// Scaled data value in `[0, 1]`.
    Overlay(f64),
}

impl Pixel {
    #[must_use]
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Underlay(v) | Self::Overlay(v) => Some(v),
        }
    }
}

/// Renders per-vertex data of a flat surface into gridded images.
///
/// The grid mask and the curvature underlay are computed on first use and
/// reused by every later [`plot`](Self::plot).
pub struct FlatSurfacePlotter<'a, S: FlatSurface + ?Sized, I = LinearInterpolator> {
    surface: &'a S,
    params: PlotParams,
    interpolator: I,
    curvature: Option<Vec<f64>>,
    grid: Option<GridMask>,
    underlay: Option<Array2<f64>>,
}

impl<'a, S: FlatSurface + ?Sized> FlatSurfacePlotter<'a, S> {
    /// Creates a plotter using linear Delaunay interpolation.
    #[must_use]
    pub fn new(surface: &'a S, params: PlotParams) -> Self {
        Self {
            surface,
            params,
            interpolator: LinearInterpolator,
            curvature: None,
            grid: None,
            underlay: None,
        }
    }
}

impl<'a, S: FlatSurface + ?Sized, I: GridInterpolator> FlatSurfacePlotter<'a, S, I> {
    /// Replaces the interpolator.
    #[must_use]
    pub fn with_interpolator<J: GridInterpolator>(
        self,
        interpolator: J,
    ) -> FlatSurfacePlotter<'a, S, J> {
        FlatSurfacePlotter {
            surface: self.surface,
            params: self.params,
            interpolator,
            curvature: self.curvature,
            grid: self.grid,
            underlay: self.underlay,
        }
    }

    /// Uses per-vertex curvature as a greyscale underlay (sulci dark).
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if there is not one value per vertex.
    pub fn with_curvature(mut self, curvature: Vec<f64>) -> Result<Self> {
        check_vertex_values(self.surface, &curvature)?;
        self.curvature = Some(curvature);
        self.underlay = None;
        Ok(self)
    }

    /// Sets an explicit underlay image, replacing any curvature underlay.
    pub fn set_underlay(&mut self, underlay: Array2<f64>) {
        self.underlay = Some(underlay);
    }

    /// The cached grid mask, computing it if needed.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`rasterize`].
    pub fn grid_mask(&mut self) -> Result<&GridMask> {
        cached_grid(&mut self.grid, self.surface, &self.params)
    }

    /// Renders `data` (one value per vertex) into an image over the grid.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if `data` does not have one value per vertex, or an
    ///   explicit underlay does not match the grid.
    /// - Any error from rasterization, interpolation or range resolution.
    pub fn plot(&mut self, data: &[f64]) -> Result<Array2<Pixel>> {
        check_vertex_values(self.surface, data)?;

        let params = self.params;
        let grid = cached_grid(&mut self.grid, self.surface, &params)?;
        if self.underlay.is_none() {
            if let Some(curvature) = &self.curvature {
                self.underlay = Some(curvature_underlay(&self.interpolator, grid, curvature)?);
            }
        }

        let overlay = masked_interpolation(&self.interpolator, grid, data)?;
        let values: Vec<f64> = overlay.iter().copied().collect();
        let source = params.range.resolve(&values)?;
        let threshold = params
            .threshold
            .map(|t| t.resolve(&values))
            .transpose()?;

        let shown = overlay.mapv(|raw| {
            let hidden = threshold.is_some_and(|(tlo, thi)| raw > tlo && raw < thi);
            let s = rescale_value(raw, (0.0, 1.0), source);
            if raw.is_nan() || s.is_nan() || hidden {
                f64::NAN
            } else {
                s.clamp(0.0, 1.0)
            }
        });

        compose(&shown, &grid.mask, self.underlay.as_ref())
    }
}

fn check_vertex_values<S: FlatSurface + ?Sized>(surface: &S, values: &[f64]) -> Result<()> {
    let expected = surface.vertex_count();
    if values.len() == expected {
        Ok(())
    } else {
        Err(FlatSurfError::ShapeMismatch {
            expected,
            found: values.len(),
        })
    }
}

fn cached_grid<'g, S: FlatSurface + ?Sized>(
    slot: &'g mut Option<GridMask>,
    surface: &S,
    params: &PlotParams,
) -> Result<&'g GridMask> {
    let grid = match slot.take() {
        Some(grid) => grid,
        None => {
            debug!("Computing grid mask with min_nsteps = {}", params.min_nsteps);
            rasterize(surface, params.min_nsteps, params.max_deformation)?
        }
    };
    Ok(slot.insert(grid))
}

fn check_grid_shape<T>(expected: (usize, usize), grid: &Array2<T>) -> Result<()> {
    let found = grid.dim();
    if found == expected {
        Ok(())
    } else {
        Err(FlatSurfError::ShapeMismatch {
            expected: expected.0 * expected.1,
            found: found.0 * found.1,
        })
    }
}

fn masked_interpolation<I: GridInterpolator>(
    interpolator: &I,
    grid: &GridMask,
    values: &[f64],
) -> Result<Array2<f64>> {
    let mut gridded = interpolator.interpolate(&grid.x, &grid.y, values, &grid.xi, &grid.yi)?;
    check_grid_shape(grid.mask.dim(), &gridded)?;
    Zip::from(&mut gridded)
        .and(&grid.mask)
        .for_each(|v, &inside| {
            if !inside {
                *v = f64::NAN;
            }
        });
    Ok(gridded)
}

fn curvature_underlay<I: GridInterpolator>(
    interpolator: &I,
    grid: &GridMask,
    curvature: &[f64],
) -> Result<Array2<f64>> {
    let inverted = masked_interpolation(interpolator, grid, curvature)?.mapv(|v| -v);
    let values: Vec<f64> = inverted.iter().copied().collect();
    let source = nan_bounds(&values);
    Ok(inverted.mapv(|v| source.map_or(f64::NAN, |s| rescale_value(v, (0.0, 1.0), s))))
}

/// Layers an overlay on top of an optional underlay.
///
/// Defined overlay cells win; otherwise cells inside `mask` show the
/// underlay where it is defined.
///
/// # Errors
///
/// Returns `ShapeMismatch` if the grids differ in shape.
pub fn compose(
    overlay: &Array2<f64>,
    mask: &Mask,
    underlay: Option<&Array2<f64>>,
) -> Result<Array2<Pixel>> {
    let shape = mask.dim();
    check_grid_shape(shape, overlay)?;
    if let Some(under) = underlay {
        check_grid_shape(shape, under)?;
    }

    let mut image = overlay.map(|&o| {
        if o.is_nan() {
            Pixel::Empty
        } else {
            Pixel::Overlay(o)
        }
    });
    if let Some(under) = underlay {
        Zip::from(&mut image)
            .and(mask)
            .and(under)
            .for_each(|pixel, &inside, &u| {
                if inside && *pixel == Pixel::Empty && !u.is_nan() {
                    *pixel = Pixel::Underlay(u);
                }
            });
    }
    Ok(image)
}
