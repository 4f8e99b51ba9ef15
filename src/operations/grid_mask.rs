use tracing::info;

use crate::error::Result;
use crate::mesh::FlatSurface;

use super::{GridAxes, Mask, ProjectSurface, ProjectedPoints, RasterizeBoundary};

/// A flat surface laid out on a regular grid.
///
/// `mask` has `yi.len()` rows and `xi.len()` columns; `mask[[r, c]]` is `true`
/// iff `(xi[c], yi[r])` is inside the surface. `x` and `y` are the projected
/// vertex coordinates, ready for interpolation onto `(xi, yi)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMask {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mask: Mask,
    pub xi: Vec<f64>,
    pub yi: Vec<f64>,
    pub delta: f64,
}

/// Projects a flat surface onto the XY plane and computes its grid mask.
///
/// The shorter grid side has `min_nsteps` cells. This is a pure function of
/// its inputs; callers that reuse the result should cache it.
///
/// # Errors
///
/// Propagates flatness, parameter, shape and geometry errors from the
/// projection, axis and rasterization stages unchanged.
pub fn rasterize<S: FlatSurface + ?Sized>(
    surface: &S,
    min_nsteps: usize,
    max_deformation: f64,
) -> Result<GridMask> {
    let points = ProjectSurface::new(max_deformation).execute(surface)?;
    let axes = GridAxes::from_scattered(&points.x, &points.y, min_nsteps)?;
    let loops = surface.boundary_loops()?;
    let mask = RasterizeBoundary::new(&points, &axes, &loops).execute()?;

    let (rows, cols) = mask.dim();
    info!(
        "Rasterized {} vertices with {} boundary loops onto {rows} x {cols} grid",
        points.x.len(),
        loops.len()
    );

    let delta = axes.delta();
    let (xi, yi) = axes.into_vectors();
    let ProjectedPoints { x, y } = points;
    Ok(GridMask {
        x,
        y,
        mask,
        xi,
        yi,
        delta,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FlatSurfError;
    use crate::operations::count_inside;
    use crate::math::Point3;
    use crate::mesh::TriangleMesh;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn square_mesh_grid_mask() {
        let mesh = TriangleMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        let grid = rasterize(&mesh, 10, 0.0).unwrap();
        assert_eq!(grid.mask.dim(), (grid.yi.len(), grid.xi.len()));
        assert_eq!(grid.xi.len().min(grid.yi.len()), 10);
        assert_eq!(count_inside(&grid.mask), 81);
        assert_eq!(grid.x.len(), 4);
    }

    #[test]
    fn stage_errors_propagate() {
        let bent = TriangleMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 1.0)],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();
        assert!(matches!(
            rasterize(&bent, 10, 0.01),
            Err(FlatSurfError::Flatness { .. })
        ));

        let flat = TriangleMesh::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        )
        .unwrap();
        assert!(matches!(
            rasterize(&flat, 1, 0.1),
            Err(FlatSurfError::InvalidParameters(_))
        ));
    }
}
