use ndarray::Array2;
use spade::{
    DelaunayTriangulation, HasPosition, InsertionError, Point2 as SpadePoint2,
    PositionInTriangulation, Triangulation,
};
use tracing::debug;

use crate::error::{FlatSurfError, Result};

/// Maps values at scattered points onto a regular grid.
pub trait GridInterpolator {
    /// Interpolates `values` at `(x[k], y[k])` onto the grid spanned by `xi`
    /// (columns) and `yi` (rows). Cells that cannot be interpolated are NaN.
    ///
    /// # Errors
    ///
    /// Returns `ShapeMismatch` if `x`, `y` and `values` differ in length.
    fn interpolate(
        &self,
        x: &[f64],
        y: &[f64],
        values: &[f64],
        xi: &[f64],
        yi: &[f64],
    ) -> Result<Array2<f64>>;
}

/// Piecewise-linear interpolation over the Delaunay triangulation of the
/// scattered points. Cells outside the convex hull are NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

#[derive(Debug, Clone, Copy)]
struct Sample {
    position: SpadePoint2<f64>,
    value: f64,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> SpadePoint2<f64> {
        self.position
    }
}

impl GridInterpolator for LinearInterpolator {
    fn interpolate(
        &self,
        x: &[f64],
        y: &[f64],
        values: &[f64],
        xi: &[f64],
        yi: &[f64],
    ) -> Result<Array2<f64>> {
        for len in [y.len(), values.len()] {
            if len != x.len() {
                return Err(FlatSurfError::ShapeMismatch {
                    expected: x.len(),
                    found: len,
                });
            }
        }

        let mut tri = DelaunayTriangulation::<Sample>::new();
        for ((&px, &py), &value) in x.iter().zip(y).zip(values) {
            if px.is_nan() || py.is_nan() {
                continue;
            }
            tri.insert(Sample {
                position: SpadePoint2::new(px, py),
                value,
            })
            .map_err(|e: InsertionError| {
                FlatSurfError::Interpolation(format!("Delaunay insert: {e}"))
            })?;
        }
        debug!(
            "Triangulated {} samples into {} faces",
            tri.num_vertices(),
            tri.num_inner_faces()
        );

        Ok(Array2::from_shape_fn((yi.len(), xi.len()), |(r, c)| {
            sample_at(&tri, SpadePoint2::new(xi[c], yi[r]))
        }))
    }
}

fn sample_at(tri: &DelaunayTriangulation<Sample>, p: SpadePoint2<f64>) -> f64 {
    match tri.locate(p) {
        PositionInTriangulation::OnVertex(v) => tri.vertex(v).data().value,
        PositionInTriangulation::OnEdge(e) => {
            let [a, b] = tri.directed_edge(e).vertices();
            let (pa, pb) = (a.position(), b.position());
            let (dx, dy) = (pb.x - pa.x, pb.y - pa.y);
            let t = ((p.x - pa.x) * dx + (p.y - pa.y) * dy) / (dx * dx + dy * dy);
            let (va, vb) = (a.data().value, b.data().value);
            va + t * (vb - va)
        }
        PositionInTriangulation::OnFace(f) => {
            let [a, b, c] = tri.face(f).vertices();
            let (pa, pb, pc) = (a.position(), b.position(), c.position());
            let det = (pb.y - pc.y) * (pa.x - pc.x) + (pc.x - pb.x) * (pa.y - pc.y);
            let la = ((pb.y - pc.y) * (p.x - pc.x) + (pc.x - pb.x) * (p.y - pc.y)) / det;
            let lb = ((pc.y - pa.y) * (p.x - pc.x) + (pa.x - pc.x) * (p.y - pc.y)) / det;
            let lc = 1.0 - la - lb;
            la * a.data().value + lb * b.data().value + lc * c.data().value
        }
        PositionInTriangulation::OutsideOfConvexHull(_)
        | PositionInTriangulation::NoTriangulation => f64::NAN,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn plane(x: f64, y: f64) -> f64 {
        2.0 * x - 3.0 * y + 1.0
    }

    #[test]
    fn linear_field_is_reproduced_inside_hull() {
        let x = [0.0, 4.0, 4.0, 0.0, 1.3, 2.9];
        let y = [0.0, 0.0, 4.0, 4.0, 2.2, 0.7];
        let values: Vec<f64> = x.iter().zip(&y).map(|(&a, &b)| plane(a, b)).collect();
        let xi = [0.5, 1.5, 2.5, 3.5];
        let yi = [0.25, 1.0, 3.75];

        let grid = LinearInterpolator.interpolate(&x, &y, &values, &xi, &yi).unwrap();
        assert_eq!(grid.dim(), (3, 4));
        for ((r, c), &v) in grid.indexed_iter() {
            assert_relative_eq!(v, plane(xi[c], yi[r]), epsilon = 1e-9);
        }
    }

    #[test]
    fn exact_at_sample_points() {
        let x = [0.0, 1.0, 0.0];
        let y = [0.0, 0.0, 1.0];
        let values = [5.0, 7.0, -1.0];
        let grid = LinearInterpolator
            .interpolate(&x, &y, &values, &[0.0, 1.0], &[0.0])
            .unwrap();
        assert_relative_eq!(grid[[0, 0]], 5.0);
        assert_relative_eq!(grid[[0, 1]], 7.0);
    }

    #[test]
    fn outside_hull_is_nan() {
        let x = [0.0, 1.0, 0.0];
        let y = [0.0, 0.0, 1.0];
        let values = [1.0, 1.0, 1.0];
        let grid = LinearInterpolator
            .interpolate(&x, &y, &values, &[0.2, 0.9], &[0.2, 0.9])
            .unwrap();
        assert_relative_eq!(grid[[0, 0]], 1.0, epsilon = 1e-12);
        assert!(grid[[1, 1]].is_nan());
    }

    #[test]
    fn too_few_points_give_nan() {
        let grid = LinearInterpolator
            .interpolate(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 2.0], &[0.3], &[0.7])
            .unwrap();
        assert!(grid[[0, 0]].is_nan());
    }

    #[test]
    fn mismatched_values_are_rejected() {
        let err = LinearInterpolator
            .interpolate(&[0.0, 1.0], &[0.0, 1.0], &[1.0], &[0.5], &[0.5])
            .unwrap_err();
        assert!(matches!(
            err,
            FlatSurfError::ShapeMismatch {
                expected: 2,
                found: 1
            }
        ));
    }
}
