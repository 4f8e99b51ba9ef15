use ndarray::Array2;
use tracing::{debug, trace};

use crate::error::{FlatSurfError, Result};
use crate::mesh::BoundaryLoop;

use super::{GridAxes, ProjectedPoints};

/// Inside/outside flags over a grid, indexed `(yi index, xi index)`.
pub type Mask = Array2<bool>;

/// Number of cells flagged inside.
#[must_use]
pub fn count_inside(mask: &Mask) -> usize {
    mask.iter().filter(|&&inside| inside).count()
}

/// A boundary edge between vertices `i` and `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub i: usize,
    pub j: usize,
}

/// Boundary edges bucketed by the grid columns whose centre they span.
///
/// Column `c` holds every edge whose projected x-interval contains `xi[c]`
/// (half-open, so a vertex lying exactly on a column centre is counted once).
/// Only those edges can be crossed by a vertical ray through that column.
#[derive(Debug, Clone, Default)]
pub struct ColumnSegmentIndex {
    columns: Vec<Vec<Segment>>,
}

impl ColumnSegmentIndex {
    /// Buckets the edges of every loop by column.
    ///
    /// Loops with fewer than two vertices and edges with no extent in x are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` if a loop references a vertex outside `x`.
    #[allow(
        clippy::float_cmp,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn build(x: &[f64], axes: &GridAxes, loops: &[BoundaryLoop]) -> Result<Self> {
        let ncols = axes.xi().len();
        let mut columns = vec![Vec::new(); ncols];
        let Some(&x0) = axes.xi().first() else {
            return Ok(Self { columns });
        };
        let delta = axes.delta();
        let to_column = |v: f64| (v - x0) / delta;

        for (k, boundary) in loops.iter().enumerate() {
            if boundary.vertices.len() < 2 {
                trace!(
                    "Skipping boundary loop {k} with {} vertices",
                    boundary.vertices.len()
                );
                continue;
            }
            for (i, j) in boundary.edges() {
                let (i, j) = (i as usize, j as usize);
                let (Some(&xa), Some(&xb)) = (x.get(i), x.get(j)) else {
                    return Err(FlatSurfError::DegenerateGeometry(format!(
                        "boundary loop {k} references vertex outside 0..{}",
                        x.len()
                    )));
                };
                if xa == xb {
                    continue;
                }
                let (va, vb) = (to_column(xa), to_column(xb));
                let (p, q) = (va.min(vb), va.max(vb));
                if !(p.is_finite() && q.is_finite()) {
                    continue;
                }
                let start = p.ceil().max(0.0) as usize;
                let end = (q.ceil().max(0.0) as usize).min(ncols);
                if start < end {
                    for column in &mut columns[start..end] {
                        column.push(Segment { i, j });
                    }
                }
            }
        }

        Ok(Self { columns })
    }

    /// Edges spanning column `col`; empty for columns outside the grid.
    #[must_use]
    pub fn segments(&self, col: usize) -> &[Segment] {
        self.columns
            .get(col)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Total number of (column, edge) registrations.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}

/// Computes the inside/outside mask of projected boundary loops over a grid.
///
/// Each cell centre casts a ray towards +y and counts the boundary edges it
/// crosses (PNPOLY parity, W. R. Franklin). Parity accumulates over all
/// loops, so a loop nested inside another cuts a hole.
pub struct RasterizeBoundary<'a> {
    points: &'a ProjectedPoints,
    axes: &'a GridAxes,
    loops: &'a [BoundaryLoop],
}

impl<'a> RasterizeBoundary<'a> {
    /// Creates a new `RasterizeBoundary` operation.
    #[must_use]
    pub fn new(
        points: &'a ProjectedPoints,
        axes: &'a GridAxes,
        loops: &'a [BoundaryLoop],
    ) -> Self {
        Self {
            points,
            axes,
            loops,
        }
    }

    /// Executes the rasterization.
    ///
    /// # Errors
    ///
    /// - `ShapeMismatch` if the projected x and y sequences differ in length.
    /// - `DegenerateGeometry` if a loop references a missing vertex.
    pub fn execute(&self) -> Result<Mask> {
        let ProjectedPoints { x, y } = self.points;
        if x.len() != y.len() {
            return Err(FlatSurfError::ShapeMismatch {
                expected: x.len(),
                found: y.len(),
            });
        }

        let index = ColumnSegmentIndex::build(x, self.axes, self.loops)?;
        debug!(
            "Indexed {} boundary edge registrations over {} columns",
            index.registration_count(),
            index.column_count()
        );

        let (rows, cols) = self.axes.shape();
        let mut mask = Mask::from_elem((rows, cols), false);
        for (c, &xpos) in self.axes.xi().iter().enumerate() {
            let segments = index.segments(c);
            if segments.is_empty() {
                continue;
            }
            for (r, &ypos) in self.axes.yi().iter().enumerate() {
                mask[[r, c]] = segments
                    .iter()
                    .fold(false, |inside, s| inside ^ below_edge(x, y, *s, xpos, ypos));
            }
        }

        debug!("Mask has {} of {} cells inside", count_inside(&mask), rows * cols);
        Ok(mask)
    }
}

/// Whether `(xpos, ypos)` lies below the line through edge `s`, evaluated at `xpos`.
fn below_edge(x: &[f64], y: &[f64], s: Segment, xpos: f64, ypos: f64) -> bool {
    let Segment { i, j } = s;
    ypos < (y[j] - y[i]) * (xpos - x[i]) / (x[j] - x[i]) + y[i]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> ProjectedPoints {
        ProjectedPoints {
            x: coords.iter().map(|c| c.0).collect(),
            y: coords.iter().map(|c| c.1).collect(),
        }
    }

    fn rasterize(pts: &ProjectedPoints, loops: &[BoundaryLoop], n: usize) -> (GridAxes, Mask) {
        let axes = GridAxes::from_scattered(&pts.x, &pts.y, n).unwrap();
        let mask = RasterizeBoundary::new(pts, &axes, loops).execute().unwrap();
        (axes, mask)
    }

    fn unit_square() -> ProjectedPoints {
        points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)])
    }

    #[test]
    fn unit_square_mask() {
        let pts = unit_square();
        let (axes, mask) = rasterize(&pts, &[BoundaryLoop::new(vec![0, 1, 2, 3])], 10);
        assert_eq!(mask.dim(), (10, 10));
        for ((r, c), &inside) in mask.indexed_iter() {
            let (x, y) = (axes.xi()[c], axes.yi()[r]);
            let expected = x > 0.0 && x < 1.0 && y > 0.0 && y < 1.0;
            assert_eq!(inside, expected, "cell ({r}, {c}) at ({x}, {y})");
        }
        assert_eq!(count_inside(&mask), 81);
    }

    #[test]
    fn loop_direction_does_not_matter() {
        let pts = unit_square();
        let (_, ccw) = rasterize(&pts, &[BoundaryLoop::new(vec![0, 1, 2, 3])], 10);
        let (_, cw) = rasterize(&pts, &[BoundaryLoop::new(vec![3, 2, 1, 0])], 10);
        assert_eq!(ccw, cw);
    }

    #[test]
    fn nested_loop_cuts_hole() {
        let pts = points(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (0.0, 3.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (1.0, 2.0),
        ]);
        let loops = [
            BoundaryLoop::new(vec![0, 1, 2, 3]),
            BoundaryLoop::new(vec![4, 5, 6, 7]),
        ];
        let (axes, mask) = rasterize(&pts, &loops, 7);
        assert!((axes.delta() - 0.5).abs() < 1e-12);
        for ((r, c), &inside) in mask.indexed_iter() {
            let (x, y) = (axes.xi()[c], axes.yi()[r]);
            let in_outer = x < 3.0 && y < 3.0;
            let in_hole = (1.0..2.0).contains(&x) && (1.0..2.0).contains(&y);
            assert_eq!(inside, in_outer && !in_hole, "cell at ({x}, {y})");
        }
    }

    #[test]
    fn concave_polygon() {
        // U shape opening upwards
        let pts = points(&[
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ]);
        let (axes, mask) = rasterize(&pts, &[BoundaryLoop::new((0..8).collect())], 7);
        for ((r, c), &inside) in mask.indexed_iter() {
            let (x, y) = (axes.xi()[c], axes.yi()[r]);
            let in_box = x < 3.0 && y < 3.0;
            let in_notch = (1.0..2.0).contains(&x) && y > 1.0;
            assert_eq!(inside, in_box && !in_notch, "cell at ({x}, {y})");
        }
    }

    #[test]
    fn columns_hold_only_spanning_edges() {
        let pts = unit_square();
        let axes = GridAxes::from_scattered(&pts.x, &pts.y, 10).unwrap();
        let index =
            ColumnSegmentIndex::build(&pts.x, &axes, &[BoundaryLoop::new(vec![0, 1, 2, 3])])
                .unwrap();
        assert_eq!(index.column_count(), 10);
        for c in 0..9 {
            assert_eq!(index.segments(c).len(), 2, "column {c}");
        }
        // Vertical sides never register; the last column lies past x = 1
        assert!(index.segments(9).is_empty());
        assert!(index.segments(42).is_empty());
        assert_eq!(index.registration_count(), 18);
    }

    #[test]
    fn vertex_on_column_centre_counts_once() {
        // Apex of the triangle sits exactly on the centre of column 2
        let pts = points(&[(0.25, 0.0), (1.25, 1.0), (2.25, 0.0), (0.0, 0.0), (2.5, 1.0)]);
        let axes = GridAxes::from_scattered(&pts.x, &pts.y, 3).unwrap();
        assert!((axes.xi()[2] - 1.25).abs() < 1e-12);
        let index =
            ColumnSegmentIndex::build(&pts.x, &axes, &[BoundaryLoop::new(vec![0, 1, 2])]).unwrap();
        // base edge plus exactly one of the two slanted edges
        assert_eq!(index.segments(2).len(), 2);
    }

    #[test]
    fn degenerate_loops_are_skipped() {
        let pts = unit_square();
        let loops = [BoundaryLoop::new(vec![2]), BoundaryLoop::new(vec![])];
        let (_, mask) = rasterize(&pts, &loops, 4);
        assert_eq!(count_inside(&mask), 0);
    }

    #[test]
    fn missing_vertex_is_rejected() {
        let pts = unit_square();
        let axes = GridAxes::from_scattered(&pts.x, &pts.y, 4).unwrap();
        let loops = [BoundaryLoop::new(vec![0, 1, 9])];
        let err = RasterizeBoundary::new(&pts, &axes, &loops).execute().unwrap_err();
        assert!(matches!(err, FlatSurfError::DegenerateGeometry(_)));
    }

    #[test]
    fn mismatched_points_are_rejected() {
        let pts = unit_square();
        let axes = GridAxes::from_scattered(&pts.x, &pts.y, 4).unwrap();
        let bad = ProjectedPoints {
            x: pts.x.clone(),
            y: pts.y[..3].to_vec(),
        };
        let err = RasterizeBoundary::new(&bad, &axes, &[]).execute().unwrap_err();
        assert!(matches!(err, FlatSurfError::ShapeMismatch { .. }));
    }
}
