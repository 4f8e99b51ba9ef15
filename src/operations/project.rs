use tracing::{debug, warn};

use crate::error::{FlatSurfError, Result};
use crate::math::rotation::align_vectors;
use crate::math::{Vector3, TOLERANCE};
use crate::mesh::FlatSurface;

/// Vertex coordinates of a surface after rotation into the XY plane.
///
/// `x[i]` and `y[i]` belong to vertex `i` of the source surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Mean of all face normals without NaN components, scaled to unit length.
///
/// # Errors
///
/// Returns `NoValidFaces` if no normal is defined or they cancel out.
pub fn mean_face_normal(normals: &[Vector3]) -> Result<Vector3> {
    let (sum, count) = normals
        .iter()
        .filter(|n| !n.iter().any(|c| c.is_nan()))
        .fold((Vector3::zeros(), 0_usize), |(s, k), n| (s + n, k + 1));
    if count == 0 {
        return Err(FlatSurfError::NoValidFaces);
    }
    let len = sum.norm();
    if len < TOLERANCE {
        return Err(FlatSurfError::NoValidFaces);
    }
    Ok(sum / len)
}

/// Rotates a near-planar surface so its mean face normal points along +z,
/// then drops the z coordinate.
///
/// A face passes the flatness gate when `|1 - |avg · n|| <= max_deformation`.
/// Nearly flat surfaces project cleanly; inflated or otherwise curved
/// surfaces are rejected.
pub struct ProjectSurface {
    max_deformation: f64,
}

impl ProjectSurface {
    /// Creates a new `ProjectSurface` operation.
    #[must_use]
    pub fn new(max_deformation: f64) -> Self {
        Self { max_deformation }
    }

    /// Executes the projection.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters` if `max_deformation` is negative or NaN.
    /// - `NoValidFaces` if no face has a defined normal.
    /// - `Flatness` if any face deviates beyond `max_deformation`.
    pub fn execute<S: FlatSurface + ?Sized>(&self, surface: &S) -> Result<ProjectedPoints> {
        if self.max_deformation.is_nan() || self.max_deformation < 0.0 {
            return Err(FlatSurfError::InvalidParameters(format!(
                "max_deformation must be non-negative, got {}",
                self.max_deformation
            )));
        }

        let normals = surface.face_normals();
        let avg = mean_face_normal(&normals)?;

        let worst = normals
            .iter()
            .filter(|n| !n.iter().any(|c| c.is_nan()))
            .map(|n| (1.0 - avg.dot(n).abs()).abs())
            .fold(0.0_f64, f64::max);
        if worst > self.max_deformation {
            warn!(
                "Rejecting surface: deformation {worst:.3e} exceeds {:.3e}",
                self.max_deformation
            );
            return Err(FlatSurfError::Flatness {
                max_deformation: self.max_deformation,
                worst,
            });
        }

        let rot = align_vectors(&avg, &Vector3::z())?;
        let (x, y) = surface
            .vertices()
            .iter()
            .map(|v| {
                let r = rot * v;
                (r.x, r.y)
            })
            .unzip();

        debug!(
            "Projected {} vertices onto plane with normal ({:.4}, {:.4}, {:.4})",
            surface.vertex_count(),
            avg.x,
            avg.y,
            avg.z
        );
        Ok(ProjectedPoints { x, y })
    }
}
