mod boundary;
mod triangle_mesh;

pub use boundary::{boundary_loops, BoundaryLoop};
pub use triangle_mesh::TriangleMesh;

use crate::error::Result;
use crate::math::{Point3, Vector3};

/// The narrow view of a mesh that rasterization needs.
///
/// Implementations own the mesh; callers only read through this trait.
pub trait FlatSurface {
    /// Vertex positions, index-stable.
    fn vertices(&self) -> &[Point3];

    /// One normal per face. Degenerate faces report NaN components.
    fn face_normals(&self) -> Vec<Vector3>;

    /// One closed loop of vertex indices per connected boundary component.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` if the boundary does not form closed loops.
    fn boundary_loops(&self) -> Result<Vec<BoundaryLoop>>;

    /// Number of vertices.
    fn vertex_count(&self) -> usize {
        self.vertices().len()
    }
}
