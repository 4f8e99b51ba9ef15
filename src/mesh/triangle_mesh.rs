use crate::error::{FlatSurfError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{boundary_loops, BoundaryLoop, FlatSurface};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    vertices: Vec<Point3>,
    faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Creates a mesh from vertex positions and triangle indices.
    ///
    /// # Errors
    ///
    /// Returns `DegenerateGeometry` if a face references a vertex that does
    /// not exist.
    pub fn new(vertices: Vec<Point3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        let n = vertices.len();
        if let Some((k, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, f)| f.iter().any(|&v| v as usize >= n))
        {
            return Err(FlatSurfError::DegenerateGeometry(format!(
                "face {k} {face:?} references a vertex outside 0..{n}"
            )));
        }
        Ok(Self { vertices, faces })
    }

    /// Triangle indices.
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face_normal(&self, face: [u32; 3]) -> Vector3 {
        let [a, b, c] = face.map(|i| self.vertices[i as usize]);
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len < TOLERANCE {
            Vector3::repeat(f64::NAN)
        } else {
            n / len
        }
    }
}

impl FlatSurface for TriangleMesh {
    fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    fn face_normals(&self) -> Vec<Vector3> {
        self.faces.iter().map(|&f| self.face_normal(f)).collect()
    }

    fn boundary_loops(&self) -> Result<Vec<BoundaryLoop>> {
        boundary_loops(&self.faces)
    }
}
