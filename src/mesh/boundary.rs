use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{FlatSurfError, Result};

/// A closed, ordered loop of boundary vertex indices.
///
/// The last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Ordered list of vertex indices forming the loop.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    #[must_use]
    pub fn new(vertices: Vec<u32>) -> Self {
        Self { vertices }
    }

    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates the loop's edges `(i, j)` where `j` precedes `i`, starting with
    /// the closing pair `(first, last)`.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let last = self.vertices.last().copied();
        self.vertices
            .iter()
            .scan(last, |prev, &i| prev.replace(i).map(|j| (i, j)))
    }
}

fn face_edges(face: [u32; 3]) -> [(u32, u32); 3] {
    let [a, b, c] = face;
    [(a, b), (b, c), (c, a)]
}

fn undirected(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Extracts the boundary loops of a triangle mesh.
///
/// A boundary edge is one that belongs to exactly one face, regardless of the
/// winding of that face. Each loop starts along the first boundary edge in
/// face order and follows boundary neighbours until it returns to its start.
///
/// # Errors
///
/// Returns `DegenerateGeometry` if a boundary chain ends without closing,
/// which happens at vertices joined to an odd number of boundary edges.
pub fn boundary_loops(faces: &[[u32; 3]]) -> Result<Vec<BoundaryLoop>> {
    let mut counts: HashMap<(u32, u32), u32> = HashMap::new();
    for &face in faces {
        for (a, b) in face_edges(face) {
            *counts.entry(undirected(a, b)).or_default() += 1;
        }
    }

    let boundary: Vec<(u32, u32)> = faces
        .iter()
        .flat_map(|&f| face_edges(f))
        .filter(|&(a, b)| a != b && counts.get(&undirected(a, b)) == Some(&1))
        .collect();
    if boundary.is_empty() {
        return Ok(Vec::new());
    }
    debug!("Found {} boundary edges", boundary.len());

    let mut neighbours: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(a, b) in &boundary {
        neighbours.entry(a).or_default().push(b);
        neighbours.entry(b).or_default().push(a);
    }

    let mut used: HashSet<(u32, u32)> = HashSet::with_capacity(boundary.len());
    let mut loops = Vec::new();
    for &(origin, first) in &boundary {
        if !used.insert(undirected(origin, first)) {
            continue;
        }
        let mut vertices = vec![origin];
        let mut current = first;
        while current != origin {
            vertices.push(current);
            let next = neighbours.get(&current).and_then(|ns| {
                ns.iter()
                    .copied()
                    .find(|&n| !used.contains(&undirected(current, n)))
            });
            let Some(next) = next else {
                warn!("Boundary chain starting at vertex {origin} does not close");
                return Err(FlatSurfError::DegenerateGeometry(format!(
                    "boundary chain from vertex {origin} ends at vertex {current} without closing"
                )));
            };
            used.insert(undirected(current, next));
            current = next;
        }
        loops.push(BoundaryLoop { vertices });
    }

    debug!("Traced {} boundary loops", loops.len());
    Ok(loops)
}
