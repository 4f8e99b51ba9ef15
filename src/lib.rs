pub mod error;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod render;

pub use error::{FlatSurfError, Result};
pub use mesh::{BoundaryLoop, FlatSurface, TriangleMesh};
pub use operations::{rasterize, GridMask};
