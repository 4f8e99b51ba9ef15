mod grid_axes;
mod grid_mask;
mod project;
mod rasterize;

pub use grid_axes::GridAxes;
pub use grid_mask::{rasterize, GridMask};
pub use project::{mean_face_normal, ProjectSurface, ProjectedPoints};
pub use rasterize::{count_inside, ColumnSegmentIndex, Mask, RasterizeBoundary, Segment};
