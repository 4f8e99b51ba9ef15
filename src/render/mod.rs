mod interpolate;
mod plotter;
mod range;

pub use interpolate::{GridInterpolator, LinearInterpolator};
pub use plotter::{compose, FlatSurfacePlotter, Pixel, PlotParams};
pub use range::{RangeMode, ValueRange};
