use thiserror::Error;

/// Top-level error type for flat surface rasterization.
#[derive(Debug, Error)]
pub enum FlatSurfError {
    #[error(
        "surface is not sufficiently flat with max_deformation={max_deformation:.3} \
         (worst face deviates by {worst:.3})"
    )]
    Flatness { max_deformation: f64, worst: f64 },

    #[error("surface has no face with a defined normal")]
    NoValidFaces,

    #[error("shape mismatch: expected {expected} values, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("interpolation failed: {0}")]
    Interpolation(String),
}

impl FlatSurfError {
    /// Returns `true` for failures of the flatness gate.
    #[must_use]
    pub fn is_flatness(&self) -> bool {
        matches!(self, Self::Flatness { .. } | Self::NoValidFaces)
    }
}

/// Convenience type alias for results using [`FlatSurfError`].
pub type Result<T> = std::result::Result<T, FlatSurfError>;
