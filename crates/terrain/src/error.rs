use thiserror::Error;

/// Error type for surface access operations.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("brush region at uv ({u:.3}, {v:.3}) does not intersect the surface")]
    RegionOutsideSurface { u: f32, v: f32 },
    #[error("invalid brush size: {0}")]
    InvalidBrushSize(f32),
    #[error("unknown overlay layer index: {0}")]
    UnknownOverlay(usize),
    #[error("overlay layer `{0}` already exists")]
    DuplicateOverlay(String),
}
