//! Shared constants for terrain surfaces

/// Default tile edge length in cells for dirty tracking and undo capture
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Smallest usable brush diameter in cells
pub const MIN_BRUSH_SIZE: f32 = 1.0;
