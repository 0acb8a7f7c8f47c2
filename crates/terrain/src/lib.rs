//! Terramix terrain surface - heightfield and overlay storage
//!
//! This crate provides the deformable surface the stroke engine mutates:
//! - [`heightfield::Heightfield`] - CPU heightfield storage (normalized f32)
//! - [`overlay::OverlayLayer`] - per-layer texture weight maps
//! - [`surface::TerrainSurface`] - combined surface with tiled dirty tracking
//!   and per-tile snapshot/restore
//! - [`footprint`] - brush footprint computation (UV + size + rotation to a
//!   bounded cell region with per-cell weights)

pub mod constants;
pub mod error;
pub mod footprint;
pub mod heightfield;
pub mod overlay;
pub mod surface;
pub mod tiles;

pub use constants::*;
pub use error::*;
pub use footprint::*;
pub use heightfield::*;
pub use overlay::*;
pub use surface::*;
pub use tiles::*;
