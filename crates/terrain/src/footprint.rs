//! Brush footprint computation
//!
//! A footprint is the bounded cell region a brush placement touches, plus the
//! per-cell weight of the brush stamp inside it. Kernels iterate the rect and
//! scale their effect by the weight; cells with zero weight are untouched.

use glam::Vec2;

use crate::tiles::CellRect;

/// Procedural brush stamp shape
///
/// The stamp is an ellipse with a hardness-controlled falloff. `aspect` below
/// 1.0 squashes the stamp across its rotated minor axis, which is what makes
/// brush rotation observable.
#[derive(Debug, Clone, Copy)]
pub struct BrushStamp {
    /// Falloff hardness: 0.0 = soft, 1.0 = hard edge
    pub hardness: f32,
    /// Minor/major axis ratio, 0 < aspect <= 1
    pub aspect: f32,
}

impl Default for BrushStamp {
    fn default() -> Self {
        Self {
            hardness: 0.8,
            aspect: 1.0,
        }
    }
}

impl BrushStamp {
    pub fn new(hardness: f32, aspect: f32) -> Self {
        Self {
            hardness: hardness.clamp(0.0, 1.0),
            aspect: aspect.clamp(0.05, 1.0),
        }
    }
}

/// A brush placement resolved to surface cells
#[derive(Debug, Clone, Copy)]
pub struct BrushFootprint {
    /// Brush center in cell coordinates
    pub center: Vec2,
    /// Brush radius in cells
    pub radius: f32,
    /// Brush rotation in radians
    rotation: f32,
    /// Bounding rect on the surface, clamped
    pub rect: CellRect,
}

impl BrushFootprint {
    /// Resolve a brush placement to a footprint.
    ///
    /// `uv` is the brush center in 0..1 surface coordinates, `size` the brush
    /// diameter in cells. Returns None when the brush does not intersect the
    /// surface at all.
    pub fn resolve(
        uv: Vec2,
        size: f32,
        rotation_degrees: f32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        if size <= 0.0 {
            return None;
        }

        let center = Vec2::new(uv.x * width as f32, uv.y * height as f32);
        let radius = size / 2.0;

        let rect = CellRect::clamped(
            (center.x - radius).floor() as i64,
            (center.y - radius).floor() as i64,
            (center.x + radius).ceil() as i64,
            (center.y + radius).ceil() as i64,
            width,
            height,
        )?;

        Some(Self {
            center,
            radius,
            rotation: rotation_degrees.to_radians(),
            rect,
        })
    }

    /// Stamp weight at the given cell, 0.0 outside the stamp.
    pub fn weight(&self, x: u32, y: u32, stamp: &BrushStamp) -> f32 {
        // Offset of the cell center from the brush center, in brush space
        let dx = (x as f32 + 0.5) - self.center.x;
        let dy = (y as f32 + 0.5) - self.center.y;

        let (sin, cos) = self.rotation.sin_cos();
        let major = dx * cos + dy * sin;
        let minor = (-dx * sin + dy * cos) / stamp.aspect;

        let distance = (major * major + minor * minor).sqrt();
        let normalized = distance / self.radius;
        if normalized > 1.0 {
            return 0.0;
        }

        hardness_falloff(normalized, stamp.hardness)
    }
}

/// Falloff based on hardness
/// `normalized` is 0 at center, 1 at edge; hardness is 0.0 (soft) to 1.0 (hard)
#[inline]
pub fn hardness_falloff(normalized: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        if normalized <= 1.0 { 1.0 } else { 0.0 }
    } else {
        let t = normalized.clamp(0.0, 1.0);
        let soft = 1.0 - t;
        let hard = 1.0;
        soft * (1.0 - hardness) + hard * hardness
    }
}
