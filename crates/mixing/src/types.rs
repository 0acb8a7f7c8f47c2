//! Core data types for stroke orchestration

use glam::Vec2;
use serde::{Deserialize, Serialize};
use terrain::BrushStamp;

/// Opaque gesture token from the host's undo-group mechanism.
///
/// Changes exactly once per press-drag-release cycle; the engine only ever
/// compares tokens for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GestureId(pub u64);

/// Module classification that drives deferral and ordering rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleCategory {
    /// Deforms the heightfield (smooth, path, erosion, ...)
    Shape,
    /// Composites a texture overlay strictly after underlay effects
    Paint,
    /// Paints the texture underlay the paint category sits on
    Underlay,
}

impl ModuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleCategory::Shape => "Shape",
            ModuleCategory::Paint => "Paint",
            ModuleCategory::Underlay => "Underlay",
        }
    }
}

/// What part of the surface a mutation touches, for undo capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Height,
    Overlay,
}

/// Global brush settings, snapshotted per batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BrushSettings {
    /// Brush diameter in surface cells
    pub size: f32,
    /// Stroke strength 0..1
    pub strength: f32,
    /// Brush rotation in degrees
    pub rotation_degrees: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size: 40.0,
            strength: 0.1,
            rotation_degrees: 0.0,
        }
    }
}

/// One sampled point of a stroke, immutable once produced by the input layer
#[derive(Debug, Clone, Copy)]
pub struct StrokeSegment {
    /// Current sample position in 0..1 surface coordinates
    pub curr_uv: Vec2,
    /// Previous sample position
    pub prev_uv: Vec2,
    /// Stroke-relative progress fraction 0..1
    pub progress: f32,
    /// Accumulated displacement from the stroke start
    pub stroke: Vec2,
    /// Position where the stroke started
    pub start_uv: Vec2,
    /// Normalized surface height at the stroke start
    pub start_height: f32,
    /// Accumulated height displacement along the stroke
    pub height_delta: f32,
}

/// Editing context captured alongside a batch: the brush stamp shape and the
/// raycast hit the input layer resolved for it
#[derive(Debug, Clone, Copy)]
pub struct EditContext {
    pub stamp: BrushStamp,
    pub hit_uv: Vec2,
    pub hit_valid: bool,
}

impl Default for EditContext {
    fn default() -> Self {
        Self {
            stamp: BrushStamp::default(),
            hit_uv: Vec2::ZERO,
            hit_valid: true,
        }
    }
}

/// One slice of stroke samples delivered together, with the brush settings
/// snapshot valid for it
#[derive(Debug, Clone)]
pub struct Batch {
    pub segments: Vec<StrokeSegment>,
    pub settings: BrushSettings,
    pub context: EditContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_settings_default() {
        let settings = BrushSettings::default();
        assert_eq!(settings.size, 40.0);
        assert_eq!(settings.strength, 0.1);
        assert_eq!(settings.rotation_degrees, 0.0);
    }

    #[test]
    fn test_gesture_id_equality() {
        assert_eq!(GestureId(3), GestureId(3));
        assert_ne!(GestureId(3), GestureId(4));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(ModuleCategory::Shape.as_str(), "Shape");
        assert_eq!(ModuleCategory::Paint.as_str(), "Paint");
        assert_eq!(ModuleCategory::Underlay.as_str(), "Underlay");
    }
}
