//! Shaping modules
//!
//! A module is one pluggable effect contributed to every stroke batch. The
//! set of module kinds is closed: each variant of [`ModuleKind`] carries its
//! own parameter struct and dispatches to a CPU kernel. New kinds are added
//! here and in the default registry, not discovered at runtime.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApplyError;
use crate::kernels::{self, ApplyCtx};
use crate::types::{BrushSettings, ModuleCategory, StrokeSegment};

/// A linear profile over the stroke progress fraction
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrokeProfile {
    pub start: f32,
    pub end: f32,
}

impl StrokeProfile {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Evaluate at progress `t` (0..1)
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        self.start + (self.end - self.start) * t
    }
}

/// Parameters for the path-carving module
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PathParams {
    /// Path width over the stroke, as a scale of the module brush size
    pub width_profile: StrokeProfile,
    /// Extra height offset over the stroke
    pub height_profile: StrokeProfile,
    /// Carve strength over the stroke
    pub strength_profile: StrokeProfile,
}

impl Default for PathParams {
    fn default() -> Self {
        Self {
            width_profile: StrokeProfile::new(1.0, 1.0),
            height_profile: StrokeProfile::new(0.0, 0.0),
            strength_profile: StrokeProfile::new(1.0, 1.0),
        }
    }
}

/// Parameters for the smoothing module
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmoothParams {
    /// Blur direction: -1.0 only down, 1.0 only up, 0.0 both
    pub direction: f32,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self { direction: 0.0 }
    }
}

/// Parameters for the smudge module
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SmudgeParams {}

/// Parameters for the ridge erosion module
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RidgeErodeParams {
    /// Erosion strength 0..128
    pub strength: f32,
    /// Sharpness 0..1
    pub sharpness: f32,
}

impl Default for RidgeErodeParams {
    fn default() -> Self {
        Self {
            strength: 16.0,
            sharpness: 0.7,
        }
    }
}

/// Parameters for the height module
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HeightParams {
    /// Lower instead of raise
    pub invert: bool,
}

/// Parameters for the overlay-painting modules (underlay and paint)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlayParams {
    /// Target overlay layer name; painting fails locally until one is selected
    pub layer: Option<String>,
}

/// The closed set of module kinds
#[derive(Debug, Clone)]
pub enum ModuleKind {
    Path(PathParams),
    Smooth(SmoothParams),
    Smudge(SmudgeParams),
    RidgeErode(RidgeErodeParams),
    Height(HeightParams),
    Underlay(OverlayParams),
    Paint(OverlayParams),
}

impl ModuleKind {
    /// Stable registry key used in persisted configuration
    pub fn key(&self) -> &'static str {
        match self {
            ModuleKind::Path(_) => "path",
            ModuleKind::Smooth(_) => "smooth",
            ModuleKind::Smudge(_) => "smudge",
            ModuleKind::RidgeErode(_) => "ridge_erode",
            ModuleKind::Height(_) => "height",
            ModuleKind::Underlay(_) => "underlay",
            ModuleKind::Paint(_) => "paint",
        }
    }

    /// Display name shown to the user
    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleKind::Path(_) => "Path",
            ModuleKind::Smooth(_) => "Smooth",
            ModuleKind::Smudge(_) => "Smudge",
            ModuleKind::RidgeErode(_) => "Erosion",
            ModuleKind::Height(_) => "Height",
            ModuleKind::Underlay(_) => "Underlay",
            ModuleKind::Paint(_) => "Paint",
        }
    }

    pub fn category(&self) -> ModuleCategory {
        match self {
            ModuleKind::Paint(_) => ModuleCategory::Paint,
            ModuleKind::Underlay(_) => ModuleCategory::Underlay,
            _ => ModuleCategory::Shape,
        }
    }

    /// Brush preview tint for this kind
    pub fn preview_color(&self) -> [f32; 4] {
        match self {
            ModuleKind::Path(_) => [0.6, 0.6, 1.0, 0.7],
            ModuleKind::Smooth(_) => [0.5, 0.5, 0.5, 0.8],
            ModuleKind::Smudge(_) => [0.5, 0.7, 0.5, 0.8],
            ModuleKind::RidgeErode(_) => [1.0, 0.7, 0.5, 0.2],
            ModuleKind::Height(_) => [1.0, 1.0, 0.4, 0.3],
            ModuleKind::Underlay(_) => [1.0, 0.6, 0.0, 0.6],
            ModuleKind::Paint(_) => [1.0, 0.4, 0.4, 0.6],
        }
    }

    /// Serialize this kind's parameters for persistence
    pub(crate) fn params_value(&self) -> serde_json::Value {
        let result = match self {
            ModuleKind::Path(p) => serde_json::to_value(p),
            ModuleKind::Smooth(p) => serde_json::to_value(p),
            ModuleKind::Smudge(p) => serde_json::to_value(p),
            ModuleKind::RidgeErode(p) => serde_json::to_value(p),
            ModuleKind::Height(p) => serde_json::to_value(p),
            ModuleKind::Underlay(p) => serde_json::to_value(p),
            ModuleKind::Paint(p) => serde_json::to_value(p),
        };
        result.unwrap_or_else(|e| {
            warn!("failed to serialize module params: {e}");
            serde_json::Value::Null
        })
    }

    /// Rebuild a kind from its registry key and persisted parameters.
    ///
    /// Unknown keys return None; unreadable parameters fall back to the
    /// kind's defaults. Both are configuration errors and therefore
    /// non-fatal.
    pub fn from_config(key: &str, params: &serde_json::Value) -> Option<Self> {
        fn parse<T: Default + serde::de::DeserializeOwned>(params: &serde_json::Value) -> T {
            if params.is_null() {
                return T::default();
            }
            serde_json::from_value(params.clone()).unwrap_or_else(|e| {
                warn!("unreadable module params, using defaults: {e}");
                T::default()
            })
        }

        match key {
            "path" => Some(ModuleKind::Path(parse(params))),
            "smooth" => Some(ModuleKind::Smooth(parse(params))),
            "smudge" => Some(ModuleKind::Smudge(parse(params))),
            "ridge_erode" => Some(ModuleKind::RidgeErode(parse(params))),
            "height" => Some(ModuleKind::Height(parse(params))),
            "underlay" => Some(ModuleKind::Underlay(parse(params))),
            "paint" => Some(ModuleKind::Paint(parse(params))),
            _ => None,
        }
    }
}

/// Brush preview descriptor for one module, in preview order
#[derive(Debug, Clone, PartialEq)]
pub struct ModulePreview {
    pub name: String,
    pub color: [f32; 4],
    /// Effective brush diameter in cells
    pub size: f32,
}

/// One shaping module of the stack
#[derive(Debug, Clone)]
pub struct Module {
    pub kind: ModuleKind,
    pub name: String,
    pub active: bool,
    /// Brush size as a percentage of the main brush size
    pub brush_size_pct: f32,
    /// Brush strength percentage
    pub brush_strength_pct: f32,
    /// Sort key for brush previews
    pub preview_order: i32,
    /// Sort key for effect application
    pub apply_order: i32,
}

impl Module {
    pub fn new(
        kind: ModuleKind,
        active: bool,
        brush_size_pct: f32,
        brush_strength_pct: f32,
        preview_order: i32,
        apply_order: i32,
    ) -> Self {
        let name = kind.display_name().to_string();
        Self {
            kind,
            name,
            active,
            brush_size_pct,
            brush_strength_pct,
            preview_order,
            apply_order,
        }
    }

    #[inline]
    pub fn category(&self) -> ModuleCategory {
        self.kind.category()
    }

    /// Effective brush diameter: the module size is relative to the main
    /// brush size
    #[inline]
    pub fn effective_size(&self, settings: &BrushSettings) -> f32 {
        settings.size * self.brush_size_pct / 100.0
    }

    /// Module strength as a 0..1 factor
    #[inline]
    pub fn strength_factor(&self) -> f32 {
        self.brush_strength_pct / 100.0
    }

    /// Brush preview contribution. Pure: depends only on the arguments and
    /// the module's own parameters.
    pub fn preview(&self, settings: &BrushSettings) -> ModulePreview {
        ModulePreview {
            name: self.name.clone(),
            color: self.kind.preview_color(),
            size: self.effective_size(settings),
        }
    }

    /// Apply this module's effect for one stroke segment.
    pub(crate) fn apply_segment(
        &self,
        segment: &StrokeSegment,
        ctx: &mut ApplyCtx<'_>,
    ) -> Result<(), ApplyError> {
        match &self.kind {
            ModuleKind::Path(p) => kernels::path::apply(p, self, segment, ctx),
            ModuleKind::Smooth(p) => kernels::smooth::apply(p, self, segment, ctx),
            ModuleKind::Smudge(p) => kernels::smudge::apply(p, self, segment, ctx),
            ModuleKind::RidgeErode(p) => kernels::ridge_erode::apply(p, self, segment, ctx),
            ModuleKind::Height(p) => kernels::height::apply(p, self, segment, ctx),
            ModuleKind::Underlay(p) | ModuleKind::Paint(p) => {
                kernels::overlay::apply(p, self, segment, ctx)
            }
        }
    }
}

/// The canonical default module set.
///
/// Insertion order and priorities match the stock stack; no two defaults
/// share a priority.
pub fn default_modules() -> Vec<Module> {
    vec![
        //          kind                                          active  size%  strength%  preview  apply
        Module::new(ModuleKind::Paint(OverlayParams::default()), true, 80.0, 100.0, 7, 7),
        Module::new(ModuleKind::Path(PathParams::default()), true, 100.0, 100.0, 3, 1),
        Module::new(ModuleKind::Smooth(SmoothParams::default()), true, 150.0, 20.0, 1, 2),
        Module::new(ModuleKind::Height(HeightParams::default()), false, 100.0, 20.0, 4, 4),
        Module::new(ModuleKind::RidgeErode(RidgeErodeParams::default()), false, 150.0, 16.0, 5, 5),
        Module::new(ModuleKind::Smudge(SmudgeParams::default()), false, 150.0, 20.0, 2, 3),
        Module::new(ModuleKind::Underlay(OverlayParams::default()), false, 140.0, 100.0, 6, 6),
    ]
}
