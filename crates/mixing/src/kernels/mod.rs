//! CPU shaping kernels
//!
//! One kernel per module kind. Every kernel follows the same shape: resolve
//! the brush footprint, register the touched tiles with the undo coordinator,
//! walk the footprint applying the effect scaled by the stamp weight, then
//! mark the region dirty. Registration happens before the first mutation of
//! a tile; a failed undo capture is logged and the mutation proceeds.

pub(crate) mod height;
pub(crate) mod overlay;
pub(crate) mod path;
pub(crate) mod ridge_erode;
pub(crate) mod smooth;
pub(crate) mod smudge;

use tracing::warn;

use terrain::{CellRect, TerrainSurface};

use crate::journal::UndoJournal;
use crate::types::{BrushSettings, EditContext, MutationKind};
use crate::undo::GestureUndoCoordinator;

/// Everything a kernel needs for one segment application
pub(crate) struct ApplyCtx<'a> {
    pub surface: &'a mut TerrainSurface,
    pub undo: &'a mut GestureUndoCoordinator,
    pub journal: &'a mut UndoJournal,
    pub settings: &'a BrushSettings,
    pub context: &'a EditContext,
}

/// Register every tile under `rect` for a height mutation, capturing each
/// tile's pre-mutation heights at most once per gesture.
pub(crate) fn register_height_tiles(ctx: &mut ApplyCtx<'_>, rect: CellRect) {
    let ApplyCtx {
        surface,
        undo,
        journal,
        ..
    } = ctx;

    for coord in surface.tiles_for_rect(rect) {
        let result = undo.register_once(coord, MutationKind::Height, || {
            journal.capture_height_tile(surface, coord)
        });
        if let Err(e) = result {
            warn!(
                "height undo capture failed for tile ({}, {}), will retry: {e}",
                coord.x, coord.y
            );
        }
    }
}

/// Register every tile under `rect` for an overlay mutation.
pub(crate) fn register_overlay_tiles(ctx: &mut ApplyCtx<'_>, rect: CellRect) {
    let ApplyCtx {
        surface,
        undo,
        journal,
        ..
    } = ctx;

    for coord in surface.tiles_for_rect(rect) {
        let result = undo.register_once(coord, MutationKind::Overlay, || {
            journal.capture_overlay_tile(surface, coord)
        });
        if let Err(e) = result {
            warn!(
                "overlay undo capture failed for tile ({}, {}), will retry: {e}",
                coord.x, coord.y
            );
        }
    }
}

/// Clamped sampler over a copied height region
pub(crate) struct RegionSampler {
    rect: CellRect,
    data: Vec<f32>,
}

impl RegionSampler {
    /// Copy `rect` (already clamped to the surface) for read-only sampling
    pub fn new(surface: &TerrainSurface, rect: CellRect) -> Self {
        Self {
            rect,
            data: surface.height_region(rect),
        }
    }

    /// Sample with coordinates clamped into the copied region
    #[inline]
    pub fn get(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(self.rect.x0 as i64, self.rect.x1 as i64 - 1);
        let cy = y.clamp(self.rect.y0 as i64, self.rect.y1 as i64 - 1);
        let stride = self.rect.width() as i64;
        self.data[((cy - self.rect.y0 as i64) * stride + (cx - self.rect.x0 as i64)) as usize]
    }

    /// Mean, min and max of the 3x3 neighborhood around a cell
    pub fn neighborhood(&self, x: i64, y: i64) -> (f32, f32, f32) {
        let mut sum = 0.0f32;
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let h = self.get(x + dx, y + dy);
                sum += h;
                min = min.min(h);
                max = max.max(h);
            }
        }
        (sum / 9.0, min, max)
    }
}
