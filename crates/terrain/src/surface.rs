//! Combined terrain surface with tiled dirty tracking
//!
//! [`TerrainSurface`] owns the heightfield and its overlay layers and tracks
//! which tiles have been modified since the last sync. Tiles are also the
//! granularity of undo capture: the engine snapshots and restores whole tiles.

use std::collections::HashSet;

use glam::Vec2;
use tracing::debug;

use crate::constants::DEFAULT_TILE_SIZE;
use crate::error::SurfaceError;
use crate::footprint::BrushFootprint;
use crate::heightfield::Heightfield;
use crate::overlay::{OverlayId, OverlayLayer};
use crate::tiles::{CellRect, TileCoord};

/// A heightfield plus overlay layers with tiled dirty tracking
pub struct TerrainSurface {
    heights: Heightfield,
    overlays: Vec<OverlayLayer>,
    tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    dirty_tiles: HashSet<TileCoord>,
}

impl TerrainSurface {
    /// Create a new surface with the given dimensions and tile size
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let tiles_x = width.div_ceil(tile_size);
        let tiles_y = height.div_ceil(tile_size);

        Self {
            heights: Heightfield::new(width, height),
            overlays: Vec::new(),
            tile_size,
            tiles_x,
            tiles_y,
            dirty_tiles: HashSet::new(),
        }
    }

    /// Create a new surface with the default tile size
    pub fn with_default_tile_size(width: u32, height: u32) -> Self {
        Self::new(width, height, DEFAULT_TILE_SIZE)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.heights.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.heights.height
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    #[inline]
    pub fn tiles_x(&self) -> u32 {
        self.tiles_x
    }

    #[inline]
    pub fn tiles_y(&self) -> u32 {
        self.tiles_y
    }

    /// Get the underlying heightfield
    #[inline]
    pub fn heights(&self) -> &Heightfield {
        &self.heights
    }

    /// Get mutable access to the underlying heightfield
    #[inline]
    pub fn heights_mut(&mut self) -> &mut Heightfield {
        &mut self.heights
    }

    /// Add an overlay layer with the given name
    pub fn add_overlay(&mut self, name: impl Into<String>) -> Result<OverlayId, SurfaceError> {
        let name = name.into();
        if self.overlays.iter().any(|layer| layer.name == name) {
            return Err(SurfaceError::DuplicateOverlay(name));
        }
        debug!("adding overlay layer `{name}`");
        self.overlays
            .push(OverlayLayer::new(name, self.width(), self.height()));
        Ok(self.overlays.len() - 1)
    }

    /// Look up an overlay layer by name
    pub fn overlay_id(&self, name: &str) -> Option<OverlayId> {
        self.overlays.iter().position(|layer| layer.name == name)
    }

    pub fn overlay(&self, id: OverlayId) -> Result<&OverlayLayer, SurfaceError> {
        self.overlays.get(id).ok_or(SurfaceError::UnknownOverlay(id))
    }

    pub fn overlay_mut(&mut self, id: OverlayId) -> Result<&mut OverlayLayer, SurfaceError> {
        self.overlays
            .get_mut(id)
            .ok_or(SurfaceError::UnknownOverlay(id))
    }

    #[inline]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Resolve a brush placement against this surface.
    ///
    /// `uv` is the brush center in 0..1 coordinates, `size` the diameter in
    /// cells. Errors if the size is unusable or the brush misses the surface.
    pub fn footprint(
        &self,
        uv: Vec2,
        size: f32,
        rotation_degrees: f32,
    ) -> Result<BrushFootprint, SurfaceError> {
        if size <= 0.0 {
            return Err(SurfaceError::InvalidBrushSize(size));
        }
        BrushFootprint::resolve(uv, size, rotation_degrees, self.width(), self.height()).ok_or(
            SurfaceError::RegionOutsideSurface { u: uv.x, v: uv.y },
        )
    }

    /// Copy height data for a rect, row-major.
    /// Cells are read with clamping so the caller can sample freely inside.
    pub fn height_region(&self, rect: CellRect) -> Vec<f32> {
        let mut data = Vec::with_capacity(rect.cell_count());
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                data.push(self.heights.get(x, y).unwrap_or(0.0));
            }
        }
        data
    }

    /// Mark a cell as modified (marks containing tile dirty)
    #[inline]
    pub fn mark_dirty(&mut self, x: u32, y: u32) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        self.dirty_tiles.insert(TileCoord {
            x: x / self.tile_size,
            y: y / self.tile_size,
        });
    }

    /// Mark a rectangular region as dirty
    pub fn mark_region_dirty(&mut self, rect: CellRect) {
        for tile in rect.tiles(self.tile_size) {
            self.dirty_tiles.insert(tile);
        }
    }

    /// Tiles covered by a cell rect
    pub fn tiles_for_rect(&self, rect: CellRect) -> Vec<TileCoord> {
        rect.tiles(self.tile_size)
    }

    /// Get all dirty tiles and clear the dirty set
    pub fn take_dirty_tiles(&mut self) -> Vec<TileCoord> {
        self.dirty_tiles.drain().collect()
    }

    /// Check if any tiles are dirty
    #[inline]
    pub fn has_dirty_tiles(&self) -> bool {
        !self.dirty_tiles.is_empty()
    }

    /// Get the number of dirty tiles
    #[inline]
    pub fn dirty_tile_count(&self) -> usize {
        self.dirty_tiles.len()
    }

    /// Cell bounds of a tile (smaller at the surface edges)
    pub fn tile_bounds(&self, coord: TileCoord) -> CellRect {
        let x0 = coord.x * self.tile_size;
        let y0 = coord.y * self.tile_size;
        CellRect {
            x0,
            y0,
            x1: (x0 + self.tile_size).min(self.width()),
            y1: (y0 + self.tile_size).min(self.height()),
        }
    }

    /// Copy a tile's height data, row-major
    pub fn height_tile_data(&self, coord: TileCoord) -> Vec<f32> {
        self.height_region(self.tile_bounds(coord))
    }

    /// Restore a tile's height data from a snapshot and mark it dirty
    pub fn restore_height_tile(&mut self, coord: TileCoord, data: &[f32]) {
        let bounds = self.tile_bounds(coord);
        let mut idx = 0;
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                if idx < data.len() {
                    self.heights.set(x, y, data[idx]);
                    idx += 1;
                }
            }
        }
        self.mark_dirty(bounds.x0, bounds.y0);
    }

    /// Copy a tile's weight data for one overlay layer, row-major
    pub fn overlay_tile_data(
        &self,
        id: OverlayId,
        coord: TileCoord,
    ) -> Result<Vec<f32>, SurfaceError> {
        let bounds = self.tile_bounds(coord);
        let layer = self.overlay(id)?;

        let mut data = Vec::with_capacity(bounds.cell_count());
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                data.push(layer.weight(x, y).unwrap_or(0.0));
            }
        }
        Ok(data)
    }

    /// Restore a tile's weight data for one overlay layer and mark it dirty
    pub fn restore_overlay_tile(
        &mut self,
        id: OverlayId,
        coord: TileCoord,
        data: &[f32],
    ) -> Result<(), SurfaceError> {
        let bounds = self.tile_bounds(coord);
        let layer = self
            .overlays
            .get_mut(id)
            .ok_or(SurfaceError::UnknownOverlay(id))?;

        let mut idx = 0;
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                if idx < data.len() {
                    layer.set_weight(x, y, data[idx]);
                    idx += 1;
                }
            }
        }
        self.mark_dirty(bounds.x0, bounds.y0);
        Ok(())
    }
}
