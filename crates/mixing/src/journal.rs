//! Per-gesture tile snapshots for undo
//!
//! The journal stores the pre-mutation contents of every tile a gesture
//! touches, captured through [`GestureUndoCoordinator::register_once`] so
//! each tile is captured at most once per mutation category. Undoing a
//! gesture restores its tiles in one step.
//!
//! [`GestureUndoCoordinator::register_once`]: crate::undo::GestureUndoCoordinator::register_once

use tracing::{debug, warn};

use terrain::{OverlayId, SurfaceError, TerrainSurface, TileCoord};

use crate::types::GestureId;

/// Captured pre-mutation contents of one tile
#[derive(Debug, Clone)]
pub enum TileSnapshotData {
    /// Height data, row-major
    Height(Vec<f32>),
    /// Weight data for every overlay layer present at capture time
    Overlays(Vec<(OverlayId, Vec<f32>)>),
}

#[derive(Debug, Clone)]
pub struct TileSnapshot {
    pub coord: TileCoord,
    pub data: TileSnapshotData,
}

/// All snapshots captured during one gesture
#[derive(Debug)]
pub struct GestureUndoEntry {
    pub gesture: GestureId,
    snapshots: Vec<TileSnapshot>,
}

impl GestureUndoEntry {
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }
}

/// Undo storage: one entry per completed (or aborted) gesture
#[derive(Debug, Default)]
pub struct UndoJournal {
    open: Option<GestureUndoEntry>,
    entries: Vec<GestureUndoEntry>,
}

impl UndoJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh entry for the given gesture, committing any entry left
    /// open by an unfinished gesture.
    pub fn begin_gesture(&mut self, gesture: GestureId) {
        self.commit_gesture();
        self.open = Some(GestureUndoEntry {
            gesture,
            snapshots: Vec::new(),
        });
    }

    /// Capture a tile's height data into the open entry.
    pub fn capture_height_tile(
        &mut self,
        surface: &TerrainSurface,
        coord: TileCoord,
    ) -> Result<(), SurfaceError> {
        let Some(entry) = self.open.as_mut() else {
            warn!("height capture for tile ({}, {}) outside a gesture, dropping", coord.x, coord.y);
            return Ok(());
        };

        entry.snapshots.push(TileSnapshot {
            coord,
            data: TileSnapshotData::Height(surface.height_tile_data(coord)),
        });
        Ok(())
    }

    /// Capture a tile's weight data for all overlay layers into the open
    /// entry.
    pub fn capture_overlay_tile(
        &mut self,
        surface: &TerrainSurface,
        coord: TileCoord,
    ) -> Result<(), SurfaceError> {
        let Some(entry) = self.open.as_mut() else {
            warn!("overlay capture for tile ({}, {}) outside a gesture, dropping", coord.x, coord.y);
            return Ok(());
        };

        let mut layers = Vec::with_capacity(surface.overlay_count());
        for id in 0..surface.overlay_count() {
            layers.push((id, surface.overlay_tile_data(id, coord)?));
        }

        entry.snapshots.push(TileSnapshot {
            coord,
            data: TileSnapshotData::Overlays(layers),
        });
        Ok(())
    }

    /// Close the open entry and push it onto the undo stack.
    /// Entries without snapshots are dropped.
    pub fn commit_gesture(&mut self) {
        if let Some(entry) = self.open.take() {
            if entry.snapshots.is_empty() {
                return;
            }
            debug!(
                "gesture {:?} committed with {} tile snapshots",
                entry.gesture,
                entry.snapshots.len()
            );
            self.entries.push(entry);
        }
    }

    /// Number of snapshots captured for the gesture in flight
    pub fn open_snapshot_count(&self) -> usize {
        self.open.as_ref().map_or(0, |e| e.snapshots.len())
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.entries.len()
    }

    /// Restore the most recent gesture's tiles.
    ///
    /// Returns true if an entry was restored. Snapshots of overlay layers
    /// that no longer exist are skipped with a warning.
    pub fn undo(&mut self, surface: &mut TerrainSurface) -> bool {
        let Some(entry) = self.entries.pop() else {
            debug!("undo: no entries available");
            return false;
        };

        debug!(
            "undoing gesture {:?} ({} tiles)",
            entry.gesture,
            entry.snapshots.len()
        );

        for snapshot in &entry.snapshots {
            match &snapshot.data {
                TileSnapshotData::Height(data) => {
                    surface.restore_height_tile(snapshot.coord, data);
                }
                TileSnapshotData::Overlays(layers) => {
                    for (id, data) in layers {
                        if let Err(e) = surface.restore_overlay_tile(*id, snapshot.coord, data) {
                            warn!("skipping overlay restore: {e}");
                        }
                    }
                }
            }
        }

        true
    }
}
