//! Gesture-scoped undo registration
//!
//! Every surface mutation passes through the coordinator before it is allowed
//! to touch the surface. The coordinator guarantees that the expensive
//! snapshot-for-undo capture runs at most once per (tile, mutation category)
//! pair within a gesture, no matter how many modules or batches touch that
//! tile.

use std::collections::HashSet;

use tracing::debug;

use terrain::TileCoord;

use crate::types::{GestureId, MutationKind};

/// Tracks the current gesture identity and the mutation targets already
/// captured for it
#[derive(Debug, Default)]
pub struct GestureUndoCoordinator {
    current: Option<GestureId>,
    registered: HashSet<(TileCoord, MutationKind)>,
}

impl GestureUndoCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the stored gesture token; on a new token, clear the
    /// registered set and store it. Returns true if a new gesture started.
    ///
    /// Must be called before the first registration of every apply pass.
    pub fn begin_if_new_gesture(&mut self, gesture: GestureId) -> bool {
        if self.current == Some(gesture) {
            return false;
        }
        debug!("new gesture {gesture:?}, clearing {} registered targets", self.registered.len());
        self.current = Some(gesture);
        self.registered.clear();
        true
    }

    /// Run `record` exactly once per (target, category) pair per gesture.
    ///
    /// Returns Ok(true) if the capture ran now, Ok(false) if the pair was
    /// already registered. If `record` fails, the pair is NOT marked
    /// registered, so the capture is retried on the next touch; the caller's
    /// mutation still proceeds (best-effort undo, not a fatal error).
    pub fn register_once<E, F>(
        &mut self,
        target: TileCoord,
        category: MutationKind,
        record: F,
    ) -> Result<bool, E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        let key = (target, category);
        if self.registered.contains(&key) {
            return Ok(false);
        }

        record()?;
        self.registered.insert(key);
        Ok(true)
    }

    /// Gesture token the coordinator currently tracks
    pub fn current_gesture(&self) -> Option<GestureId> {
        self.current
    }

    /// Number of (target, category) pairs registered for the current gesture
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x: u32, y: u32) -> TileCoord {
        TileCoord { x, y }
    }

    #[test]
    fn test_record_runs_once_per_pair() {
        let mut coordinator = GestureUndoCoordinator::new();
        coordinator.begin_if_new_gesture(GestureId(1));

        let mut calls = 0;
        for touch in 0..5 {
            let ran = coordinator
                .register_once::<(), _>(tile(0, 0), MutationKind::Height, || {
                    calls += 1;
                    Ok(())
                })
                .unwrap();
            // Only the first touch actually records
            assert_eq!(ran, touch == 0);
        }

        assert_eq!(calls, 1);
        assert_eq!(coordinator.registered_count(), 1);
    }

    #[test]
    fn test_distinct_pairs_each_record() {
        let mut coordinator = GestureUndoCoordinator::new();
        coordinator.begin_if_new_gesture(GestureId(1));

        let mut calls = 0;
        let mut record = |coordinator: &mut GestureUndoCoordinator, t, k| {
            coordinator
                .register_once::<(), _>(t, k, || {
                    calls += 1;
                    Ok(())
                })
                .unwrap();
        };

        // N modules and M batches touching the same targets: simulate with
        // repeated touches of three distinct pairs
        for _ in 0..4 {
            record(&mut coordinator, tile(0, 0), MutationKind::Height);
            record(&mut coordinator, tile(0, 0), MutationKind::Overlay);
            record(&mut coordinator, tile(1, 0), MutationKind::Height);
        }

        assert_eq!(calls, 3);
        assert_eq!(coordinator.registered_count(), 3);
    }

    #[test]
    fn test_failed_record_is_retried() {
        let mut coordinator = GestureUndoCoordinator::new();
        coordinator.begin_if_new_gesture(GestureId(1));

        let result: Result<bool, &str> =
            coordinator.register_once(tile(0, 0), MutationKind::Height, || Err("disk full"));
        assert!(result.is_err());
        assert_eq!(coordinator.registered_count(), 0);

        // Next touch retries and succeeds
        let ran = coordinator
            .register_once::<(), _>(tile(0, 0), MutationKind::Height, || Ok(()))
            .unwrap();
        assert!(ran);
        assert_eq!(coordinator.registered_count(), 1);
    }

    #[test]
    fn test_new_gesture_clears_registrations() {
        let mut coordinator = GestureUndoCoordinator::new();

        assert!(coordinator.begin_if_new_gesture(GestureId(1)));
        coordinator
            .register_once::<(), _>(tile(0, 0), MutationKind::Height, || Ok(()))
            .unwrap();
        assert_eq!(coordinator.registered_count(), 1);

        // Same token again: nothing changes
        assert!(!coordinator.begin_if_new_gesture(GestureId(1)));
        assert_eq!(coordinator.registered_count(), 1);

        // New token: the set resets and the same pair records again
        assert!(coordinator.begin_if_new_gesture(GestureId(2)));
        assert_eq!(coordinator.registered_count(), 0);

        let mut calls = 0;
        coordinator
            .register_once::<(), _>(tile(0, 0), MutationKind::Height, || {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(calls, 1);
    }
}
