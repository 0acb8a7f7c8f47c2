//! Stroke orchestration
//!
//! Drives one gesture from press to release: every incoming batch runs
//! through the stack's apply order, paint-category modules are deferred to
//! the batch queue while an underlay module is also active, and every surface
//! mutation passes through the gesture undo coordinator. Single-threaded and
//! synchronous; one gesture in flight per orchestrator.

use tracing::{debug, info, warn};

use terrain::TerrainSurface;

use crate::journal::UndoJournal;
use crate::module::{Module, ModulePreview};
use crate::queue::{DeferredBatch, DeferredBatchQueue, DEFAULT_DEFERRED_CAPACITY};
use crate::recorder::PathRecorder;
use crate::stack::ModuleStack;
use crate::types::{Batch, BrushSettings, EditContext, GestureId, ModuleCategory};
use crate::undo::GestureUndoCoordinator;

/// One module application that actually ran
#[derive(Debug, Clone)]
pub struct AppliedEffect {
    pub module: String,
    pub category: ModuleCategory,
    /// Position of the batch within the gesture
    pub batch_sequence: usize,
    /// True when this was a deferred paint replay from the queue
    pub deferred: bool,
}

/// What happened while processing one batch
#[derive(Debug, Default)]
pub struct BatchReport {
    pub batch_sequence: usize,
    /// Whether this batch was pushed to the deferred queue
    pub deferred: bool,
    /// Applications in execution order, including any bounded-drain replays
    pub applied: Vec<AppliedEffect>,
    /// Module apply calls that failed and were skipped
    pub failures: usize,
}

/// What happened at gesture end
#[derive(Debug, Default)]
pub struct GestureEndReport {
    pub applied: Vec<AppliedEffect>,
    pub drained_batches: usize,
    pub failures: usize,
}

/// Drives one gesture across the module stack, the deferred queue and the
/// undo machinery
pub struct StrokeOrchestrator {
    pub stack: ModuleStack,
    queue: DeferredBatchQueue,
    undo: GestureUndoCoordinator,
    journal: UndoJournal,
    recorder: PathRecorder,
    gesture: Option<GestureId>,
    batch_count: usize,
}

impl StrokeOrchestrator {
    /// Orchestrator with the default module stack and queue capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_DEFERRED_CAPACITY)
    }

    /// Orchestrator with a custom deferred-queue capacity bound
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: ModuleStack::with_defaults(),
            queue: DeferredBatchQueue::new(capacity),
            undo: GestureUndoCoordinator::new(),
            journal: UndoJournal::new(),
            recorder: PathRecorder::new(),
            gesture: None,
            batch_count: 0,
        }
    }

    /// Start a gesture. Resets the queue, the undo registration set and the
    /// recorded path.
    pub fn begin_gesture(&mut self, gesture: GestureId) {
        if self.gesture.is_some() {
            warn!("begin_gesture while a gesture is active; discarding its queued batches");
        }
        debug!("begin gesture {gesture:?}");
        self.queue.clear();
        self.undo.begin_if_new_gesture(gesture);
        self.journal.begin_gesture(gesture);
        self.recorder.start_recording();
        self.batch_count = 0;
        self.gesture = Some(gesture);
    }

    /// Process one batch during the active gesture.
    ///
    /// Walks the apply order, skipping paint-category modules while deferral
    /// is required, then pushes the batch and runs the bounded drain. The
    /// deferral predicate is re-evaluated per batch: module activity can
    /// change between batches within the same gesture.
    pub fn paint_batch(&mut self, surface: &mut TerrainSurface, batch: Batch) -> BatchReport {
        let Some(gesture) = self.gesture else {
            debug!("paint_batch without an active gesture, ignoring");
            return BatchReport::default();
        };

        let sequence = self.batch_count;
        self.batch_count += 1;

        for segment in &batch.segments {
            self.recorder.add_position(segment.curr_uv);
        }

        self.undo.begin_if_new_gesture(gesture);

        let deferred_required = self.stack.has_active(ModuleCategory::Paint)
            && self.stack.has_active(ModuleCategory::Underlay);

        let mut report = BatchReport {
            batch_sequence: sequence,
            deferred: deferred_required,
            applied: Vec::new(),
            failures: 0,
        };

        let Self {
            stack,
            queue,
            undo,
            journal,
            ..
        } = self;

        for &index in stack.apply_indices() {
            let module = stack.module_at(index);
            if !module.active {
                continue;
            }
            // Paint composites over underlay; when both are active it is
            // replayed from the queue after the underlay state has settled
            if deferred_required && module.category() == ModuleCategory::Paint {
                continue;
            }
            apply_module_to_batch(
                module,
                sequence,
                false,
                &batch,
                surface,
                undo,
                journal,
                &mut report.applied,
                &mut report.failures,
            );
        }

        if deferred_required {
            queue.push(DeferredBatch { sequence, batch });
            let capacity = queue.capacity();
            queue.drain_bounded(capacity, |deferred| {
                apply_paint_modules(
                    stack,
                    &deferred,
                    surface,
                    undo,
                    journal,
                    &mut report.applied,
                    &mut report.failures,
                );
            });
        }

        report
    }

    /// End the gesture: fully drain the deferred queue in FIFO order, then
    /// commit the gesture's undo snapshots.
    pub fn end_gesture(&mut self, surface: &mut TerrainSurface) -> GestureEndReport {
        let mut report = GestureEndReport::default();
        if self.gesture.is_none() {
            debug!("end_gesture without an active gesture, ignoring");
            return report;
        }

        {
            let Self {
                stack,
                queue,
                undo,
                journal,
                ..
            } = self;

            queue.drain_all(|deferred| {
                report.drained_batches += 1;
                apply_paint_modules(
                    stack,
                    &deferred,
                    surface,
                    undo,
                    journal,
                    &mut report.applied,
                    &mut report.failures,
                );
            });
        }

        self.journal.commit_gesture();
        info!(
            "gesture {:?} ended: {} batches, {} deferred drained",
            self.gesture, self.batch_count, report.drained_batches
        );
        self.gesture = None;
        report
    }

    /// Abort the gesture (focus loss, escape). Queued paint effects are
    /// discarded, never applied; inline mutations already on the surface keep
    /// their undo snapshots. Returns the number of discarded batches.
    pub fn abort_gesture(&mut self) -> usize {
        let discarded = self.queue.clear();
        self.journal.commit_gesture();
        if self.gesture.take().is_some() {
            info!("gesture aborted: {discarded} queued batches discarded");
        }
        discarded
    }

    /// Undo the most recent gesture's surface mutations.
    pub fn undo(&mut self, surface: &mut TerrainSurface) -> bool {
        self.journal.undo(surface)
    }

    /// Brush previews for the active modules, in preview order.
    pub fn previews(&self, settings: &BrushSettings, context: &EditContext) -> Vec<ModulePreview> {
        self.stack.previews(settings, context)
    }

    pub fn gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Number of batches currently retained for deferred paint
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// (target, category) pairs registered for the current gesture
    pub fn registered_target_count(&self) -> usize {
        self.undo.registered_count()
    }

    pub fn journal(&self) -> &UndoJournal {
        &self.journal
    }

    pub fn recorder(&self) -> &PathRecorder {
        &self.recorder
    }
}

impl Default for StrokeOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply one module to every segment of a batch. A failing segment is logged
/// and skipped; sibling modules and the gesture continue.
#[allow(clippy::too_many_arguments)]
fn apply_module_to_batch(
    module: &Module,
    sequence: usize,
    deferred: bool,
    batch: &Batch,
    surface: &mut TerrainSurface,
    undo: &mut GestureUndoCoordinator,
    journal: &mut UndoJournal,
    applied: &mut Vec<AppliedEffect>,
    failures: &mut usize,
) {
    let mut ctx = crate::kernels::ApplyCtx {
        surface,
        undo,
        journal,
        settings: &batch.settings,
        context: &batch.context,
    };

    for segment in &batch.segments {
        if let Err(e) = module.apply_segment(segment, &mut ctx) {
            warn!("module `{}` failed on batch {sequence}: {e}", module.name);
            *failures += 1;
        }
    }

    applied.push(AppliedEffect {
        module: module.name.clone(),
        category: module.category(),
        batch_sequence: sequence,
        deferred,
    });
}

/// Replay the paint-category modules for one deferred batch, in apply order.
fn apply_paint_modules(
    stack: &ModuleStack,
    deferred: &DeferredBatch,
    surface: &mut TerrainSurface,
    undo: &mut GestureUndoCoordinator,
    journal: &mut UndoJournal,
    applied: &mut Vec<AppliedEffect>,
    failures: &mut usize,
) {
    for &index in stack.apply_indices() {
        let module = stack.module_at(index);
        if !module.active || module.category() != ModuleCategory::Paint {
            continue;
        }
        apply_module_to_batch(
            module,
            deferred.sequence,
            true,
            &deferred.batch,
            surface,
            undo,
            journal,
            applied,
            failures,
        );
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::module::{HeightParams, Module, ModuleKind, OverlayParams};
    use crate::types::StrokeSegment;

    fn test_surface() -> TerrainSurface {
        let mut surface = TerrainSurface::new(128, 128, 64);
        surface.add_overlay("underlay").unwrap();
        surface.add_overlay("paint").unwrap();
        surface
    }

    /// Shape(apply=1), Underlay(apply=2), Paint(apply=3), all active
    fn test_stack() -> ModuleStack {
        let mut stack = ModuleStack::new();
        stack.add(Module::new(
            ModuleKind::Height(HeightParams::default()),
            true,
            100.0,
            100.0,
            1,
            1,
        ));
        stack.add(Module::new(
            ModuleKind::Underlay(OverlayParams {
                layer: Some("underlay".to_string()),
            }),
            true,
            100.0,
            100.0,
            2,
            2,
        ));
        stack.add(Module::new(
            ModuleKind::Paint(OverlayParams {
                layer: Some("paint".to_string()),
            }),
            true,
            100.0,
            100.0,
            3,
            3,
        ));
        stack
    }

    fn batch_at(u: f32, v: f32) -> Batch {
        Batch {
            segments: vec![StrokeSegment {
                curr_uv: Vec2::new(u, v),
                prev_uv: Vec2::new(u, v),
                progress: 0.5,
                stroke: Vec2::ZERO,
                start_uv: Vec2::new(u, v),
                start_height: 0.0,
                height_delta: 0.0,
            }],
            settings: BrushSettings {
                size: 16.0,
                strength: 1.0,
                rotation_degrees: 0.0,
            },
            context: EditContext::default(),
        }
    }

    fn names(applied: &[AppliedEffect]) -> Vec<(&str, usize, bool)> {
        applied
            .iter()
            .map(|e| (e.module.as_str(), e.batch_sequence, e.deferred))
            .collect()
    }

    #[test]
    fn test_scenario_a_bounded_then_full_drain() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(2);
        orchestrator.stack = test_stack();

        orchestrator.begin_gesture(GestureId(1));

        let mut events = Vec::new();
        for i in 0..5 {
            let report = orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
            assert_eq!(report.batch_sequence, i);
            assert!(report.deferred);
            assert_eq!(report.failures, 0);
            // Queue never stays above its bound after the drain
            assert!(orchestrator.queued_len() <= 2);
            events.extend(report.applied);
        }

        let end = orchestrator.end_gesture(&mut surface);
        assert_eq!(end.drained_batches, 2);
        assert_eq!(end.failures, 0);
        events.extend(end.applied);
        assert_eq!(orchestrator.queued_len(), 0);

        // Height and Underlay apply inline for all 5 batches, in order
        let inline: Vec<(&str, usize, bool)> = names(&events)
            .into_iter()
            .filter(|(_, _, deferred)| !deferred)
            .collect();
        assert_eq!(
            inline,
            vec![
                ("Height", 0, false),
                ("Underlay", 0, false),
                ("Height", 1, false),
                ("Underlay", 1, false),
                ("Height", 2, false),
                ("Underlay", 2, false),
                ("Height", 3, false),
                ("Underlay", 3, false),
                ("Height", 4, false),
                ("Underlay", 4, false),
            ]
        );

        // Paint applies exactly once per batch, in original batch order:
        // batches 0-2 during bounded drains, 3-4 at release
        let paints: Vec<(&str, usize, bool)> = names(&events)
            .into_iter()
            .filter(|(_, _, deferred)| *deferred)
            .collect();
        assert_eq!(
            paints,
            vec![
                ("Paint", 0, true),
                ("Paint", 1, true),
                ("Paint", 2, true),
                ("Paint", 3, true),
                ("Paint", 4, true),
            ]
        );

        // Ordering property: paint for batch n runs only after every prior
        // batch's underlay application
        let mut underlay_seen = 0;
        for event in &events {
            match (event.module.as_str(), event.deferred) {
                ("Underlay", false) => underlay_seen += 1,
                ("Paint", true) => assert!(underlay_seen > event.batch_sequence),
                _ => {}
            }
        }
    }

    #[test]
    fn test_scenario_b_no_underlay_paints_inline() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(2);
        orchestrator.stack = test_stack();
        orchestrator.stack.module_mut("Underlay").unwrap().active = false;

        orchestrator.begin_gesture(GestureId(1));

        for i in 0..3 {
            let report = orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
            assert!(!report.deferred);
            assert_eq!(orchestrator.queued_len(), 0);
            assert_eq!(
                names(&report.applied),
                vec![("Height", i, false), ("Paint", i, false)]
            );
        }

        let end = orchestrator.end_gesture(&mut surface);
        assert_eq!(end.drained_batches, 0);
        assert!(end.applied.is_empty());
    }

    #[test]
    fn test_scenario_c_abort_discards_queued_paint() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);
        orchestrator.stack = test_stack();

        orchestrator.begin_gesture(GestureId(1));
        let mut events = Vec::new();
        for _ in 0..3 {
            events.extend(orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5)).applied);
        }
        assert_eq!(orchestrator.queued_len(), 3);

        let discarded = orchestrator.abort_gesture();
        assert_eq!(discarded, 3);
        assert!(!orchestrator.gesture_active());

        // Zero paint applications happened for those batches
        assert!(events.iter().all(|e| e.module != "Paint"));
        let paint_id = surface.overlay_id("paint").unwrap();
        assert_eq!(surface.overlay(paint_id).unwrap().weight(64, 64), Some(0.0));

        // The next gesture starts with an empty queue and an empty
        // undo-registration set
        orchestrator.begin_gesture(GestureId(2));
        assert_eq!(orchestrator.queued_len(), 0);
        assert_eq!(orchestrator.registered_target_count(), 0);
    }

    #[test]
    fn test_scenario_d_one_snapshot_per_tile_and_category() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);

        // Two shape modules and an underlay, all touching the same tile;
        // paint stays inactive so nothing defers
        let mut stack = ModuleStack::new();
        stack.add(Module::new(
            ModuleKind::Height(HeightParams::default()),
            true,
            100.0,
            100.0,
            1,
            1,
        ));
        stack.add(Module::new(
            ModuleKind::Smooth(Default::default()),
            true,
            100.0,
            100.0,
            2,
            2,
        ));
        stack.add(Module::new(
            ModuleKind::Underlay(OverlayParams {
                layer: Some("underlay".to_string()),
            }),
            true,
            100.0,
            100.0,
            3,
            3,
        ));
        orchestrator.stack = stack;

        orchestrator.begin_gesture(GestureId(1));
        // Small brush fully inside tile (0, 0)
        let report = orchestrator.paint_batch(&mut surface, batch_at(0.25, 0.25));
        assert_eq!(report.failures, 0);

        // One height snapshot (shared by both shape modules) and one overlay
        // snapshot for the tile, not two of either
        assert_eq!(orchestrator.registered_target_count(), 2);
        assert_eq!(orchestrator.journal().open_snapshot_count(), 2);

        // More batches over the same tile add nothing
        orchestrator.paint_batch(&mut surface, batch_at(0.25, 0.25));
        assert_eq!(orchestrator.journal().open_snapshot_count(), 2);
    }

    #[test]
    fn test_deferral_predicate_reevaluated_per_batch() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);
        orchestrator.stack = test_stack();

        orchestrator.begin_gesture(GestureId(1));
        orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
        orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
        assert_eq!(orchestrator.queued_len(), 2);

        // User disables underlay mid-gesture: later batches paint inline,
        // but the already-queued batches still drain at gesture end
        orchestrator.stack.module_mut("Underlay").unwrap().active = false;
        let report = orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
        assert!(!report.deferred);
        assert!(report
            .applied
            .iter()
            .any(|e| e.module == "Paint" && !e.deferred));
        assert_eq!(orchestrator.queued_len(), 2);

        let end = orchestrator.end_gesture(&mut surface);
        assert_eq!(end.drained_batches, 2);
        let paints: Vec<usize> = end
            .applied
            .iter()
            .filter(|e| e.module == "Paint")
            .map(|e| e.batch_sequence)
            .collect();
        assert_eq!(paints, vec![0, 1]);
    }

    #[test]
    fn test_one_module_failure_does_not_block_siblings() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);

        let mut stack = ModuleStack::new();
        // Underlay with no layer selected always fails locally
        stack.add(Module::new(
            ModuleKind::Underlay(OverlayParams { layer: None }),
            true,
            100.0,
            100.0,
            1,
            1,
        ));
        stack.add(Module::new(
            ModuleKind::Height(HeightParams::default()),
            true,
            100.0,
            100.0,
            2,
            2,
        ));
        orchestrator.stack = stack;

        orchestrator.begin_gesture(GestureId(1));
        let report = orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));

        assert_eq!(report.failures, 1);
        // Height still ran and mutated the surface
        assert!(surface.heights().get(64, 64).unwrap() > 0.0);
    }

    #[test]
    fn test_batch_outside_gesture_is_ignored() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);
        orchestrator.stack = test_stack();

        let report = orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
        assert!(report.applied.is_empty());
        assert_eq!(surface.heights().get(64, 64), Some(0.0));
    }

    #[test]
    fn test_undo_restores_pre_gesture_surface() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);
        orchestrator.stack = test_stack();

        orchestrator.begin_gesture(GestureId(1));
        orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
        orchestrator.end_gesture(&mut surface);

        assert!(surface.heights().get(64, 64).unwrap() > 0.0);
        let underlay_id = surface.overlay_id("underlay").unwrap();
        assert!(surface.overlay(underlay_id).unwrap().weight(64, 64).unwrap() > 0.0);

        assert!(orchestrator.undo(&mut surface));

        assert_eq!(surface.heights().get(64, 64), Some(0.0));
        assert_eq!(surface.overlay(underlay_id).unwrap().weight(64, 64), Some(0.0));
        let paint_id = surface.overlay_id("paint").unwrap();
        assert_eq!(surface.overlay(paint_id).unwrap().weight(64, 64), Some(0.0));
    }

    #[test]
    fn test_recorder_tracks_gesture_path() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);
        orchestrator.stack = test_stack();

        orchestrator.begin_gesture(GestureId(1));
        orchestrator.paint_batch(&mut surface, batch_at(0.4, 0.5));
        orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
        assert_eq!(orchestrator.recorder().len(), 2);

        // A new gesture resets the path
        orchestrator.end_gesture(&mut surface);
        orchestrator.begin_gesture(GestureId(2));
        assert!(orchestrator.recorder().is_empty());
    }

    #[test]
    fn test_empty_stack_gesture_is_noop() {
        let mut surface = test_surface();
        let mut orchestrator = StrokeOrchestrator::with_capacity(10);
        orchestrator.stack = ModuleStack::new();

        orchestrator.begin_gesture(GestureId(1));
        let report = orchestrator.paint_batch(&mut surface, batch_at(0.5, 0.5));
        assert!(report.applied.is_empty());
        assert!(!report.deferred);

        let end = orchestrator.end_gesture(&mut surface);
        assert_eq!(end.drained_batches, 0);
    }
}
