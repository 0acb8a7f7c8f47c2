//! Deferred batch queue
//!
//! When both the paint and underlay categories are active, the paint pass for
//! each batch is postponed: the batch is retained here together with its
//! brush-settings snapshot and editing context, and replayed once every
//! non-deferred module has already mutated the surface for all batches up to
//! that point. Bounded draining keeps the backlog (and peak memory) capped
//! during the gesture; the full drain runs at gesture end.

use std::collections::VecDeque;

use tracing::debug;

use crate::types::Batch;

/// Default backlog bound
pub const DEFAULT_DEFERRED_CAPACITY: usize = 10;

/// A retained batch plus the context needed to re-apply it
#[derive(Debug, Clone)]
pub struct DeferredBatch {
    /// Position of the batch within the gesture, assigned at ingestion
    pub sequence: usize,
    pub batch: Batch,
}

/// Bounded FIFO of pending stroke-segment batches
#[derive(Debug)]
pub struct DeferredBatchQueue {
    entries: VecDeque<DeferredBatch>,
    capacity: usize,
}

impl DeferredBatchQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_DEFERRED_CAPACITY)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a batch. Never drops; overflow is handled by bounded draining.
    pub fn push(&mut self, entry: DeferredBatch) {
        self.entries.push_back(entry);
    }

    /// Pop and apply the oldest entries while the queue length exceeds
    /// `capacity`. FIFO order.
    pub fn drain_bounded<F>(&mut self, capacity: usize, mut apply: F)
    where
        F: FnMut(DeferredBatch),
    {
        while self.entries.len() > capacity {
            // Bounded by the loop condition, pop cannot fail here
            if let Some(entry) = self.entries.pop_front() {
                apply(entry);
            }
        }
    }

    /// Pop and apply every remaining entry, FIFO, leaving the queue empty.
    pub fn drain_all<F>(&mut self, mut apply: F)
    where
        F: FnMut(DeferredBatch),
    {
        while let Some(entry) = self.entries.pop_front() {
            apply(entry);
        }
    }

    /// Discard all entries without applying them. Used when a gesture is
    /// aborted rather than completed. Returns the number discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.entries.len();
        if discarded > 0 {
            debug!("discarding {discarded} deferred batches");
        }
        self.entries.clear();
        discarded
    }
}
