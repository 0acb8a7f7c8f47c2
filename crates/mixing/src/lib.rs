//! Terramix stroke mixing engine
//!
//! This crate orchestrates one paint gesture across a stack of shaping
//! modules:
//! - [`module`] - the module sum type, its parameters and the default registry
//! - [`stack::ModuleStack`] - ordered module collection with preview and
//!   apply orderings
//! - [`queue::DeferredBatchQueue`] - bounded FIFO for batches whose paint
//!   pass is replayed later in the gesture
//! - [`undo::GestureUndoCoordinator`] - at-most-one undo capture per surface
//!   tile and mutation category per gesture
//! - [`journal::UndoJournal`] - per-gesture tile snapshots and restore
//! - [`orchestrator::StrokeOrchestrator`] - drives a gesture from press to
//!   release (or abort)
//!
//! The engine is single-threaded and synchronous: every batch is processed
//! to completion on the thread that delivers it, and only one gesture may be
//! in flight per orchestrator.

pub mod error;
pub mod journal;
mod kernels;
pub mod module;
pub mod orchestrator;
pub mod queue;
pub mod recorder;
pub mod stack;
pub mod types;
pub mod undo;

pub use error::*;
pub use journal::*;
pub use module::*;
pub use orchestrator::*;
pub use queue::*;
pub use recorder::*;
pub use stack::*;
pub use types::*;
pub use undo::*;
