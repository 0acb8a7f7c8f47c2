//! Module stack with derived preview and apply orderings
//!
//! The stack owns the modules and keeps two sorted views over them: preview
//! order (ascending preview priority) for brush rendering, and apply order
//! (ascending apply priority) for effect application. The views are derived;
//! they must be recomputed after any priority or membership change.

use tracing::{debug, warn};

use terramix_config::{ModuleConfig, StackConfig};

use crate::module::{default_modules, Module, ModuleKind, ModulePreview};
use crate::types::{BrushSettings, EditContext, ModuleCategory};

#[derive(Debug, Default)]
pub struct ModuleStack {
    modules: Vec<Module>,
    preview_indices: Vec<usize>,
    apply_indices: Vec<usize>,
}

impl ModuleStack {
    /// An empty stack. All operations on it are legal no-ops.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stack holding the canonical default module set.
    pub fn with_defaults() -> Self {
        let mut stack = Self {
            modules: default_modules(),
            preview_indices: Vec::new(),
            apply_indices: Vec::new(),
        };
        stack.recompute_orders();
        stack
    }

    /// Append a module and recompute the derived orders.
    pub fn add(&mut self, module: Module) {
        debug!("adding module `{}`", module.name);
        self.modules.push(module);
        self.recompute_orders();
    }

    /// Remove a module by name and recompute the derived orders.
    pub fn remove(&mut self, name: &str) -> Option<Module> {
        let index = self.modules.iter().position(|m| m.name == name)?;
        let module = self.modules.remove(index);
        debug!("removed module `{}`", module.name);
        self.recompute_orders();
        Some(module)
    }

    /// Discard all module instances and re-create the canonical default set
    /// with default priorities and active flags. Idempotent.
    pub fn reset_to_defaults(&mut self) {
        self.modules = default_modules();
        self.recompute_orders();
    }

    /// Rebuild the preview and apply orderings from the per-module priority
    /// fields. Ties break by stable original insertion order.
    ///
    /// Must be called after any priority or membership change; `add`,
    /// `remove` and the config loaders call it themselves, direct edits via
    /// [`module_mut`](Self::module_mut) do not.
    pub fn recompute_orders(&mut self) {
        let mut preview: Vec<usize> = (0..self.modules.len()).collect();
        preview.sort_by_key(|&i| self.modules[i].preview_order);
        self.preview_indices = preview;

        let mut apply: Vec<usize> = (0..self.modules.len()).collect();
        apply.sort_by_key(|&i| self.modules[i].apply_order);
        self.apply_indices = apply;
    }

    /// Modules in preview order
    pub fn preview_order(&self) -> impl Iterator<Item = &Module> + '_ {
        self.preview_indices.iter().map(|&i| &self.modules[i])
    }

    /// Modules in apply order
    pub fn apply_order(&self) -> impl Iterator<Item = &Module> + '_ {
        self.apply_indices.iter().map(|&i| &self.modules[i])
    }

    pub(crate) fn apply_indices(&self) -> &[usize] {
        &self.apply_indices
    }

    pub(crate) fn module_at(&self, index: usize) -> &Module {
        &self.modules[index]
    }

    /// True iff at least one module of the category has its active flag set
    pub fn has_active(&self, category: ModuleCategory) -> bool {
        self.modules
            .iter()
            .any(|m| m.active && m.category() == category)
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Mutable access for user edits. Call
    /// [`recompute_orders`](Self::recompute_orders) afterwards if a priority
    /// changed.
    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.name == name)
    }

    /// Modules in insertion order
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Brush previews for the active modules, in preview order.
    /// Empty when the pointer is not over the surface.
    pub fn previews(&self, settings: &BrushSettings, context: &EditContext) -> Vec<ModulePreview> {
        if !context.hit_valid {
            return Vec::new();
        }
        self.preview_order()
            .filter(|m| m.active)
            .map(|m| m.preview(settings))
            .collect()
    }

    /// Snapshot the stack as persistable configuration, in insertion order.
    pub fn to_config(&self) -> StackConfig {
        StackConfig {
            modules: self
                .modules
                .iter()
                .map(|m| ModuleConfig {
                    name: m.name.clone(),
                    kind: m.kind.key().to_string(),
                    category: m.category().as_str().to_string(),
                    active: m.active,
                    brush_size_pct: m.brush_size_pct,
                    brush_strength_pct: m.brush_strength_pct,
                    preview_order: m.preview_order,
                    apply_order: m.apply_order,
                    params: m.kind.params_value(),
                })
                .collect(),
        }
    }

    /// Replace the stack contents from persisted configuration.
    ///
    /// Configuration problems are non-fatal: entries with unknown kinds are
    /// skipped with a warning, unreadable parameters fall back to the kind's
    /// defaults.
    pub fn apply_config(&mut self, config: &StackConfig) {
        let mut modules = Vec::with_capacity(config.modules.len());
        for entry in &config.modules {
            let Some(kind) = ModuleKind::from_config(&entry.kind, &entry.params) else {
                warn!("unknown module kind `{}`, skipping", entry.kind);
                continue;
            };
            let mut module = Module::new(
                kind,
                entry.active,
                entry.brush_size_pct,
                entry.brush_strength_pct,
                entry.preview_order,
                entry.apply_order,
            );
            module.name = entry.name.clone();
            modules.push(module);
        }
        self.modules = modules;
        self.recompute_orders();
    }
}
