//! Shared configuration for the Terramix module stack
//!
//! This crate provides the single source of truth for persisted module-stack
//! state: which modules exist, whether they are active, their brush scale
//! parameters and the two orderings (preview and apply). The engine converts
//! between these plain data types and its live module instances; this crate
//! only knows how to serialize them and move them to/from disk.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// File name used when the host does not supply its own stack location
pub const DEFAULT_STACK_FILE: &str = "terramix_modules.json";

/// Error type for configuration load/save operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Persisted state of a single shaping module.
///
/// `kind` is the stable registry key (`"smooth"`, `"path"`, ...) used to pick
/// the module implementation on load; `params` is that implementation's own
/// parameter struct, kept opaque here so new module kinds don't require a
/// config schema change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    pub kind: String,
    pub category: String,
    pub active: bool,
    pub brush_size_pct: f32,
    pub brush_strength_pct: f32,
    pub preview_order: i32,
    pub apply_order: i32,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Persisted state of the whole module stack, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackConfig {
    pub modules: Vec<ModuleConfig>,
}

impl StackConfig {
    /// Load a stack configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("loading module stack from {}", path.display());
        let data = fs::read_to_string(path)?;
        let config = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Save the stack configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        debug!("saving module stack to {}", path.display());
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}
