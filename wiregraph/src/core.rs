//! Error type and engine options shared by the library and the CLI.
//! The graph core itself never fails; only loading things from disk does.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::{GeometryPolicy, PathStrategy, Routing};
use crate::graph::{GraphSnapshot, GraphState};
use crate::rules::DEFAULT_MAX_PASSES;
use crate::transactions::AnyTransaction;

#[derive(Debug, thiserror::Error)]
pub enum WireGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

/// Engine configuration, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub epsilon: f64,
    /// Snap grid pitch (mm); zero disables snapping.
    pub grid: f64,
    pub routing: Routing,
    pub path_strategy: PathStrategy,
    pub max_passes: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            grid: 1.27,
            routing: Routing::Orthogonal,
            path_strategy: PathStrategy::HorizontalFirst,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl EngineOptions {
    pub fn from_json_str(json: &str) -> Result<Self, WireGraphError> {
        let options: EngineOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self, WireGraphError> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_json_str(&content)?;
        tracing::info!("Loaded engine options from {}", path.display());
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), WireGraphError> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(WireGraphError::InvalidOptions(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        if !self.grid.is_finite() || self.grid < 0.0 {
            return Err(WireGraphError::InvalidOptions(format!(
                "grid must be zero or positive, got {}",
                self.grid
            )));
        }
        if self.max_passes == 0 {
            return Err(WireGraphError::InvalidOptions(
                "max_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> GeometryPolicy {
        GeometryPolicy {
            epsilon: self.epsilon,
            grid: self.grid,
            routing: self.routing,
            strategy: self.path_strategy,
        }
    }
}

/// Read a JSON array of transactions.
pub fn load_script(path: &Path) -> Result<Vec<AnyTransaction>, WireGraphError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Read a serialized graph snapshot as stored, before any validation.
pub fn load_snapshot(path: &Path) -> Result<GraphSnapshot, WireGraphError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Read a serialized graph snapshot. Invalid edges are dropped.
pub fn load_state(path: &Path) -> Result<GraphState, WireGraphError> {
    Ok(GraphState::from(load_snapshot(path)?))
}
