//! Removal of moments without operations

use super::OptimizationPass;
use rhosim_core::{Circuit, Result};
use tracing::debug;

/// Drops every empty moment
///
/// Rewriting passes leave a moment in place even when all of its operations
/// were removed; this pass cleans them up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropEmptyMoments;

impl DropEmptyMoments {
    pub fn new() -> Self {
        Self
    }
}

impl OptimizationPass for DropEmptyMoments {
    fn name(&self) -> &str {
        "drop-empty-moments"
    }

    fn apply(&self, circuit: &mut Circuit) -> Result<bool> {
        let dropped = circuit.drop_empty_moments();
        if dropped > 0 {
            debug!(dropped, "dropped empty moments");
        }
        Ok(dropped > 0)
    }

    fn description(&self) -> Option<&str> {
        Some("Removes moments that contain no operations")
    }
}
