//! Search configuration parameters.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

/// Smallest budget that yields a move: the first simulation only rolls out
/// the root, the second expands it.
pub const MIN_SIMULATIONS: usize = 2;

/// Search configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Number of simulations per search.
    pub num_simulations: usize,

    /// UCB1 exploration constant `C` in
    /// `Q + C * sqrt(ln(N_parent) / N_child)`.
    pub exploration_constant: f32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            num_simulations: 1000,
            exploration_constant: std::f32::consts::SQRT_2,
        }
    }
}

impl MctsConfig {
    /// Create a new config with the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            num_simulations,
            ..Default::default()
        }
    }

    /// Check that the parameters describe a usable search.
    ///
    /// # Errors
    /// Returns `SearchError::InvalidConfig` if the budget is below
    /// [`MIN_SIMULATIONS`] or the exploration constant is negative or not
    /// finite.
    pub fn validate(&self) -> Result<()> {
        if self.num_simulations < MIN_SIMULATIONS {
            return Err(SearchError::InvalidConfig(format!(
                "num_simulations must be at least {MIN_SIMULATIONS}, got {}: \
                 the first simulation only rolls out the root, so no move can be chosen",
                self.num_simulations
            )));
        }
        if !self.exploration_constant.is_finite() || self.exploration_constant < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "exploration_constant must be finite and non-negative, got {}",
                self.exploration_constant
            )));
        }
        Ok(())
    }
}
