//! Load combinations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A load combination: a named linear weighting of load cases.
///
/// Combinations are generated from the active code profile (see
/// [`CodeProfile::generate_combinations`](super::CodeProfile::generate_combinations));
/// hand-built combinations are mainly useful in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCombination {
    /// Name of the load combination
    pub name: String,
    /// Factors for each load case (case name -> factor)
    pub factors: HashMap<String, f64>,
}

impl LoadCombination {
    /// Create a new empty load combination
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            factors: HashMap::new(),
        }
    }

    /// Create a load combination with a single load case at factor 1.0
    pub fn single(name: &str, case: &str) -> Self {
        Self::new(name).with_case(case, 1.0)
    }

    /// Add a load case with a factor
    pub fn with_case(mut self, case: &str, factor: f64) -> Self {
        self.factors.insert(case.to_string(), factor);
        self
    }

    /// Get the factor for a load case (0.0 if absent)
    pub fn factor(&self, case: &str) -> f64 {
        *self.factors.get(case).unwrap_or(&0.0)
    }

    /// Check if this combination includes a specific load case
    pub fn includes(&self, case: &str) -> bool {
        self.factor(case).abs() > 1e-10
    }
}

impl Default for LoadCombination {
    fn default() -> Self {
        Self::single("Combo 1", "Dead")
    }
}
