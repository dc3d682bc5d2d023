//! Uniformly distributed loads on elements

use serde::{Deserialize, Serialize};

use super::point_load::LoadDirection;

/// A full-length uniformly distributed line load on an element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Intensity (N/m); for `Gravity`, positive acts downward
    pub w: f64,
    /// Load direction
    pub direction: LoadDirection,
    /// Load case
    pub case: String,
}

impl DistributedLoad {
    /// Create a new uniform load
    pub fn new(w: f64, direction: LoadDirection, case: &str) -> Self {
        Self {
            w,
            direction,
            case: case.to_string(),
        }
    }

    /// A downward (gravity-direction) uniform load, e.g. slab or wall loads
    pub fn downward(w: f64, case: &str) -> Self {
        Self::new(w.abs(), LoadDirection::Gravity, case)
    }

    /// Total force over a given element length
    pub fn total_force(&self, length: f64) -> f64 {
        self.w * length
    }
}
