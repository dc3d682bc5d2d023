//! Concentrated loads on elements

use serde::{Deserialize, Serialize};

/// Direction of an element load.
///
/// Local directions follow the element axes; `Gravity` acts along global -Y
/// and is resolved into local components through the element's rotation
/// matrix when fixed-end reactions are computed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoadDirection {
    /// Along the element's local x axis (axial)
    LocalX,
    /// Along the element's local y axis
    LocalY,
    /// Along the element's local z axis
    LocalZ,
    /// Global -Y (downward), magnitude taken positive
    Gravity,
}

/// A concentrated load on an element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointLoad {
    /// Load magnitude (N); for `Gravity`, positive acts downward
    pub magnitude: f64,
    /// Distance from the i-node (m)
    pub position: f64,
    /// Load direction
    pub direction: LoadDirection,
    /// Load case
    pub case: String,
}

impl PointLoad {
    /// Create a new point load
    pub fn new(magnitude: f64, position: f64, direction: LoadDirection, case: &str) -> Self {
        Self {
            magnitude,
            position,
            direction,
            case: case.to_string(),
        }
    }

    /// A downward point load at a position along the element
    pub fn downward(magnitude: f64, position: f64, case: &str) -> Self {
        Self::new(magnitude.abs(), position, LoadDirection::Gravity, case)
    }
}
