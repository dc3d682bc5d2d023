//! Rectangular concrete section properties

use serde::{Deserialize, Serialize};

/// A rectangular reinforced-concrete cross section.
///
/// Cast-in-place RC frames use rectangular members throughout, so width and
/// depth are the primitive dimensions; A, Iy, Iz and J are derived and
/// recomputed whenever the dimensions change (see [`Section::resized`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Width b (m), the dimension parallel to the local z axis
    pub width: f64,
    /// Depth D (m), the dimension parallel to the local y axis
    pub depth: f64,
    /// Cross-sectional area (m²)
    pub a: f64,
    /// Second moment of area about the local y axis (m⁴)
    pub iy: f64,
    /// Second moment of area about the local z axis (m⁴)
    pub iz: f64,
    /// Torsional constant (m⁴)
    pub j: f64,
}

impl Section {
    /// Create a rectangular section and derive its properties
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let a = width * depth;
        let iz = width * depth.powi(3) / 12.0;
        let iy = depth * width.powi(3) / 12.0;

        // Torsional constant for a solid rectangle (approximate)
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self { width, depth, a, iy, iz, j }
    }

    /// A 1 m wide slab strip of the given thickness
    pub fn slab_strip(thickness: f64) -> Self {
        Self::rectangular(1.0, thickness)
    }

    /// Return a copy with new dimensions, all derived properties recomputed
    pub fn resized(&self, width: f64, depth: f64) -> Self {
        Self::rectangular(width, depth)
    }

    /// Radius of gyration about the local y axis
    pub fn ry(&self) -> f64 {
        (self.iy / self.a).sqrt()
    }

    /// Radius of gyration about the local z axis
    pub fn rz(&self) -> f64 {
        (self.iz / self.a).sqrt()
    }

    /// Least lateral dimension (m), used for slenderness classification
    pub fn least_dimension(&self) -> f64 {
        self.width.min(self.depth)
    }
}

impl Default for Section {
    fn default() -> Self {
        // 230 x 450 - a standard brick-wall-width beam
        Self::rectangular(0.23, 0.45)
    }
}
