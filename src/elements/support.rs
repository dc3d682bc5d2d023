//! Support conditions and foundation data

use serde::{Deserialize, Serialize};

/// Foundation data attached to a supported node.
///
/// Carries the soil parameters the footing designer needs; the support itself
/// has no foundation behavior during frame analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Foundation {
    /// Allowable (safe) soil bearing pressure (Pa)
    pub bearing_capacity: f64,
    /// Founding depth below grade (m)
    pub founding_depth: f64,
}

impl Foundation {
    /// Create foundation data from a safe bearing capacity in kN/m²
    pub fn with_sbc(sbc_kn_m2: f64) -> Self {
        Self {
            bearing_capacity: sbc_kn_m2 * 1e3,
            founding_depth: 1.5,
        }
    }

    /// Set the founding depth
    pub fn at_depth(mut self, depth: f64) -> Self {
        self.founding_depth = depth;
        self
    }
}

/// Support conditions at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Restrained in X translation
    pub dx: bool,
    /// Restrained in Y translation
    pub dy: bool,
    /// Restrained in Z translation
    pub dz: bool,
    /// Restrained in X rotation
    pub rx: bool,
    /// Restrained in Y rotation
    pub ry: bool,
    /// Restrained in Z rotation
    pub rz: bool,
    /// Foundation data for footing design, if this support bears on soil
    pub foundation: Option<Foundation>,
}

impl Support {
    /// Create a fully fixed support (all DOFs restrained)
    pub fn fixed() -> Self {
        Self {
            dx: true,
            dy: true,
            dz: true,
            rx: true,
            ry: true,
            rz: true,
            foundation: None,
        }
    }

    /// Create a pinned support (translations restrained, rotations free)
    pub fn pinned() -> Self {
        Self {
            dx: true,
            dy: true,
            dz: true,
            rx: false,
            ry: false,
            rz: false,
            foundation: None,
        }
    }

    /// Create a support with specific restraints
    pub fn with_restraints(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        Self {
            dx,
            dy,
            dz,
            rx,
            ry,
            rz,
            foundation: None,
        }
    }

    /// Attach foundation data for footing design
    pub fn on_soil(mut self, foundation: Foundation) -> Self {
        self.foundation = Some(foundation);
        self
    }

    /// Restraint flags as an array indexed by DOF [DX, DY, DZ, RX, RY, RZ]
    pub fn restraints(&self) -> [bool; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.restraints().iter().any(|&r| r)
    }

    /// Count of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.restraints().iter().filter(|&&r| r).count()
    }
}

impl Default for Support {
    fn default() -> Self {
        Self::with_restraints(false, false, false, false, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support() {
        let s = Support::fixed();
        assert_eq!(s.num_restrained(), 6);
        assert!(s.foundation.is_none());
    }

    #[test]
    fn test_foundation_attachment() {
        let s = Support::fixed().on_soil(Foundation::with_sbc(200.0));
        let f = s.foundation.unwrap();
        assert!((f.bearing_capacity - 200e3).abs() < 1e-9);
    }
}
