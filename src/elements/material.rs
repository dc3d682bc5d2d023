//! Concrete material properties

use serde::{Deserialize, Serialize};

/// Reinforced-concrete material: a concrete grade paired with a reinforcement
/// grade, plus the elastic constants the frame solver needs.
///
/// Strengths are characteristic values in Pa; design equations apply the
/// partial safety factors held here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Characteristic compressive strength of concrete fck (Pa)
    pub fck: f64,
    /// Characteristic yield strength of reinforcement fy (Pa)
    pub fy: f64,
    /// Modulus of elasticity of concrete (Pa)
    pub e: f64,
    /// Shear modulus (Pa)
    pub g: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Unit weight of reinforced concrete (N/m³)
    pub unit_weight: f64,
    /// Partial safety factor for concrete
    pub gamma_c: f64,
    /// Partial safety factor for reinforcement steel
    pub gamma_s: f64,
}

impl Material {
    /// Create a concrete material from grade strengths in MPa.
    ///
    /// E = 5000·√fck MPa per IS 456 Cl 6.2.3.1.
    pub fn concrete(fck_mpa: f64, fy_mpa: f64) -> Self {
        let fck = fck_mpa * 1e6;
        let fy = fy_mpa * 1e6;
        let e = 5000.0 * fck_mpa.sqrt() * 1e6;
        let nu = 0.2;
        Self {
            fck,
            fy,
            e,
            g: e / (2.0 * (1.0 + nu)),
            nu,
            unit_weight: 25_000.0,
            gamma_c: 1.5,
            gamma_s: 1.15,
        }
    }

    /// M20 concrete with Fe415 reinforcement
    pub fn m20() -> Self {
        Self::concrete(20.0, 415.0)
    }

    /// M25 concrete with Fe500 reinforcement
    pub fn m25() -> Self {
        Self::concrete(25.0, 500.0)
    }

    /// M30 concrete with Fe500 reinforcement
    pub fn m30() -> Self {
        Self::concrete(30.0, 500.0)
    }

    /// fck in MPa, the unit the design equations work in
    pub fn fck_mpa(&self) -> f64 {
        self.fck / 1e6
    }

    /// fy in MPa
    pub fn fy_mpa(&self) -> f64 {
        self.fy / 1e6
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::m25()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulus_follows_grade() {
        let m25 = Material::concrete(25.0, 500.0);
        assert!((m25.e - 25_000.0e6).abs() < 1.0);

        let m20 = Material::m20();
        assert!(m20.e < m25.e);
    }
}
