//! Analysis results: displacements, reactions, station force diagrams and
//! cross-combination envelopes
//!
//! One [`AnalysisResult`] is an immutable snapshot of a single convergence
//! cycle; the next cycle replaces it wholesale.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};

/// Displacement results at a node
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }
}

/// Reaction forces at a supported node
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reaction {
    /// Reaction force in X direction
    pub fx: f64,
    /// Reaction force in Y direction
    pub fy: f64,
    /// Reaction force in Z direction
    pub fz: f64,
    /// Reaction moment about X axis
    pub mx: f64,
    /// Reaction moment about Y axis
    pub my: f64,
    /// Reaction moment about Z axis
    pub mz: f64,
}

impl Reaction {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }
}

/// Internal forces at one station along an element, in local axes.
///
/// Axial is positive in tension. Moments follow the end-force superposition
/// convention: design works with magnitudes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StationForces {
    /// Distance from the i-node (m)
    pub x: f64,
    /// Axial force N (tension positive)
    pub axial: f64,
    /// Shear in local y
    pub shear_y: f64,
    /// Shear in local z
    pub shear_z: f64,
    /// Torsion about the element axis
    pub torsion: f64,
    /// Bending moment about local y
    pub moment_y: f64,
    /// Bending moment about local z
    pub moment_z: f64,
}

/// Member loads resolved into local components, used when recovering
/// station forces between the element ends
#[derive(Debug, Clone, Default)]
pub struct LocalLineLoads {
    /// Summed uniform load components (N/m along local x, y, z)
    pub udl: [f64; 3],
    /// Point loads: (position from i-node, local components)
    pub points: Vec<(f64, [f64; 3])>,
}

/// Force diagram for one element under one combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceDiagram {
    /// Station forces ordered from the i-node to the j-node
    pub stations: Vec<StationForces>,
}

impl ForceDiagram {
    /// Recover the diagram from local end forces by superposing the loads
    /// applied between the ends.
    ///
    /// `end_forces` is the 12-component local end force vector f = k·d + FER.
    pub fn recover(
        end_forces: &[f64; 12],
        loads: &LocalLineLoads,
        length: f64,
        stations: usize,
    ) -> Self {
        let n = stations.max(5);
        let f = end_forces;
        let [wx, wy, wz] = loads.udl;

        let mut out = Vec::with_capacity(n);
        for s in 0..n {
            let x = length * s as f64 / (n - 1) as f64;

            // Loads on the segment [0, x]
            let mut px_sum = 0.0;
            let mut py_sum = 0.0;
            let mut pz_sum = 0.0;
            let mut py_arm = 0.0;
            let mut pz_arm = 0.0;
            for &(a, p) in &loads.points {
                if a <= x {
                    px_sum += p[0];
                    py_sum += p[1];
                    pz_sum += p[2];
                    py_arm += p[1] * (x - a);
                    pz_arm += p[2] * (x - a);
                }
            }

            out.push(StationForces {
                x,
                axial: -(f[0] + wx * x + px_sum),
                shear_y: -(f[1] + wy * x + py_sum),
                shear_z: -(f[2] + wz * x + pz_sum),
                torsion: -f[3],
                moment_y: f[4] + f[2] * x + wz * x * x / 2.0 + pz_arm,
                moment_z: f[5] - f[1] * x - wy * x * x / 2.0 - py_arm,
            });
        }

        Self { stations: out }
    }
}

/// Max/min of one force quantity with the combination that produced each
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extreme {
    /// Largest value across combinations
    pub max: f64,
    /// Smallest value across combinations
    pub min: f64,
    /// Combination producing the maximum
    pub max_combo: String,
    /// Combination producing the minimum
    pub min_combo: String,
}

impl Extreme {
    fn seed(value: f64, combo: &str) -> Self {
        Self {
            max: value,
            min: value,
            max_combo: combo.to_string(),
            min_combo: combo.to_string(),
        }
    }

    fn update(&mut self, value: f64, combo: &str) {
        if value > self.max {
            self.max = value;
            self.max_combo = combo.to_string();
        }
        if value < self.min {
            self.min = value;
            self.min_combo = combo.to_string();
        }
    }

    /// Largest absolute value and its combination
    pub fn abs_max(&self) -> (f64, &str) {
        if self.max.abs() >= self.min.abs() {
            (self.max.abs(), &self.max_combo)
        } else {
            (self.min.abs(), &self.min_combo)
        }
    }
}

/// Envelope of all force quantities at one station
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationEnvelope {
    /// Distance from the i-node (m)
    pub x: f64,
    pub axial: Extreme,
    pub shear_y: Extreme,
    pub shear_z: Extreme,
    pub torsion: Extreme,
    pub moment_y: Extreme,
    pub moment_z: Extreme,
}

/// Force envelope for one element: per-station min/max of every quantity
/// across all combinations, with the governing combination retained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceEnvelope {
    /// Station envelopes ordered from the i-node to the j-node
    pub stations: Vec<StationEnvelope>,
}

impl ForceEnvelope {
    /// Fold per-combination diagrams into an envelope.
    ///
    /// All diagrams must share the same station grid.
    pub fn from_diagrams<'a, I>(diagrams: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a ForceDiagram)>,
    {
        let mut stations: Option<Vec<StationEnvelope>> = None;

        for (combo, diagram) in diagrams {
            match &mut stations {
                None => {
                    stations = Some(
                        diagram
                            .stations
                            .iter()
                            .map(|s| StationEnvelope {
                                x: s.x,
                                axial: Extreme::seed(s.axial, combo),
                                shear_y: Extreme::seed(s.shear_y, combo),
                                shear_z: Extreme::seed(s.shear_z, combo),
                                torsion: Extreme::seed(s.torsion, combo),
                                moment_y: Extreme::seed(s.moment_y, combo),
                                moment_z: Extreme::seed(s.moment_z, combo),
                            })
                            .collect(),
                    );
                }
                Some(envs) => {
                    for (env, s) in envs.iter_mut().zip(&diagram.stations) {
                        env.axial.update(s.axial, combo);
                        env.shear_y.update(s.shear_y, combo);
                        env.shear_z.update(s.shear_z, combo);
                        env.torsion.update(s.torsion, combo);
                        env.moment_y.update(s.moment_y, combo);
                        env.moment_z.update(s.moment_z, combo);
                    }
                }
            }
        }

        stations.map(|stations| Self { stations })
    }

    fn peak<F>(&self, pick: F) -> (f64, String)
    where
        F: Fn(&StationEnvelope) -> (f64, &str),
    {
        let mut best = (0.0, String::new());
        for station in &self.stations {
            let (value, combo) = pick(station);
            if value > best.0 || best.1.is_empty() {
                best = (value, combo.to_string());
            }
        }
        best
    }

    /// Largest absolute bending moment about local z and its combination
    pub fn peak_moment_z(&self) -> (f64, String) {
        self.peak(|s| s.moment_z.abs_max())
    }

    /// Largest absolute bending moment about local y and its combination
    pub fn peak_moment_y(&self) -> (f64, String) {
        self.peak(|s| s.moment_y.abs_max())
    }

    /// Largest absolute shear in local y and its combination
    pub fn peak_shear_y(&self) -> (f64, String) {
        self.peak(|s| s.shear_y.abs_max())
    }

    /// Largest compressive axial force (positive magnitude) and its combination
    pub fn peak_compression(&self) -> (f64, String) {
        self.peak(|s| {
            if s.axial.min < 0.0 {
                (-s.axial.min, s.axial.min_combo.as_str())
            } else {
                (0.0, s.axial.min_combo.as_str())
            }
        })
    }
}

/// Snapshot of one analysis cycle: displacements and reactions per
/// combination, end forces and force envelopes per element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Combination names in solve order
    pub combos: Vec<String>,
    /// node name -> combination name -> displacement
    pub displacements: HashMap<String, HashMap<String, NodeDisplacement>>,
    /// supported node name -> combination name -> reaction
    pub reactions: HashMap<String, HashMap<String, Reaction>>,
    /// element name -> combination name -> local end forces
    pub end_forces: HashMap<String, HashMap<String, [f64; 12]>>,
    /// element name -> cross-combination force envelope
    pub envelopes: HashMap<String, ForceEnvelope>,
}

impl AnalysisResult {
    /// Displacement of a node under a combination
    pub fn displacement(&self, node: &str, combo: &str) -> EngineResult<NodeDisplacement> {
        self.displacements
            .get(node)
            .ok_or_else(|| EngineError::NodeNotFound(node.to_string()))?
            .get(combo)
            .copied()
            .ok_or_else(|| EngineError::LoadCombinationNotFound(combo.to_string()))
    }

    /// Reaction at a supported node under a combination
    pub fn reaction(&self, node: &str, combo: &str) -> EngineResult<Reaction> {
        self.reactions
            .get(node)
            .ok_or_else(|| EngineError::NodeNotFound(node.to_string()))?
            .get(combo)
            .copied()
            .ok_or_else(|| EngineError::LoadCombinationNotFound(combo.to_string()))
    }

    /// Force envelope of an element
    pub fn envelope(&self, element: &str) -> EngineResult<&ForceEnvelope> {
        self.envelopes
            .get(element)
            .ok_or_else(|| EngineError::ElementNotFound(element.to_string()))
    }

    /// Largest upward (+Y) support reaction at a node across combinations,
    /// with its combination - the column load a footing must carry
    pub fn peak_support_load(&self, node: &str) -> Option<(f64, String)> {
        let per_combo = self.reactions.get(node)?;
        let mut best: Option<(f64, String)> = None;
        for combo in &self.combos {
            if let Some(r) = per_combo.get(combo) {
                if best.as_ref().map_or(true, |(v, _)| r.fy > *v) {
                    best = Some((r.fy, combo.clone()));
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simply_supported_diagram_midspan_moment() {
        // 6 m simply supported element, w = 10 kN/m down in local y.
        // End forces: shear wL/2 up at both ends, no end moments.
        let l = 6.0;
        let w = 10e3;
        let f = [0.0, w * l / 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, w * l / 2.0, 0.0, 0.0, 0.0, 0.0];
        let loads = LocalLineLoads { udl: [0.0, -w, 0.0], points: vec![] };

        let diagram = ForceDiagram::recover(&f, &loads, l, 9);
        let mid = &diagram.stations[4];
        assert_relative_eq!(mid.x, 3.0, epsilon = 1e-12);
        // |M| = wL^2/8 at midspan
        assert_relative_eq!(mid.moment_z.abs(), w * l * l / 8.0, epsilon = 1e-6);
        // Shear crosses zero at midspan
        assert_relative_eq!(mid.shear_y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_envelope_tracks_governing_combo() {
        let f_small = [0.0, 5.0, 0.0, 0.0, 0.0, 10.0, 0.0, -5.0, 0.0, 0.0, 0.0, 0.0];
        let f_large = [0.0, 15.0, 0.0, 0.0, 0.0, 30.0, 0.0, -15.0, 0.0, 0.0, 0.0, 0.0];
        let no_loads = LocalLineLoads::default();

        let d1 = ForceDiagram::recover(&f_small, &no_loads, 4.0, 5);
        let d2 = ForceDiagram::recover(&f_large, &no_loads, 4.0, 5);

        let env =
            ForceEnvelope::from_diagrams([("1.5 (DL + LL)", &d1), ("1.2 (DL + LL + WL)", &d2)])
                .unwrap();

        let (m, combo) = env.peak_moment_z();
        assert_relative_eq!(m, 30.0, epsilon = 1e-9);
        assert_eq!(combo, "1.2 (DL + LL + WL)");
    }
}
