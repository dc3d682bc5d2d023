//! Frame model - geometry, loads and the assemble/solve/recover pipeline

use std::collections::{HashMap, HashSet};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::elements::{Element, Material, Node, Section, Support};
use crate::error::{EngineError, EngineResult};
use crate::loads::{
    CodeProfile, DistributedLoad, LoadCase, LoadCombination, LoadDirection, NodeLoad, PointLoad,
};
use crate::math::{self, Mat3, SolveFailure, StiffnessBuilder, Vec12, Vector};
use crate::results::{
    AnalysisResult, ForceDiagram, ForceEnvelope, LocalLineLoads, NodeDisplacement, Reaction,
};

/// Options controlling a single analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Stations per element for force diagrams (minimum 5 enforced)
    pub stations: usize,
    /// Relative residual tolerance for the linear solve
    pub residual_tolerance: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            stations: 9,
            residual_tolerance: 1e-6,
        }
    }
}

/// The structural model: nodes, elements, supports, catalogs and loads.
///
/// Geometry is immutable once built; between convergence cycles only section
/// substitution is permitted ([`FrameModel::upsert_section`] +
/// [`FrameModel::set_element_section`]), which never moves a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameModel {
    /// Nodes by name
    pub nodes: HashMap<String, Node>,
    /// Materials by name
    pub materials: HashMap<String, Material>,
    /// Sections by name
    pub sections: HashMap<String, Section>,
    /// Frame elements by name
    pub elements: HashMap<String, Element>,
    /// Support conditions by node name
    pub supports: HashMap<String, Support>,
    /// Registered load cases
    pub load_cases: Vec<LoadCase>,
    /// Node loads by node name
    pub node_loads: HashMap<String, Vec<NodeLoad>>,
    /// Element point loads by element name
    pub element_point_loads: HashMap<String, Vec<PointLoad>>,
    /// Element distributed loads by element name
    pub element_dist_loads: HashMap<String, Vec<DistributedLoad>>,
    /// Load combinations in solve order
    pub combos: Vec<LoadCombination>,
    /// Node name -> incident element names, maintained by `add_element`
    adjacency: HashMap<String, Vec<String>>,
}

impl FrameModel {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model building
    // ========================

    /// Add a node to the model
    pub fn add_node(&mut self, name: &str, node: Node) -> EngineResult<()> {
        if self.nodes.contains_key(name) {
            return Err(EngineError::DuplicateName(name.to_string()));
        }
        self.nodes.insert(name.to_string(), node);
        Ok(())
    }

    /// Add a material to the model
    pub fn add_material(&mut self, name: &str, material: Material) -> EngineResult<()> {
        if self.materials.contains_key(name) {
            return Err(EngineError::DuplicateName(name.to_string()));
        }
        self.materials.insert(name.to_string(), material);
        Ok(())
    }

    /// Add a section to the model
    pub fn add_section(&mut self, name: &str, section: Section) -> EngineResult<()> {
        if self.sections.contains_key(name) {
            return Err(EngineError::DuplicateName(name.to_string()));
        }
        self.sections.insert(name.to_string(), section);
        Ok(())
    }

    /// Add an element, validating its references
    pub fn add_element(&mut self, name: &str, element: Element) -> EngineResult<()> {
        if !self.nodes.contains_key(&element.i_node) {
            return Err(EngineError::NodeNotFound(element.i_node.clone()));
        }
        if !self.nodes.contains_key(&element.j_node) {
            return Err(EngineError::NodeNotFound(element.j_node.clone()));
        }
        if !self.materials.contains_key(&element.material) {
            return Err(EngineError::MaterialNotFound(element.material.clone()));
        }
        if !self.sections.contains_key(&element.section) {
            return Err(EngineError::SectionNotFound(element.section.clone()));
        }
        if self.elements.contains_key(name) {
            return Err(EngineError::DuplicateName(name.to_string()));
        }
        self.adjacency
            .entry(element.i_node.clone())
            .or_default()
            .push(name.to_string());
        self.adjacency
            .entry(element.j_node.clone())
            .or_default()
            .push(name.to_string());
        self.elements.insert(name.to_string(), element);
        Ok(())
    }

    /// Add a support condition
    pub fn add_support(&mut self, node_name: &str, support: Support) -> EngineResult<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(EngineError::NodeNotFound(node_name.to_string()));
        }
        self.supports.insert(node_name.to_string(), support);
        Ok(())
    }

    /// Register a load case
    pub fn add_load_case(&mut self, case: LoadCase) -> EngineResult<()> {
        if self.load_cases.iter().any(|c| c.name == case.name) {
            return Err(EngineError::DuplicateName(case.name));
        }
        self.load_cases.push(case);
        Ok(())
    }

    /// Add a node load
    pub fn add_node_load(&mut self, node_name: &str, load: NodeLoad) -> EngineResult<()> {
        if !self.nodes.contains_key(node_name) {
            return Err(EngineError::NodeNotFound(node_name.to_string()));
        }
        self.node_loads
            .entry(node_name.to_string())
            .or_default()
            .push(load);
        Ok(())
    }

    /// Add a point load to an element
    pub fn add_element_point_load(&mut self, element: &str, load: PointLoad) -> EngineResult<()> {
        if !self.elements.contains_key(element) {
            return Err(EngineError::ElementNotFound(element.to_string()));
        }
        self.element_point_loads
            .entry(element.to_string())
            .or_default()
            .push(load);
        Ok(())
    }

    /// Add a distributed load to an element
    pub fn add_element_dist_load(
        &mut self,
        element: &str,
        load: DistributedLoad,
    ) -> EngineResult<()> {
        if !self.elements.contains_key(element) {
            return Err(EngineError::ElementNotFound(element.to_string()));
        }
        self.element_dist_loads
            .entry(element.to_string())
            .or_default()
            .push(load);
        Ok(())
    }

    /// Generate and install the combination set mandated by a code profile
    pub fn generate_combinations(&mut self, profile: &CodeProfile) -> EngineResult<()> {
        self.combos = profile.generate_combinations(&self.load_cases)?;
        Ok(())
    }

    /// Generate per-element gravity UDLs from member self-weight into the
    /// given (dead) load case
    pub fn apply_self_weight(&mut self, case: &str) -> EngineResult<()> {
        let names = self.sorted_element_names();
        for name in names {
            let element = &self.elements[&name];
            let section = self
                .sections
                .get(&element.section)
                .ok_or_else(|| EngineError::SectionNotFound(element.section.clone()))?;
            let material = self
                .materials
                .get(&element.material)
                .ok_or_else(|| EngineError::MaterialNotFound(element.material.clone()))?;
            let w = material.unit_weight * section.a;
            self.add_element_dist_load(&name, DistributedLoad::downward(w, case))?;
        }
        Ok(())
    }

    /// Add a running-meter wall load (N/m) on every beam element
    pub fn apply_wall_load(&mut self, case: &str, w: f64) -> EngineResult<()> {
        let names = self.sorted_element_names();
        for name in names {
            if self.elements[&name].kind == crate::elements::ElementKind::Beam {
                self.add_element_dist_load(&name, DistributedLoad::downward(w, case))?;
            }
        }
        Ok(())
    }

    // ========================
    // Design-cycle mutation
    // ========================

    /// Insert or replace a section. The only mutation permitted after
    /// construction, used by the design engine between cycles.
    pub fn upsert_section(&mut self, name: &str, section: Section) {
        self.sections.insert(name.to_string(), section);
    }

    /// Point an element at a different section
    pub fn set_element_section(&mut self, element: &str, section: &str) -> EngineResult<()> {
        if !self.sections.contains_key(section) {
            return Err(EngineError::SectionNotFound(section.to_string()));
        }
        let el = self
            .elements
            .get_mut(element)
            .ok_or_else(|| EngineError::ElementNotFound(element.to_string()))?;
        el.section = section.to_string();
        Ok(())
    }

    // ========================
    // Topology
    // ========================

    /// Element names in deterministic (sorted) order
    pub fn sorted_element_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.elements.keys().cloned().collect();
        names.sort();
        names
    }

    /// Node names in deterministic (sorted) order
    pub fn sorted_node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Elements incident to a node, O(degree) via the adjacency index
    pub fn elements_at(&self, node: &str) -> &[String] {
        self.adjacency
            .get(node)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Validate the node/element graph.
    ///
    /// Rejects dangling references, zero-length and duplicate elements, and a
    /// disconnected element graph. An isolated node (no incident element) is
    /// not a topology error - it surfaces as a singular system during
    /// analysis, which can name the offending DOF.
    pub fn validate_topology(&self) -> EngineResult<()> {
        if self.nodes.is_empty() {
            return Err(EngineError::Topology("model has no nodes".to_string()));
        }
        if self.elements.is_empty() {
            return Err(EngineError::Topology("model has no elements".to_string()));
        }

        let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
        for name in self.sorted_element_names() {
            let element = &self.elements[&name];
            for node in [&element.i_node, &element.j_node] {
                if !self.nodes.contains_key(node) {
                    return Err(EngineError::Topology(format!(
                        "element '{name}' references missing node '{node}'"
                    )));
                }
            }
            if element.i_node == element.j_node {
                return Err(EngineError::Topology(format!(
                    "element '{name}' has coincident end nodes '{}'",
                    element.i_node
                )));
            }
            let i = &self.nodes[&element.i_node];
            let j = &self.nodes[&element.j_node];
            if i.distance_to(j) < 1e-10 {
                return Err(EngineError::Topology(format!(
                    "element '{name}' has zero length"
                )));
            }
            if !seen_pairs.insert(element.node_pair()) {
                return Err(EngineError::Topology(format!(
                    "element '{name}' duplicates an existing element between '{}' and '{}'",
                    element.i_node, element.j_node
                )));
            }
            if !self.sections.contains_key(&element.section) {
                return Err(EngineError::Topology(format!(
                    "element '{name}' references missing section '{}'",
                    element.section
                )));
            }
            if !self.materials.contains_key(&element.material) {
                return Err(EngineError::Topology(format!(
                    "element '{name}' references missing material '{}'",
                    element.material
                )));
            }
        }

        // Connectivity over the element graph (BFS from any connected node)
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for element in self.elements.values() {
            adjacency
                .entry(element.i_node.as_str())
                .or_default()
                .push(element.j_node.as_str());
            adjacency
                .entry(element.j_node.as_str())
                .or_default()
                .push(element.i_node.as_str());
        }
        let start = self
            .sorted_node_names()
            .into_iter()
            .find(|n| adjacency.contains_key(n.as_str()));
        if let Some(start) = start {
            let mut visited: HashSet<String> = HashSet::new();
            let mut queue = vec![start];
            while let Some(node) = queue.pop() {
                if !visited.insert(node.clone()) {
                    continue;
                }
                if let Some(neighbors) = adjacency.get(node.as_str()) {
                    for &n in neighbors {
                        if !visited.contains(n) {
                            queue.push(n.to_string());
                        }
                    }
                }
            }
            if visited.len() < adjacency.len() {
                let orphan = adjacency
                    .keys()
                    .filter(|n| !visited.contains(**n))
                    .min()
                    .copied()
                    .unwrap_or("?");
                return Err(EngineError::Topology(format!(
                    "element graph is disconnected; node '{orphan}' is unreachable"
                )));
            }
        }

        Ok(())
    }

    // ========================
    // Analysis
    // ========================

    /// Run a linear static analysis of every load combination and return the
    /// cycle's result snapshot
    pub fn analyze(&self, options: &AnalysisOptions) -> EngineResult<AnalysisResult> {
        self.validate_topology()?;
        if self.combos.is_empty() {
            return Err(EngineError::InvalidInput(
                "no load combinations defined; generate them from a code profile first".to_string(),
            ));
        }

        let node_names = self.sorted_node_names();
        let element_names = self.sorted_element_names();

        // Global DOF numbering: 6 per node, by sorted node name
        let mut dof_map: HashMap<&str, usize> = HashMap::new();
        for (i, name) in node_names.iter().enumerate() {
            dof_map.insert(name.as_str(), i * 6);
        }
        let n_dofs = node_names.len() * 6;

        // Free DOF numbering (boundary conditions by elimination)
        let mut free_index: Vec<Option<usize>> = vec![None; n_dofs];
        let mut free_dofs: Vec<usize> = Vec::new();
        for name in &node_names {
            let base = dof_map[name.as_str()];
            let restraints = self
                .supports
                .get(name)
                .map(|s| s.restraints())
                .unwrap_or([false; 6]);
            for (i, &restrained) in restraints.iter().enumerate() {
                if !restrained {
                    free_index[base + i] = Some(free_dofs.len());
                    free_dofs.push(base + i);
                }
            }
        }
        if free_dofs.is_empty() {
            return Err(EngineError::InvalidInput(
                "no free degrees of freedom".to_string(),
            ));
        }

        // Per-element geometry, reused across combinations
        struct ElementOps {
            rotation: Mat3,
            t: math::Mat12,
            k_local: math::Mat12,
            length: f64,
            i_dof: usize,
            j_dof: usize,
        }
        let mut ops: HashMap<&str, ElementOps> = HashMap::new();
        for name in &element_names {
            let element = &self.elements[name];
            let i = &self.nodes[&element.i_node];
            let j = &self.nodes[&element.j_node];
            let section = &self.sections[&element.section];
            let material = &self.materials[&element.material];
            let length = i.distance_to(j);

            let rotation = math::rotation_matrix(&i.coords(), &j.coords(), element.rotation);
            let t = math::transformation_matrix(&rotation);
            let k_local = math::local_stiffness(
                material.e,
                material.g,
                section.a,
                section.iy,
                section.iz,
                section.j,
                length,
            );

            ops.insert(
                name.as_str(),
                ElementOps {
                    rotation,
                    t,
                    k_local,
                    length,
                    i_dof: dof_map[element.i_node.as_str()],
                    j_dof: dof_map[element.j_node.as_str()],
                },
            );
        }

        // Assemble the reduced (free-free) system directly
        let mut builder = StiffnessBuilder::new(free_dofs.len());
        for name in &element_names {
            let op = &ops[name.as_str()];
            let k_global = op.t.transpose() * op.k_local * op.t;
            for a in 0..12 {
                let ga = if a < 6 { op.i_dof + a } else { op.j_dof + a - 6 };
                let Some(fa) = free_index[ga] else { continue };
                for b in 0..12 {
                    let gb = if b < 6 { op.i_dof + b } else { op.j_dof + b - 6 };
                    if let Some(fb) = free_index[gb] {
                        builder.add(fa, fb, k_global[(a, b)]);
                    }
                }
            }
        }
        let k11 = builder.to_dense();
        let k11_csr = builder.to_csr();

        // A free DOF no element stiffness reaches is a rigid-body mode;
        // report it before factorization garbles the attribution
        for fi in 0..free_dofs.len() {
            if k11[(fi, fi)].abs() < 1e-10 {
                return Err(self.singular_error(&node_names, &free_dofs, fi));
            }
        }

        let mut result = AnalysisResult {
            combos: self.combos.iter().map(|c| c.name.clone()).collect(),
            displacements: HashMap::new(),
            reactions: HashMap::new(),
            end_forces: HashMap::new(),
            envelopes: HashMap::new(),
        };
        let mut diagrams: HashMap<String, Vec<(String, ForceDiagram)>> = HashMap::new();

        for combo in &self.combos {
            log::debug!("solving combination '{}'", combo.name);

            // Reduced load vector: node loads plus element fixed-end reactions
            let mut p = Vector::zeros(free_dofs.len());
            for (node_name, loads) in &self.node_loads {
                let base = dof_map[node_name.as_str()];
                for load in loads {
                    let factor = combo.factor(&load.case);
                    if factor.abs() < 1e-10 {
                        continue;
                    }
                    for (i, value) in load.as_array().iter().enumerate() {
                        if let Some(fi) = free_index[base + i] {
                            p[fi] += factor * value;
                        }
                    }
                }
            }

            let mut fers: HashMap<&str, Vec12> = HashMap::new();
            for name in &element_names {
                let op = &ops[name.as_str()];
                let fer = self.element_fer(name, &op.rotation, op.length, combo);
                if fer.norm() > 0.0 {
                    let fer_global = op.t.transpose() * fer;
                    for a in 0..12 {
                        let g = if a < 6 { op.i_dof + a } else { op.j_dof + a - 6 };
                        if let Some(fi) = free_index[g] {
                            p[fi] -= fer_global[a];
                        }
                    }
                }
                fers.insert(name.as_str(), fer);
            }

            // Solve, with the one-shot refined retry inside
            let d_free = math::solve_checked(&k11, &k11_csr, &p, options.residual_tolerance)
                .map_err(|failure| match failure {
                    SolveFailure::Singular { weak_dof } => {
                        self.singular_error(&node_names, &free_dofs, weak_dof)
                    }
                    SolveFailure::Residual { residual } => EngineError::SolverConvergence {
                        residual,
                        tolerance: options.residual_tolerance,
                    },
                })?;

            // Expand to the full DOF vector; restrained DOFs are exactly zero
            let mut d_full = vec![0.0_f64; n_dofs];
            for (fi, &g) in free_dofs.iter().enumerate() {
                d_full[g] = d_free[fi];
            }

            for name in &node_names {
                let base = dof_map[name.as_str()];
                let mut arr = [0.0; 6];
                arr.copy_from_slice(&d_full[base..base + 6]);
                result
                    .displacements
                    .entry(name.clone())
                    .or_default()
                    .insert(combo.name.clone(), NodeDisplacement::from_array(arr));
            }

            // Element end forces: f = k_local d_local + FER
            let mut reactions: HashMap<String, [f64; 6]> = HashMap::new();
            for (node_name, support) in &self.supports {
                if support.is_supported() {
                    reactions.insert(node_name.clone(), [0.0; 6]);
                }
            }

            for name in &element_names {
                let element = &self.elements[name];
                let op = &ops[name.as_str()];

                let mut d_global = Vec12::zeros();
                for a in 0..6 {
                    d_global[a] = d_full[op.i_dof + a];
                    d_global[a + 6] = d_full[op.j_dof + a];
                }
                let d_local = op.t * d_global;
                let f_local = op.k_local * d_local + fers[name.as_str()];

                let mut arr = [0.0; 12];
                for i in 0..12 {
                    arr[i] = f_local[i];
                }
                result
                    .end_forces
                    .entry(name.clone())
                    .or_default()
                    .insert(combo.name.clone(), arr);

                // Accumulate support reactions from global end forces
                let f_global = op.t.transpose() * f_local;
                if let Some(r) = reactions.get_mut(&element.i_node) {
                    for i in 0..6 {
                        r[i] += f_global[i];
                    }
                }
                if let Some(r) = reactions.get_mut(&element.j_node) {
                    for i in 0..6 {
                        r[i] += f_global[i + 6];
                    }
                }

                // Station diagram for the envelope
                let line_loads = self.local_line_loads(name, &op.rotation, combo);
                let diagram = ForceDiagram::recover(&arr, &line_loads, op.length, options.stations);
                diagrams
                    .entry(name.clone())
                    .or_default()
                    .push((combo.name.clone(), diagram));
            }

            // Subtract applied node loads, mask unrestrained DOFs
            for (node_name, r) in &mut reactions {
                if let Some(loads) = self.node_loads.get(node_name) {
                    for load in loads {
                        let factor = combo.factor(&load.case);
                        for (i, value) in load.as_array().iter().enumerate() {
                            r[i] -= factor * value;
                        }
                    }
                }
                let mask = self.supports[node_name.as_str()].restraints();
                for i in 0..6 {
                    if !mask[i] {
                        r[i] = 0.0;
                    }
                }
                result
                    .reactions
                    .entry(node_name.clone())
                    .or_default()
                    .insert(combo.name.clone(), Reaction::from_array(*r));
            }
        }

        // Fold per-combination diagrams into envelopes
        for (name, per_combo) in diagrams {
            let envelope =
                ForceEnvelope::from_diagrams(per_combo.iter().map(|(c, d)| (c.as_str(), d)));
            if let Some(envelope) = envelope {
                result.envelopes.insert(name, envelope);
            }
        }

        Ok(result)
    }

    fn singular_error(
        &self,
        node_names: &[String],
        free_dofs: &[usize],
        weak_free_dof: usize,
    ) -> EngineError {
        let g = free_dofs[weak_free_dof];
        EngineError::SingularSystem {
            node: node_names[g / 6].clone(),
            dof: g % 6,
        }
    }

    /// Factored element fixed-end reactions in local axes for one combination
    fn element_fer(&self, name: &str, rotation: &Mat3, length: f64, combo: &LoadCombination) -> Vec12 {
        let mut fer = Vec12::zeros();

        if let Some(loads) = self.element_dist_loads.get(name) {
            for load in loads {
                let factor = combo.factor(&load.case);
                if factor.abs() < 1e-10 {
                    continue;
                }
                let w_local = local_components(rotation, load.direction, factor * load.w);
                fer += math::fer_uniform(&w_local, length);
            }
        }

        if let Some(loads) = self.element_point_loads.get(name) {
            for load in loads {
                let factor = combo.factor(&load.case);
                if factor.abs() < 1e-10 {
                    continue;
                }
                let p_local = local_components(rotation, load.direction, factor * load.magnitude);
                fer += math::fer_point(&p_local, load.position.clamp(0.0, length), length);
            }
        }

        fer
    }

    /// Element loads resolved into local components for diagram recovery
    fn local_line_loads(&self, name: &str, rotation: &Mat3, combo: &LoadCombination) -> LocalLineLoads {
        let mut out = LocalLineLoads::default();

        if let Some(loads) = self.element_dist_loads.get(name) {
            for load in loads {
                let factor = combo.factor(&load.case);
                if factor.abs() < 1e-10 {
                    continue;
                }
                let w = local_components(rotation, load.direction, factor * load.w);
                out.udl[0] += w[0];
                out.udl[1] += w[1];
                out.udl[2] += w[2];
            }
        }

        if let Some(loads) = self.element_point_loads.get(name) {
            for load in loads {
                let factor = combo.factor(&load.case);
                if factor.abs() < 1e-10 {
                    continue;
                }
                let p = local_components(rotation, load.direction, factor * load.magnitude);
                out.points.push((load.position, [p[0], p[1], p[2]]));
            }
        }

        out
    }
}

/// Resolve a directed load magnitude into local axis components
fn local_components(rotation: &Mat3, direction: LoadDirection, magnitude: f64) -> Vector3<f64> {
    match direction {
        LoadDirection::LocalX => Vector3::new(magnitude, 0.0, 0.0),
        LoadDirection::LocalY => Vector3::new(0.0, magnitude, 0.0),
        LoadDirection::LocalZ => Vector3::new(0.0, 0.0, magnitude),
        // Gravity acts along global -Y; rows of the rotation matrix are the
        // local axes, so R * g gives the local components
        LoadDirection::Gravity => rotation * Vector3::new(0.0, -magnitude, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loads::CaseKind;
    use approx::assert_relative_eq;

    fn single_combo(model: &mut FrameModel) {
        model.combos = vec![LoadCombination::single("Service", "Live")];
    }

    fn cantilever() -> FrameModel {
        let mut model = FrameModel::new();
        model.add_material("M25", Material::m25()).unwrap();
        model
            .add_section("B300x500", Section::rectangular(0.3, 0.5))
            .unwrap();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(4.0, 0.0, 0.0)).unwrap();
        model
            .add_element("M1", Element::beam("N1", "N2", "M25", "B300x500"))
            .unwrap();
        model.add_support("N1", Support::fixed()).unwrap();
        model
            .add_load_case(LoadCase::new("Live", CaseKind::Live))
            .unwrap();
        model
    }

    #[test]
    fn test_cantilever_tip_deflection_closed_form() {
        let mut model = cantilever();
        let p = 10e3;
        model
            .add_node_load("N2", NodeLoad::fy(-p, "Live"))
            .unwrap();
        single_combo(&mut model);

        let result = model.analyze(&AnalysisOptions::default()).unwrap();
        let tip = result.displacement("N2", "Service").unwrap();

        let material = Material::m25();
        let section = Section::rectangular(0.3, 0.5);
        let expected = -p * 4.0_f64.powi(3) / (3.0 * material.e * section.iz);
        assert_relative_eq!(tip.dy, expected, max_relative = 1e-6);

        // Fixed end: restrained DOFs exactly zero
        let root = result.displacement("N1", "Service").unwrap();
        assert_eq!(root.dy, 0.0);
        assert_eq!(root.rz, 0.0);

        // Reaction balances the applied load
        let r = result.reaction("N1", "Service").unwrap();
        assert_relative_eq!(r.fy, p, max_relative = 1e-9);
        assert_relative_eq!(r.mz, p * 4.0, max_relative = 1e-9);
    }

    #[test]
    fn test_two_member_determinate_frame_closed_form() {
        // L-frame: column N1(base, fixed) -> N2, beam N2 -> N3 with tip load.
        // Statics give the column base moment P*span exactly.
        let mut model = FrameModel::new();
        model.add_material("M25", Material::m25()).unwrap();
        model
            .add_section("S", Section::rectangular(0.3, 0.45))
            .unwrap();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(0.0, 3.0, 0.0)).unwrap();
        model.add_node("N3", Node::new(2.5, 3.0, 0.0)).unwrap();
        model
            .add_element("C1", Element::column("N1", "N2", "M25", "S"))
            .unwrap();
        model
            .add_element("B1", Element::beam("N2", "N3", "M25", "S"))
            .unwrap();
        model.add_support("N1", Support::fixed()).unwrap();
        model
            .add_load_case(LoadCase::new("Live", CaseKind::Live))
            .unwrap();
        let p = 20e3;
        model.add_node_load("N3", NodeLoad::fy(-p, "Live")).unwrap();
        single_combo(&mut model);

        let result = model.analyze(&AnalysisOptions::default()).unwrap();
        let r = result.reaction("N1", "Service").unwrap();
        assert_relative_eq!(r.fy, p, max_relative = 1e-6);
        assert_relative_eq!(r.mz.abs(), p * 2.5, max_relative = 1e-6);

        // Beam envelope peak moment is P * span at the fixed-joint end
        let (m_peak, _) = result.envelope("B1").unwrap().peak_moment_z();
        assert_relative_eq!(m_peak, p * 2.5, max_relative = 1e-6);
    }

    #[test]
    fn test_unstable_frame_reports_singular_node() {
        let mut model = cantilever();
        // A node connected by an element but with the whole thing unsupported
        model.supports.clear();
        model
            .add_node_load("N2", NodeLoad::fy(-1.0, "Live"))
            .unwrap();
        single_combo(&mut model);

        match model.analyze(&AnalysisOptions::default()) {
            Err(EngineError::SingularSystem { .. }) => {}
            other => panic!("expected singular system, got {other:?}"),
        }
    }

    #[test]
    fn test_floating_node_is_singular_not_topology() {
        let mut model = cantilever();
        model.add_node("N9", Node::new(9.0, 9.0, 0.0)).unwrap();
        model
            .add_node_load("N2", NodeLoad::fy(-1.0, "Live"))
            .unwrap();
        single_combo(&mut model);

        match model.analyze(&AnalysisOptions::default()) {
            Err(EngineError::SingularSystem { node, .. }) => assert_eq!(node, "N9"),
            other => panic!("expected singular system at N9, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_element_is_topology_error() {
        let mut model = cantilever();
        model
            .add_element("M2", Element::beam("N2", "N1", "M25", "B300x500"))
            .unwrap();
        single_combo(&mut model);

        match model.validate_topology() {
            Err(EngineError::Topology(msg)) => assert!(msg.contains("duplicates")),
            other => panic!("expected topology error, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_section_reference_after_substitution() {
        let mut model = cantilever();
        let err = model.set_element_section("M1", "nope").unwrap_err();
        assert!(matches!(err, EngineError::SectionNotFound(_)));
    }

    #[test]
    fn test_self_weight_takedown() {
        let mut model = cantilever();
        model
            .add_load_case(LoadCase::new("Dead", CaseKind::Dead))
            .unwrap();
        model.apply_self_weight("Dead").unwrap();

        let loads = &model.element_dist_loads["M1"];
        assert_eq!(loads.len(), 1);
        // 0.3 x 0.5 section at 25 kN/m3 = 3.75 kN/m
        assert_relative_eq!(loads[0].w, 3750.0, epsilon = 1e-9);
    }

    #[test]
    fn test_midspan_point_load_closed_form() {
        // Simply supported 6 m beam, P at midspan: M_mid = PL/4.
        // Torsion about the beam axis is held at the left support.
        let mut model = FrameModel::new();
        model.add_material("M25", Material::m25()).unwrap();
        model
            .add_section("B", Section::rectangular(0.23, 0.45))
            .unwrap();
        model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
        model.add_node("N2", Node::new(6.0, 0.0, 0.0)).unwrap();
        model
            .add_element("M1", Element::beam("N1", "N2", "M25", "B"))
            .unwrap();
        model
            .add_support("N1", Support::with_restraints(true, true, true, true, false, false))
            .unwrap();
        model
            .add_support("N2", Support::with_restraints(false, true, true, false, false, false))
            .unwrap();
        model
            .add_load_case(LoadCase::new("Live", CaseKind::Live))
            .unwrap();
        let p = 40e3;
        model
            .add_element_point_load("M1", PointLoad::downward(p, 3.0, "Live"))
            .unwrap();
        single_combo(&mut model);

        let result = model.analyze(&AnalysisOptions::default()).unwrap();
        let (m_peak, _) = result.envelope("M1").unwrap().peak_moment_z();
        assert_relative_eq!(m_peak, p * 6.0 / 4.0, max_relative = 1e-6);
    }

    #[test]
    fn test_monotonic_demand_under_load_scaling() {
        let build = |p: f64| {
            let mut model = cantilever();
            model.add_node_load("N2", NodeLoad::fy(-p, "Live")).unwrap();
            single_combo(&mut model);
            let result = model.analyze(&AnalysisOptions::default()).unwrap();
            result.envelope("M1").unwrap().peak_moment_z().0
        };
        let m1 = build(10e3);
        let m2 = build(15e3);
        assert!(m2 >= m1);
    }
}
