//! Convergence controller: the coupled analysis-design loop
//!
//! `Initializing -> Analyzing -> Designing -> (dirty -> Analyzing | clean ->
//! Converged)`, with `Failed` terminal from either working state. Every loop
//! is bounded: the solver retries once, each member has an escalation budget,
//! and the whole run has a cycle cap.

use serde::{Deserialize, Serialize};

use crate::design::{
    self, footing, DesignKind, DesignOptions, DesignRecord, DesignStatus, SectionCatalog,
};
use crate::elements::{ElementKind, Material, Section};
use crate::error::{EngineError, EngineResult};
use crate::loads::CodeProfile;
use crate::model::{AnalysisOptions, FrameModel};
use crate::results::AnalysisResult;

/// Controller state, visible for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Initializing,
    Analyzing,
    Designing,
    Converged,
    Failed,
}

/// Options for a convergence run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Cycle cap; exceeding it yields `NonConvergent`
    pub max_cycles: usize,
    /// Analysis pass options
    pub analysis: AnalysisOptions,
    /// Member design options
    pub design: DesignOptions,
}

impl Default for EngineOptions {
    /// Defaults: 20 cycles, 9 stations, 5 escalations per member
    fn default() -> Self {
        Self {
            max_cycles: 20,
            analysis: AnalysisOptions::default(),
            design: DesignOptions::default(),
        }
    }
}

/// One cycle's design records, kept for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    /// 1-based cycle number
    pub cycle: usize,
    /// Members whose dimensions changed this cycle
    pub dirty: usize,
    /// All records produced this cycle
    pub records: Vec<DesignRecord>,
}

/// Material take-off and the scalar fitness signal for the plan-generation
/// caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSummary {
    /// Total concrete volume (m³)
    pub concrete_volume: f64,
    /// Total reinforcement steel mass (kg)
    pub steel_mass: f64,
    /// Members designed (including footings)
    pub members_total: usize,
    /// Members passing
    pub members_passing: usize,
    /// All members pass
    pub feasible: bool,
    /// Scalar cost index, the weighted material total
    pub cost_index: f64,
}

// Rate weighting from the quantity estimator; only the relative weighting
// matters for the fitness signal
const CONCRETE_RATE: f64 = 5500.0;
const STEEL_RATE: f64 = 75.0;
const STEEL_DENSITY: f64 = 7850.0;

/// The authoritative output of a converged run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergedDesign {
    /// Final design records, one per element plus one per footing
    pub records: Vec<DesignRecord>,
    /// The final cycle's analysis snapshot
    pub analysis: AnalysisResult,
    /// Cycles taken to converge
    pub cycles: usize,
    /// Per-cycle history for diagnostics; the last entry matches `records`
    pub history: Vec<CycleReport>,
    /// Material take-off / fitness signal
    pub summary: CostSummary,
}

impl ConvergedDesign {
    /// The record for a member or footing node
    pub fn record_for(&self, member: &str) -> Option<&DesignRecord> {
        self.records.iter().find(|r| r.member == member)
    }
}

/// The analysis-design convergence engine for one candidate geometry.
///
/// Owns its model and shares no mutable state, so independent candidates can
/// run on separate worker threads.
#[derive(Debug, Clone)]
pub struct DesignEngine {
    model: FrameModel,
    profile: CodeProfile,
    catalog: SectionCatalog,
    options: EngineOptions,
    state: EngineState,
}

impl DesignEngine {
    /// Create an engine over a model and code profile
    pub fn new(model: FrameModel, profile: CodeProfile) -> Self {
        Self {
            model,
            profile,
            catalog: SectionCatalog::default(),
            options: EngineOptions::default(),
            state: EngineState::Initializing,
        }
    }

    /// Use a custom section catalog
    pub fn with_catalog(mut self, catalog: SectionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Use custom options
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Current controller state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The model, reflecting any section substitutions made so far
    pub fn model(&self) -> &FrameModel {
        &self.model
    }

    /// Run the convergence loop to completion.
    ///
    /// Returns the full design on convergence, or the single terminal error
    /// (with its failing stage) otherwise - never a partial design. The
    /// engine keeps its mutated model, so re-running a converged engine
    /// reaches convergence again in one cycle.
    pub fn run(&mut self) -> EngineResult<ConvergedDesign> {
        self.state = EngineState::Initializing;

        if let Err(e) = self.model.validate_topology() {
            self.state = EngineState::Failed;
            return Err(e);
        }
        if self.model.combos.is_empty() {
            if let Err(e) = self.model.generate_combinations(&self.profile) {
                self.state = EngineState::Failed;
                return Err(e);
            }
        }

        let max_cycles = self.options.max_cycles.max(1);
        let mut history: Vec<CycleReport> = Vec::new();

        for cycle in 1..=max_cycles {
            self.state = EngineState::Analyzing;
            let analysis = match self.model.analyze(&self.options.analysis) {
                Ok(a) => a,
                Err(e) => {
                    self.state = EngineState::Failed;
                    return Err(e);
                }
            };

            self.state = EngineState::Designing;
            let mut records: Vec<DesignRecord> = Vec::new();
            let mut dirty = 0usize;

            for name in self.model.sorted_element_names() {
                let element = self.model.elements[&name].clone();
                let section = self.model.sections[&element.section];
                let material = self.model.materials[&element.material];
                let length =
                    self.model.nodes[&element.i_node].distance_to(&self.model.nodes[&element.j_node]);
                let envelope = match analysis.envelope(&name) {
                    Ok(e) => e,
                    Err(e) => {
                        self.state = EngineState::Failed;
                        return Err(e);
                    }
                };

                let record = design::design_element(
                    &name,
                    &element,
                    &section,
                    &material,
                    length,
                    envelope,
                    &self.catalog,
                    &self.options.design,
                );

                if let DesignStatus::Fail { reason } = &record.status {
                    self.state = EngineState::Failed;
                    return Err(EngineError::NonConvergent {
                        cycles: cycle,
                        reason: format!("element '{name}' {reason}"),
                    });
                }

                if record.section_changed {
                    dirty += 1;
                    let resized = Section::rectangular(record.width, record.depth);
                    let section_name = format!("{name} (sized)");
                    self.model.upsert_section(&section_name, resized);
                    if let Err(e) = self.model.set_element_section(&name, &section_name) {
                        self.state = EngineState::Failed;
                        return Err(e);
                    }
                }

                records.push(record);
            }

            // Footings at supported nodes carrying foundation data
            let mut support_nodes: Vec<String> = self.model.supports.keys().cloned().collect();
            support_nodes.sort();
            for node in support_nodes {
                let Some(foundation) = self.model.supports[&node].foundation else {
                    continue;
                };
                let Some((pu, combo)) = analysis.peak_support_load(&node) else {
                    continue;
                };
                let (column_width, material) = self.footing_context(&node);

                let record = footing::design(
                    &node,
                    &foundation,
                    pu,
                    &combo,
                    column_width,
                    &material,
                    &self.catalog,
                    &self.options.design,
                );

                if let DesignStatus::Fail { reason } = &record.status {
                    self.state = EngineState::Failed;
                    return Err(EngineError::NonConvergent {
                        cycles: cycle,
                        reason: format!("footing at '{node}' {reason}"),
                    });
                }
                records.push(record);
            }

            log::info!(
                "cycle {cycle}: {} members designed, {dirty} dirty",
                records.len()
            );
            history.push(CycleReport {
                cycle,
                dirty,
                records: records.clone(),
            });

            if dirty == 0 {
                self.state = EngineState::Converged;
                let summary = self.cost_summary(&records);
                return Ok(ConvergedDesign {
                    records,
                    analysis,
                    cycles: cycle,
                    history,
                    summary,
                });
            }
        }

        self.state = EngineState::Failed;
        Err(EngineError::NonConvergent {
            cycles: max_cycles,
            reason: "section dimensions still changing at the cycle cap".to_string(),
        })
    }

    /// Column dimension and material governing a footing, from the columns
    /// landing on its node
    fn footing_context(&self, node: &str) -> (f64, Material) {
        let mut width: f64 = 0.3;
        let mut material: Option<Material> = None;
        for element_name in self.model.elements_at(node) {
            let element = &self.model.elements[element_name];
            if element.kind != ElementKind::Column {
                continue;
            }
            if let Some(section) = self.model.sections.get(&element.section) {
                width = width.max(section.width.max(section.depth));
            }
            if material.is_none() {
                material = self.model.materials.get(&element.material).copied();
            }
        }
        (width, material.unwrap_or_default())
    }

    fn cost_summary(&self, records: &[DesignRecord]) -> CostSummary {
        let mut concrete = 0.0;
        let mut steel = 0.0;
        let mut passing = 0usize;

        for record in records {
            if record.status.is_pass() {
                passing += 1;
            }
            match record.kind {
                DesignKind::Footing => {
                    concrete += record.width * record.width * record.depth;
                    // Mats run in both directions
                    steel += record.reinforcement.ast / 1e6 * record.width * 2.0 * STEEL_DENSITY;
                }
                _ => {
                    let Some(element) = self.model.elements.get(&record.member) else {
                        continue;
                    };
                    let length = self.model.nodes[&element.i_node]
                        .distance_to(&self.model.nodes[&element.j_node]);
                    concrete += record.width * record.depth * length;
                    let bars = record.reinforcement.ast + record.reinforcement.asc;
                    steel += bars / 1e6 * length * STEEL_DENSITY;
                }
            }
        }

        CostSummary {
            concrete_volume: concrete,
            steel_mass: steel,
            members_total: records.len(),
            members_passing: passing,
            feasible: passing == records.len(),
            cost_index: CONCRETE_RATE * concrete + STEEL_RATE * steel,
        }
    }
}
