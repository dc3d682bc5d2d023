//! rcframe - analysis-design convergence engine for RC building frames
//!
//! Given a 3D frame geometry, a section/material catalog and the applicable
//! loads, this library computes member force envelopes across the code's
//! load combinations and sizes every member (column, beam, slab strip,
//! footing) against IS 456:2000 limit-state checks, iterating analysis and
//! design until the structure is stable or a terminal failure is declared.
//!
//! Geometry generation, presentation and quantity extraction are the
//! caller's business; this crate takes structured data in and hands
//! structured design records (plus a scalar cost/feasibility signal) back.
//!
//! ## Example
//! ```rust
//! use rcframe::prelude::*;
//!
//! let mut model = FrameModel::new();
//!
//! model.add_material("M25", Material::m25()).unwrap();
//! model.add_section("C300", Section::rectangular(0.3, 0.3)).unwrap();
//! model.add_section("B230", Section::rectangular(0.23, 0.4)).unwrap();
//!
//! // A single-bay portal frame
//! model.add_node("N1", Node::new(0.0, 0.0, 0.0)).unwrap();
//! model.add_node("N2", Node::new(0.0, 3.0, 0.0)).unwrap();
//! model.add_node("N3", Node::new(4.5, 3.0, 0.0)).unwrap();
//! model.add_node("N4", Node::new(4.5, 0.0, 0.0)).unwrap();
//! model.add_element("C1", Element::column("N1", "N2", "M25", "C300")).unwrap();
//! model.add_element("B1", Element::beam("N2", "N3", "M25", "B230")).unwrap();
//! model.add_element("C2", Element::column("N4", "N3", "M25", "C300")).unwrap();
//! model.add_support("N1", Support::fixed()).unwrap();
//! model.add_support("N4", Support::fixed()).unwrap();
//!
//! // Loads: self-weight plus an imposed UDL on the beam
//! model.add_load_case(LoadCase::dead()).unwrap();
//! model.add_load_case(LoadCase::live()).unwrap();
//! model.apply_self_weight("Dead").unwrap();
//! model
//!     .add_element_dist_load("B1", DistributedLoad::downward(12e3, "Live"))
//!     .unwrap();
//!
//! // Converge analysis and design under the gravity combinations
//! let mut engine = DesignEngine::new(model, CodeProfile::default());
//! let design = engine.run().unwrap();
//!
//! assert!(design.summary.feasible);
//! let beam = design.record_for("B1").unwrap();
//! assert!(beam.reserve_ratio >= 1.0);
//! ```

pub mod design;
pub mod elements;
pub mod engine;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::design::{
        CheckKind, DesignKind, DesignOptions, DesignRecord, DesignStatus, SectionCatalog,
    };
    pub use crate::elements::{Element, ElementKind, Foundation, Material, Node, Section, Support};
    pub use crate::engine::{
        ConvergedDesign, CostSummary, DesignEngine, EngineOptions, EngineState,
    };
    pub use crate::error::{EngineError, EngineResult, Stage};
    pub use crate::loads::{
        CaseKind, CodeProfile, DesignCode, DistributedLoad, LoadCase, LoadCombination,
        LoadDirection, NodeLoad, PointLoad, SeismicZone,
    };
    pub use crate::model::{AnalysisOptions, FrameModel};
    pub use crate::results::{
        AnalysisResult, ForceEnvelope, NodeDisplacement, Reaction, StationForces,
    };
}
