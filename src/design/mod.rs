//! Member design engine
//!
//! Polymorphic over the element kind tag: each variant is a pure function
//! from (section, material, force envelope, options) to a [`DesignRecord`],
//! escalating through the section catalog on capacity failure within a
//! bounded retry budget.

pub mod beam;
pub mod catalog;
pub mod column;
pub mod footing;
pub mod is456;
pub mod record;
pub mod slab;

use serde::{Deserialize, Serialize};

use crate::elements::{Element, ElementKind, Material, Section};
use crate::results::ForceEnvelope;

pub use catalog::SectionCatalog;
pub use record::{CheckKind, DesignKind, DesignRecord, DesignStatus, Reinforcement};

/// Options shared by all member designers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignOptions {
    /// Escalation retry budget per member
    pub max_escalations: usize,
    /// Effective cover to the steel centroid (mm)
    pub effective_cover: f64,
    /// Column effective length factor (braced frame)
    pub effective_length_factor: f64,
    /// Basic span/effective-depth limit for beams (Cl 23.2.1)
    pub basic_span_depth: f64,
    /// Span/effective-depth limit for slab strips, the basic value times the
    /// low-steel modification factor
    pub slab_span_depth: f64,
}

impl Default for DesignOptions {
    fn default() -> Self {
        Self {
            max_escalations: 5,
            effective_cover: 50.0,
            effective_length_factor: 1.0,
            basic_span_depth: 20.0,
            slab_span_depth: 30.0,
        }
    }
}

/// Design one frame element against its force envelope, dispatching on the
/// element's kind tag
#[allow(clippy::too_many_arguments)]
pub fn design_element(
    name: &str,
    element: &Element,
    section: &Section,
    material: &Material,
    length: f64,
    envelope: &ForceEnvelope,
    catalog: &SectionCatalog,
    options: &DesignOptions,
) -> DesignRecord {
    match element.kind {
        ElementKind::Beam | ElementKind::FootingTie => beam::design(
            name,
            element.kind.into(),
            section,
            material,
            length,
            envelope,
            catalog,
            options,
        ),
        ElementKind::SlabStrip => {
            slab::design(name, section, material, length, envelope, catalog, options)
        }
        ElementKind::Column => {
            column::design(name, section, material, length, envelope, catalog, options)
        }
    }
}
