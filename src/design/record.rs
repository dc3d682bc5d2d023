//! Design records - the engine's externally visible output

use serde::{Deserialize, Serialize};

use crate::elements::ElementKind;

/// What a design record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesignKind {
    Beam,
    Column,
    SlabStrip,
    FootingTie,
    /// Isolated footing at a supported node
    Footing,
}

impl From<ElementKind> for DesignKind {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Beam => DesignKind::Beam,
            ElementKind::Column => DesignKind::Column,
            ElementKind::SlabStrip => DesignKind::SlabStrip,
            ElementKind::FootingTie => DesignKind::FootingTie,
        }
    }
}

/// The capacity check a record's reserve ratio is governed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckKind {
    /// Flexural capacity
    Flexure,
    /// Shear capacity / stirrup design
    Shear,
    /// Span-to-depth serviceability
    Deflection,
    /// Axial capacity of a column
    AxialCapacity,
    /// Biaxial bending interaction
    BiaxialInteraction,
    /// Slenderness ratio bound
    Slenderness,
    /// Reinforcement percentage bounds
    SteelLimits,
    /// Soil bearing pressure under a footing
    BearingPressure,
    /// One-way (beam) shear in a footing
    OneWayShear,
    /// Two-way punching shear in a footing
    PunchingShear,
}

impl CheckKind {
    /// Governing IS 456:2000 clause
    pub fn clause(&self) -> &'static str {
        match self {
            CheckKind::Flexure => "Annex G-1.1",
            CheckKind::Shear => "Cl 40",
            CheckKind::Deflection => "Cl 23.2.1",
            CheckKind::AxialCapacity => "Cl 39.3",
            CheckKind::BiaxialInteraction => "Cl 39.6",
            CheckKind::Slenderness => "Cl 25.3.1",
            CheckKind::SteelLimits => "Cl 26.5",
            CheckKind::BearingPressure => "Cl 34.1",
            CheckKind::OneWayShear => "Cl 34.2.4",
            CheckKind::PunchingShear => "Cl 31.6.3",
        }
    }
}

/// Pass/fail outcome of a member design
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesignStatus {
    Pass,
    Fail { reason: String },
}

impl DesignStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, DesignStatus::Pass)
    }
}

/// Reinforcement layout for one member
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reinforcement {
    /// Main tension steel area (mm²)
    pub ast: f64,
    /// Compression steel area, doubly reinforced sections and columns (mm²)
    pub asc: f64,
    /// Main bar diameter (mm)
    pub bar_diameter: f64,
    /// Main bar count (columns: total; beams: tension face)
    pub bar_count: usize,
    /// Bar spacing for slabs and footings (mm c/c)
    pub bar_spacing: Option<f64>,
    /// Stirrup/tie diameter (mm)
    pub stirrup_diameter: Option<f64>,
    /// Stirrup/tie spacing (mm)
    pub stirrup_spacing: Option<f64>,
}

/// Pick a bar diameter and count covering the required steel area.
///
/// Prefers the smallest stock diameter that fits within `max_count` bars.
pub fn select_bars(
    required_area: f64,
    diameters: &[f64],
    min_count: usize,
    max_count: usize,
) -> (f64, usize) {
    let mut fallback = (0.0, 0usize);
    for &dia in diameters {
        let area = super::is456::bar_area(dia);
        let count = (required_area / area).ceil().max(min_count as f64) as usize;
        fallback = (dia, count);
        if count <= max_count {
            return (dia, count);
        }
    }
    fallback
}

/// The authoritative design output for one member or footing.
///
/// Only the last cycle's record is authoritative; earlier cycles are kept in
/// the engine's history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignRecord {
    /// Element name, or node name for a footing
    pub member: String,
    /// What this record describes
    pub kind: DesignKind,
    /// Final width (m); footing plan side for footings
    pub width: f64,
    /// Final overall depth (m)
    pub depth: f64,
    /// Reinforcement layout
    pub reinforcement: Reinforcement,
    /// Load combination that produced the governing demand
    pub governing_combo: String,
    /// The check with the smallest reserve
    pub governing_check: CheckKind,
    /// Pass/fail outcome
    pub status: DesignStatus,
    /// Minimum capacity/demand ratio across all checks; >= 1.0 on pass
    pub reserve_ratio: f64,
    /// True when escalation changed the section dimensions this cycle, so
    /// global stiffness must be recomputed
    pub section_changed: bool,
    /// Escalation steps consumed
    pub escalations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_selection_prefers_small_bars() {
        // ~700 mm² of steel: 4-16mm (804 mm²) beats 7-12mm
        let (dia, count) = select_bars(700.0, &[12.0, 16.0, 20.0, 25.0], 2, 6);
        assert_eq!(dia, 16.0);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_bar_selection_falls_back_to_largest() {
        let (dia, _) = select_bars(50_000.0, &[12.0, 16.0], 2, 6);
        assert_eq!(dia, 16.0);
    }

    #[test]
    fn test_clause_mapping() {
        assert_eq!(CheckKind::Flexure.clause(), "Annex G-1.1");
        assert_eq!(CheckKind::PunchingShear.clause(), "Cl 31.6.3");
    }
}
