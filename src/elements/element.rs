//! Frame element - a 1D member between two nodes

use serde::{Deserialize, Serialize};

/// Structural role of a frame element.
///
/// The member design engine dispatches on this tag: each kind gets its own
/// capacity-check procedure and escalation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Vertical load-bearing member, designed for axial + biaxial bending
    Column,
    /// Horizontal flexural member, designed for flexure/shear/deflection
    Beam,
    /// 1 m wide equivalent strip of a one-way slab
    SlabStrip,
    /// Tie beam connecting footings at foundation level
    FootingTie,
}

impl ElementKind {
    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Column => "column",
            ElementKind::Beam => "beam",
            ElementKind::SlabStrip => "slab strip",
            ElementKind::FootingTie => "footing tie",
        }
    }
}

/// A 3D frame element referencing its end nodes, section and material by name.
///
/// The element owns no nodes. Its section and material references are the only
/// attributes the design engine may replace between convergence cycles;
/// identity (name, node pair, kind) is stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Name of the i-node (start)
    pub i_node: String,
    /// Name of the j-node (end)
    pub j_node: String,
    /// Name of the material
    pub material: String,
    /// Name of the section
    pub section: String,
    /// Structural role tag
    pub kind: ElementKind,
    /// Roll rotation about the longitudinal axis (radians)
    pub rotation: f64,
}

impl Element {
    /// Create a new element
    pub fn new(i_node: &str, j_node: &str, material: &str, section: &str, kind: ElementKind) -> Self {
        Self {
            i_node: i_node.to_string(),
            j_node: j_node.to_string(),
            material: material.to_string(),
            section: section.to_string(),
            kind,
            rotation: 0.0,
        }
    }

    /// Shorthand for a column element
    pub fn column(i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self::new(i_node, j_node, material, section, ElementKind::Column)
    }

    /// Shorthand for a beam element
    pub fn beam(i_node: &str, j_node: &str, material: &str, section: &str) -> Self {
        Self::new(i_node, j_node, material, section, ElementKind::Beam)
    }

    /// Set the roll rotation about the longitudinal axis
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Unordered node pair, used for duplicate detection
    pub fn node_pair(&self) -> (String, String) {
        if self.i_node <= self.j_node {
            (self.i_node.clone(), self.j_node.clone())
        } else {
            (self.j_node.clone(), self.i_node.clone())
        }
    }

    /// Whether this kind is designed as a flexural member
    pub fn is_flexural(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Beam | ElementKind::SlabStrip | ElementKind::FootingTie
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_creation() {
        let el = Element::beam("N1", "N2", "M25", "B230x450");
        assert_eq!(el.i_node, "N1");
        assert_eq!(el.kind, ElementKind::Beam);
        assert!(el.is_flexural());
    }

    #[test]
    fn test_node_pair_is_unordered() {
        let a = Element::beam("N2", "N1", "M25", "S");
        let b = Element::beam("N1", "N2", "M25", "S");
        assert_eq!(a.node_pair(), b.node_pair());
    }
}
