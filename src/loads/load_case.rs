//! Load cases

use serde::{Deserialize, Serialize};

/// Kind of a primary load case, used by the combination generator to apply
/// the code-mandated partial safety factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseKind {
    /// Dead loads: self-weight, finishes, walls
    Dead,
    /// Imposed (live) loads
    Live,
    /// Wind loads
    Wind,
    /// Seismic loads
    Seismic,
    /// Snow loads
    Snow,
}

impl CaseKind {
    /// Code abbreviation used in combination names
    pub fn abbrev(&self) -> &'static str {
        match self {
            CaseKind::Dead => "DL",
            CaseKind::Live => "LL",
            CaseKind::Wind => "WL",
            CaseKind::Seismic => "EL",
            CaseKind::Snow => "SL",
        }
    }
}

impl std::fmt::Display for CaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// A load case groups related loads under a common name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadCase {
    /// Name of the load case
    pub name: String,
    /// Kind, for combination factor lookup
    pub kind: CaseKind,
    /// Description of the load case
    pub description: Option<String>,
}

impl LoadCase {
    /// Create a new load case
    pub fn new(name: &str, kind: CaseKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Conventional dead load case
    pub fn dead() -> Self {
        Self::new("Dead", CaseKind::Dead).with_description("Self-weight and permanent loads")
    }

    /// Conventional live load case
    pub fn live() -> Self {
        Self::new("Live", CaseKind::Live).with_description("Imposed occupancy loads")
    }

    /// Conventional wind load case
    pub fn wind() -> Self {
        Self::new("Wind", CaseKind::Wind).with_description("Wind loads")
    }

    /// Conventional seismic load case
    pub fn seismic() -> Self {
        Self::new("Seismic", CaseKind::Seismic).with_description("Earthquake loads")
    }
}
