//! Code profile and combination generation
//!
//! The combination set required by the design code is data, not logic: each
//! row of the lateral table mirrors a row of IS 456:2000 Table 18, and
//! lateral rows are expanded once per enabled lateral kind with both signs.
//! Future code editions add rows, they do not change the generator.

use serde::{Deserialize, Serialize};

use super::{CaseKind, LoadCase, LoadCombination};
use crate::error::{EngineError, EngineResult};

/// Supported design code editions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesignCode {
    /// IS 456:2000 limit state design
    Is456_2000,
}

impl std::fmt::Display for DesignCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignCode::Is456_2000 => write!(f, "IS 456:2000"),
        }
    }
}

/// Seismic zone per IS 1893 (Part 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeismicZone {
    II,
    III,
    IV,
    V,
}

impl SeismicZone {
    /// Zone factor Z (IS 1893 Table 2)
    pub fn zone_factor(&self) -> f64 {
        match self {
            SeismicZone::II => 0.10,
            SeismicZone::III => 0.16,
            SeismicZone::IV => 0.24,
            SeismicZone::V => 0.36,
        }
    }
}

/// The code profile selecting which combinations are mandated.
///
/// Wind rows are generated iff `basic_wind_speed` is set; seismic rows iff
/// `seismic_zone` is set. Dead and live cases are always mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeProfile {
    /// Active design code edition
    pub code: DesignCode,
    /// Seismic zone; None disables seismic combinations
    pub seismic_zone: Option<SeismicZone>,
    /// Basic wind speed (m/s); None disables wind combinations
    pub basic_wind_speed: Option<f64>,
    /// Importance factor I (IS 1893 Table 6)
    pub importance_factor: f64,
    /// Response reduction factor R (IS 1893 Table 7)
    pub response_reduction: f64,
}

impl Default for CodeProfile {
    fn default() -> Self {
        Self {
            code: DesignCode::Is456_2000,
            seismic_zone: None,
            basic_wind_speed: None,
            importance_factor: 1.0,
            response_reduction: 3.0,
        }
    }
}

/// One row of the code's combination table. Lateral rows are expanded with
/// both signs for each enabled lateral kind.
#[derive(Debug, Clone, Copy)]
struct ComboRow {
    dead: f64,
    live: f64,
    lateral: f64,
}

/// IS 456:2000 Table 18, gravity row: 1.5 (DL + IL)
const GRAVITY_ROW: ComboRow = ComboRow { dead: 1.5, live: 1.5, lateral: 0.0 };

/// IS 456:2000 Table 18, rows involving a lateral (wind or seismic) case
const LATERAL_ROWS: &[ComboRow] = &[
    ComboRow { dead: 1.2, live: 1.2, lateral: 1.2 },
    ComboRow { dead: 1.5, live: 0.0, lateral: 1.5 },
    ComboRow { dead: 0.9, live: 0.0, lateral: 1.5 },
];

impl CodeProfile {
    /// Enable seismic combinations for a zone
    pub fn with_seismic_zone(mut self, zone: SeismicZone) -> Self {
        self.seismic_zone = Some(zone);
        self
    }

    /// Enable wind combinations for a basic wind speed (m/s)
    pub fn with_wind_speed(mut self, speed: f64) -> Self {
        self.basic_wind_speed = Some(speed);
        self
    }

    /// Set the importance factor
    pub fn with_importance_factor(mut self, i: f64) -> Self {
        self.importance_factor = i;
        self
    }

    /// Design horizontal seismic coefficient Ah = (Z/2)·(I/R), unit Sa/g.
    ///
    /// A convenience for callers building equivalent-static seismic cases;
    /// the engine itself takes seismic loads as input.
    pub fn seismic_coefficient(&self) -> Option<f64> {
        self.seismic_zone
            .map(|z| z.zone_factor() / 2.0 * self.importance_factor / self.response_reduction)
    }

    /// Lateral case kinds this profile mandates, in generation order
    pub fn lateral_kinds(&self) -> Vec<CaseKind> {
        let mut kinds = Vec::new();
        if self.basic_wind_speed.is_some() {
            kinds.push(CaseKind::Wind);
        }
        if self.seismic_zone.is_some() {
            kinds.push(CaseKind::Seismic);
        }
        kinds
    }

    /// Generate the full mandated combination set for the supplied load cases.
    ///
    /// Deterministic: the output order follows the code table, then the
    /// lateral kind order, then +/-. Fails with `IncompleteLoadData` when a
    /// mandated case kind has no corresponding input case.
    pub fn generate_combinations(&self, cases: &[LoadCase]) -> EngineResult<Vec<LoadCombination>> {
        let of_kind = |kind: CaseKind| -> Vec<&LoadCase> {
            cases.iter().filter(|c| c.kind == kind).collect()
        };

        let require = |kind: CaseKind| -> EngineResult<()> {
            if of_kind(kind).is_empty() {
                return Err(EngineError::IncompleteLoadData {
                    kind: kind.abbrev().to_string(),
                    code: self.code.to_string(),
                });
            }
            Ok(())
        };

        require(CaseKind::Dead)?;
        require(CaseKind::Live)?;
        for kind in self.lateral_kinds() {
            require(kind)?;
        }

        // Snow is an imposed load for combination purposes (IS 875 Part 4)
        let live_like: Vec<&LoadCase> = cases
            .iter()
            .filter(|c| matches!(c.kind, CaseKind::Live | CaseKind::Snow))
            .collect();
        let dead = of_kind(CaseKind::Dead);

        let mut combos = Vec::new();

        let build = |name: String, row: &ComboRow, lateral: &[&LoadCase], sign: f64| {
            let mut combo = LoadCombination::new(&name);
            for case in &dead {
                combo = combo.with_case(&case.name, row.dead);
            }
            if row.live != 0.0 {
                for case in &live_like {
                    combo = combo.with_case(&case.name, row.live);
                }
            }
            for case in lateral {
                combo = combo.with_case(&case.name, sign * row.lateral);
            }
            combo
        };

        combos.push(build(
            format!("{:.1} (DL + LL)", GRAVITY_ROW.dead),
            &GRAVITY_ROW,
            &[],
            1.0,
        ));

        for kind in self.lateral_kinds() {
            let lateral = of_kind(kind);
            for row in LATERAL_ROWS {
                for sign in [1.0, -1.0] {
                    let sig = if sign > 0.0 { '+' } else { '-' };
                    let name = if row.live != 0.0 {
                        format!("{:.1} (DL + LL {} {})", row.dead, sig, kind.abbrev())
                    } else if (row.dead - row.lateral).abs() < 1e-9 {
                        format!("{:.1} (DL {} {})", row.dead, sig, kind.abbrev())
                    } else {
                        format!("{:.1} DL {} {:.1} {}", row.dead, sig, row.lateral, kind.abbrev())
                    };
                    combos.push(build(name, row, &lateral, sign));
                }
            }
        }

        Ok(combos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gravity_cases() -> Vec<LoadCase> {
        vec![LoadCase::dead(), LoadCase::live()]
    }

    #[test]
    fn test_gravity_only_profile() {
        let profile = CodeProfile::default();
        let combos = profile.generate_combinations(&gravity_cases()).unwrap();
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].name, "1.5 (DL + LL)");
        assert_eq!(combos[0].factor("Dead"), 1.5);
        assert_eq!(combos[0].factor("Live"), 1.5);
    }

    #[test]
    fn test_wind_rows_expand_both_signs() {
        let profile = CodeProfile::default().with_wind_speed(39.0);
        let mut cases = gravity_cases();
        cases.push(LoadCase::wind());
        let combos = profile.generate_combinations(&cases).unwrap();

        // 1 gravity + 3 wind rows x 2 signs
        assert_eq!(combos.len(), 7);
        assert_eq!(combos[1].name, "1.2 (DL + LL + WL)");
        assert_eq!(combos[1].factor("Wind"), 1.2);
        assert_eq!(combos[2].factor("Wind"), -1.2);
        assert_eq!(combos[5].name, "0.9 DL + 1.5 WL");
        assert_eq!(combos[5].factor("Dead"), 0.9);
        assert_eq!(combos[5].factor("Live"), 0.0);
    }

    #[test]
    fn test_missing_seismic_case_is_incomplete() {
        let profile = CodeProfile::default().with_seismic_zone(SeismicZone::III);
        let err = profile.generate_combinations(&gravity_cases()).unwrap_err();
        assert!(matches!(err, EngineError::IncompleteLoadData { .. }));
    }

    #[test]
    fn test_deterministic_ordering() {
        let profile = CodeProfile::default()
            .with_wind_speed(44.0)
            .with_seismic_zone(SeismicZone::IV);
        let mut cases = gravity_cases();
        cases.push(LoadCase::wind());
        cases.push(LoadCase::seismic());

        let a = profile.generate_combinations(&cases).unwrap();
        let b = profile.generate_combinations(&cases).unwrap();
        let names_a: Vec<_> = a.iter().map(|c| c.name.clone()).collect();
        let names_b: Vec<_> = b.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names_a, names_b);
        assert_eq!(a.len(), 13);
    }

    #[test]
    fn test_seismic_coefficient() {
        let profile = CodeProfile::default().with_seismic_zone(SeismicZone::V);
        let ah = profile.seismic_coefficient().unwrap();
        assert!((ah - 0.36 / 2.0 / 3.0).abs() < 1e-12);
    }
}
