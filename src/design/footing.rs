//! Isolated footing design at supported nodes
//!
//! Plan area from the service load against the allowable soil bearing
//! pressure (with a 10% self-weight allowance), then flexure at the column
//! face, one-way shear at d from the face and two-way punching shear at d/2
//! around the column (Cl 34 / Cl 31.6). Escalation grows the plan side;
//! footing dimensions never feed back into frame stiffness.

use crate::elements::{Foundation, Material};

use super::catalog::SectionCatalog;
use super::is456;
use super::record::{CheckKind, DesignKind, DesignRecord, DesignStatus, Reinforcement};
use super::DesignOptions;

struct FootingAttempt {
    effective_depth: f64,
    ast: f64,
    reserve: f64,
    governing: CheckKind,
}

/// Design a square isolated footing for a factored column load `pu` (N).
///
/// `column_width` is the supported column's larger plan dimension (m);
/// `combo` names the combination that produced `pu`.
pub fn design(
    node: &str,
    foundation: &Foundation,
    pu: f64,
    combo: &str,
    column_width: f64,
    material: &Material,
    catalog: &SectionCatalog,
    options: &DesignOptions,
) -> DesignRecord {
    let fck = material.fck_mpa();
    let fy = material.fy_mpa();
    let sbc = foundation.bearing_capacity;
    let pu = pu.max(1e3);

    // Plan sizing from the service load plus 10% footing self-weight
    let p_service = pu / 1.5;
    let area_req = 1.1 * p_service / sbc;
    let mut side = catalog
        .round_up_footing_side(area_req.sqrt())
        .max(catalog.round_up_footing_side(column_width + 0.3))
        .min(catalog.max_footing_side);
    let mut escalations = 0usize;

    loop {
        match attempt(side, pu, p_service, sbc, column_width, fck, fy, catalog, options) {
            Ok(a) => {
                let bar = catalog.bar_diameters.first().copied().unwrap_or(12.0);
                let bar_count = (a.ast / is456::bar_area(bar)).ceil().max(4.0) as usize;
                let bar_spacing = (side * 1e3 / bar_count as f64).min(300.0);
                let overall_depth = (a.effective_depth + options.effective_cover) / 1e3;

                return DesignRecord {
                    member: node.to_string(),
                    kind: DesignKind::Footing,
                    width: side,
                    depth: overall_depth,
                    reinforcement: Reinforcement {
                        ast: a.ast,
                        asc: 0.0,
                        bar_diameter: bar,
                        bar_count,
                        bar_spacing: Some(bar_spacing),
                        stirrup_diameter: None,
                        stirrup_spacing: None,
                    },
                    governing_combo: combo.to_string(),
                    governing_check: a.governing,
                    status: DesignStatus::Pass,
                    reserve_ratio: a.reserve,
                    // Footing size has no effect on frame stiffness, so a
                    // resize never dirties the convergence loop
                    section_changed: false,
                    escalations,
                };
            }
            Err((check, reserve)) => {
                let give_up = |reason: String| DesignRecord {
                    member: node.to_string(),
                    kind: DesignKind::Footing,
                    width: side,
                    depth: 0.0,
                    reinforcement: Reinforcement::default(),
                    governing_combo: combo.to_string(),
                    governing_check: check,
                    status: DesignStatus::Fail { reason },
                    reserve_ratio: reserve,
                    section_changed: false,
                    escalations,
                };

                if escalations >= options.max_escalations {
                    return give_up(format!(
                        "underdesigned: {check:?} reserve {reserve:.2} after {escalations} escalations"
                    ));
                }
                match catalog.next_footing_side(side) {
                    Some(next) => {
                        log::debug!(
                            "{node}: footing {check:?} reserve {reserve:.2}, growing to {next:.1} m"
                        );
                        side = next;
                        escalations += 1;
                    }
                    None => {
                        return give_up("underdesigned: footing plan stock exhausted".to_string());
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn attempt(
    side: f64,
    pu: f64,
    p_service: f64,
    sbc: f64,
    column_width: f64,
    fck: f64,
    fy: f64,
    catalog: &SectionCatalog,
    options: &DesignOptions,
) -> Result<FootingAttempt, (CheckKind, f64)> {
    // Gross service pressure against the allowable
    let service_pressure = 1.1 * p_service / (side * side);
    if service_pressure > sbc {
        return Err((CheckKind::BearingPressure, sbc / service_pressure));
    }
    let bearing_reserve = sbc / service_pressure;

    // Net factored upward pressure
    let w_u = pu / (side * side);
    let c = column_width;
    let proj = ((side - c) / 2.0).max(0.05);

    // Cantilever moment at the column face, per full footing width (N·m)
    let mu_nm = w_u * side * proj * proj / 2.0;
    let mu = mu_nm * 1e3;

    let b_mm = side * 1e3;
    let c_mm = c * 1e3;

    // Depth from flexure, then stepped up until both shear checks clear
    let d_flex = (mu / (is456::mu_lim_coeff(fy) * fck * b_mm)).sqrt();
    let mut d_mm = (d_flex / 50.0).ceil() * 50.0 + 50.0;
    d_mm = d_mm.max(250.0);
    let d_max = catalog.max_depth * 1e3;

    let mut last_reserves = (0.0, 0.0);
    while d_mm <= d_max {
        let d_m = d_mm / 1e3;

        // One-way shear at d from the column face (Cl 34.2.4)
        let vu1 = (w_u * side * (proj - d_m)).max(0.0);
        let tau_v1 = vu1 / (b_mm * d_mm);
        let ast = is456::ast_singly(mu, fck, fy, b_mm, d_mm)
            .unwrap_or(0.0)
            .max(is456::ast_min_slab(b_mm, d_mm + options.effective_cover));
        let tau_c = is456::tau_c(fck, 100.0 * ast / (b_mm * d_mm));
        let one_way_reserve = if tau_v1 > 0.0 { tau_c / tau_v1 } else { f64::INFINITY };

        // Two-way punching at d/2 around the column (Cl 31.6)
        let punch_side = c + d_m;
        let vu2 = (pu - w_u * punch_side * punch_side).max(0.0);
        let perimeter = 4.0 * (c_mm + d_mm);
        let tau_v2 = vu2 / (perimeter * d_mm);
        let tau_p = is456::tau_punching(fck, 1.0);
        let punching_reserve = if tau_v2 > 0.0 { tau_p / tau_v2 } else { f64::INFINITY };

        last_reserves = (one_way_reserve, punching_reserve);
        if one_way_reserve >= 1.0 && punching_reserve >= 1.0 {
            let flexure_reserve = if mu > 0.0 {
                is456::mu_capacity(ast, fck, fy, b_mm, d_mm) / mu
            } else {
                f64::INFINITY
            };

            let mut governing = (CheckKind::BearingPressure, bearing_reserve);
            for candidate in [
                (CheckKind::Flexure, flexure_reserve),
                (CheckKind::OneWayShear, one_way_reserve),
                (CheckKind::PunchingShear, punching_reserve),
            ] {
                if candidate.1 < governing.1 {
                    governing = candidate;
                }
            }

            return Ok(FootingAttempt {
                effective_depth: d_mm,
                ast,
                reserve: governing.1,
                governing: governing.0,
            });
        }

        d_mm += 50.0;
    }

    // Depth stock exhausted: report the worse of the two shear checks
    if last_reserves.0 < last_reserves.1 {
        Err((CheckKind::OneWayShear, last_reserves.0))
    } else {
        Err((CheckKind::PunchingShear, last_reserves.1))
    }
}
