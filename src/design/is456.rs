//! IS 456:2000 limit-state equations shared by the member designers
//!
//! All functions work in N and mm (stresses in N/mm²), the units the code
//! tables are written in.

use std::f64::consts::PI;

/// Limiting neutral axis depth ratio xu,max/d (Cl 38.1)
pub fn xu_max_ratio(fy: f64) -> f64 {
    if fy <= 250.0 {
        0.53
    } else if fy <= 415.0 {
        0.48
    } else {
        0.46
    }
}

/// Coefficient k in Mu,lim = k·fck·b·d² (Annex G-1.1)
///
/// Evaluates to 0.148 / 0.138 / 0.133 for Fe250 / Fe415 / Fe500.
pub fn mu_lim_coeff(fy: f64) -> f64 {
    let ku = xu_max_ratio(fy);
    0.36 * ku * (1.0 - 0.42 * ku)
}

/// Limiting moment of resistance of a singly reinforced section (N·mm)
pub fn mu_lim(fck: f64, fy: f64, b: f64, d: f64) -> f64 {
    mu_lim_coeff(fy) * fck * b * d * d
}

/// Tension steel area for a singly reinforced section (Annex G-1.1 b), mm².
///
/// Returns `None` when the demand exceeds what a singly reinforced section
/// of these dimensions can carry.
pub fn ast_singly(mu: f64, fck: f64, fy: f64, b: f64, d: f64) -> Option<f64> {
    let disc = 1.0 - 4.6 * mu / (fck * b * d * d);
    if disc < 0.0 {
        return None;
    }
    Some(0.5 * fck / fy * (1.0 - disc.sqrt()) * b * d)
}

/// Moment capacity of a singly reinforced section with the given tension
/// steel (Annex G-1.1 b rearranged), N·mm
pub fn mu_capacity(ast: f64, fck: f64, fy: f64, b: f64, d: f64) -> f64 {
    0.87 * fy * ast * d * (1.0 - ast * fy / (b * d * fck))
}

/// Minimum tension steel in a beam, As = 0.85·b·d/fy (Cl 26.5.1.1 a)
pub fn ast_min_beam(b: f64, d: f64, fy: f64) -> f64 {
    0.85 * b * d / fy
}

/// Maximum tension or compression steel in a beam, 4% of gross (Cl 26.5.1.1 b)
pub fn ast_max(b: f64, depth_total: f64) -> f64 {
    0.04 * b * depth_total
}

/// Minimum slab/footing steel, 0.12% of gross for deformed bars (Cl 26.5.2.1)
pub fn ast_min_slab(b: f64, depth_total: f64) -> f64 {
    0.0012 * b * depth_total
}

/// Design shear strength of concrete τc (Table 19 closed form), N/mm².
///
/// `pt` is the tension steel percentage 100·Ast/(b·d), clamped to the
/// table's 0.15-3.0 range.
pub fn tau_c(fck: f64, pt: f64) -> f64 {
    let pt = pt.clamp(0.15, 3.0);
    let beta = (0.8 * fck / (6.89 * pt)).max(1.0);
    0.85 * (0.8 * fck).sqrt() * ((1.0 + 5.0 * beta).sqrt() - 1.0) / (6.0 * beta)
}

/// Maximum shear stress with shear reinforcement τc,max (Table 20), N/mm²
pub fn tau_c_max(fck: f64) -> f64 {
    0.62 * fck.sqrt()
}

/// Permissible punching shear stress ks·0.25·√fck (Cl 31.6.3), N/mm².
///
/// `beta_c` is the column aspect ratio (short/long side).
pub fn tau_punching(fck: f64, beta_c: f64) -> f64 {
    let ks = (0.5 + beta_c).min(1.0);
    ks * 0.25 * fck.sqrt()
}

/// Minimum design eccentricity e = l/500 + D/30, not less than 20 mm (Cl 25.4)
pub fn min_eccentricity(unsupported_length: f64, lateral_dimension: f64) -> f64 {
    (unsupported_length / 500.0 + lateral_dimension / 30.0).max(20.0)
}

/// Additional moment on a slender column, Ma = Pu·D·(le/D)²/2000 (Cl 39.7.1),
/// N·mm
pub fn additional_moment(pu: f64, lateral_dimension: f64, effective_length: f64) -> f64 {
    let ratio = effective_length / lateral_dimension;
    pu * lateral_dimension * ratio * ratio / 2000.0
}

/// Cross-sectional area of one bar (mm²)
pub fn bar_area(diameter: f64) -> f64 {
    PI / 4.0 * diameter * diameter
}
