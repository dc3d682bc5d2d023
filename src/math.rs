//! Matrix utilities for frame analysis
//!
//! Local element stiffness, the PyNite-convention transformation to global
//! axes, fixed-end reactions for member loads, triplet-based assembly, and a
//! residual-checked linear solve.

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector, Vector3};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

pub type Mat = DMatrix<f64>;
pub type Vector = DVector<f64>;
pub type Mat3 = Matrix3<f64>;

/// 12x12 matrix for element stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for element end forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Compute the 3x3 direction cosine matrix for a frame element.
///
/// Rows are the element's local x, y, z axes in global coordinates,
/// following the PyNite convention:
/// - vertical elements: local y lies in the global XY plane, local z = global Z
/// - horizontal elements: local y = global Y (up), local z = x cross y
/// - inclined elements: local z is horizontal and perpendicular to the axis
pub fn rotation_matrix(i_node: &[f64; 3], j_node: &[f64; 3], roll: f64) -> Mat3 {
    let pi = Vector3::from_column_slice(i_node);
    let pj = Vector3::from_column_slice(j_node);
    let d = pj - pi;
    let length = d.norm();
    debug_assert!(length > 1e-10, "zero length element");
    let x = d / length;

    let (y, z) = if x[0].abs() < 1e-10 && x[2].abs() < 1e-10 {
        // Vertical: pointing up gets y = -X so column bending stays in XY
        let y = if x[1] > 0.0 {
            Vector3::new(-1.0, 0.0, 0.0)
        } else {
            Vector3::new(1.0, 0.0, 0.0)
        };
        (y, Vector3::z())
    } else if d[1].abs() < 1e-10 {
        // Horizontal
        let y = Vector3::y();
        (y, x.cross(&y).normalize())
    } else {
        // Inclined: z horizontal, perpendicular to the member axis
        let proj = Vector3::new(d[0], 0.0, d[2]);
        let z = if x[1] > 0.0 { proj.cross(&x) } else { x.cross(&proj) }.normalize();
        let y = z.cross(&x).normalize();
        (y, z)
    };

    let (y, z) = if roll.abs() > 1e-10 {
        let (s, c) = roll.sin_cos();
        (y * c + z * s, z * c - y * s)
    } else {
        (y, z)
    };

    Mat3::from_rows(&[x.transpose(), y.transpose(), z.transpose()])
}

/// Expand a 3x3 rotation matrix into the 12x12 element transformation matrix
/// (four identical diagonal blocks)
pub fn transformation_matrix(r: &Mat3) -> Mat12 {
    let mut t = Mat12::zeros();
    for block in 0..4 {
        let offset = block * 3;
        for row in 0..3 {
            for col in 0..3 {
                t[(offset + row, offset + col)] = r[(row, col)];
            }
        }
    }
    t
}

/// Compute the local stiffness matrix for a 3D frame element
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `g` - Shear modulus
/// * `a` - Cross-sectional area
/// * `iy` - Moment of inertia about local y-axis
/// * `iz` - Moment of inertia about local z-axis
/// * `j` - Torsional constant
/// * `length` - Element length
pub fn local_stiffness(e: f64, g: f64, a: f64, iy: f64, iz: f64, j: f64, length: f64) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let gj_l = g * j / l;

    let eiy_l3 = e * iy / l3;
    let eiy_l2 = e * iy / l2;
    let eiy_l = e * iy / l;

    let eiz_l3 = e * iz / l3;
    let eiz_l2 = e * iz / l2;
    let eiz_l = e * iz / l;

    #[rustfmt::skip]
    let data = [
        // Row 0: axial at i
        ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,          -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 1: shear Fy at i
        0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           6.0*eiz_l2,   0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           6.0*eiz_l2,
        // Row 2: shear Fz at i
        0.0,       0.0,          12.0*eiy_l3,   0.0,    -6.0*eiy_l2,   0.0,          0.0,       0.0,          -12.0*eiy_l3,  0.0,    -6.0*eiy_l2,   0.0,
        // Row 3: torsion at i
        0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,          0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,
        // Row 4: moment My at i
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    4.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    2.0*eiy_l,     0.0,
        // Row 5: moment Mz at i
        0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           4.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           2.0*eiz_l,
        // Row 6: axial at j
        -ea_l,     0.0,          0.0,           0.0,    0.0,           0.0,          ea_l,      0.0,          0.0,           0.0,    0.0,           0.0,
        // Row 7: shear Fy at j
        0.0,       -12.0*eiz_l3, 0.0,           0.0,    0.0,           -6.0*eiz_l2,  0.0,       12.0*eiz_l3,  0.0,           0.0,    0.0,           -6.0*eiz_l2,
        // Row 8: shear Fz at j
        0.0,       0.0,          -12.0*eiy_l3,  0.0,    6.0*eiy_l2,    0.0,          0.0,       0.0,          12.0*eiy_l3,   0.0,    6.0*eiy_l2,    0.0,
        // Row 9: torsion at j
        0.0,       0.0,          0.0,           -gj_l,  0.0,           0.0,          0.0,       0.0,          0.0,           gj_l,   0.0,           0.0,
        // Row 10: moment My at j
        0.0,       0.0,          -6.0*eiy_l2,   0.0,    2.0*eiy_l,     0.0,          0.0,       0.0,          6.0*eiy_l2,    0.0,    4.0*eiy_l,     0.0,
        // Row 11: moment Mz at j
        0.0,       6.0*eiz_l2,   0.0,           0.0,    0.0,           2.0*eiz_l,    0.0,       -6.0*eiz_l2,  0.0,           0.0,    0.0,           4.0*eiz_l,
    ];

    Mat12::from_row_slice(&data)
}

/// Fixed end reactions for a full-length uniform load given in local
/// components (N/m along local x, y, z)
pub fn fer_uniform(w_local: &Vector3<f64>, length: f64) -> Vec12 {
    let l = length;
    let l2 = l * l;
    let (wx, wy, wz) = (w_local[0], w_local[1], w_local[2]);

    let mut fer = Vec12::zeros();

    // Axial
    fer[0] += -wx * l / 2.0;
    fer[6] += -wx * l / 2.0;

    // Local y
    fer[1] += -wy * l / 2.0;
    fer[5] += -wy * l2 / 12.0;
    fer[7] += -wy * l / 2.0;
    fer[11] += wy * l2 / 12.0;

    // Local z
    fer[2] += -wz * l / 2.0;
    fer[4] += wz * l2 / 12.0;
    fer[8] += -wz * l / 2.0;
    fer[10] += -wz * l2 / 12.0;

    fer
}

/// Fixed end reactions for a point load given in local components, applied
/// at distance `a` from the i-node
pub fn fer_point(p_local: &Vector3<f64>, a: f64, length: f64) -> Vec12 {
    let l = length;
    let b = l - a;
    let l2 = l * l;
    let l3 = l2 * l;
    let (px, py, pz) = (p_local[0], p_local[1], p_local[2]);

    let mut fer = Vec12::zeros();

    // Axial
    fer[0] += -px * b / l;
    fer[6] += -px * a / l;

    // Local y
    fer[1] += -py * b * b * (3.0 * a + b) / l3;
    fer[5] += -py * a * b * b / l2;
    fer[7] += -py * a * a * (a + 3.0 * b) / l3;
    fer[11] += py * a * a * b / l2;

    // Local z
    fer[2] += -pz * b * b * (3.0 * a + b) / l3;
    fer[4] += pz * a * b * b / l2;
    fer[8] += -pz * a * a * (a + 3.0 * b) / l3;
    fer[10] += -pz * a * a * b / l2;

    fer
}

/// Triplet-based global stiffness assembler.
///
/// Entries accumulate in COO form during element assembly; the CSR view is
/// used for the residual matvec and the dense view for the factorization.
pub struct StiffnessBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl StiffnessBuilder {
    /// Create a builder for an `size` x `size` system
    pub fn new(size: usize) -> Self {
        Self {
            size,
            // ~72 nonzeros per frame DOF is typical connectivity
            entries: Vec::with_capacity(size * 72),
        }
    }

    /// Accumulate a single entry
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value.abs() > 1e-15 {
            self.entries.push((row, col, value));
        }
    }

    /// Accumulate a 12x12 element matrix at the given global DOF indices
    pub fn add_element(&mut self, dofs: &[usize; 12], k: &Mat12) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, k[(i, j)]);
            }
        }
    }

    /// CSR view for sparse matvec
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);
        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }
        CsrMatrix::from(&coo)
    }

    /// Dense view for factorization
    pub fn to_dense(&self) -> Mat {
        let mut mat = Mat::zeros(self.size, self.size);
        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }
        mat
    }
}

/// Sparse matrix-vector product y = A x
pub fn sparse_matvec(csr: &CsrMatrix<f64>, x: &Vector) -> Vector {
    let mut y = Vector::zeros(csr.nrows());
    for (row, lane) in csr.row_iter().enumerate() {
        let mut sum = 0.0;
        for (&col, &val) in lane.col_indices().iter().zip(lane.values()) {
            sum += val * x[col];
        }
        y[row] = sum;
    }
    y
}

/// Why a checked solve failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveFailure {
    /// The system is singular; `weak_dof` is the index of the smallest
    /// diagonal entry, the best candidate for the unrestrained DOF
    Singular { weak_dof: usize },
    /// Both the plain and refined factorizations left a residual above
    /// tolerance
    Residual { residual: f64 },
}

/// Solve K d = p with a residual check.
///
/// Solves by LU, verifies the relative residual ||K d - p|| / ||p|| against
/// `tol` with a sparse matvec, and retries once with full-pivot LU when the
/// first factorization is singular or leaves too large a residual.
pub fn solve_checked(
    k: &Mat,
    k_csr: &CsrMatrix<f64>,
    p: &Vector,
    tol: f64,
) -> Result<Vector, SolveFailure> {
    let weak_dof = || -> usize {
        let mut idx = 0;
        let mut min = f64::INFINITY;
        for i in 0..k.nrows() {
            let d = k[(i, i)].abs();
            if d < min {
                min = d;
                idx = i;
            }
        }
        idx
    };

    let residual_of = |d: &Vector| -> f64 {
        let r = sparse_matvec(k_csr, d) - p;
        r.norm() / p.norm().max(1e-12)
    };

    if let Some(d) = k.clone().lu().solve(p) {
        let res = residual_of(&d);
        if res <= tol {
            return Ok(d);
        }
        log::warn!("solver residual {res:.3e} above tolerance, retrying with full pivoting");
    }

    let refined = k.clone().full_piv_lu();

    // Pivot ratio distinguishes a rank-deficient (unstable) system from an
    // ill-conditioned but solvable one
    let pivots = refined.u().diagonal();
    let max_pivot = pivots.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let min_pivot = pivots.iter().fold(f64::INFINITY, |m, v| m.min(v.abs()));
    if max_pivot == 0.0 || min_pivot <= max_pivot * 1e-12 {
        return Err(SolveFailure::Singular { weak_dof: weak_dof() });
    }

    match refined.solve(p) {
        Some(d) => {
            let res = residual_of(&d);
            if res <= tol {
                Ok(d)
            } else {
                Err(SolveFailure::Residual { residual: res })
            }
        }
        None => Err(SolveFailure::Singular { weak_dof: weak_dof() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_horizontal() {
        let r = rotation_matrix(&[0.0, 0.0, 0.0], &[10.0, 0.0, 0.0], 0.0);
        // local x = global X, local y = global Y, local z = global Z
        assert_relative_eq!(r[(0, 0)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(r[(1, 1)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(r[(2, 2)], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_rotation_vertical() {
        let r = rotation_matrix(&[0.0, 0.0, 0.0], &[0.0, 3.0, 0.0], 0.0);
        // local x = global Y, local y = -global X, local z = global Z
        assert_relative_eq!(r[(0, 1)], 1.0, epsilon = 1e-10);
        assert_relative_eq!(r[(1, 0)], -1.0, epsilon = 1e-10);
        assert_relative_eq!(r[(2, 2)], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        let r = rotation_matrix(&[0.0, 0.0, 0.0], &[3.0, 4.0, 5.0], 0.3);
        let should_be_identity = r * r.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(should_be_identity[(i, j)], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_local_stiffness_symmetry() {
        let k = local_stiffness(25e9, 10.4e9, 0.1035, 4.56e-4, 1.75e-3, 1.1e-3, 4.5);
        for i in 0..12 {
            for j in 0..12 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_fer_uniform_totals() {
        let l = 6.0;
        let w = Vector3::new(0.0, -10e3, 0.0);
        let fer = fer_uniform(&w, l);
        // End shears carry half the total load each
        assert_relative_eq!(fer[1], 30e3, epsilon = 1e-9);
        assert_relative_eq!(fer[7], 30e3, epsilon = 1e-9);
        // End moments wl^2/12, opposite signs
        assert_relative_eq!(fer[5], 30e3, epsilon = 1e-9);
        assert_relative_eq!(fer[11], -30e3, epsilon = 1e-9);
    }

    #[test]
    fn test_solve_checked_simple() {
        let mut builder = StiffnessBuilder::new(2);
        builder.add(0, 0, 4.0);
        builder.add(0, 1, 1.0);
        builder.add(1, 0, 1.0);
        builder.add(1, 1, 3.0);
        let k = builder.to_dense();
        let csr = builder.to_csr();
        let p = Vector::from_vec(vec![1.0, 2.0]);

        let d = solve_checked(&k, &csr, &p, 1e-6).unwrap();
        assert_relative_eq!(4.0 * d[0] + d[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(d[0] + 3.0 * d[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_checked_singular() {
        let mut builder = StiffnessBuilder::new(2);
        builder.add(0, 0, 1.0);
        // Row 1 left empty: unrestrained DOF
        let k = builder.to_dense();
        let csr = builder.to_csr();
        let p = Vector::from_vec(vec![1.0, 1.0]);

        match solve_checked(&k, &csr, &p, 1e-6) {
            Err(SolveFailure::Singular { weak_dof }) => assert_eq!(weak_dof, 1),
            other => panic!("expected singular failure, got {other:?}"),
        }
    }
}
