//! Root-finding entry points used by event detection
//!
//! - `QuarticSolver` selects how a row of coefficients is solved
//! - `min_real_root` reduces a batch of rows to the earliest admissible root
//! - `solve_transcendental` is a bounded bisection for equations without a closed form

use serde::{Deserialize, Serialize};

use super::poly::{self, C64, real};
use super::quartic;
use crate::consts::{BISECTION_ITERATIONS, IMAG_TOL, ROOT_TOL};
use crate::error::SimError;

/// Root-finding strategy for degree ≤ 4 polynomials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuarticSolver {
    /// Companion-matrix eigenvalues for every row
    Numeric,
    /// Closed forms where the row reduces, analytic quartic otherwise
    #[default]
    Hybrid,
}

impl QuarticSolver {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuarticSolver::Numeric => "numeric",
            QuarticSolver::Hybrid => "hybrid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "numeric" => Some(QuarticSolver::Numeric),
            "hybrid" => Some(QuarticSolver::Hybrid),
            _ => None,
        }
    }
}

/// All roots of a polynomial (highest degree first). Non-finite input has no roots.
pub fn roots(coeffs: &[f64], solver: QuarticSolver) -> Vec<C64> {
    if !coeffs.iter().all(|k| k.is_finite()) {
        return Vec::new();
    }
    match solver {
        QuarticSolver::Numeric => poly::companion_roots(coeffs),
        QuarticSolver::Hybrid => hybrid(coeffs),
    }
}

fn hybrid(coeffs: &[f64]) -> Vec<C64> {
    let Some(lead) = coeffs.iter().position(|&k| k != 0.0) else {
        return Vec::new();
    };
    let mut coeffs = &coeffs[lead..];

    // Every vanishing trailing coefficient is a root at zero
    let mut out = Vec::with_capacity(4);
    while coeffs.len() > 1 && coeffs[coeffs.len() - 1] == 0.0 {
        out.push(poly::ZERO);
        coeffs = &coeffs[..coeffs.len() - 1];
    }

    match *coeffs {
        [_] => {}
        [a, b] => out.push(real(-b / a)),
        [a, b, c] => out.extend(poly::quadratic(real(a), real(b), real(c))),
        [a, b, c, d] => out.extend(poly::cubic(real(a), real(b), real(c), real(d))),
        [a, b, c, d, e] => out.extend(quartic::solve(a, b, c, d, e)),
        _ => out.extend(poly::companion_roots(coeffs)),
    }
    out
}

/// Whether a root is a real time strictly in the future
#[inline]
pub fn is_admissible(z: C64) -> bool {
    z.re.is_finite() && z.im.abs() <= IMAG_TOL * z.re.abs().max(1.0) && z.re > ROOT_TOL
}

/// Smallest admissible root of one row, or +∞
pub fn min_positive_root(coeffs: &[f64], solver: QuarticSolver) -> f64 {
    roots(coeffs, solver)
        .into_iter()
        .filter(|&z| is_admissible(z))
        .map(|z| z.re)
        .fold(f64::INFINITY, f64::min)
}

/// Smallest admissible root of each row
pub fn min_real_roots(rows: &[[f64; 5]], solver: QuarticSolver) -> Vec<f64> {
    rows.iter().map(|row| min_positive_root(row, solver)).collect()
}

/// Earliest admissible root over a batch and the index of the row it came from.
///
/// Returns `(f64::INFINITY, 0)` when no row has one. Ties go to the lowest index.
pub fn min_real_root(rows: &[[f64; 5]], solver: QuarticSolver) -> (f64, usize) {
    min_real_roots(rows, solver)
        .into_iter()
        .enumerate()
        .fold((f64::INFINITY, 0), |best, (i, t)| if t < best.0 { (t, i) } else { best })
}

/// Root of `f` in `[lo, hi]` by bisection.
///
/// `f(lo)` and `f(hi)` must differ in sign (or one of them be zero). Stops when the
/// bracket is narrower than `tol` or after a fixed number of halvings.
pub fn solve_transcendental<F>(f: F, mut lo: f64, mut hi: f64, tol: f64) -> Result<f64, SimError>
where
    F: Fn(f64) -> f64,
{
    let mut f_lo = f(lo);
    let f_hi = f(hi);
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if !f_lo.is_finite() || !f_hi.is_finite() || f_lo.signum() == f_hi.signum() {
        return Err(SimError::NoSolution(format!(
            "f({lo}) = {f_lo} and f({hi}) = {f_hi} do not bracket a root"
        )));
    }

    for _ in 0..BISECTION_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if hi - lo <= tol {
            return Ok(mid);
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}
