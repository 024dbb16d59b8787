//! Polynomial helpers
//!
//! Coefficients are always ordered from the highest degree down, so
//! `[a, b, c]` is `a x² + b x + c`.

use nalgebra::linalg::Schur;
use nalgebra::{Complex, DMatrix};

pub type C64 = Complex<f64>;

/// Newton steps applied to companion-matrix eigenvalues
const POLISH_STEPS: usize = 4;

/// Eigenvalue iteration cap for the Schur decomposition
const SCHUR_MAX_ITER: usize = 10_000;

pub const ZERO: C64 = C64 { re: 0.0, im: 0.0 };

#[inline]
pub fn real(x: f64) -> C64 {
    C64::new(x, 0.0)
}

/// Horner evaluation at a complex point
pub fn eval(coeffs: &[f64], x: C64) -> C64 {
    coeffs.iter().fold(ZERO, |acc, &k| acc * x + k)
}

/// Value and first derivative at a complex point
fn eval_with_derivative(coeffs: &[f64], x: C64) -> (C64, C64) {
    let mut p = ZERO;
    let mut dp = ZERO;
    for &k in coeffs {
        dp = dp * x + p;
        p = p * x + k;
    }
    (p, dp)
}

/// Residual of `x` relative to the magnitude of the terms summed to get it.
///
/// Roughly the backward error: how much the coefficients would have to move for `x` to
/// be an exact root. Non-finite inputs give NaN, which fails every `<=` check.
pub fn backward_error(coeffs: &[f64], x: C64) -> f64 {
    let r = x.norm();
    let scale = coeffs.iter().fold(0.0, |acc, &k| acc * r + k.abs());
    if scale == 0.0 {
        return 0.0;
    }
    eval(coeffs, x).norm() / scale
}

/// Roots of `a x² + b x + c` with complex coefficients, `a != 0`.
///
/// Uses the cancellation-free form: the larger-magnitude root comes from `-(b ± √Δ)/2`,
/// the other from Vieta.
pub fn quadratic(a: C64, b: C64, c: C64) -> [C64; 2] {
    let disc = (b * b - a * c * 4.0).sqrt();
    let sign = if (b.conj() * disc).re >= 0.0 { 1.0 } else { -1.0 };
    let q = (b + disc * sign) * -0.5;
    if q == ZERO {
        return [ZERO, ZERO];
    }
    [q / a, c / q]
}

/// Roots of `a x³ + b x² + c x + d` with complex coefficients, `a != 0` (Cardano).
pub fn cubic(a: C64, b: C64, c: C64, d: C64) -> [C64; 3] {
    let (b, c, d) = (b / a, c / a, d / a);
    let p = c - b * b / 3.0;
    let q = b * b * b * (2.0 / 27.0) - b * c / 3.0 + d;
    let shift = -b / 3.0;

    if p == ZERO && q == ZERO {
        return [shift; 3];
    }

    let s = (q * q / 4.0 + p * p * p / 27.0).sqrt();
    let plus = -q / 2.0 + s;
    let minus = -q / 2.0 - s;
    let u = if minus.norm() > plus.norm() { minus } else { plus }.cbrt();

    let w = C64::new(-0.5, 3f64.sqrt() / 2.0);
    let turns = [real(1.0), w, w * w];
    turns.map(|turn| {
        let uk = u * turn;
        let vk = if uk == ZERO { ZERO } else { -p / (uk * 3.0) };
        uk + vk + shift
    })
}

/// Roots of a real polynomial of any degree from the eigenvalues of its companion matrix.
///
/// Leading zero coefficients are dropped first. Each eigenvalue gets a few Newton steps
/// against the original coefficients, kept only while the residual improves.
pub fn companion_roots(coeffs: &[f64]) -> Vec<C64> {
    let Some(lead) = coeffs.iter().position(|&k| k != 0.0) else {
        return Vec::new();
    };
    let coeffs = &coeffs[lead..];
    let n = coeffs.len() - 1;
    if n == 0 {
        return Vec::new();
    }

    let mut m = DMatrix::<f64>::zeros(n, n);
    for j in 0..n {
        m[(0, j)] = -coeffs[j + 1] / coeffs[0];
    }
    for i in 1..n {
        m[(i, i - 1)] = 1.0;
    }

    let Some(schur) = Schur::try_new(m, f64::EPSILON, SCHUR_MAX_ITER) else {
        log::trace!("companion matrix eigenvalues did not converge for {coeffs:?}");
        return Vec::new();
    };

    schur
        .complex_eigenvalues()
        .iter()
        .map(|&z| polish(coeffs, z))
        .collect()
}

fn polish(coeffs: &[f64], mut x: C64) -> C64 {
    let mut err = backward_error(coeffs, x);
    for _ in 0..POLISH_STEPS {
        let (p, dp) = eval_with_derivative(coeffs, x);
        if dp == ZERO {
            break;
        }
        let next = x - p / dp;
        let next_err = backward_error(coeffs, next);
        if !(next_err < err) {
            break;
        }
        x = next;
        err = next_err;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_re(mut roots: Vec<C64>) -> Vec<f64> {
        roots.sort_by(|a, b| a.re.total_cmp(&b.re));
        roots.iter().map(|z| z.re).collect()
    }

    #[test]
    fn test_quadratic_real_roots() {
        let [x1, x2] = quadratic(real(1.0), real(-3.0), real(2.0));
        let got = sorted_re(vec![x1, x2]);
        assert!((got[0] - 1.0).abs() < 1e-14);
        assert!((got[1] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_quadratic_zero_constant() {
        let [x1, x2] = quadratic(real(1.0), real(0.0), real(0.0));
        assert_eq!(x1, ZERO);
        assert_eq!(x2, ZERO);
    }

    #[test]
    fn test_quadratic_complex_pair() {
        let [x1, x2] = quadratic(real(1.0), real(0.0), real(4.0));
        assert!((x1.im.abs() - 2.0).abs() < 1e-14);
        assert!((x1 + x2).norm() < 1e-14);
    }

    #[test]
    fn test_cubic_three_real_roots() {
        // (x - 1)(x - 2)(x - 3)
        let roots = cubic(real(1.0), real(-6.0), real(11.0), real(-6.0));
        for z in roots {
            assert!(z.im.abs() < 1e-9);
        }
        let got = sorted_re(roots.to_vec());
        for (g, want) in got.iter().zip([1.0, 2.0, 3.0]) {
            assert!((g - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cubic_triple_root() {
        // (x + 2)^3
        let roots = cubic(real(1.0), real(6.0), real(12.0), real(8.0));
        for z in roots {
            assert!((z - real(-2.0)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_companion_roots_quartic() {
        // (x - 0.5)(x - 1)(x + 2)(x - 4)
        let coeffs = [1.0, -3.5, -4.5, 13.0, -4.0];
        let got = sorted_re(companion_roots(&coeffs));
        assert_eq!(got.len(), 4);
        for (g, want) in got.iter().zip([-2.0, 0.5, 1.0, 4.0]) {
            assert!((g - want).abs() < 1e-10, "{g} vs {want}");
        }
    }

    #[test]
    fn test_companion_roots_drops_leading_zeros() {
        let got = sorted_re(companion_roots(&[0.0, 0.0, 2.0, -2.0]));
        assert_eq!(got, vec![1.0]);
    }

    #[test]
    fn test_backward_error_exact_root() {
        assert_eq!(backward_error(&[1.0, -3.0, 2.0], real(2.0)), 0.0);
        assert!(backward_error(&[1.0, -3.0, 2.0], real(2.5)) > 0.01);
    }
}
