//! Closed-form quartic solver
//!
//! Ferrari's method in complex arithmetic, with two safeguards:
//! - the better-conditioned of `p(x)` and its reversal `x⁴ p(1/x)` is solved first
//! - every root is checked against the original coefficients; if neither ordering
//!   produces genuine roots the companion matrix is used instead

use super::poly::{self, C64, ZERO, real};

/// Largest accepted backward error of an analytic root
const MAX_BACKWARD_ERROR: f64 = 1e-8;

/// Roots of `a x⁴ + b x³ + c x² + d x + e`.
///
/// A constant term of exactly zero is the contact configuration (the two bodies touch
/// at `t = 0`); it is reported as four zero roots so that it never yields a future
/// event. With `a == 0` the missing roots are reported at infinity.
pub fn solve(a: f64, b: f64, c: f64, d: f64, e: f64) -> [C64; 4] {
    if e == 0.0 {
        return [ZERO; 4];
    }
    let p = [a, b, c, d, e];
    if a == 0.0 || !p.iter().all(|k| k.is_finite()) {
        return pad(poly::companion_roots(&p));
    }

    let rev = [e, d, c, b, a];
    let reverse_first = instability(e, d) < instability(a, b);

    for reversed in [reverse_first, !reverse_first] {
        let roots = if reversed {
            ferrari(&rev).map(|z| z.inv())
        } else {
            ferrari(&p)
        };
        if roots
            .iter()
            .all(|&z| poly::backward_error(&p, z) <= MAX_BACKWARD_ERROR)
        {
            return roots;
        }
    }

    log::trace!("analytic quartic rejected, falling back to companion matrix: {p:?}");
    pad(poly::companion_roots(&p))
}

/// How badly the leading pair of coefficients is scaled; 0 is best
#[inline]
fn instability(a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }
    let t = (a / b).abs();
    t + 1.0 / t
}

fn pad(roots: Vec<C64>) -> [C64; 4] {
    let mut out = [real(f64::INFINITY); 4];
    for (slot, z) in out.iter_mut().zip(roots) {
        *slot = z;
    }
    out
}

/// Ferrari's method for a quartic with a nonzero leading coefficient.
///
/// The quartic is depressed to `y⁴ + p y² + q y + r` and split into two quadratics
/// through the largest root of the resolvent cubic.
pub fn ferrari(coeffs: &[f64; 5]) -> [C64; 4] {
    let [a, b, c, d, e] = *coeffs;
    let (b, c, d, e) = (b / a, c / a, d / a, e / a);

    let s = b / 4.0;
    let p = c - 6.0 * s * s;
    let q = d - 2.0 * c * s + 8.0 * s * s * s;
    let r = e - d * s + c * s * s - 3.0 * s * s * s * s;

    let biquadratic = q.abs() < 1e-14 * p.abs().max(r.abs()).max(1.0);
    let m = if biquadratic {
        ZERO
    } else {
        let resolvent = poly::cubic(real(1.0), real(p), real(p * p / 4.0 - r), real(-q * q / 8.0));
        resolvent
            .into_iter()
            .fold(ZERO, |best, z| if z.norm() > best.norm() { z } else { best })
    };

    let roots = if m == ZERO {
        // y⁴ + p y² + r = 0 as a quadratic in y²
        let [z1, z2] = poly::quadratic(real(1.0), real(p), real(r));
        let (y1, y2) = (z1.sqrt(), z2.sqrt());
        [y1, -y1, y2, -y2]
    } else {
        let k = (m * 2.0).sqrt();
        let shift = m + p / 2.0;
        let half_q = q / (k * 2.0);
        let [y1, y2] = poly::quadratic(real(1.0), k, shift - half_q);
        let [y3, y4] = poly::quadratic(real(1.0), -k, shift + half_q);
        [y1, y2, y3, y4]
    };

    roots.map(|y| y - s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE_1: [f64; 5] = [
        0.9604000000000001,
        -22.342459712735774,
        131.1430067191817,
        -13.968966072700297,
        0.37215503307938314,
    ];

    #[test]
    fn test_e_equals_0() {
        let [a, b, c, d, _] = CASE_1;
        let roots = solve(a, b, c, d, 0.0);
        assert_eq!(roots, [C64::new(0.0, 0.0); 4]);
    }

    #[test]
    fn test_ferrari_case_1() {
        let mut re: Vec<f64> = ferrari(&CASE_1).iter().map(|z| z.re).collect();
        re.sort_by(f64::total_cmp);
        let expected = [0.048943195217641386, 0.05906413668, 11.5727870, 11.5829080];
        for (got, want) in re.iter().zip(expected) {
            assert!((got - want).abs() / want < 1e-6, "{got} vs {want}");
        }
    }

    #[test]
    fn test_solve_validates_roots() {
        for z in solve(CASE_1[0], CASE_1[1], CASE_1[2], CASE_1[3], CASE_1[4]) {
            assert!(poly::backward_error(&CASE_1, z) <= MAX_BACKWARD_ERROR);
        }
    }

    #[test]
    fn test_biquadratic() {
        // (x² - 1)(x² - 4)
        let mut re: Vec<f64> = solve(1.0, 0.0, -5.0, 0.0, 4.0).iter().map(|z| z.re).collect();
        re.sort_by(f64::total_cmp);
        for (got, want) in re.iter().zip([-2.0, -1.0, 1.0, 2.0]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_badly_scaled_leading_coefficient() {
        // 1e-9 (x - 1e3)(x - 1)(x - 2)(x - 3): one root far away
        let a = 1e-9;
        let coeffs = [a, -a * 1006.0, a * 6011.0, -a * 11006.0, a * 6000.0];
        let roots = solve(coeffs[0], coeffs[1], coeffs[2], coeffs[3], coeffs[4]);
        let mut re: Vec<f64> = roots.iter().map(|z| z.re).collect();
        re.sort_by(f64::total_cmp);
        for (got, want) in re.iter().zip([1.0, 2.0, 3.0, 1000.0]) {
            assert!((got - want).abs() / want < 1e-6, "{got} vs {want}");
        }
    }

    #[test]
    fn test_zero_leading_coefficient_pads_with_infinity() {
        let roots = solve(0.0, 1.0, -6.0, 11.0, -6.0);
        let finite = roots.iter().filter(|z| z.re.is_finite()).count();
        assert_eq!(finite, 3);
    }
}
