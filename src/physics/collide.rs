//! Time-to-collision polynomials
//!
//! While a ball slides or rolls its center follows `r(t) = a t² + b t + c` with
//! `a = -½ μ g û` (û the direction friction opposes). Distance conditions between such
//! parabolas and fixed circles or lines are polynomials in `t` of degree ≤ 4, which
//! `math::roots` solves.

use glam::{DVec2, DVec3};

use super::motion::friction_direction;
use crate::math::{self, QuarticSolver};
use crate::objects::{BallParams, BallState, LinearCushionSegment, Phase};

/// `r(t) = a t² + b t + c`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trajectory {
    pub a: DVec3,
    pub b: DVec3,
    pub c: DVec3,
}

impl Trajectory {
    pub fn of(state: &BallState, params: &BallParams) -> Self {
        let mu = match state.phase {
            Phase::Sliding => params.u_s,
            Phase::Rolling => params.u_r,
            _ => return Self { a: DVec3::ZERO, b: DVec3::ZERO, c: state.r },
        };
        let u = friction_direction(state, params);
        Self { a: -0.5 * mu * params.g * u, b: state.v, c: state.r }
    }

    #[inline]
    pub fn at(&self, t: f64) -> DVec3 {
        self.a * t * t + self.b * t + self.c
    }
}

/// Quartic whose roots are the times `|xy(t)| = radius` for a planar parabola
/// `xy(t) = a t² + b t + c`
fn circle_quartic(a: DVec2, b: DVec2, c: DVec2, radius: f64) -> [f64; 5] {
    [
        a.dot(a),
        2.0 * a.dot(b),
        b.dot(b) + 2.0 * a.dot(c),
        2.0 * b.dot(c),
        c.dot(c) - radius * radius,
    ]
}

/// Coefficients for two balls touching: center distance equal to the sum of radii
pub fn ball_ball_coeffs(
    s1: &BallState,
    p1: &BallParams,
    s2: &BallState,
    p2: &BallParams,
) -> [f64; 5] {
    let t1 = Trajectory::of(s1, p1);
    let t2 = Trajectory::of(s2, p2);
    circle_quartic(
        (t2.a - t1.a).truncate(),
        (t2.b - t1.b).truncate(),
        (t2.c - t1.c).truncate(),
        p1.r + p2.r,
    )
}

/// Coefficients for a ball center reaching distance `radius` from a fixed point.
///
/// Used for pockets (capture radius) and circular cushions (cushion radius plus ball
/// radius).
pub fn ball_circle_coeffs(
    state: &BallState,
    params: &BallParams,
    center: DVec3,
    radius: f64,
) -> [f64; 5] {
    let traj = Trajectory::of(state, params);
    circle_quartic(traj.a.truncate(), traj.b.truncate(), (traj.c - center).truncate(), radius)
}

/// Earliest time the ball reaches a linear cushion on an allowed side within the
/// segment's extent, or +∞.
///
/// The ball touches the line when its center is `R` from it:
/// `lx·x(t) + ly·y(t) + l0 ± R·|l| = 0`, a quadratic in `t`.
pub fn ball_linear_cushion_time(
    state: &BallState,
    params: &BallParams,
    segment: &LinearCushionSegment,
    solver: QuarticSolver,
) -> f64 {
    let traj = Trajectory::of(state, params);
    let (lx, ly, l0) = segment.line();
    let qa = lx * traj.a.x + ly * traj.a.y;
    let qb = lx * traj.b.x + ly * traj.b.y;
    let qc = l0 + lx * traj.c.x + ly * traj.c.y;
    let offset = params.r * lx.hypot(ly);

    let mut best = f64::INFINITY;
    for &sign in segment.direction().offsets() {
        for z in math::roots(&[qa, qb, qc + sign * offset], solver) {
            if !math::is_admissible(z) || z.re >= best {
                continue;
            }
            let s = segment.projection(traj.at(z.re));
            if (0.0..=1.0).contains(&s) {
                best = z.re;
            }
        }
    }
    best
}
