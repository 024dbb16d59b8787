//! Cue strike
//!
//! Instantaneous point-contact impulse of the cue tip on the cue ball.

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;

use crate::coordinate_rotation;
use crate::objects::{Ball, Cue, Phase};

/// Apply the cue's current strike to `ball`, leaving it sliding.
///
/// Tip offsets are scaled by `R · english_fraction` so that `|a|, |b| ≤ 1` stay within
/// the usable part of the ball.
pub fn resolve(cue: &Cue, ball: &mut Ball) {
    let strike = &cue.strike;
    let (m, r) = (ball.params.m, ball.params.r);
    let big_m = cue.specs.m;

    let a = strike.a * r * cue.specs.english_fraction;
    let b = strike.b * r * cue.specs.english_fraction;
    let phi = strike.phi.to_radians();
    let (sin_t, cos_t) = strike.theta.to_radians().sin_cos();
    let c = (r * r - a * a - b * b).max(0.0).sqrt();

    let spin_term = a * a + (b * cos_t).powi(2) + (c * cos_t).powi(2) - 2.0 * b * c * cos_t * sin_t;
    let force = 2.0 * big_m * strike.v0 / (1.0 + m / big_m + 5.0 / (2.0 * r * r) * spin_term);

    let v = DVec3::new(0.0, -force / m * cos_t, 0.0);
    let lever = DVec3::new(-c * sin_t + b * cos_t, a * sin_t, -a * cos_t);
    let w = force / ball.params.inertia() * lever;

    // The impulse frame points along -y; turn it onto the aim direction
    ball.state.v = coordinate_rotation(v, phi + FRAC_PI_2);
    ball.state.w = coordinate_rotation(w, phi + FRAC_PI_2);
    ball.state.phase = Phase::Sliding;
}
