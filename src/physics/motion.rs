//! Closed-form ball motion within a single phase
//!
//! Every function here is pure: given a state, the ball's constants and an elapsed
//! time it returns the state at that time. Phase changes are never applied
//! implicitly; `transition` reports when the current phase ends and into what.

use glam::DVec3;

use crate::objects::{BallParams, BallState, Phase};
use crate::{UP, rel_velocity, unit_vector};

/// Time until the contact point stops slipping
#[inline]
pub fn slide_time(state: &BallState, params: &BallParams) -> f64 {
    let u = rel_velocity(state.v, state.w, params.r);
    2.0 * u.length() / (7.0 * params.u_s * params.g)
}

/// Time until a rolling ball stops translating
#[inline]
pub fn roll_time(state: &BallState, params: &BallParams) -> f64 {
    state.v.length() / (params.u_r * params.g)
}

/// Time until vertical-axis spin dies out
#[inline]
pub fn spin_time(state: &BallState, params: &BallParams) -> f64 {
    state.w.z.abs() / spin_decay_rate(params)
}

/// Angular deceleration of vertical-axis spin (rad/s²)
#[inline]
pub fn spin_decay_rate(params: &BallParams) -> f64 {
    5.0 * params.u_sp * params.g / (2.0 * params.r)
}

/// Vertical-axis spin after `t`, decaying linearly to exactly zero
fn decay_spin(wz: f64, params: &BallParams, t: f64) -> f64 {
    let alpha = spin_decay_rate(params);
    let t = t.min(wz.abs() / alpha);
    wz - wz.signum() * alpha * t
}

/// End of the current phase: the phase it turns into and the time until then.
///
/// `None` for stationary and pocketed balls.
pub fn transition(state: &BallState, params: &BallParams) -> Option<(Phase, f64)> {
    match state.phase {
        Phase::Stationary | Phase::Pocketed => None,
        Phase::Spinning => Some((Phase::Stationary, spin_time(state, params))),
        Phase::Sliding => Some((Phase::Rolling, slide_time(state, params))),
        Phase::Rolling => {
            let roll = roll_time(state, params);
            if spin_time(state, params) > roll {
                Some((Phase::Spinning, roll))
            } else {
                Some((Phase::Stationary, roll))
            }
        }
    }
}

/// Direction the cloth friction acts against, for translating phases
#[inline]
pub fn friction_direction(state: &BallState, params: &BallParams) -> DVec3 {
    match state.phase {
        Phase::Sliding => unit_vector(rel_velocity(state.v, state.w, params.r)),
        Phase::Rolling => unit_vector(state.v),
        _ => DVec3::ZERO,
    }
}

/// State after `t` seconds in the current phase.
///
/// `t` is clamped to the phase duration so a state is never carried past the end of
/// its phase. The snapshot time is advanced by the unclamped `t`.
pub fn evolve_state(state: &BallState, params: &BallParams, t: f64) -> BallState {
    let mut next = *state;
    next.t = state.t + t.max(0.0);
    if t <= 0.0 {
        return next;
    }

    let g = params.g;
    match state.phase {
        Phase::Stationary | Phase::Pocketed => {}
        Phase::Spinning => {
            next.w = DVec3::new(0.0, 0.0, decay_spin(state.w.z, params, t));
        }
        Phase::Sliding => {
            let t = t.min(slide_time(state, params));
            let u = friction_direction(state, params);
            let mu = params.u_s;
            next.r = state.r + state.v * t - 0.5 * mu * g * t * t * u;
            next.v = state.v - mu * g * t * u;
            let w_xy = state.w - (5.0 / (2.0 * params.r)) * mu * g * t * u.cross(UP);
            next.w = DVec3::new(w_xy.x, w_xy.y, decay_spin(state.w.z, params, t));
        }
        Phase::Rolling => {
            let t = t.min(roll_time(state, params));
            let u = friction_direction(state, params);
            let mu = params.u_r;
            next.r = state.r + state.v * t - 0.5 * mu * g * t * t * u;
            next.v = state.v - mu * g * t * u;
            next.w = rolling_spin(next.v, params.r, decay_spin(state.w.z, params, t));
        }
    }
    next
}

/// Angular velocity satisfying the rolling constraint for `v`
#[inline]
pub fn rolling_spin(v: DVec3, radius: f64, wz: f64) -> DVec3 {
    DVec3::new(-v.y / radius, v.x / radius, wz)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BallParams {
        BallParams::default()
    }

    fn sliding(v: DVec3, w: DVec3) -> BallState {
        BallState { r: DVec3::new(0.5, 0.5, params().r), v, w, phase: Phase::Sliding, t: 0.0 }
    }

    #[test]
    fn test_slide_ends_rolling() {
        let p = params();
        let state = sliding(DVec3::new(2.0, 0.5, 0.0), DVec3::new(10.0, -20.0, 5.0));
        let (next, dt) = transition(&state, &p).unwrap();
        assert_eq!(next, Phase::Rolling);
        let end = evolve_state(&state, &p, dt);
        assert!(rel_velocity(end.v, end.w, p.r).length() < 1e-9);
    }

    #[test]
    fn test_stun_shot_slide_time() {
        // No spin: u = v, slides for 2v / (7 μs g)
        let p = params();
        let state = sliding(DVec3::new(1.0, 0.0, 0.0), DVec3::ZERO);
        let expected = 2.0 / (7.0 * p.u_s * p.g);
        assert!((slide_time(&state, &p) - expected).abs() < 1e-15);
        let end = evolve_state(&state, &p, expected);
        assert!((end.v.x - 5.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_roll_stops_at_roll_time() {
        let p = params();
        let v = DVec3::new(0.0, 1.5, 0.0);
        let state = BallState {
            v,
            w: rolling_spin(v, p.r, 0.0),
            phase: Phase::Rolling,
            ..Default::default()
        };
        let dt = roll_time(&state, &p);
        let end = evolve_state(&state, &p, dt * 2.0);
        assert!(end.v.length() < 1e-12);
        let distance = v.length_squared() / (2.0 * p.u_r * p.g);
        assert!((end.r.y - distance).abs() < 1e-9);
        assert!((end.t - 2.0 * dt).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_with_heavy_side_spin_ends_spinning() {
        let p = params();
        let v = DVec3::new(0.05, 0.0, 0.0);
        let state = BallState {
            v,
            w: rolling_spin(v, p.r, 60.0),
            phase: Phase::Rolling,
            ..Default::default()
        };
        assert_eq!(transition(&state, &p).map(|(ph, _)| ph), Some(Phase::Spinning));

        let state = BallState { w: rolling_spin(v, p.r, 0.1), ..state };
        assert_eq!(transition(&state, &p).map(|(ph, _)| ph), Some(Phase::Stationary));
    }

    #[test]
    fn test_spin_decays_to_zero() {
        let p = params();
        let state = BallState {
            w: DVec3::new(0.0, 0.0, -30.0),
            phase: Phase::Spinning,
            ..Default::default()
        };
        let dt = spin_time(&state, &p);
        assert_eq!(evolve_state(&state, &p, dt).w.z, 0.0);
        assert!(evolve_state(&state, &p, dt / 2.0).w.z < 0.0);
        assert_eq!(evolve_state(&state, &p, 10.0 * dt).w.z, 0.0);
    }

    #[test]
    fn test_stationary_does_not_move() {
        let p = params();
        let state = BallState::at_rest(DVec3::new(0.2, 0.3, p.r));
        let later = evolve_state(&state, &p, 5.0);
        assert_eq!(later.r, state.r);
        assert_eq!(later.t, 5.0);
        assert!(transition(&state, &p).is_none());
    }

    #[test]
    fn test_sliding_energy_decreases() {
        let p = params();
        let state = sliding(DVec3::new(-1.0, 2.0, 0.0), DVec3::new(40.0, 10.0, -15.0));
        let mut last = state.energy(&p);
        for k in 1..20 {
            let e = evolve_state(&state, &p, k as f64 * 0.01).energy(&p);
            assert!(e <= last + 1e-12);
            last = e;
        }
    }
}
