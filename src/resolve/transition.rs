//! Phase transitions
//!
//! Evolution already brings a ball to the boundary of its phase; relabelling snaps
//! away the residue so the new phase's constraints hold exactly.

use glam::DVec3;

use crate::objects::{Ball, Phase};
use crate::physics::rolling_spin;

pub fn resolve(ball: &mut Ball, to: Phase) {
    let state = &mut ball.state;
    match to {
        Phase::Rolling => state.w = rolling_spin(state.v, ball.params.r, state.w.z),
        Phase::Spinning => {
            state.v = DVec3::ZERO;
            state.w = DVec3::new(0.0, 0.0, state.w.z);
        }
        Phase::Stationary => {
            state.v = DVec3::ZERO;
            state.w = DVec3::ZERO;
        }
        Phase::Sliding | Phase::Pocketed => {}
    }
    state.phase = to;
}
