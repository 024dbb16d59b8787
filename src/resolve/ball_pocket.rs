//! Ball-pocket capture

use glam::DVec3;

use crate::objects::{Ball, Phase, Pocket};

/// Drop `ball` to the floor of `pocket` and record it there
pub fn resolve(ball: &mut Ball, pocket: &mut Pocket) {
    ball.state.r = DVec3::new(pocket.center.x, pocket.center.y, -pocket.depth);
    ball.state.v = DVec3::ZERO;
    ball.state.w = DVec3::ZERO;
    ball.state.phase = Phase::Pocketed;
    pocket.contains.insert(ball.id.clone());
}
