//! Ball-cushion collisions
//!
//! The contact normal is oriented along the ball's velocity (into the cushion) before
//! the model runs. After resolution the ball is sliding and sits `EPS_SPACE` clear of
//! the cushion.

use glam::DVec3;

use super::CushionModel;
use crate::consts::EPS_SPACE;
use crate::objects::{
    Ball, BallParams, BallState, CircularCushionSegment, LinearCushionSegment, Phase,
};
use crate::{angle, coordinate_rotation};

pub fn resolve_linear(model: CushionModel, ball: &mut Ball, segment: &LinearCushionSegment) {
    let normal = segment.normal();
    apply(model, &mut ball.state, &ball.params, normal, segment.height());

    let target = ball.params.r + EPS_SPACE;
    let dist = segment.signed_distance(ball.state.r);
    if dist.abs() < target {
        let side = if dist >= 0.0 { 1.0 } else { -1.0 };
        ball.state.r += side * (target - dist.abs()) * normal;
    }
}

pub fn resolve_circular(model: CushionModel, ball: &mut Ball, segment: &CircularCushionSegment) {
    let normal = segment.normal_at(ball.state.r);
    apply(model, &mut ball.state, &ball.params, normal, segment.height());

    let target = segment.radius + ball.params.r + EPS_SPACE;
    let offset = (ball.state.r - segment.center).with_z(0.0);
    if offset.length() < target && normal != DVec3::ZERO {
        let placed = segment.center + target * normal;
        ball.state.r = DVec3::new(placed.x, placed.y, ball.state.r.z);
    }
}

fn apply(
    model: CushionModel,
    state: &mut BallState,
    params: &BallParams,
    normal: DVec3,
    height: f64,
) {
    let normal = if normal.dot(state.v) > 0.0 { normal } else { -normal };
    match model {
        CushionModel::Han2005 => han2005(state, params, normal, height),
        CushionModel::Reflect => reflect(state, params, normal),
    }
    state.phase = Phase::Sliding;
}

fn reflect(state: &mut BallState, params: &BallParams, normal: DVec3) {
    let vn = state.v.dot(normal);
    if vn > 0.0 {
        state.v -= (1.0 + params.e_c) * vn * normal;
    }
}

/// Han (2005), "Dynamics in carom and three cushion billiards".
///
/// Works in the frame where `normal` is +x. The cushion touches the ball above its
/// equator at angle `θa = asin(h/R - 1)`. Friction in the forward-sliding case opposes
/// the contact slip direction.
fn han2005(state: &mut BallState, params: &BallParams, normal: DVec3, height: f64) {
    let (m, r) = (params.m, params.r);
    let (e, mu) = (params.e_c, params.f_c);

    let psi = angle(normal);
    let v = coordinate_rotation(state.v, -psi);
    let w = coordinate_rotation(state.w, -psi);

    let theta_a = (height / r - 1.0).clamp(-1.0, 1.0).asin();
    let (sin_a, cos_a) = theta_a.sin_cos();

    // Slip at the cushion contact point
    let sx = v.x * sin_a - v.z * cos_a + r * w.y;
    let sy = -v.y - r * w.z * cos_a + r * w.x * sin_a;
    let c = v.x * cos_a;
    let phi = sy.atan2(sx);

    let inertia = params.inertia();
    let a = 3.5 / m;
    let b = 1.0 / m;

    let pz_e = (1.0 + e) * c / b;
    let pz_s = sx.hypot(sy) / a;

    let (px, py, pz) = if pz_s <= pz_e {
        // Slip stops during contact
        (
            -sx / a * sin_a - pz_e * cos_a,
            sy / a,
            sx / a * cos_a - pz_e * sin_a,
        )
    } else {
        (
            -mu * pz_e * phi.cos() * sin_a - pz_e * cos_a,
            mu * pz_e * phi.sin(),
            mu * pz_e * phi.cos() * cos_a - pz_e * sin_a,
        )
    };

    let v = DVec3::new(v.x + px / m, v.y + py / m, v.z);
    let w = DVec3::new(
        w.x - r / inertia * py * sin_a,
        w.y + r / inertia * (px * sin_a - pz * cos_a),
        w.z + r / inertia * py * cos_a,
    );

    state.v = coordinate_rotation(v, psi);
    state.w = coordinate_rotation(w, psi);
}
