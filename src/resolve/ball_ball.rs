//! Ball-ball collisions
//!
//! Both models leave the balls sliding and separated by exactly `R1 + R2 + EPS_SPACE`
//! when they were closer than that.

use glam::{DVec2, DVec3};

use super::BallBallModel;
use crate::UP;
use crate::consts::{BALL_BALL_CAP_FACTOR, EPS_SPACE};
use crate::error::SimError;
use crate::objects::{Ball, Phase};

/// Resolve a collision between `b1` and `b2` in place.
///
/// On error neither ball is modified.
pub fn resolve(
    model: BallBallModel,
    b1: &mut Ball,
    b2: &mut Ball,
    iterations: u32,
) -> Result<(), SimError> {
    match model {
        BallBallModel::FrictionlessElastic => frictionless_elastic(b1, b2),
        BallBallModel::FrictionalMathavan => mathavan(b1, b2, iterations)?,
    }
    b1.state.phase = Phase::Sliding;
    b2.state.phase = Phase::Sliding;
    make_space(b1, b2);
    Ok(())
}

/// Line of centers projected on the cloth, from `b1` toward `b2`
fn line_of_centers(b1: &Ball, b2: &Ball) -> DVec3 {
    (b2.state.r - b1.state.r).with_z(0.0).normalize_or_zero()
}

fn frictionless_elastic(b1: &mut Ball, b2: &mut Ball) {
    let n = line_of_centers(b1, b2);
    let approach = (b1.state.v - b2.state.v).dot(n);
    if approach <= 0.0 {
        return;
    }
    let (m1, m2) = (b1.params.m, b2.params.m);
    b1.state.v -= 2.0 * m2 / (m1 + m2) * approach * n;
    b2.state.v += 2.0 * m1 / (m1 + m2) * approach * n;
}

/// Velocities and spins resolved into the collision frame
#[derive(Debug, Clone, Copy)]
struct Local {
    vx: f64,
    vy: f64,
    wx: f64,
    wy: f64,
    wz: f64,
}

impl Local {
    fn project(v: DVec3, w: DVec3, x: DVec3, y: DVec3) -> Self {
        Self { vx: v.dot(x), vy: v.dot(y), wx: w.dot(x), wy: w.dot(y), wz: w.z }
    }

    fn unproject(&self, x: DVec3, y: DVec3) -> (DVec3, DVec3) {
        (self.vx * x + self.vy * y, self.wx * x + self.wy * y + self.wz * UP)
    }

    /// Slip of the cloth contact point
    fn table_slip(&self, radius: f64) -> DVec2 {
        DVec2::new(self.vx + radius * self.wy, self.vy - radius * self.wx)
    }
}

/// Mathavan et al. (2014): the normal impulse is applied in `iterations` equal
/// increments through compression, then restitution continues until the normal work
/// reaches `(1 + e²)` times the compression work. Ball-ball and ball-cloth friction act
/// on every increment.
fn mathavan(b1: &mut Ball, b2: &mut Ball, iterations: u32) -> Result<(), SimError> {
    let y = line_of_centers(b1, b2);
    if y == DVec3::ZERO {
        return Ok(());
    }
    let x = y.cross(UP);

    let mut i = Local::project(b1.state.v, b1.state.w, x, y);
    let mut j = Local::project(b2.state.v, b2.state.w, x, y);
    let mut v_ijy = j.vy - i.vy;
    if v_ijy >= 0.0 {
        return Ok(());
    }

    let m = 0.5 * (b1.params.m + b2.params.m);
    let radius = 0.5 * (b1.params.r + b2.params.r);
    let u_b = 0.5 * (b1.params.u_b + b2.params.u_b);
    let e_b = 0.5 * (b1.params.e_b + b2.params.e_b);
    let (u_s1, u_s2) = (b1.params.u_s, b2.params.u_s);

    let dp = 0.5 * (1.0 + e_b) * m * v_ijy.abs() / f64::from(iterations);
    let c = 5.0 / (2.0 * m * radius);
    let cap = iterations.saturating_mul(BALL_BALL_CAP_FACTOR);

    let mut work = 0.0;
    let mut work_required = f64::INFINITY;
    let mut compressed = false;
    let mut steps = 0u32;

    while v_ijy < 0.0 || work < work_required {
        if steps >= cap {
            return Err(SimError::BallBallNonConvergence {
                a: b1.id.clone(),
                b: b2.id.clone(),
                cap,
            });
        }

        let slip_i = i.table_slip(radius);
        let slip_j = j.table_slip(radius);
        let slip_c = DVec2::new(i.vx - j.vx - radius * (i.wz + j.wz), radius * (i.wx + j.wx));
        let slip_c_len = slip_c.length();

        let (mut dp1, mut dp2) = (0.0, 0.0);
        let (mut dp_i, mut dp_j) = (DVec2::ZERO, DVec2::ZERO);
        if slip_c_len >= 1e-16 {
            dp1 = -u_b * dp * slip_c.x / slip_c_len;
            if slip_c.y.abs() >= 1e-16 {
                dp2 = -u_b * dp * slip_c.y / slip_c_len;
                if dp2 > 0.0 {
                    dp_j = -u_s2 * slip_j.normalize_or_zero() * dp2;
                } else {
                    dp_i = u_s1 * slip_i.normalize_or_zero() * dp2;
                }
            }
        }

        i.vx += (dp1 + dp_i.x) / m;
        i.vy += (-dp + dp_i.y) / m;
        j.vx += (-dp1 + dp_j.x) / m;
        j.vy += (dp + dp_j.y) / m;

        i.wx += c * (dp2 + dp_i.y);
        i.wy += c * -dp_i.x;
        i.wz += c * -dp1;
        j.wx += c * (dp2 + dp_j.y);
        j.wy += c * -dp_j.x;
        j.wz += c * -dp1;

        let v_prev = v_ijy;
        v_ijy = j.vy - i.vy;
        work += 0.5 * dp * (v_prev + v_ijy).abs();
        steps += 1;

        if !compressed && v_ijy > 0.0 {
            compressed = true;
            work_required = (1.0 + e_b * e_b) * work;
        }
    }

    log::trace!("mathavan {}/{} settled after {steps} steps", b1.id, b2.id);
    (b1.state.v, b1.state.w) = i.unproject(x, y);
    (b2.state.v, b2.state.w) = j.unproject(x, y);
    Ok(())
}

/// Push overlapping balls apart about their midpoint
fn make_space(b1: &mut Ball, b2: &mut Ball) {
    let d = (b2.state.r - b1.state.r).with_z(0.0);
    let dist = d.length();
    let target = b1.params.r + b2.params.r + EPS_SPACE;
    if dist >= target || dist == 0.0 {
        return;
    }
    let u = d / dist;
    let mid = 0.5 * (b1.state.r + b2.state.r);
    let p1 = mid - 0.5 * target * u;
    let p2 = mid + 0.5 * target * u;
    b1.state.r = DVec3::new(p1.x, p1.y, b1.state.r.z);
    b2.state.r = DVec3::new(p2.x, p2.y, b2.state.r.z);
}
