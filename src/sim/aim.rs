//! Aiming helpers
//!
//! All helpers only set the cue's aim angle `phi`; speed, elevation and tip offsets are
//! left as they are.

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;

use super::system::System;
use crate::error::{GeometryError, SimError};
use crate::math::solve_transcendental;
use crate::{angle, normalize_degrees};

/// Largest cut angle (degrees) the solver accepts
pub const MAX_CUT: f64 = 89.0;

impl System {
    /// Aim the cue ball at a point; returns `phi` in degrees
    pub fn aim_at_pos(&mut self, pos: DVec3) -> Result<f64, SimError> {
        let from = self.cue_ball()?.state.r;
        let d = (pos - from).with_z(0.0);
        if d.length_squared() == 0.0 {
            return Err(SimError::NoSolution("aim point coincides with the cue ball".into()));
        }
        self.set_phi(angle(d).to_degrees())
    }

    /// Aim the cue ball at another ball.
    ///
    /// With a cut angle (degrees, in `(-MAX_CUT, MAX_CUT)`) the cue ball is aimed so the
    /// line of centers at contact makes that angle with its path. Positive cuts send
    /// the object ball to the left of the cue ball's path.
    pub fn aim_at_ball(&mut self, ball_id: &str, cut: Option<f64>) -> Result<f64, SimError> {
        let cue_ball = self.cue_ball()?;
        let target = self.ball(ball_id).ok_or_else(|| SimError::UnknownBall(ball_id.to_string()))?;
        if cue_ball.id == target.id {
            return Err(SimError::NoSolution("cannot aim the cue ball at itself".into()));
        }

        let offset = (target.state.r - cue_ball.state.r).with_z(0.0);
        let d = offset.length();
        let contact = cue_ball.radius() + target.radius();
        if d <= contact {
            return Err(GeometryError::OverlappingBalls {
                a: cue_ball.id.clone(),
                b: target.id.clone(),
            }
            .into());
        }

        let cut = cut.unwrap_or(0.0);
        if !(cut.abs() < MAX_CUT) {
            return Err(SimError::InvalidStrike(format!(
                "cut angle {cut} outside (-{MAX_CUT}, {MAX_CUT})"
            )));
        }

        let center = angle(offset);
        let phi = if cut == 0.0 {
            center
        } else {
            let c = cut.abs().to_radians();
            // Deflection of the aim line from the line of centers for this cut
            let f = |dphi: f64| {
                let (sin, cos) = (c - dphi).sin_cos();
                (contact * sin / (d - contact * cos)).atan() - dphi
            };
            let graze = FRAC_PI_2 - (contact / d).acos();
            let dphi = solve_transcendental(f, 0.0, graze, 1e-13)?;
            if cut > 0.0 { center - dphi } else { center + dphi }
        };
        self.set_phi(phi.to_degrees())
    }

    /// Ghost-ball aim that sends `ball_id` toward a pocket's potting point.
    ///
    /// Returns `(phi, cut)` in degrees.
    pub fn aim_for_pocket(
        &mut self,
        ball_id: &str,
        pocket_id: &str,
    ) -> Result<(f64, f64), SimError> {
        let (ghost, cut) = self.pocket_shot(ball_id, pocket_id)?;
        let phi = self.aim_at_pos(ghost)?;
        Ok((phi, cut))
    }

    /// Aim at the pocket needing the smallest cut; returns its id
    pub fn aim_for_best_pocket(&mut self, ball_id: &str) -> Result<String, SimError> {
        let mut best: Option<(String, f64)> = None;
        for id in self.table().pockets().keys() {
            let Ok((_, cut)) = self.pocket_shot(ball_id, id) else {
                continue;
            };
            if cut.abs() < 90.0 && best.as_ref().is_none_or(|(_, b)| cut.abs() < b.abs()) {
                best = Some((id.clone(), cut));
            }
        }
        let (pocket, cut) = best.ok_or_else(|| {
            SimError::NoSolution(format!("no pocket reachable for ball {ball_id}"))
        })?;
        self.aim_for_pocket(ball_id, &pocket)?;
        log::debug!("best pocket for {ball_id}: {pocket} (cut {cut:.1}°)");
        Ok(pocket)
    }

    /// Ghost-ball position and signed cut angle (degrees) for a pot
    fn pocket_shot(&self, ball_id: &str, pocket_id: &str) -> Result<(DVec3, f64), SimError> {
        let cue_ball = self.cue_ball()?;
        let target = self.ball(ball_id).ok_or_else(|| SimError::UnknownBall(ball_id.to_string()))?;
        let pocket = self
            .table()
            .pocket(pocket_id)
            .ok_or_else(|| SimError::UnknownPocket(pocket_id.to_string()))?;

        let to_pocket = (pocket.potting_point - target.state.r).with_z(0.0);
        if to_pocket.length_squared() == 0.0 {
            return Err(SimError::NoSolution(format!("ball {ball_id} sits on the potting point")));
        }
        let ghost = target.state.r - to_pocket.normalize() * (cue_ball.radius() + target.radius());
        let path = (ghost - cue_ball.state.r).with_z(0.0);
        if path.length_squared() == 0.0 {
            return Ok((ghost, 0.0));
        }
        let cut = normalize_degrees((angle(path) - angle(to_pocket)).to_degrees() + 180.0) - 180.0;
        Ok((ghost, cut))
    }

    fn set_phi(&mut self, phi: f64) -> Result<f64, SimError> {
        let phi = normalize_degrees(phi);
        self.cue_mut()?.strike.phi = phi;
        Ok(phi)
    }
}
