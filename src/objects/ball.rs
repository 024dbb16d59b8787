//! Ball parameters and kinematic state

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Motion regime of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Phase {
    #[default]
    Stationary,
    /// Turning about the vertical axis in place
    Spinning,
    /// Contact point slipping on the cloth
    Sliding,
    /// Contact point at rest on the cloth
    Rolling,
    /// In a pocket; terminal
    Pocketed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Stationary => "stationary",
            Phase::Spinning => "spinning",
            Phase::Sliding => "sliding",
            Phase::Rolling => "rolling",
            Phase::Pocketed => "pocketed",
        }
    }

    /// Moving in some way; stationary and pocketed balls are not
    #[inline]
    pub fn is_energetic(self) -> bool {
        matches!(self, Phase::Spinning | Phase::Sliding | Phase::Rolling)
    }

    /// Center of mass moving across the cloth
    #[inline]
    pub fn is_translating(self) -> bool {
        matches!(self, Phase::Sliding | Phase::Rolling)
    }
}

/// Physical constants of one ball (SI units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallParams {
    /// Mass (kg)
    pub m: f64,
    /// Radius (m)
    pub r: f64,
    /// Gravitational acceleration (m/s²)
    pub g: f64,
    /// Sliding friction with the cloth
    pub u_s: f64,
    /// Rolling friction with the cloth
    pub u_r: f64,
    /// Spinning friction with the cloth
    pub u_sp: f64,
    /// Ball-ball friction
    pub u_b: f64,
    /// Ball-ball restitution
    pub e_b: f64,
    /// Ball-cushion restitution
    pub e_c: f64,
    /// Ball-cushion friction
    pub f_c: f64,
}

impl Default for BallParams {
    fn default() -> Self {
        let r = 0.028575;
        Self {
            m: 0.170097,
            r,
            g: 9.8,
            u_s: 0.2,
            u_r: 0.01,
            u_sp: 10.0 * 2.0 / 5.0 * r / 9.0,
            u_b: 0.05,
            e_b: 0.95,
            e_c: 0.85,
            f_c: 0.2,
        }
    }
}

impl BallParams {
    /// Moment of inertia of a solid sphere
    #[inline]
    pub fn inertia(&self) -> f64 {
        0.4 * self.m * self.r * self.r
    }

    pub fn validate(&self, id: &str) -> Result<(), GeometryError> {
        if !(self.r > 0.0) {
            return Err(GeometryError::NonPositiveRadius {
                what: "ball",
                id: id.to_string(),
                radius: self.r,
            });
        }
        // Cloth friction sets every phase duration, so none of it may vanish
        let positive = [self.m, self.g, self.u_s, self.u_r, self.u_sp];
        let non_negative = [self.u_b, self.e_b, self.e_c, self.f_c];
        if !positive.iter().all(|&x| x > 0.0) || !non_negative.iter().all(|&x| x >= 0.0) {
            return Err(GeometryError::InvalidSpecs(format!(
                "ball {id}: non-physical parameters {self:?}"
            )));
        }
        Ok(())
    }
}

/// Position, velocity, angular velocity and phase at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BallState {
    pub r: DVec3,
    pub v: DVec3,
    pub w: DVec3,
    pub phase: Phase,
    /// Time of the snapshot (s since the shot started)
    pub t: f64,
}

impl BallState {
    pub fn at_rest(r: DVec3) -> Self {
        Self { r, ..Default::default() }
    }

    /// Translational plus rotational kinetic energy
    pub fn energy(&self, params: &BallParams) -> f64 {
        0.5 * params.m * self.v.length_squared() + 0.5 * params.inertia() * self.w.length_squared()
    }
}

/// A ball on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: String,
    pub params: BallParams,
    pub state: BallState,
}

impl Ball {
    /// Ball resting on the cloth at `(x, y)`
    pub fn new(id: impl Into<String>, x: f64, y: f64, params: BallParams) -> Self {
        let r = DVec3::new(x, y, params.r);
        Self { id: id.into(), params, state: BallState::at_rest(r) }
    }

    pub fn with_state(id: impl Into<String>, params: BallParams, state: BallState) -> Self {
        Self { id: id.into(), params, state }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.params.r
    }

    pub fn energy(&self) -> f64 {
        self.state.energy(&self.params)
    }
}
