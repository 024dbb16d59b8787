//! Cue stick

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Physical constants of the cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueSpecs {
    /// Mass (kg)
    pub m: f64,
    /// Length (m)
    pub length: f64,
    /// Tip radius (m)
    pub tip_radius: f64,
    /// Largest usable tip offset as a fraction of the ball radius
    pub english_fraction: f64,
}

impl Default for CueSpecs {
    fn default() -> Self {
        Self {
            m: 0.567,
            length: 1.4732,
            tip_radius: 0.007,
            english_fraction: 0.5,
        }
    }
}

/// Strike parameters
///
/// - `v0`: cue speed at impact (m/s)
/// - `phi`: aim direction, degrees counter-clockwise from +x
/// - `theta`: cue elevation above horizontal, degrees
/// - `a`: side offset of the tip, in `[-1, 1]` (positive is left of center)
/// - `b`: vertical offset of the tip, in `[-1, 1]` (positive is above center)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    pub v0: f64,
    pub phi: f64,
    pub theta: f64,
    pub a: f64,
    pub b: f64,
}

impl Default for Strike {
    fn default() -> Self {
        Self { v0: 2.0, phi: 0.0, theta: 0.0, a: 0.0, b: 0.25 }
    }
}

impl Strike {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.v0 >= 0.0 && self.v0.is_finite()) {
            return Err(SimError::InvalidStrike(format!(
                "speed {} must be finite and non-negative",
                self.v0
            )));
        }
        if !self.phi.is_finite() {
            return Err(SimError::InvalidStrike("aim angle must be finite".into()));
        }
        if !(0.0..90.0).contains(&self.theta) {
            return Err(SimError::InvalidStrike(format!(
                "elevation {} outside [0, 90)",
                self.theta
            )));
        }
        if self.a.hypot(self.b) > 1.0 {
            return Err(SimError::InvalidStrike(format!(
                "tip offset ({}, {}) misses the ball",
                self.a, self.b
            )));
        }
        Ok(())
    }
}

/// The cue and the strike it is set up for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub id: String,
    pub specs: CueSpecs,
    pub cue_ball_id: String,
    pub strike: Strike,
    /// Strike armed and waiting to be resolved by the next `evolve`
    pub pending: bool,
}

impl Cue {
    pub fn new(cue_ball_id: impl Into<String>) -> Self {
        Self {
            id: "cue_stick".to_string(),
            specs: CueSpecs::default(),
            cue_ball_id: cue_ball_id.into(),
            strike: Strike::default(),
            pending: false,
        }
    }

    pub fn with_specs(mut self, specs: CueSpecs) -> Self {
        self.specs = specs;
        self
    }
}
