//! Event resolvers
//!
//! Each event kind maps to one resolver. Model choice is fixed when the `Resolver` is
//! built from `SimSettings` and dispatched by `match`; resolvers only touch the
//! agents taking part in the event.

pub mod ball_ball;
pub mod ball_cushion;
pub mod ball_pocket;
pub mod stick_ball;
pub mod transition;

use serde::{Deserialize, Serialize};

use crate::consts::BALL_BALL_ITERATIONS;
use crate::settings::SimSettings;

/// Ball-ball collision model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BallBallModel {
    /// Instant exchange of the normal velocity components; spin untouched
    FrictionlessElastic,
    /// Iterative frictional impulse model (Mathavan et al. 2014)
    #[default]
    FrictionalMathavan,
}

impl BallBallModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallBallModel::FrictionlessElastic => "frictionless_elastic",
            BallBallModel::FrictionalMathavan => "frictional_mathavan",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "frictionless_elastic" | "elastic" => Some(BallBallModel::FrictionlessElastic),
            "frictional_mathavan" | "mathavan" => Some(BallBallModel::FrictionalMathavan),
            _ => None,
        }
    }
}

/// Ball-cushion collision model (linear and circular segments)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CushionModel {
    /// Han (2005) impulse model at the cushion contact height
    #[default]
    Han2005,
    /// Normal component mirrored and scaled by the restitution
    Reflect,
}

impl CushionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CushionModel::Han2005 => "han_2005",
            CushionModel::Reflect => "reflect",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "han_2005" | "han" => Some(CushionModel::Han2005),
            "reflect" => Some(CushionModel::Reflect),
            _ => None,
        }
    }
}

/// Selected models for every event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    pub ball_ball: BallBallModel,
    pub ball_linear_cushion: CushionModel,
    pub ball_circular_cushion: CushionModel,
    /// Nominal step count of the iterative ball-ball model
    pub ball_ball_iterations: u32,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            ball_ball: BallBallModel::default(),
            ball_linear_cushion: CushionModel::default(),
            ball_circular_cushion: CushionModel::default(),
            ball_ball_iterations: BALL_BALL_ITERATIONS,
        }
    }
}

impl Resolver {
    pub fn from_settings(settings: &SimSettings) -> Self {
        Self {
            ball_ball: settings.ball_ball,
            ball_linear_cushion: settings.ball_linear_cushion,
            ball_circular_cushion: settings.ball_circular_cushion,
            ball_ball_iterations: settings.ball_ball_iterations.max(1),
        }
    }
}
