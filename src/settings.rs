//! Simulation settings
//!
//! Model and solver choices plus the safety bounds of `evolve`. Stored as JSON,
//! separately from shot snapshots.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{BALL_BALL_ITERATIONS, MAX_EVENTS};
use crate::error::SettingsError;
use crate::math::QuarticSolver;
use crate::resolve::{BallBallModel, CushionModel};

/// Named bundles of model choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SimPreset {
    /// Frictional ball-ball and Han cushion models
    #[default]
    Accurate,
    /// Frictionless ball-ball and reflecting cushions
    Fast,
}

impl SimPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimPreset::Accurate => "Accurate",
            SimPreset::Fast => "Fast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accurate" | "default" => Some(SimPreset::Accurate),
            "fast" => Some(SimPreset::Fast),
            _ => None,
        }
    }
}

/// Everything `evolve` needs besides the system itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub solver: QuarticSolver,

    // === Resolver models ===
    pub ball_ball: BallBallModel,
    pub ball_linear_cushion: CushionModel,
    pub ball_circular_cushion: CushionModel,
    /// Nominal step count of the frictional ball-ball model
    pub ball_ball_iterations: u32,

    // === Safety bounds ===
    /// Events resolved per `evolve` call before the shot is truncated
    pub max_events: usize,
    /// Simulated time (s) after which the shot is truncated
    pub t_final: Option<f64>,
    /// Wall-clock budget (s) per `evolve` call
    pub wall_clock_limit: Option<f64>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            solver: QuarticSolver::Hybrid,

            ball_ball: BallBallModel::FrictionalMathavan,
            ball_linear_cushion: CushionModel::Han2005,
            ball_circular_cushion: CushionModel::Han2005,
            ball_ball_iterations: BALL_BALL_ITERATIONS,

            max_events: MAX_EVENTS,
            t_final: None,
            wall_clock_limit: None,
        }
    }
}

impl SimSettings {
    pub fn from_preset(preset: SimPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Switch model choices to `preset`, leaving solver and bounds alone
    pub fn apply_preset(&mut self, preset: SimPreset) {
        let (ball_ball, cushion) = match preset {
            SimPreset::Accurate => (BallBallModel::FrictionalMathavan, CushionModel::Han2005),
            SimPreset::Fast => (BallBallModel::FrictionlessElastic, CushionModel::Reflect),
        };
        self.ball_ball = ball_ball;
        self.ball_linear_cushion = cushion;
        self.ball_circular_cushion = cushion;
    }

    pub fn preset_named(name: &str) -> Result<Self, SettingsError> {
        SimPreset::from_str(name)
            .map(Self::from_preset)
            .ok_or_else(|| SettingsError::UnknownPreset(name.to_string()))
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let settings = Self::from_json(&fs::read_to_string(path)?)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SimSettings::default();
        assert_eq!(s.solver, QuarticSolver::Hybrid);
        assert_eq!(s.ball_ball, BallBallModel::FrictionalMathavan);
        assert_eq!(s.ball_ball_iterations, 1000);
        assert!(s.t_final.is_none());
    }

    #[test]
    fn test_presets() {
        let fast = SimSettings::from_preset(SimPreset::Fast);
        assert_eq!(fast.ball_ball, BallBallModel::FrictionlessElastic);
        assert_eq!(fast.ball_circular_cushion, CushionModel::Reflect);
        assert_eq!(SimSettings::from_preset(SimPreset::Accurate), SimSettings::default());
        for p in [SimPreset::Accurate, SimPreset::Fast] {
            assert_eq!(SimPreset::from_str(p.as_str()), Some(p));
        }
        assert!(matches!(SimSettings::preset_named("slow"), Err(SettingsError::UnknownPreset(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let s = SimSettings {
            t_final: Some(12.5),
            max_events: 42,
            ..SimSettings::from_preset(SimPreset::Fast)
        };
        let back = SimSettings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let s = SimSettings::from_json(r#"{"solver":"Numeric"}"#).unwrap();
        assert_eq!(s.solver, QuarticSolver::Numeric);
        assert_eq!(s.max_events, MAX_EVENTS);
    }

    #[test]
    fn test_file_round_trip() {
        let path =
            std::env::temp_dir().join(format!("cue_sim_settings_{}.json", std::process::id()));
        let s = SimSettings { wall_clock_limit: Some(2.0), ..Default::default() };
        s.save(&path).unwrap();
        assert_eq!(SimSettings::load(&path).unwrap(), s);
        let _ = std::fs::remove_file(&path);
    }
}
