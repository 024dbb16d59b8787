//! cue-sim - Event-based billiards simulation
//!
//! Core modules:
//! - `math`: Polynomial root solving (quartic closed form, companion matrix, bisection)
//! - `objects`: Balls, table geometry and the cue
//! - `physics`: Analytic motion per phase and time-to-event coefficients
//! - `resolve`: Collision and transition resolvers
//! - `sim`: Event detection, the shot log and the `evolve` loop
//! - `settings`: Data-driven model and solver selection
//! - `persistence`: Versioned JSON snapshots of a system
//! - `layout`: Seeded ball racks

pub mod error;
pub mod layout;
pub mod math;
pub mod objects;
pub mod persistence;
pub mod physics;
pub mod resolve;
pub mod settings;
pub mod sim;

pub use error::{GeometryError, PersistenceError, SettingsError, SimError};
pub use objects::{Ball, BallParams, BallState, Cue, CueSpecs, Phase, Table, TableSpecs, TableType};
pub use settings::{SimPreset, SimSettings};
pub use sim::{EvolveOutcome, EvolveReport, Event, EventKind, System, evolve};

use glam::DVec3;

/// Simulation tolerances and iteration limits
pub mod consts {
    /// Events closer together than this are treated as simultaneous
    pub const EPS_TIME: f64 = 1e-9;
    /// Gap left between bodies after a contact is resolved
    pub const EPS_SPACE: f64 = 1e-9;
    /// Roots at or below this are in the past (or the present contact)
    pub const ROOT_TOL: f64 = 1e-9;
    /// Relative imaginary part below which a complex root counts as real
    pub const IMAG_TOL: f64 = 1e-9;

    /// Default step count of the iterative ball-ball model
    pub const BALL_BALL_ITERATIONS: u32 = 1000;
    /// Hard cap multiplier on the iterative ball-ball model
    pub const BALL_BALL_CAP_FACTOR: u32 = 20;

    /// Safety bound on events per `evolve` call
    pub const MAX_EVENTS: usize = 10_000;

    /// Bisection iterations for transcendental equations
    pub const BISECTION_ITERATIONS: u32 = 200;
}

/// Up axis of the table frame
pub const UP: DVec3 = DVec3::Z;

/// Unit vector, or zero for a zero-length input
#[inline]
pub fn unit_vector(v: DVec3) -> DVec3 {
    v.normalize_or_zero()
}

/// Angle of the xy projection measured from +x, in [0, 2π)
#[inline]
pub fn angle(v: DVec3) -> f64 {
    use std::f64::consts::TAU;
    v.y.atan2(v.x).rem_euclid(TAU)
}

/// Rotate a vector about the vertical axis by `phi` radians
#[inline]
pub fn coordinate_rotation(v: DVec3, phi: f64) -> DVec3 {
    let (sin, cos) = phi.sin_cos();
    DVec3::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y, v.z)
}

/// Velocity of the cloth contact point of a ball (slip velocity)
#[inline]
pub fn rel_velocity(v: DVec3, w: DVec3, radius: f64) -> DVec3 {
    v + radius * UP.cross(w)
}

/// Normalized angle to [0, 360) degrees
#[inline]
pub fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_range() {
        assert!((angle(DVec3::X) - 0.0).abs() < 1e-12);
        assert!((angle(DVec3::Y) - FRAC_PI_2).abs() < 1e-12);
        assert!((angle(-DVec3::Y) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_coordinate_rotation_quarter_turn() {
        let r = coordinate_rotation(DVec3::new(1.0, 0.0, 3.0), FRAC_PI_2);
        assert!((r - DVec3::new(0.0, 1.0, 3.0)).length() < 1e-12);
    }

    #[test]
    fn test_rel_velocity_rolling_is_zero() {
        let radius = 0.03;
        let v = DVec3::new(1.0, 0.5, 0.0);
        let w = DVec3::new(-v.y / radius, v.x / radius, 4.0);
        assert!(rel_velocity(v, w, radius).length() < 1e-12);
    }

    #[test]
    fn test_unit_vector_zero() {
        assert_eq!(unit_vector(DVec3::ZERO), DVec3::ZERO);
    }
}
