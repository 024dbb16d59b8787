//! Ball motion and event-time equations

pub mod collide;
pub mod motion;

pub use collide::{Trajectory, ball_ball_coeffs, ball_circle_coeffs, ball_linear_cushion_time};
pub use motion::{evolve_state, friction_direction, rolling_spin, transition};
