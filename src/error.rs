//! Error types
//!
//! "No event" outcomes (no admissible root, truncated shots) are not errors; they are
//! carried by return values. Everything here aborts the call that produced it.

use thiserror::Error;

/// Invalid table or ball geometry, rejected at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("linear cushion {id}: endpoint heights differ ({z1} vs {z2})")]
    MismatchedHeights { id: String, z1: f64, z2: f64 },

    #[error("linear cushion {id}: endpoints coincide")]
    DegenerateSegment { id: String },

    #[error("cushion direction flag {0} is out of range (expected 0, 1 or 2)")]
    InvalidDirection(u8),

    #[error("{what} {id}: radius must be positive, got {radius}")]
    NonPositiveRadius { what: &'static str, id: String, radius: f64 },

    #[error("duplicate {what} id: {id}")]
    DuplicateId { what: &'static str, id: String },

    #[error("invalid table specs: {0}")]
    InvalidSpecs(String),

    #[error("balls {a} and {b} overlap")]
    OverlappingBalls { a: String, b: String },
}

/// Failures while simulating or configuring a system
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("ball-ball collision {a}/{b} did not converge within {cap} iterations")]
    BallBallNonConvergence { a: String, b: String, cap: u32 },

    #[error("unknown ball: {0}")]
    UnknownBall(String),

    #[error("unknown pocket: {0}")]
    UnknownPocket(String),

    #[error("unknown cushion segment: {0}")]
    UnknownCushion(String),

    #[error("ball {0} is pocketed and cannot take part in an event")]
    PocketedAgent(String),

    #[error("system has no cue")]
    NoCue,

    #[error("invalid strike: {0}")]
    InvalidStrike(String),

    #[error("no solution: {0}")]
    NoSolution(String),
}

/// Settings could not be parsed or stored
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Snapshot save/load failures
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("snapshot failed validation: {0}")]
    Invalid(#[from] SimError),
}
