//! Simulated objects: balls, table, cue

pub mod ball;
pub mod cue;
pub mod table;
mod table_layout;

pub use ball::{Ball, BallParams, BallState, Phase};
pub use cue::{Cue, CueSpecs, Strike};
pub use table::{
    CircularCushionSegment, CushionDirection, LinearCushionSegment, LinearSegmentSpec, Pocket,
    Table, TableSpecs, TableType,
};
