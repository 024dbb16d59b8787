//! Event-based simulation
//!
//! Deterministic by construction:
//! - Balls, cushions and pockets are iterated in id order
//! - Simultaneous events are broken by `EventKind` order
//! - No wall-clock input except the optional `evolve` time budget

pub mod aim;
pub mod detect;
pub mod events;
pub mod evolve;
pub mod system;

pub use aim::MAX_CUT;
pub use detect::{Candidate, next_event};
pub use events::{Event, EventKind, ShotLog};
pub use evolve::{EvolveOutcome, EvolveReport, TruncationReason, evolve};
pub use system::System;
