//! Seeded ball racks
//!
//! Racks are reproducible from a seed: ball order and the small placement jitter both
//! come from a `Pcg32` stream.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::{GeometryError, SimError};
use crate::objects::{Ball, BallParams, Table};

/// Id of the cue ball in generated racks
pub const CUE_BALL_ID: &str = "cue";

/// Nominal gap between neighbouring rack balls (m)
const RACK_GAP: f64 = 1e-3;
/// Per-axis jitter bound. Two neighbours can close by at most 2·√2·this, which stays
/// below `RACK_GAP`.
const JITTER: f64 = 0.3 * RACK_GAP;

/// Nine-ball diamond on the foot spot, with the cue ball on the head spot.
///
/// The 1 is at the apex and the 9 in the middle; the rest are shuffled.
pub fn nine_ball_rack(
    table: &Table,
    params: BallParams,
    seed: u64,
) -> Result<BTreeMap<String, Ball>, SimError> {
    params.validate("rack")?;
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut others: Vec<u32> = (2..=8).collect();
    others.shuffle(&mut rng);
    let mut others = others.into_iter();

    let spacing = 2.0 * params.r + RACK_GAP;
    let row_step = spacing * 3f64.sqrt() / 2.0;
    let (cx, foot) = (table.w / 2.0, 0.75 * table.l);

    let back = foot + 4.0 * row_step + params.r;
    if back >= table.l || spacing * 3.0 > table.w {
        return Err(GeometryError::InvalidSpecs(format!(
            "table {}x{} too small for a nine-ball rack",
            table.w, table.l
        ))
        .into());
    }

    let mut balls = BTreeMap::new();
    for (row, count) in [1usize, 2, 3, 2, 1].into_iter().enumerate() {
        for slot in 0..count {
            let number = match (row, slot) {
                (0, _) => 1,
                (2, 1) => 9,
                _ => others.next().unwrap_or(0),
            };
            let column = slot as f64 - (count - 1) as f64 / 2.0;
            let dx = column * spacing + rng.random_range(-JITTER..=JITTER);
            let dy = row as f64 * row_step + rng.random_range(-JITTER..=JITTER);
            let id = number.to_string();
            balls.insert(id.clone(), Ball::new(id, cx + dx, foot + dy, params));
        }
    }
    balls.insert(CUE_BALL_ID.to_string(), Ball::new(CUE_BALL_ID, cx, 0.25 * table.l, params));

    log::debug!("racked nine balls (seed {seed})");
    Ok(balls)
}
