//! cue-sim demo
//!
//! Racks nine balls, breaks, and reports where everything went.
//!
//! Usage: `cue-sim [seed] [speed] [preset]`

use std::process::ExitCode;

use cue_sim::layout::{CUE_BALL_ID, nine_ball_rack};
use cue_sim::objects::Strike;
use cue_sim::{BallParams, Cue, Phase, SimPreset, SimSettings, System, Table, evolve};

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(0);
    let speed: f64 = args.next().map(|s| s.parse()).transpose()?.unwrap_or(6.0);
    let preset = match args.next() {
        Some(name) => SimPreset::from_str(&name).ok_or_else(|| format!("unknown preset {name}"))?,
        None => SimPreset::Accurate,
    };

    let table = Table::pocket_table()?;
    let balls = nine_ball_rack(&table, BallParams::default(), seed)?;
    let mut system = System::new(balls.into_values(), table, Some(Cue::new(CUE_BALL_ID)))?;

    let phi = system.aim_at_ball("1", None)?;
    system.strike(Strike { v0: speed, phi, b: 0.2, ..Default::default() })?;

    let settings = SimSettings::from_preset(preset);
    log::info!("breaking with {} preset (seed {seed}, V0 {speed} m/s)", preset.as_str());
    let report = evolve(&mut system, &settings)?;

    println!("{:?} after {} events, t = {:.3} s", report.outcome, report.events, report.t);
    let pocketed = system.pocketed();
    if pocketed.is_empty() {
        println!("nothing pocketed");
    }
    for (pocket, ids) in &pocketed {
        println!("{pocket}: {}", ids.join(", "));
    }
    for ball in system.balls().values().filter(|b| b.phase() != Phase::Pocketed) {
        println!("{:>4} at ({:.3}, {:.3})", ball.id, ball.state.r.x, ball.state.r.y);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
