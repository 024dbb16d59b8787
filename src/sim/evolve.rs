//! The event loop
//!
//! Detect the next event, advance every ball to it, resolve it, repeat until nothing
//! is moving or a safety bound is hit.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::detect::next_event;
use super::events::EventKind;
use super::system::System;
use crate::error::SimError;
use crate::resolve::Resolver;
use crate::settings::SimSettings;

/// Safety bound that stopped a shot early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TruncationReason {
    EventLimit,
    TimeLimit,
    WallClock,
    /// A ball still has energy but no future event exists for it
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolveOutcome {
    /// Every ball is stationary or pocketed
    Settled,
    Truncated(TruncationReason),
}

/// Summary of one `evolve` call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolveReport {
    pub outcome: EvolveOutcome,
    /// Physical events resolved, excluding the bracketing markers
    pub events: usize,
    /// System time when the call returned
    pub t: f64,
}

impl EvolveReport {
    pub fn is_settled(&self) -> bool {
        self.outcome == EvolveOutcome::Settled
    }
}

/// Run the shot to completion.
///
/// The shot is bracketed by `EventKind::None` events. Truncation is not an error; a
/// resolver failure aborts the call with the system left at the failing event.
pub fn evolve(system: &mut System, settings: &SimSettings) -> Result<EvolveReport, SimError> {
    let resolver = Resolver::from_settings(settings);
    let started = Instant::now();
    let energy = system.energy();

    system.resolve_event(EventKind::None, &resolver)?;

    let mut events = 0;
    let outcome = loop {
        if settings
            .wall_clock_limit
            .is_some_and(|limit| started.elapsed().as_secs_f64() > limit)
        {
            break EvolveOutcome::Truncated(TruncationReason::WallClock);
        }

        let Some(next) = next_event(system, settings.solver) else {
            if system.is_settled() {
                break EvolveOutcome::Settled;
            }
            break EvolveOutcome::Truncated(TruncationReason::Stalled);
        };

        if events >= settings.max_events {
            break EvolveOutcome::Truncated(TruncationReason::EventLimit);
        }
        if let Some(t_final) = settings.t_final {
            if system.t() + next.dt > t_final {
                system.advance(t_final - system.t());
                break EvolveOutcome::Truncated(TruncationReason::TimeLimit);
            }
        }

        system.advance(next.dt);
        system.resolve_event(next.kind, &resolver)?;
        events += 1;
    };

    system.resolve_event(EventKind::None, &resolver)?;

    let report = EvolveReport { outcome, events, t: system.t() };
    match outcome {
        EvolveOutcome::Settled => log::info!(
            "shot settled after {events} events at t={:.4}s \
             ({:.2?} wall, energy {energy:.4} J -> {:.4} J)",
            report.t,
            started.elapsed(),
            system.energy()
        ),
        EvolveOutcome::Truncated(reason) => log::warn!(
            "shot truncated ({reason:?}) after {events} events at t={:.4}s",
            report.t
        ),
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;
    use crate::objects::{Ball, BallParams, BallState, Cue, Phase, Strike, Table};
    use std::collections::BTreeMap;
    use crate::physics::rolling_spin;
    use crate::resolve::{BallBallModel, CushionModel};
    use crate::settings::SimPreset;
    use glam::DVec3;
    use proptest::prelude::*;

    fn break_shot(seed: u64) -> System {
        let table = Table::pocket_table().unwrap();
        let balls = layout::nine_ball_rack(&table, BallParams::default(), seed).unwrap();
        let mut sys = System::new(balls.into_values(), table, Some(Cue::new("cue"))).unwrap();
        let phi = sys.aim_at_ball("1", None).unwrap();
        sys.strike(Strike { v0: 6.0, phi, b: 0.2, ..Default::default() }).unwrap();
        sys
    }

    fn assert_energy_monotone(sys: &System) {
        for event in sys.events() {
            if matches!(event.kind, EventKind::StickBall { .. }) {
                continue;
            }
            let energy = |states: &BTreeMap<String, BallState>| -> f64 {
                states.iter().map(|(id, s)| s.energy(&sys.ball(id).unwrap().params)).sum()
            };
            let (before, after) = (energy(&event.initial), energy(&event.after));
            assert!(after <= before * (1.0 + 1e-9) + 1e-12, "{} gained energy", event.kind.name());
        }
    }

    fn slow_roll() -> System {
        let p = BallParams::default();
        let mut sys = System::new(
            vec![Ball::new("cue", 0.5, 0.3, p)],
            Table::pocket_table().unwrap(),
            Some(Cue::new("cue")),
        )
        .unwrap();
        sys.strike(Strike { v0: 0.2, phi: 90.0, b: 0.0, ..Default::default() }).unwrap();
        sys
    }

    #[test]
    fn test_single_ball_rolls_to_rest() {
        let mut sys = slow_roll();
        let report = evolve(&mut sys, &SimSettings::default()).unwrap();
        assert!(report.is_settled());
        assert!(sys.is_settled());

        let names: Vec<&str> = sys.events().iter().map(|e| e.kind.name()).collect();
        assert_eq!(names, ["none", "stick_ball", "sliding_rolling", "rolling_stationary", "none"]);
        assert_eq!(report.events, 3);

        let end = sys.ball("cue").unwrap().state;
        assert_eq!(end.phase, Phase::Stationary);
        assert!(end.r.y > 0.3);
        assert!((end.r.x - 0.5).abs() < 1e-12);
        assert_eq!(sys.history("cue").map(<[_]>::len), Some(5));
    }

    #[test]
    fn test_break_settles_with_valid_phases() {
        let mut sys = break_shot(7);
        let report = evolve(&mut sys, &SimSettings::default()).unwrap();
        assert!(report.is_settled());
        assert!(sys.events().iter().all(|e| e.is_valid()));
        assert!(sys.events().windows(2).all(|w| w[1].time >= w[0].time));
        assert_energy_monotone(&sys);
        for ball in sys.balls().values() {
            assert!(!ball.phase().is_energetic());
            if ball.phase() != Phase::Pocketed {
                // Jaws reach a little past the rails
                let (r, margin) = (ball.state.r, 0.1);
                let (w, l) = (sys.table().w, sys.table().l);
                let inside =
                    r.x > -margin && r.x < w + margin && r.y > -margin && r.y < l + margin;
                assert!(inside, "{} left the table", ball.id);
            }
        }
    }

    #[test]
    fn test_pocketed_balls_are_recorded() {
        let mut sys = break_shot(3);
        evolve(&mut sys, &SimSettings::default()).unwrap();
        for (pocket, ids) in sys.pocketed() {
            for id in ids {
                let ball = sys.ball(id).unwrap();
                assert_eq!(ball.phase(), Phase::Pocketed);
                let mut pockets = sys.log().filter_kind("ball_pocket");
                assert!(pockets.any(|e| e.kind.involves(id) && e.kind.involves(pocket)));
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let run = || {
            let mut sys = break_shot(11);
            evolve(&mut sys, &SimSettings::default()).unwrap();
            sys
        };
        let (a, b) = (run(), run());
        assert_eq!(a.events().len(), b.events().len());
        for (x, y) in a.balls().values().zip(b.balls().values()) {
            let bits = |ball: &Ball| ball.state.r.to_array().map(f64::to_bits);
            assert_eq!(bits(x), bits(y));
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_independent_systems_on_threads() {
        let mut systems: Vec<System> = (0..4).map(break_shot).collect();
        std::thread::scope(|s| {
            for sys in systems.iter_mut() {
                s.spawn(move || evolve(sys, &SimSettings::default()).unwrap());
            }
        });
        let mut again = break_shot(2);
        evolve(&mut again, &SimSettings::default()).unwrap();
        assert_eq!(systems[2], again);
    }

    #[test]
    fn test_event_limit_truncates() {
        let mut sys = break_shot(1);
        let settings = SimSettings { max_events: 5, ..Default::default() };
        let report = evolve(&mut sys, &settings).unwrap();
        assert_eq!(report.outcome, EvolveOutcome::Truncated(TruncationReason::EventLimit));
        assert_eq!(report.events, 5);
        assert_eq!(sys.events().len(), 7);
    }

    #[test]
    fn test_event_limit_equal_to_event_count_settles() {
        let mut sys = slow_roll();
        let settings = SimSettings { max_events: 3, ..Default::default() };
        let report = evolve(&mut sys, &settings).unwrap();
        assert_eq!(report.outcome, EvolveOutcome::Settled);
        assert_eq!(report.events, 3);
        assert!(sys.is_settled());

        let mut sys = slow_roll();
        let settings = SimSettings { max_events: 2, ..Default::default() };
        let report = evolve(&mut sys, &settings).unwrap();
        assert_eq!(report.outcome, EvolveOutcome::Truncated(TruncationReason::EventLimit));
        assert_eq!(report.events, 2);
    }

    #[test]
    fn test_spinning_ball_without_spin_friction_is_not_settled() {
        let p = BallParams::default();
        let spinning = Ball::with_state(
            "cue",
            p,
            BallState {
                r: DVec3::new(0.5, 0.5, p.r),
                w: DVec3::new(0.0, 0.0, 20.0),
                phase: Phase::Spinning,
                ..Default::default()
            },
        );
        let sys = System::new(vec![spinning], Table::billiard_table().unwrap(), None).unwrap();

        // Deserializing skips construction checks, so the loop has to cope on its own
        let mut value = serde_json::to_value(&sys).unwrap();
        value["balls"]["cue"]["params"]["u_sp"] = serde_json::json!(0.0);
        let mut sys: System = serde_json::from_value(value).unwrap();
        assert!(sys.validate().is_err());

        let report = evolve(&mut sys, &SimSettings::default()).unwrap();
        assert_eq!(report.outcome, EvolveOutcome::Truncated(TruncationReason::Stalled));
        assert!(!report.is_settled());
        assert!(!sys.is_settled());
        assert_eq!(sys.ball("cue").unwrap().phase(), Phase::Spinning);
    }

    #[test]
    fn test_time_limit_truncates() {
        let mut sys = break_shot(1);
        let settings = SimSettings { t_final: Some(0.5), ..Default::default() };
        let report = evolve(&mut sys, &settings).unwrap();
        assert_eq!(report.outcome, EvolveOutcome::Truncated(TruncationReason::TimeLimit));
        assert!((sys.t() - 0.5).abs() < 1e-12);
        assert!(!sys.is_settled());
    }

    #[test]
    fn test_wall_clock_truncates() {
        let mut sys = break_shot(1);
        let settings = SimSettings { wall_clock_limit: Some(0.0), ..Default::default() };
        let report = evolve(&mut sys, &settings).unwrap();
        assert_eq!(report.outcome, EvolveOutcome::Truncated(TruncationReason::WallClock));
    }

    #[test]
    fn test_fast_preset_settles() {
        let mut sys = break_shot(5);
        let report = evolve(&mut sys, &SimSettings::from_preset(SimPreset::Fast)).unwrap();
        assert!(report.is_settled());
        assert_energy_monotone(&sys);
    }

    #[test]
    fn test_continuing_after_truncation() {
        let mut sys = break_shot(9);
        evolve(&mut sys, &SimSettings { max_events: 10, ..Default::default() }).unwrap();
        let report = evolve(&mut sys, &SimSettings::default()).unwrap();
        assert!(report.is_settled());
    }

    #[test]
    fn test_nothing_to_do() {
        let p = BallParams::default();
        let table = Table::billiard_table().unwrap();
        let mut sys = System::new(vec![Ball::new("cue", 0.5, 0.5, p)], table, None).unwrap();
        let report = evolve(&mut sys, &SimSettings::default()).unwrap();
        assert!(report.is_settled());
        assert_eq!(report.events, 0);
        assert_eq!(sys.events().len(), 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn test_random_shots_lose_energy(
            speed in 0.3..3.0f64,
            heading in 0.0..360.0f64,
            wz in -40.0..40.0f64,
            elastic in any::<bool>(),
        ) {
            let p = BallParams::default();
            let (sin, cos) = heading.to_radians().sin_cos();
            let v = DVec3::new(speed * cos, speed * sin, 0.0);
            let moving = Ball::with_state(
                "cue",
                p,
                BallState {
                    r: DVec3::new(0.5, 0.6, p.r),
                    v,
                    w: rolling_spin(v, p.r, wz),
                    phase: Phase::Rolling,
                    t: 0.0,
                },
            );
            let balls = vec![
                moving,
                Ball::new("1", 0.45, 1.1, p),
                Ball::new("2", 0.7, 1.4, p),
                Ball::new("3", 0.2, 0.3, p),
            ];
            let mut sys = System::new(balls, Table::pocket_table().unwrap(), None).unwrap();
            let settings = SimSettings {
                ball_ball: if elastic {
                    BallBallModel::FrictionlessElastic
                } else {
                    BallBallModel::FrictionalMathavan
                },
                ball_linear_cushion: if elastic {
                    CushionModel::Reflect
                } else {
                    CushionModel::Han2005
                },
                ..Default::default()
            };
            let before = sys.energy();
            let report = evolve(&mut sys, &settings).unwrap();
            prop_assert!(report.is_settled());
            prop_assert!(sys.energy() <= before);
            assert_energy_monotone(&sys);
        }
    }
}
