//! Next-event detection
//!
//! Every candidate event is reduced to a time from now; the earliest wins. Candidates
//! within `EPS_TIME` of the earliest are treated as simultaneous and the smallest
//! `EventKind` among them is chosen.

use crate::consts::EPS_TIME;
use crate::math::{self, QuarticSolver};
use crate::objects::{Ball, Phase};
use crate::physics::{ball_ball_coeffs, ball_circle_coeffs, ball_linear_cushion_time, transition};

use super::events::EventKind;
use super::system::System;

/// A detected event and the time until it happens
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub dt: f64,
    pub kind: EventKind,
}

/// Earliest upcoming event, or `None` once nothing can happen any more
pub fn next_event(system: &System, solver: QuarticSolver) -> Option<Candidate> {
    let armed = system
        .cue()
        .filter(|c| c.pending)
        .filter(|c| system.ball(&c.cue_ball_id).is_some_and(|b| b.phase() != Phase::Pocketed));
    if let Some(cue) = armed {
        return Some(Candidate {
            dt: 0.0,
            kind: EventKind::StickBall { cue: cue.id.clone(), ball: cue.cue_ball_id.clone() },
        });
    }

    let mut candidates = Vec::new();
    transitions(system, &mut candidates);
    ball_ball(system, solver, &mut candidates);
    cushions_and_pockets(system, solver, &mut candidates);
    select(candidates)
}

fn transitions(system: &System, out: &mut Vec<Candidate>) {
    for ball in system.balls().values() {
        let Some((to, dt)) = transition(&ball.state, &ball.params) else {
            continue;
        };
        if let Some(kind) = EventKind::transition(&ball.id, ball.phase(), to) {
            out.push(Candidate { dt, kind });
        }
    }
}

fn ball_ball(system: &System, solver: QuarticSolver, out: &mut Vec<Candidate>) {
    let balls: Vec<&Ball> =
        system.balls().values().filter(|b| b.phase() != Phase::Pocketed).collect();

    let mut rows = Vec::new();
    let mut pairs = Vec::new();
    for (i, b1) in balls.iter().enumerate() {
        for b2 in &balls[i + 1..] {
            if !b1.phase().is_translating() && !b2.phase().is_translating() {
                continue;
            }
            // Already touching or overlapping: the contact has just been resolved
            let gap = (b2.state.r - b1.state.r).truncate().length();
            if gap < b1.radius() + b2.radius() {
                continue;
            }
            rows.push(ball_ball_coeffs(&b1.state, &b1.params, &b2.state, &b2.params));
            pairs.push((b1.id.clone(), b2.id.clone()));
        }
    }

    let times = math::min_real_roots(&rows, solver);
    for (dt, (a, b)) in times.into_iter().zip(pairs) {
        out.push(Candidate { dt, kind: EventKind::BallBall { a, b } });
    }
}

fn cushions_and_pockets(system: &System, solver: QuarticSolver, out: &mut Vec<Candidate>) {
    let table = system.table();
    for ball in system.balls().values().filter(|b| b.phase().is_translating()) {
        for (id, segment) in table.linear_segments() {
            out.push(Candidate {
                dt: ball_linear_cushion_time(&ball.state, &ball.params, segment, solver),
                kind: EventKind::BallLinearCushion { ball: ball.id.clone(), cushion: id.clone() },
            });
        }

        let mut rows = Vec::new();
        let mut kinds = Vec::new();
        for (id, segment) in table.circular_segments() {
            let reach = segment.radius + ball.radius();
            rows.push(ball_circle_coeffs(&ball.state, &ball.params, segment.center, reach));
            kinds.push(EventKind::BallCircularCushion {
                ball: ball.id.clone(),
                cushion: id.clone(),
            });
        }
        for (id, pocket) in table.pockets() {
            rows.push(ball_circle_coeffs(&ball.state, &ball.params, pocket.center, pocket.radius));
            kinds.push(EventKind::BallPocket { ball: ball.id.clone(), pocket: id.clone() });
        }
        for (dt, kind) in math::min_real_roots(&rows, solver).into_iter().zip(kinds) {
            out.push(Candidate { dt, kind });
        }
    }
}

fn select(candidates: Vec<Candidate>) -> Option<Candidate> {
    let earliest = candidates.iter().map(|c| c.dt).fold(f64::INFINITY, f64::min);
    if !earliest.is_finite() {
        return None;
    }
    candidates
        .into_iter()
        .filter(|c| c.dt <= earliest + EPS_TIME)
        .min_by(|a, b| a.kind.cmp(&b.kind))
}
