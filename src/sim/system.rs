//! The simulated system: balls, table, cue, clock and shot log

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::events::{Event, EventKind, ShotLog};
use crate::error::{GeometryError, SimError};
use crate::objects::{Ball, BallState, Cue, Phase, Strike, Table};
use crate::physics::evolve_state;
use crate::resolve::{Resolver, ball_ball, ball_cushion, ball_pocket, stick_ball, transition};

/// Everything one shot acts on. Owned by the caller; `evolve` borrows it mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
    balls: BTreeMap<String, Ball>,
    table: Table,
    cue: Option<Cue>,
    t: f64,
    #[serde(default)]
    log: ShotLog,
}

impl System {
    /// Build a system, rejecting duplicate ball ids, invalid ball parameters, balls
    /// that overlap and a cue aimed at a missing ball.
    pub fn new(
        balls: impl IntoIterator<Item = Ball>,
        table: Table,
        cue: Option<Cue>,
    ) -> Result<Self, SimError> {
        let mut map = BTreeMap::new();
        for ball in balls {
            if map.contains_key(&ball.id) {
                return Err(GeometryError::DuplicateId { what: "ball", id: ball.id }.into());
            }
            map.insert(ball.id.clone(), ball);
        }
        let system = Self { balls: map, table, cue, t: 0.0, log: ShotLog::default() };
        system.validate()?;
        Ok(system)
    }

    /// Re-check every construction invariant (used after deserializing)
    pub fn validate(&self) -> Result<(), SimError> {
        self.table.validate()?;
        for (id, ball) in &self.balls {
            if *id != ball.id {
                let msg = format!("ball stored under {id} has id {}", ball.id);
                return Err(GeometryError::InvalidSpecs(msg).into());
            }
            ball.params.validate(id)?;
        }
        let on_table: Vec<&Ball> =
            self.balls.values().filter(|b| b.phase() != Phase::Pocketed).collect();
        for (i, b1) in on_table.iter().enumerate() {
            for b2 in &on_table[i + 1..] {
                let gap = (b2.state.r - b1.state.r).truncate().length();
                if gap < b1.radius() + b2.radius() {
                    return Err(GeometryError::OverlappingBalls {
                        a: b1.id.clone(),
                        b: b2.id.clone(),
                    }
                    .into());
                }
            }
        }
        if let Some(cue) = &self.cue {
            self.ball_checked(&cue.cue_ball_id)?;
        }
        Ok(())
    }

    pub fn balls(&self) -> &BTreeMap<String, Ball> {
        &self.balls
    }

    pub fn ball(&self, id: &str) -> Option<&Ball> {
        self.balls.get(id)
    }

    fn ball_checked(&self, id: &str) -> Result<&Ball, SimError> {
        self.balls.get(id).ok_or_else(|| SimError::UnknownBall(id.to_string()))
    }

    /// Overwrite a ball's state, e.g. to place it by hand between shots
    pub fn set_ball_state(&mut self, id: &str, state: BallState) -> Result<(), SimError> {
        let ball = ball_mut(&mut self.balls, id)?;
        ball.state = state;
        Ok(())
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn cue(&self) -> Option<&Cue> {
        self.cue.as_ref()
    }

    pub(crate) fn cue_mut(&mut self) -> Result<&mut Cue, SimError> {
        self.cue.as_mut().ok_or(SimError::NoCue)
    }

    pub fn set_cue(&mut self, cue: Cue) -> Result<(), SimError> {
        self.ball_checked(&cue.cue_ball_id)?;
        self.cue = Some(cue);
        Ok(())
    }

    /// The ball the cue is addressing
    pub fn cue_ball(&self) -> Result<&Ball, SimError> {
        let cue = self.cue.as_ref().ok_or(SimError::NoCue)?;
        self.ball_checked(&cue.cue_ball_id)
    }

    /// Current time (s since the shot started)
    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn log(&self) -> &ShotLog {
        &self.log
    }

    pub fn events(&self) -> &[Event] {
        self.log.events()
    }

    pub fn history(&self, ball_id: &str) -> Option<&[BallState]> {
        self.log.history(ball_id)
    }

    /// Total kinetic energy of all balls
    pub fn energy(&self) -> f64 {
        self.balls.values().map(Ball::energy).sum()
    }

    /// No ball is moving and no strike is waiting
    pub fn is_settled(&self) -> bool {
        let pending = self.cue.as_ref().is_some_and(|c| c.pending);
        !pending && !self.balls.values().any(|b| b.phase().is_energetic())
    }

    /// Ids of the balls in each pocket, for pockets holding any
    pub fn pocketed(&self) -> BTreeMap<&str, Vec<&str>> {
        self.table
            .pockets()
            .values()
            .filter(|p| !p.contains.is_empty())
            .map(|p| (p.id.as_str(), p.contains.iter().map(String::as_str).collect()))
            .collect()
    }

    /// Arm the cue with `strike`; the next `evolve` resolves it first
    pub fn strike(&mut self, strike: Strike) -> Result<(), SimError> {
        strike.validate()?;
        let cue_ball = self.cue_ball()?;
        if cue_ball.phase() == Phase::Pocketed {
            return Err(SimError::PocketedAgent(cue_ball.id.clone()));
        }
        let cue = self.cue_mut()?;
        cue.strike = strike;
        cue.pending = true;
        log::info!(
            "strike armed: V0={:.3} phi={:.2} theta={:.2} a={:.2} b={:.2}",
            strike.v0,
            strike.phi,
            strike.theta,
            strike.a,
            strike.b
        );
        Ok(())
    }

    /// Clear the shot log and ball histories and restart the clock
    pub fn start_new_shot(&mut self) {
        self.log.clear();
        self.t = 0.0;
        for ball in self.balls.values_mut() {
            ball.state.t = 0.0;
        }
    }

    /// Move every ball `dt` seconds forward within its current phase
    pub fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        for ball in self.balls.values_mut() {
            ball.state = evolve_state(&ball.state, &ball.params, dt);
        }
        self.t += dt;
    }

    /// Resolve `kind` at the current time and append it to the shot log.
    ///
    /// Only the participants are modified. On error nothing is modified or logged.
    pub fn resolve_event(
        &mut self,
        kind: EventKind,
        resolver: &Resolver,
    ) -> Result<&Event, SimError> {
        let mut initial = BTreeMap::new();
        for id in kind.balls() {
            let ball = self.ball_checked(id)?;
            if ball.phase() == Phase::Pocketed {
                return Err(SimError::PocketedAgent(id.to_string()));
            }
            initial.insert(id.to_string(), ball.state);
        }

        self.apply(&kind, resolver)?;

        let mut after = BTreeMap::new();
        for id in initial.keys() {
            let ball = self.ball_checked(id)?;
            if !kind.permits(initial[id].phase, ball.phase()) {
                log::warn!(
                    "{} moved ball {id} from {} to {}",
                    kind.name(),
                    initial[id].phase.as_str(),
                    ball.phase().as_str()
                );
            }
            after.insert(id.clone(), ball.state);
        }

        let previous = self.log.last_event().map_or(0.0, |e| e.time);
        let event = Event { kind, time: self.t, elapsed: self.t - previous, initial, after };
        log::debug!("t={:.6} {} {:?}", event.time, event.kind.name(), event.kind.agents());
        self.log.record(self.balls.values());
        Ok(self.log.push(event))
    }

    fn apply(&mut self, kind: &EventKind, resolver: &Resolver) -> Result<(), SimError> {
        match kind {
            EventKind::None => {}
            EventKind::StickBall { ball, .. } => {
                let cue = self.cue.as_mut().ok_or(SimError::NoCue)?;
                let target = ball_mut(&mut self.balls, ball)?;
                stick_ball::resolve(cue, target);
                cue.pending = false;
            }
            EventKind::BallBall { a, b } => {
                let mut b1 = self.ball_checked(a)?.clone();
                let mut b2 = self.ball_checked(b)?.clone();
                let iterations = resolver.ball_ball_iterations;
                ball_ball::resolve(resolver.ball_ball, &mut b1, &mut b2, iterations)?;
                self.balls.insert(a.clone(), b1);
                self.balls.insert(b.clone(), b2);
            }
            EventKind::BallLinearCushion { ball, cushion } => {
                let segment = self
                    .table
                    .linear_segment(cushion)
                    .ok_or_else(|| SimError::UnknownCushion(cushion.clone()))?;
                let target = ball_mut(&mut self.balls, ball)?;
                ball_cushion::resolve_linear(resolver.ball_linear_cushion, target, segment);
            }
            EventKind::BallCircularCushion { ball, cushion } => {
                let segment = self
                    .table
                    .circular_segment(cushion)
                    .ok_or_else(|| SimError::UnknownCushion(cushion.clone()))?;
                let target = ball_mut(&mut self.balls, ball)?;
                ball_cushion::resolve_circular(resolver.ball_circular_cushion, target, segment);
            }
            EventKind::BallPocket { ball, pocket } => {
                let hole = self
                    .table
                    .pocket_mut(pocket)
                    .ok_or_else(|| SimError::UnknownPocket(pocket.clone()))?;
                let target = ball_mut(&mut self.balls, ball)?;
                ball_pocket::resolve(target, hole);
                log::info!("ball {ball} pocketed in {pocket} at t={:.4}", self.t);
            }
            EventKind::SlidingRolling { ball }
            | EventKind::RollingSpinning { ball }
            | EventKind::RollingStationary { ball }
            | EventKind::SpinningStationary { ball } => {
                let target = ball_mut(&mut self.balls, ball)?;
                if let Some(to) = kind.target_phase() {
                    transition::resolve(target, to);
                }
            }
        }
        Ok(())
    }

    /// Place the xy position of a ball, keeping it on the cloth at rest
    pub fn place_ball(&mut self, id: &str, x: f64, y: f64) -> Result<(), SimError> {
        let ball = ball_mut(&mut self.balls, id)?;
        let rest = BallState::at_rest(DVec3::new(x, y, ball.params.r));
        ball.state = BallState { t: ball.state.t, ..rest };
        Ok(())
    }
}

fn ball_mut<'a>(balls: &'a mut BTreeMap<String, Ball>, id: &str) -> Result<&'a mut Ball, SimError> {
    balls.get_mut(id).ok_or_else(|| SimError::UnknownBall(id.to_string()))
}
