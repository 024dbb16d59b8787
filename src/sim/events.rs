//! Events and the shot log

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::objects::{Ball, BallState, Phase};

/// What happened, and to whom.
///
/// Variant order is the tie-break priority for simultaneous events; equal kinds are
/// then ordered by participant ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Brackets the start and end of a shot
    None,
    StickBall { cue: String, ball: String },
    BallBall { a: String, b: String },
    BallLinearCushion { ball: String, cushion: String },
    BallCircularCushion { ball: String, cushion: String },
    BallPocket { ball: String, pocket: String },
    SlidingRolling { ball: String },
    RollingSpinning { ball: String },
    RollingStationary { ball: String },
    SpinningStationary { ball: String },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::None => "none",
            EventKind::StickBall { .. } => "stick_ball",
            EventKind::BallBall { .. } => "ball_ball",
            EventKind::BallLinearCushion { .. } => "ball_linear_cushion",
            EventKind::BallCircularCushion { .. } => "ball_circular_cushion",
            EventKind::BallPocket { .. } => "ball_pocket",
            EventKind::SlidingRolling { .. } => "sliding_rolling",
            EventKind::RollingSpinning { .. } => "rolling_spinning",
            EventKind::RollingStationary { .. } => "rolling_stationary",
            EventKind::SpinningStationary { .. } => "spinning_stationary",
        }
    }

    /// Phase-change event for a ball leaving `from` for `to`
    pub fn transition(ball: &str, from: Phase, to: Phase) -> Option<Self> {
        let ball = ball.to_string();
        match (from, to) {
            (Phase::Sliding, Phase::Rolling) => Some(EventKind::SlidingRolling { ball }),
            (Phase::Rolling, Phase::Spinning) => Some(EventKind::RollingSpinning { ball }),
            (Phase::Rolling, Phase::Stationary) => Some(EventKind::RollingStationary { ball }),
            (Phase::Spinning, Phase::Stationary) => Some(EventKind::SpinningStationary { ball }),
            _ => None,
        }
    }

    /// Phase a transition event leads to
    pub fn target_phase(&self) -> Option<Phase> {
        match self {
            EventKind::SlidingRolling { .. } => Some(Phase::Rolling),
            EventKind::RollingSpinning { .. } => Some(Phase::Spinning),
            EventKind::RollingStationary { .. } | EventKind::SpinningStationary { .. } => {
                Some(Phase::Stationary)
            }
            _ => None,
        }
    }

    /// Ids of the balls taking part
    pub fn balls(&self) -> Vec<&str> {
        match self {
            EventKind::None => Vec::new(),
            EventKind::BallBall { a, b } => vec![a.as_str(), b.as_str()],
            EventKind::StickBall { ball, .. }
            | EventKind::BallLinearCushion { ball, .. }
            | EventKind::BallCircularCushion { ball, .. }
            | EventKind::BallPocket { ball, .. }
            | EventKind::SlidingRolling { ball }
            | EventKind::RollingSpinning { ball }
            | EventKind::RollingStationary { ball }
            | EventKind::SpinningStationary { ball } => vec![ball.as_str()],
        }
    }

    /// Ids of every agent taking part: balls, cue, cushions, pockets
    pub fn agents(&self) -> Vec<&str> {
        let mut ids = self.balls();
        match self {
            EventKind::StickBall { cue, .. } => ids.insert(0, cue.as_str()),
            EventKind::BallLinearCushion { cushion, .. }
            | EventKind::BallCircularCushion { cushion, .. } => ids.push(cushion.as_str()),
            EventKind::BallPocket { pocket, .. } => ids.push(pocket.as_str()),
            _ => {}
        }
        ids
    }

    pub fn involves(&self, id: &str) -> bool {
        self.agents().contains(&id)
    }

    /// Whether this event may move a ball from phase `from` to phase `to`
    pub fn permits(&self, from: Phase, to: Phase) -> bool {
        match self {
            EventKind::None => from == to,
            EventKind::StickBall { .. }
            | EventKind::BallBall { .. }
            | EventKind::BallLinearCushion { .. }
            | EventKind::BallCircularCushion { .. } => {
                from != Phase::Pocketed && to == Phase::Sliding
            }
            EventKind::BallPocket { .. } => from.is_energetic() && to == Phase::Pocketed,
            EventKind::SlidingRolling { .. } => from == Phase::Sliding && to == Phase::Rolling,
            EventKind::RollingSpinning { .. } => from == Phase::Rolling && to == Phase::Spinning,
            EventKind::RollingStationary { .. } => {
                from == Phase::Rolling && to == Phase::Stationary
            }
            EventKind::SpinningStationary { .. } => {
                from == Phase::Spinning && to == Phase::Stationary
            }
        }
    }
}

/// A resolved event. Never modified once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Absolute time (s since the shot started)
    pub time: f64,
    /// Time since the previous event
    pub elapsed: f64,
    /// Participating balls before resolution
    pub initial: BTreeMap<String, BallState>,
    /// Participating balls after resolution
    pub after: BTreeMap<String, BallState>,
}

impl Event {
    /// Every participant's phase change is allowed for this kind
    pub fn is_valid(&self) -> bool {
        self.initial.iter().all(|(id, before)| {
            self.after.get(id).is_some_and(|after| self.kind.permits(before.phase, after.phase))
        })
    }
}

/// Append-only record of one shot: the events and per-ball state histories
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShotLog {
    events: Vec<Event>,
    histories: BTreeMap<String, Vec<BallState>>,
}

impl ShotLog {
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn history(&self, ball_id: &str) -> Option<&[BallState]> {
        self.histories.get(ball_id).map(Vec::as_slice)
    }

    pub fn histories(&self) -> &BTreeMap<String, Vec<BallState>> {
        &self.histories
    }

    /// Events of one kind, by `EventKind::name`
    pub fn filter_kind<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.kind.name() == name)
    }

    /// Events an agent took part in
    pub fn filter_agent<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.kind.involves(id))
    }

    pub(crate) fn push(&mut self, event: Event) -> &Event {
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Append the current state of every ball to its history
    pub(crate) fn record<'a>(&mut self, balls: impl IntoIterator<Item = &'a Ball>) {
        for ball in balls {
            self.histories.entry(ball.id.clone()).or_default().push(ball.state);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.events.clear();
        self.histories.clear();
    }
}
