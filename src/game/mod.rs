//! Falling-note game state and the reducer that drives it.
//!
//! The whole game is a fold over a closed set of actions:
//!
//! - `Tick` moves every active note down one step and retires the ones past
//!   the exit line ([`tick::advance`]).
//! - `Activate` puts a user-played note at the top of its lane.
//! - `PressLane` resolves a key press against the hit window of that lane
//!   ([`hit::resolve_key`]).
//! - `EndGame` closes the session.
//!
//! `GameState` is moved into [`reduce`] and a whole successor is handed back,
//! together with the advanced RNG and the outcome of a key press. Nothing else
//! ever mutates it.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::chart::{Lane, NoteDescriptor, NoteId};
use crate::config::Rules;
use crate::error::ActionError;
use crate::rng::Lcg;

pub mod hit;
pub mod tick;

pub use hit::Outcome;

/// A user-played note currently falling down its lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveNote {
    pub id: NoteId,
    pub lane: Lane,
    pub position: f64,
}

impl ActiveNote {
    fn spawn(id: NoteId, descriptor: &NoteDescriptor) -> Self {
        Self {
            id,
            lane: descriptor.lane(),
            position: 0.0,
        }
    }

    pub(crate) fn fallen(self, step: f64) -> Self {
        Self {
            position: self.position + step,
            ..self
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub ended: bool,
    pub chart: Rc<[NoteDescriptor]>,
    pub score: u32,
    pub elapsed_ticks: u64,
    pub active: Vec<ActiveNote>,
    pub exited: Vec<ActiveNote>,
    pub rules: Rules,
    // One flag per chart entry; a note is spawned at most once per session.
    spawned: Vec<bool>,
}

impl GameState {
    pub fn new(chart: impl Into<Rc<[NoteDescriptor]>>, rules: Rules) -> Self {
        let chart = chart.into();
        let spawned = vec![false; chart.len()];
        Self {
            ended: false,
            chart,
            score: 0,
            elapsed_ticks: 0,
            active: Vec::new(),
            exited: Vec::new(),
            rules,
            spawned,
        }
    }

    pub fn descriptor(&self, id: NoteId) -> Option<&NoteDescriptor> {
        self.chart.get(id)
    }

    pub fn was_spawned(&self, id: NoteId) -> bool {
        self.spawned.get(id).copied().unwrap_or(false)
    }

    /// Spawn the note at the top of its lane. Unknown ids, background notes and
    /// notes already spawned leave the state untouched.
    fn activate(mut self, id: NoteId) -> Self {
        let Some(descriptor) = self.chart.get(id) else {
            log::warn!("activation for unknown note {id} ignored");
            return self;
        };
        if !descriptor.user_played || self.spawned[id] {
            return self;
        }
        let note = ActiveNote::spawn(id, descriptor);
        self.spawned[id] = true;
        self.active.push(note);
        self
    }

    fn end(mut self) -> Self {
        if !self.ended {
            log::info!(
                "game over: score {} after {} ticks",
                self.score,
                self.elapsed_ticks
            );
        }
        self.ended = true;
        self.active.clear();
        self
    }

    /// Plain view of the state for host pages.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            ended: self.ended,
            score: self.score,
            elapsed_ticks: self.elapsed_ticks,
            active: self
                .active
                .iter()
                .map(|n| (n.lane.number(), n.position))
                .collect(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState::new(Vec::new(), Rules::default())
    }
}

/// Render-facing copy of the interesting parts of a `GameState`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Snapshot {
    pub ended: bool,
    pub score: u32,
    pub elapsed_ticks: u64,
    /// `(lane number, position)` per active note, in order of arrival.
    pub active: Vec<(u8, f64)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Tick,
    Activate(NoteId),
    PressLane(Lane),
    EndGame,
}

impl FromStr for Action {
    type Err = ActionError;

    /// `tick`, `activate:<id>`, `press:<1-4>` or `end`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ActionError::UnknownAction(s.to_string());
        let s_trim = s.trim();
        match s_trim.split_once(':') {
            None => match s_trim {
                "tick" => Ok(Action::Tick),
                "end" => Ok(Action::EndGame),
                _ => Err(unknown()),
            },
            Some(("activate", id)) => id.parse().map(Action::Activate).map_err(|_| unknown()),
            Some(("press", n)) => n
                .parse()
                .ok()
                .and_then(Lane::from_number)
                .map(Action::PressLane)
                .ok_or_else(unknown),
            Some(_) => Err(unknown()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "tick"),
            Action::Activate(id) => write!(f, "activate:{id}"),
            Action::PressLane(lane) => write!(f, "press:{}", lane.number()),
            Action::EndGame => write!(f, "end"),
        }
    }
}

/// Result of applying one action.
#[derive(Clone, Debug)]
pub struct Reduction {
    pub state: GameState,
    pub rng: Lcg,
    /// Set for `PressLane` only.
    pub outcome: Option<Outcome>,
}

impl Reduction {
    /// The note whose sound the host should play, if any.
    pub fn sound(&self) -> Option<&NoteDescriptor> {
        self.outcome
            .and_then(|o| o.sound())
            .and_then(|id| self.state.descriptor(id))
    }
}

pub fn reduce(state: GameState, action: Action, rng: Lcg) -> Reduction {
    match action {
        Action::Tick => Reduction {
            state: tick::advance(state),
            rng,
            outcome: None,
        },
        Action::Activate(id) => Reduction {
            state: state.activate(id),
            rng,
            outcome: None,
        },
        Action::PressLane(lane) => {
            let (value, rng) = rng.draw();
            let (state, outcome) = hit::resolve_key(lane, state, value);
            Reduction {
                state,
                rng,
                outcome: Some(outcome),
            }
        }
        Action::EndGame => Reduction {
            state: state.end(),
            rng,
            outcome: None,
        },
    }
}

/// Fold a fixed action list from a fresh session.
pub fn replay(
    chart: impl Into<Rc<[NoteDescriptor]>>,
    rules: Rules,
    seed: u32,
    actions: impl IntoIterator<Item = Action>,
) -> GameState {
    let mut state = GameState::new(chart, rules);
    let mut rng = Lcg::new(seed);
    for action in actions {
        let r = reduce(state, action, rng);
        state = r.state;
        rng = r.rng;
    }
    state
}
