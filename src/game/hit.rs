//! Key press resolution against the hit window.

use super::GameState;
use crate::chart::{Lane, NoteId};
use crate::rng::pick_index;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The press caught a falling note, which is gone from the lane.
    Hit { note: NoteId },
    /// Nothing to hit in that lane. `fallback` is the chart entry whose sound
    /// plays instead; `None` when the chart is empty.
    Miss { fallback: Option<NoteId> },
}

impl Outcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit { .. })
    }

    /// Chart entry to play for this press.
    pub fn sound(&self) -> Option<NoteId> {
        match *self {
            Outcome::Hit { note } => Some(note),
            Outcome::Miss { fallback } => fallback,
        }
    }
}

/// Resolve a press on `lane`.
///
/// The first active note of that lane inside the hit window (arrival order) is
/// hit. Other candidates in the same window keep falling. Without a candidate
/// the press is a miss: the penalty is applied with a floor at zero and
/// `rng_value` (in `[-1, 1]`) picks a note from the whole chart to sound.
pub fn resolve_key(lane: Lane, mut state: GameState, rng_value: f64) -> (GameState, Outcome) {
    let rules = state.rules;
    let candidate = state
        .active
        .iter()
        .position(|n| n.lane == lane && rules.in_hit_window(n.position));

    match candidate {
        Some(idx) => {
            let note = state.active.remove(idx);
            state.score = state.score.saturating_add(rules.hit_reward);
            log::debug!(
                "hit note {} in lane {} at {}",
                note.id,
                lane.number(),
                note.position
            );
            (state, Outcome::Hit { note: note.id })
        }
        None => {
            state.score = state.score.saturating_sub(rules.miss_penalty);
            let fallback = pick_index(rng_value, state.chart.len());
            if fallback.is_none() {
                log::debug!("miss on lane {} with an empty chart", lane.number());
            } else {
                log::debug!("miss on lane {}", lane.number());
            }
            (state, Outcome::Miss { fallback })
        }
    }
}
