//! Single-threaded session driver.
//!
//! Clock ticks, scheduled activations and key presses all land in one FIFO
//! queue; `drain` folds it through the reducer in arrival order and hands the
//! results to the audio and render collaborators. Sinks only ever see shared
//! references, so nothing they do can corrupt the game state.

use std::collections::VecDeque;

use crate::chart::{Lane, NoteDescriptor};
use crate::config::GameConfig;
use crate::game::{Action, GameState, reduce};
use crate::rng::Lcg;
use crate::schedule::{EventKind, Schedule};

/// Receives every note that should sound: hits, miss fallbacks and background
/// notes.
pub trait AudioSink {
    fn play(&mut self, note: &NoteDescriptor);
}

/// Receives every reduced state.
pub trait RenderSink {
    fn render(&mut self, state: &GameState);
}

pub struct Session {
    config: GameConfig,
    state: GameState,
    rng: Lcg,
    schedule: Schedule,
    queue: VecDeque<Action>,
    ticks_queued: u64,
    finished: bool,
}

impl Session {
    pub fn new(chart: Vec<NoteDescriptor>, config: GameConfig) -> Self {
        let schedule = Schedule::from_chart(&chart, config.travel_ms());
        log::info!(
            "session: {} notes ({} to play), ends at {:.0} ms, seed {}",
            chart.len(),
            chart.iter().filter(|n| n.user_played).count(),
            schedule.end_ms(),
            config.seed
        );
        Self {
            state: GameState::new(chart, config.rules),
            rng: Lcg::new(config.seed),
            schedule,
            queue: VecDeque::new(),
            ticks_queued: 0,
            finished: false,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// True once the end of the game has been reduced; no more input is taken.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn push(&mut self, action: Action) {
        if !self.finished {
            self.queue.push_back(action);
        }
    }

    /// Queue everything due by `now_ms` (milliseconds since session start).
    /// Tick `k` fires at `k * tick_ms`; ticks and scheduled events are merged
    /// by time, a tick sharing its instant with an event going first.
    /// Background notes go straight to `audio`.
    pub fn advance_clock(&mut self, now_ms: f64, audio: &mut impl AudioSink) {
        if self.finished {
            return;
        }
        let tick_ms = self.config.tick_ms;
        let due_ticks = (now_ms.max(0.0) / tick_ms).floor() as u64;
        let events = self.schedule.due(now_ms).to_vec();
        for event in events {
            let ticks_before = ((event.at_ms / tick_ms).floor() as u64).min(due_ticks);
            self.queue_ticks_until(ticks_before);
            match event.kind {
                EventKind::Activate(id) => self.queue.push_back(Action::Activate(id)),
                EventKind::Background(id) => {
                    if let Some(note) = self.state.descriptor(id) {
                        audio.play(note);
                    }
                }
                EventKind::EndGame => self.queue.push_back(Action::EndGame),
            }
        }
        self.queue_ticks_until(due_ticks);
    }

    fn queue_ticks_until(&mut self, tick: u64) {
        while self.ticks_queued < tick {
            self.queue.push_back(Action::Tick);
            self.ticks_queued += 1;
        }
    }

    /// Queue a press for the lane bound to `code`. Unbound keys are ignored.
    pub fn press_key(&mut self, code: &str) -> Option<Lane> {
        let lane = self.config.lane_for_key(code)?;
        self.push(Action::PressLane(lane));
        Some(lane)
    }

    /// Apply every queued action in order. Returns how many were applied.
    /// Once the end is reduced the rest of the queue is dropped.
    pub fn drain(&mut self, audio: &mut impl AudioSink, render: &mut impl RenderSink) -> usize {
        let mut applied = 0;
        while let Some(action) = self.queue.pop_front() {
            let r = reduce(std::mem::take(&mut self.state), action, self.rng);
            if let Some(note) = r.sound() {
                audio.play(note);
            }
            self.state = r.state;
            self.rng = r.rng;
            applied += 1;
            render.render(&self.state);

            if self.state.ended {
                self.finished = true;
                if !self.queue.is_empty() {
                    log::debug!("dropping {} actions queued after the end", self.queue.len());
                }
                self.queue.clear();
                break;
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        played: Vec<u8>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, note: &NoteDescriptor) {
            self.played.push(note.pitch);
        }
    }

    #[derive(Default)]
    struct Frames {
        scores: Vec<u32>,
    }

    impl RenderSink for Frames {
        fn render(&mut self, state: &GameState) {
            self.scores.push(state.score);
        }
    }

    fn chart() -> Vec<NoteDescriptor> {
        vec![
            NoteDescriptor {
                user_played: true,
                instrument: "piano".into(),
                velocity: 80,
                pitch: 60,
                start: 0.0,
                end: 0.5,
            },
            NoteDescriptor {
                user_played: false,
                instrument: "bass".into(),
                velocity: 90,
                pitch: 36,
                start: 0.1,
                end: 0.4,
            },
        ]
    }

    #[test]
    fn clock_queues_ticks_at_fixed_rate() {
        let mut session = Session::new(chart(), GameConfig::default());
        let mut audio = Recorder::default();
        session.advance_clock(15.9, &mut audio);
        // activation at t=0 only
        assert_eq!(session.pending(), 1);
        session.advance_clock(48.0, &mut audio);
        assert_eq!(session.pending(), 4);
        session.advance_clock(48.0, &mut audio);
        assert_eq!(session.pending(), 4);

        let applied = session.drain(&mut audio, &mut Frames::default());
        assert_eq!(applied, 4);
        assert_eq!(session.state().elapsed_ticks, 3);
        assert_eq!(session.state().active[0].position, 15.0);
    }

    #[test]
    fn background_notes_play_without_touching_state() {
        let mut session = Session::new(chart(), GameConfig::default());
        let mut audio = Recorder::default();
        session.advance_clock(100.0, &mut audio);
        assert_eq!(audio.played, vec![36]);
        session.drain(&mut audio, &mut Frames::default());
        assert_eq!(session.state().active.len(), 1);
        assert!(!session.state().was_spawned(1));
    }

    #[test]
    fn key_press_hits_and_sounds() {
        let mut session = Session::new(chart(), GameConfig::default());
        let mut audio = Recorder::default();
        let mut frames = Frames::default();
        // activation at t=0, then 64 ticks of 16 ms bring the note to the hit window
        session.advance_clock(64.0 * 16.0, &mut audio);
        session.drain(&mut audio, &mut frames);
        assert_eq!(session.state().active[0].position, 320.0);

        assert_eq!(session.press_key("KeyH"), Some(Lane::One));
        assert_eq!(session.press_key("Space"), None);
        session.drain(&mut audio, &mut frames);
        assert_eq!(session.state().score, 10);
        assert!(session.state().active.is_empty());
        assert_eq!(audio.played, vec![36, 60]);
        assert_eq!(frames.scores.last(), Some(&10));
    }

    #[test]
    fn end_drops_queue_and_stops_input() {
        let config = GameConfig::default();
        let end = Schedule::from_chart(&chart(), config.travel_ms()).end_ms();
        let mut session = Session::new(chart(), config);
        let mut audio = Recorder::default();
        session.advance_clock(end, &mut audio);
        session.push(Action::PressLane(Lane::Two));
        session.drain(&mut audio, &mut Frames::default());
        assert!(session.is_finished());
        assert!(session.state().ended);
        assert_eq!(session.pending(), 0);

        session.press_key("KeyJ");
        session.advance_clock(end + 1000.0, &mut audio);
        assert_eq!(session.pending(), 0);
        assert_eq!(session.drain(&mut audio, &mut Frames::default()), 0);
    }

    #[test]
    fn render_called_once_per_action() {
        let mut session = Session::new(chart(), GameConfig::default());
        let mut frames = Frames::default();
        session.push(Action::Tick);
        session.push(Action::PressLane(Lane::Three));
        session.push(Action::Tick);
        session.drain(&mut Recorder::default(), &mut frames);
        assert_eq!(frames.scores, vec![0, 0, 0]);
    }
}
