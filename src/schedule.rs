//! Activation timeline derived from a chart.
//!
//! Every chart entry turns into one event at `start * 1000` ms: user-played
//! notes become activations, the rest are background sounds the host plays
//! directly. A single end event follows the last note once it has had time to
//! fall through the lane.

use crate::chart::{NoteDescriptor, NoteId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Activate(NoteId),
    Background(NoteId),
    EndGame,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledEvent {
    pub at_ms: f64,
    pub kind: EventKind,
}

#[derive(Clone, Debug, Default)]
pub struct Schedule {
    events: Vec<ScheduledEvent>,
    cursor: usize,
}

impl Schedule {
    /// Build the timeline. `travel_ms` is how long a note takes to fall from
    /// the top of the lane to past the exit line.
    pub fn from_chart(chart: &[NoteDescriptor], travel_ms: f64) -> Self {
        let mut events: Vec<ScheduledEvent> = chart
            .iter()
            .enumerate()
            .map(|(id, note)| ScheduledEvent {
                at_ms: note.start * 1000.0,
                kind: if note.user_played {
                    EventKind::Activate(id)
                } else {
                    EventKind::Background(id)
                },
            })
            .collect();
        // stable: chart order is kept between notes starting together
        events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));

        let last_end = chart.iter().map(|n| n.end).fold(0.0_f64, f64::max);
        let last_start = chart.iter().map(|n| n.start).fold(0.0_f64, f64::max);
        let end_at = (last_end * 1000.0).max(last_start * 1000.0 + travel_ms);
        events.push(ScheduledEvent {
            at_ms: end_at,
            kind: EventKind::EndGame,
        });

        Self { events, cursor: 0 }
    }

    /// Pop every event due at `now_ms`, in time order.
    pub fn due(&mut self, now_ms: f64) -> &[ScheduledEvent] {
        let start = self.cursor;
        while self
            .events
            .get(self.cursor)
            .is_some_and(|e| e.at_ms <= now_ms)
        {
            self.cursor += 1;
        }
        &self.events[start..self.cursor]
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.events.len()
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn end_ms(&self) -> f64 {
        self.events.last().map(|e| e.at_ms).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(user_played: bool, start: f64, end: f64) -> NoteDescriptor {
        NoteDescriptor {
            user_played,
            instrument: "piano".into(),
            velocity: 80,
            pitch: 60,
            start,
            end,
        }
    }

    #[test]
    fn events_sorted_with_end_last() {
        let chart = vec![
            note(true, 2.0, 2.5),
            note(false, 0.5, 1.0),
            note(true, 0.5, 0.75),
        ];
        let schedule = Schedule::from_chart(&chart, 1136.0);
        let kinds: Vec<_> = schedule.events().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::Background(1),
                EventKind::Activate(2),
                EventKind::Activate(0),
                EventKind::EndGame,
            ]
        );
        assert_eq!(schedule.events()[0].at_ms, 500.0);
        assert_eq!(schedule.end_ms(), 2000.0 + 1136.0);
    }

    #[test]
    fn long_last_note_pushes_end_back() {
        let chart = vec![note(false, 0.0, 10.0)];
        let schedule = Schedule::from_chart(&chart, 1136.0);
        assert_eq!(schedule.end_ms(), 10_000.0);
    }

    #[test]
    fn due_pops_in_order_once() {
        let chart = vec![note(true, 0.0, 1.0), note(true, 1.0, 2.0)];
        let mut schedule = Schedule::from_chart(&chart, 1000.0);
        assert_eq!(schedule.due(0.0).len(), 1);
        assert!(schedule.due(0.0).is_empty());
        assert!(schedule.due(999.0).is_empty());
        let next: Vec<_> = schedule.due(1000.0).iter().map(|e| e.kind).collect();
        assert_eq!(next, vec![EventKind::Activate(1)]);
        assert!(!schedule.is_exhausted());
        let rest: Vec<_> = schedule.due(5000.0).iter().map(|e| e.kind).collect();
        assert_eq!(rest, vec![EventKind::EndGame]);
        assert!(schedule.is_exhausted());
    }

    #[test]
    fn empty_chart_still_ends() {
        let mut schedule = Schedule::from_chart(&[], 1136.0);
        assert_eq!(schedule.events().len(), 1);
        assert_eq!(schedule.end_ms(), 1136.0);
        assert_eq!(schedule.due(1136.0)[0].kind, EventKind::EndGame);
    }
}
