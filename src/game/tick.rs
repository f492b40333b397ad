//! Fixed-rate advance of the falling notes.

use super::GameState;

/// Move every active note down one step. Notes past the exit threshold move to
/// `exited` in the same tick, appended in their `active` order.
pub fn advance(mut state: GameState) -> GameState {
    let step = state.rules.step;
    let exit = state.rules.exit_threshold;
    let (staying, leaving): (Vec<_>, Vec<_>) = std::mem::take(&mut state.active)
        .into_iter()
        .map(|n| n.fallen(step))
        .partition(|n| n.position <= exit);
    for n in &leaving {
        log::trace!("note {} left lane {:?} unplayed", n.id, n.lane);
    }
    state.active = staying;
    state.exited.extend(leaving);
    state.elapsed_ticks += 1;
    state
}
