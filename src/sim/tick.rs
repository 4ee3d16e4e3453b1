//! Per-tick frame advance
//!
//! One call advances the whole simulation by a single tick: match presses,
//! check for a fatal stack, then either step the explosion (every 4th tick)
//! or scroll and render (every `speed_multiplier`-th tick).

use crate::catalog::SpriteCatalog;
use crate::consts::EXPLOSION_STEP_TICKS;
use crate::layout::ButtonId;
use crate::matrix::PixelMatrix;
use crate::sim::state::RoundState;
use crate::sim::{endcheck, explosion, matcher, scroll};

/// What one tick produced.
#[derive(Debug, Default)]
pub struct TickOutput {
    /// Frames to deliver to the display sink, one per affected button.
    pub frames: Vec<(ButtonId, PixelMatrix)>,
    /// The round is over; the caller must perform the force-end effects.
    pub round_over: bool,
}

/// Advance the round by exactly one tick. `pressed` is this tick's FIFO
/// drain of the press intake queue.
pub fn advance_frame(
    state: &mut RoundState,
    catalog: &SpriteCatalog,
    pressed: &[ButtonId],
) -> TickOutput {
    let mut out = TickOutput::default();

    if !state.exploding {
        matcher::process_presses(state, pressed);
        endcheck::scan_for_stack(state);
    }

    if state.exploding {
        if state.tick % EXPLOSION_STEP_TICKS == 0 {
            let step = explosion::step(state, catalog);
            out.frames = step.frames;
            out.round_over = step.terminal;
        }
    } else if state.tick % state.config.speed_multiplier == 0 {
        out.frames = scroll::advance_and_render(state, catalog);
    }

    state.tick += 1;
    out
}
