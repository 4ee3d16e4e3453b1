//! Explosion state machine
//!
//! Once a fatal stack is found the affected buttons are overlaid with an
//! escalating destruction pattern, one explosion frame every fourth tick.
//! Frame 10 lights the whole button and ends the round.

use rand::Rng;

use crate::catalog::SpriteCatalog;
use crate::consts::{EXPLOSION_TERMINAL_FRAME, WHITE};
use crate::layout::ButtonId;
use crate::matrix::{BUTTON_PIXELS, PixelMatrix};
use crate::sim::scroll;
use crate::sim::state::RoundState;

/// Output of one explosion step.
#[derive(Debug, Default)]
pub(crate) struct ExplosionStep {
    pub frames: Vec<(ButtonId, PixelMatrix)>,
    /// The terminal frame was rendered; the round must force-end once the
    /// current tick finishes.
    pub terminal: bool,
}

/// Render one explosion frame over a fresh scroll snapshot of the affected
/// buttons and advance the explosion frame counter.
pub(crate) fn step(state: &mut RoundState, catalog: &SpriteCatalog) -> ExplosionStep {
    // Fresh snapshot at the current offset; scrolling itself is frozen while
    // the explosion runs.
    let snapshot: std::collections::HashMap<ButtonId, PixelMatrix> =
        scroll::render_all(state, catalog).into_iter().collect();

    let Some(mut tracker) = state.explosion.take() else {
        return ExplosionStep::default();
    };
    if tracker.active_buttons.is_empty() {
        tracker.active_buttons = tracker.initial_buttons.clone();
    }

    let frame = tracker.frame;
    let mut overlay = PixelMatrix::new();
    stamp(&mut overlay, 3, 3, &[(0, 0), (0, 1), (1, 0), (1, 1)]);
    if frame >= 2 {
        stamp(
            &mut overlay,
            1,
            1,
            &[(0, 0), (0, 5), (1, 4), (3, 5), (5, 2), (5, 4)],
        );
    }
    if frame >= 3 {
        stamp(&mut overlay, 2, 2, &[(0, 0), (0, 3), (3, 0), (3, 3)]);
        for _ in 0..(BUTTON_PIXELS as u32 * frame) {
            let r = state.rng.random_range(0..BUTTON_PIXELS);
            let c = state.rng.random_range(0..BUTTON_PIXELS);
            overlay.set(r, c, WHITE);
        }
    }
    let terminal = frame >= EXPLOSION_TERMINAL_FRAME;
    if terminal {
        overlay.fill(WHITE);
    }

    let mut frames = Vec::with_capacity(tracker.active_buttons.len());
    for button in &tracker.active_buttons {
        let mut image = snapshot.get(button).copied().unwrap_or_default();
        image.merge(&overlay, 0, 0);
        frames.push((button.clone(), image));
    }

    tracker.frame += 1;
    state.explosion = Some(tracker);
    ExplosionStep { frames, terminal }
}

fn stamp(overlay: &mut PixelMatrix, row_off: usize, col_off: usize, pixels: &[(usize, usize)]) {
    for &(r, c) in pixels {
        overlay.set(r + row_off, c + col_off, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ButtonLayout;
    use crate::sim::state::{EngineConfig, ExplosionState};

    fn exploding_state() -> (RoundState, SpriteCatalog) {
        let catalog = SpriteCatalog::procedural(4);
        let mut state = RoundState::new(
            &ButtonLayout::grid(2, 4),
            catalog.len(),
            EngineConfig::default(),
            31,
        );
        // Blank background keeps the overlay pixel counts exact.
        for row in &mut state.rows {
            for slot in &mut row.slots {
                slot.hidden = true;
            }
        }
        let target = state.rows[0].buttons[1].clone();
        state.exploding = true;
        state.explosion = Some(ExplosionState {
            initial_buttons: vec![target],
            active_buttons: Vec::new(),
            frame: 0,
        });
        (state, catalog)
    }

    #[test]
    fn test_first_frame_is_small_center_block() {
        let (mut state, catalog) = exploding_state();
        let out = step(&mut state, &catalog);
        assert!(!out.terminal);
        assert_eq!(out.frames.len(), 1);
        let image = &out.frames[0].1;
        assert_eq!(image.lit_count(), 4);
        for (r, c) in [(3, 3), (3, 4), (4, 3), (4, 4)] {
            assert_eq!(image.get(r, c), WHITE);
        }
    }

    #[test]
    fn test_overlay_escalates() {
        let (mut state, catalog) = exploding_state();
        let first = step(&mut state, &catalog).frames[0].1.lit_count();
        step(&mut state, &catalog);
        let third = step(&mut state, &catalog).frames[0].1.lit_count();
        assert!(third > first, "frame 2 adds the scatter pattern");
    }

    #[test]
    fn test_active_buttons_refilled_from_initial() {
        let (mut state, catalog) = exploding_state();
        step(&mut state, &catalog);
        let tracker = state.explosion.as_ref().unwrap();
        assert_eq!(tracker.active_buttons, tracker.initial_buttons);
    }

    #[test]
    fn test_terminal_frame_lights_everything() {
        let (mut state, catalog) = exploding_state();
        let mut terminal = None;
        for _ in 0..=EXPLOSION_TERMINAL_FRAME {
            let out = step(&mut state, &catalog);
            if out.terminal {
                terminal = Some(out);
                break;
            }
        }
        let out = terminal.expect("terminal frame within 11 steps");
        assert_eq!(state.explosion.as_ref().unwrap().frame, EXPLOSION_TERMINAL_FRAME + 1);
        assert_eq!(out.frames[0].1.lit_count(), BUTTON_PIXELS * BUTTON_PIXELS);
    }

    #[test]
    fn test_frame_counter_advances_once_per_step() {
        let (mut state, catalog) = exploding_state();
        for expected in 1..=4 {
            step(&mut state, &catalog);
            assert_eq!(state.explosion.as_ref().unwrap().frame, expected);
        }
    }
}
