//! End-of-round detection
//!
//! Right after a scroll-shift (offset exactly 0), every non-boundary column
//! is scanned top to bottom for two buttons showing the same sprite id. The
//! first collision found arms the explosion; later columns in the same pass
//! are never merged in.

use crate::layout::ButtonId;
use crate::sim::state::{ExplosionState, RoundState, SpriteId};

/// Scan for a fatal stack and arm the explosion if one is found.
pub(crate) fn scan_for_stack(state: &mut RoundState) {
    if state.offset != 0 || state.exploding {
        return;
    }

    let mut collided: Option<Vec<ButtonId>> = None;
    'columns: for column in &state.columns {
        if state.boundary_columns.contains(&column.column_id) {
            continue;
        }
        let mut seen: Vec<(SpriteId, ButtonId)> = Vec::new();
        let mut duplicate: Option<(SpriteId, ButtonId)> = None;
        for button in &column.button_ids {
            let Some((sprite_id, _)) = state.sprites_at(button).into_iter().next() else {
                continue;
            };
            if duplicate.is_none() && seen.iter().any(|(seen_id, _)| *seen_id == sprite_id) {
                duplicate = Some((sprite_id, button.clone()));
            }
            seen.push((sprite_id, button.clone()));
        }
        // Finish the column before reporting so every button holding the
        // stacked sprite is included, then stop: first column wins.
        if let Some((sprite_id, collider)) = duplicate {
            let mut nodes = vec![collider.clone()];
            nodes.extend(
                seen.iter()
                    .filter(|(seen_id, b)| *seen_id == sprite_id && *b != collider)
                    .map(|(_, b)| b.clone()),
            );
            collided = Some(nodes);
            break 'columns;
        }
    }

    if let Some(nodes) = collided {
        log::info!("unmatched stack across {} button(s), arming explosion", nodes.len());
        state.exploding = true;
        let tracker = state.explosion.get_or_insert_with(ExplosionState::default);
        tracker.initial_buttons.extend(nodes);
    }
}
