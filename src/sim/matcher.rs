//! Press matcher
//!
//! Turns drained press events into pending presses and hides sprite pairs
//! the player matched within the retention window. Matching pairs presses by
//! column: two live presses in one column whose buttons show the same sprite
//! id eliminate every slot carrying one of the pressed tracking ids.

use std::collections::{HashMap, HashSet};

use crate::layout::ButtonId;
use crate::sim::state::{PendingPress, RoundState, SpriteId, TrackingId};

/// One matcher pass: record freshly drained presses, resolve matches, prune
/// expired entries. Presses on boundary columns never match (sprites there
/// are partially off-grid).
pub(crate) fn process_presses(state: &mut RoundState, pressed: &[ButtonId]) {
    if !state.config.matching_enabled {
        // The intake queue is still drained by the caller so it cannot grow
        // without bound; the presses just never score.
        return;
    }

    for button in pressed {
        let sprites = state.sprites_at(button);
        state.pending_presses.push(PendingPress {
            button_id: button.clone(),
            pressed_at_tick: state.tick,
            sprites,
        });
    }

    let visible: HashSet<TrackingId> = state
        .rows
        .iter()
        .flat_map(|row| row.slots.iter())
        .filter(|slot| !slot.hidden)
        .map(|slot| slot.tracking_id)
        .collect();

    let mut to_hide: HashSet<TrackingId> = HashSet::new();
    let mut matched_groups = 0u32;
    for column in &state.columns {
        if state.boundary_columns.contains(&column.column_id) {
            continue;
        }
        let in_column: Vec<&PendingPress> = state
            .pending_presses
            .iter()
            .filter(|p| column.button_ids.contains(&p.button_id))
            .collect();
        if in_column.len() < 2 {
            continue;
        }
        let mut by_sprite: HashMap<SpriteId, Vec<TrackingId>> = HashMap::new();
        for press in &in_column {
            for (sprite_id, tracking_id) in &press.sprites {
                by_sprite.entry(*sprite_id).or_default().push(*tracking_id);
            }
        }
        for tracking_ids in by_sprite.into_values() {
            if tracking_ids.len() > 1 {
                // Count each elimination once, even though stale pending
                // presses keep re-matching already-hidden slots until expiry.
                if tracking_ids.iter().any(|t| visible.contains(t)) {
                    matched_groups += 1;
                }
                to_hide.extend(tracking_ids);
            }
        }
    }

    if !to_hide.is_empty() {
        for row in &mut state.rows {
            for slot in &mut row.slots {
                if to_hide.contains(&slot.tracking_id) {
                    slot.hidden = true;
                }
            }
        }
        if matched_groups > 0 {
            state.correct_presses += matched_groups;
            log::debug!(
                "matched {} sprite pair(s), {} total this round",
                matched_groups,
                state.correct_presses
            );
        }
    }

    let tick = state.tick;
    let window = state.config.retention_window_ticks;
    state
        .pending_presses
        .retain(|p| p.pressed_at_tick + window >= tick);
}
