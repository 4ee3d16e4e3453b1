//! Round state and core simulation types
//!
//! Everything a round needs lives in `RoundState`, owned exclusively by the
//! tick handler and passed by `&mut` into each step function. Topology is
//! rebuilt from the layout snapshot each time a round starts and discarded
//! when it ends.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SPEED_MULTIPLIER, PRESS_WINDOW_FACTOR};
use crate::layout::{ButtonId, ButtonLayout};

pub type SpriteId = usize;
pub type TrackingId = u64;
pub type Tick = u64;

/// One sprite instance riding a row's train.
///
/// `tracking_id` is monotonic per round and never reused, so a specific
/// instance can be followed across frames even when two slots share a sprite
/// id. `current_buttons` holds the 0-2 buttons the sprite overlaps during
/// sub-pixel scroll; it is only maintained while the slot is visible.
#[derive(Debug, Clone)]
pub struct SpriteSlot {
    pub sprite_id: SpriteId,
    pub tracking_id: TrackingId,
    pub hidden: bool,
    pub current_buttons: Vec<ButtonId>,
}

impl SpriteSlot {
    pub fn visible(sprite_id: SpriteId, tracking_id: TrackingId) -> Self {
        Self {
            sprite_id,
            tracking_id,
            hidden: false,
            current_buttons: Vec::new(),
        }
    }

    pub fn hidden_placeholder(tracking_id: TrackingId) -> Self {
        Self {
            sprite_id: 0,
            tracking_id,
            hidden: true,
            current_buttons: Vec::new(),
        }
    }
}

/// Runtime state of one row of buttons.
///
/// The slot train carries one more slot than the row has buttons so sprites
/// can enter and exit at the edges.
#[derive(Debug, Clone)]
pub struct RowTrack {
    /// Button ids ordered left to right.
    pub buttons: Vec<ButtonId>,
    /// Odd rows scroll right-to-left.
    pub reversed: bool,
    pub slots: Vec<SpriteSlot>,
}

/// Buttons belonging to one column, ordered by row.
#[derive(Debug, Clone)]
pub struct ColumnGroup {
    pub column_id: u32,
    pub button_ids: Vec<ButtonId>,
}

/// A buffered button press, kept around long enough to pair it with a later
/// press on another button in the same column.
#[derive(Debug, Clone)]
pub struct PendingPress {
    pub button_id: ButtonId,
    pub pressed_at_tick: Tick,
    /// Sprite pairs visible at the button when the press was drained.
    pub sprites: Vec<(SpriteId, TrackingId)>,
}

/// State of the explosion animation once a fatal stack has been found.
#[derive(Debug, Clone, Default)]
pub struct ExplosionState {
    /// Buttons involved in the unresolved stack.
    pub initial_buttons: Vec<ButtonId>,
    /// Buttons currently being overlaid; refilled from `initial_buttons`
    /// whenever it runs empty.
    pub active_buttons: Vec<ButtonId>,
    /// Incremented once per explosion-render tick.
    pub frame: u32,
}

/// Engine tuning. The historical fast/slow engine variants collapse into
/// this one struct: `matching_enabled = false` reproduces the variant whose
/// press handling was disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scroll advances once every this many ticks.
    pub speed_multiplier: u64,
    /// How long a drained press stays eligible for matching.
    pub retention_window_ticks: u64,
    /// When false, presses are still drained but never matched.
    pub matching_enabled: bool,
}

impl EngineConfig {
    /// Config with the retention window derived from the scroll speed.
    pub fn with_speed(speed_multiplier: u64) -> Self {
        let speed_multiplier = speed_multiplier.max(1);
        Self {
            speed_multiplier,
            retention_window_ticks: PRESS_WINDOW_FACTOR * speed_multiplier,
            matching_enabled: true,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_speed(DEFAULT_SPEED_MULTIPLIER)
    }
}

/// Complete per-round simulation state.
#[derive(Debug, Clone)]
pub struct RoundState {
    pub(crate) config: EngineConfig,
    pub(crate) tick: Tick,
    /// Sub-pixel scroll offset. Starts at 8 so the first render pass lands on
    /// 7 without shifting; stays in [0, 7] afterwards.
    pub(crate) offset: u8,
    pub(crate) exploding: bool,
    pub(crate) explosion: Option<ExplosionState>,
    pub(crate) rows: Vec<RowTrack>,
    pub(crate) columns: Vec<ColumnGroup>,
    /// Lowest and highest column ids; sprites there are always partially
    /// off-grid, so matching and end checks skip them.
    pub(crate) boundary_columns: Vec<u32>,
    pub(crate) pending_presses: Vec<PendingPress>,
    pub(crate) next_tracking_id: TrackingId,
    pub(crate) correct_presses: u32,
    pub(crate) rng: Pcg32,
}

impl RoundState {
    /// Build fresh round topology from a layout snapshot.
    pub fn new(layout: &ButtonLayout, catalog_len: usize, config: EngineConfig, seed: u64) -> Self {
        let mut config = config;
        config.speed_multiplier = config.speed_multiplier.max(1);

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut next_tracking_id: TrackingId = 0;

        let mut by_row: std::collections::BTreeMap<u32, Vec<&crate::layout::ButtonSlot>> =
            std::collections::BTreeMap::new();
        for slot in layout.iter() {
            by_row.entry(slot.row_id).or_default().push(slot);
        }

        let mut rows = Vec::with_capacity(by_row.len());
        let mut columns: Vec<ColumnGroup> = Vec::new();
        for (row_id, mut row_slots) in by_row {
            row_slots.sort_by_key(|s| s.column_id);
            for slot in &row_slots {
                match columns.iter_mut().find(|c| c.column_id == slot.column_id) {
                    Some(group) => group.button_ids.push(slot.button_id.clone()),
                    None => columns.push(ColumnGroup {
                        column_id: slot.column_id,
                        button_ids: vec![slot.button_id.clone()],
                    }),
                }
            }

            let buttons: Vec<ButtonId> = row_slots.iter().map(|s| s.button_id.clone()).collect();
            let train_len = buttons.len() + 1;
            let mut slots = Vec::with_capacity(train_len);
            for _ in 0..train_len {
                next_tracking_id += 1;
                slots.push(SpriteSlot::hidden_placeholder(next_tracking_id));
            }
            // One sprite is already on its way in when the round starts.
            slots[0].sprite_id = rng.random_range(0..catalog_len);
            slots[0].hidden = false;

            rows.push(RowTrack {
                buttons,
                reversed: row_id % 2 == 1,
                slots,
            });
        }

        let mut boundary_columns = Vec::new();
        if let Some(min) = columns.iter().map(|c| c.column_id).min() {
            boundary_columns.push(min);
        }
        if let Some(max) = columns.iter().map(|c| c.column_id).max() {
            if !boundary_columns.contains(&max) {
                boundary_columns.push(max);
            }
        }

        Self {
            config,
            tick: 0,
            offset: 8,
            exploding: false,
            explosion: None,
            rows,
            columns,
            boundary_columns,
            pending_presses: Vec::new(),
            next_tracking_id,
            correct_presses: 0,
            rng,
        }
    }

    /// Sprite pairs currently visible at a button, in row/slot order.
    pub fn sprites_at(&self, button: &ButtonId) -> Vec<(SpriteId, TrackingId)> {
        self.rows
            .iter()
            .flat_map(|row| row.slots.iter())
            .filter(|slot| !slot.hidden && slot.current_buttons.contains(button))
            .map(|slot| (slot.sprite_id, slot.tracking_id))
            .collect()
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    pub fn is_exploding(&self) -> bool {
        self.exploding
    }

    pub fn correct_presses(&self) -> u32 {
        self.correct_presses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_row_state() -> RoundState {
        RoundState::new(&ButtonLayout::grid(2, 4), 5, EngineConfig::default(), 42)
    }

    #[test]
    fn test_topology_from_layout() {
        let state = two_row_state();
        assert_eq!(state.rows.len(), 2);
        assert!(!state.rows[0].reversed, "row 0 scrolls forward");
        assert!(state.rows[1].reversed, "row 1 scrolls reversed");
        assert_eq!(state.columns.len(), 4);
        for column in &state.columns {
            assert_eq!(column.button_ids.len(), 2);
        }
        assert_eq!(state.boundary_columns, vec![0, 3]);
        assert_eq!(state.offset, 8);
    }

    #[test]
    fn test_slot_train_is_one_longer_than_row() {
        let state = two_row_state();
        for row in &state.rows {
            assert_eq!(row.slots.len(), row.buttons.len() + 1);
        }
    }

    #[test]
    fn test_initial_slot_visibility() {
        let state = two_row_state();
        for row in &state.rows {
            assert!(!row.slots[0].hidden);
            assert!(row.slots[0].sprite_id < 5);
            for slot in &row.slots[1..] {
                assert!(slot.hidden);
            }
        }
    }

    #[test]
    fn test_tracking_ids_unique() {
        let state = two_row_state();
        let mut ids: Vec<TrackingId> = state
            .rows
            .iter()
            .flat_map(|row| row.slots.iter().map(|s| s.tracking_id))
            .collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_single_column_layout_is_all_boundary() {
        let state = RoundState::new(&ButtonLayout::grid(2, 1), 3, EngineConfig::default(), 1);
        assert_eq!(state.boundary_columns, vec![0]);
    }

    #[test]
    fn test_config_speed_is_clamped() {
        let state = RoundState::new(
            &ButtonLayout::grid(1, 2),
            3,
            EngineConfig {
                speed_multiplier: 0,
                retention_window_ticks: 0,
                matching_enabled: true,
            },
            1,
        );
        assert_eq!(state.config.speed_multiplier, 1);
    }
}
