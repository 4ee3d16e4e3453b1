//! Button Blast - a matching game for grids of illuminated buttons
//!
//! Each button is an independently addressable 8x8 pixel display. Sprites
//! scroll along the rows; the player presses two buttons in the same column
//! showing the same sprite to eliminate the pair. Unmatched sprites that
//! stack in a column set off a multi-stage explosion that ends the round.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (scrolling, matching, explosions)
//! - `matrix`: 8x8 pixel matrices and the row compositing canvas
//! - `layout`: Button layout model and providers
//! - `catalog`: Sprite catalog
//! - `game`: Game surface, press intake, and the 50 ms frame scheduler

pub mod catalog;
pub mod game;
pub mod layout;
pub mod matrix;
pub mod sim;

pub use catalog::SpriteCatalog;
pub use game::{BlastGame, ButtonGame, FrameSink, GameError, StatusSink};
pub use layout::{ButtonId, ButtonLayout, ButtonSlot, LayoutProvider, NoLayout, StaticLayout};
pub use matrix::{BUTTON_PIXELS, PixelMatrix, RowCanvas};
pub use sim::EngineConfig;

/// Game tuning constants
pub mod consts {
    /// Fixed scheduler period driving one simulation tick.
    pub const TICK_PERIOD_MS: u64 = 50;
    /// Scroll advances once every this many ticks by default.
    pub const DEFAULT_SPEED_MULTIPLIER: u64 = 8;
    /// A drained press stays matchable for `factor * speed_multiplier` ticks.
    pub const PRESS_WINDOW_FACTOR: u64 = 6;
    /// The explosion renders one frame every this many ticks.
    pub const EXPLOSION_STEP_TICKS: u64 = 4;
    /// Explosion frame at which every pixel lights and the round ends.
    pub const EXPLOSION_TERMINAL_FRAME: u32 = 10;
    /// Pixel code for fully lit white (0x00RRGGBB).
    pub const WHITE: u64 = 0x00FF_FFFF;
}
