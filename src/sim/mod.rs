//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must stay pure and
//! deterministic:
//! - Advanced only by explicit `advance_frame` calls (cadence is the
//!   scheduler's job)
//! - Seeded RNG only
//! - No I/O: rendered frames are returned to the caller, never sent
//!
//! The step functions all take `&mut RoundState`; nothing else may hold or
//! mutate round state.

mod endcheck;
mod explosion;
mod matcher;
mod scroll;
pub mod state;
pub mod tick;

pub use state::{
    ColumnGroup, EngineConfig, ExplosionState, PendingPress, RoundState, RowTrack, SpriteId,
    SpriteSlot, Tick, TrackingId,
};
pub use tick::{TickOutput, advance_frame};
