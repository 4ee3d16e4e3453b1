//! Button layout model
//!
//! A layout describes where each physical (or simulated) button sits on the
//! grid. The engine consumes it read-only, taking one snapshot per round.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of one button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ButtonId(String);

impl ButtonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ButtonId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// One button's position in the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSlot {
    pub button_id: ButtonId,
    pub row_id: u32,
    pub column_id: u32,
}

/// Static collection of button positions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ButtonLayout {
    positions: Vec<ButtonSlot>,
}

impl ButtonLayout {
    pub fn new(positions: Vec<ButtonSlot>) -> Self {
        Self { positions }
    }

    /// Regular grid with `rows * cols` buttons, ids of the form `btn-r{r}c{c}`.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let mut positions = Vec::with_capacity((rows * cols) as usize);
        for row_id in 0..rows {
            for column_id in 0..cols {
                positions.push(ButtonSlot {
                    button_id: ButtonId::new(format!("btn-r{row_id}c{column_id}")),
                    row_id,
                    column_id,
                });
            }
        }
        Self { positions }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ButtonSlot> {
        self.positions.iter()
    }
}

/// Source of the current button layout. Hosts implement this; the engine
/// queries it once per round start and may find no layout at all.
pub trait LayoutProvider: Send + Sync {
    fn current_layout(&self) -> Option<ButtonLayout>;
}

/// Provider serving one fixed layout (demos and tests).
pub struct StaticLayout(pub ButtonLayout);

impl LayoutProvider for StaticLayout {
    fn current_layout(&self) -> Option<ButtonLayout> {
        Some(self.0.clone())
    }
}

/// Provider with no layout available; round start must fail against it.
pub struct NoLayout;

impl LayoutProvider for NoLayout {
    fn current_layout(&self) -> Option<ButtonLayout> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout_shape() {
        let layout = ButtonLayout::grid(2, 4);
        assert_eq!(layout.len(), 8);
        let first = layout.iter().next().unwrap();
        assert_eq!(first.button_id.as_str(), "btn-r0c0");
        assert_eq!((first.row_id, first.column_id), (0, 0));
        let last = layout.iter().last().unwrap();
        assert_eq!(last.button_id.as_str(), "btn-r1c3");
    }

    #[test]
    fn test_providers() {
        assert!(NoLayout.current_layout().is_none());
        let layout = StaticLayout(ButtonLayout::grid(1, 2)).current_layout().unwrap();
        assert_eq!(layout.len(), 2);
    }
}
