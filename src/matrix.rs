//! Pixel matrices for 8x8 button displays
//!
//! `PixelMatrix` is the fixed-size image one button shows. `RowCanvas` is the
//! oversized compositing surface for a whole row of buttons: sprites are
//! merged in at sub-button horizontal offsets, then the canvas is sliced back
//! into one `PixelMatrix` per button.

use serde::{Deserialize, Serialize};

/// Side length of one button display, in pixels.
pub const BUTTON_PIXELS: usize = 8;

/// Fixed 8x8 grid of pixel color codes. Zero means dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelMatrix {
    pixels: [[u64; BUTTON_PIXELS]; BUTTON_PIXELS],
}

impl PixelMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.pixels[row][col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, color: u64) {
        self.pixels[row][col] = color;
    }

    /// Merge another matrix onto this one at an offset. Non-zero source
    /// pixels overwrite; zero source pixels leave the destination alone.
    /// Source pixels falling outside the 8x8 destination are clipped.
    pub fn merge(&mut self, src: &PixelMatrix, row_off: usize, col_off: usize) {
        for r in 0..BUTTON_PIXELS {
            for c in 0..BUTTON_PIXELS {
                let color = src.pixels[r][c];
                if color == 0 {
                    continue;
                }
                let (dr, dc) = (r + row_off, c + col_off);
                if dr < BUTTON_PIXELS && dc < BUTTON_PIXELS {
                    self.pixels[dr][dc] = color;
                }
            }
        }
    }

    /// Set every pixel to the given color.
    pub fn fill(&mut self, color: u64) {
        self.pixels = [[color; BUTTON_PIXELS]; BUTTON_PIXELS];
    }

    /// Number of non-zero pixels.
    pub fn lit_count(&self) -> usize {
        self.pixels
            .iter()
            .flatten()
            .filter(|&&p| p != 0)
            .count()
    }
}

/// Compositing surface spanning a whole row of buttons (8 rows of pixels,
/// `buttons * 8` columns).
#[derive(Debug, Clone)]
pub struct RowCanvas {
    width_px: usize,
    pixels: Vec<u64>,
}

impl RowCanvas {
    pub fn new(buttons: usize) -> Self {
        let width_px = buttons * BUTTON_PIXELS;
        Self {
            width_px,
            pixels: vec![0; width_px * BUTTON_PIXELS],
        }
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width_px + col
    }

    /// Merge a sprite at a horizontal pixel offset. The offset may be
    /// negative or run past the right edge; out-of-range columns are clipped
    /// so sprites can slide on and off the row.
    pub fn merge_sprite(&mut self, sprite: &PixelMatrix, start_col: isize) {
        for r in 0..BUTTON_PIXELS {
            for c in 0..BUTTON_PIXELS {
                let color = sprite.get(r, c);
                if color == 0 {
                    continue;
                }
                let dst = start_col + c as isize;
                if dst >= 0 && (dst as usize) < self.width_px {
                    let idx = self.index(r, dst as usize);
                    self.pixels[idx] = color;
                }
            }
        }
    }

    /// Extract the 8x8 window for the button at the given index.
    pub fn extract(&self, button_index: usize) -> PixelMatrix {
        let base = button_index * BUTTON_PIXELS;
        let mut out = PixelMatrix::new();
        for r in 0..BUTTON_PIXELS {
            for c in 0..BUTTON_PIXELS {
                out.set(r, c, self.pixels[self.index(r, base + c)]);
            }
        }
        out
    }
}
