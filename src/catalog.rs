//! Sprite catalog
//!
//! Ordered list of 8x8 sprites, indexed by integer id. Loading a sheet from
//! disk is the host's job; the engine only needs the matrices. A small
//! procedural catalog is provided for demos and tests.

use crate::matrix::{BUTTON_PIXELS, PixelMatrix};

/// Ordered, immutable set of sprites for one game.
#[derive(Debug, Clone, Default)]
pub struct SpriteCatalog {
    sprites: Vec<PixelMatrix>,
}

impl SpriteCatalog {
    pub fn from_matrices(sprites: Vec<PixelMatrix>) -> Self {
        Self { sprites }
    }

    /// Deterministic built-in sprites: a handful of shapes cycled through a
    /// small color palette, distinct enough to tell apart on an 8x8 display.
    pub fn procedural(count: usize) -> Self {
        const PALETTE: [u64; 6] = [
            0x00FF_4040,
            0x0040_FF40,
            0x0040_40FF,
            0x00FF_FF40,
            0x00FF_40FF,
            0x0040_FFFF,
        ];
        let mut sprites = Vec::with_capacity(count);
        for id in 0..count {
            let color = PALETTE[id % PALETTE.len()];
            let mut m = PixelMatrix::new();
            for r in 0..BUTTON_PIXELS {
                for c in 0..BUTTON_PIXELS {
                    // Doubled coordinates keep the shapes symmetric around
                    // the half-pixel center of an even-sized grid.
                    let dr = (r as i32 * 2 - 7).abs();
                    let dc = (c as i32 * 2 - 7).abs();
                    let on = match id % 4 {
                        0 => dr + dc <= 7,                      // diamond
                        1 => dr.max(dc) == 5,                   // box outline
                        2 => dr == 1 || dc == 1,                // cross
                        _ => (r / 2 + c / 2) % 2 == 0,          // checker
                    };
                    if on {
                        m.set(r, c, color);
                    }
                }
            }
            sprites.push(m);
        }
        Self { sprites }
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    pub fn get(&self, sprite_id: usize) -> Option<&PixelMatrix> {
        self.sprites.get(sprite_id)
    }
}
