// display size, in chip-8 pixels
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Monochrome 64x32 pixel grid.
///
/// Pixels only change through `clear` or `draw_sprite`; coordinates
/// wrap around both edges.
pub struct Framebuffer {
    pixels: [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        }
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        for row in self.pixels.iter_mut() {
            row.fill(false);
        }
    }

    /// XOR a sprite onto the grid with its top-left corner at (x, y).
    ///
    /// Each byte of `rows` is one 8 pixel wide line, most significant bit
    /// on the left. Returns true if any lit pixel was switched off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collision = false;

        for (r, byte) in rows.iter().enumerate() {
            let py = (y + r) % DISPLAY_HEIGHT;

            for b in 0..8 {
                let px = (x + b) % DISPLAY_WIDTH;
                let bit = (byte >> (7 - b)) & 1 == 1;
                let pixel = &mut self.pixels[py][px];

                if *pixel && bit {
                    collision = true;
                }
                *pixel ^= bit;
            }
        }

        collision
    }

    /// State of the pixel at (x, y). Coordinates wrap like sprites do.
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH]
    }

    /// Number of lit pixels on the whole grid
    #[cfg(test)]
    pub fn lit(&self) -> usize {
        self.pixels
            .iter()
            .map(|row| row.iter().filter(|p| **p).count())
            .sum()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
