use std::fmt;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// The original implementation of the Chip-8 language used a 64x32-pixel monochrome display with this format:
/// ( 0, 0)   (63, 0)
/// ( 0,31)   (63,31)
///
/// Every cell holds either 0 or 1, rows are stored one after another.
pub struct Display([u8; DISPLAY_WIDTH * DISPLAY_HEIGHT]);

impl Display {
    pub fn new() -> Self {
        Display([0; DISPLAY_WIDTH * DISPLAY_HEIGHT])
    }

    pub fn clear(&mut self) {
        self.0.fill(0);
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.0[self.compute_idx(x, y)]
    }

    /// Flips the pixel at position (`x`, `y`) and returns `true`
    /// if the pixel was cleared.
    ///
    /// Coordinates past either edge are moved back onto the screen by
    /// exactly one width or height. Anything still off screen after that
    /// is not drawn.
    pub fn set_pixel(&mut self, x: isize, y: isize) -> bool {
        let (x, y) = match (wrap_once(x, DISPLAY_WIDTH), wrap_once(y, DISPLAY_HEIGHT)) {
            (Some(x), Some(y)) => (x, y),
            _ => return false,
        };

        let idx = self.compute_idx(x, y);
        self.0[idx] ^= 1;

        self.0[idx] == 0
    }

    pub fn compute_idx(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }

    pub fn pixels(&self) -> &[u8] {
        &self.0
    }

    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }
}

fn wrap_once(value: isize, size: usize) -> Option<usize> {
    let size = size as isize;
    let value = if value >= size {
        value - size
    } else if value < 0 {
        value + size
    } else {
        value
    };

    if (0..size).contains(&value) {
        Some(value as usize)
    } else {
        None
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.0.chunks(DISPLAY_WIDTH) {
            let line: String = row.iter().map(|p| if *p == 1 { '█' } else { ' ' }).collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
