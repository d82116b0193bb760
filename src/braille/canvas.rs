/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 pixel grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
#[derive(Clone)]
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Bit pattern per char, row-major
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective pixel resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    /// Pixel width (2 dots per character)
    pub fn pixel_width(&self) -> usize {
        self.width * 2
    }

    /// Pixel height (4 dots per character)
    pub fn pixel_height(&self) -> usize {
        self.height * 4
    }

    /// Set a pixel at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        self.cells[cy * self.width + cx] |= bit;
    }

    /// Set a pixel using signed coordinates (ignores negative values)
    #[inline]
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Set a horizontal run of pixels `[x0, x1]` on row `y`, clipped to the canvas.
    pub fn fill_span(&mut self, x0: i32, x1: i32, y: i32) {
        if y < 0 || y as usize >= self.pixel_height() {
            return;
        }
        let lo = x0.max(0);
        let hi = x1.min(self.pixel_width() as i32 - 1);
        for x in lo..=hi {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Braille character for a cell, `None` when no dot is set.
    #[inline]
    pub fn cell(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        match self.cells[row * self.width + col] {
            0 => None,
            b => char::from_u32(0x2800 + b as u32),
        }
    }

    /// True when no dot has been set
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }

    /// Convert the canvas to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| {
                row.iter()
                    .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_string(), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn test_fill_span_clips() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.fill_span(-5, 100, 0);
        // Top row of both cells: 0x01 | 0x08
        assert_eq!(canvas.to_string(), "⠉⠉");
        canvas.fill_span(0, 3, -1);
        canvas.fill_span(0, 3, 4);
        assert_eq!(canvas.to_string(), "⠉⠉");
    }

    #[test]
    fn test_cell_lookup() {
        let mut canvas = BrailleCanvas::new(3, 2);
        assert!(canvas.is_empty());
        canvas.set_pixel(5, 7);
        assert_eq!(canvas.cell(2, 1), Some('⢀'));
        assert_eq!(canvas.cell(0, 0), None);
        assert_eq!(canvas.cell(9, 9), None);
        assert!(!canvas.is_empty());
    }
}
