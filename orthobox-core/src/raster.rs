/// A 1-bit image drawn in the current color.
///
/// Rows run bottom-up, each packed MSB-first into `ceil(width / 8)` bytes
/// with no extra row alignment. After drawing, the raster position advances
/// by `(x_move, y_move)` pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub x_orig: f32,
    pub y_orig: f32,
    pub x_move: f32,
    pub y_move: f32,
    pub bits: Vec<u8>,
}

impl Bitmap {
    /// Returns `None` when `bits` is too short for the given size
    pub fn new(width: u32, height: u32, bits: Vec<u8>) -> Option<Self> {
        let needed = row_stride(width) * height as usize;
        if bits.len() < needed {
            return None;
        }
        Some(Self {
            width,
            height,
            x_orig: 0.0,
            y_orig: 0.0,
            x_move: 0.0,
            y_move: 0.0,
            bits,
        })
    }

    pub fn with_origin(mut self, x_orig: f32, y_orig: f32) -> Self {
        self.x_orig = x_orig;
        self.y_orig = y_orig;
        self
    }

    pub fn with_advance(mut self, x_move: f32, y_move: f32) -> Self {
        self.x_move = x_move;
        self.y_move = y_move;
        self
    }

    pub fn row_stride(&self) -> usize {
        row_stride(self.width)
    }

    /// Whether the bit at column `x` of row `y` (counted from the bottom) is set
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.bits[y as usize * self.row_stride() + x as usize / 8];
        byte & (0x80 >> (x % 8)) != 0
    }

    /// Offsets of all set bits relative to the bitmap origin
    pub fn set_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width)
                .filter(move |&x| self.is_set(x, y))
                .map(move |x| (x, y))
        })
    }
}

fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Stem rows, then the head narrowing to its tip
#[rustfmt::skip]
const ARROW_BITS: [u8; 20] = [
    0x1c, 0x00, 0x1c, 0x00, 0x1c, 0x00, 0x1c, 0x00, 0x1c, 0x00,
    0xff, 0x80, 0x7f, 0x00, 0x3e, 0x00, 0x1c, 0x00, 0x08, 0x00,
];

/// Upward arrow, 9 pixels wide and 10 tall
pub fn arrow_bitmap() -> Bitmap {
    Bitmap {
        width: 9,
        height: 10,
        x_orig: 0.0,
        y_orig: 0.0,
        x_move: 0.0,
        y_move: 0.0,
        bits: ARROW_BITS.to_vec(),
    }
}

/// An RGB image, rows stored bottom-up
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl Pixmap {
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self {
            width,
            height,
            pixels: vec![rgb; width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn set(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = rgb;
        }
    }
}
