//! Imagery for the 5×5 LED matrix

pub const WIDTH: usize = 5;
pub const HEIGHT: usize = 5;

/// Brightness of a lit pixel
pub const FULL: u8 = 255;

/// Frame of the LED matrix with one brightness value per pixel, row major
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Image([[u8; WIDTH]; HEIGHT]);

impl Image {
    pub const BLANK: Self = Self::filled(0);

    #[rustfmt::skip]
    pub const CROSS: Self = Self::from_rows([
        [FULL, 0, 0, 0, FULL],
        [0, FULL, 0, FULL, 0],
        [0, 0, FULL, 0, 0],
        [0, FULL, 0, FULL, 0],
        [FULL, 0, 0, 0, FULL],
    ]);

    pub const fn filled(brightness: u8) -> Self {
        Self([[brightness; WIDTH]; HEIGHT])
    }

    pub const fn from_rows(rows: [[u8; WIDTH]; HEIGHT]) -> Self {
        Self(rows)
    }

    /// Brightness at column `x` of row `y`, zero outside the matrix
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.0
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(0)
    }

    /// Sets a pixel, ignoring coordinates outside the matrix
    pub fn set_pixel(&mut self, x: usize, y: usize, brightness: u8) {
        if let Some(pixel) = self.0.get_mut(y).and_then(|row| row.get_mut(x)) {
            *pixel = brightness;
        }
    }

    pub fn rows(&self) -> &[[u8; WIDTH]; HEIGHT] {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        *self == Self::BLANK
    }
}

impl Default for Image {
    fn default() -> Self {
        Self::BLANK
    }
}

/// Glyph rows with the leftmost column in bit 4
type Glyph = [u8; HEIGHT];

#[rustfmt::skip]
const DIGITS: [Glyph; 10] = [
    [0b01110, 0b10011, 0b10101, 0b11001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110],
    [0b11100, 0b00010, 0b01100, 0b10000, 0b11110],
    [0b11110, 0b00010, 0b00100, 0b10010, 0b01100],
    [0b00110, 0b01010, 0b10010, 0b11111, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110],
    [0b00010, 0b00100, 0b01110, 0b10001, 0b01110],
    [0b11111, 0b00010, 0b00100, 0b01000, 0b10000],
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b01110, 0b00100, 0b01000],
];

const SPACE: Glyph = [0; HEIGHT];
const LOWER_M: Glyph = [0b00000, 0b11010, 0b10101, 0b10101, 0b10101];
const UPPER_V: Glyph = [0b10001, 0b10001, 0b10001, 0b01010, 0b00100];
const MINUS: Glyph = [0b00000, 0b00000, 0b01110, 0b00000, 0b00000];
const DOT: Glyph = [0b00000, 0b00000, 0b00000, 0b00000, 0b00100];
const UNKNOWN: Glyph = [0b01110, 0b10001, 0b00110, 0b00000, 0b00100];

fn glyph(c: char) -> &'static Glyph {
    match c {
        '0'..='9' => &DIGITS[c as usize - '0' as usize],
        ' ' => &SPACE,
        'm' => &LOWER_M,
        'V' => &UPPER_V,
        '-' => &MINUS,
        '.' => &DOT,
        _ => &UNKNOWN,
    }
}

/// Columns per character, glyph plus one column of spacing
const CHARACTER_PITCH: usize = WIDTH + 1;

/// Frames of text scrolling right to left across the matrix.
///
/// The text enters from a blank matrix and leaves it blank again, moving by
/// one column per frame.
pub struct Scroller<'t> {
    text: &'t str,
    characters: usize,
    offset: usize,
}

impl<'t> Scroller<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            characters: text.chars().count(),
            offset: 0,
        }
    }

    /// Total number of frames the animation consists of
    pub fn frame_count(&self) -> usize {
        // Leading blank window, every character, and the trailing columns
        // needed to push the final spacing column out of view
        WIDTH + self.characters * CHARACTER_PITCH
    }

    /// Pixel column `index` of the virtual strip the window slides over
    fn column(&self, index: usize) -> [bool; HEIGHT] {
        let mut column = [false; HEIGHT];

        let Some(text_index) = index.checked_sub(WIDTH) else {
            return column;
        };

        let character = text_index / CHARACTER_PITCH;
        let x = text_index % CHARACTER_PITCH;
        if x >= WIDTH {
            return column;
        }

        if let Some(c) = self.text.chars().nth(character) {
            let glyph = glyph(c);
            for (y, lit) in column.iter_mut().enumerate() {
                *lit = glyph[y] & (1 << (WIDTH - 1 - x)) != 0;
            }
        }

        column
    }
}

impl<'t> Iterator for Scroller<'t> {
    type Item = Image;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.frame_count() {
            return None;
        }

        let mut image = Image::BLANK;
        for x in 0..WIDTH {
            for (y, lit) in self.column(self.offset + x).into_iter().enumerate() {
                if lit {
                    image.set_pixel(x, y, FULL);
                }
            }
        }

        self.offset += 1;
        Some(image)
    }
}
