/*
 *  font.rs
 *
 *  tideclock - worth the wait
 *  (c) 2020-26 Stuart Hunter
 *
 *  Built-in 7 row bitmap font, glyph lookup and text normalization
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

/// Rows in every glyph of the built-in font
pub const FONT_HEIGHT: usize = 7;

/// Lit cell marker in [`FONT_ROWS`]
const LIT: u8 = b'X';

/// All glyphs laid end to end, one string per row.
/// Index 0 is the BOTTOM row, matching the grid's y-up orientation.
static FONT_ROWS: [&str; FONT_HEIGHT] = [
    "  X  XXXX  XX XXX XXXXX    XXXX  XXXX XX X  XXXXXX   XX  X XX X    X XX  X XX   X   XX   X  X   XX   X  X  XXXX XXX XXXXXXXX XXX     X XXX  XXX  X    XXX  XXX         XXXXXX   X XX        X XXX       XXX    XX    XX X XX XX   XX  XXX     XX  X         X          X       X  ",
    "  X  XX  XX  XX  XX   X   X  XX  X X X  XX  XX   X   XX  XX  XX   X X X  XX  X  X  X  X X X XX XXX   X  X  X   X   X X  X   X   X    XX   XX   X X   X   XX   X        X    X  XX X X        X   X X X X X XX  XX   X  X XXX XXX X  X        X  X XX     XXXXX   XX   XXXXX       ",
    "  X  XX  XX   X  XX   X   X  XX  X X    XX X X   X   XX  XX  XX   X  XX X    X  X  X  XX   XX X X X X   X   X  X   X X   X      X    X    XX   X X   X   X    X     XXXX    X X      X      XX    XXXXX  X X X      X   XXXX XXXX    X    X  X  X X     X     X X  X X     X   X  ",
    "  XXXXXXX X   X  XXXX XXX X XXXXXX X    XXX  X   X   XX  XX  XXXX X  XXXX  XX   X  X  XX   XX   X  X    X    X X   X X    X   XX XXXXXXXXX XXXX   X   XXX  XXXX  XXX   X    X X      X   XXXXX XX  X X  XXX   X      XX     X   X    X   XXXXX  XX     X       XX  XX       X  X  ",
    "  X  XX  XX   X  XX   X   X   X  X X    XXX  X   X X XX XXX  XX  XX  XX  XX     X  X  XX   XX   X X X  X X    XX   X X     X    XX   XX    X       X X   XX   X     XXXX    X X X    X XXX  XX X X X X X X     X    X  X XXX XXXX    X    X  X  X XX    X     X X  X X     X    X ",
    "  X  XX  XX  XX  XX   X   X  XX  X X    XX X X   XX XXXX XX  XX  XX  XX  XX  X  X  X  XX   XX   XX   XX   X   XX   XXX X   XX   XX   XX    X   X    XX   XX   X X      X    XX   X    X     XX   XXXXXXX X XXX  XX XX  X XXX XXX X  X        X  X X X X  XXXXX   XX   XXXXX  X   X",
    "   XX XXX  XX XXX XXXXXXXX XX X  XXXX  XXX  XX   X   XX  X XX XXX  XX XXX  XX XXXXXX  XX   XX   XX   XX   XXXXX XXX  X  XXX  XXX     XXXXXX XXX XXXXX XXX  XXX X       XXXXXX    X          X XXX  X X  XXX XX    X  XX   XX XX   XX          XX  X X X   X              X    XXX ",
];

static GLYPHS: [Glyph; 69] = [
    Glyph::new(' ', 2, 0),
    Glyph::new('A', 4, 2),
    Glyph::new('B', 4, 6),
    Glyph::new('C', 4, 10),
    Glyph::new('D', 4, 14),
    Glyph::new('E', 4, 18),
    Glyph::new('F', 4, 22),
    Glyph::new('G', 4, 26),
    Glyph::new('H', 4, 30),
    Glyph::new('I', 3, 34),
    Glyph::new('J', 4, 37),
    Glyph::new('K', 4, 41),
    Glyph::new('L', 4, 45),
    Glyph::new('M', 5, 49),
    Glyph::new('N', 4, 54),
    Glyph::new('O', 4, 58),
    Glyph::new('P', 4, 62),
    Glyph::new('Q', 4, 66),
    Glyph::new('R', 4, 70),
    Glyph::new('S', 4, 74),
    Glyph::new('T', 5, 78),
    Glyph::new('U', 4, 83),
    Glyph::new('V', 5, 87),
    Glyph::new('W', 5, 92),
    Glyph::new('X', 5, 97),
    Glyph::new('Y', 5, 102),
    Glyph::new('Z', 4, 107),
    Glyph::new('0', 5, 111),
    Glyph::new('1', 3, 116),
    Glyph::new('2', 5, 119),
    Glyph::new('3', 5, 124),
    Glyph::new('4', 5, 129),
    Glyph::new('5', 5, 134),
    Glyph::new('6', 5, 139),
    Glyph::new('7', 5, 144),
    Glyph::new('8', 5, 149),
    Glyph::new('9', 5, 154),
    Glyph::new('`', 2, 159),
    Glyph::new('-', 3, 161),
    Glyph::new('=', 3, 164),
    Glyph::new('[', 3, 167),
    Glyph::new(']', 3, 170),
    Glyph::new('\\', 3, 173),
    Glyph::new(';', 1, 176),
    Glyph::new('\'', 1, 177),
    Glyph::new(',', 1, 178),
    Glyph::new('.', 1, 179),
    Glyph::new('/', 3, 180),
    Glyph::new('~', 5, 183),
    Glyph::new('!', 1, 188),
    Glyph::new('@', 5, 189),
    Glyph::new('#', 5, 194),
    Glyph::new('$', 5, 199),
    Glyph::new('%', 5, 204),
    Glyph::new('^', 3, 209),
    Glyph::new('&', 5, 212),
    Glyph::new('*', 7, 217),
    Glyph::new('(', 3, 224),
    Glyph::new(')', 3, 227),
    Glyph::new('_', 3, 230),
    Glyph::new('+', 3, 233),
    Glyph::new('{', 3, 236),
    Glyph::new('}', 3, 239),
    Glyph::new('|', 1, 242),
    Glyph::new(':', 1, 243),
    Glyph::new('"', 3, 244),
    Glyph::new('<', 11, 247),
    Glyph::new('>', 11, 258),
    Glyph::new('?', 5, 269),
];

static BUILTIN: FontTable = FontTable {
    height: FONT_HEIGHT,
    glyphs: &GLYPHS,
    rows: &FONT_ROWS,
};

/// One character's slice of the shared bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    /// Display width in columns
    pub width: usize,
    /// First column in the font rows
    pub offset: usize,
}

impl Glyph {
    pub const fn new(ch: char, width: usize, offset: usize) -> Self {
        Self { ch, width, offset }
    }
}

/// What unsupported characters turn into: a space that takes no room
pub const BLANK: Glyph = Glyph::new(' ', 0, 0);

/// Whitespace and case handling applied before layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Collapse whitespace runs to one space (implies trimming)
    pub smash_whitespace: bool,
    pub trim: bool,
    /// The built-in font only carries capitals
    pub upper_case: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self { smash_whitespace: true, trim: true, upper_case: true }
    }
}

/// Character table plus the bitmap rows it indexes into
#[derive(Debug)]
pub struct FontTable {
    height: usize,
    glyphs: &'static [Glyph],
    rows: &'static [&'static str],
}

impl FontTable {
    /// The compiled-in font, shared read-only by every component
    pub fn builtin() -> &'static FontTable {
        &BUILTIN
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn glyphs(&self) -> &[Glyph] {
        self.glyphs
    }

    /// Unknown characters come back as [`BLANK`]
    pub fn glyph(&self, c: char) -> Glyph {
        self.lookup(c).unwrap_or(BLANK)
    }

    pub fn supports(&self, c: char) -> bool {
        self.lookup(c).is_some()
    }

    fn lookup(&self, c: char) -> Option<Glyph> {
        self.glyphs.iter().find(|g| g.ch == c).copied()
    }

    /// Is cell (`col`, `row`) of `glyph` lit; row 0 is the bottom
    pub fn is_lit(&self, glyph: &Glyph, col: usize, row: usize) -> bool {
        if col >= glyph.width || row >= self.height {
            return false;
        }
        self.rows
            .get(row)
            .and_then(|r| r.as_bytes().get(glyph.offset + col))
            .is_some_and(|&b| b == LIT)
    }

    /// One glyph column as a bit set, bit `row` set when lit
    pub fn column_bits(&self, glyph: &Glyph, col: usize) -> u32 {
        (0..self.height.min(32))
            .filter(|&row| self.is_lit(glyph, col, row))
            .fold(0, |bits, row| bits | (1 << row))
    }

    /// Prepare text for layout.
    ///
    /// Upper-casing runs first so lower-case letters survive the
    /// unsupported-character pass, which maps everything the font lacks
    /// (tabs and newlines included) to a space.
    pub fn normalize(&self, text: &str, opts: TextOptions) -> String {
        let text = if opts.upper_case { text.to_uppercase() } else { text.to_string() };
        let text: String = text
            .chars()
            .map(|c| if self.supports(c) { c } else { ' ' })
            .collect();
        if opts.smash_whitespace {
            text.split_whitespace().collect::<Vec<_>>().join(" ")
        } else if opts.trim {
            text.trim().to_string()
        } else {
            text
        }
    }

    /// Columns needed to show `text`, one blank column between glyphs
    pub fn measure(&self, text: &str) -> usize {
        let (cols, count) = text
            .chars()
            .fold((0, 0), |(cols, count), c| (cols + self.glyph(c).width, count + 1));
        (cols + count).saturating_sub(1)
    }

    /// Column bit sets for `text` with `pad` blank columns either side
    /// and the usual gap after every glyph
    pub fn strip(&self, text: &str, pad: usize) -> Vec<u32> {
        let mut cols = vec![0; pad];
        for c in text.chars() {
            let g = self.glyph(c);
            cols.extend((0..g.width).map(|col| self.column_bits(&g, col)));
            cols.push(0);
        }
        cols.extend(std::iter::repeat_n(0, pad));
        cols
    }
}
