//! Glyph outline storage: TrueType `glyf` glyphs and CFF charstrings.

use indexmap::IndexMap;

use crate::glyph_order::GlyphName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bbox {
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurvePoint {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

/// A simple (non-composite) TrueType outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleOutline {
    pub bbox: Bbox,
    pub contours: Vec<Vec<CurvePoint>>,
    pub instructions: Vec<u8>,
}

impl SimpleOutline {
    pub fn num_points(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrueTypeGlyph {
    Empty,
    Simple(SimpleOutline),
    /// Glyph record exactly as it was read from `glyf`.
    Stored(Vec<u8>),
}

/// The `glyf` table, keyed by glyph name. Physical order comes from the glyph order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphTable {
    pub glyphs: IndexMap<GlyphName, TrueTypeGlyph>,
}

/// A Type 2 charstring program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharString(pub Vec<u8>);

impl CharString {
    /// The `endchar` operator.
    pub const ENDCHAR: u8 = 14;

    /// A charstring that draws nothing.
    pub fn empty() -> Self {
        Self(vec![Self::ENDCHAR])
    }
}

/// The charstrings of a CFF font, keyed by glyph name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharStrings {
    pub glyphs: IndexMap<GlyphName, CharString>,
}
