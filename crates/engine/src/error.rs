use std::result;

use crate::glyph_order::GlyphName;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two sequences map to the same glyph.
    #[error("glyph '{glyph}' is the target of both '{first}' and '{second}'")]
    DuplicateTarget { glyph: GlyphName, first: String, second: String },

    /// One ligature string was assigned to two glyphs.
    #[error(
        "ligature '{sequence}' already assigned to '{assigned}', cannot assign it to '{glyph}'"
    )]
    DuplicateSequence { sequence: String, assigned: GlyphName, glyph: GlyphName },

    #[error("ligature sequence for glyph '{0}' is empty")]
    EmptySequence(GlyphName),

    #[error("target glyph '{0}' is not in the font")]
    UnknownGlyph(GlyphName),

    /// A placeholder would shadow a glyph that already carries the same name.
    #[error("font already has a glyph named '{0}', cannot add a placeholder for it")]
    GlyphNameConflict(GlyphName),

    /// Neither `glyf` nor `CFF ` is present.
    #[error("font has neither TrueType nor CFF outlines")]
    UnsupportedOutlineFormat,

    #[error("font has no GDEF {0} to upgrade")]
    MissingClassTable(&'static str),

    #[error("private use code space exhausted after {capacity} relocated codes")]
    CodeSpaceExhausted { capacity: u32 },
}

pub type Result<T> = result::Result<T, Error>;
