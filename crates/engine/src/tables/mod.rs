//! Typed, in-memory model of the font tables the transformation edits.

pub mod cmap;
pub mod gdef;
pub mod gpos;
pub mod gsub;
pub mod hmtx;
pub mod outlines;

use std::collections::BTreeMap;

use font_types::Tag;

use crate::glyph_order::GlyphOrder;

use self::{
    cmap::CharMap, gdef::GlyphDefinitions, gpos::PositioningTable, gsub::SubstitutionTable,
    hmtx::HorizontalMetrics, outlines::{CharStrings, GlyphTable},
};

/// A decoded font.
///
/// Tables the engine edits are modeled; everything else is carried as raw
/// bytes under its tag and written back unchanged. For CFF fonts the `CFF `
/// bytes stay in `raw` and only the charstrings are lifted into `cff`.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    pub glyph_order: GlyphOrder,
    pub cmap: CharMap,
    pub glyf: Option<GlyphTable>,
    pub cff: Option<CharStrings>,
    pub gdef: Option<GlyphDefinitions>,
    pub hmtx: HorizontalMetrics,
    pub gpos: Option<PositioningTable>,
    pub gsub: Option<SubstitutionTable>,
    pub raw: BTreeMap<Tag, Vec<u8>>,
}

impl TableSet {
    pub fn raw_table(&self, tag: Tag) -> Option<&[u8]> {
        self.raw.get(&tag).map(Vec::as_slice)
    }
}
