//! The positioning stub.
//!
//! Nothing in a ligature font positions glyphs, but some consumers reject a
//! font whose GPOS is missing or malformed, so a minimal, well-formed table
//! replaces whatever was there.

use font_types::Tag;

use crate::tables::TableSet;

/// Parameters of the `size` feature, in decipoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeParams {
    pub design_size: u16,
    pub subfamily_id: u16,
    pub subfamily_name_id: u16,
    pub range_start: u16,
    pub range_end: u16,
}

impl Default for SizeParams {
    fn default() -> Self {
        Self {
            design_size: 160,
            subfamily_id: 0,
            subfamily_name_id: 1,
            range_start: 0,
            range_end: 0,
        }
    }
}

/// Script list with one script whose default language system enables the
/// single `size` feature; no lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositioningStub {
    pub script: Tag,
    pub size: SizeParams,
}

impl PositioningStub {
    pub const FEATURE: Tag = Tag::new(b"size");

    pub fn new(script: Tag) -> Self {
        Self { script, size: SizeParams::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositioningTable {
    /// GPOS bytes carried unchanged from the source font.
    Preserved(Vec<u8>),
    Stub(PositioningStub),
}

/// Clears any existing GPOS and installs the stub.
pub fn rebuild_positioning_stub(tables: &mut TableSet, script: Tag) {
    if matches!(tables.gpos, Some(PositioningTable::Preserved(_))) {
        log::debug!("GPOS: discarding existing table");
    }
    tables.gpos = Some(PositioningTable::Stub(PositioningStub::new(script)));
}
