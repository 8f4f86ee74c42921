//! Character map model and the trigger-character rewrite.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::{allocator::CodeAllocator, error::Result, glyph_order::GlyphName};

/// The subtable formats the model understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmapFormat {
    /// Format 0: 256 single-byte codes.
    ByteEncoding,
    /// Format 4: BMP segments.
    SegmentMapping,
    /// Format 6: one dense BMP range.
    TrimmedTable,
    /// Format 12: full Unicode groups.
    SegmentedCoverage,
}

impl CmapFormat {
    pub fn from_number(format: u16) -> Option<Self> {
        match format {
            0 => Some(Self::ByteEncoding),
            4 => Some(Self::SegmentMapping),
            6 => Some(Self::TrimmedTable),
            12 => Some(Self::SegmentedCoverage),
            _ => None,
        }
    }

    pub fn number(self) -> u16 {
        match self {
            Self::ByteEncoding => 0,
            Self::SegmentMapping => 4,
            Self::TrimmedTable => 6,
            Self::SegmentedCoverage => 12,
        }
    }

    /// Largest code the format can carry.
    pub fn max_code(self) -> u32 {
        match self {
            Self::ByteEncoding => 0xFF,
            Self::SegmentMapping | Self::TrimmedTable => 0xFFFF,
            Self::SegmentedCoverage => 0x10FFFF,
        }
    }

    /// Format 0 stores one byte per code.
    pub fn is_single_byte(self) -> bool {
        self == Self::ByteEncoding
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapSubtable {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language: u32,
    pub format: CmapFormat,
    pub entries: BTreeMap<u32, GlyphName>,
}

impl CmapSubtable {
    pub fn new(platform_id: u16, encoding_id: u16, format: CmapFormat) -> Self {
        Self { platform_id, encoding_id, language: 0, format, entries: BTreeMap::new() }
    }

    /// Format 0 and Mac Roman (1, 0) tables are byte-coded whatever their
    /// format. They cannot take relocated codes; conflicts are dropped.
    pub fn is_single_byte(&self) -> bool {
        self.format.is_single_byte() || (self.platform_id == 1 && self.encoding_id == 0)
    }

    /// Largest code this subtable can carry.
    pub fn max_code(&self) -> u32 {
        if self.is_single_byte() { 0xFF } else { self.format.max_code() }
    }

    pub fn with_entries<N: Into<GlyphName>>(
        mut self,
        entries: impl IntoIterator<Item = (u32, N)>,
    ) -> Self {
        self.entries.extend(entries.into_iter().map(|(code, name)| (code, name.into())));
        self
    }
}

/// A subtable in a format the model does not edit (e.g. 14), kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueSubtable {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMap {
    pub subtables: Vec<CmapSubtable>,
    pub opaque: Vec<OpaqueSubtable>,
}

impl CharMap {
    /// Every code mapped by any modeled subtable.
    pub fn codes(&self) -> BTreeSet<u32> {
        self.subtables.iter().flat_map(|s| s.entries.keys().copied()).collect()
    }
}

/// Outcome of [`rewrite`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterCodeAssignment {
    /// Original code → relocated code.
    pub relocated: BTreeMap<u32, u32>,
    /// Entries dropped from single-byte subtables.
    pub removed: usize,
    /// Placeholder entries added across all subtables.
    pub inserted: usize,
    /// Code each glyph is reachable at after the rewrite; later subtables win.
    pub glyph_codes: BTreeMap<GlyphName, u32>,
}

/// Routes each trigger character's natural code to its placeholder glyph.
///
/// An entry already sitting on that code is relocated to a code from
/// `allocator`, except in single-byte subtables where it is removed. Codes
/// a subtable format cannot represent are not inserted into it.
pub fn rewrite(
    cmap: &mut CharMap,
    triggers: &BTreeSet<char>,
    allocator: &mut CodeAllocator,
) -> Result<CharacterCodeAssignment> {
    let mut assignment = CharacterCodeAssignment::default();

    for subtable in &mut cmap.subtables {
        let format = subtable.format;
        let single_byte = subtable.is_single_byte();
        let max_code = subtable.max_code();
        for &c in triggers {
            let code = c as u32;
            if let Some(existing) = subtable.entries.remove(&code) {
                if single_byte {
                    debug!(
                        "cmap ({}, {}) format {}: dropped U+{code:04X} -> {existing}",
                        subtable.platform_id,
                        subtable.encoding_id,
                        format.number()
                    );
                    assignment.removed += 1;
                } else {
                    let relocated = allocator.allocate(code)?;
                    if relocated > max_code {
                        warn!(
                            "cmap format {} cannot hold U+{relocated:04X}, dropping {existing}",
                            format.number()
                        );
                    } else {
                        subtable.entries.insert(relocated, existing);
                    }
                    assignment.relocated.insert(code, relocated);
                }
            }

            if code <= max_code {
                subtable.entries.insert(code, GlyphName::for_char(c));
                assignment.inserted += 1;
            } else {
                debug!("cmap format {} cannot hold U+{code:04X}, skipped", format.number());
            }
        }

        for (&code, name) in &subtable.entries {
            assignment.glyph_codes.insert(name.clone(), code);
        }
    }

    Ok(assignment)
}
