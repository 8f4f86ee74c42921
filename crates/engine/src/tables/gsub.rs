//! Ligature substitution lookup construction.
//!
//! Substitution engines apply the first rule of a ligature set that matches,
//! so rules sharing a start glyph must be ordered longest match first. Sorting
//! all sequences in descending order and grouping them in a single pass gives
//! exactly that: a sequence always sorts after every sequence it is a prefix of.

use std::collections::HashMap;

use font_types::Tag;
use log::debug;

use crate::{error::Result, glyph_order::GlyphName, mapping::LigatureMapping};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigatureRule {
    /// Glyphs following the start glyph; empty for single-character sequences.
    pub components: Vec<GlyphName>,
    pub target: GlyphName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigatureSet {
    pub start: GlyphName,
    pub rules: Vec<LigatureRule>,
}

/// A type 4 lookup: one [`LigatureSet`] per distinct start glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LigatureLookup {
    pub sets: Vec<LigatureSet>,
}

impl LigatureLookup {
    pub fn rule_count(&self) -> usize {
        self.sets.iter().map(|set| set.rules.len()).sum()
    }

    pub fn set(&self, start: &str) -> Option<&LigatureSet> {
        self.sets.iter().find(|set| set.start == start)
    }
}

/// GSUB with one script, whose default language system enables one feature
/// pointing at the ligature lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigatureSubstitution {
    pub script: Tag,
    pub feature: Tag,
    pub lookup: LigatureLookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionTable {
    /// GSUB bytes carried unchanged from the source font.
    Preserved(Vec<u8>),
    Ligatures(LigatureSubstitution),
}

/// Builds the ligature lookup for `mapping`.
///
/// An empty mapping yields an empty lookup rather than none.
pub fn build(mapping: &LigatureMapping) -> Result<LigatureLookup> {
    mapping.validate()?;

    // BTreeMap iteration is ascending; reverse it for the descending pass.
    let sorted: Vec<(&str, &GlyphName)> = mapping.iter().rev().collect();

    let mut lookup = LigatureLookup::default();
    let mut set_index: HashMap<char, usize> = HashMap::new();

    for (sequence, target) in sorted {
        let mut chars = sequence.chars();
        let Some(start) = chars.next() else {
            continue;
        };
        let idx = *set_index.entry(start).or_insert_with(|| {
            lookup.sets.push(LigatureSet { start: GlyphName::for_char(start), rules: Vec::new() });
            lookup.sets.len() - 1
        });
        let components = chars.map(GlyphName::for_char).collect();
        lookup.sets[idx].rules.push(LigatureRule { components, target: target.clone() });
    }

    debug!("GSUB: {} ligature sets, {} rules", lookup.sets.len(), lookup.rule_count());
    Ok(lookup)
}
