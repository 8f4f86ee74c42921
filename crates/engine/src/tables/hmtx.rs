//! Horizontal metrics.

use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::glyph_order::GlyphName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metric {
    pub advance: u16,
    pub side_bearing: i16,
}

/// One metric per glyph, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HorizontalMetrics {
    pub metrics: IndexMap<GlyphName, Metric>,
}

impl HorizontalMetrics {
    pub fn get(&self, glyph: &str) -> Option<Metric> {
        self.metrics.get(glyph).copied()
    }
}

/// Adds a zero advance, zero side bearing metric for each trigger character.
pub fn extend(hmtx: &mut HorizontalMetrics, triggers: &BTreeSet<char>) {
    for &c in triggers {
        hmtx.metrics.insert(GlyphName::for_char(c), Metric::default());
    }
}
