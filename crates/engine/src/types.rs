//! Transformation options and the resulting report.

use std::{
    collections::BTreeMap,
    fmt::{self, Formatter},
};

use font_types::Tag;

use crate::{allocator::PRIVATE_USE_BASE, glyph_order::GlyphName};

/// Options controlling the transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Relocated cmap entries are numbered upwards from this code.
    pub private_use_base: u32,
    /// Script registered in the GSUB and GPOS script lists.
    pub script: Tag,
    /// Feature enabling the ligature lookup.
    pub feature: Tag,
    /// Replace an existing GPOS with the stub. When unset, an existing GPOS
    /// is kept and the stub is only added to fonts without one.
    pub replace_positioning: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            private_use_base: PRIVATE_USE_BASE,
            script: Tag::new(b"latn"),
            feature: Tag::new(b"liga"),
            replace_positioning: true,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_private_use_base(mut self, base: u32) -> Self {
        self.private_use_base = base;
        self
    }

    pub fn with_script(mut self, script: Tag) -> Self {
        self.script = script;
        self
    }

    pub fn with_feature(mut self, feature: Tag) -> Self {
        self.feature = feature;
        self
    }

    pub fn with_replace_positioning(mut self, replace: bool) -> Self {
        self.replace_positioning = replace;
        self
    }

    pub fn with_script_opt(mut self, script: Option<Tag>) -> Self {
        if let Some(script) = script {
            self.script = script;
        }
        self
    }

    pub fn with_feature_opt(mut self, feature: Option<Tag>) -> Self {
        if let Some(feature) = feature {
            self.feature = feature;
        }
        self
    }
}

/// What a transformation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub placeholders_added: usize,
    pub ligature_sets: usize,
    pub ligature_rules: usize,
    /// Original code → relocated code.
    pub relocated_codes: BTreeMap<u32, u32>,
    pub removed_entries: usize,
    /// Code each glyph can be reached at in the edited cmap.
    pub glyph_codes: BTreeMap<GlyphName, u32>,
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "added {} placeholder glyphs, {} ligatures in {} sets",
            self.placeholders_added, self.ligature_rules, self.ligature_sets
        )?;
        if !self.relocated_codes.is_empty() {
            write!(f, ", relocated {} codes", self.relocated_codes.len())?;
        }
        if self.removed_entries > 0 {
            write!(f, ", dropped {} single-byte entries", self.removed_entries)?;
        }
        Ok(())
    }
}
