//! GDEF model and the glyph class upgrade.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;

use crate::{
    error::{Error, Result},
    glyph_order::GlyphName,
};

/// OpenType glyph class values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum GlyphClass {
    Base = 1,
    Ligature = 2,
    Mark = 3,
    Component = 4,
}

impl From<GlyphClass> for u16 {
    fn from(class: GlyphClass) -> u16 {
        class as u16
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoverageFormat {
    /// Format 1, a sorted glyph list.
    #[default]
    GlyphList,
    /// Format 2, glyph ranges.
    GlyphRanges,
}

/// Glyph → class entries, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDefinition {
    pub entries: IndexMap<GlyphName, u16>,
}

impl ClassDefinition {
    pub fn get(&self, glyph: &str) -> Option<u16> {
        self.entries.get(glyph).copied()
    }
}

impl<N: Into<GlyphName>> FromIterator<(N, u16)> for ClassDefinition {
    fn from_iter<I: IntoIterator<Item = (N, u16)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(name, class)| (name.into(), class)).collect() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretValue {
    Coordinate(i16),
    ContourPoint(u16),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LigatureCaretList {
    pub coverage_format: CoverageFormat,
    pub carets: IndexMap<GlyphName, Vec<CaretValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphDefinitions {
    pub glyph_classes: Option<ClassDefinition>,
    pub attach_points: Option<IndexMap<GlyphName, Vec<u16>>>,
    pub lig_carets: Option<LigatureCaretList>,
    pub mark_attach_classes: Option<ClassDefinition>,
    pub mark_glyph_sets: Option<Vec<Vec<GlyphName>>>,
}

/// Promotes every classified glyph to [`GlyphClass::Ligature`] and adds each
/// trigger character as [`GlyphClass::Base`].
///
/// The upgrade ignores the previous class of each glyph. The ligature caret
/// coverage is switched to the glyph-list format.
pub fn upgrade(gdef: Option<&mut GlyphDefinitions>, triggers: &BTreeSet<char>) -> Result<()> {
    let gdef = gdef.ok_or(Error::MissingClassTable("table"))?;
    check_upgradable(gdef)?;

    if let Some(carets) = gdef.lig_carets.as_mut() {
        carets.coverage_format = CoverageFormat::GlyphList;
    }
    if let Some(classes) = gdef.glyph_classes.as_mut() {
        for class in classes.entries.values_mut() {
            *class = GlyphClass::Ligature.into();
        }
        for &c in triggers {
            classes.entries.insert(GlyphName::for_char(c), GlyphClass::Base.into());
        }
        debug!("GDEF: {} glyph classes after upgrade", classes.entries.len());
    }
    Ok(())
}

/// Fails with [`Error::MissingClassTable`] unless both the glyph class
/// definition and the ligature caret list exist.
pub fn check_upgradable(gdef: &GlyphDefinitions) -> Result<()> {
    if gdef.glyph_classes.is_none() {
        return Err(Error::MissingClassTable("glyph class definition"));
    }
    if gdef.lig_carets.is_none() {
        return Err(Error::MissingClassTable("ligature caret list"));
    }
    Ok(())
}
