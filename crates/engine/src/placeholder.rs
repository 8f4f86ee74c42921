//! Placeholder glyphs for trigger characters.

use std::collections::BTreeSet;

use crate::{
    error::{Error, Result},
    glyph_order::GlyphName,
    tables::{
        TableSet,
        outlines::{Bbox, CharString, CurvePoint, SimpleOutline, TrueTypeGlyph},
    },
};

/// The outline representation a font is installed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    TrueType,
    Cff,
}

impl OutlineKind {
    /// Probes for `glyf` first and falls back to `CFF `.
    pub fn detect(tables: &TableSet) -> Result<Self> {
        if tables.glyf.is_some() {
            Ok(Self::TrueType)
        } else if tables.cff.is_some() {
            Ok(Self::Cff)
        } else {
            Err(Error::UnsupportedOutlineFormat)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderOutline {
    TrueType(TrueTypeGlyph),
    Cff(CharString),
}

/// A visually empty glyph named after its trigger character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderGlyph {
    pub name: GlyphName,
    pub outline: PlaceholderOutline,
}

/// Builds the placeholder for `c` in the given representation.
///
/// TrueType placeholders are one contour holding a single on-curve point at the origin.
pub fn make_glyph(c: char, kind: OutlineKind) -> PlaceholderGlyph {
    let outline = match kind {
        OutlineKind::TrueType => PlaceholderOutline::TrueType(TrueTypeGlyph::Simple(SimpleOutline {
            bbox: Bbox::default(),
            contours: vec![vec![CurvePoint { x: 0, y: 0, on_curve: true }]],
            instructions: Vec::new(),
        })),
        OutlineKind::Cff => PlaceholderOutline::Cff(CharString::empty()),
    };
    PlaceholderGlyph { name: GlyphName::for_char(c), outline }
}

/// Adds one placeholder per trigger character to the installed outline table.
///
/// Returns the number of glyphs added.
pub fn insert_placeholders(tables: &mut TableSet, triggers: &BTreeSet<char>) -> Result<usize> {
    let kind = OutlineKind::detect(tables)?;
    for &c in triggers {
        let PlaceholderGlyph { name, outline } = make_glyph(c, kind);
        match (outline, tables.glyf.as_mut(), tables.cff.as_mut()) {
            (PlaceholderOutline::TrueType(glyph), Some(glyf), _) => {
                glyf.glyphs.insert(name, glyph);
            }
            (PlaceholderOutline::Cff(charstring), _, Some(cff)) => {
                cff.glyphs.insert(name, charstring);
            }
            _ => return Err(Error::UnsupportedOutlineFormat),
        }
    }
    Ok(triggers.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::outlines::{CharStrings, GlyphTable};

    #[test]
    fn test_detect_prefers_glyf() {
        let tables = TableSet {
            glyf: Some(GlyphTable::default()),
            cff: Some(CharStrings::default()),
            ..Default::default()
        };
        assert_eq!(OutlineKind::detect(&tables).unwrap(), OutlineKind::TrueType);
    }

    #[test]
    fn test_detect_unsupported() {
        assert!(matches!(
            OutlineKind::detect(&TableSet::default()),
            Err(Error::UnsupportedOutlineFormat)
        ));
    }

    #[test]
    fn test_truetype_placeholder_shape() {
        let glyph = make_glyph('h', OutlineKind::TrueType);
        assert_eq!(glyph.name, "h");
        let PlaceholderOutline::TrueType(TrueTypeGlyph::Simple(outline)) = glyph.outline else {
            panic!("expected a simple glyph");
        };
        assert_eq!(outline.bbox, Bbox::default());
        assert_eq!(outline.num_points(), 1);
        assert!(outline.instructions.is_empty());
    }

    #[test]
    fn test_insert_cff_placeholders() {
        let mut tables = TableSet { cff: Some(CharStrings::default()), ..Default::default() };
        let added = insert_placeholders(&mut tables, &"ab".chars().collect()).unwrap();

        assert_eq!(added, 2);
        let cff = tables.cff.unwrap();
        assert_eq!(cff.glyphs.get("a"), Some(&CharString::empty()));
        assert_eq!(cff.glyphs.get("b").map(|c| c.0.as_slice()), Some(&[14u8][..]));
    }
}
