//! The sequence → glyph mapping supplied by the user.

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use crate::{
    error::{Error, Result},
    glyph_order::GlyphName,
};

/// Ligature sequences and the existing glyphs they resolve to.
///
/// Keys are kept sorted by code point, which is also the comparison the
/// ligature builder uses for matching order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LigatureMapping {
    entries: BTreeMap<String, GlyphName>,
}

impl LigatureMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the glyph for `sequence`.
    pub fn insert(&mut self, sequence: impl Into<String>, glyph: impl Into<GlyphName>) {
        self.entries.insert(sequence.into(), glyph.into());
    }

    /// Builds a mapping from per-glyph ligature assignments.
    ///
    /// Glyphs with an empty ligature are skipped. A ligature assigned to two
    /// different glyphs fails with [`Error::DuplicateSequence`].
    pub fn from_assignments<I, G, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = (G, S)>,
        G: Into<GlyphName>,
        S: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for (glyph, sequence) in assignments {
            let glyph = glyph.into();
            let sequence = sequence.into();
            if sequence.is_empty() {
                continue;
            }
            match entries.entry(sequence) {
                Entry::Vacant(entry) => {
                    entry.insert(glyph);
                }
                Entry::Occupied(entry) if *entry.get() != glyph => {
                    return Err(Error::DuplicateSequence {
                        sequence: entry.key().clone(),
                        assigned: entry.get().clone(),
                        glyph,
                    });
                }
                Entry::Occupied(_) => {}
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, sequence: &str) -> Option<&GlyphName> {
        self.entries.get(sequence)
    }

    /// Entries in ascending sequence order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &GlyphName)> {
        self.entries.iter().map(|(seq, glyph)| (seq.as_str(), glyph))
    }

    /// Every distinct character used in any sequence, in canonical order.
    pub fn trigger_chars(&self) -> BTreeSet<char> {
        self.entries.keys().flat_map(|seq| seq.chars()).collect()
    }

    /// Checks that no sequence is empty and no glyph is targeted twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen: BTreeMap<&GlyphName, &str> = BTreeMap::new();
        for (sequence, glyph) in self.iter() {
            if sequence.is_empty() {
                return Err(Error::EmptySequence(glyph.clone()));
            }
            if let Some(first) = seen.insert(glyph, sequence) {
                return Err(Error::DuplicateTarget {
                    glyph: glyph.clone(),
                    first: first.to_string(),
                    second: sequence.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl<S: Into<String>, G: Into<GlyphName>> FromIterator<(S, G)> for LigatureMapping {
    fn from_iter<I: IntoIterator<Item = (S, G)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (sequence, glyph) in iter {
            mapping.insert(sequence, glyph);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_chars_are_distinct() {
        let mapping: LigatureMapping =
            [("home", "house"), ("hero", "shield")].into_iter().collect();
        let chars: String = mapping.trigger_chars().into_iter().collect();
        assert_eq!(chars, "ehmor");
    }

    #[test]
    fn test_validate_duplicate_target() {
        let mapping: LigatureMapping = [("ab", "X"), ("ac", "X")].into_iter().collect();
        let err = mapping.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateTarget { ref glyph, ref first, ref second }
                if glyph == "X" && first == "ab" && second == "ac"
        ));
    }

    #[test]
    fn test_validate_empty_sequence() {
        let mut mapping = LigatureMapping::new();
        mapping.insert("", "X");
        assert!(matches!(mapping.validate(), Err(Error::EmptySequence(_))));
    }

    #[test]
    fn test_from_assignments() {
        let mapping =
            LigatureMapping::from_assignments([("house", "home"), ("star", ""), ("gear", "cog")])
                .unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("home").map(|g| g.as_str()), Some("house"));
        assert!(mapping.get("").is_none());
    }

    #[test]
    fn test_from_assignments_rejects_reused_ligature() {
        let err = LigatureMapping::from_assignments([("house", "home"), ("hut", "home")])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSequence { ref sequence, .. } if sequence == "home"));
    }
}
