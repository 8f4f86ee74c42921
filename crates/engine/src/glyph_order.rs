//! Glyph names and the canonical glyph order.
//!
//! Every other table in [`TableSet`](crate::TableSet) refers to glyphs by
//! name. The glyph order is the only place where a name turns into a glyph id,
//! which is what lets placeholders be added before their ids are known.

use std::{
    borrow::Borrow,
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    ops::Deref,
};

use indexmap::IndexSet;
use log::debug;

/// A glyph name as stored in `post`, the CFF charset, or synthesized for a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphName(String);

impl GlyphName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name of the placeholder glyph for a trigger character: the character itself.
    pub fn for_char(c: char) -> Self {
        Self(c.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for GlyphName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for GlyphName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlyphName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GlyphName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Ordered, duplicate-free list of glyph names; a name's index is its glyph id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphOrder {
    names: IndexSet<GlyphName>,
}

impl GlyphOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn glyph_id(&self, name: &str) -> Option<u16> {
        self.names.get_index_of(name).map(|idx| idx as u16)
    }

    pub fn name(&self, gid: u16) -> Option<&GlyphName> {
        self.names.get_index(gid as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &GlyphName)> {
        self.names.iter().enumerate().map(|(gid, name)| (gid as u16, name))
    }

    /// Appends a name and returns its id, or `None` if the name is already present.
    pub fn push(&mut self, name: GlyphName) -> Option<u16> {
        let (idx, inserted) = self.names.insert_full(name);
        inserted.then_some(idx as u16)
    }
}

impl FromIterator<GlyphName> for GlyphOrder {
    fn from_iter<I: IntoIterator<Item = GlyphName>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}

/// Appends one placeholder per trigger character, in reverse canonical order.
///
/// Ids continue from the current length, so every pre-existing id is kept.
/// Returns the ids assigned, in append order.
pub fn append_placeholders(order: &mut GlyphOrder, triggers: &BTreeSet<char>) -> Vec<u16> {
    let mut added = Vec::with_capacity(triggers.len());
    for &c in triggers.iter().rev() {
        let name = GlyphName::for_char(c);
        match order.push(name) {
            Some(gid) => {
                debug!("glyph order: {c:?} -> {gid}");
                added.push(gid);
            }
            None => debug!("glyph order already contains {c:?}"),
        }
    }
    added
}
