//! Glyph names recovered from the font.

use std::collections::HashMap;

use ligafont_engine::{GlyphName, GlyphOrder};
use log::debug;

/// Name given to a glyph the font does not name.
pub fn fallback_name(gid: u16) -> String {
    format!("glyph{gid:05}")
}

/// Builds a glyph order from per-glyph names.
///
/// Unnamed glyphs get [`fallback_name`]; repeated names get a `#n` suffix so
/// every glyph stays addressable.
pub fn glyph_order<I>(names: I) -> GlyphOrder
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut order = GlyphOrder::new();
    let mut repeats: HashMap<String, usize> = HashMap::new();

    for (gid, name) in names.into_iter().enumerate() {
        let base = match name {
            Some(name) if !name.is_empty() => name,
            _ => fallback_name(gid as u16),
        };
        let mut candidate = GlyphName::new(base.clone());
        while order.contains(&candidate) {
            let count = repeats.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = GlyphName::new(format!("{base}#{count}"));
        }
        if candidate != base.as_str() {
            debug!("glyph {gid}: renamed duplicate '{base}' to '{candidate}'");
        }
        order.push(candidate);
    }
    order
}

/// Decodes a name stored as raw bytes: UTF-8 when valid, Latin-1 otherwise.
pub fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(name) => name.to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
