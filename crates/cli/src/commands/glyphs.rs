//! Glyph listing: ids, names and the codes that reach each glyph.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use ligafont_codec::decode;
use ligafont_engine::TableSet;

use crate::io::read_font;

/// One line per glyph: id, name, then every code mapped to it.
pub fn list_glyphs(tables: &TableSet) -> String {
    let mut codes: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
    for subtable in &tables.cmap.subtables {
        for (&code, name) in &subtable.entries {
            let glyph_codes = codes.entry(name.as_str()).or_default();
            if !glyph_codes.contains(&code) {
                glyph_codes.push(code);
            }
        }
    }

    let mut out = String::new();
    for (gid, name) in tables.glyph_order.iter() {
        out.push_str(&format!("{gid:>5}  {name}"));
        if let Some(glyph_codes) = codes.get_mut(name.as_str()) {
            glyph_codes.sort_unstable();
            for code in glyph_codes.iter() {
                out.push_str(&format!("  U+{code:04X}"));
            }
        }
        out.push('\n');
    }
    out
}

pub fn glyphs(font: &Path) -> Result<()> {
    let data = read_font(font)?;
    let tables = decode(&data).with_context(|| format!("Failed to decode {}", font.display()))?;
    print!("{}", list_glyphs(&tables));
    Ok(())
}
