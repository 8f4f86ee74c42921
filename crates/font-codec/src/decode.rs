use font_types::Tag;
use ligafont_engine::{
    TableSet,
    tables::{gpos::PositioningTable, gsub::SubstitutionTable},
};
use log::{debug, info, warn};
use read_fonts::{FontRef, TableProvider};

use crate::{
    container::ContainerFormat,
    error::{Error, Result},
    names,
    tables::{CFF, CMAP, GDEF, GLYF, GPOS, GSUB, HMTX, LOCA, cff, cmap, gdef, glyf, hmtx, post},
    woff,
};

/// Tables lifted into the model instead of being carried as raw bytes.
const MODELED: [Tag; 7] = [CMAP, GLYF, LOCA, HMTX, GDEF, GSUB, GPOS];

/// Decodes an sfnt or WOFF 1.0 font.
pub fn decode(data: &[u8]) -> Result<TableSet> {
    match ContainerFormat::detect(data) {
        Some(ContainerFormat::Sfnt) => decode_sfnt(data),
        Some(ContainerFormat::Woff) => decode_sfnt(&woff::unwrap(data)?),
        Some(ContainerFormat::Woff2) => Err(Error::Woff2Input),
        None => Err(Error::UnknownContainer),
    }
}

/// Decodes a bare sfnt.
pub fn decode_sfnt(data: &[u8]) -> Result<TableSet> {
    let font = FontRef::new(data)?;
    let num_glyphs = font.maxp()?.num_glyphs();
    let cff_data = font.table_data(CFF).map(|d| d.as_bytes());

    let glyph_names = match cff_data {
        Some(cff_data) => {
            let names = cff::glyph_names(cff_data)?;
            if names.len() != num_glyphs as usize {
                warn!("CFF has {} glyphs, maxp says {num_glyphs}", names.len());
            }
            names
        }
        None => post::glyph_names(&font, num_glyphs),
    };
    let glyph_order = names::glyph_order(glyph_names);

    let glyf = match font.table_data(GLYF) {
        Some(_) => Some(glyf::read(&font, &glyph_order)?),
        None => None,
    };
    let cff = cff_data.map(|data| cff::charstrings(data, &glyph_order)).transpose()?;
    let gdef = match font.table_data(GDEF) {
        Some(_) => Some(gdef::read(&font.gdef()?, &glyph_order)?),
        None => None,
    };
    let gsub = font.table_data(GSUB).map(|d| SubstitutionTable::Preserved(d.as_bytes().to_vec()));
    let gpos = font.table_data(GPOS).map(|d| PositioningTable::Preserved(d.as_bytes().to_vec()));

    let mut tables = TableSet {
        cmap: cmap::read(&font, &glyph_order)?,
        hmtx: hmtx::read(&font, &glyph_order)?,
        glyph_order,
        glyf,
        cff,
        gdef,
        gpos,
        gsub,
        ..Default::default()
    };

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if MODELED.contains(&tag) {
            continue;
        }
        if let Some(data) = font.table_data(tag) {
            debug!("Keeping '{tag}' as raw bytes ({} bytes)", data.len());
            tables.raw.insert(tag, data.as_bytes().to_vec());
        }
    }

    let outlines = match (&tables.glyf, &tables.cff) {
        (Some(_), _) => "TrueType",
        (None, Some(_)) => "CFF",
        (None, None) => "no",
    };
    info!(
        "Decoded {} glyphs ({outlines} outlines), {} raw tables",
        tables.glyph_order.len(),
        tables.raw.len()
    );
    Ok(tables)
}
