use font_types::Tag;
use ligafont_engine::{
    TableSet,
    tables::{cmap::CharMap, gpos::PositioningTable, gsub::SubstitutionTable},
};
use log::{debug, info};
use read_fonts::{
    FontData, FontRead, FontRef,
    tables::{
        compute_checksum, head::Head as ReadHead, hhea::Hhea as ReadHhea, maxp::Maxp as ReadMaxp,
        os2::Os2 as ReadOs2,
    },
};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{head::Head, hhea::Hhea, loca::LocaFormat, maxp::Maxp, os2::Os2},
};

use crate::{
    container::ContainerFormat,
    error::{Error, Result},
    tables::{
        CFF, CMAP, GDEF, GLYF, GPOS, GSUB, HEAD, HHEA, HMTX, LOCA, MAXP, OS2, POST, cff, cmap,
        gdef, glyf, hmtx, layout, post,
    },
    woff, woff2,
};

const OPENTYPE_CFF: u32 = u32::from_be_bytes(*b"OTTO");
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Encodes `tables` into the requested container.
pub fn encode(tables: &TableSet, format: ContainerFormat) -> Result<Vec<u8>> {
    wrap(&encode_sfnt(tables)?, format)
}

/// Wraps an already encoded sfnt in `format`.
pub fn wrap(sfnt: &[u8], format: ContainerFormat) -> Result<Vec<u8>> {
    let data = match format {
        ContainerFormat::Sfnt => sfnt.to_vec(),
        ContainerFormat::Woff => woff::wrap(sfnt)?,
        ContainerFormat::Woff2 => woff2::compress(sfnt)?,
    };
    info!("Encoded {format}: {} bytes", data.len());
    Ok(data)
}

/// Encodes `tables` as a bare sfnt (TTF, or OTF for CFF outlines).
pub fn encode_sfnt(tables: &TableSet) -> Result<Vec<u8>> {
    let order = &tables.glyph_order;
    let num_glyphs = u16::try_from(order.len()).map_err(|_| Error::TooManyGlyphs(order.len()))?;
    let is_cff = tables.glyf.is_none() && tables.cff.is_some();

    let mut builder = FontBuilder::new();
    let cmap = cmap::build(&tables.cmap, order)?;
    builder.add_table(&cmap)?;

    let mut loca_format = None;
    if let Some(glyphs) = &tables.glyf {
        let (glyf, loca, format) = glyf::build(glyphs, order)?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;
        loca_format = Some(format);
    }
    if let Some(charstrings) = &tables.cff {
        let original = tables.raw_table(CFF).ok_or(Error::MissingTable("CFF "))?;
        builder.add_raw(CFF, cff::rebuild(original, order, charstrings)?);
    }

    let (hmtx, num_long_metrics) = hmtx::build(&tables.hmtx, order)?;
    builder.add_table(&hmtx)?;

    let mut head: Head = ReadHead::read(required(tables, HEAD, "head")?)?.to_owned_table();
    head.checksum_adjustment = 0;
    if let Some(format) = loca_format {
        head.index_to_loc_format = match format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        };
    }
    builder.add_table(&head)?;

    let mut hhea: Hhea = ReadHhea::read(required(tables, HHEA, "hhea")?)?.to_owned_table();
    hhea.number_of_h_metrics = num_long_metrics;
    builder.add_table(&hhea)?;

    let mut maxp: Maxp = ReadMaxp::read(required(tables, MAXP, "maxp")?)?.to_owned_table();
    maxp.num_glyphs = num_glyphs;
    builder.add_table(&maxp)?;

    if let Some(original) = tables.raw_table(OS2) {
        let mut os2: Os2 = ReadOs2::read(FontData::new(original))?.to_owned_table();
        if let Some((first, last)) = char_index_range(&tables.cmap) {
            os2.us_first_char_index = first;
            os2.us_last_char_index = last;
        }
        builder.add_table(&os2)?;
    }

    if let Some(original) = tables.raw_table(POST)
        && let Some(post) = post::build(original, order, is_cff)?
    {
        builder.add_table(&post)?;
    }

    if let Some(definitions) = &tables.gdef {
        builder.add_table(&gdef::build(definitions, order)?)?;
    }
    match &tables.gsub {
        Some(SubstitutionTable::Ligatures(gsub)) => {
            builder.add_table(&layout::build_gsub(gsub, order)?)?;
        }
        Some(SubstitutionTable::Preserved(bytes)) => {
            builder.add_raw(GSUB, bytes.as_slice());
        }
        None => {}
    }
    match &tables.gpos {
        Some(PositioningTable::Stub(stub)) => {
            builder.add_table(&layout::build_gpos(stub))?;
        }
        Some(PositioningTable::Preserved(bytes)) => {
            builder.add_raw(GPOS, bytes.as_slice());
        }
        None => {}
    }

    for (&tag, data) in &tables.raw {
        if is_derived(tag) || builder.contains(tag) {
            continue;
        }
        builder.add_raw(tag, data.as_slice());
    }

    let mut sfnt = builder.build();
    if is_cff {
        sfnt[..4].copy_from_slice(&OPENTYPE_CFF.to_be_bytes());
    }
    set_checksum_adjustment(&mut sfnt)?;
    debug!("sfnt: {} glyphs, {} bytes", num_glyphs, sfnt.len());
    Ok(sfnt)
}

/// Tables that are always written from the model, never from raw bytes.
fn is_derived(tag: Tag) -> bool {
    [CMAP, GLYF, LOCA, HMTX, GDEF, GSUB, GPOS].contains(&tag)
}

/// Lowest and highest code of the Unicode subtables, capped at 0xFFFF.
fn char_index_range(charmap: &CharMap) -> Option<(u16, u16)> {
    let mut codes = charmap
        .subtables
        .iter()
        .filter(|subtable| matches!(subtable.platform_id, 0 | 3))
        .flat_map(|subtable| subtable.entries.keys().copied());
    let first = codes.next()?;
    let (first, last) = codes.fold((first, first), |(lo, hi), code| (lo.min(code), hi.max(code)));
    Some((first.min(0xFFFF) as u16, last.min(0xFFFF) as u16))
}

fn required<'a>(tables: &'a TableSet, tag: Tag, name: &'static str) -> Result<FontData<'a>> {
    tables.raw_table(tag).map(FontData::new).ok_or(Error::MissingTable(name))
}

/// Stores the whole-font checksum adjustment in `head`.
fn set_checksum_adjustment(sfnt: &mut [u8]) -> Result<()> {
    let head_offset = FontRef::new(sfnt)?
        .table_directory
        .table_records()
        .iter()
        .find(|record| record.tag() == HEAD)
        .map(|record| record.offset() as usize)
        .ok_or(Error::MissingTable("head"))?;
    let adjustment = CHECKSUM_MAGIC.wrapping_sub(compute_checksum(sfnt));
    sfnt[head_offset + 8..head_offset + 12].copy_from_slice(&adjustment.to_be_bytes());
    Ok(())
}
