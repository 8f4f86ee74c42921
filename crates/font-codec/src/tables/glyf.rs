//! glyf/loca: glyph records are kept as stored bytes and rebuilt with
//! `GlyfLocaBuilder`.

use ligafont_engine::{
    GlyphOrder,
    tables::outlines::{GlyphTable, SimpleOutline, TrueTypeGlyph},
};
use read_fonts::{
    FontData, FontRead, FontRef, ReadError, TableProvider,
    tables::glyf::{CurvePoint, Glyph as ReadGlyph},
};
use write_fonts::{
    from_obj::FromObjRef,
    tables::{
        glyf::{
            Bbox, CompositeGlyph as WriteCompositeGlyph, Contour, Glyf, GlyfLocaBuilder,
            Glyph as WriteGlyph, SimpleGlyph as WriteSimpleGlyph,
        },
        loca::{Loca, LocaFormat},
    },
};

use super::GLYF;
use crate::error::{Error, Result};

pub fn read(font: &FontRef, order: &GlyphOrder) -> Result<GlyphTable> {
    let glyf = font.table_data(GLYF).ok_or(Error::MissingTable("glyf"))?;
    let data = glyf.as_bytes();
    let loca = font.loca(None)?;

    let mut table = GlyphTable::default();
    for (gid, name) in order.iter() {
        let start = loca.get_raw(gid as usize).ok_or(ReadError::OutOfBounds)? as usize;
        let end = loca.get_raw(gid as usize + 1).ok_or(ReadError::OutOfBounds)? as usize;
        let glyph = if start >= end {
            TrueTypeGlyph::Empty
        } else {
            TrueTypeGlyph::Stored(data.get(start..end).ok_or(ReadError::OutOfBounds)?.to_vec())
        };
        table.glyphs.insert(name.clone(), glyph);
    }
    Ok(table)
}

/// Lays the glyphs out in glyph order.
pub fn build(glyf: &GlyphTable, order: &GlyphOrder) -> Result<(Glyf, Loca, LocaFormat)> {
    let mut builder = GlyfLocaBuilder::new();
    for (_, name) in order.iter() {
        let glyph = glyf
            .glyphs
            .get(name)
            .ok_or_else(|| Error::MissingGlyphData { glyph: name.clone(), table: "glyf" })?;
        builder.add_glyph(&write_glyph(glyph)?)?;
    }
    Ok(builder.build())
}

fn write_glyph(glyph: &TrueTypeGlyph) -> Result<WriteGlyph> {
    Ok(match glyph {
        TrueTypeGlyph::Empty => WriteGlyph::Empty,
        TrueTypeGlyph::Simple(outline) => WriteGlyph::Simple(simple_glyph(outline)),
        TrueTypeGlyph::Stored(bytes) => match ReadGlyph::read(FontData::new(bytes))? {
            ReadGlyph::Simple(simple) => {
                WriteGlyph::Simple(WriteSimpleGlyph::from_obj_ref(&simple, FontData::new(&[])))
            }
            ReadGlyph::Composite(composite) => WriteGlyph::Composite(
                WriteCompositeGlyph::from_obj_ref(&composite, FontData::new(&[])),
            ),
        },
    })
}

fn simple_glyph(outline: &SimpleOutline) -> WriteSimpleGlyph {
    let contours = outline
        .contours
        .iter()
        .map(|points| {
            let points: Vec<CurvePoint> =
                points.iter().map(|p| CurvePoint::new(p.x, p.y, p.on_curve)).collect();
            Contour::from(points)
        })
        .collect();
    let bbox = outline.bbox;
    WriteSimpleGlyph {
        bbox: Bbox { x_min: bbox.x_min, y_min: bbox.y_min, x_max: bbox.x_max, y_max: bbox.y_max },
        contours,
        instructions: outline.instructions.clone(),
    }
}
