//! GDEF decoding into glyph-name keyed definitions, and rebuilding with
//! `write-fonts`.

use font_types::GlyphId16;
use indexmap::IndexMap;
use ligafont_engine::{
    GlyphName, GlyphOrder,
    tables::gdef::{
        CaretValue, ClassDefinition, CoverageFormat, GlyphDefinitions, LigatureCaretList,
    },
};
use log::warn;
use read_fonts::tables::{
    gdef::{CaretValue as ReadCaretValue, Gdef as ReadGdef},
    layout::{ClassDef as ReadClassDef, CoverageTable as ReadCoverage},
};
use write_fonts::tables::{
    gdef::{
        AttachList, AttachPoint, CaretValue as WriteCaretValue, Gdef, LigCaretList, LigGlyph,
        MarkGlyphSets,
    },
    layout::{ClassDef, CoverageTable, RangeRecord},
};

use crate::{
    error::{Error, Result},
    names,
};

pub fn read(gdef: &ReadGdef, order: &GlyphOrder) -> Result<GlyphDefinitions> {
    let glyph_classes = gdef
        .glyph_class_def()
        .transpose()?
        .map(|class_def| read_class_def(&class_def, order));

    let attach_points = match gdef.attach_list().transpose()? {
        Some(list) => {
            let glyphs = coverage_names(&list.coverage()?, order);
            let mut points = IndexMap::new();
            for (name, attach) in glyphs.into_iter().zip(list.attach_points().iter()) {
                let indices = attach?.point_indices().iter().map(|p| p.get()).collect();
                points.insert(name, indices);
            }
            Some(points)
        }
        None => None,
    };

    let lig_carets = match gdef.lig_caret_list().transpose()? {
        Some(list) => {
            let coverage = list.coverage()?;
            let coverage_format = match coverage {
                ReadCoverage::Format1(_) => CoverageFormat::GlyphList,
                ReadCoverage::Format2(_) => CoverageFormat::GlyphRanges,
            };
            let mut carets = IndexMap::new();
            for (name, lig_glyph) in
                coverage_names(&coverage, order).into_iter().zip(list.lig_glyphs().iter())
            {
                let mut values = Vec::new();
                for caret in lig_glyph?.caret_values().iter() {
                    values.push(match caret? {
                        ReadCaretValue::Format1(c) => CaretValue::Coordinate(c.coordinate()),
                        ReadCaretValue::Format2(c) => {
                            CaretValue::ContourPoint(c.caret_value_point_index())
                        }
                        ReadCaretValue::Format3(c) => CaretValue::Coordinate(c.coordinate()),
                    });
                }
                carets.insert(name, values);
            }
            Some(LigatureCaretList { coverage_format, carets })
        }
        None => None,
    };

    let mark_attach_classes = gdef
        .mark_attach_class_def()
        .transpose()?
        .map(|class_def| read_class_def(&class_def, order));

    let mark_glyph_sets = match gdef.mark_glyph_sets_def().transpose()? {
        Some(sets) => {
            let mut glyph_sets = Vec::new();
            for coverage in sets.coverages().iter() {
                glyph_sets.push(coverage_names(&coverage?, order));
            }
            Some(glyph_sets)
        }
        None => None,
    };

    Ok(GlyphDefinitions {
        glyph_classes,
        attach_points,
        lig_carets,
        mark_attach_classes,
        mark_glyph_sets,
    })
}

/// Class entries in glyph id order.
fn read_class_def(class_def: &ReadClassDef, order: &GlyphOrder) -> ClassDefinition {
    let mut entries: Vec<(u16, u16)> =
        class_def.iter().map(|(gid, class)| (gid.to_u32() as u16, class)).collect();
    entries.sort_unstable();
    entries
        .into_iter()
        .filter_map(|(gid, class)| match order.name(gid) {
            Some(name) => Some((name.clone(), class)),
            None => {
                warn!("GDEF: class for glyph {gid} beyond the glyph order");
                None
            }
        })
        .collect()
}

fn coverage_names(coverage: &ReadCoverage, order: &GlyphOrder) -> Vec<GlyphName> {
    coverage
        .iter()
        .map(|gid| {
            let gid = gid.to_u32() as u16;
            order.name(gid).cloned().unwrap_or_else(|| {
                warn!("GDEF: coverage glyph {gid} beyond the glyph order");
                GlyphName::new(names::fallback_name(gid))
            })
        })
        .collect()
}

pub fn build(gdef: &GlyphDefinitions, order: &GlyphOrder) -> Result<Gdef> {
    let glyph_class_def = gdef
        .glyph_classes
        .as_ref()
        .map(|classes| build_class_def(classes, order))
        .transpose()?;

    let attach_list = match &gdef.attach_points {
        Some(points) => {
            let mut sorted = resolve_all(points, order)?;
            sorted.sort_by_key(|(gid, _)| *gid);
            let coverage = CoverageTable::format_1(sorted.iter().map(|(gid, _)| *gid).collect());
            let attach_points =
                sorted.into_iter().map(|(_, indices)| AttachPoint::new(indices.clone())).collect();
            Some(AttachList::new(coverage, attach_points))
        }
        None => None,
    };

    let lig_caret_list = match &gdef.lig_carets {
        Some(list) => {
            let mut sorted = resolve_all(&list.carets, order)?;
            sorted.sort_by_key(|(gid, _)| *gid);
            let glyphs: Vec<GlyphId16> = sorted.iter().map(|(gid, _)| *gid).collect();
            let coverage = build_coverage(glyphs, list.coverage_format);
            let lig_glyphs = sorted
                .into_iter()
                .map(|(_, values)| {
                    LigGlyph::new(
                        values
                            .iter()
                            .map(|value| match *value {
                                CaretValue::Coordinate(x) => WriteCaretValue::format_1(x),
                                CaretValue::ContourPoint(idx) => WriteCaretValue::format_2(idx),
                            })
                            .collect(),
                    )
                })
                .collect();
            Some(LigCaretList::new(coverage, lig_glyphs))
        }
        None => None,
    };

    let mark_attach_class_def = gdef
        .mark_attach_classes
        .as_ref()
        .map(|classes| build_class_def(classes, order))
        .transpose()?;

    let mut table = Gdef::new(glyph_class_def, attach_list, lig_caret_list, mark_attach_class_def);
    if let Some(sets) = &gdef.mark_glyph_sets {
        let mut coverages = Vec::with_capacity(sets.len());
        for set in sets {
            let mut glyphs =
                set.iter().map(|name| glyph_id(order, name)).collect::<Result<Vec<_>>>()?;
            glyphs.sort_unstable();
            coverages.push(CoverageTable::format_1(glyphs));
        }
        table.mark_glyph_sets_def = MarkGlyphSets::new(coverages).into();
    }
    Ok(table)
}

fn build_class_def(classes: &ClassDefinition, order: &GlyphOrder) -> Result<ClassDef> {
    let mut mappings = Vec::with_capacity(classes.entries.len());
    for (name, &class) in &classes.entries {
        mappings.push((glyph_id(order, name)?, class));
    }
    mappings.sort_unstable();
    Ok(ClassDef::from_iter(mappings))
}

fn build_coverage(glyphs: Vec<GlyphId16>, format: CoverageFormat) -> CoverageTable {
    match format {
        CoverageFormat::GlyphList => CoverageTable::format_1(glyphs),
        CoverageFormat::GlyphRanges => CoverageTable::format_2(glyph_ranges(&glyphs)),
    }
}

/// Runs of consecutive glyph ids in a sorted glyph list.
fn glyph_ranges(glyphs: &[GlyphId16]) -> Vec<RangeRecord> {
    let mut ranges: Vec<RangeRecord> = Vec::new();
    let mut coverage_index = 0u16;
    for chunk in glyphs.chunk_by(|a, b| a.to_u16().checked_add(1) == Some(b.to_u16())) {
        let (Some(&start), Some(&end)) = (chunk.first(), chunk.last()) else {
            continue;
        };
        ranges.push(RangeRecord::new(start, end, coverage_index));
        coverage_index = coverage_index.saturating_add(chunk.len() as u16);
    }
    ranges
}

fn resolve_all<'a, T>(
    entries: &'a IndexMap<GlyphName, T>,
    order: &GlyphOrder,
) -> Result<Vec<(GlyphId16, &'a T)>> {
    entries.iter().map(|(name, value)| Ok((glyph_id(order, name)?, value))).collect()
}

fn glyph_id(order: &GlyphOrder, name: &GlyphName) -> Result<GlyphId16> {
    order
        .glyph_id(name)
        .map(GlyphId16::new)
        .ok_or_else(|| Error::UnknownGlyph { glyph: name.clone(), table: "GDEF" })
}
