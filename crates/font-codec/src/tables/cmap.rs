//! cmap decoding, and rebuilding from the modeled subtables.

use std::collections::BTreeMap;

use ligafont_engine::{
    GlyphName, GlyphOrder,
    tables::cmap::{CharMap, CmapFormat, CmapSubtable, OpaqueSubtable},
};
use log::{debug, warn};
use read_fonts::{
    FontData, FontRead, FontRef, TableProvider,
    tables::cmap::{Cmap4 as ReadCmap4, Cmap12 as ReadCmap12, CmapSubtable as ReadSubtable},
};
use write_fonts::{
    from_obj::FromTableRef,
    tables::cmap::{
        Cmap, Cmap0, Cmap4, Cmap6, Cmap12, CmapSubtable as WriteSubtable, EncodingRecord,
        PlatformId as WritePlatformId, SequentialMapGroup,
    },
};

use crate::error::{Error, Result};

/// Decodes every encoding record of the font's cmap.
///
/// Entries mapped to glyph 0 are treated as unmapped.
pub fn read(font: &FontRef, order: &GlyphOrder) -> Result<CharMap> {
    let cmap = font.cmap()?;
    let data = cmap.offset_data();
    let mut charmap = CharMap::default();

    for record in cmap.encoding_records() {
        let platform_id = record.platform_id() as u16;
        let encoding_id = record.encoding_id();
        let offset = record.subtable_offset().to_u32() as usize;
        let raw = data.split_off(offset).ok_or(read_fonts::ReadError::OutOfBounds)?;
        let format: u16 = raw.read_at(0)?;

        let Some(kind) = CmapFormat::from_number(format) else {
            let len = subtable_len(raw, format)?;
            let bytes = raw.as_bytes().get(..len).ok_or(read_fonts::ReadError::OutOfBounds)?;
            debug!("cmap: keeping format {format} subtable ({platform_id}, {encoding_id}) as is");
            charmap.opaque.push(OpaqueSubtable { platform_id, encoding_id, data: bytes.to_vec() });
            continue;
        };

        let mut subtable = CmapSubtable::new(platform_id, encoding_id, kind);
        let mappings = match record.subtable(data)? {
            ReadSubtable::Format0(f0) => {
                subtable.language = f0.language().into();
                f0.glyph_id_array()
                    .iter()
                    .enumerate()
                    .map(|(code, &gid)| (code as u32, gid as u16))
                    .collect()
            }
            ReadSubtable::Format4(f4) => {
                subtable.language = f4.language().into();
                extract_from_format4(&f4)
            }
            ReadSubtable::Format6(f6) => {
                subtable.language = f6.language().into();
                let first = f6.first_code() as u32;
                f6.glyph_id_array()
                    .iter()
                    .enumerate()
                    .map(|(i, gid)| (first + i as u32, gid.get()))
                    .collect()
            }
            ReadSubtable::Format12(f12) => {
                subtable.language = f12.language();
                extract_from_format12(&f12)
            }
            _ => Vec::new(),
        };

        for (code, gid) in mappings {
            if gid == 0 {
                continue;
            }
            match order.name(gid) {
                Some(name) => {
                    subtable.entries.insert(code, name.clone());
                }
                None => warn!("cmap: U+{code:04X} maps to glyph {gid} beyond the glyph order"),
            }
        }
        charmap.subtables.push(subtable);
    }
    Ok(charmap)
}

fn subtable_len(data: FontData, format: u16) -> Result<usize> {
    Ok(match format {
        0 | 2 | 4 | 6 => data.read_at::<u16>(2)? as usize,
        14 => data.read_at::<u32>(2)? as usize,
        _ => data.read_at::<u32>(4)? as usize,
    })
}

fn extract_from_format4(f4: &ReadCmap4) -> Vec<(u32, u16)> {
    let mut mappings = Vec::new();

    let end_codes = f4.end_code();
    let start_codes = f4.start_code();
    let id_deltas = f4.id_delta();
    let id_range_offsets = f4.id_range_offsets();
    let glyph_id_array = f4.glyph_id_array();

    let seg_count = f4.seg_count_x2() as usize / 2;
    for seg in 0..seg_count {
        let end_code = end_codes.get(seg).map(|v| v.get()).unwrap_or(0xFFFF);
        let start_code = start_codes.get(seg).map(|v| v.get()).unwrap_or(0);
        let id_delta = id_deltas.get(seg).map(|v| v.get()).unwrap_or(0);
        let id_range_offset = id_range_offsets.get(seg).map(|v| v.get()).unwrap_or(0);

        if start_code == 0xFFFF || start_code > end_code {
            continue;
        }

        for cp in start_code..=end_code {
            let gid = if id_range_offset == 0 {
                ((cp as i32 + id_delta as i32) & 0xFFFF) as u16
            } else {
                let glyph_idx = (id_range_offset as usize / 2 + (cp - start_code) as usize)
                    .checked_sub(seg_count - seg);
                match glyph_idx.and_then(|idx| glyph_id_array.get(idx)) {
                    Some(gid) if gid.get() != 0 => {
                        ((gid.get() as i32 + id_delta as i32) & 0xFFFF) as u16
                    }
                    _ => 0,
                }
            };
            mappings.push((cp as u32, gid));
        }
    }
    mappings
}

fn extract_from_format12(f12: &ReadCmap12) -> Vec<(u32, u16)> {
    let mut mappings = Vec::new();
    for group in f12.groups() {
        let start = group.start_char_code();
        let end = group.end_char_code();
        let mut gid = group.start_glyph_id();
        for cp in start..=end.min(0x10FFFF) {
            if let Ok(gid) = u16::try_from(gid) {
                mappings.push((cp, gid));
            }
            gid += 1;
        }
    }
    mappings
}

/// Builds the cmap for `charmap`, resolving glyph names through `order`.
///
/// Encoding records are sorted by platform and encoding; identical subtables
/// are shared by the serializer.
pub fn build(charmap: &CharMap, order: &GlyphOrder) -> Result<Cmap> {
    let mut subtables: Vec<(u16, u16, WriteSubtable)> = Vec::new();
    for subtable in &charmap.subtables {
        let mappings = resolve(subtable, order)?;
        let built = match subtable.format {
            CmapFormat::ByteEncoding => format0(subtable.language as u16, &mappings),
            CmapFormat::SegmentMapping => format4(subtable.language as u16, &mappings)?,
            CmapFormat::TrimmedTable => format6(subtable.language as u16, &mappings)?,
            CmapFormat::SegmentedCoverage => format12(subtable.language, &mappings),
        };
        subtables.push((subtable.platform_id, subtable.encoding_id, built));
    }
    for opaque in &charmap.opaque {
        let parsed = ReadSubtable::read(FontData::new(&opaque.data))?;
        if let ReadSubtable::Format2(_) = parsed {
            warn!(
                "cmap: dropping format 2 subtable ({}, {})",
                opaque.platform_id, opaque.encoding_id
            );
            continue;
        }
        let owned = WriteSubtable::from_table_ref(&parsed);
        subtables.push((opaque.platform_id, opaque.encoding_id, owned));
    }
    subtables.sort_by_key(|(platform_id, encoding_id, _)| (*platform_id, *encoding_id));

    let records = subtables
        .into_iter()
        .map(|(platform_id, encoding_id, subtable)| {
            EncodingRecord::new(WritePlatformId::new(platform_id), encoding_id, subtable)
        })
        .collect();
    Ok(Cmap::new(records))
}

/// Code → glyph id pairs in code order, limited to what the format can hold.
fn resolve(subtable: &CmapSubtable, order: &GlyphOrder) -> Result<BTreeMap<u32, u16>> {
    let max_code = subtable.format.max_code();
    let mut mappings = BTreeMap::new();
    for (&code, name) in &subtable.entries {
        let gid = glyph_id(order, name)?;
        if code > max_code {
            warn!("cmap format {}: dropping out-of-range code {code:#X}", subtable.format.number());
            continue;
        }
        mappings.insert(code, gid);
    }
    Ok(mappings)
}

fn glyph_id(order: &GlyphOrder, name: &GlyphName) -> Result<u16> {
    order
        .glyph_id(name)
        .ok_or_else(|| Error::UnknownGlyph { glyph: name.clone(), table: "cmap" })
}

fn format0(language: u16, mappings: &BTreeMap<u32, u16>) -> WriteSubtable {
    let mut glyph_id_array = vec![0u8; 256];
    for (&code, &gid) in mappings {
        match u8::try_from(gid) {
            Ok(gid) => glyph_id_array[code as usize] = gid,
            Err(_) => {
                warn!("cmap format 0: glyph {gid} for code {code:#04X} needs more than a byte")
            }
        }
    }
    WriteSubtable::Format0(Cmap0 { language, glyph_id_array })
}

struct Segment {
    start: u16,
    end: u16,
    delta: u16,
    /// Index of the segment's first glyph in the glyph id array, if it uses one.
    array_start: Option<usize>,
}

fn format4(language: u16, mappings: &BTreeMap<u32, u16>) -> Result<WriteSubtable> {
    // 0xFFFF is reserved for the closing segment
    let pairs: Vec<(u16, u16)> = mappings
        .iter()
        .filter(|&(&code, _)| code < 0xFFFF)
        .map(|(&code, &gid)| (code as u16, gid))
        .collect();

    let mut segments = Vec::new();
    let mut glyph_id_array: Vec<u16> = Vec::new();
    for run in pairs.chunk_by(|a, b| a.0 + 1 == b.0) {
        let (start, first_gid) = run[0];
        let end = run[run.len() - 1].0;
        let delta = first_gid.wrapping_sub(start);
        if run.iter().all(|&(code, gid)| gid.wrapping_sub(code) == delta) {
            segments.push(Segment { start, end, delta, array_start: None });
        } else {
            let array_start = Some(glyph_id_array.len());
            segments.push(Segment { start, end, delta: 0, array_start });
            glyph_id_array.extend(run.iter().map(|&(_, gid)| gid));
        }
    }
    segments.push(Segment { start: 0xFFFF, end: 0xFFFF, delta: 1, array_start: None });

    let seg_count = segments.len();
    if 16 + 8 * seg_count + 2 * glyph_id_array.len() > u16::MAX as usize {
        return Err(Error::TableOverflow("cmap format 4"));
    }
    let id_range_offsets = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| match segment.array_start {
            Some(idx) => u16::try_from(2 * (seg_count - i + idx))
                .map_err(|_| Error::TableOverflow("cmap format 4")),
            None => Ok(0),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WriteSubtable::Format4(Cmap4 {
        language,
        end_code: segments.iter().map(|s| s.end).collect(),
        start_code: segments.iter().map(|s| s.start).collect(),
        id_delta: segments.iter().map(|s| s.delta as i16).collect(),
        id_range_offsets,
        glyph_id_array,
    }))
}

fn format6(language: u16, mappings: &BTreeMap<u32, u16>) -> Result<WriteSubtable> {
    let (first, last) = match (mappings.keys().next(), mappings.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => (0, 0),
    };
    let count = if mappings.is_empty() { 0 } else { (last - first + 1) as usize };
    let length =
        u16::try_from(10 + 2 * count).map_err(|_| Error::TableOverflow("cmap format 6"))?;
    let glyph_id_array: Vec<u16> =
        (first..).take(count).map(|code| mappings.get(&code).copied().unwrap_or(0)).collect();

    Ok(WriteSubtable::Format6(Cmap6 {
        length,
        language,
        first_code: first as u16,
        entry_count: count as u16,
        glyph_id_array,
    }))
}

fn format12(language: u32, mappings: &BTreeMap<u32, u16>) -> WriteSubtable {
    let groups = build_sequential_groups(mappings);
    WriteSubtable::Format12(Cmap12 { language, groups })
}

/// Groups consecutive codes that map to consecutive glyph ids.
fn build_sequential_groups(mappings: &BTreeMap<u32, u16>) -> Vec<SequentialMapGroup> {
    let mut groups: Vec<SequentialMapGroup> = Vec::new();
    for (&code, &gid) in mappings {
        let gid = gid as u32;
        match groups.last_mut() {
            Some(group)
                if code == group.end_char_code + 1
                    && gid == group.start_glyph_id + (code - group.start_char_code) =>
            {
                group.end_char_code = code;
            }
            _ => groups.push(SequentialMapGroup::new(code, code, gid)),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use read_fonts::tables::cmap::Cmap as ReadCmap;

    use super::*;

    fn order() -> GlyphOrder {
        [".notdef", "a", "b", "c", "house", "star"].into_iter().map(GlyphName::new).collect()
    }

    fn encode(charmap: &CharMap, order: &GlyphOrder) -> Vec<u8> {
        write_fonts::dump_table(&build(charmap, order).unwrap()).unwrap()
    }

    fn read_back(data: &[u8], order: &GlyphOrder) -> Vec<(u16, u16, BTreeMap<u32, String>)> {
        let cmap = ReadCmap::read(FontData::new(data)).unwrap();
        cmap.encoding_records()
            .iter()
            .map(|record| {
                let entries = match record.subtable(cmap.offset_data()).unwrap() {
                    ReadSubtable::Format0(f0) => f0
                        .glyph_id_array()
                        .iter()
                        .enumerate()
                        .map(|(code, &gid)| (code as u32, gid as u16))
                        .collect(),
                    ReadSubtable::Format4(f4) => extract_from_format4(&f4),
                    ReadSubtable::Format6(f6) => f6
                        .glyph_id_array()
                        .iter()
                        .enumerate()
                        .map(|(i, gid)| (f6.first_code() as u32 + i as u32, gid.get()))
                        .collect(),
                    ReadSubtable::Format12(f12) => extract_from_format12(&f12),
                    _ => Vec::new(),
                };
                let entries = entries
                    .into_iter()
                    .filter(|&(_, gid)| gid != 0)
                    .map(|(code, gid)| (code, order.name(gid).unwrap().to_string()))
                    .collect();
                (record.platform_id() as u16, record.encoding_id(), entries)
            })
            .collect()
    }

    fn names(entries: &[(u32, &str)]) -> BTreeMap<u32, String> {
        entries.iter().map(|&(code, name)| (code, name.to_string())).collect()
    }

    #[test]
    fn test_format4_mixed_segments() {
        let order = order();
        let subtable = CmapSubtable::new(3, 1, CmapFormat::SegmentMapping).with_entries([
            (0x61, "a"),
            (0x62, "b"),
            (0x63, "c"),
            (0xE000, "star"),
            (0xE001, "house"),
            (0xE002, "a"),
        ]);
        let charmap = CharMap { subtables: vec![subtable.clone()], opaque: vec![] };

        let decoded = read_back(&encode(&charmap, &order), &order);

        let expected: BTreeMap<u32, String> =
            subtable.entries.iter().map(|(&c, n)| (c, n.to_string())).collect();
        assert_eq!(decoded, vec![(3, 1, expected)]);
    }

    #[test]
    fn test_records_sorted_and_shared() {
        let order = order();
        let entries = [(0x1F600, "star"), (0x61, "a")];
        let charmap = CharMap {
            subtables: vec![
                CmapSubtable::new(3, 10, CmapFormat::SegmentedCoverage).with_entries(entries),
                CmapSubtable::new(0, 4, CmapFormat::SegmentedCoverage).with_entries(entries),
            ],
            opaque: vec![],
        };

        let data = encode(&charmap, &order);
        let cmap = ReadCmap::read(FontData::new(&data)).unwrap();
        let records = cmap.encoding_records();

        assert_eq!(records[0].platform_id() as u16, 0);
        assert_eq!(records[1].platform_id() as u16, 3);
        assert_eq!(records[0].subtable_offset(), records[1].subtable_offset());
        assert_eq!(read_back(&data, &order)[1].2.get(&0x1F600).map(String::as_str), Some("star"));
    }

    #[test]
    fn test_single_byte_formats() {
        let order = order();
        let entries = [(0x41, "a"), (0x43, "c")];
        let charmap = CharMap {
            subtables: vec![
                CmapSubtable::new(1, 0, CmapFormat::ByteEncoding).with_entries(entries),
                CmapSubtable::new(3, 0, CmapFormat::TrimmedTable).with_entries(entries),
            ],
            opaque: vec![],
        };

        let data = encode(&charmap, &order);
        let expected = names(&[(0x41, "a"), (0x43, "c")]);
        assert_eq!(read_back(&data, &order), vec![(1, 0, expected.clone()), (3, 0, expected)]);

        let cmap = ReadCmap::read(FontData::new(&data)).unwrap();
        let Ok(ReadSubtable::Format6(f6)) = cmap.encoding_records()[1].subtable(cmap.offset_data())
        else {
            panic!("expected a format 6 subtable");
        };
        assert_eq!((f6.first_code(), f6.entry_count()), (0x41, 3));
    }

    #[test]
    fn test_variation_sequences_are_kept() {
        let order = order();
        let mut format14 = Vec::new();
        format14.extend_from_slice(&14u16.to_be_bytes());
        format14.extend_from_slice(&29u32.to_be_bytes());
        format14.extend_from_slice(&1u32.to_be_bytes());
        format14.extend_from_slice(&[0x00, 0xFE, 0x0F]);
        format14.extend_from_slice(&21u32.to_be_bytes());
        format14.extend_from_slice(&0u32.to_be_bytes());
        format14.extend_from_slice(&1u32.to_be_bytes());
        format14.extend_from_slice(&[0x00, 0x27, 0x64, 0x00]);
        let charmap = CharMap {
            subtables: vec![
                CmapSubtable::new(0, 3, CmapFormat::SegmentMapping).with_entries([(0x61, "a")]),
            ],
            opaque: vec![OpaqueSubtable { platform_id: 0, encoding_id: 5, data: format14 }],
        };

        let data = encode(&charmap, &order);
        let cmap = ReadCmap::read(FontData::new(&data)).unwrap();
        let records = cmap.encoding_records();
        assert_eq!(records.len(), 2);
        let Ok(ReadSubtable::Format14(f14)) = records[1].subtable(cmap.offset_data()) else {
            panic!("expected a format 14 subtable");
        };
        let selector = &f14.var_selector()[0];
        assert_eq!(u32::from(selector.var_selector()), 0xFE0F);
        let ranges = selector.default_uvs(f14.offset_data()).unwrap().unwrap();
        assert_eq!(u32::from(ranges.ranges()[0].start_unicode_value()), 0x2764);
    }

    #[test]
    fn test_unknown_glyph() {
        let charmap = CharMap {
            subtables: vec![
                CmapSubtable::new(3, 1, CmapFormat::SegmentMapping).with_entries([(0x61, "zz")]),
            ],
            opaque: vec![],
        };
        assert!(matches!(
            build(&charmap, &order()),
            Err(Error::UnknownGlyph { table: "cmap", .. })
        ));
    }

    #[test]
    fn test_sequential_groups() {
        let mappings = BTreeMap::from([(0x61, 1), (0x62, 2), (0x63, 3), (0x65, 4), (0x66, 6)]);
        assert_eq!(
            build_sequential_groups(&mappings),
            vec![
                SequentialMapGroup::new(0x61, 0x63, 1),
                SequentialMapGroup::new(0x65, 0x65, 4),
                SequentialMapGroup::new(0x66, 0x66, 6),
            ]
        );
    }
}
