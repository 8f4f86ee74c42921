//! Decode/transform/encode tests on synthetic TrueType fonts.

use font_types::{GlyphId16, Tag};
use ligafont_codec::{ContainerFormat, Error, decode, encode, encode_sfnt};
use ligafont_engine::{
    GlyphName, LigatureMapping, Ligaturizer, TableSet,
    tables::gdef::{CaretValue, CoverageFormat},
};
use pretty_assertions::assert_eq;
use read_fonts::{
    FontRef, TableProvider,
    tables::{compute_checksum, gsub::SubstitutionSubtables},
    types::GlyphId,
};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        gdef::{CaretValue as WriteCaretValue, Gdef, LigCaretList, LigGlyph},
        glyf::{Bbox, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        layout::{ClassDef, CoverageTable},
        maxp::Maxp,
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

const GLYPHS: &[&str] = &[".notdef", "legacy", "house", "star"];
const ADVANCES: &[u16] = &[500, 600, 700, 700];

/// A small icon font: `h` maps to a legacy glyph, the icons sit in the
/// private use area, and GDEF classifies every named glyph.
fn icon_font() -> Vec<u8> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    for _ in GLYPHS {
        let simple = SimpleGlyph {
            bbox: Bbox { x_min: 0, y_min: 0, x_max: 500, y_max: 700 },
            contours: vec![],
            instructions: vec![],
        };
        glyf_builder.add_glyph(&Glyph::Simple(simple)).unwrap();
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let cmap = Cmap::from_mappings([
        ('h', GlyphId::new(1)),
        ('\u{E100}', GlyphId::new(2)),
        ('\u{E101}', GlyphId::new(3)),
    ])
    .unwrap();

    let head = Head {
        font_revision: font_types::Fixed::from_f64(1.5),
        checksum_adjustment: 0,
        magic_number: 0x5F0F3CF5,
        flags: write_fonts::tables::head::Flags::empty(),
        units_per_em: 1000,
        created: font_types::LongDateTime::new(0),
        modified: font_types::LongDateTime::new(0),
        x_min: 0,
        y_min: 0,
        x_max: 500,
        y_max: 700,
        mac_style: write_fonts::tables::head::MacStyle::empty(),
        lowest_rec_ppem: 8,
        font_direction_hint: 2,
        index_to_loc_format: match loca_format {
            write_fonts::tables::loca::LocaFormat::Short => 0,
            write_fonts::tables::loca::LocaFormat::Long => 1,
        },
    };

    let hhea = Hhea {
        ascender: font_types::FWord::new(700),
        descender: font_types::FWord::new(-200),
        line_gap: font_types::FWord::new(0),
        advance_width_max: font_types::UfWord::new(700),
        min_left_side_bearing: font_types::FWord::new(0),
        min_right_side_bearing: font_types::FWord::new(0),
        x_max_extent: font_types::FWord::new(500),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: GLYPHS.len() as u16,
    };

    let hmtx = Hmtx {
        h_metrics: ADVANCES
            .iter()
            .map(|&advance| LongMetric { advance, side_bearing: 0 })
            .collect(),
        left_side_bearings: vec![],
    };

    let maxp = Maxp {
        num_glyphs: GLYPHS.len() as u16,
        max_points: Some(0),
        max_contours: Some(0),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let os2 = Os2 {
        x_avg_char_width: 650,
        us_weight_class: 400,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: 650,
        y_subscript_y_size: 600,
        y_subscript_x_offset: 0,
        y_subscript_y_offset: 75,
        y_superscript_x_size: 650,
        y_superscript_y_size: 600,
        y_superscript_x_offset: 0,
        y_superscript_y_offset: 350,
        y_strikeout_size: 50,
        y_strikeout_position: 300,
        s_family_class: 0,
        panose_10: [0; 10],
        ul_unicode_range_1: 0,
        ul_unicode_range_2: 0,
        ul_unicode_range_3: 0,
        ul_unicode_range_4: 0,
        ach_vend_id: Tag::new(b"NONE"),
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: 0x68,
        us_last_char_index: 0xE101,
        s_typo_ascender: 700,
        s_typo_descender: -200,
        s_typo_line_gap: 0,
        us_win_ascent: 900,
        us_win_descent: 200,
        ul_code_page_range_1: Some(0),
        ul_code_page_range_2: Some(0),
        sx_height: Some(500),
        s_cap_height: Some(700),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),
        us_lower_optical_point_size: None,
        us_upper_optical_point_size: None,
    };

    let mut post = Post::new_v2(GLYPHS.iter().copied());
    post.underline_position = font_types::FWord::new(-100);
    post.underline_thickness = font_types::FWord::new(50);

    let classes = ClassDef::from_iter([
        (GlyphId16::new(1), 1),
        (GlyphId16::new(2), 1),
        (GlyphId16::new(3), 1),
    ]);
    let carets = LigCaretList::new(
        CoverageTable::format_1(vec![GlyphId16::new(2)]),
        vec![LigGlyph::new(vec![WriteCaretValue::format_1(120)])],
    );
    let gdef = Gdef::new(Some(classes), None, Some(carets), None);

    let mut builder = FontBuilder::new();
    builder.add_table(&head).unwrap();
    builder.add_table(&hhea).unwrap();
    builder.add_table(&hmtx).unwrap();
    builder.add_table(&maxp).unwrap();
    builder.add_table(&cmap).unwrap();
    builder.add_table(&os2).unwrap();
    builder.add_table(&post).unwrap();
    builder.add_table(&glyf).unwrap();
    builder.add_table(&loca).unwrap();
    builder.add_table(&gdef).unwrap();
    builder.build()
}

fn mapping() -> LigatureMapping {
    [("home", "house"), ("star", "star")].into_iter().collect()
}

fn transformed() -> TableSet {
    let mut tables = decode(&icon_font()).unwrap();
    Ligaturizer::default().transform(&mut tables, &mapping()).unwrap();
    tables
}

fn names(tables: &TableSet) -> Vec<&str> {
    tables.glyph_order.iter().map(|(_, name)| name.as_str()).collect()
}

#[test]
fn test_decode_models_tables() {
    let tables = decode(&icon_font()).unwrap();

    assert_eq!(names(&tables), GLYPHS);
    let codes: Vec<(u32, &str)> = tables.cmap.subtables[0]
        .entries
        .iter()
        .map(|(&code, name)| (code, name.as_str()))
        .collect();
    assert_eq!(codes, vec![(0x68, "legacy"), (0xE100, "house"), (0xE101, "star")]);

    let gdef = tables.gdef.as_ref().unwrap();
    assert_eq!(gdef.glyph_classes.as_ref().unwrap().get("house"), Some(1));
    let carets = gdef.lig_carets.as_ref().unwrap();
    assert_eq!(carets.carets.get("house"), Some(&vec![CaretValue::Coordinate(120)]));

    assert_eq!(tables.hmtx.get("star").unwrap().advance, 700);
    assert!(tables.glyf.is_some());
    assert!(tables.cff.is_none());
    for tag in [b"head", b"hhea", b"maxp", b"post"] {
        assert!(tables.raw_table(Tag::new(tag)).is_some());
    }
    for tag in [b"cmap", b"glyf", b"loca", b"hmtx", b"GDEF"] {
        assert!(tables.raw_table(Tag::new(tag)).is_none());
    }
}

#[test]
fn test_transformed_font_round_trips() {
    let first = transformed();
    let bytes = encode_sfnt(&first).unwrap();
    let second = decode(&bytes).unwrap();

    assert_eq!(second.glyph_order, first.glyph_order);
    assert_eq!(second.cmap, first.cmap);
    assert_eq!(second.gdef, first.gdef);
    assert_eq!(second.hmtx, first.hmtx);
    assert_eq!(encode_sfnt(&second).unwrap(), bytes);
}

#[test]
fn test_encoding_is_deterministic() {
    let tables = transformed();
    for format in ContainerFormat::ALL {
        assert_eq!(encode(&tables, format).unwrap(), encode(&tables, format).unwrap(), "{format}");
    }
}

#[test]
fn test_encoded_font_contents() {
    let bytes = encode_sfnt(&transformed()).unwrap();
    let font = FontRef::new(&bytes).unwrap();

    // h, o, m, e, s, t, a, r
    assert_eq!(font.maxp().unwrap().num_glyphs(), GLYPHS.len() as u16 + 8);
    let cmap = font.cmap().unwrap();
    let h = cmap.map_codepoint('h').unwrap();
    assert_eq!(font.post().unwrap().glyph_name(GlyphId16::new(h.to_u32() as u16)), Some("h"));
    assert_eq!(cmap.map_codepoint(0xE001u32), Some(GlyphId::new(1)));
    assert_eq!(font.hmtx().unwrap().advance(h), Some(0));

    let gsub = font.gsub().unwrap();
    let lookup = gsub.lookup_list().unwrap().lookups().get(0).unwrap();
    let SubstitutionSubtables::Ligature(subtables) = lookup.subtables().unwrap() else {
        panic!("expected a ligature lookup");
    };
    assert_eq!(subtables.get(0).unwrap().ligature_sets().len(), 2);

    let gpos = font.gpos().unwrap();
    assert_eq!(gpos.feature_list().unwrap().feature_records()[0].feature_tag(), Tag::new(b"size"));

    assert_eq!(compute_checksum(&bytes), 0xB1B0_AFBA);
}

#[test]
fn test_os2_char_range_follows_cmap() {
    let original = FontRef::new(&icon_font()).unwrap().os2().unwrap().us_first_char_index();
    assert_eq!(original, 0x68);

    let bytes = encode_sfnt(&transformed()).unwrap();
    let os2 = FontRef::new(&bytes).unwrap().os2().unwrap();
    // 'a' from "star" is now the lowest mapped code
    assert_eq!(os2.us_first_char_index(), 0x61);
    assert_eq!(os2.us_last_char_index(), 0xE101);
    assert_eq!(os2.us_weight_class(), 400);
}

#[test]
fn test_woff_round_trip() {
    let tables = transformed();
    let woff = encode(&tables, ContainerFormat::Woff).unwrap();
    assert_eq!(ContainerFormat::detect(&woff), Some(ContainerFormat::Woff));

    let decoded = decode(&woff).unwrap();
    assert_eq!(decoded.glyph_order, tables.glyph_order);
    assert_eq!(decoded.cmap, tables.cmap);
    assert_eq!(encode_sfnt(&decoded).unwrap(), encode_sfnt(&tables).unwrap());
}

#[test]
fn test_woff2_output() {
    let woff2 = encode(&transformed(), ContainerFormat::Woff2).unwrap();
    assert_eq!(&woff2[..4], b"wOF2");
    assert!(matches!(decode(&woff2), Err(Error::Woff2Input)));
}

#[test]
fn test_unknown_container() {
    assert!(matches!(decode(b"not a font"), Err(Error::UnknownContainer)));
}

#[test]
fn test_upgraded_carets_use_glyph_list() {
    let tables = transformed();
    let gdef = tables.gdef.as_ref().unwrap();
    assert_eq!(gdef.lig_carets.as_ref().unwrap().coverage_format, CoverageFormat::GlyphList);
    assert_eq!(
        gdef.glyph_classes.as_ref().unwrap().get(GlyphName::for_char('h').as_str()),
        Some(1)
    );
}
