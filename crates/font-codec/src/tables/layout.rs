//! GSUB ligature lookup and GPOS stub construction.

use font_types::{GlyphId16, Tag};
use ligafont_engine::{
    GlyphName, GlyphOrder,
    tables::{
        gpos::PositioningStub,
        gsub::{LigatureLookup, LigatureSubstitution},
    },
};
use write_fonts::tables::{
    gpos::{Gpos, PositionLookupList},
    gsub::{
        Gsub, Ligature, LigatureSet, LigatureSubstFormat1, SubstitutionLookup,
        SubstitutionLookupList,
    },
    layout::{
        CoverageTable, Feature, FeatureList, FeatureParams, FeatureRecord, LangSys, Lookup,
        LookupFlag, Script, ScriptList, ScriptRecord, SizeParams,
    },
};

use crate::error::{Error, Result};

/// One script whose default language system enables the single feature at
/// index 0.
fn single_script(script: Tag) -> ScriptList {
    let lang_sys = LangSys::new(vec![0]);
    ScriptList::new(vec![ScriptRecord::new(script, Script::new(Some(lang_sys), vec![]))])
}

pub fn build_gsub(gsub: &LigatureSubstitution, order: &GlyphOrder) -> Result<Gsub> {
    let feature = Feature::new(None, vec![0]);
    let feature_list = FeatureList::new(vec![FeatureRecord::new(gsub.feature, feature)]);
    let lookup = ligature_lookup(&gsub.lookup, order)?;
    let lookup_list = SubstitutionLookupList::new(vec![lookup]);
    Ok(Gsub::new(single_script(gsub.script), feature_list, lookup_list))
}

/// Coverage is indexed by glyph id, so sets are emitted in start glyph order.
/// Rule order within a set is kept.
fn ligature_lookup(lookup: &LigatureLookup, order: &GlyphOrder) -> Result<SubstitutionLookup> {
    let mut sets = Vec::with_capacity(lookup.sets.len());
    for set in &lookup.sets {
        let mut ligatures = Vec::with_capacity(set.rules.len());
        for rule in &set.rules {
            let components =
                rule.components.iter().map(|name| glyph_id(order, name)).collect::<Result<_>>()?;
            ligatures.push(Ligature::new(glyph_id(order, &rule.target)?, components));
        }
        sets.push((glyph_id(order, &set.start)?, LigatureSet::new(ligatures)));
    }
    sets.sort_by_key(|(start, _)| *start);

    let (coverage, sets): (Vec<GlyphId16>, Vec<LigatureSet>) = sets.into_iter().unzip();
    let subtable = LigatureSubstFormat1::new(CoverageTable::format_1(coverage), sets);
    Ok(SubstitutionLookup::Ligature(Lookup::new(LookupFlag::empty(), vec![subtable])))
}

pub fn build_gpos(stub: &PositioningStub) -> Gpos {
    let size = stub.size;
    let params = FeatureParams::Size(SizeParams::new(
        size.design_size,
        size.subfamily_id,
        size.subfamily_name_id,
        size.range_start,
        size.range_end,
    ));
    let feature = Feature::new(Some(params), vec![]);
    let feature_list =
        FeatureList::new(vec![FeatureRecord::new(PositioningStub::FEATURE, feature)]);
    Gpos::new(single_script(stub.script), feature_list, PositionLookupList::new(vec![]))
}

fn glyph_id(order: &GlyphOrder, name: &GlyphName) -> Result<GlyphId16> {
    order
        .glyph_id(name)
        .map(GlyphId16::new)
        .ok_or_else(|| Error::UnknownGlyph { glyph: name.clone(), table: "GSUB" })
}
