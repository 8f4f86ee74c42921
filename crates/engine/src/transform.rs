//! The end-to-end transformation.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::{
    allocator::CodeAllocator,
    error::{Error, Result},
    glyph_order::{self, GlyphName},
    mapping::LigatureMapping,
    placeholder::{self, OutlineKind},
    tables::{
        TableSet, cmap, gdef, gpos,
        gsub::{self, LigatureSubstitution, SubstitutionTable},
        hmtx,
    },
    types::{Options, TransformReport},
};

/// Runs the table edits in their fixed order.
///
/// Every check that can fail runs before the first table is touched, and the
/// cmap rewrite is staged on a copy. If `transform` still returns an error the
/// table set must be discarded.
#[derive(Debug, Clone, Default)]
pub struct Ligaturizer {
    options: Options,
}

impl Ligaturizer {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn transform(
        &self,
        tables: &mut TableSet,
        mapping: &LigatureMapping,
    ) -> Result<TransformReport> {
        let triggers = mapping.trigger_chars();
        let lookup = gsub::build(mapping)?;
        let kind = Self::validate(tables, mapping, &triggers)?;
        debug!("{kind:?} outlines, {} trigger characters", triggers.len());

        let mut staged = tables.cmap.clone();
        let reserved = staged.codes().into_iter().chain(triggers.iter().map(|&c| c as u32));
        let mut allocator =
            CodeAllocator::new(self.options.private_use_base).with_reserved(reserved);
        let assignment = cmap::rewrite(&mut staged, &triggers, &mut allocator)?;
        tables.cmap = staged;

        let placeholders_added = placeholder::insert_placeholders(tables, &triggers)?;
        glyph_order::append_placeholders(&mut tables.glyph_order, &triggers);
        gdef::upgrade(tables.gdef.as_mut(), &triggers)?;
        hmtx::extend(&mut tables.hmtx, &triggers);
        if self.options.replace_positioning || tables.gpos.is_none() {
            gpos::rebuild_positioning_stub(tables, self.options.script);
        }

        let report = TransformReport {
            placeholders_added,
            ligature_sets: lookup.sets.len(),
            ligature_rules: lookup.rule_count(),
            relocated_codes: assignment.relocated,
            removed_entries: assignment.removed,
            glyph_codes: assignment.glyph_codes,
        };
        tables.gsub = Some(SubstitutionTable::Ligatures(LigatureSubstitution {
            script: self.options.script,
            feature: self.options.feature,
            lookup,
        }));

        info!("{report}");
        Ok(report)
    }

    fn validate(
        tables: &TableSet,
        mapping: &LigatureMapping,
        triggers: &BTreeSet<char>,
    ) -> Result<OutlineKind> {
        let kind = OutlineKind::detect(tables)?;
        let gdef = tables.gdef.as_ref().ok_or(Error::MissingClassTable("table"))?;
        gdef::check_upgradable(gdef)?;

        for (_, target) in mapping.iter() {
            if !tables.glyph_order.contains(target) {
                return Err(Error::UnknownGlyph(target.clone()));
            }
        }
        for &c in triggers {
            let name = GlyphName::for_char(c);
            if tables.glyph_order.contains(&name) {
                return Err(Error::GlyphNameConflict(name));
            }
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tables::{
        cmap::{CharMap, CmapFormat, CmapSubtable},
        gdef::{ClassDefinition, GlyphDefinitions, LigatureCaretList},
        gpos::PositioningTable,
        hmtx::Metric,
        outlines::{GlyphTable, TrueTypeGlyph},
    };

    fn tables() -> TableSet {
        let names = [".notdef", "house", "shield"];
        let mut tables = TableSet {
            glyph_order: names.iter().map(|&n| GlyphName::new(n)).collect(),
            cmap: CharMap {
                subtables: vec![CmapSubtable::new(3, 1, CmapFormat::SegmentMapping)
                    .with_entries([(0xE900, "house"), (0xE901, "shield")])],
                opaque: vec![],
            },
            glyf: Some(GlyphTable::default()),
            gdef: Some(GlyphDefinitions {
                glyph_classes: Some(ClassDefinition::from_iter([("house", 1), ("shield", 1)])),
                lig_carets: Some(LigatureCaretList::default()),
                ..Default::default()
            }),
            ..Default::default()
        };
        for name in names {
            tables.glyf.as_mut().unwrap().glyphs.insert(name.into(), TrueTypeGlyph::Empty);
            tables.hmtx.metrics.insert(name.into(), Metric { advance: 1000, side_bearing: 0 });
        }
        tables
    }

    #[test]
    fn test_transform() {
        let mut tables = tables();
        let mapping: LigatureMapping =
            [("home", "house"), ("hero", "shield")].into_iter().collect();

        let report = Ligaturizer::default().transform(&mut tables, &mapping).unwrap();

        assert_eq!(report.placeholders_added, 5);
        assert_eq!(report.ligature_sets, 1);
        assert_eq!(report.ligature_rules, 2);
        assert_eq!(tables.glyph_order.len(), 8);
        assert_eq!(tables.glyph_order.glyph_id("house"), Some(1));
        assert_eq!(tables.glyf.as_ref().unwrap().glyphs.len(), 8);
        assert_eq!(tables.hmtx.get("m"), Some(Metric::default()));
        assert!(matches!(tables.gpos, Some(PositioningTable::Stub(_))));

        let Some(SubstitutionTable::Ligatures(gsub)) = &tables.gsub else {
            panic!("expected ligature GSUB");
        };
        let targets: Vec<&str> =
            gsub.lookup.sets[0].rules.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["house", "shield"]);

        let entries = &tables.cmap.subtables[0].entries;
        assert_eq!(entries.get(&('h' as u32)).map(|g| g.as_str()), Some("h"));
    }

    #[test]
    fn test_keep_existing_positioning() {
        let mut tables = tables();
        tables.gpos = Some(PositioningTable::Preserved(vec![0, 1, 0, 0]));
        let mapping: LigatureMapping = [("ab", "house")].into_iter().collect();

        Ligaturizer::new(Options::new().with_replace_positioning(false))
            .transform(&mut tables, &mapping)
            .unwrap();

        assert_eq!(tables.gpos, Some(PositioningTable::Preserved(vec![0, 1, 0, 0])));
    }

    #[test]
    fn test_duplicate_target_leaves_tables_untouched() {
        let mut tables = tables();
        let before = tables.clone();
        let mapping: LigatureMapping = [("ab", "house"), ("cd", "house")].into_iter().collect();

        let err = Ligaturizer::default().transform(&mut tables, &mapping).unwrap_err();

        assert!(matches!(err, Error::DuplicateTarget { .. }));
        assert_eq!(tables.glyph_order, before.glyph_order);
        assert_eq!(tables.cmap, before.cmap);
        assert_eq!(tables.gdef, before.gdef);
        assert!(tables.gsub.is_none());
    }

    #[test]
    fn test_unknown_target() {
        let mut tables = tables();
        let mapping: LigatureMapping = [("x", "missing")].into_iter().collect();
        assert!(matches!(
            Ligaturizer::default().transform(&mut tables, &mapping),
            Err(Error::UnknownGlyph(name)) if name == "missing"
        ));
    }

    #[test]
    fn test_placeholder_name_conflict() {
        let mut tables = tables();
        tables.glyph_order.push("h".into());
        let mapping: LigatureMapping = [("home", "house")].into_iter().collect();
        assert!(matches!(
            Ligaturizer::default().transform(&mut tables, &mapping),
            Err(Error::GlyphNameConflict(_))
        ));
    }

    #[test]
    fn test_missing_gdef() {
        let mut tables = TableSet { gdef: None, ..tables() };
        let mapping: LigatureMapping = [("a", "house")].into_iter().collect();
        assert!(matches!(
            Ligaturizer::default().transform(&mut tables, &mapping),
            Err(Error::MissingClassTable(_))
        ));
    }
}
