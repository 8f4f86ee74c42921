//! Mapping files and `SEQUENCE=GLYPH` arguments.

use std::{fs::read_to_string, path::Path};

use anyhow::{Context, Result, bail};
use ligafont_engine::LigatureMapping;
use serde::Deserialize;

/// The two accepted mapping file layouts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MappingFile {
    /// `{ "house": "home", ... }`: glyph name to ligature.
    ByGlyph(indexmap::IndexMap<String, String>),
    /// `[{ "sequence": "home", "glyph": "house" }, ...]`
    Records(Vec<Assignment>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Assignment {
    pub sequence: String,
    pub glyph: String,
}

/// Parses a mapping file's contents into glyph assignments, in file order.
pub fn parse_mapping(json: &str) -> Result<Vec<Assignment>> {
    let file: MappingFile = serde_json::from_str(json)
        .context("Mapping must be an object of glyph names or a list of records")?;
    Ok(match file {
        MappingFile::ByGlyph(entries) => entries
            .into_iter()
            .map(|(glyph, sequence)| Assignment { sequence, glyph })
            .collect(),
        MappingFile::Records(records) => records,
    })
}

pub fn load_mapping(path: &Path) -> Result<Vec<Assignment>> {
    let json = read_to_string(path)
        .with_context(|| format!("Failed to read mapping: {}", path.display()))?;
    parse_mapping(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parses a `SEQUENCE=GLYPH` command-line assignment.
pub fn parse_assignment(s: &str) -> Result<Assignment> {
    let Some((sequence, glyph)) = s.split_once('=') else {
        bail!("expected SEQUENCE=GLYPH: {s}");
    };
    if sequence.is_empty() || glyph.is_empty() {
        bail!("empty sequence or glyph in {s}");
    }
    Ok(Assignment { sequence: sequence.to_string(), glyph: glyph.to_string() })
}

/// Combines assignments into a mapping; a ligature given to two glyphs is an
/// error.
pub fn build_mapping(assignments: &[Assignment]) -> Result<LigatureMapping> {
    let mapping = LigatureMapping::from_assignments(
        assignments.iter().map(|a| (a.glyph.as_str(), a.sequence.as_str())),
    )?;
    mapping.validate()?;
    Ok(mapping)
}
