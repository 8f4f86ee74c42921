//! The `build` pipeline: decode, ligaturize, encode every format, then write.

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result, bail};
use ligafont_codec::{ContainerFormat, decode, encode_sfnt, wrap};
use ligafont_engine::{LigatureMapping, Ligaturizer, Options, TransformReport};
use log::{debug, info};
use rayon::prelude::*;

use crate::{
    check::verify_triggers,
    io::{OutputFile, read_font},
    mapping::{Assignment, build_mapping, load_mapping},
    preview,
};

/// Everything one build needs.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub input: PathBuf,
    pub mapping_files: Vec<PathBuf>,
    /// Applied after the mapping files, in order.
    pub assignments: Vec<Assignment>,
    pub output_dir: PathBuf,
    /// Output file stem; defaults to the input's.
    pub name: Option<String>,
    pub formats: Vec<ContainerFormat>,
    pub preview: bool,
    pub options: Options,
}

impl BuildPlan {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            mapping_files: Vec::new(),
            assignments: Vec::new(),
            output_dir: output_dir.into(),
            name: None,
            formats: ContainerFormat::ALL.to_vec(),
            preview: true,
            options: Options::default(),
        }
    }

    pub fn font_name(&self) -> Result<String> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        self.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .with_context(|| format!("No file name in {}", self.input.display()))
    }

    fn mapping(&self) -> Result<LigatureMapping> {
        let mut assignments = Vec::new();
        for path in &self.mapping_files {
            assignments.extend(load_mapping(path)?);
        }
        assignments.extend(self.assignments.iter().cloned());
        if assignments.is_empty() {
            bail!("No ligatures given; pass a mapping file or SEQUENCE=GLYPH with -m");
        }
        build_mapping(&assignments)
    }
}

/// Files written by a successful build.
#[derive(Debug)]
pub struct BuildOutcome {
    pub written: Vec<PathBuf>,
    pub report: TransformReport,
}

/// Runs the build. Nothing is written unless every format encodes.
pub fn build(plan: &BuildPlan) -> Result<BuildOutcome> {
    let start = Instant::now();
    let name = plan.font_name()?;
    let mapping = plan.mapping()?;

    let data = read_font(&plan.input)?;
    let mut tables = decode(&data)
        .with_context(|| format!("Failed to decode {}", plan.input.display()))?;
    info!("Loaded {} ({} glyphs)", plan.input.display(), tables.glyph_order.len());

    let report = Ligaturizer::new(plan.options.clone())
        .transform(&mut tables, &mapping)
        .with_context(|| format!("Failed to add ligatures to {}", plan.input.display()))?;

    let sfnt = encode_sfnt(&tables).context("Failed to encode font")?;
    verify_triggers(&sfnt, &mapping)?;
    let encoded: Vec<(ContainerFormat, Vec<u8>)> = plan
        .formats
        .par_iter()
        .map(|&format| {
            wrap(&sfnt, format)
                .map(|data| (format, data))
                .with_context(|| format!("Failed to encode {format}"))
        })
        .collect::<Result<_>>()?;

    let mut outputs: Vec<(OutputFile, Vec<u8>)> = encoded
        .into_iter()
        .map(|(format, data)| {
            let path = plan.output_dir.join(format!("{name}.{}", format.extension()));
            (OutputFile::new(path), data)
        })
        .collect();
    if plan.preview {
        let html = preview::render(&name, &mapping, &report);
        let path = plan.output_dir.join(format!("{name}_preview.html"));
        outputs.push((OutputFile::new(path), html.into_bytes()));
    }

    let mut written = Vec::with_capacity(outputs.len());
    for (file, data) in &outputs {
        file.write(data)?;
        debug!("Wrote {} ({} bytes)", file.path().display(), data.len());
        written.push(file.path().to_path_buf());
    }

    info!("Built {name} in {:.2?}", start.elapsed());
    Ok(BuildOutcome { written, report })
}

/// Comma-separated file names, for the summary line.
pub fn describe_outputs(written: &[PathBuf]) -> String {
    written
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}
