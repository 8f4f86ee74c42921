//! CLI definitions and command dispatch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use ligafont_codec::ContainerFormat;
use ligafont_engine::{Options, Tag};
use log::{info, warn};

use crate::{
    commands::{BuildPlan, build, describe_outputs, glyphs},
    mapping::parse_assignment,
    settings::Settings,
};

#[derive(Parser)]
#[command(name = "ligafont", version)]
#[command(about = "Turn named icon glyphs into ligatures typed as plain words")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (default: $LIGAFONT_SETTINGS or ./ligafont-settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Ttf,
    Woff,
    Woff2,
}

impl From<FormatArg> for ContainerFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Ttf => ContainerFormat::Sfnt,
            FormatArg::Woff => ContainerFormat::Woff,
            FormatArg::Woff2 => ContainerFormat::Woff2,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct BuildArgs {
    /// Input TTF, OTF or WOFF font
    pub font: PathBuf,

    /// Mapping file (JSON) or a single SEQUENCE=GLYPH assignment; repeatable
    #[arg(short, long = "mapping", value_name = "FILE|SEQ=GLYPH", required = true)]
    pub mappings: Vec<String>,

    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Output file stem (default: input file stem)
    #[arg(long)]
    pub name: Option<String>,

    /// Output formats (default: all)
    #[arg(long = "format", value_enum)]
    pub formats: Vec<FormatArg>,

    #[arg(long)]
    pub no_preview: bool,

    /// Script tag for the GSUB and GPOS script lists
    #[arg(long)]
    pub script: Option<Tag>,

    /// Feature tag enabling the ligatures
    #[arg(long)]
    pub feature: Option<Tag>,

    /// Keep an existing GPOS instead of replacing it with a stub
    #[arg(long)]
    pub keep_gpos: bool,
}

impl BuildArgs {
    pub fn into_plan(self) -> Result<BuildPlan> {
        let mut plan = BuildPlan::new(self.font, self.output);
        for mapping in &self.mappings {
            let path = Path::new(mapping);
            if path.is_file() || !mapping.contains('=') {
                plan.mapping_files.push(path.to_path_buf());
            } else {
                plan.assignments.push(parse_assignment(mapping)?);
            }
        }
        plan.name = self.name;
        if !self.formats.is_empty() {
            let mut formats: Vec<ContainerFormat> =
                self.formats.into_iter().map(ContainerFormat::from).collect();
            formats.sort_unstable();
            formats.dedup();
            plan.formats = formats;
        }
        plan.preview = !self.no_preview;
        plan.options = Options::new()
            .with_script_opt(self.script)
            .with_feature_opt(self.feature)
            .with_replace_positioning(!self.keep_gpos);
        Ok(plan)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List glyph ids, names and mapped codes
    Glyphs { font: PathBuf },
    /// Add ligatures and write every requested format plus a preview page
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Rebuild with the input, mapping and output of the last build
    Reopen,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub fn run(self) -> Result<()> {
        let settings_path = Settings::resolve_path(self.settings.as_deref());
        match self.command {
            Commands::Glyphs { font } => glyphs(&font),
            Commands::Build { args } => run_build(args.into_plan()?, &settings_path),
            Commands::Reopen => {
                let settings = Settings::load(&settings_path);
                run_build(reopen_plan(&settings)?, &settings_path)
            }
        }
    }
}

/// The plan `reopen` runs: last input, mapping and output, default formats.
pub fn reopen_plan(settings: &Settings) -> Result<BuildPlan> {
    let input = settings.last_input.clone().context("No previous build to reopen")?;
    let mapping = settings.last_mapping.clone().context("No mapping file remembered")?;
    let output = settings.last_output_dir.clone().context("No output directory remembered")?;
    let mut plan = BuildPlan::new(input, output);
    plan.mapping_files.push(mapping);
    Ok(plan)
}

fn run_build(plan: BuildPlan, settings_path: &Path) -> Result<()> {
    let outcome = build(&plan)?;
    println!(
        "{} -> {}: {}",
        plan.input.display(),
        plan.output_dir.display(),
        describe_outputs(&outcome.written)
    );
    println!("{}", outcome.report);

    let mut settings = Settings::load(settings_path);
    let mapping = plan.mapping_files.first().map(PathBuf::as_path);
    settings.remember(&plan.input, mapping, &plan.output_dir);
    match settings.save(settings_path) {
        Ok(()) => info!("Saved settings to {}", settings_path.display()),
        Err(e) => warn!("{e:#}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ligafont").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_build_args_to_plan() {
        let cli = parse(&[
            "build", "icons.ttf", "-m", "home=house", "-o", "out", "--format", "woff2", "--format",
            "ttf", "--format", "ttf", "--no-preview", "--script", "DFLT", "-v",
        ]);
        assert_eq!(cli.log_level(), "info");
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        let plan = args.into_plan().unwrap();

        assert_eq!(plan.formats, vec![ContainerFormat::Sfnt, ContainerFormat::Woff2]);
        assert!(plan.mapping_files.is_empty());
        assert_eq!(plan.assignments.len(), 1);
        assert!(!plan.preview);
        assert_eq!(plan.options.script, Tag::new(b"DFLT"));
        assert_eq!(plan.font_name().unwrap(), "icons");
    }

    #[test]
    fn test_mapping_argument_without_equals_is_a_file() {
        let cli = parse(&["build", "icons.ttf", "-m", "map.json", "-o", "out"]);
        let Commands::Build { args } = cli.command else {
            panic!("expected build");
        };
        let plan = args.into_plan().unwrap();
        assert_eq!(plan.mapping_files, vec![PathBuf::from("map.json")]);
        assert_eq!(plan.formats, ContainerFormat::ALL.to_vec());
    }

    #[test]
    fn test_build_requires_mapping_and_output() {
        assert!(Cli::try_parse_from(["ligafont", "build", "icons.ttf", "-o", "out"]).is_err());
        assert!(Cli::try_parse_from(["ligafont", "build", "icons.ttf", "-m", "a=b"]).is_err());
    }

    #[test]
    fn test_reopen_needs_previous_build() {
        assert!(reopen_plan(&Settings::default()).is_err());

        let settings = Settings {
            last_input: Some(PathBuf::from("icons.ttf")),
            last_mapping: Some(PathBuf::from("map.json")),
            last_output_dir: Some(PathBuf::from("out")),
            last_path: None,
        };
        let plan = reopen_plan(&settings).unwrap();
        assert_eq!(plan.input, PathBuf::from("icons.ttf"));
        assert_eq!(plan.mapping_files, vec![PathBuf::from("map.json")]);
        assert!(plan.preview);
    }
}
