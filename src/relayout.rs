//! The `assockit` command: reload a diagram, recompute every connector end
//! point and write the document back.

use crate::{Config, Diagram};
use anyhow::Context;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Wrong or missing command line arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}\n\n{usage}", usage = usage())]
pub struct UsageError(pub String);

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Relayout(Args),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl Args {
    /// Where the relaid-out document is written
    pub fn destination(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.input)
    }
}

/// Outcome of one relayout run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub shapes: usize,
    pub connectors: usize,
    pub output: PathBuf,
}

pub fn usage() -> &'static str {
    "usage: assockit <input.xml> [-o <output.xml>] [--config <file>]\n\
     \n\
     Recomputes the end points of every connector in the diagram and writes\n\
     the result to <output.xml>, or back to <input.xml>.\n\
     \n\
     options:\n  \
       -o, --output <file>   write to <file> instead of the input\n  \
       --config <file>       settings file (.toml or .json)\n  \
       -h, --help            print this message\n  \
       -V, --version         print version information"
}

/// Parse `argv` (including the program name).
pub fn parse_args(argv: &[String]) -> Result<Invocation, UsageError> {
    let mut input = None;
    let mut output = None;
    let mut config = None;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Ok(Invocation::Help),
            "--version" | "-V" => return Ok(Invocation::Version),
            "-o" | "--output" => {
                let Some(path) = it.next() else {
                    return Err(UsageError(format!("missing value for {}", a)));
                };
                output = Some(PathBuf::from(path));
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(UsageError("missing value for --config".to_string()));
                };
                config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(UsageError(format!("unknown option {}", flag)));
            }
            path => {
                if input.is_some() {
                    return Err(UsageError(format!("unexpected argument {}", path)));
                }
                input = Some(PathBuf::from(path));
            }
        }
    }

    let Some(input) = input else {
        return Err(UsageError("no input diagram given".to_string()));
    };

    Ok(Invocation::Relayout(Args {
        input,
        output,
        config,
    }))
}

/// Load settings from `--config`, or from the platform location.
///
/// An explicit file that does not exist yet yields the defaults, so that the
/// first run can create it.
pub fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match &args.config {
        Some(path) if path.exists() => Config::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        Some(_) => Config::default(),
        None => Config::load_or_default().context("loading settings")?,
    };
    config.validate()?;
    Ok(config)
}

/// Relayout the diagram named by `args` and record it in the recent files.
pub fn run(args: &Args, config: &mut Config) -> anyhow::Result<Report> {
    let mut diagram = Diagram::load_from_file(&args.input, config.path, config.layout)
        .with_context(|| format!("reading diagram {}", args.input.display()))?;

    let connectors = diagram.relayout()?;
    tracing::info!(
        "Recomputed {} connector(s) of diagram '{}'",
        connectors,
        diagram.name
    );

    let output = args.destination().to_path_buf();
    diagram
        .save_to_file(&output)
        .with_context(|| format!("writing diagram {}", output.display()))?;

    config.add_recent_file(args.input.clone());

    Ok(Report {
        shapes: diagram.shape_count(),
        connectors,
        output,
    })
}

/// Write `config` back to where it came from. Failures are logged only.
pub fn remember(args: &Args, config: &Config) {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => match Config::default_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Not saving settings: {}", e);
                return;
            }
        },
    };

    if let Err(e) = config.save_to_file(&path) {
        tracing::warn!("Failed to save settings to {}: {}", path.display(), e);
    }
}
