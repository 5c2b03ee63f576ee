//! Command-line front end
//!
//! Commands:
//! - course-lens --file <path> stats [--platform <label> ...]
//! - course-lens --file <path> options [--attribute <name>]
//! - course-lens --file <path> show <index>
//! - course-lens --file <path> dump [--limit <n>]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use crate::data::loader::{LoadOptions, load_file};
use crate::data::model::{Attribute, CourseStore};
use crate::presentation::{FilterPanel, display_options, position_for_label};

/// Browse online-course enrollment records and summarise filtered subsets
#[derive(Parser, Debug)]
#[command(name = "course-lens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Dataset to load (.csv, .json, .parquet)
    #[arg(long, short)]
    pub file: PathBuf,

    /// JSON file with loader options
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Lowest accepted satisfaction score
    #[arg(long)]
    pub satisfaction_min: Option<f64>,

    /// Highest accepted satisfaction score
    #[arg(long)]
    pub satisfaction_max: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print record count and averages for the records matching the filters
    Stats(FilterArgs),

    /// List the selectable options of one or all attributes
    Options {
        /// Attribute to list (experience-level, course-type, platform,
        /// completion-status, dropout-reason)
        #[arg(long)]
        attribute: Option<Attribute>,
    },

    /// Print a single record
    Show {
        /// Zero-based record position
        index: usize,
    },

    /// Print records in store order
    Dump {
        /// Stop after this many records
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// One optional label per categorical attribute; omitted means no filter.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub experience_level: Option<String>,
    #[arg(long)]
    pub course_type: Option<String>,
    #[arg(long)]
    pub platform: Option<String>,
    #[arg(long)]
    pub completion_status: Option<String>,
    #[arg(long)]
    pub dropout_reason: Option<String>,
}

impl FilterArgs {
    fn selections(&self) -> [(Attribute, Option<&str>); 5] {
        [
            (Attribute::ExperienceLevel, self.experience_level.as_deref()),
            (Attribute::CourseType, self.course_type.as_deref()),
            (Attribute::Platform, self.platform.as_deref()),
            (Attribute::CompletionStatus, self.completion_status.as_deref()),
            (Attribute::DropoutReason, self.dropout_reason.as_deref()),
        ]
    }
}

impl Cli {
    /// Loader options: file first, then flag overrides.
    pub fn load_options(&self) -> Result<LoadOptions> {
        let mut options = match &self.options {
            Some(path) => LoadOptions::from_json_file(path)?,
            None => LoadOptions::default(),
        };
        if let Some(min) = self.satisfaction_min {
            options.satisfaction_min = min;
        }
        if let Some(max) = self.satisfaction_max {
            options.satisfaction_max = max;
        }
        if options.satisfaction_min > options.satisfaction_max {
            bail!(
                "--satisfaction-min ({}) is greater than --satisfaction-max ({})",
                options.satisfaction_min,
                options.satisfaction_max
            );
        }
        Ok(options)
    }
}

/// Parse arguments, run the command and write its output to stdout.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    execute(&cli, &mut stdout.lock())
}

/// Run a parsed command against `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<()> {
    let options = cli.load_options()?;
    let store = load_file(&cli.file, &options)?;

    match &cli.command {
        Command::Stats(filters) => stats(store, filters, out),
        Command::Options { attribute } => list_options(&store, *attribute, out),
        Command::Show { index } => {
            let record = store.record_at(*index)?;
            writeln!(out, "{}", store.record_display_string(record))?;
            Ok(())
        }
        Command::Dump { limit } => {
            let limit = limit.unwrap_or(usize::MAX);
            for record in store.records().iter().take(limit) {
                writeln!(out, "{}", store.record_display_string(record))?;
            }
            Ok(())
        }
    }
}

fn stats(store: CourseStore, filters: &FilterArgs, out: &mut dyn Write) -> Result<()> {
    let mut panel = FilterPanel::new(store)?;

    for (attribute, label) in filters.selections() {
        let Some(label) = label else {
            continue;
        };
        let position = position_for_label(panel.store(), attribute, label).with_context(|| {
            format!(
                "unknown {attribute} '{label}', expected one of: {}",
                panel.store().label_options(attribute).join(", ")
            )
        })?;
        panel.select(attribute, position)?;
        log::debug!("{attribute} = '{label}' (position {position})");
    }

    for line in panel.stat_lines() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn list_options(
    store: &CourseStore,
    attribute: Option<Attribute>,
    out: &mut dyn Write,
) -> Result<()> {
    let attributes = match attribute {
        Some(a) => vec![a],
        None => Attribute::ALL.to_vec(),
    };
    for attribute in attributes {
        writeln!(out, "{}:", attribute.caption())?;
        for (position, label) in display_options(store, attribute).iter().enumerate() {
            writeln!(out, "  {position}: {label}")?;
        }
    }
    Ok(())
}
