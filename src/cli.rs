use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum, ValueHint};

use crate::error::Result;
use crate::state::settings::{CollisionPolicy, OutputFormat, Settings};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Export the visible Temperature/NH3 points of a stage-comparison chart as a table"
)]
pub struct Args {
    /// Figure JSON (`{"data": [...], "layout": {...}}` or a trace array); `-` reads stdin
    #[arg(value_hint = ValueHint::FilePath)]
    pub figure: PathBuf,

    /// Visible time window; overrides the figure's layout.xaxis.range
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub range: Option<Vec<f64>>,

    /// Output path (defaults to stdout)
    #[arg(short, long, value_hint = ValueHint::FilePath, conflicts_with = "out_dir")]
    pub out: Option<PathBuf>,

    /// Write into this directory under a timestamped file name
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatOpt>,

    /// How repeated values at the same source/stage/time combine
    #[arg(long, value_enum)]
    pub collision: Option<CollisionOpt>,

    /// Snap times to multiples of this step before joining
    #[arg(long)]
    pub time_quantum: Option<f64>,

    /// Settings JSON file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print a per-stage summary to stderr
    #[arg(long, action = ArgAction::SetTrue)]
    pub summary: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatOpt {
    Csv,
    Json,
}

impl From<FormatOpt> for OutputFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Csv => OutputFormat::Csv,
            FormatOpt::Json => OutputFormat::Json,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CollisionOpt {
    KeepLast,
    KeepFirst,
    Mean,
}

impl From<CollisionOpt> for CollisionPolicy {
    fn from(value: CollisionOpt) -> Self {
        match value {
            CollisionOpt::KeepLast => CollisionPolicy::KeepLast,
            CollisionOpt::KeepFirst => CollisionPolicy::KeepFirst,
            CollisionOpt::Mean => CollisionPolicy::Mean,
        }
    }
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Range bounds given on the command line, if any.
    pub fn range_bounds(&self) -> Option<(Option<f64>, Option<f64>)> {
        self.range
            .as_ref()
            .map(|r| (r.first().copied(), r.get(1).copied()))
    }

    /// Settings from `--config` (or defaults) with command-line flags on top.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(format) = self.format {
            settings.format = format.into();
        }
        if let Some(collision) = self.collision {
            settings.reduce.collision = collision.into();
        }
        if self.time_quantum.is_some() {
            settings.reduce.time_quantum = self.time_quantum;
        }
        Ok(settings)
    }
}
