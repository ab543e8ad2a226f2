use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::Local;

use crate::cli::Args;
use crate::data::export;
use crate::data::loader::{self, Figure};
use crate::error::Result;
use crate::processing::reducer;
use crate::processing::statistics;
use crate::state::range::VisibleRange;
use crate::state::row::ExportRow;
use crate::state::settings::Settings;

/// What an export run ended with, for the exit message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Written { rows: usize, destination: String },
    NoData,
}

/// Pick the visible range: command line first, then the figure layout.
pub fn resolve_range(cli: Option<(Option<f64>, Option<f64>)>, figure: &Figure) -> Result<VisibleRange> {
    let (min, max) = cli.or(figure.x_range).unwrap_or((None, None));
    VisibleRange::from_bounds(min, max)
}

/// Reduce a loaded figure to export rows and log what was kept.
pub fn export_rows(figure: &Figure, range: VisibleRange, settings: &Settings) -> Vec<ExportRow> {
    let reduction = reducer::reduce_traces(&figure.traces, range, &settings.reduce);
    let stats = &reduction.stats;
    tracing::info!(
        "Range [{}, {}]: {} trace(s) used, {} point(s) kept, {} row(s)",
        range.min(),
        range.max(),
        stats.traces_used,
        stats.points_kept,
        reduction.rows.len()
    );
    tracing::debug!(
        "Skipped {} non-exported trace(s), {} trace(s) without x/y, {} point(s) outside range or non-numeric",
        stats.traces_other,
        stats.traces_without_data,
        stats.points_skipped
    );
    reduction.rows
}

fn destination(args: &Args, settings: &Settings) -> Option<PathBuf> {
    match (&args.out, &args.out_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(dir.join(export::default_filename(Local::now(), settings.format))),
        (None, None) => None,
    }
}

pub fn run(args: &Args) -> Result<Outcome> {
    let settings = args.settings()?;
    let figure = loader::load_figure(&args.figure)?;
    let range = resolve_range(args.range_bounds(), &figure)?;

    let rows = export_rows(&figure, range, &settings);
    if rows.is_empty() {
        return Ok(Outcome::NoData);
    }

    if args.summary {
        for group in statistics::summarize(&rows) {
            eprint!("{}", group.report());
        }
    }

    let outcome = match destination(args, &settings) {
        Some(path) => {
            let mut out = BufWriter::new(File::create(&path)?);
            export::write_rows(&rows, settings.format, &mut out)?;
            out.flush()?;
            Outcome::Written { rows: rows.len(), destination: path.display().to_string() }
        }
        None => {
            let stdout = io::stdout();
            export::write_rows(&rows, settings.format, stdout.lock())?;
            Outcome::Written { rows: rows.len(), destination: "stdout".to_string() }
        }
    };
    Ok(outcome)
}
