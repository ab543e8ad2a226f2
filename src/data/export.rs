use std::io::Write;

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::state::row::{ExportRow, COLUMNS};
use crate::state::settings::OutputFormat;

fn format_value(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v}"),
        _ => String::new(),
    }
}

/// Write rows as CSV with the fixed column order. Missing values are empty fields.
pub fn write_csv<W: Write>(rows: &[ExportRow], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.source.clone(),
            row.stage.clone(),
            format!("{}", row.relative_time),
            format_value(row.temperature),
            format_value(row.nh3),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows as a JSON array of row objects.
pub fn write_json<W: Write>(rows: &[ExportRow], mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, rows)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_rows<W: Write>(rows: &[ExportRow], format: OutputFormat, out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(rows, out),
        OutputFormat::Json => write_json(rows, out),
    }
}

/// `cross_comparison_visible_data_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_filename(at: DateTime<Local>, format: OutputFormat) -> String {
    format!(
        "cross_comparison_visible_data_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
