use thiserror::Error;

/// Everything that can stop an export.
///
/// Bad traces and bad points are not errors; they are skipped while
/// reducing. Only a missing or non-finite visible range and shell-side
/// effect failures end up here.
#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Visible x-axis range is not a valid pair of numbers (min: {}, max: {}); cannot filter data",
        fmt_bound(.min),
        fmt_bound(.max)
    )]
    InvalidRange { min: Option<f64>, max: Option<f64> },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse figure JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot write CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn fmt_bound(v: &Option<f64>) -> String {
    match v {
        Some(v) => format!("{v}"),
        None => "missing".to_string(),
    }
}
