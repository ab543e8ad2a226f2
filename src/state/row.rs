use serde::Serialize;

/// Column order of every export.
pub const COLUMNS: [&str; 5] = ["Source", "Stage", "RelativeTime", "Temperature", "NH3"];

/// One exported line: the values seen for a source/stage at one time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Stage")]
    pub stage: String,
    #[serde(rename = "RelativeTime")]
    pub relative_time: f64,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
    #[serde(rename = "NH3")]
    pub nh3: Option<f64>,
}

impl ExportRow {
    pub fn new(
        source: impl Into<String>,
        stage: impl Into<String>,
        relative_time: f64,
        temperature: Option<f64>,
        nh3: Option<f64>,
    ) -> Self {
        Self {
            source: source.into(),
            stage: stage.into(),
            relative_time,
            temperature,
            nh3,
        }
    }

    /// Ordering used for exports: source, then stage, then time.
    pub fn export_order(&self, other: &Self) -> std::cmp::Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.stage.cmp(&other.stage))
            .then_with(|| self.relative_time.total_cmp(&other.relative_time))
    }
}
