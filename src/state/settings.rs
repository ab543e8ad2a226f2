use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// How repeated values for one (source, stage, time, metric) combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    #[default]
    KeepLast,
    KeepFirst,
    Mean,
}

impl CollisionPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            CollisionPolicy::KeepLast => "keep_last",
            CollisionPolicy::KeepFirst => "keep_first",
            CollisionPolicy::Mean => "mean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Options the reducer itself consumes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ReduceOptions {
    /// Snap times to multiples of this step before joining. `None` joins on
    /// the exact value.
    pub time_quantum: Option<f64>,
    pub collision: CollisionPolicy,
}

impl ReduceOptions {
    /// The quantum, if it is usable (finite and positive).
    pub fn effective_quantum(&self) -> Option<f64> {
        self.time_quantum.filter(|q| q.is_finite() && *q > 0.0)
    }
}

/// Export settings as stored in a JSON config file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub reduce: ReduceOptions,
    pub format: OutputFormat,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        tracing::debug!("Loaded settings from {:?}: {:?}", path, settings);
        Ok(settings)
    }
}
