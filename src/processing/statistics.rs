use crate::state::row::ExportRow;

/// Statistics for one exported metric column.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl MetricStats {
    /// Compute statistics over the non-null values; `None` if there are none.
    pub fn compute(values: impl Iterator<Item = Option<f64>>) -> Option<Self> {
        let vals: Vec<f64> = values.flatten().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let min = vals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = vals.iter().sum::<f64>() / count as f64;

        Some(MetricStats { count, min, max, mean })
    }

    fn line(&self, label: &str) -> String {
        format!(
            "  {}: {} value(s), min {:.3}, max {:.3}, mean {:.3}\n",
            label, self.count, self.min, self.max, self.mean
        )
    }
}

/// Summary of one source/stage block of an export.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub source: String,
    pub stage: String,
    pub rows: usize,
    pub first_time: f64,
    pub last_time: f64,
    pub temperature: Option<MetricStats>,
    pub nh3: Option<MetricStats>,
}

impl GroupSummary {
    /// Format as a multi-line report string.
    pub fn report(&self) -> String {
        let mut out = format!(
            "{} / {}:\n  Rows: {}\n  Time: {} .. {}\n",
            self.source, self.stage, self.rows, self.first_time, self.last_time
        );
        match &self.temperature {
            Some(s) => out.push_str(&s.line("Temperature")),
            None => out.push_str("  Temperature: no values\n"),
        }
        match &self.nh3 {
            Some(s) => out.push_str(&s.line("NH3")),
            None => out.push_str("  NH3: no values\n"),
        }
        out
    }
}

/// Summarize sorted export rows, one entry per source/stage block in row order.
pub fn summarize(rows: &[ExportRow]) -> Vec<GroupSummary> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let head = &rows[start];
        let len = rows[start..]
            .iter()
            .take_while(|r| r.source == head.source && r.stage == head.stage)
            .count();
        let block = &rows[start..start + len];
        out.push(GroupSummary {
            source: head.source.clone(),
            stage: head.stage.clone(),
            rows: len,
            first_time: block[0].relative_time,
            last_time: block[len - 1].relative_time,
            temperature: MetricStats::compute(block.iter().map(|r| r.temperature)),
            nh3: MetricStats::compute(block.iter().map(|r| r.nh3)),
        });
        start += len;
    }
    out
}
