use std::collections::{BTreeMap, HashMap};

use crate::data::parser::parse_finite;
use crate::data::trace_name::{classify_parameter, parse_trace_name, Metric};
use crate::state::range::VisibleRange;
use crate::state::row::ExportRow;
use crate::state::settings::{CollisionPolicy, ReduceOptions};
use crate::state::trace::Trace;

/// Counters gathered while reducing, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceStats {
    pub traces_used: usize,
    pub traces_other: usize,
    pub traces_without_data: usize,
    pub points_kept: usize,
    pub points_skipped: usize,
    /// Writes that landed on a metric slot already written for the same time.
    pub collisions: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct MetricSlot {
    value: Option<f64>,
    written: bool,
    sum: f64,
    count: usize,
}

impl MetricSlot {
    /// Returns true when the slot had already been written.
    fn write(&mut self, value: Option<f64>, policy: CollisionPolicy) -> bool {
        let collided = self.written;
        match policy {
            CollisionPolicy::KeepLast => self.value = value,
            CollisionPolicy::KeepFirst => {
                if !collided {
                    self.value = value;
                }
            }
            CollisionPolicy::Mean => {
                if let Some(v) = value {
                    self.sum += v;
                    self.count += 1;
                    self.value = Some(self.sum / self.count as f64);
                }
            }
        }
        self.written = true;
        collided
    }
}

#[derive(Debug, Clone, Copy)]
struct TimeEntry {
    time: f64,
    temperature: MetricSlot,
    nh3: MetricSlot,
}

type Group = HashMap<u64, TimeEntry>;

/// Join key for a time value. `-0.0` and `0.0` share a key.
fn time_key(time: f64) -> u64 {
    if time == 0.0 {
        0.0f64.to_bits()
    } else {
        time.to_bits()
    }
}

/// Snap `x` onto the quantum grid. A quantum too small to divide by
/// without overflow leaves `x` exact.
fn snap(x: f64, quantum: Option<f64>) -> f64 {
    let t = match quantum {
        Some(q) => {
            let snapped = (x / q).round() * q;
            if snapped.is_finite() { snapped } else { x }
        }
        None => x,
    };
    if t == 0.0 { 0.0 } else { t }
}

/// Rows rebuilt from a set of traces plus what happened along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reduction {
    pub rows: Vec<ExportRow>,
    pub stats: ReduceStats,
}

/// Rebuild export rows from chart traces, keeping only points whose time
/// lies in `range`.
///
/// Traces whose parameter is neither a temperature nor NH3 are ignored, as
/// are traces missing either coordinate sequence and points whose time is
/// not a finite number. Empty `rows` means nothing was visible.
pub fn reduce_traces(traces: &[Trace], range: VisibleRange, options: &ReduceOptions) -> Reduction {
    let quantum = options.effective_quantum();
    let mut stats = ReduceStats::default();
    let mut groups: BTreeMap<(String, String), Group> = BTreeMap::new();

    for (index, trace) in traces.iter().enumerate() {
        let identity = parse_trace_name(&trace.name);
        let metric = classify_parameter(&identity.parameter);
        if metric == Metric::Other {
            stats.traces_other += 1;
            continue;
        }
        tracing::trace!("Trace {index} ({}) -> {}", trace.name, metric.label());
        let (xs, ys) = match (&trace.x, &trace.y) {
            (Some(xs), Some(ys)) => (xs, ys),
            _ => {
                tracing::warn!("Skipping trace {index} ({}): x/y data missing or not understood", trace.name);
                stats.traces_without_data += 1;
                continue;
            }
        };
        stats.traces_used += 1;

        let group = groups.entry((identity.source, identity.stage)).or_default();
        for (i, raw_x) in xs.iter().enumerate() {
            let x = match parse_finite(raw_x) {
                Some(x) if range.contains(x) => x,
                _ => {
                    stats.points_skipped += 1;
                    continue;
                }
            };
            let time = snap(x, quantum);
            let value = ys.get(i).and_then(parse_finite);
            let entry = group.entry(time_key(time)).or_insert_with(|| TimeEntry {
                time,
                temperature: MetricSlot::default(),
                nh3: MetricSlot::default(),
            });
            let slot = match metric {
                Metric::Temperature => &mut entry.temperature,
                _ => &mut entry.nh3,
            };
            if slot.write(value, options.collision) {
                stats.collisions += 1;
            }
            stats.points_kept += 1;
        }
    }

    let mut rows: Vec<ExportRow> = groups
        .into_iter()
        .flat_map(|((source, stage), group)| {
            group.into_values().map(move |entry| {
                ExportRow::new(
                    source.clone(),
                    stage.clone(),
                    entry.time,
                    entry.temperature.value,
                    entry.nh3.value,
                )
            })
        })
        .collect();
    rows.sort_by(|a, b| a.export_order(b));

    if stats.collisions > 0 {
        tracing::warn!(
            "{} value(s) shared a source/stage/time/metric with an earlier trace; resolved with {}",
            stats.collisions,
            options.collision.label()
        );
    }
    Reduction { rows, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn range(min: f64, max: f64) -> VisibleRange {
        VisibleRange::from_bounds(Some(min), Some(max)).unwrap()
    }

    fn temp_and_nh3() -> Vec<Trace> {
        vec![
            Trace::from_f64("Source1 - Stage1 - Temp", &[0.0, 1.0, 2.0], &[20.0, 21.0, 22.0]),
            Trace::from_f64("Source1 - Stage1 - NH3", &[0.0, 1.0, 2.0], &[5.0, 6.0, 7.0]),
        ]
    }

    #[test]
    fn merges_temperature_and_nh3_by_time() {
        let rows = reduce_traces(&temp_and_nh3(), range(0.0, 2.0), &ReduceOptions::default()).rows;
        assert_eq!(
            rows,
            vec![
                ExportRow::new("Source1", "Stage1", 0.0, Some(20.0), Some(5.0)),
                ExportRow::new("Source1", "Stage1", 1.0, Some(21.0), Some(6.0)),
                ExportRow::new("Source1", "Stage1", 2.0, Some(22.0), Some(7.0)),
            ]
        );
    }

    #[test]
    fn range_excludes_points_outside() {
        let rows = reduce_traces(&temp_and_nh3(), range(0.0, 1.0), &ReduceOptions::default()).rows;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.relative_time <= 1.0));
    }

    #[test]
    fn inverted_range_yields_nothing() {
        let rows = reduce_traces(&temp_and_nh3(), range(10.0, 5.0), &ReduceOptions::default()).rows;
        assert!(rows.is_empty());
    }

    #[test]
    fn other_parameters_contribute_nothing() {
        let traces = vec![Trace::from_f64("Humidity - Stage1 - RH", &[0.0, 1.0], &[40.0, 41.0])];
        let Reduction { rows, stats } = reduce_traces(&traces, range(-1e9, 1e9), &ReduceOptions::default());
        assert!(rows.is_empty());
        assert_eq!(stats.traces_other, 1);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let mut traces = temp_and_nh3();
        traces.push(Trace::from_f64("Source0 - Stage9 - T Heater 1", &[3.0, 0.5], &[1.0, 2.0]));
        traces.push(Trace::from_f64("Alpha - NH3 ppm", &[2.0], &[9.0]));
        let opts = ReduceOptions::default();
        let a = reduce_traces(&traces, range(0.0, 5.0), &opts).rows;
        let b = reduce_traces(&traces, range(0.0, 5.0), &opts).rows;
        assert_eq!(a, b);
        let bits = |rows: &[ExportRow]| -> Vec<u64> { rows.iter().map(|r| r.relative_time.to_bits()).collect() };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn rows_sorted_by_source_stage_time() {
        let traces = vec![
            Trace::from_f64("B - S1 - Temp", &[1.0, 0.0], &[1.0, 2.0]),
            Trace::from_f64("A - S2 - NH3", &[5.0], &[3.0]),
            Trace::from_f64("A - S1 - NH3", &[10.0, 2.0], &[4.0, 5.0]),
        ];
        let rows = reduce_traces(&traces, range(0.0, 10.0), &ReduceOptions::default()).rows;
        let keys: Vec<(&str, &str, f64)> = rows
            .iter()
            .map(|r| (r.source.as_str(), r.stage.as_str(), r.relative_time))
            .collect();
        assert_eq!(
            keys,
            vec![("A", "S1", 2.0), ("A", "S1", 10.0), ("A", "S2", 5.0), ("B", "S1", 0.0), ("B", "S1", 1.0)]
        );
    }

    #[test]
    fn traces_without_coordinates_are_skipped() {
        let traces = vec![
            Trace { name: "S - T - Temp".into(), x: None, y: Some(vec![json!(1)]) },
            Trace { name: "S - T - NH3".into(), x: Some(vec![json!(1)]), y: None },
        ];
        let Reduction { rows, stats } = reduce_traces(&traces, range(0.0, 2.0), &ReduceOptions::default());
        assert!(rows.is_empty());
        assert_eq!(stats.traces_without_data, 2);
    }

    #[test]
    fn bad_points_are_skipped_individually() {
        let traces = vec![Trace::new(
            "S - T - Temp",
            vec![json!(0), json!("abc"), Value::Null, json!("1.5"), json!("NaN")],
            vec![json!(10), json!(11), json!(12), json!(13), json!(14)],
        )];
        let Reduction { rows, stats } = reduce_traces(&traces, range(0.0, 2.0), &ReduceOptions::default());
        assert_eq!(
            rows,
            vec![
                ExportRow::new("S", "T", 0.0, Some(10.0), None),
                ExportRow::new("S", "T", 1.5, Some(13.0), None),
            ]
        );
        assert_eq!(stats.points_kept, 2);
        assert_eq!(stats.points_skipped, 3);
    }

    #[test]
    fn missing_or_non_numeric_y_is_null() {
        let traces = vec![Trace::new("S - T - NH3", vec![json!(0), json!(1)], vec![json!("n/a")])];
        let rows = reduce_traces(&traces, range(0.0, 1.0), &ReduceOptions::default()).rows;
        assert_eq!(
            rows,
            vec![ExportRow::new("S", "T", 0.0, None, None), ExportRow::new("S", "T", 1.0, None, None)]
        );
    }

    #[test]
    fn metrics_fill_independently() {
        let traces = vec![
            Trace::from_f64("S - T - Temp", &[0.0, 1.0], &[20.0, 21.0]),
            Trace::from_f64("S - T - NH3", &[1.0, 2.0], &[6.0, 7.0]),
        ];
        let rows = reduce_traces(&traces, range(0.0, 2.0), &ReduceOptions::default()).rows;
        assert_eq!(
            rows,
            vec![
                ExportRow::new("S", "T", 0.0, Some(20.0), None),
                ExportRow::new("S", "T", 1.0, Some(21.0), Some(6.0)),
                ExportRow::new("S", "T", 2.0, None, Some(7.0)),
            ]
        );
    }

    #[test]
    fn groups_do_not_mix() {
        let traces = vec![
            Trace::from_f64("R1 - Stage 1 - Temp", &[0.0], &[20.0]),
            Trace::from_f64("R2 - Stage 1 - Temp", &[0.0], &[30.0]),
        ];
        let rows = reduce_traces(&traces, range(0.0, 0.0), &ReduceOptions::default()).rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source, "R1");
        assert_eq!(rows[1].temperature, Some(30.0));
    }

    #[test]
    fn collisions_follow_policy() {
        let traces = vec![
            Trace::from_f64("S - T - Temp A", &[0.0], &[10.0]),
            Trace::from_f64("S - T - Temp B", &[0.0], &[20.0]),
        ];
        let run = |collision| {
            let opts = ReduceOptions { collision, ..Default::default() };
            let r = reduce_traces(&traces, range(0.0, 1.0), &opts);
            (r.rows, r.stats)
        };

        let (rows, stats) = run(CollisionPolicy::KeepLast);
        assert_eq!(rows[0].temperature, Some(20.0));
        assert_eq!(stats.collisions, 1);
        assert_eq!(run(CollisionPolicy::KeepFirst).0[0].temperature, Some(10.0));
        assert_eq!(run(CollisionPolicy::Mean).0[0].temperature, Some(15.0));
    }

    #[test]
    fn mean_ignores_null_values() {
        let traces = vec![
            Trace::from_f64("S - T - NH3 a", &[0.0], &[4.0]),
            Trace::new("S - T - NH3 b", vec![json!(0)], vec![Value::Null]),
        ];
        let opts = ReduceOptions { collision: CollisionPolicy::Mean, ..Default::default() };
        assert_eq!(reduce_traces(&traces, range(0.0, 0.0), &opts).rows[0].nh3, Some(4.0));
    }

    #[test]
    fn exact_join_keeps_nearby_times_apart() {
        let traces = vec![
            Trace::from_f64("S - T - Temp", &[0.1 + 0.2], &[20.0]),
            Trace::from_f64("S - T - NH3", &[0.3], &[5.0]),
        ];
        let rows = reduce_traces(&traces, range(0.0, 1.0), &ReduceOptions::default()).rows;
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn quantum_joins_nearby_times() {
        let traces = vec![
            Trace::from_f64("S - T - Temp", &[0.1 + 0.2], &[20.0]),
            Trace::from_f64("S - T - NH3", &[0.3], &[5.0]),
        ];
        let opts = ReduceOptions { time_quantum: Some(0.1), ..Default::default() };
        let rows = reduce_traces(&traces, range(0.0, 1.0), &opts).rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].temperature, Some(20.0));
        assert_eq!(rows[0].nh3, Some(5.0));
    }

    #[test]
    fn negative_zero_joins_zero() {
        let traces = vec![
            Trace::from_f64("S - T - Temp", &[-0.0], &[20.0]),
            Trace::from_f64("S - T - NH3", &[0.0], &[5.0]),
        ];
        let rows = reduce_traces(&traces, range(-1.0, 1.0), &ReduceOptions::default()).rows;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].relative_time.is_sign_positive());
    }

    #[test]
    fn tiny_quantum_falls_back_to_exact_times() {
        let traces = vec![Trace::from_f64("S - T - Temp", &[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0])];
        let opts = ReduceOptions { time_quantum: Some(1e-320), ..Default::default() };
        let reduction = reduce_traces(&traces, range(0.0, 5.0), &opts);
        let times: Vec<f64> = reduction.rows.iter().map(|r| r.relative_time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
        assert_eq!(reduction.stats.collisions, 0);
    }
}
