use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::data::parser::parse_number;
use crate::error::Result;
use crate::state::trace::Trace;

/// A chart as exported by the plotting front end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    pub traces: Vec<Trace>,
    /// Raw `layout.xaxis.range` bounds, if the layout carried a two-element range.
    pub x_range: Option<(Option<f64>, Option<f64>)>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FigureDoc {
    Full {
        #[serde(default)]
        data: Vec<Trace>,
        #[serde(default)]
        layout: Value,
    },
    Bare(Vec<Trace>),
}

/// Parse a figure from JSON text: either `{"data": [...], "layout": {...}}`
/// or a bare array of traces.
pub fn parse_figure(json: &str) -> Result<Figure> {
    let doc: FigureDoc = serde_json::from_str(json)?;
    let figure = match doc {
        FigureDoc::Full { data, layout } => Figure {
            traces: data,
            x_range: layout_x_range(&layout),
        },
        FigureDoc::Bare(traces) => Figure { traces, x_range: None },
    };
    Ok(figure)
}

fn layout_x_range(layout: &Value) -> Option<(Option<f64>, Option<f64>)> {
    match layout.pointer("/xaxis/range")? {
        Value::Array(bounds) if bounds.len() == 2 => {
            Some((parse_number(&bounds[0]), parse_number(&bounds[1])))
        }
        _ => None,
    }
}

/// Load a figure file; `-` reads standard input.
pub fn load_figure(path: &Path) -> Result<Figure> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    let figure = parse_figure(&text)?;
    let points: usize = figure.traces.iter().map(Trace::point_count).sum();
    tracing::info!("Loaded {} trace(s), {} point(s) from {:?}", figure.traces.len(), points, path);
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn full_figure_with_range() {
        let fig = parse_figure(
            r#"{
                "data": [
                    {"name": "R1 - Stage 1 - T Heater 1", "x": [0, 1], "y": [20, 21], "type": "scatter"},
                    {"name": "R1 - Stage 1 - NH3", "x": [0, 1], "y": [5, 6]}
                ],
                "layout": {"xaxis": {"range": [0, "1.5"], "title": {"text": "RelativeTime"}}}
            }"#,
        )
        .unwrap();
        assert_eq!(fig.traces.len(), 2);
        assert_eq!(fig.traces[0].name, "R1 - Stage 1 - T Heater 1");
        assert_eq!(fig.x_range, Some((Some(0.0), Some(1.5))));
    }

    #[test]
    fn bare_trace_array() {
        let fig = parse_figure(r#"[{"name": "A - B - Temp", "x": [1], "y": [2]}]"#).unwrap();
        assert_eq!(fig.traces.len(), 1);
        assert_eq!(fig.x_range, None);
    }

    #[test]
    fn range_needs_two_elements() {
        let fig = parse_figure(r#"{"data": [], "layout": {"xaxis": {"range": [1]}}}"#).unwrap();
        assert_eq!(fig.x_range, None);
        let fig = parse_figure(r#"{"data": []}"#).unwrap();
        assert_eq!(fig.x_range, None);
    }

    #[test]
    fn non_numeric_bound_is_kept_as_missing() {
        let fig = parse_figure(r#"{"data": [], "layout": {"xaxis": {"range": ["a", 3]}}}"#).unwrap();
        assert_eq!(fig.x_range, Some((None, Some(3.0))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(parse_figure("{not json"), Err(Error::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_figure(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
