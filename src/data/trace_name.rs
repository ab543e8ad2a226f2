pub const NAME_SEPARATOR: &str = " - ";
pub const UNKNOWN_SOURCE: &str = "Unknown_Source";
pub const UNKNOWN_STAGE: &str = "Unknown_Stage";

/// Source, stage and parameter recovered from a trace name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceIdentity {
    pub source: String,
    pub stage: String,
    pub parameter: String,
}

/// Split a `"<source> - <stage> - <parameter>"` name.
///
/// Two segments mean source and parameter with an unknown stage. A name
/// with no separator keeps itself as the parameter. Never fails.
pub fn parse_trace_name(name: &str) -> TraceIdentity {
    let parts: Vec<&str> = name.split(NAME_SEPARATOR).collect();
    match parts.as_slice() {
        [source, stage, rest @ ..] if !rest.is_empty() => TraceIdentity {
            source: source.trim().to_string(),
            stage: stage.trim().to_string(),
            parameter: rest.join(NAME_SEPARATOR).trim().to_string(),
        },
        [source, parameter] => TraceIdentity {
            source: source.trim().to_string(),
            stage: UNKNOWN_STAGE.to_string(),
            parameter: parameter.trim().to_string(),
        },
        _ => TraceIdentity {
            source: UNKNOWN_SOURCE.to_string(),
            stage: UNKNOWN_STAGE.to_string(),
            parameter: name.to_string(),
        },
    }
}

/// Exported metric a trace feeds, or `Other` if it is not exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    NH3,
    Other,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature",
            Metric::NH3 => "NH3",
            Metric::Other => "Other",
        }
    }
}

/// Temperature wins over NH3 when a parameter mentions both.
pub fn classify_parameter(parameter: &str) -> Metric {
    if parameter.contains("Temp") || parameter.contains("T Heater") {
        Metric::Temperature
    } else if parameter.to_uppercase().contains("NH3") {
        Metric::NH3
    } else {
        Metric::Other
    }
}
