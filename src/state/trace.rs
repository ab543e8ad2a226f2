use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::Value;

/// One plotted series as the chart hands it over.
///
/// `x` and `y` keep their raw JSON elements; numeric coercion happens
/// point by point while reducing, so a single bad entry does not discard
/// the whole trace.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "array_or_absent")]
    pub x: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "array_or_absent")]
    pub y: Option<Vec<Value>>,
}

/// Plain arrays and Plotly typed arrays (`{"dtype": "f8", "bdata": "..."}`)
/// count as data; anything else is absent.
fn array_or_absent<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items)),
        Value::Object(map) if map.contains_key("bdata") => {
            let dtype = map.get("dtype").and_then(Value::as_str).unwrap_or("");
            let bdata = map.get("bdata").and_then(Value::as_str).unwrap_or("");
            match decode_typed_array(dtype, bdata) {
                Some(values) => Ok(Some(values)),
                None => {
                    tracing::warn!("Cannot decode typed array with dtype {dtype:?}; treating it as no data");
                    Ok(None)
                }
            }
        }
        _ => Ok(None),
    }
}

/// Decode a base64 little-endian typed array as Plotly writes it.
pub fn decode_typed_array(dtype: &str, bdata: &str) -> Option<Vec<Value>> {
    let bytes = STANDARD.decode(bdata).ok()?;
    let width = match dtype {
        "f8" => 8,
        "f4" | "i4" | "u4" => 4,
        "i2" | "u2" => 2,
        "i1" | "u1" | "u1c" => 1,
        _ => return None,
    };
    if bytes.len() % width != 0 {
        return None;
    }
    let values = bytes
        .chunks_exact(width)
        .map(|c| {
            let v = match dtype {
                "f8" => f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]),
                "f4" => f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64,
                "i4" => i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64,
                "u4" => u32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64,
                "i2" => i16::from_le_bytes([c[0], c[1]]) as f64,
                "u2" => u16::from_le_bytes([c[0], c[1]]) as f64,
                "i1" => c[0] as i8 as f64,
                _ => c[0] as f64,
            };
            Value::from(v)
        })
        .collect();
    Some(values)
}

impl Trace {
    pub fn point_count(&self) -> usize {
        self.x.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
impl Trace {
    pub fn new(name: impl Into<String>, x: Vec<Value>, y: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            x: Some(x),
            y: Some(y),
        }
    }

    /// Build a trace from plain numbers.
    pub fn from_f64(name: impl Into<String>, x: &[f64], y: &[f64]) -> Self {
        Self::new(
            name,
            x.iter().map(|&v| Value::from(v)).collect(),
            y.iter().map(|&v| Value::from(v)).collect(),
        )
    }
}
