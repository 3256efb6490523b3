//! Semi-structured tree shared by every document dialect

use indexmap::IndexMap;

/// A parsed value with no layout meaning attached yet
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<RawValue>),
    Map(IndexMap<String, RawValue>),
}

impl RawValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, RawValue>> {
        match self {
            RawValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Numbers, and strings holding a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Booleans, and strings compared case-insensitively against `true`
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RawValue::Bool(b) => Some(*b),
            RawValue::String(s) => Some(s.eq_ignore_ascii_case("true")),
            _ => None,
        }
    }

    /// Text form of a scalar; collections and null have none
    pub fn to_text(&self) -> Option<String> {
        match self {
            RawValue::String(s) => Some(s.clone()),
            RawValue::Number(n) => Some(format_number(*n)),
            RawValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Look up a key when this value is a map
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(RawValue::Null, RawValue::Number),
            serde_json::Value::String(s) => RawValue::String(s),
            serde_json::Value::Array(items) => {
                RawValue::List(items.into_iter().map(RawValue::from).collect())
            }
            serde_json::Value::Object(map) => RawValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, RawValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Whole numbers print without a fraction
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
