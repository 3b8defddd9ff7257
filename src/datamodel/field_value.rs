use std::fmt;

/// A value that can be written as a single line protocol field.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// The value of one entity inside a structured sample.
///
/// The producer picks the variant when it builds the sample: an inverter
/// counter is an `Int`, a derating reason is a `Str`, and a multi-phase
/// reading is a `Nested` mapping of sub-keys (`a`, `b`, `c`, `total`).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    Nested(Vec<(String, FieldValue)>),
}

impl FieldValue {
    pub fn nested<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        FieldValue::Nested(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// The scalar form of this value, `None` for a nested mapping.
    pub fn as_scalar(&self) -> Option<ScalarValue> {
        match self {
            FieldValue::Int(value) => Some(ScalarValue::Int(*value)),
            FieldValue::Float(value) => Some(ScalarValue::Float(*value)),
            FieldValue::Str(value) => Some(ScalarValue::Str(value.clone())),
            FieldValue::Nested(_) => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<ScalarValue> for FieldValue {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Int(value) => FieldValue::Int(value),
            ScalarValue::Float(value) => FieldValue::Float(value),
            ScalarValue::Str(value) => FieldValue::Str(value),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int(value) => write!(f, "{}", value),
            ScalarValue::Float(value) => write!(f, "{}", value),
            ScalarValue::Str(value) => write!(f, "{}", value),
        }
    }
}
