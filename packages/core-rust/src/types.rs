use std::collections::BTreeMap;
use std::fmt;

/// Identity of a single inbound request.
///
/// Allocated from a process-wide monotonic counter, so two requests never
/// share an identity even when clients send the same `X-Request-Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Untyped runtime value attached to a request.
///
/// Values carry no static type at storage time. Readers assert the type
/// they expect through the `as_*` accessors or the `TryFrom` conversions,
/// which fail with [`ValueTypeError`] on a mismatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null. Distinct from a key that was never set.
    Null,
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit IEEE 754 float.
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    /// Uses `BTreeMap` for deterministic iteration order.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in type mismatch errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

/// Error returned when a stored [`Value`] is read back as the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {found}")]
pub struct ValueTypeError {
    pub expected: &'static str,
    pub found: &'static str,
}

impl ValueTypeError {
    fn new(expected: &'static str, found: &Value) -> Self {
        Self {
            expected,
            found: found.type_name(),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ValueTypeError::new("string", &other)),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .as_int()
            .ok_or_else(|| ValueTypeError::new("int", &value))
    }
}

impl TryFrom<Value> for u32 {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .as_int()
            .and_then(|i| u32::try_from(i).ok())
            .ok_or_else(|| ValueTypeError::new("u32", &value))
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .as_bool()
            .ok_or_else(|| ValueTypeError::new("bool", &value))
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueTypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value
            .as_float()
            .ok_or_else(|| ValueTypeError::new("float", &value))
    }
}
