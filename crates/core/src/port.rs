use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::PortError;
use crate::handle::Handle;

/// A value carried on a single port.
#[derive(Debug, Clone)]
pub enum PortValue {
    /// Plain data.
    Value(Value),
    /// An opaque shared object, such as an API session.
    Handle(Handle),
}

impl PortValue {
    /// Returns the JSON value, if this is a data port.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Handle(_) => None,
        }
    }

    /// Returns the handle, if this is a handle port.
    pub fn as_handle(&self) -> Option<&Handle> {
        match self {
            Self::Handle(h) => Some(h),
            Self::Value(_) => None,
        }
    }

    /// A port counts as empty when it holds `null` or an empty string.
    ///
    /// Hosts commonly send `""` for optional fields the author left blank.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Value(Value::Null) => true,
            Self::Value(Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }

    /// JSON rendering; handles become `{"handle": "<TypeName>"}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Handle(h) => serde_json::json!({ "handle": h.short_type_name() }),
        }
    }
}

impl Serialize for PortValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<Value> for PortValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Handle> for PortValue {
    fn from(handle: Handle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&str> for PortValue {
    fn from(s: &str) -> Self {
        Self::Value(Value::String(s.to_owned()))
    }
}

impl From<String> for PortValue {
    fn from(s: String) -> Self {
        Self::Value(Value::String(s))
    }
}

impl From<Option<String>> for PortValue {
    fn from(s: Option<String>) -> Self {
        Self::Value(s.map_or(Value::Null, Value::String))
    }
}

impl From<bool> for PortValue {
    fn from(b: bool) -> Self {
        Self::Value(Value::Bool(b))
    }
}

impl From<u64> for PortValue {
    fn from(n: u64) -> Self {
        Self::Value(Value::from(n))
    }
}

/// A named set of port values: the inputs or outputs of one component run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Ports {
    values: BTreeMap<String, PortValue>,
}

impl Ports {
    /// Create an empty set of ports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PortValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a port value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PortValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a port value by name.
    pub fn get(&self, name: &str) -> Option<&PortValue> {
        self.values.get(name)
    }

    /// Returns `true` if the port exists and is not empty.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Iterate over ports in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PortValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build ports from a JSON object; every member becomes a data port.
    pub fn from_json_object(object: serde_json::Map<String, Value>) -> Self {
        Self {
            values: object
                .into_iter()
                .map(|(k, v)| (k, PortValue::Value(v)))
                .collect(),
        }
    }

    /// Render all ports as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn value(&self, name: &str) -> Option<&PortValue> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Read an optional text port. Numbers and booleans are stringified so
    /// that e.g. a phone number typed as a number still reads as text.
    pub fn string(&self, name: &str) -> Result<Option<String>, PortError> {
        match self.value(name) {
            None => Ok(None),
            Some(PortValue::Value(Value::String(s))) => Ok(Some(s.clone())),
            Some(PortValue::Value(v @ (Value::Number(_) | Value::Bool(_)))) => {
                Ok(Some(v.to_string()))
            }
            Some(_) => Err(mismatch(name, "a string")),
        }
    }

    /// Read a required text port.
    pub fn require_string(&self, name: &str) -> Result<String, PortError> {
        self.string(name)?
            .ok_or_else(|| PortError::Missing(name.to_owned()))
    }

    /// Read an optional non-negative integer port. Numeric strings are
    /// accepted.
    pub fn u64(&self, name: &str) -> Result<Option<u64>, PortError> {
        const EXPECTED: &str = "a non-negative integer";
        match self.value(name) {
            None => Ok(None),
            Some(PortValue::Value(Value::Number(n))) => {
                n.as_u64().map(Some).ok_or_else(|| mismatch(name, EXPECTED))
            }
            Some(PortValue::Value(Value::String(s))) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| mismatch(name, EXPECTED)),
            Some(_) => Err(mismatch(name, EXPECTED)),
        }
    }

    /// Read an optional boolean port. `"true"` and `"false"` are accepted.
    pub fn bool(&self, name: &str) -> Result<Option<bool>, PortError> {
        match self.value(name) {
            None => Ok(None),
            Some(PortValue::Value(Value::Bool(b))) => Ok(Some(*b)),
            Some(PortValue::Value(Value::String(s))) => match s.trim() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(mismatch(name, "a boolean")),
            },
            Some(_) => Err(mismatch(name, "a boolean")),
        }
    }

    /// Read an optional handle port.
    pub fn handle(&self, name: &str) -> Result<Option<&Handle>, PortError> {
        match self.value(name) {
            None => Ok(None),
            Some(PortValue::Handle(h)) => Ok(Some(h)),
            Some(PortValue::Value(_)) => Err(mismatch(name, "a handle")),
        }
    }
}

impl FromIterator<(String, PortValue)> for Ports {
    fn from_iter<I: IntoIterator<Item = (String, PortValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn mismatch(port: &str, expected: &'static str) -> PortError {
    PortError::TypeMismatch {
        port: port.to_owned(),
        expected,
    }
}
