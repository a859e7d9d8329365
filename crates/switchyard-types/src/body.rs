//! Structured message bodies.
//!
//! A [`Body`] is a JSON object: a mapping of string keys to strings, numbers,
//! booleans, or nested arrays/objects. Shape is validated once, when a raw
//! JSON value crosses into the bus, and trusted everywhere after that.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BodyError;

/// JSON-object message payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Body(Map<String, Value>);

impl Body {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a field, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field accessor; `None` if missing or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Body {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Body {
    type Error = BodyError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Err(BodyError::NotAnObject("null")),
            Value::Bool(_) => Err(BodyError::NotAnObject("boolean")),
            Value::Number(_) => Err(BodyError::NotAnObject("number")),
            Value::String(_) => Err(BodyError::NotAnObject("string")),
            Value::Array(_) => Err(BodyError::NotAnObject("array")),
        }
    }
}

impl From<Body> for Value {
    fn from(body: Body) -> Self {
        body.into_value()
    }
}
