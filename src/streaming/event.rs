use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// The JSON payload of one complete frame.
///
/// The decoder does not interpret the payload; backend-specific
/// discriminants (`event`, `type`, `step`, ...) are read by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedEvent(Value);

impl ParsedEvent {
    /// Parse one raw frame
    pub fn parse(frame: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(frame)?))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a top-level string field
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Whether a top-level field is present and not null
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    /// Deserialize into a backend-specific type
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.0)?)
    }
}

impl From<Value> for ParsedEvent {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<ParsedEvent> for Value {
    fn from(event: ParsedEvent) -> Self {
        event.0
    }
}
