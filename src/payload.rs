use crate::error::HookError;
use serde_json::{Map, Value};

/// Parsed hook payload
#[derive(Debug, Clone)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn parse(raw: &str) -> Result<Self, HookError> {
        serde_json::from_str::<Map<String, Value>>(raw)
            .map(|fields| Payload { fields })
            .map_err(|_| HookError::MalformedPayload(raw.to_string()))
    }

    /// Field value as text, empty if absent or null.
    /// Numbers and booleans keep their JSON spelling, string arrays are
    /// joined with ", ".
    pub fn field(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Some(other) => other.to_string(),
        }
    }

    /// Like [`Payload::field`], but an empty value aborts the run
    pub fn require(&self, name: &str) -> Result<String, HookError> {
        let value = self.field(name);
        if value.is_empty() {
            tracing::error!("required field '{}' is missing or null", name);
            return Err(HookError::MissingField(name.to_string()));
        }
        Ok(value)
    }
}
