//! One batched completion call producing answers for every field.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{info, warn};

use crate::completion::Completion;
use crate::config::ValuePolicy;
use crate::context::EventContext;
use crate::fields::FieldDescriptor;
use crate::prompt::{build_prompt, SYSTEM_PROMPT};

/// Generated answers keyed by field label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedValues {
    values: HashMap<String, String>,
}

impl GeneratedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.values.insert(label.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a model reply. Anything other than a JSON object yields `None`.
    /// Empty strings are dropped; other non-string values follow `policy`.
    pub fn from_model_output(raw: &str, policy: ValuePolicy) -> Option<Self> {
        let object = match serde_json::from_str::<Value>(strip_code_fence(raw)) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                warn!(kind = json_kind(&other), "model reply is not a JSON object");
                return None;
            }
            Err(e) => {
                warn!(error = %e, raw = %raw, "model reply is not valid JSON");
                return None;
            }
        };

        let mut values = Self::new();
        for (label, value) in object {
            match render_value(&value, policy) {
                Some(text) if !text.is_empty() => values.insert(label, text),
                Some(_) => {}
                None => info!(label = %label, kind = json_kind(&value), "discarding non-text value"),
            }
        }
        Some(values)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GeneratedValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (label, value) in iter {
            values.insert(label, value);
        }
        values
    }
}

fn render_value(value: &Value, policy: ValuePolicy) -> Option<String> {
    match (value, policy) {
        (Value::String(s), _) => Some(s.clone()),
        (Value::Number(n), ValuePolicy::Coerce) => Some(n.to_string()),
        (Value::Bool(b), ValuePolicy::Coerce) => Some(b.to_string()),
        (Value::Array(items), ValuePolicy::Coerce) => {
            let parts: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Value::Array(_) | Value::Object(_) | Value::Null => None,
                    scalar => render_value(scalar, policy),
                })
                .collect();
            parts.map(|parts| parts.join(", "))
        }
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Drop a surrounding ```json ... ``` fence some models add despite JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Sends the prompt for a whole form in a single request.
pub struct ValueGenerator<C> {
    completion: C,
    policy: ValuePolicy,
}

impl<C: Completion> ValueGenerator<C> {
    pub fn new(completion: C) -> Self {
        Self {
            completion,
            policy: ValuePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Ask for every field at once. Transport or parse failures are logged
    /// and produce an empty mapping; fields without an answer are left alone
    /// by the filler.
    pub async fn generate(
        &self,
        fields: &[FieldDescriptor],
        context: &EventContext,
        additional_context: &str,
    ) -> GeneratedValues {
        let prompt = build_prompt(fields, context, additional_context);

        info!(fields = fields.len(), "requesting field values from model");
        let raw = match self.completion.complete_json(SYSTEM_PROMPT, &prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "completion request failed");
                return GeneratedValues::new();
            }
        };
        info!(response = %raw, "received model response");

        GeneratedValues::from_model_output(&raw, self.policy).unwrap_or_default()
    }
}
