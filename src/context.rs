//! Context values passed through template resolution and composition
//!
//! Every map the engine carries is a `BTreeMap` so that resolution, rendered
//! output, and persisted documents come out in a stable order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named values available to templates and condition expressions
pub type ContextMap = BTreeMap<String, ContextValue>;

/// Slot name to slot content
pub type SlotMap = BTreeMap<String, String>;

/// A dynamically typed context value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<ContextValue>),
    Map(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    /// Human-readable name of the value's type, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ContextValue::Bool(_) => "boolean",
            ContextValue::Number(_) => "number",
            ContextValue::String(_) => "string",
            ContextValue::List(_) => "list",
            ContextValue::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ContextValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value as template text
    pub fn to_text(&self) -> String {
        match self {
            ContextValue::Bool(b) => b.to_string(),
            ContextValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            ContextValue::String(s) => s.clone(),
            ContextValue::List(items) => items
                .iter()
                .map(ContextValue::to_text)
                .collect::<Vec<_>>()
                .join(", "),
            ContextValue::Map(entries) => entries
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value.to_text()))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Number(value)
    }
}

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        ContextValue::Number(value as f64)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

impl From<Vec<String>> for ContextValue {
    fn from(values: Vec<String>) -> Self {
        ContextValue::List(values.into_iter().map(ContextValue::String).collect())
    }
}

/// Overlay `overrides` onto `target`, replacing existing keys
pub fn merge(target: &mut ContextMap, overrides: &ContextMap) {
    for (key, value) in overrides {
        target.insert(key.clone(), value.clone());
    }
}

/// Look up a dotted path like `user.admin`, traversing nested maps
pub fn lookup_path<'a>(context: &'a ContextMap, path: &str) -> Option<&'a ContextValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = context.get(first)?;
    for segment in segments {
        match current {
            ContextValue::Map(entries) => current = entries.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}
