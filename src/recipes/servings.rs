// ABOUTME: Normalises the servings value, which models emit as a number, a string or an object
// ABOUTME: Classifies the source shape explicitly before producing a single textual value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use serde_json::{Map, Value};

/// Keys read, in order, from an object-shaped servings value
const AMOUNT_KEYS: [&str; 4] = ["value", "amount", "count", "quantity"];

/// The shape a servings value arrived in
#[derive(Debug, Clone, PartialEq)]
pub enum ServingsShape {
    /// Field missing or null
    Absent,
    /// `"servings": 4`
    Number(f64),
    /// `"servings": "24 cookies"`
    Text(String),
    /// `"servings": {"value": 4, "unit": "bowls"}`
    Object {
        /// Amount read from the first recognised key
        amount: Option<String>,
        /// Optional unit
        unit: Option<String>,
    },
}

impl ServingsShape {
    /// Classify a JSON value
    ///
    /// # Errors
    ///
    /// Returns a decode error for arrays and booleans
    pub fn classify(value: Option<&Value>) -> AppResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::Absent),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| AppError::decode_failed("servings number out of range")),
            Some(Value::String(s)) => Ok(Self::Text(s.trim().to_owned())),
            Some(Value::Object(map)) => Ok(Self::from_object(map)),
            Some(other @ (Value::Array(_) | Value::Bool(_))) => Err(AppError::decode_failed(
                format!("unsupported servings value: {other}"),
            )),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let amount = AMOUNT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(scalar_text));
        let unit = map
            .get("unit")
            .and_then(scalar_text)
            .filter(|unit| !unit.is_empty());
        Self::Object { amount, unit }
    }

    /// Textual servings value; empty when absent
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Absent => String::new(),
            Self::Number(n) => format_number(n),
            Self::Text(s) => s,
            Self::Object { amount, unit } => match (amount, unit) {
                (Some(amount), Some(unit)) => format!("{amount} {unit}"),
                (Some(amount), None) => amount,
                (None, Some(unit)) => unit,
                (None, None) => String::new(),
            },
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().map(format_number),
        Value::String(s) => Some(s.trim().to_owned()),
        _ => None,
    }
}

/// Whole numbers print without a decimal point
fn format_number(n: f64) -> String {
    if n.fract().abs() < f64::EPSILON && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
