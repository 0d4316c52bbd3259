// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-field-type conversion between raw HTTP payload values and typed values.
//!
//! `import` returns `None` when the value is undefined (the field is left out
//! of the typed value bag) and `Some(Value::Null)` when it is explicitly null.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::Payload;

/// Mapper attached to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mapper {
    /// Raw payload value, unchanged.
    #[default]
    Default,
    /// Numbers with optional thousand separators.
    Number,
    /// `"true"` / `"false"` strings.
    Boolean,
    /// Separate day, month and year inputs combined into an ISO date.
    Date,
    /// Zero or more values, e.g. a checkbox group.
    Array,
    /// A free text list separated by commas, semicolons or new lines.
    CsvList,
}

impl Mapper {
    /// Reads the value for `name` out of a raw payload.
    #[must_use]
    pub fn import(&self, name: &str, payload: &Payload) -> Option<Value> {
        match self {
            Self::Default => payload.get(name).cloned(),
            Self::Number => import_number(payload.get(name)?),
            Self::Boolean => import_boolean(payload.get(name)?),
            Self::Date => import_date(name, payload),
            Self::Array => Some(import_array(payload.get(name))),
            Self::CsvList => import_csv_list(payload.get(name)?),
        }
    }

    /// Converts a typed value back to the form it is rendered in.
    #[must_use]
    pub fn export(&self, value: &Value) -> Option<Value> {
        match self {
            Self::Default | Self::Array => Some(value.clone()),
            Self::Number => Some(
                value
                    .as_f64()
                    .and_then(number_value)
                    .unwrap_or_else(|| value.clone()),
            ),
            Self::Boolean => value
                .as_bool()
                .map(|b| Value::String(b.to_string())),
            Self::Date => export_date(value),
            Self::CsvList => export_csv_list(value),
        }
    }
}

fn import_number(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(s) => {
            let stripped: String = s.replace(',', "");
            let trimmed: &str = stripped.trim();
            if trimmed.is_empty() {
                return Some(Value::Null);
            }
            // Non-numeric input is kept as typed so validation reports it
            // and the user sees what they entered.
            Some(
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(number_value)
                    .unwrap_or_else(|| Value::String(s.clone())),
            )
        }
        other => Some(other.clone()),
    }
}

/// A JSON number for `n`, whole when `n` has no fractional part so `10`
/// renders as `10` rather than `10.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

fn import_boolean(raw: &Value) -> Option<Value> {
    match raw {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::String(s) if s == "true" => Some(Value::Bool(true)),
        Value::String(s) if s == "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn date_part(payload: &Payload, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn pad2(part: &str) -> String {
    if part.len() == 1 {
        format!("0{part}")
    } else {
        part.to_string()
    }
}

fn import_date(name: &str, payload: &Payload) -> Option<Value> {
    let day: String = date_part(payload, &format!("{name}-day"));
    let month: String = date_part(payload, &format!("{name}-month"));
    let year: String = date_part(payload, &format!("{name}-year"));

    if day.is_empty() && month.is_empty() && year.is_empty() {
        return None;
    }

    // Partially completed dates produce a malformed string such as
    // `2018--01`, which the date rule then rejects.
    Some(Value::String(format!(
        "{year}-{}-{}",
        pad2(&month),
        pad2(&day)
    )))
}

fn export_date(value: &Value) -> Option<Value> {
    let iso: &str = value.as_str()?;
    let date_part: &str = iso.get(..10).unwrap_or(iso);
    let mut parts = date_part.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);

    let mut out: Map<String, Value> = Map::new();
    out.insert(String::from("day"), Value::String(pad2(day)));
    out.insert(String::from("month"), Value::String(pad2(month)));
    out.insert(String::from("year"), Value::String(year.to_string()));
    Some(Value::Object(out))
}

fn import_array(raw: Option<&Value>) -> Value {
    match raw {
        None | Some(Value::Null) => Value::Array(Vec::new()),
        Some(Value::Array(items)) => Value::Array(items.clone()),
        Some(scalar) => Value::Array(vec![scalar.clone()]),
    }
}

fn import_csv_list(raw: &Value) -> Option<Value> {
    match raw {
        Value::String(s) => Some(Value::Array(
            s.split([',', ';', '\n'])
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(|token| Value::String(token.to_string()))
                .collect(),
        )),
        Value::Array(items) => Some(Value::Array(items.clone())),
        _ => None,
    }
}

fn export_csv_list(value: &Value) -> Option<Value> {
    let items: &Vec<Value> = value.as_array()?;
    let tokens: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
    Some(Value::String(tokens.join(", ")))
}
