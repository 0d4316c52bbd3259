// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The form object and the pure functions that read and update it.
//!
//! Forms are values. Every update returns a new form and leaves its input
//! untouched, so a form built once can be reused for every request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::Payload;
use crate::error::FormError;
use crate::field::{Field, FieldError};
use crate::schema::ValidationErrorItem;

/// HTTP method a form submits with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Values are read from the query string.
    Get,
    /// Values are read from the request body.
    #[default]
    Post,
}

impl Method {
    /// The method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            other => Err(format!("Unsupported form method: {other}")),
        }
    }
}

/// A form: an action, a method and an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Path the form submits to.
    pub action: String,
    /// Submission method.
    pub method: Method,
    /// Fields in display order.
    pub fields: Vec<Field>,
    /// Summary list of every field error.
    #[serde(default)]
    pub errors: Vec<FieldError>,
    /// Set once a request with the form's method has been handled.
    #[serde(default)]
    pub is_submitted: bool,
    /// `None` until submitted, then the validation outcome.
    #[serde(default)]
    pub is_valid: Option<bool>,
}

/// Creates an empty form.
#[must_use]
pub fn form_factory(action: &str, method: Method) -> Form {
    Form {
        action: action.to_string(),
        method,
        fields: Vec::new(),
        errors: Vec::new(),
        is_submitted: false,
        is_valid: None,
    }
}

impl Form {
    /// Returns a copy of the form with `fields` appended.
    ///
    /// # Errors
    ///
    /// Returns `FormError::DuplicateField` if two named fields share a name.
    pub fn with_fields<I>(&self, fields: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = Field>,
    {
        let mut next: Self = self.clone();
        next.fields.extend(fields);

        let mut seen: HashSet<&str> = HashSet::new();
        for name in next.fields.iter().filter_map(|f| f.name.as_deref()) {
            if !seen.insert(name) {
                return Err(FormError::DuplicateField {
                    action: next.action.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(next)
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.as_deref() == Some(name))
    }

    /// Returns true if the form was submitted and passed validation.
    #[must_use]
    pub fn is_valid_submission(&self) -> bool {
        self.is_submitted && self.is_valid == Some(true)
    }
}

/// Collects the typed values of every value-carrying field.
///
/// Fields without a value are omitted.
#[must_use]
pub fn get_values(form: &Form) -> Payload {
    form.fields
        .iter()
        .filter_map(|field| {
            let name: &str = field.value_name()?;
            let value: &Value = field.value.as_ref()?;
            Some((name.to_string(), value.clone()))
        })
        .collect()
}

/// Returns a copy of the form with values set from `values`.
///
/// Fields not named in `values` keep their current value.
#[must_use]
pub fn set_values(form: &Form, values: &Payload) -> Form {
    let mut next: Form = form.clone();
    for field in &mut next.fields {
        let Some(name) = field.value_name() else {
            continue;
        };
        if let Some(value) = values.get(name) {
            field.value = Some(value.clone());
        }
    }
    next
}

/// Returns a copy of the form with validation errors attached.
///
/// Each item is matched to its field by name. The message comes from the
/// field's configured messages for the item's kind, falling back to the
/// validator's own message. Previous errors are replaced.
#[must_use]
pub fn apply_errors(form: &Form, items: &[ValidationErrorItem]) -> Form {
    let mut next: Form = form.clone();
    let mut summary: Vec<FieldError> = Vec::new();

    for field in &mut next.fields {
        field.errors.clear();
        let Some(name) = field.name.clone() else {
            continue;
        };
        for item in items.iter().filter(|item| item.name == name) {
            let message: String = field
                .options
                .error_messages
                .get(&item.kind)
                .cloned()
                .unwrap_or_else(|| item.message.clone());
            let error: FieldError = FieldError {
                name: name.clone(),
                message,
                kind: item.kind.clone(),
            };
            summary.push(error.clone());
            field.errors.push(error);
        }
    }

    next.errors = summary;
    next
}
