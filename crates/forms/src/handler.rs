// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runs a request through a form: mapper import, validation, and the
//! resulting submitted form.

use serde_json::Value;
use tracing::debug;

use crate::Payload;
use crate::error::SchemaError;
use crate::form::{Form, Method, apply_errors, set_values};
use crate::schema::{Validation, ValidationOptions, Validator};

/// The parts of an HTTP request a form handler needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormRequest {
    /// Request method.
    pub method: Method,
    /// Decoded request body.
    pub payload: Payload,
    /// Decoded query string.
    pub query: Payload,
}

impl FormRequest {
    /// A `GET` request with the given query.
    #[must_use]
    pub fn get(query: Payload) -> Self {
        Self {
            method: Method::Get,
            payload: Payload::new(),
            query,
        }
    }

    /// A `POST` request with the given body.
    #[must_use]
    pub fn post(payload: Payload) -> Self {
        Self {
            method: Method::Post,
            payload,
            query: Payload::new(),
        }
    }

    /// The same request carrying `query` as its query string.
    #[must_use]
    pub fn with_query(mut self, query: Payload) -> Self {
        self.query = query;
        self
    }
}

/// Handles a request for `form` against `schema`.
///
/// A request whose method differs from the form's leaves the form as it was.
/// Otherwise a new form is returned with values set, `is_submitted` true and
/// `is_valid` reflecting the validation outcome. The input form is never
/// modified.
///
/// # Arguments
///
/// * `form` - The form definition
/// * `request` - The incoming request
/// * `schema` - Validator for the typed values
/// * `options` - Validation options
///
/// # Errors
///
/// Returns `SchemaError` if the schema is misconfigured.
pub fn handle_request<V: Validator + ?Sized>(
    form: &Form,
    request: &FormRequest,
    schema: &V,
    options: &ValidationOptions,
) -> Result<Form, SchemaError> {
    if request.method != form.method {
        return Ok(form.clone());
    }

    let source: &Payload = match form.method {
        Method::Get => &request.query,
        Method::Post => &request.payload,
    };
    let values: Payload = import_values(form, source);
    let validation: Validation = schema.validate(&values, options)?;

    let mut next: Form = set_values(form, &values);
    next.is_submitted = true;

    match validation.error {
        Some(details) => {
            debug!(
                action = %form.action,
                error_count = details.errors.len(),
                "Form submission failed validation"
            );
            next = apply_errors(&next, &details.errors);
            next.is_valid = Some(false);
        }
        None => {
            debug!(action = %form.action, "Form submission valid");
            next = set_values(&next, &validation.value);
            next = apply_errors(&next, &[]);
            next.is_valid = Some(true);
        }
    }

    Ok(next)
}

/// Imports every valued field through its mapper.
fn import_values(form: &Form, source: &Payload) -> Payload {
    form.fields
        .iter()
        .filter_map(|field| {
            let name: &str = field.value_name()?;
            let value: Value = field.options.mapper.import(name, source)?;
            Some((name.to_string(), value))
        })
        .collect()
}

/// Builds a payload from decoded `application/x-www-form-urlencoded` pairs.
///
/// A key that appears more than once becomes an array of its values in
/// submission order.
#[must_use]
pub fn payload_from_pairs<I, K, V>(pairs: I) -> Payload
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut payload: Payload = Payload::new();
    for (key, value) in pairs {
        let key: String = key.into();
        let value: Value = Value::String(value.into());
        match payload.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first: Value = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                payload.insert(key, value);
            }
        }
    }
    payload
}
