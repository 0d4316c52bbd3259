// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wizard page controllers.
//!
//! Every page is a `GET` that renders a form and a `POST` that validates it.
//! A failed `POST` parks the annotated form in the session and redirects back
//! to the `GET`; a valid one updates the wizard state and moves on.

pub mod charge_information;
pub mod paper_forms;
pub mod returns;

use serde::Serialize;
use serde_json::Value;
use time::Date;
use water_abstraction_domain::parse_iso_date;
use water_abstraction_forms::{
    Form, FormRequest, Payload, ValidationErrorItem, ValidationOptions, Validator, apply_errors,
    handle_request,
};

use crate::error::{ApiError, translate_schema_error};
use crate::request_response::{PageOutcome, Redirect, ViewModel};
use crate::session::SessionData;
use crate::session_forms;

/// Outcome of validating a posted form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Submission {
    /// The form passed validation and holds typed values.
    Valid(Form),
    /// The form failed validation and has been parked for redisplay.
    Invalid(Redirect),
}

/// Renders a page, preferring a form parked by a failed `POST`.
pub(crate) fn render_page<T: Serialize>(
    session: &mut SessionData,
    query: &Payload,
    default_form: Form,
    page_title: &str,
    back_link: Option<String>,
    data: &T,
) -> Result<PageOutcome, ApiError> {
    let form: Form = session_forms::get(session, query, default_form);
    let data: Value = serde_json::to_value(data).map_err(|e| ApiError::Internal {
        message: format!("Failed to encode page data: {e}"),
    })?;
    Ok(PageOutcome::View(Box::new(ViewModel {
        page_title: page_title.to_string(),
        form,
        back_link,
        data,
    })))
}

/// Validates a posted request against `form` and `schema`.
///
/// A failed submission redirects back to the form's action with the
/// request's query parameters kept.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the schema is misconfigured or the form
/// cannot be parked.
pub(crate) fn submit_form<V: Validator + ?Sized>(
    session: &mut SessionData,
    form: &Form,
    request: &FormRequest,
    schema: &V,
) -> Result<Submission, ApiError> {
    let handled: Form = handle_request(form, request, schema, &ValidationOptions::default())
        .map_err(|e| translate_schema_error(&e))?;

    if handled.is_valid_submission() {
        Ok(Submission::Valid(handled))
    } else {
        let redirect: Redirect =
            session_forms::post_redirect_get(session, &handled, None, &request.query)?;
        Ok(Submission::Invalid(redirect))
    }
}

/// Marks a field of an otherwise valid form as failed and parks the form.
///
/// Used for checks that need backend data the schema does not have. The
/// error kind is `any.invalid`, so `message` is shown unless the field
/// configures its own message for that kind.
pub(crate) fn reject_field(
    session: &mut SessionData,
    form: &Form,
    name: &str,
    message: &str,
    query: &Payload,
) -> Result<PageOutcome, ApiError> {
    let item: ValidationErrorItem =
        ValidationErrorItem::new(name, "any.invalid", message.to_string(), None);
    let mut rejected: Form = apply_errors(form, &[item]);
    rejected.is_valid = Some(false);
    let redirect: Redirect = session_forms::post_redirect_get(session, &rejected, None, query)?;
    Ok(PageOutcome::Redirect(redirect))
}

pub(crate) fn string_value(values: &Payload, name: &str) -> Option<String> {
    values
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn number_value(values: &Payload, name: &str) -> Option<f64> {
    values.get(name).and_then(Value::as_f64)
}

pub(crate) fn bool_value(values: &Payload, name: &str) -> Option<bool> {
    values.get(name).and_then(Value::as_bool)
}

pub(crate) fn date_value(values: &Payload, name: &str) -> Option<Date> {
    values
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| parse_iso_date(s).ok())
}

pub(crate) fn string_list(values: &Payload, name: &str) -> Vec<String> {
    values
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A typed value the schema guarantees but the payload does not hold.
pub(crate) fn missing_value(name: &str) -> ApiError {
    ApiError::InvalidInput {
        field: name.to_string(),
        message: format!("No value for '{name}'"),
    }
}
