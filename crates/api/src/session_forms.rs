// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Post/Redirect/Get support.
//!
//! A form that failed validation is parked in the session under a random
//! key and the browser is redirected to a `GET` carrying that key. The `GET`
//! handler takes the form back out, so each parked form is shown once.
//! A session keeps at most [`MAX_PARKED_FORMS`]; parking one more evicts
//! the oldest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;
use water_abstraction_forms::{Form, Payload};

use crate::error::ApiError;
use crate::request_response::Redirect;
use crate::session::SessionData;

/// Query parameter that carries the parked form key.
pub const FORM_QUERY_PARAM: &str = "form";

/// Most forms a session keeps parked at once.
pub const MAX_PARKED_FORMS: usize = 10;

const FORM_KEY_PREFIX: &str = "forms.";

/// A parked form and its place in parking order.
#[derive(Serialize)]
struct Parking<'a> {
    seq: u64,
    form: &'a Form,
}

#[derive(Deserialize)]
struct Parked {
    form: Form,
}

fn session_key(key: &Uuid) -> String {
    format!("{FORM_KEY_PREFIX}{key}")
}

fn parked_seq(value: Option<&Value>) -> u64 {
    value
        .and_then(|value| value.get("seq"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

/// Parks `form` in the session.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the form cannot be encoded.
pub fn set(session: &mut SessionData, form: &Form) -> Result<Uuid, ApiError> {
    let mut parked: Vec<(u64, String)> = session
        .keys_with_prefix(FORM_KEY_PREFIX)
        .map(|key| (parked_seq(session.get(key)), key.to_string()))
        .collect();
    parked.sort();
    let seq: u64 = parked.last().map_or(0, |(seq, _)| seq + 1);

    let excess: usize = (parked.len() + 1).saturating_sub(MAX_PARKED_FORMS);
    for (_, evicted) in parked.iter().take(excess) {
        session.clear(evicted);
        debug!(key = %evicted, "Evicted oldest parked form");
    }

    let key: Uuid = Uuid::new_v4();
    session.set_as(&session_key(&key), &Parking { seq, form })?;
    debug!(%key, seq, action = %form.action, "Stored form in session");
    Ok(key)
}

/// Takes the parked form named by the `form` query parameter.
///
/// Falls back to `default_form` when the parameter is absent, the key is
/// unknown or the stored value does not decode. A stored value is removed
/// whether or not it decodes.
#[must_use]
pub fn get(session: &mut SessionData, query: &Payload, default_form: Form) -> Form {
    let Some(key) = query
        .get(FORM_QUERY_PARAM)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
    else {
        return default_form;
    };

    let Some(stored) = session.clear(&session_key(&key)) else {
        return default_form;
    };

    match serde_json::from_value::<Parked>(stored) {
        Ok(Parked { form }) => {
            debug!(%key, action = %form.action, "Restored form from session");
            form
        }
        Err(e) => {
            warn!(%key, error = %e, "Discarding undecodable session form");
            default_form
        }
    }
}

/// Parks `form` and builds the redirect back to the page that shows it.
///
/// The redirect goes to `path`, or the form's action when `path` is `None`,
/// with `params` and the parked form key in the query string.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the form cannot be encoded.
pub fn post_redirect_get(
    session: &mut SessionData,
    form: &Form,
    path: Option<&str>,
    params: &Payload,
) -> Result<Redirect, ApiError> {
    let key: Uuid = set(session, form)?;
    let path: &str = path.unwrap_or(form.action.as_str());

    let mut pairs: Vec<String> = Vec::new();
    for (name, value) in params {
        if name == FORM_QUERY_PARAM {
            continue;
        }
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| encode_pair(name, item)));
            }
            other => pairs.push(encode_pair(name, other)),
        }
    }
    pairs.push(format!("{FORM_QUERY_PARAM}={key}"));

    Ok(Redirect::see_other(format!("{path}?{}", pairs.join("&"))))
}

fn encode_pair(name: &str, value: &Value) -> String {
    let text: String = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    format!(
        "{}={}",
        urlencoding::encode(name),
        urlencoding::encode(&text)
    )
}
