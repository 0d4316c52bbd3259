// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::{Value, json};
use uuid::Uuid;
use water_abstraction_forms::{FieldOptions, Form, Method, Payload, fields, form_factory};

use super::helpers::{payload, query_of};
use crate::session_forms::{self, FORM_QUERY_PARAM, MAX_PARKED_FORMS};
use crate::{Redirect, SessionData};

fn create_test_form() -> Form {
    form_factory("/returns-notifications/paper-forms", Method::Post)
        .with_fields([
            fields::text("licenceNumbers", FieldOptions::default()),
            fields::button("Continue"),
        ])
        .unwrap()
}

fn create_submitted_form() -> Form {
    let mut form: Form = create_test_form();
    form.is_submitted = true;
    form.is_valid = Some(false);
    form
}

fn key_query(key: &Uuid) -> Payload {
    payload(json!({ FORM_QUERY_PARAM: key.to_string() }))
}

#[test]
fn test_get_without_key_returns_default_form() {
    let mut session: SessionData = SessionData::new();
    let form: Form = session_forms::get(&mut session, &Payload::new(), create_test_form());
    assert_eq!(form, create_test_form());
}

#[test]
fn test_set_then_get_returns_stored_form_once() {
    let mut session: SessionData = SessionData::new();
    let key: Uuid = session_forms::set(&mut session, &create_submitted_form()).unwrap();
    assert_eq!(session.len(), 1);

    let first: Form = session_forms::get(&mut session, &key_query(&key), create_test_form());
    assert_eq!(first, create_submitted_form());
    assert!(session.is_empty());

    let second: Form = session_forms::get(&mut session, &key_query(&key), create_test_form());
    assert_eq!(second, create_test_form());
}

#[test]
fn test_get_with_unknown_key_returns_default_form() {
    let mut session: SessionData = SessionData::new();
    session_forms::set(&mut session, &create_submitted_form()).unwrap();

    let form: Form = session_forms::get(&mut session, &key_query(&Uuid::new_v4()), create_test_form());
    assert_eq!(form, create_test_form());
    assert_eq!(session.len(), 1);
}

#[test]
fn test_get_with_malformed_key_returns_default_form() {
    let mut session: SessionData = SessionData::new();
    let query: Payload = payload(json!({ "form": "not-a-uuid" }));
    let form: Form = session_forms::get(&mut session, &query, create_test_form());
    assert_eq!(form, create_test_form());
}

#[test]
fn test_get_discards_undecodable_entry() {
    let mut session: SessionData = SessionData::new();
    let key: Uuid = Uuid::new_v4();
    session.set(&format!("forms.{key}"), json!({ "garbled": true }));

    let form: Form = session_forms::get(&mut session, &key_query(&key), create_test_form());
    assert_eq!(form, create_test_form());
    assert!(session.is_empty());
}

#[test]
fn test_post_redirect_get_defaults_to_form_action() {
    let mut session: SessionData = SessionData::new();
    let redirect: Redirect = session_forms::post_redirect_get(
        &mut session,
        &create_submitted_form(),
        None,
        &Payload::new(),
    )
    .unwrap();

    assert!(
        redirect
            .location
            .starts_with("/returns-notifications/paper-forms?form=")
    );
}

#[test]
fn test_post_redirect_get_keeps_params_and_encodes_them() {
    let mut session: SessionData = SessionData::new();
    let params: Payload = payload(json!({
        "returnId": "v1:1:01/123",
        "ids": ["a", "b c"],
        "form": "stale-key",
    }));
    let redirect: Redirect = session_forms::post_redirect_get(
        &mut session,
        &create_submitted_form(),
        Some("/returns/internal"),
        &params,
    )
    .unwrap();

    assert!(redirect.location.starts_with("/returns/internal?"));
    assert!(redirect.location.contains("returnId=v1%3A1%3A01%2F123"));
    assert!(redirect.location.contains("ids=a&ids=b%20c"));
    assert!(!redirect.location.contains("stale-key"));

    let query: Payload = query_of(&redirect.location);
    assert_eq!(query.get("returnId"), Some(&json!("v1:1:01/123")));
    let key: &str = query.get(FORM_QUERY_PARAM).and_then(Value::as_str).unwrap();
    assert!(Uuid::parse_str(key).is_ok());
}

#[test]
fn test_post_redirect_get_location_recovers_form_once() {
    let mut session: SessionData = SessionData::new();
    let redirect: Redirect = session_forms::post_redirect_get(
        &mut session,
        &create_submitted_form(),
        None,
        &Payload::new(),
    )
    .unwrap();
    let query: Payload = query_of(&redirect.location);

    let restored: Form = session_forms::get(&mut session, &query, create_test_form());
    assert_eq!(restored.is_valid, Some(false));
    let again: Form = session_forms::get(&mut session, &query, create_test_form());
    assert_eq!(again.is_valid, None);
}

#[test]
fn test_session_typed_values_round_trip() {
    let mut session: SessionData = SessionData::new();
    session.set_as("count", &3_u32).unwrap();
    assert_eq!(session.get_as::<u32>("count").unwrap(), Some(3));
    assert!(session.get_as::<String>("count").is_err());
    assert_eq!(session.get_as::<u32>("missing").unwrap(), None);
    assert_eq!(session.clear("count"), Some(json!(3)));
    assert!(!session.contains("count"));
}

#[test]
fn test_parking_past_limit_evicts_oldest_form() {
    let mut session: SessionData = SessionData::new();
    let keys: Vec<Uuid> = (0..=MAX_PARKED_FORMS)
        .map(|_| session_forms::set(&mut session, &create_submitted_form()).unwrap())
        .collect();
    assert_eq!(session.len(), MAX_PARKED_FORMS);

    let oldest: Form = session_forms::get(&mut session, &key_query(&keys[0]), create_test_form());
    assert_eq!(oldest, create_test_form());
    let second: Form = session_forms::get(&mut session, &key_query(&keys[1]), create_test_form());
    assert_eq!(second, create_submitted_form());
    let newest: Form =
        session_forms::get(&mut session, &key_query(&keys[MAX_PARKED_FORMS]), create_test_form());
    assert_eq!(newest, create_submitted_form());
}

#[test]
fn test_parking_limit_ignores_other_session_values() {
    let mut session: SessionData = SessionData::new();
    session.set("returns.draft", json!({ "status": "due" }));
    for _ in 0..MAX_PARKED_FORMS + 3 {
        session_forms::set(&mut session, &create_submitted_form()).unwrap();
    }
    assert_eq!(session.len(), MAX_PARKED_FORMS + 1);
    assert!(session.contains("returns.draft"));
}
