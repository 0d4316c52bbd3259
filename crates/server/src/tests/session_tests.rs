// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use std::time::Duration;
use water_abstraction::JourneyKind;
use water_abstraction_api::SessionData;

use super::helpers::{create_test_app_state, get_request, return_path, send, session_cookie};
use crate::session::{BrowserSession, SESSION_COOKIE, SessionStore, cookie_value};
use crate::{AppState, build_router};

#[test]
fn test_cookie_value_finds_named_cookie() {
    let mut headers: HeaderMap = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_static("theme=dark; wabs_sid=0123456789abcdef0123456789abcdef; lang=en"),
    );
    assert_eq!(
        cookie_value(&headers, SESSION_COOKIE).as_deref(),
        Some("0123456789abcdef0123456789abcdef")
    );
    assert_eq!(cookie_value(&headers, "missing"), None);
}

#[test]
fn test_cookie_value_reads_every_cookie_header() {
    let mut headers: HeaderMap = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
    headers.append(header::COOKIE, HeaderValue::from_static("wabs_sid=abc"));
    assert_eq!(cookie_value(&headers, SESSION_COOKIE).as_deref(), Some("abc"));
}

#[test]
fn test_issued_sessions_are_distinct_and_set_cookie() {
    let first: BrowserSession = BrowserSession::issue();
    let second: BrowserSession = BrowserSession::issue();
    assert_ne!(first.id, second.id);
    assert_eq!(first.id.len(), 32);

    let cookie: HeaderValue = first.cookie().0.expect("new session sets a cookie");
    assert!(cookie.to_str().unwrap().starts_with(&format!("wabs_sid={}", first.id)));

    let existing: BrowserSession = BrowserSession {
        id: first.id,
        is_new: false,
    };
    assert_eq!(existing.cookie().0, None);
}

#[test]
fn test_session_store_keeps_only_sessions_with_data() {
    let mut store: SessionStore = SessionStore::default();
    let read: Option<Value> = store.with_session("abc", |data: &mut SessionData| data.get("key").cloned());
    assert_eq!(read, None);
    assert!(!store.contains("abc"));

    store.with_session("abc", |data: &mut SessionData| data.set("key", json!(1)));
    assert!(store.contains("abc"));
    let read: Option<Value> = store.with_session("abc", |data: &mut SessionData| data.get("key").cloned());
    assert_eq!(read, Some(json!(1)));

    store.with_session("abc", |data: &mut SessionData| data.clear("key"));
    assert!(store.is_empty());
}

#[test]
fn test_session_store_sweeps_idle_sessions() {
    let mut store: SessionStore = SessionStore::new(Duration::ZERO);
    store.with_session("abc", |data: &mut SessionData| data.set("key", json!(1)));
    assert_eq!(store.len(), 1);
    assert_eq!(store.sweep_expired(), 1);
    assert!(!store.contains("abc"));

    let mut store: SessionStore = SessionStore::new(Duration::from_secs(3600));
    store.with_session("abc", |data: &mut SessionData| data.set("key", json!(1)));
    assert_eq!(store.sweep_expired(), 0);
    assert!(store.contains("abc"));
}

#[tokio::test]
async fn test_cookieless_gets_do_not_grow_session_store() {
    let app_state: AppState = create_test_app_state();
    let app: Router = build_router(app_state.clone());
    for _ in 0..5 {
        let response: Response = send(
            &app,
            get_request(&return_path(JourneyKind::Internal, "start"), None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert!(app_state.sessions.lock().await.is_empty());
}

#[tokio::test]
async fn test_malformed_session_cookie_is_replaced() {
    let app: Router = build_router(create_test_app_state());
    let response: Response = send(
        &app,
        get_request("/returns-notifications/paper-forms", Some("wabs_sid=not-a-session")),
    )
    .await;
    let cookie: String = session_cookie(&response);
    assert_ne!(cookie, "wabs_sid=not-a-session");
    assert_eq!(cookie.len(), "wabs_sid=".len() + 32);
}

#[tokio::test]
async fn test_existing_session_cookie_is_kept() {
    let app: Router = build_router(create_test_app_state());
    let response: Response = send(
        &app,
        get_request(
            "/returns-notifications/paper-forms",
            Some("wabs_sid=0123456789abcdef0123456789abcdef"),
        ),
    )
    .await;
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}
