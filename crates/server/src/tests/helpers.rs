// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use serde_json::Value;
use time::macros::date;
use tower::ServiceExt;
use water_abstraction::{JourneyKind, PaperFormDocument, PaperFormReturn};
use water_abstraction_api::{
    AbstractionPurpose, BackendFixture, LicenceRecord, LicenceTitles, LocalBackend,
    handlers::returns::step_path,
};
use water_abstraction_domain::{
    Address, BillingAccount, ChangeReason, Contact, DocumentId, Frequency, LicenceId,
    LicenceNumber, ReturnId, ReturnLine, ReturnModel,
};

use crate::AppState;
use crate::session::SessionStore;

pub const RETURN_ID: &str = "v1:1:01/123:10012345:2018-01-01:2018-04-30";

const LICENCE_TITLES_CSV: &str = "\
code,subcode,display_title
CES,FLOW,Flow cessation condition
AGG,PP,Aggregate condition
";

fn create_test_return() -> ReturnModel {
    let lines: Vec<ReturnLine> = vec![
        ReturnLine::new(date!(2018 - 01 - 01), date!(2018 - 01 - 31), Frequency::Month),
        ReturnLine::new(date!(2018 - 02 - 01), date!(2018 - 02 - 28), Frequency::Month),
        ReturnLine::new(date!(2018 - 03 - 01), date!(2018 - 03 - 31), Frequency::Month),
        ReturnLine::new(date!(2018 - 04 - 01), date!(2018 - 04 - 30), Frequency::Month),
    ];
    ReturnModel::new(
        ReturnId::new(RETURN_ID),
        LicenceNumber::new("01/123").unwrap(),
        date!(2018 - 01 - 01),
        date!(2018 - 04 - 30),
        Frequency::Month,
        lines,
    )
}

fn create_test_contact(name: &str) -> Contact {
    Contact {
        name: name.to_string(),
        address: Address {
            address_line_1: String::from("1 Riverside"),
            address_line_2: None,
            town: String::from("Bristol"),
            county: None,
            postcode: String::from("BS1 5AH"),
        },
    }
}

fn create_test_document() -> PaperFormDocument {
    PaperFormDocument::new(
        DocumentId::new("doc-1"),
        LicenceNumber::new("01/123").unwrap(),
        create_test_contact("Jane Licence Holder"),
        None,
        vec![
            PaperFormReturn {
                return_id: ReturnId::new("return-1"),
                start_date: date!(2018 - 04 - 01),
                end_date: date!(2019 - 03 - 31),
                is_selected: false,
            },
            PaperFormReturn {
                return_id: ReturnId::new("return-2"),
                start_date: date!(2019 - 04 - 01),
                end_date: date!(2020 - 03 - 31),
                is_selected: false,
            },
        ],
    )
}

/// Helper to create test app state with an in-memory backend.
pub fn create_test_app_state() -> AppState {
    let backend: LocalBackend = LocalBackend::new(BackendFixture {
        returns: vec![create_test_return()],
        licences: vec![LicenceRecord {
            licence_id: LicenceId::new("licence-1"),
            licence_number: LicenceNumber::new("01/123").unwrap(),
            purposes: vec![AbstractionPurpose {
                purpose: String::from("400"),
                description: String::from("Spray irrigation"),
                abstraction_period: None,
                authorised_annual_quantity: Some(50.0),
            }],
        }],
        documents: vec![create_test_document()],
        change_reasons: vec![ChangeReason {
            id: String::from("reason-new"),
            description: String::from("New licence"),
        }],
        billing_accounts: vec![BillingAccount {
            id: String::from("account-1"),
            account_number: String::from("A12345678A"),
        }],
    });
    let titles: LicenceTitles = LicenceTitles::from_reader(LICENCE_TITLES_CSV.as_bytes()).unwrap();
    AppState::new(backend, titles, SessionStore::default())
}

pub fn return_path(journey: JourneyKind, slug: &str) -> String {
    step_path(journey, &ReturnId::new(RETURN_ID), slug)
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

/// The `name=value` part of the response's `Set-Cookie` header.
pub fn session_cookie(response: &Response) -> String {
    let header: &str = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("expected a session cookie")
        .to_str()
        .unwrap();
    header.split(';').next().unwrap().to_string()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("expected a redirect")
        .to_str()
        .unwrap()
        .to_string()
}
