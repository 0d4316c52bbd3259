// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::{Value, json};
use water_abstraction::{CoreError, JourneyKind, return_session_key};
use time::macros::date;
use water_abstraction_domain::{DomainError, ReturnId, ReturnModel, ReturnStatus, RoutingAction};
use water_abstraction_forms::{Field, FormRequest, Payload};

use super::helpers::{
    LINE_KEYS, RETURN_ID, create_test_backend, create_test_return, payload, post_request, query_of,
    redirect_location,
};
use crate::handlers::returns::{Page, get_return_step, post_return_step, rejected_answer, step_path};
use crate::{ApiError, LocalBackend, PageOutcome, SessionData, ViewModel};

fn return_id() -> ReturnId {
    ReturnId::new(RETURN_ID)
}

fn path(journey: JourneyKind, slug: &str) -> String {
    step_path(journey, &return_id(), slug)
}

fn post(
    session: &mut SessionData,
    backend: &mut LocalBackend,
    journey: JourneyKind,
    slug: &str,
    body: Value,
) -> PageOutcome {
    post_return_step(session, backend, journey, &return_id(), slug, &post_request(body)).unwrap()
}

fn get(
    session: &mut SessionData,
    backend: &LocalBackend,
    journey: JourneyKind,
    slug: &str,
    query: &Payload,
) -> ViewModel {
    let outcome: PageOutcome =
        get_return_step(session, backend, journey, &return_id(), slug, query).unwrap();
    outcome.view().expect("expected a view").clone()
}

fn session_return(session: &SessionData) -> ReturnModel {
    session
        .get_as::<ReturnModel>(&return_session_key(&return_id()))
        .unwrap()
        .expect("return in session")
}

fn field<'a>(view: &'a ViewModel, name: &str) -> &'a Field {
    view.form.field(name).expect("field exists")
}

#[test]
fn test_step_path_encodes_return_id() {
    assert_eq!(
        path(JourneyKind::Internal, "nil-return"),
        "/returns/internal/v1%3A1%3A01%2F123%3A10012345%3A2018-01-01%3A2018-04-30/nil-return"
    );
}

#[test]
fn test_get_start_page_renders_form() {
    let mut session: SessionData = SessionData::new();
    let backend: LocalBackend = create_test_backend();
    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "start", &Payload::new());
    assert_eq!(view.form.action, path(JourneyKind::Internal, "start"));
    assert_eq!(view.back_link, None);
    assert!(!view.form.is_submitted);
}

#[test]
fn test_get_unknown_step_is_not_found() {
    let mut session: SessionData = SessionData::new();
    let backend: LocalBackend = create_test_backend();
    let result: Result<PageOutcome, ApiError> = get_return_step(
        &mut session,
        &backend,
        JourneyKind::External,
        &return_id(),
        "internal",
        &Payload::new(),
    );
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_get_unknown_return_is_not_found() {
    let mut session: SessionData = SessionData::new();
    let backend: LocalBackend = create_test_backend();
    let result: Result<PageOutcome, ApiError> = get_return_step(
        &mut session,
        &backend,
        JourneyKind::Internal,
        &ReturnId::new("missing"),
        "start",
        &Payload::new(),
    );
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_invalid_post_redirects_back_with_parked_form() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    let outcome: PageOutcome = post(&mut session, &mut backend, JourneyKind::Internal, "internal", json!({}));
    let location: &str = redirect_location(&outcome);
    assert!(location.starts_with(&format!("{}?form=", path(JourneyKind::Internal, "internal"))));

    let query: Payload = query_of(location);
    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "internal", &query);
    assert_eq!(view.form.is_valid, Some(false));
    assert_eq!(field(&view, "action").errors[0].message, "Select what you want to do");
    assert_eq!(view.form.errors.len(), 1);

    let fresh: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "internal", &query);
    assert_eq!(fresh.form.is_valid, None);
    assert!(fresh.form.errors.is_empty());
}

#[test]
fn test_log_receipt_submits_received_return() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();

    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "internal",
        json!({ "action": "log_receipt" }),
    );
    assert_eq!(redirect_location(&outcome), path(JourneyKind::Internal, "log-receipt"));
    assert_eq!(session_return(&session).routing_action, Some(RoutingAction::LogReceipt));

    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "log-receipt",
        json!({
            "receivedDate-day": "5",
            "receivedDate-month": "5",
            "receivedDate-year": "2018",
        }),
    );
    assert_eq!(redirect_location(&outcome), path(JourneyKind::Internal, "submitted"));
    assert!(!session.contains(&return_session_key(&return_id())));

    let stored: &ReturnModel = backend.get_return(&return_id()).unwrap();
    assert_eq!(stored.status, ReturnStatus::Received);
    assert_eq!(
        stored.received_date,
        Some(time::macros::date!(2018 - 05 - 05))
    );
}

#[test]
fn test_received_date_before_return_period_is_rejected() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "date-received",
        json!({
            "receivedDate-day": "31",
            "receivedDate-month": "12",
            "receivedDate-year": "2017",
        }),
    );
    let query: Payload = query_of(redirect_location(&outcome));
    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "date-received", &query);
    let errors = &field(&view, "receivedDate").errors;
    assert_eq!(errors[0].kind, "date.min");
}

#[test]
fn test_nil_return_goes_to_confirm_then_submits() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();

    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "nil-return",
        json!({ "isNil": "true" }),
    );
    assert_eq!(redirect_location(&outcome), path(JourneyKind::Internal, "confirm"));

    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "confirm", &Payload::new());
    assert_eq!(view.back_link, Some(path(JourneyKind::Internal, "nil-return")));
    assert_eq!(view.data["is_nil"], json!(true));

    let outcome: PageOutcome = post(&mut session, &mut backend, JourneyKind::Internal, "confirm", json!({}));
    assert_eq!(redirect_location(&outcome), path(JourneyKind::Internal, "submitted"));
    assert_eq!(
        backend.get_return(&return_id()).unwrap().status,
        ReturnStatus::Completed
    );

    let again: Result<PageOutcome, ApiError> = post_return_step(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        &return_id(),
        "confirm",
        &FormRequest::post(Payload::new()),
    );
    assert!(matches!(again, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_meter_readings_with_gaps_derive_quantities() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();

    post(&mut session, &mut backend, JourneyKind::Internal, "method", json!({ "method": "oneMeter" }));
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "meter-reset",
        json!({ "meterReset": "false" }),
    );
    assert_eq!(redirect_location(&outcome), path(JourneyKind::Internal, "meter-units"));

    let mut body: Payload = payload(json!({ "startReading": "10" }));
    for (key, reading) in LINE_KEYS.iter().zip(["", "", "", "30"]) {
        body.insert((*key).to_string(), json!(reading));
    }
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "meter-readings",
        Value::Object(body),
    );
    assert_eq!(redirect_location(&outcome), path(JourneyKind::Internal, "meter-details"));

    let model: ReturnModel = session_return(&session);
    let quantities: Vec<Option<f64>> = model.lines.iter().map(|line| line.quantity).collect();
    assert_eq!(quantities, vec![None, None, None, Some(20.0)]);
}

#[test]
fn test_decreasing_meter_reading_fails_on_that_field() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();

    let mut body: Payload = payload(json!({ "startReading": "10" }));
    for (key, reading) in LINE_KEYS.iter().zip(["5", "20", "30", "40"]) {
        body.insert((*key).to_string(), json!(reading));
    }
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "meter-readings",
        Value::Object(body),
    );
    let query: Payload = query_of(redirect_location(&outcome));
    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "meter-readings", &query);

    assert_eq!(view.form.errors.len(), 1);
    assert_eq!(view.form.errors[0].name, LINE_KEYS[0]);
    assert_eq!(
        view.form.errors[0].message,
        "Each meter reading must be at least the reading before it"
    );
    assert_eq!(field(&view, LINE_KEYS[0]).value, Some(json!(5)));
}

#[test]
fn test_single_total_spread_over_custom_period() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();

    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "single-total",
        json!({ "isSingleTotal": "true", "total": "1,000" }),
    );
    assert_eq!(
        redirect_location(&outcome),
        path(JourneyKind::Internal, "single-total-dates")
    );

    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "single-total-dates",
        json!({
            "totalCustomDates": "true",
            "totalCustomDateStart-day": "1",
            "totalCustomDateStart-month": "2",
            "totalCustomDateStart-year": "2018",
            "totalCustomDateEnd-day": "31",
            "totalCustomDateEnd-month": "3",
            "totalCustomDateEnd-year": "2018",
        }),
    );
    assert_eq!(redirect_location(&outcome), path(JourneyKind::Internal, "quantities"));

    let model: ReturnModel = session_return(&session);
    let quantities: Vec<Option<f64>> = model.lines.iter().map(|line| line.quantity).collect();
    assert_eq!(quantities, vec![None, Some(500.0), Some(500.0), None]);
}

#[test]
fn test_single_total_requires_total() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "single-total",
        json!({ "isSingleTotal": "true" }),
    );
    let query: Payload = query_of(redirect_location(&outcome));
    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "single-total", &query);
    assert_eq!(field(&view, "total").errors[0].message, "Enter a total figure");
}

#[test]
fn test_custom_dates_require_both_dates() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "single-total-dates",
        json!({
            "totalCustomDates": "true",
            "totalCustomDateStart-day": "1",
            "totalCustomDateStart-month": "2",
            "totalCustomDateStart-year": "2018",
        }),
    );
    let query: Payload = query_of(redirect_location(&outcome));
    let view: ViewModel =
        get(&mut session, &backend, JourneyKind::Internal, "single-total-dates", &query);
    assert!(field(&view, "totalCustomDateStart").errors.is_empty());
    assert_eq!(
        field(&view, "totalCustomDateEnd").errors[0].message,
        "Enter a real date"
    );
}

#[test]
fn test_quantities_page_prefills_and_saves_volumes() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();

    let mut body: Payload = Payload::new();
    for (key, volume) in LINE_KEYS.iter().zip(["1", "", "2.5", "0"]) {
        body.insert((*key).to_string(), json!(volume));
    }
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "quantities",
        Value::Object(body),
    );
    assert_eq!(
        redirect_location(&outcome),
        path(JourneyKind::Internal, "meter-details-provided")
    );

    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "quantities", &Payload::new());
    assert_eq!(field(&view, LINE_KEYS[2]).value, Some(json!(2.5)));
    assert_eq!(field(&view, LINE_KEYS[1]).value, None);
}

#[test]
fn test_back_link_follows_answers() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();

    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "units", &Payload::new());
    assert_eq!(view.back_link, Some(path(JourneyKind::Internal, "method")));

    post(&mut session, &mut backend, JourneyKind::Internal, "method", json!({ "method": "oneMeter" }));
    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "units", &Payload::new());
    assert_eq!(view.back_link, Some(path(JourneyKind::Internal, "meter-reset")));
}

#[test]
fn test_external_meter_used_without_details_goes_to_confirm() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::External,
        "meter-used",
        json!({ "meterDetailsProvided": "false" }),
    );
    assert_eq!(redirect_location(&outcome), path(JourneyKind::External, "confirm"));
}

#[test]
fn test_meter_details_records_multiplier() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    post(
        &mut session,
        &mut backend,
        JourneyKind::External,
        "meter-details",
        json!({ "manufacturer": "Pontoon", "serialNumber": "1234", "isMultiplier": "multiply" }),
    );
    let model: ReturnModel = session_return(&session);
    assert_eq!(model.meter.manufacturer.as_deref(), Some("Pontoon"));
    assert!(model.meter.multiplier);

    let view: ViewModel = get(&mut session, &backend, JourneyKind::External, "meter-details", &Payload::new());
    assert_eq!(field(&view, "isMultiplier").value, Some(json!(["multiply"])));
}

#[test]
fn test_custom_period_without_whole_line_is_parked_on_start_date() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "single-total",
        json!({ "isSingleTotal": "true", "total": "100" }),
    );

    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "single-total-dates",
        json!({
            "totalCustomDates": "true",
            "totalCustomDateStart-day": "5",
            "totalCustomDateStart-month": "2",
            "totalCustomDateStart-year": "2018",
            "totalCustomDateEnd-day": "20",
            "totalCustomDateEnd-month": "2",
            "totalCustomDateEnd-year": "2018",
        }),
    );
    let location: &str = redirect_location(&outcome);
    assert!(location.starts_with(&path(JourneyKind::Internal, "single-total-dates")));

    let view: ViewModel = get(
        &mut session,
        &backend,
        JourneyKind::Internal,
        "single-total-dates",
        &query_of(location),
    );
    assert_eq!(view.form.errors.len(), 1);
    assert_eq!(
        field(&view, "totalCustomDateStart").errors[0].message,
        "Enter a period that covers at least one whole return line"
    );
    let model: ReturnModel = session_return(&session);
    assert!(!model.reading.total_custom_dates);
    assert_eq!(model.reading.total_start_date, None);
}

#[test]
fn test_rejected_single_total_is_parked_with_field_error() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    let mut model: ReturnModel = create_test_return();
    model.reading.total_custom_dates = true;
    model.reading.total_start_date = Some(date!(2018 - 02 - 05));
    model.reading.total_end_date = Some(date!(2018 - 02 - 20));
    session.set_as(&return_session_key(&return_id()), &model).unwrap();

    let request: FormRequest = post_request(json!({ "isSingleTotal": "true", "total": "100" }))
        .with_query(payload(json!({ "returnTo": "confirm" })));
    let outcome: PageOutcome = post_return_step(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        &return_id(),
        "single-total",
        &request,
    )
    .unwrap();
    let query: Payload = query_of(redirect_location(&outcome));
    assert_eq!(query.get("returnTo"), Some(&json!("confirm")));

    let view: ViewModel = get(&mut session, &backend, JourneyKind::Internal, "single-total", &query);
    assert_eq!(view.form.is_valid, Some(false));
    assert_eq!(
        field(&view, "total").errors[0].message,
        "No return lines fall within the abstraction period"
    );
    assert_eq!(field(&view, "total").value, Some(json!(100)));
    assert_eq!(session_return(&session).reading.total, None);
}

#[test]
fn test_rejected_answer_names_the_field_to_blame() {
    let model: ReturnModel = create_test_return();

    assert_eq!(
        rejected_answer(Page::SingleTotalDates, &model, &CoreError::NoLinesInPeriod),
        Some((
            String::from("totalCustomDateStart"),
            String::from("Enter a period that covers at least one whole return line"),
        ))
    );
    assert_eq!(
        rejected_answer(Page::SingleTotalDates, &model, &CoreError::IncompletePeriod)
            .map(|(name, _)| name),
        Some(String::from("totalCustomDateStart"))
    );

    let negative: CoreError = CoreError::DomainViolation(DomainError::NegativeQuantity {
        index: 2,
        value: -1.0,
    });
    assert_eq!(
        rejected_answer(Page::Quantities, &model, &negative).map(|(name, _)| name),
        Some(LINE_KEYS[2].to_string())
    );

    let unknown: CoreError = CoreError::UnknownLine(String::from("2019-01-01_2019-01-31"));
    assert_eq!(rejected_answer(Page::Quantities, &model, &unknown), None);
    assert_eq!(rejected_answer(Page::Method, &model, &CoreError::NoLinesInPeriod), None);
}

#[test]
fn test_posted_quantity_for_unknown_line_is_ignored() {
    let mut session: SessionData = SessionData::new();
    let mut backend: LocalBackend = create_test_backend();
    let mut body: Payload = payload(json!({ "2019-01-01_2019-01-31": "7" }));
    body.insert(LINE_KEYS[0].to_string(), json!("12"));
    let outcome: PageOutcome = post(
        &mut session,
        &mut backend,
        JourneyKind::Internal,
        "quantities",
        Value::Object(body),
    );
    assert!(!redirect_location(&outcome).contains("form="));

    let model: ReturnModel = session_return(&session);
    assert_eq!(model.lines[0].quantity, Some(12.0));
    assert_eq!(model.lines.len(), LINE_KEYS.len());
}
