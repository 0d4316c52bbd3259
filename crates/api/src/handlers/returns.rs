// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Returns wizard controller.
//!
//! Both journeys share the page definitions; the step flow tables decide
//! which pages a journey visits and in what order. Answers are kept on the
//! return model in the session until the return is submitted.

use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::str::FromStr;
use time::{Date, OffsetDateTime};
use tracing::{debug, info};
use water_abstraction::{
    CoreError, ExternalJourney, ExternalStep, FlowAnswers, InternalJourney, InternalStep,
    Journey, JourneyKind, ReturnCommand, apply_return_command, return_session_key,
};
use water_abstraction_domain::{
    DomainError, ReturnId, ReturnLine, ReturnMethod, ReturnModel, ReturnStatus, RoutingAction,
    Units, format_iso_date, validate_meter_readings,
};
use water_abstraction_forms::{
    Choice, Field, FieldOptions, Form, FormRequest, InputType, Mapper, Method, ObjectSchema,
    Payload, Rule, ValidationErrorItem, fields, form_factory, get_values, set_values,
};

use super::{
    Submission, bool_value, date_value, missing_value, number_value, reject_field, render_page,
    string_list, string_value, submit_form,
};
use crate::backend::LocalBackend;
use crate::error::{ApiError, translate_core_error, translate_form_error};
use crate::request_response::{PageOutcome, Redirect};
use crate::session::SessionData;

const MULTIPLIER_CHOICE: &str = "multiply";

const PERIOD_WITHOUT_LINES: &str = "Enter a period that covers at least one whole return line";

/// A returns wizard page.
///
/// The external "meter used" step asks the same question as the internal
/// "meter details provided" step and shares its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Page {
    Start,
    InternalRouting,
    LogReceipt,
    DateReceived,
    NilReturn,
    Method,
    MeterReset,
    Units,
    SingleTotal,
    SingleTotalDates,
    Quantities,
    MeterDetailsProvided,
    MeterUnits,
    MeterReadings,
    MeterDetails,
    Confirm,
    Submitted,
}

impl From<InternalStep> for Page {
    fn from(step: InternalStep) -> Self {
        match step {
            InternalStep::Start => Self::Start,
            InternalStep::InternalRouting => Self::InternalRouting,
            InternalStep::LogReceipt => Self::LogReceipt,
            InternalStep::DateReceived => Self::DateReceived,
            InternalStep::NilReturn => Self::NilReturn,
            InternalStep::Method => Self::Method,
            InternalStep::MeterReset => Self::MeterReset,
            InternalStep::Units => Self::Units,
            InternalStep::SingleTotal => Self::SingleTotal,
            InternalStep::SingleTotalDates => Self::SingleTotalDates,
            InternalStep::Quantities => Self::Quantities,
            InternalStep::MeterDetailsProvided => Self::MeterDetailsProvided,
            InternalStep::MeterUnits => Self::MeterUnits,
            InternalStep::MeterReadings => Self::MeterReadings,
            InternalStep::MeterDetails => Self::MeterDetails,
            InternalStep::Confirm => Self::Confirm,
            InternalStep::Submitted => Self::Submitted,
        }
    }
}

impl From<ExternalStep> for Page {
    fn from(step: ExternalStep) -> Self {
        match step {
            ExternalStep::Start => Self::Start,
            ExternalStep::NilReturn => Self::NilReturn,
            ExternalStep::Method => Self::Method,
            ExternalStep::MeterReset => Self::MeterReset,
            ExternalStep::Units => Self::Units,
            ExternalStep::Quantities => Self::Quantities,
            ExternalStep::MeterUsed => Self::MeterDetailsProvided,
            ExternalStep::MeterUnits => Self::MeterUnits,
            ExternalStep::MeterReadings => Self::MeterReadings,
            ExternalStep::MeterDetails => Self::MeterDetails,
            ExternalStep::Confirm => Self::Confirm,
            ExternalStep::Submitted => Self::Submitted,
        }
    }
}

impl Page {
    const fn title(self) -> &'static str {
        match self {
            Self::Start => "Abstraction return",
            Self::InternalRouting => "What do you want to do with this return?",
            Self::LogReceipt => "Log receipt of a paper return",
            Self::DateReceived => "When was the return received?",
            Self::NilReturn => "Is this a nil return?",
            Self::Method => "How was this return reported?",
            Self::MeterReset => "Did the meter reset in this abstraction period?",
            Self::Units => "Which units were used?",
            Self::SingleTotal => "Is it a single amount?",
            Self::SingleTotalDates => "What period was used for this volume?",
            Self::Quantities => "Volumes",
            Self::MeterDetailsProvided => "Have meter details been provided?",
            Self::MeterUnits => "Which units does the meter measure in?",
            Self::MeterReadings => "Meter readings",
            Self::MeterDetails => "Meter details",
            Self::Confirm => "Check the details before submitting the return",
            Self::Submitted => "Return submitted",
        }
    }

    /// Posting this page submits the return.
    const fn submits(self) -> bool {
        matches!(self, Self::LogReceipt | Self::Confirm)
    }
}

/// A step and its neighbours for the current answers.
struct Location {
    page: Page,
    next: Option<&'static str>,
    previous: Option<&'static str>,
}

fn locate_in<J>(slug: &str, answers: &FlowAnswers) -> Option<Location>
where
    J: Journey,
    Page: From<J::Step>,
{
    let step: J::Step = J::from_path(slug)?;
    Some(Location {
        page: Page::from(step),
        next: J::next(step, answers).map(J::path),
        previous: J::previous(step, answers).map(J::path),
    })
}

fn locate(journey: JourneyKind, slug: &str, answers: &FlowAnswers) -> Result<Location, ApiError> {
    let location: Option<Location> = match journey {
        JourneyKind::Internal => locate_in::<InternalJourney>(slug, answers),
        JourneyKind::External => locate_in::<ExternalJourney>(slug, answers),
    };
    location.ok_or_else(|| {
        ApiError::not_found(
            "Step",
            format!("The {journey} returns journey has no step '{slug}'"),
        )
    })
}

/// Path of a returns wizard page.
#[must_use]
pub fn step_path(journey: JourneyKind, return_id: &ReturnId, slug: &str) -> String {
    format!(
        "/returns/{journey}/{}/{slug}",
        urlencoding::encode(return_id.value())
    )
}

/// The return as answered so far, or as the backend holds it.
fn load_return(
    session: &SessionData,
    backend: &LocalBackend,
    return_id: &ReturnId,
) -> Result<ReturnModel, ApiError> {
    match session.get_as::<ReturnModel>(&return_session_key(return_id))? {
        Some(model) => Ok(model),
        None => backend.get_return(return_id).cloned(),
    }
}

/// Renders a returns wizard page.
///
/// # Arguments
///
/// * `session` - The caller's session
/// * `backend` - Source of returns not yet in the session
/// * `journey` - Internal or external journey
/// * `return_id` - The return being completed
/// * `slug` - Step route segment
/// * `query` - Decoded query string
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown return or step.
pub fn get_return_step(
    session: &mut SessionData,
    backend: &LocalBackend,
    journey: JourneyKind,
    return_id: &ReturnId,
    slug: &str,
    query: &Payload,
) -> Result<PageOutcome, ApiError> {
    let model: ReturnModel = load_return(session, backend, return_id)?;
    let location: Location = locate(journey, slug, &FlowAnswers::from_return(&model))?;
    let action: String = step_path(journey, return_id, slug);

    let form: Form = build_form(location.page, &model, &action)?;
    let form: Form = set_values(&form, &current_values(location.page, &model));
    let back_link: Option<String> = location
        .previous
        .map(|previous| step_path(journey, return_id, previous));

    debug!(return_id = %return_id, %journey, step = slug, "Rendering returns page");
    render_page(
        session,
        query,
        form,
        location.page.title(),
        back_link,
        &model,
    )
}

/// Handles a returns wizard page submission.
///
/// A valid submission is turned into return commands, applied to the
/// return and the browser is sent to the next step for the updated answers.
///
/// # Arguments
///
/// * `session` - The caller's session
/// * `backend` - Receives submitted returns
/// * `journey` - Internal or external journey
/// * `return_id` - The return being completed
/// * `slug` - Step route segment
/// * `request` - Decoded request body and query string
///
/// # Errors
///
/// Returns an error if:
/// - The return or step does not exist
/// - The return has already been submitted
/// - A command is rejected by the return rules
pub fn post_return_step(
    session: &mut SessionData,
    backend: &mut LocalBackend,
    journey: JourneyKind,
    return_id: &ReturnId,
    slug: &str,
    request: &FormRequest,
) -> Result<PageOutcome, ApiError> {
    let model: ReturnModel = load_return(session, backend, return_id)?;
    let location: Location = locate(journey, slug, &FlowAnswers::from_return(&model))?;
    if location.next.is_none() {
        return Err(ApiError::not_found(
            "Step",
            format!("Step '{slug}' has nothing to submit"),
        ));
    }
    if model.status != ReturnStatus::Due {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("return_already_submitted"),
            message: format!("Return '{return_id}' has already been submitted"),
        });
    }

    let action: String = step_path(journey, return_id, slug);
    let form: Form = build_form(location.page, &model, &action)?;
    let schema: ObjectSchema = build_schema(location.page, &model);
    let form: Form = match submit_form(session, &form, request, &schema)? {
        Submission::Valid(form) => form,
        Submission::Invalid(redirect) => return Ok(PageOutcome::Redirect(redirect)),
    };

    let values: Payload = get_values(&form);
    let mut updated: ReturnModel = model;
    for command in commands(location.page, &values, &updated)? {
        debug!(return_id = %return_id, command = command.name(), "Applying return command");
        updated = match apply_return_command(&updated, command) {
            Ok(next) => next,
            Err(e) => {
                let Some((name, message)) = rejected_answer(location.page, &updated, &e) else {
                    return Err(translate_core_error(e));
                };
                debug!(return_id = %return_id, field = %name, error = %e, "Return rules rejected answer");
                return reject_field(session, &form, &name, &message, &request.query);
            }
        };
    }

    let session_key: String = return_session_key(return_id);
    if location.page.submits() {
        info!(return_id = %return_id, %journey, status = ?updated.status, "Submitting return");
        backend.submit_return(updated.clone());
        session.clear(&session_key);
    } else {
        session.set_as(&session_key, &updated)?;
    }

    let next: &str = locate(journey, slug, &FlowAnswers::from_return(&updated))?
        .next
        .ok_or_else(|| ApiError::Internal {
            message: format!("Step '{slug}' has no next step"),
        })?;
    Ok(PageOutcome::Redirect(Redirect::see_other(step_path(
        journey, return_id, next,
    ))))
}

fn yes_no(name: &str, label: &str, required_message: &str) -> Field {
    fields::radio(
        name,
        vec![Choice::new("true", "Yes"), Choice::new("false", "No")],
        FieldOptions::default()
            .label(label)
            .heading()
            .mapper(Mapper::Boolean)
            .error("any.required", required_message),
    )
}

fn units_field(label: &str) -> Field {
    let choices: Vec<Choice> = Units::ALL
        .iter()
        .map(|units| Choice::new(units.as_str(), units.label()))
        .collect();
    fields::radio(
        "units",
        choices,
        FieldOptions::default()
            .label(label)
            .heading()
            .errors(&["any.required", "any.only"], "Select a unit of measurement"),
    )
}

fn date_field(name: &str, label: &str) -> Field {
    fields::date(
        name,
        FieldOptions::default()
            .label(label)
            .errors(&["any.required", "date.base"], "Enter a real date"),
    )
}

fn line_label(line: &ReturnLine) -> String {
    format!(
        "{} to {}",
        format_iso_date(line.start_date),
        format_iso_date(line.end_date)
    )
}

fn line_fields(model: &ReturnModel, messages: &FieldOptions, suffix: Option<Units>) -> Vec<Field> {
    model
        .lines
        .iter()
        .map(|line| {
            let mut options: FieldOptions = messages
                .clone()
                .label(&line_label(line))
                .mapper(Mapper::Number)
                .input_type(InputType::Number);
            if let Some(units) = suffix {
                options = options.suffix(units.as_str());
            }
            fields::text(&line.key(), options)
        })
        .collect()
}

fn build_form(page: Page, model: &ReturnModel, action: &str) -> Result<Form, ApiError> {
    let mut form_fields: Vec<Field> = match page {
        Page::Start => vec![fields::paragraph(&format!(
            "Return {} for licence {}",
            model.return_id, model.licence_number
        ))],
        Page::InternalRouting => vec![fields::radio(
            "action",
            vec![
                Choice::new(RoutingAction::Submit.as_str(), "Enter and submit the return"),
                Choice::new(RoutingAction::LogReceipt.as_str(), "Log receipt only"),
            ],
            FieldOptions::default()
                .label(page.title())
                .heading()
                .errors(&["any.required", "any.only"], "Select what you want to do"),
        )],
        Page::LogReceipt | Page::DateReceived => vec![fields::date(
            "receivedDate",
            FieldOptions::default()
                .label("Date received")
                .errors(&["any.required", "date.base"], "Enter a real date")
                .error("date.max", "The date received cannot be in the future")
                .error(
                    "date.min",
                    "The date received cannot be before the return period starts",
                ),
        )],
        Page::NilReturn => vec![yes_no(
            "isNil",
            page.title(),
            "Select if this is a nil return",
        )],
        Page::Method => vec![fields::radio(
            "method",
            vec![
                Choice::new(ReturnMethod::OneMeter.as_str(), "Readings from a single meter"),
                Choice::new(
                    ReturnMethod::AbstractionVolumes.as_str(),
                    "Volumes from one or more meters",
                ),
            ],
            FieldOptions::default()
                .label(page.title())
                .heading()
                .errors(&["any.required", "any.only"], "Select how the return was reported"),
        )],
        Page::MeterReset => vec![yes_no(
            "meterReset",
            page.title(),
            "Select if the meter reset",
        )],
        Page::Units | Page::MeterUnits => vec![units_field(page.title())],
        Page::SingleTotal => vec![
            yes_no("isSingleTotal", page.title(), "Select if it is a single amount"),
            fields::text(
                "total",
                FieldOptions::default()
                    .label("Enter the total amount")
                    .mapper(Mapper::Number)
                    .input_type(InputType::Number)
                    .errors(&["any.required", "number.base"], "Enter a total figure")
                    .error("number.min", "Enter a total figure of 0 or above"),
            ),
        ],
        Page::SingleTotalDates => vec![
            fields::radio(
                "totalCustomDates",
                vec![
                    Choice::new(
                        "false",
                        &format!(
                            "Default abstraction period {} to {}",
                            format_iso_date(model.start_date),
                            format_iso_date(model.end_date)
                        ),
                    ),
                    Choice::new("true", "Custom abstraction period"),
                ],
                FieldOptions::default()
                    .label(page.title())
                    .heading()
                    .mapper(Mapper::Boolean)
                    .error("any.required", "Select which period was used"),
            ),
            fields::date(
                "totalCustomDateStart",
                FieldOptions::default()
                    .label("Start date")
                    .errors(&["any.required", "date.base"], "Enter a real date")
                    .error("any.custom", PERIOD_WITHOUT_LINES),
            ),
            date_field("totalCustomDateEnd", "End date"),
        ],
        Page::Quantities => line_fields(
            model,
            &FieldOptions::default()
                .error("number.base", "Enter an amount in numbers")
                .error("number.min", "Enter an amount of 0 or above"),
            model.reading.units,
        ),
        Page::MeterDetailsProvided => vec![yes_no(
            "meterDetailsProvided",
            page.title(),
            "Select if meter details have been provided",
        )],
        Page::MeterReadings => {
            let mut readings: Vec<Field> = vec![fields::text(
                "startReading",
                FieldOptions::default()
                    .label("Start reading")
                    .mapper(Mapper::Number)
                    .input_type(InputType::Number)
                    .errors(&["any.required", "number.base"], "Enter a start reading")
                    .error("number.min", "Enter a start reading of 0 or above"),
            )];
            readings.extend(line_fields(
                model,
                &FieldOptions::default()
                    .error("number.base", "Enter a reading in numbers")
                    .error(
                        "number.min",
                        "Each meter reading must be at least the reading before it",
                    ),
                model.meter.units,
            ));
            readings
        }
        Page::MeterDetails => vec![
            fields::text(
                "manufacturer",
                FieldOptions::default()
                    .label("Make")
                    .errors(&["any.required", "string.empty"], "Enter the make of the meter"),
            ),
            fields::text(
                "serialNumber",
                FieldOptions::default().label("Serial number").errors(
                    &["any.required", "string.empty"],
                    "Enter a serial number",
                ),
            ),
            fields::checkbox(
                "isMultiplier",
                vec![Choice::new(MULTIPLIER_CHOICE, "This meter has a ×10 display")],
                FieldOptions::default(),
            ),
        ],
        Page::Confirm | Page::Submitted => vec![fields::paragraph(page.title())],
    };

    match page {
        Page::Submitted => {}
        Page::LogReceipt | Page::Confirm => form_fields.push(fields::button("Submit")),
        _ => form_fields.push(fields::button("Continue")),
    }

    form_factory(action, Method::Post)
        .with_fields(form_fields)
        .map_err(|e| translate_form_error(&e))
}

fn received_date_rule(model: &ReturnModel) -> Rule {
    let today: Date = OffsetDateTime::now_utc().date();
    let rule: Rule = Rule::date().required().max_date(today);
    if model.start_date <= today {
        rule.min_date(model.start_date)
    } else {
        rule
    }
}

fn units_rule() -> Rule {
    Rule::string()
        .required()
        .valid(Units::ALL.map(|units| units.as_str()))
}

fn build_schema(page: Page, model: &ReturnModel) -> ObjectSchema {
    match page {
        Page::Start | Page::Confirm | Page::Submitted => ObjectSchema::new(),
        Page::InternalRouting => ObjectSchema::new().field(
            "action",
            Rule::string().required().valid([
                RoutingAction::Submit.as_str(),
                RoutingAction::LogReceipt.as_str(),
            ]),
        ),
        Page::LogReceipt | Page::DateReceived => {
            ObjectSchema::new().field("receivedDate", received_date_rule(model))
        }
        Page::NilReturn => ObjectSchema::new().field("isNil", Rule::boolean().required()),
        Page::Method => ObjectSchema::new().field(
            "method",
            Rule::string().required().valid([
                ReturnMethod::OneMeter.as_str(),
                ReturnMethod::AbstractionVolumes.as_str(),
            ]),
        ),
        Page::MeterReset => ObjectSchema::new().field("meterReset", Rule::boolean().required()),
        Page::Units | Page::MeterUnits => ObjectSchema::new().field("units", units_rule()),
        Page::SingleTotal => ObjectSchema::new()
            .field("isSingleTotal", Rule::boolean().required())
            .field("total", Rule::number().allow_null().min(0.0))
            .check(missing_single_total),
        Page::SingleTotalDates => {
            let period: Rule = Rule::date()
                .allow_null()
                .min_date(model.start_date)
                .max_date(model.end_date);
            let lines: Vec<ReturnLine> = model.lines.clone();
            ObjectSchema::new()
                .field("totalCustomDates", Rule::boolean().required())
                .field("totalCustomDateStart", period.clone())
                .field("totalCustomDateEnd", period)
                .check(incomplete_custom_dates)
                .check(move |values: &Payload| period_without_lines(&lines, values))
        }
        Page::Quantities => model
            .line_keys()
            .iter()
            .fold(ObjectSchema::new(), |schema, key| {
                schema.field(key, Rule::number().allow_null().min(0.0))
            }),
        Page::MeterDetailsProvided => {
            ObjectSchema::new().field("meterDetailsProvided", Rule::boolean().required())
        }
        Page::MeterReadings => meter_readings_schema(model.line_keys()),
        Page::MeterDetails => ObjectSchema::new()
            .field("manufacturer", Rule::string().required())
            .field("serialNumber", Rule::string().required())
            .field(
                "isMultiplier",
                Rule::array().items(Rule::string().valid([MULTIPLIER_CHOICE])),
            ),
    }
}

fn missing_single_total(values: &Payload) -> Vec<ValidationErrorItem> {
    if bool_value(values, "isSingleTotal") == Some(true) && number_value(values, "total").is_none()
    {
        vec![ValidationErrorItem::new(
            "total",
            "any.required",
            String::from("\"total\" is required"),
            None,
        )]
    } else {
        Vec::new()
    }
}

fn incomplete_custom_dates(values: &Payload) -> Vec<ValidationErrorItem> {
    if bool_value(values, "totalCustomDates") != Some(true) {
        return Vec::new();
    }
    let start: Option<Date> = date_value(values, "totalCustomDateStart");
    let end: Option<Date> = date_value(values, "totalCustomDateEnd");
    let mut errors: Vec<ValidationErrorItem> = Vec::new();
    for (name, date) in [("totalCustomDateStart", start), ("totalCustomDateEnd", end)] {
        if date.is_none() {
            errors.push(ValidationErrorItem::new(
                name,
                "any.required",
                format!("\"{name}\" is required"),
                None,
            ));
        }
    }
    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        errors.push(ValidationErrorItem::new(
            "totalCustomDateEnd",
            "date.min",
            String::from("\"totalCustomDateEnd\" must be on or after the start date"),
            Some(json!(format_iso_date(start))),
        ));
    }
    errors
}

/// A custom period must contain at least one whole line for the single
/// total to be spread over.
fn period_without_lines(lines: &[ReturnLine], values: &Payload) -> Vec<ValidationErrorItem> {
    if bool_value(values, "totalCustomDates") != Some(true) {
        return Vec::new();
    }
    let (Some(start), Some(end)) = (
        date_value(values, "totalCustomDateStart"),
        date_value(values, "totalCustomDateEnd"),
    ) else {
        return Vec::new();
    };
    if end < start || lines.iter().any(|line| line.is_within(start, end)) {
        return Vec::new();
    }
    vec![ValidationErrorItem::custom(
        "totalCustomDateStart",
        "\"totalCustomDateStart\" must begin a period containing a whole return line",
    )]
}

/// The field to blame when a return command rejects a valid submission,
/// with the message to show on it.
pub(crate) fn rejected_answer(
    page: Page,
    model: &ReturnModel,
    error: &CoreError,
) -> Option<(String, String)> {
    let line_key = |index: usize| model.line_keys().into_iter().nth(index);
    match (page, error) {
        (Page::SingleTotalDates, CoreError::NoLinesInPeriod) => Some((
            String::from("totalCustomDateStart"),
            PERIOD_WITHOUT_LINES.to_string(),
        )),
        (Page::SingleTotalDates, CoreError::IncompletePeriod) => Some((
            String::from("totalCustomDateStart"),
            String::from("Enter a start and end date for the custom period"),
        )),
        (
            Page::SingleTotalDates,
            CoreError::DomainViolation(
                domain @ (DomainError::DateOutOfRange { .. } | DomainError::InvalidPeriod { .. }),
            ),
        ) => Some((String::from("totalCustomDateStart"), domain.to_string())),
        (Page::SingleTotal, CoreError::NoLinesInPeriod) => Some((
            String::from("total"),
            String::from("No return lines fall within the abstraction period"),
        )),
        (
            Page::LogReceipt | Page::DateReceived,
            CoreError::DomainViolation(domain @ DomainError::DateOutOfRange { .. }),
        ) => Some((String::from("receivedDate"), domain.to_string())),
        (
            Page::Quantities | Page::MeterReadings,
            CoreError::DomainViolation(
                domain @ (DomainError::NegativeQuantity { index, .. }
                | DomainError::ReadingDecreased { index, .. }),
            ),
        ) => line_key(*index).map(|key| (key, domain.to_string())),
        _ => None,
    }
}

/// Readings schema: each line may be blank, but a present reading must not
/// be lower than the start reading or any earlier reading.
fn meter_readings_schema(keys: Vec<String>) -> ObjectSchema {
    let schema: ObjectSchema = keys.iter().fold(
        ObjectSchema::new().field("startReading", Rule::number().required().min(0.0)),
        |schema, key| schema.field(key, Rule::number().allow_null().min(0.0)),
    );
    schema.check(move |values: &Payload| decreasing_reading(&keys, values))
}

fn decreasing_reading(keys: &[String], values: &Payload) -> Vec<ValidationErrorItem> {
    let start: f64 = number_value(values, "startReading").unwrap_or(0.0);
    let readings: Vec<Option<f64>> = keys.iter().map(|key| number_value(values, key)).collect();
    match validate_meter_readings(start, &readings) {
        Ok(()) => Vec::new(),
        Err(DomainError::ReadingDecreased {
            index, previous, ..
        }) => keys
            .get(index)
            .map(|key| {
                ValidationErrorItem::new(
                    key,
                    "number.min",
                    format!("\"{key}\" must be greater than or equal to {previous}"),
                    Some(json!(previous)),
                )
            })
            .into_iter()
            .collect(),
        Err(e) => vec![ValidationErrorItem::custom("startReading", &e.to_string())],
    }
}

fn parse_choice<T: FromStr<Err = String>>(values: &Payload, name: &str) -> Result<T, ApiError> {
    let raw: String = string_value(values, name).ok_or_else(|| missing_value(name))?;
    raw.parse::<T>().map_err(|message| ApiError::InvalidInput {
        field: name.to_string(),
        message,
    })
}

fn required_bool(values: &Payload, name: &str) -> Result<bool, ApiError> {
    bool_value(values, name).ok_or_else(|| missing_value(name))
}

fn required_date(values: &Payload, name: &str) -> Result<Date, ApiError> {
    date_value(values, name).ok_or_else(|| missing_value(name))
}

fn line_values(model: &ReturnModel, values: &Payload) -> BTreeMap<String, Option<f64>> {
    model
        .line_keys()
        .into_iter()
        .map(|key| {
            let value: Option<f64> = number_value(values, &key);
            (key, value)
        })
        .collect()
}

/// Commands for a valid page submission.
fn commands(
    page: Page,
    values: &Payload,
    model: &ReturnModel,
) -> Result<Vec<ReturnCommand>, ApiError> {
    let commands: Vec<ReturnCommand> = match page {
        Page::Start | Page::Submitted => Vec::new(),
        Page::InternalRouting => vec![ReturnCommand::SetRoutingAction {
            action: parse_choice(values, "action")?,
        }],
        Page::LogReceipt => vec![
            ReturnCommand::SetReceivedDate {
                date: required_date(values, "receivedDate")?,
            },
            ReturnCommand::Submit,
        ],
        Page::DateReceived => vec![ReturnCommand::SetReceivedDate {
            date: required_date(values, "receivedDate")?,
        }],
        Page::NilReturn => vec![ReturnCommand::SetNilReturn {
            is_nil: required_bool(values, "isNil")?,
        }],
        Page::Method => vec![ReturnCommand::SetMethod {
            method: parse_choice(values, "method")?,
        }],
        Page::MeterReset => vec![ReturnCommand::SetMeterReset {
            meter_reset: required_bool(values, "meterReset")?,
        }],
        Page::Units => vec![ReturnCommand::SetUnits {
            units: parse_choice(values, "units")?,
        }],
        Page::SingleTotal => {
            let is_single_total: bool = required_bool(values, "isSingleTotal")?;
            vec![ReturnCommand::SetSingleTotal {
                is_single_total,
                total: number_value(values, "total").filter(|_| is_single_total),
            }]
        }
        Page::SingleTotalDates => vec![ReturnCommand::SetSingleTotalDates {
            custom: required_bool(values, "totalCustomDates")?,
            start_date: date_value(values, "totalCustomDateStart"),
            end_date: date_value(values, "totalCustomDateEnd"),
        }],
        Page::Quantities => vec![ReturnCommand::SetQuantities {
            quantities: line_values(model, values),
        }],
        Page::MeterDetailsProvided => vec![ReturnCommand::SetMeterDetailsProvided {
            provided: required_bool(values, "meterDetailsProvided")?,
        }],
        Page::MeterUnits => vec![ReturnCommand::SetMeterUnits {
            units: parse_choice(values, "units")?,
        }],
        Page::MeterReadings => vec![ReturnCommand::SetMeterReadings {
            start_reading: number_value(values, "startReading")
                .ok_or_else(|| missing_value("startReading"))?,
            readings: line_values(model, values),
        }],
        Page::MeterDetails => vec![ReturnCommand::SetMeterDetails {
            manufacturer: string_value(values, "manufacturer")
                .ok_or_else(|| missing_value("manufacturer"))?,
            serial_number: string_value(values, "serialNumber")
                .ok_or_else(|| missing_value("serialNumber"))?,
            multiplier: string_list(values, "isMultiplier")
                .iter()
                .any(|choice| choice == MULTIPLIER_CHOICE),
        }],
        Page::Confirm => vec![ReturnCommand::Submit],
    };
    Ok(commands)
}

/// A stored number as the number mapper renders it.
fn number_json(n: f64) -> Value {
    let value: Value = json!(n);
    Mapper::Number.export(&value).unwrap_or(value)
}

fn insert(values: &mut Payload, name: &str, value: Option<Value>) {
    if let Some(value) = value {
        values.insert(name.to_string(), value);
    }
}

/// Answers already given, to pre-fill a page.
fn current_values(page: Page, model: &ReturnModel) -> Payload {
    let mut values: Payload = Payload::new();
    match page {
        Page::Start | Page::Confirm | Page::Submitted => {}
        Page::InternalRouting => insert(
            &mut values,
            "action",
            model.routing_action.map(|a| json!(a.as_str())),
        ),
        Page::LogReceipt | Page::DateReceived => insert(
            &mut values,
            "receivedDate",
            model.received_date.map(|d| json!(format_iso_date(d))),
        ),
        Page::NilReturn => insert(&mut values, "isNil", model.is_nil.map(Value::Bool)),
        Page::Method => insert(
            &mut values,
            "method",
            model.reading.method.map(|m| json!(m.as_str())),
        ),
        Page::MeterReset => insert(
            &mut values,
            "meterReset",
            model.reading.meter_reset.map(Value::Bool),
        ),
        Page::Units => insert(
            &mut values,
            "units",
            model.reading.units.map(|u| json!(u.as_str())),
        ),
        Page::MeterUnits => insert(
            &mut values,
            "units",
            model.meter.units.map(|u| json!(u.as_str())),
        ),
        Page::SingleTotal => {
            insert(
                &mut values,
                "isSingleTotal",
                model.reading.is_single_total.map(Value::Bool),
            );
            insert(&mut values, "total", model.reading.total.map(number_json));
        }
        Page::SingleTotalDates => {
            if model.reading.is_single_total == Some(true) {
                insert(
                    &mut values,
                    "totalCustomDates",
                    Some(Value::Bool(model.reading.total_custom_dates)),
                );
            }
            insert(
                &mut values,
                "totalCustomDateStart",
                model.reading.total_start_date.map(|d| json!(format_iso_date(d))),
            );
            insert(
                &mut values,
                "totalCustomDateEnd",
                model.reading.total_end_date.map(|d| json!(format_iso_date(d))),
            );
        }
        Page::Quantities => {
            for line in &model.lines {
                insert(&mut values, &line.key(), line.quantity.map(number_json));
            }
        }
        Page::MeterDetailsProvided => insert(
            &mut values,
            "meterDetailsProvided",
            model.meter_details_provided.map(Value::Bool),
        ),
        Page::MeterReadings => {
            insert(
                &mut values,
                "startReading",
                model.meter.start_reading.map(number_json),
            );
            for (key, reading) in &model.meter.readings {
                insert(&mut values, key, reading.map(number_json));
            }
        }
        Page::MeterDetails => {
            insert(
                &mut values,
                "manufacturer",
                model.meter.manufacturer.clone().map(Value::String),
            );
            insert(
                &mut values,
                "serialNumber",
                model.meter.serial_number.clone().map(Value::String),
            );
            let multiplier: Vec<&str> = if model.meter.multiplier {
                vec![MULTIPLIER_CHOICE]
            } else {
                Vec::new()
            };
            insert(&mut values, "isMultiplier", Some(json!(multiplier)));
        }
    }
    values
}
