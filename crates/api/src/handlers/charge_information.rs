// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Charge information wizard controller.
//!
//! The draft lives in the session under the licence's key and is seeded
//! from the licence's abstraction purposes on first visit.

use serde_json::json;
use time::Date;
use tracing::{debug, info};
use uuid::Uuid;
use water_abstraction::{
    ChargeElementData, ChargeInformationAction, ChargeInformationDraft,
    charge_information_session_key, reduce_charge_information,
};
use water_abstraction_domain::{
    BillingAccount, ChangeReason, ChargeElement, LicenceId, Loss, Season, Source,
    format_iso_date, validate_billing_account_number,
};
use water_abstraction_forms::{
    Choice, Field, FieldOptions, Form, FormRequest, InputType, Mapper, Method, ObjectSchema,
    Payload, Rule, ValidationErrorItem, fields, form_factory, get_values, set_values,
};

use super::{
    Submission, date_value, missing_value, number_value, reject_field, render_page, string_value,
    submit_form,
};
use crate::backend::{LicenceRecord, LocalBackend};
use crate::error::{ApiError, translate_form_error};
use crate::request_response::{PageOutcome, Redirect};
use crate::session::SessionData;

/// Longest note accepted.
const MAX_NOTE_LENGTH: f64 = 500.0;

/// Longest charge element description accepted.
const MAX_DESCRIPTION_LENGTH: f64 = 180.0;

const CHARGE_ELEMENT_TITLE: &str = "Set up the charge element";

/// A charge information wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeStep {
    /// Reason for the new charge version.
    Reason,
    /// Effective date.
    StartDate,
    /// Invoice account.
    BillingAccount,
    /// Note for the reviewer.
    Note,
}

impl ChargeStep {
    const ALL: [Self; 4] = [Self::Reason, Self::StartDate, Self::BillingAccount, Self::Note];

    /// Route segment for the step.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Reason => "reason",
            Self::StartDate => "start-date",
            Self::BillingAccount => "billing-account",
            Self::Note => "note",
        }
    }

    /// Looks up a step by route segment.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.slug() == slug)
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Reason => Some(Self::StartDate),
            Self::StartDate => Some(Self::BillingAccount),
            Self::BillingAccount => Some(Self::Note),
            Self::Note => None,
        }
    }

    const fn previous(self) -> Option<Self> {
        match self {
            Self::Reason => None,
            Self::StartDate => Some(Self::Reason),
            Self::BillingAccount => Some(Self::StartDate),
            Self::Note => Some(Self::BillingAccount),
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Reason => "Select reason for new charge information",
            Self::StartDate => "Set charge start date",
            Self::BillingAccount => "Select an existing billing account",
            Self::Note => "Add a note",
        }
    }
}

/// Path of a charge information page.
#[must_use]
pub fn charge_path(licence_id: &LicenceId, slug: &str) -> String {
    format!(
        "/charge-information/{}/{slug}",
        urlencoding::encode(licence_id.value())
    )
}

fn find_step(slug: &str) -> Result<ChargeStep, ApiError> {
    ChargeStep::from_slug(slug).ok_or_else(|| {
        ApiError::not_found(
            "Step",
            format!("The charge information journey has no step '{slug}'"),
        )
    })
}

/// Builds a draft for a licence, with one charge element per purpose.
#[must_use]
pub fn initial_draft(licence: &LicenceRecord) -> ChargeInformationDraft {
    let draft: ChargeInformationDraft = reduce_charge_information(
        &ChargeInformationDraft::new(licence.licence_id.clone()),
        ChargeInformationAction::SetInitialState {
            licence_id: licence.licence_id.clone(),
            licence_number: licence.licence_number.clone(),
        },
    );
    let charge_elements: Vec<ChargeElement> = licence
        .purposes
        .iter()
        .map(|purpose| purpose.to_charge_element(Uuid::new_v4()))
        .collect();
    reduce_charge_information(
        &draft,
        ChargeInformationAction::SetAbstractionData { charge_elements },
    )
}

/// The session draft for a licence, seeded from the backend on first use.
fn load_draft(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
) -> Result<ChargeInformationDraft, ApiError> {
    let key: String = charge_information_session_key(licence_id);
    if let Some(draft) = session.get_as::<ChargeInformationDraft>(&key)? {
        return Ok(draft);
    }
    let draft: ChargeInformationDraft = initial_draft(backend.get_licence(licence_id)?);
    session.set_as(&key, &draft)?;
    info!(licence_id = %licence_id, elements = draft.charge_elements.len(), "Started charge information draft");
    Ok(draft)
}

/// Renders a charge information page.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown licence or step.
pub fn get_charge_step(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
    slug: &str,
    query: &Payload,
) -> Result<PageOutcome, ApiError> {
    let step: ChargeStep = find_step(slug)?;
    let draft: ChargeInformationDraft = load_draft(session, backend, licence_id)?;
    let form: Form = build_form(step, backend, &charge_path(licence_id, slug))?;
    let form: Form = set_values(&form, &current_values(step, &draft));
    let back_link: Option<String> = step
        .previous()
        .map(|previous| charge_path(licence_id, previous.slug()));

    debug!(licence_id = %licence_id, step = slug, "Rendering charge information page");
    render_page(session, query, form, step.title(), back_link, &draft)
}

/// Handles a charge information page submission.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown licence or step.
pub fn post_charge_step(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
    slug: &str,
    request: &FormRequest,
) -> Result<PageOutcome, ApiError> {
    let step: ChargeStep = find_step(slug)?;
    let draft: ChargeInformationDraft = load_draft(session, backend, licence_id)?;
    let form: Form = build_form(step, backend, &charge_path(licence_id, slug))?;
    let schema: ObjectSchema = build_schema(step, backend);
    let form: Form = match submit_form(session, &form, request, &schema)? {
        Submission::Valid(form) => form,
        Submission::Invalid(redirect) => return Ok(PageOutcome::Redirect(redirect)),
    };
    let values: Payload = get_values(&form);

    let action: ChargeInformationAction = match step {
        ChargeStep::Reason => {
            let id: String = string_value(&values, "reason").ok_or_else(|| missing_value("reason"))?;
            let reason: ChangeReason = backend
                .change_reasons()
                .iter()
                .find(|reason| reason.id == id)
                .cloned()
                .ok_or_else(|| ApiError::not_found("Change reason", format!("No change reason '{id}'")))?;
            ChargeInformationAction::SetChangeReason { reason }
        }
        ChargeStep::StartDate => ChargeInformationAction::SetStartDate {
            date: date_value(&values, "startDate").ok_or_else(|| missing_value("startDate"))?,
        },
        ChargeStep::BillingAccount => {
            let number: String = string_value(&values, "accountNumber")
                .ok_or_else(|| missing_value("accountNumber"))?;
            let Some(account) = backend.find_billing_account(&number) else {
                return reject_field(
                    session,
                    &form,
                    "accountNumber",
                    "No billing account was found with that number",
                    &request.query,
                );
            };
            ChargeInformationAction::SetBillingAccount {
                account: account.clone(),
            }
        }
        ChargeStep::Note => ChargeInformationAction::SetNote {
            note: string_value(&values, "note"),
        },
    };

    let updated: ChargeInformationDraft = reduce_charge_information(&draft, action);
    session.set_as(&charge_information_session_key(licence_id), &updated)?;

    let next: String = step.next().map_or_else(
        || charge_path(licence_id, "check"),
        |next| charge_path(licence_id, next.slug()),
    );
    debug!(licence_id = %licence_id, step = slug, %next, "Charge information step complete");
    Ok(PageOutcome::Redirect(Redirect::see_other(next)))
}

/// The current draft, for the check page.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown licence.
pub fn get_charge_check(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
) -> Result<ChargeInformationDraft, ApiError> {
    load_draft(session, backend, licence_id)
}

/// Discards the draft and returns to the first step.
#[must_use]
pub fn post_charge_cancel(session: &mut SessionData, licence_id: &LicenceId) -> PageOutcome {
    let key: String = charge_information_session_key(licence_id);
    if session.clear(&key).is_some() {
        info!(licence_id = %licence_id, "Discarded charge information draft");
    }
    PageOutcome::Redirect(Redirect::see_other(charge_path(
        licence_id,
        ChargeStep::Reason.slug(),
    )))
}

/// Path of a charge element page.
#[must_use]
pub fn charge_element_path(licence_id: &LicenceId, element_id: Uuid) -> String {
    charge_path(licence_id, &format!("charge-elements/{element_id}"))
}

fn parse_element_id(
    draft: &ChargeInformationDraft,
    element_id: &str,
) -> Result<Uuid, ApiError> {
    Uuid::parse_str(element_id)
        .ok()
        .filter(|id| draft.charge_element(*id).is_some())
        .ok_or_else(|| {
            ApiError::not_found(
                "Charge element",
                format!("The draft has no charge element '{element_id}'"),
            )
        })
}

/// Appends an empty charge element to the draft and opens it.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown licence.
pub fn post_create_charge_element(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
) -> Result<PageOutcome, ApiError> {
    let draft: ChargeInformationDraft = load_draft(session, backend, licence_id)?;
    let id: Uuid = Uuid::new_v4();
    let updated: ChargeInformationDraft =
        reduce_charge_information(&draft, ChargeInformationAction::CreateChargeElement { id });
    session.set_as(&charge_information_session_key(licence_id), &updated)?;

    info!(licence_id = %licence_id, element_id = %id, "Added charge element");
    Ok(PageOutcome::Redirect(Redirect::see_other(
        charge_element_path(licence_id, id),
    )))
}

/// Renders the page for one charge element.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown licence or element.
pub fn get_charge_element(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
    element_id: &str,
    query: &Payload,
) -> Result<PageOutcome, ApiError> {
    let draft: ChargeInformationDraft = load_draft(session, backend, licence_id)?;
    let id: Uuid = parse_element_id(&draft, element_id)?;
    let form: Form = charge_element_form(&charge_element_path(licence_id, id))?;
    let form: Form = match draft.charge_element(id) {
        Some(element) => set_values(&form, &element_values(element)),
        None => form,
    };
    let back_link: Option<String> = Some(charge_path(licence_id, "check"));
    render_page(session, query, form, CHARGE_ELEMENT_TITLE, back_link, &draft)
}

/// Handles a charge element page submission.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown licence or element.
pub fn post_charge_element(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
    element_id: &str,
    request: &FormRequest,
) -> Result<PageOutcome, ApiError> {
    let draft: ChargeInformationDraft = load_draft(session, backend, licence_id)?;
    let id: Uuid = parse_element_id(&draft, element_id)?;
    let form: Form = charge_element_form(&charge_element_path(licence_id, id))?;
    let form: Form = match submit_form(session, &form, request, &charge_element_schema())? {
        Submission::Valid(form) => form,
        Submission::Invalid(redirect) => return Ok(PageOutcome::Redirect(redirect)),
    };
    let values: Payload = get_values(&form);

    let data: ChargeElementData = ChargeElementData {
        description: string_value(&values, "description"),
        authorised_annual_quantity: number_value(&values, "authorisedAnnualQuantity"),
        billable_annual_quantity: number_value(&values, "billableAnnualQuantity"),
        source: wire_value(&values, "source")?,
        season: wire_value(&values, "season")?,
        loss: wire_value(&values, "loss")?,
        ..ChargeElementData::default()
    };
    let updated: ChargeInformationDraft = reduce_charge_information(
        &draft,
        ChargeInformationAction::SetChargeElementData { id, data },
    );
    session.set_as(&charge_information_session_key(licence_id), &updated)?;

    debug!(licence_id = %licence_id, element_id = %id, "Charge element updated");
    Ok(PageOutcome::Redirect(Redirect::see_other(charge_path(
        licence_id, "check",
    ))))
}

/// Removes a charge element from the draft.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` for an unknown licence or element.
pub fn post_remove_charge_element(
    session: &mut SessionData,
    backend: &LocalBackend,
    licence_id: &LicenceId,
    element_id: &str,
) -> Result<PageOutcome, ApiError> {
    let draft: ChargeInformationDraft = load_draft(session, backend, licence_id)?;
    let id: Uuid = parse_element_id(&draft, element_id)?;
    let updated: ChargeInformationDraft =
        reduce_charge_information(&draft, ChargeInformationAction::RemoveChargeElement { id });
    session.set_as(&charge_information_session_key(licence_id), &updated)?;

    info!(licence_id = %licence_id, element_id = %id, "Removed charge element");
    Ok(PageOutcome::Redirect(Redirect::see_other(charge_path(
        licence_id, "check",
    ))))
}

fn wire_value<T: std::str::FromStr<Err = String>>(
    values: &Payload,
    name: &str,
) -> Result<Option<T>, ApiError> {
    string_value(values, name)
        .map(|value| value.parse::<T>())
        .transpose()
        .map_err(|message| ApiError::InvalidInput {
            field: name.to_string(),
            message,
        })
}

fn wire_strings<T>(all: &[T], as_str: impl Fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(as_str).collect()
}

fn wire_choices(values: &[&'static str]) -> Vec<Choice> {
    values
        .iter()
        .map(|value| {
            let mut label: String = (*value).to_string();
            if let Some(first) = label.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            Choice::new(*value, &label)
        })
        .collect()
}

fn charge_element_form(action: &str) -> Result<Form, ApiError> {
    let quantity = |label: &str| {
        FieldOptions::default()
            .label(label)
            .suffix("megalitres per year")
            .mapper(Mapper::Number)
            .input_type(InputType::Number)
            .errors(&["any.required", "number.base"], "Enter an annual quantity")
            .error("number.min", "Enter an annual quantity of 0 or above")
    };
    let radio = |name: &str, label: &str, values: &[&'static str], message: &str| {
        fields::radio(
            name,
            wire_choices(values),
            FieldOptions::default()
                .label(label)
                .errors(&["any.required", "any.only"], message),
        )
    };

    form_factory(action, Method::Post)
        .with_fields([
            fields::text(
                "description",
                FieldOptions::default()
                    .label("Description")
                    .errors(&["any.required", "string.empty"], "Enter a description")
                    .error("string.max", "Enter no more than 180 characters"),
            ),
            fields::text(
                "authorisedAnnualQuantity",
                quantity("Authorised annual quantity"),
            ),
            fields::text(
                "billableAnnualQuantity",
                quantity("Billable annual quantity (optional)").error(
                    "any.custom",
                    "The billable quantity cannot exceed the authorised quantity",
                ),
            ),
            radio(
                "source",
                "Source",
                &wire_strings(Source::ALL, Source::as_str),
                "Select a source",
            ),
            radio(
                "season",
                "Season",
                &wire_strings(Season::ALL, Season::as_str),
                "Select a season",
            ),
            radio(
                "loss",
                "Loss category",
                &wire_strings(Loss::ALL, Loss::as_str),
                "Select a loss category",
            ),
            fields::button("Continue"),
        ])
        .map_err(|e| translate_form_error(&e))
}

fn charge_element_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field(
            "description",
            Rule::string().required().max(MAX_DESCRIPTION_LENGTH),
        )
        .field(
            "authorisedAnnualQuantity",
            Rule::number().required().min(0.0),
        )
        .field(
            "billableAnnualQuantity",
            Rule::number().allow_null().min(0.0),
        )
        .field(
            "source",
            Rule::string()
                .required()
                .valid(wire_strings(Source::ALL, Source::as_str)),
        )
        .field(
            "season",
            Rule::string()
                .required()
                .valid(wire_strings(Season::ALL, Season::as_str)),
        )
        .field(
            "loss",
            Rule::string()
                .required()
                .valid(wire_strings(Loss::ALL, Loss::as_str)),
        )
        .check(billable_exceeds_authorised)
}

fn billable_exceeds_authorised(values: &Payload) -> Vec<ValidationErrorItem> {
    match (
        number_value(values, "authorisedAnnualQuantity"),
        number_value(values, "billableAnnualQuantity"),
    ) {
        (Some(authorised), Some(billable)) if billable > authorised => {
            vec![ValidationErrorItem::custom(
                "billableAnnualQuantity",
                "\"billableAnnualQuantity\" must not exceed \"authorisedAnnualQuantity\"",
            )]
        }
        _ => Vec::new(),
    }
}

fn element_values(element: &ChargeElement) -> Payload {
    let mut values: Payload = Payload::new();
    if let Some(description) = &element.description {
        values.insert(String::from("description"), json!(description));
    }
    for (name, quantity) in [
        ("authorisedAnnualQuantity", element.authorised_annual_quantity),
        ("billableAnnualQuantity", element.billable_annual_quantity),
    ] {
        if let Some(quantity) = quantity {
            let value: serde_json::Value = json!(quantity);
            values.insert(
                name.to_string(),
                Mapper::Number.export(&value).unwrap_or(value),
            );
        }
    }
    if let Some(source) = element.source {
        values.insert(String::from("source"), json!(source.as_str()));
    }
    if let Some(season) = element.season {
        values.insert(String::from("season"), json!(season.as_str()));
    }
    if let Some(loss) = element.loss {
        values.insert(String::from("loss"), json!(loss.as_str()));
    }
    values
}

fn build_form(step: ChargeStep, backend: &LocalBackend, action: &str) -> Result<Form, ApiError> {
    let field: Field = match step {
        ChargeStep::Reason => fields::radio(
            "reason",
            backend
                .change_reasons()
                .iter()
                .map(|reason| Choice::new(reason.id.as_str(), &reason.description))
                .collect(),
            FieldOptions::default()
                .label(step.title())
                .heading()
                .errors(&["any.required", "any.only"], "Select a reason for new charge information"),
        ),
        ChargeStep::StartDate => fields::date(
            "startDate",
            FieldOptions::default()
                .label(step.title())
                .heading()
                .hint("For example, 27 3 2021")
                .errors(&["any.required", "date.base"], "Enter a real date"),
        ),
        ChargeStep::BillingAccount => fields::text(
            "accountNumber",
            FieldOptions::default()
                .label("Billing account number")
                .hint("For example, A12345678A")
                .errors(
                    &["any.required", "string.empty"],
                    "Enter a billing account number",
                )
                .error("any.custom", "Enter a valid billing account number"),
        ),
        ChargeStep::Note => fields::text(
            "note",
            FieldOptions::default()
                .label(step.title())
                .heading()
                .input_type(InputType::Textarea)
                .error("string.max", "Enter no more than 500 characters"),
        ),
    };

    form_factory(action, Method::Post)
        .with_fields([field, fields::button("Continue")])
        .map_err(|e| translate_form_error(&e))
}

fn build_schema(step: ChargeStep, backend: &LocalBackend) -> ObjectSchema {
    match step {
        ChargeStep::Reason => {
            let ids: Vec<String> = backend
                .change_reasons()
                .iter()
                .map(|reason| reason.id.clone())
                .collect();
            ObjectSchema::new().field("reason", Rule::string().required().valid(ids))
        }
        ChargeStep::StartDate => ObjectSchema::new().field("startDate", Rule::date().required()),
        ChargeStep::BillingAccount => ObjectSchema::new()
            .field("accountNumber", Rule::string().required())
            .check(invalid_account_number),
        ChargeStep::Note => ObjectSchema::new().field(
            "note",
            Rule::string().allow_empty().max(MAX_NOTE_LENGTH),
        ),
    }
}

fn invalid_account_number(values: &Payload) -> Vec<ValidationErrorItem> {
    let Some(number) = string_value(values, "accountNumber") else {
        return Vec::new();
    };
    match validate_billing_account_number(&number) {
        Ok(()) => Vec::new(),
        Err(e) => vec![ValidationErrorItem::custom("accountNumber", &e.to_string())],
    }
}

fn current_values(step: ChargeStep, draft: &ChargeInformationDraft) -> Payload {
    let value: Option<serde_json::Value> = match step {
        ChargeStep::Reason => draft
            .change_reason
            .as_ref()
            .map(|reason| json!(reason.id)),
        ChargeStep::StartDate => draft
            .start_date
            .map(|date: Date| json!(format_iso_date(date))),
        ChargeStep::BillingAccount => draft
            .billing_account
            .as_ref()
            .map(|account: &BillingAccount| json!(account.account_number)),
        ChargeStep::Note => draft.note.as_ref().map(|note| json!(note)),
    };
    let name: &str = match step {
        ChargeStep::Reason => "reason",
        ChargeStep::StartDate => "startDate",
        ChargeStep::BillingAccount => "accountNumber",
        ChargeStep::Note => "note",
    };
    value
        .map(|value| (name.to_string(), value))
        .into_iter()
        .collect()
}
