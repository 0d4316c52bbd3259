// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Paper return forms wizard controller.
//!
//! Staff enter licence numbers, then per licence holder document pick the
//! returns to send and who receives them.

use serde_json::{Value, json};
use tracing::{debug, info};
use water_abstraction::{
    PAPER_FORMS_SESSION_KEY, PaperFormDocument, PaperFormsAction, PaperFormsState,
    reduce_paper_forms,
};
use water_abstraction_domain::{
    Address, DocumentId, LicenceNumber, RecipientRole, ReturnId, format_iso_date,
};
use water_abstraction_forms::{
    Choice, Field, FieldOptions, Form, FormRequest, InputType, Mapper, Method, ObjectSchema,
    Payload, Rule, ValidationErrorItem, fields, form_factory, get_values, set_values,
};

use super::{
    Submission, missing_value, reject_field, render_page, string_list, string_value, submit_form,
};
use crate::backend::LocalBackend;
use crate::error::{ApiError, translate_domain_error, translate_form_error};
use crate::request_response::{PageOutcome, Redirect};
use crate::session::SessionData;

const BASE_PATH: &str = "/returns-notifications/paper-forms";

/// Address inputs of the one-time recipient, with the message shown when a
/// required one is left blank.
const ADDRESS_FIELDS: [(&str, &str, Option<&str>); 5] = [
    ("addressLine1", "Address line 1", Some("Enter the first line of the address")),
    ("addressLine2", "Address line 2 (optional)", None),
    ("town", "Town or city", Some("Enter a town or city")),
    ("county", "County (optional)", None),
    ("postcode", "Postcode", Some("Enter a postcode")),
];

/// Path of the check page.
#[must_use]
pub fn check_path() -> String {
    format!("{BASE_PATH}/check")
}

/// Path of a per-document page.
#[must_use]
pub fn document_path(document_id: &DocumentId, page: &str) -> String {
    format!(
        "{BASE_PATH}/{}/{page}",
        urlencoding::encode(document_id.value())
    )
}

fn load_state(session: &SessionData) -> Result<PaperFormsState, ApiError> {
    Ok(session
        .get_as::<PaperFormsState>(PAPER_FORMS_SESSION_KEY)?
        .unwrap_or_default())
}

fn apply(
    session: &mut SessionData,
    state: &PaperFormsState,
    actions: Vec<PaperFormsAction>,
) -> Result<(), ApiError> {
    let updated: PaperFormsState = actions.into_iter().fold(state.clone(), |state, action| {
        reduce_paper_forms(&state, action)
    });
    session.set_as(PAPER_FORMS_SESSION_KEY, &updated)
}

fn find_document<'a>(
    state: &'a PaperFormsState,
    document_id: &DocumentId,
) -> Result<&'a PaperFormDocument, ApiError> {
    state.get(document_id).ok_or_else(|| {
        ApiError::not_found(
            "Document",
            format!("Document '{document_id}' is not part of this paper forms request"),
        )
    })
}

fn licence_numbers_form() -> Result<Form, ApiError> {
    form_factory(BASE_PATH, Method::Post)
        .with_fields([
            fields::text(
                "licenceNumbers",
                FieldOptions::default()
                    .label("Enter one or more licence numbers")
                    .heading()
                    .hint("Separate licence numbers with a comma or new line")
                    .mapper(Mapper::CsvList)
                    .input_type(InputType::Textarea)
                    .errors(&["any.required", "array.min"], "Enter a licence number"),
            ),
            fields::button("Continue"),
        ])
        .map_err(|e| translate_form_error(&e))
}

/// Renders the licence numbers page.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the page cannot be built.
pub fn get_paper_forms(session: &mut SessionData, query: &Payload) -> Result<PageOutcome, ApiError> {
    render_page(
        session,
        query,
        licence_numbers_form()?,
        "Send paper return forms",
        None,
        &Value::Null,
    )
}

/// Looks up the documents for the entered licence numbers and starts a new
/// paper forms request.
///
/// Every licence must have a document with due returns; otherwise the form
/// is shown again naming the licences without one.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the form or session state cannot be encoded.
pub fn post_paper_forms(
    session: &mut SessionData,
    backend: &LocalBackend,
    request: &FormRequest,
) -> Result<PageOutcome, ApiError> {
    let form: Form = licence_numbers_form()?;
    let schema: ObjectSchema = ObjectSchema::new().field(
        "licenceNumbers",
        Rule::array().required().min(1.0).items(Rule::string()),
    );
    let form: Form = match submit_form(session, &form, request, &schema)? {
        Submission::Valid(form) => form,
        Submission::Invalid(redirect) => return Ok(PageOutcome::Redirect(redirect)),
    };

    let licence_numbers: Vec<LicenceNumber> = string_list(&get_values(&form), "licenceNumbers")
        .iter()
        .map(|number| LicenceNumber::new(number))
        .collect::<Result<_, _>>()
        .map_err(translate_domain_error)?;

    let documents: Vec<PaperFormDocument> = backend.documents_with_due_returns(&licence_numbers);
    let missing: Vec<&str> = licence_numbers
        .iter()
        .filter(|number| !documents.iter().any(|doc| doc.licence_number == **number))
        .map(LicenceNumber::value)
        .collect();
    if !missing.is_empty() {
        debug!(missing = ?missing, "Licences without due returns");
        return reject_field(
            session,
            &form,
            "licenceNumbers",
            &format!("No returns are due for {}", missing.join(", ")),
            &request.query,
        );
    }

    info!(documents = documents.len(), "Started paper forms request");
    apply(
        session,
        &PaperFormsState::new(),
        vec![PaperFormsAction::SetInitialState { documents }],
    )?;
    Ok(PageOutcome::Redirect(Redirect::see_other(check_path())))
}

/// The current paper forms request.
///
/// # Errors
///
/// Returns `ApiError::Internal` if the session state does not decode.
pub fn get_paper_forms_check(session: &SessionData) -> Result<PaperFormsState, ApiError> {
    load_state(session)
}

fn select_returns_form(document: &PaperFormDocument) -> Result<Form, ApiError> {
    let choices: Vec<Choice> = document
        .returns
        .iter()
        .map(|ret| {
            Choice::new(
                ret.return_id.value(),
                &format!(
                    "{} to {}",
                    format_iso_date(ret.start_date),
                    format_iso_date(ret.end_date)
                ),
            )
        })
        .collect();
    form_factory(
        &document_path(&document.document_id, "select-returns"),
        Method::Post,
    )
    .with_fields([
        fields::checkbox(
            "returnIds",
            choices,
            FieldOptions::default()
                .label(&format!("Which returns need a form for {}?", document.licence_number))
                .heading()
                .errors(&["array.min", "any.only"], "Select at least one return"),
        ),
        fields::button("Continue"),
    ])
    .map_err(|e| translate_form_error(&e))
}

/// Renders the return selection page for a document.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the document is not in the request.
pub fn get_select_returns(
    session: &mut SessionData,
    document_id: &DocumentId,
    query: &Payload,
) -> Result<PageOutcome, ApiError> {
    let state: PaperFormsState = load_state(session)?;
    let document: &PaperFormDocument = find_document(&state, document_id)?;
    let selected: Vec<&str> = document
        .selected_returns()
        .map(|ret| ret.return_id.value())
        .collect();
    let mut values: Payload = Payload::new();
    values.insert(String::from("returnIds"), json!(selected));
    let form: Form = set_values(&select_returns_form(document)?, &values);
    render_page(
        session,
        query,
        form,
        "Select returns",
        Some(check_path()),
        document,
    )
}

/// Selects the returns to send for a document.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the document is not in the request.
pub fn post_select_returns(
    session: &mut SessionData,
    document_id: &DocumentId,
    request: &FormRequest,
) -> Result<PageOutcome, ApiError> {
    let state: PaperFormsState = load_state(session)?;
    let document: &PaperFormDocument = find_document(&state, document_id)?;
    let form: Form = select_returns_form(document)?;
    let ids: Vec<String> = document
        .returns
        .iter()
        .map(|ret| ret.return_id.value().to_string())
        .collect();
    let schema: ObjectSchema = ObjectSchema::new().field(
        "returnIds",
        Rule::array()
            .required()
            .min(1.0)
            .items(Rule::string().valid(ids)),
    );
    let form: Form = match submit_form(session, &form, request, &schema)? {
        Submission::Valid(form) => form,
        Submission::Invalid(redirect) => return Ok(PageOutcome::Redirect(redirect)),
    };

    let return_ids: Vec<ReturnId> = string_list(&get_values(&form), "returnIds")
        .iter()
        .map(|id| ReturnId::new(id))
        .collect();
    debug!(document_id = %document_id, selected = return_ids.len(), "Selected returns");
    apply(
        session,
        &state,
        vec![PaperFormsAction::SetReturnsSelected {
            document_id: document_id.clone(),
            return_ids,
        }],
    )?;
    Ok(PageOutcome::Redirect(Redirect::see_other(check_path())))
}

fn recipient_form(document: &PaperFormDocument) -> Result<Form, ApiError> {
    let mut choices: Vec<Choice> = vec![Choice::new(
        RecipientRole::LicenceHolder.as_str(),
        &format!("Licence holder: {}", document.licence_holder.name),
    )];
    if let Some(returns_to) = &document.returns_to {
        choices.push(Choice::new(
            RecipientRole::ReturnsTo.as_str(),
            &format!("Returns contact: {}", returns_to.name),
        ));
    }
    choices.push(Choice::new(
        RecipientRole::OneTimeAddress.as_str(),
        "Someone else",
    ));

    let mut form_fields: Vec<Field> = vec![
        fields::radio(
            "selectedRole",
            choices,
            FieldOptions::default()
                .label("Who should receive the forms?")
                .heading()
                .errors(&["any.required", "any.only"], "Select who should receive the forms"),
        ),
        fields::text(
            "fullName",
            FieldOptions::default()
                .label("Full name")
                .error("any.required", "Enter a full name"),
        ),
    ];
    for (name, label, required_message) in ADDRESS_FIELDS {
        let mut options: FieldOptions = FieldOptions::default().label(label);
        if let Some(message) = required_message {
            options = options.error("any.required", message);
        }
        form_fields.push(fields::text(name, options));
    }
    form_fields.push(fields::button("Continue"));

    form_factory(&document_path(&document.document_id, "recipient"), Method::Post)
        .with_fields(form_fields)
        .map_err(|e| translate_form_error(&e))
}

fn recipient_values(document: &PaperFormDocument) -> Payload {
    let mut values: Payload = Payload::new();
    values.insert(
        String::from("selectedRole"),
        json!(document.selected_role.as_str()),
    );
    let Some(one_time) = &document.one_time_address else {
        return values;
    };
    values.insert(String::from("fullName"), json!(one_time.full_name));
    if let Some(address) = &one_time.address {
        values.insert(String::from("addressLine1"), json!(address.address_line_1));
        values.insert(String::from("addressLine2"), json!(address.address_line_2));
        values.insert(String::from("town"), json!(address.town));
        values.insert(String::from("county"), json!(address.county));
        values.insert(String::from("postcode"), json!(address.postcode));
    }
    values
}

/// Renders the recipient page for a document.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the document is not in the request.
pub fn get_recipient(
    session: &mut SessionData,
    document_id: &DocumentId,
    query: &Payload,
) -> Result<PageOutcome, ApiError> {
    let state: PaperFormsState = load_state(session)?;
    let document: &PaperFormDocument = find_document(&state, document_id)?;
    let form: Form = set_values(&recipient_form(document)?, &recipient_values(document));
    render_page(
        session,
        query,
        form,
        "Who should receive the forms?",
        Some(check_path()),
        document,
    )
}

fn incomplete_one_time_address(values: &Payload) -> Vec<ValidationErrorItem> {
    if string_value(values, "selectedRole").as_deref() != Some(RecipientRole::OneTimeAddress.as_str())
    {
        return Vec::new();
    }
    let required = std::iter::once("fullName").chain(
        ADDRESS_FIELDS
            .iter()
            .filter(|(_, _, message)| message.is_some())
            .map(|(name, _, _)| *name),
    );
    required
        .filter(|name| string_value(values, name).is_none())
        .map(|name| {
            ValidationErrorItem::new(name, "any.required", format!("\"{name}\" is required"), None)
        })
        .collect()
}

/// Chooses who receives the forms for a document.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the document is not in the request.
pub fn post_recipient(
    session: &mut SessionData,
    document_id: &DocumentId,
    request: &FormRequest,
) -> Result<PageOutcome, ApiError> {
    let state: PaperFormsState = load_state(session)?;
    let document: &PaperFormDocument = find_document(&state, document_id)?;
    let form: Form = recipient_form(document)?;

    let mut roles: Vec<&str> = vec![
        RecipientRole::LicenceHolder.as_str(),
        RecipientRole::OneTimeAddress.as_str(),
    ];
    if document.returns_to.is_some() {
        roles.push(RecipientRole::ReturnsTo.as_str());
    }
    let schema: ObjectSchema = ADDRESS_FIELDS
        .iter()
        .fold(
            ObjectSchema::new()
                .field("selectedRole", Rule::string().required().valid(roles))
                .field("fullName", Rule::string().allow_empty()),
            |schema, (name, _, _)| schema.field(name, Rule::string().allow_empty().allow_null()),
        )
        .check(incomplete_one_time_address);
    let form: Form = match submit_form(session, &form, request, &schema)? {
        Submission::Valid(form) => form,
        Submission::Invalid(redirect) => return Ok(PageOutcome::Redirect(redirect)),
    };

    let values: Payload = get_values(&form);
    let role: RecipientRole = string_value(&values, "selectedRole")
        .ok_or_else(|| missing_value("selectedRole"))?
        .parse()
        .map_err(|message| ApiError::InvalidInput {
            field: String::from("selectedRole"),
            message,
        })?;

    let mut actions: Vec<PaperFormsAction> = vec![PaperFormsAction::SetSelectedRole {
        document_id: document_id.clone(),
        role,
    }];
    if role == RecipientRole::OneTimeAddress {
        let required = |name: &str| string_value(&values, name).ok_or_else(|| missing_value(name));
        actions.push(PaperFormsAction::SetOneTimeAddressName {
            document_id: document_id.clone(),
            full_name: required("fullName")?,
        });
        actions.push(PaperFormsAction::SetOneTimeAddress {
            document_id: document_id.clone(),
            address: Address {
                address_line_1: required("addressLine1")?,
                address_line_2: string_value(&values, "addressLine2"),
                town: required("town")?,
                county: string_value(&values, "county"),
                postcode: required("postcode")?,
            },
        });
    }

    debug!(document_id = %document_id, role = role.as_str(), "Chose paper forms recipient");
    apply(session, &state, actions)?;
    Ok(PageOutcome::Redirect(Redirect::see_other(check_path())))
}
