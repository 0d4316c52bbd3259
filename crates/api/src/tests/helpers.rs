// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use serde_json::Value;
use time::macros::date;
use water_abstraction::{PaperFormDocument, PaperFormReturn};
use water_abstraction_domain::{
    Address, BillingAccount, ChangeReason, Contact, DocumentId, Frequency, LicenceId,
    LicenceNumber, ReturnId, ReturnLine, ReturnModel,
};
use water_abstraction_forms::{FormRequest, Payload};

use crate::{AbstractionPurpose, BackendFixture, LicenceRecord, LocalBackend, PageOutcome};

pub const RETURN_ID: &str = "v1:1:01/123:10012345:2018-01-01:2018-04-30";

/// Line keys of the test return, in line order.
pub const LINE_KEYS: [&str; 4] = [
    "2018-01-01_2018-01-31",
    "2018-02-01_2018-02-28",
    "2018-03-01_2018-03-31",
    "2018-04-01_2018-04-30",
];

pub fn create_test_return() -> ReturnModel {
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

pub fn create_test_contact(name: &str) -> Contact {
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

pub fn create_test_document() -> PaperFormDocument {
    PaperFormDocument::new(
        DocumentId::new("doc-1"),
        LicenceNumber::new("01/123").unwrap(),
        create_test_contact("Jane Licence Holder"),
        Some(create_test_contact("Returns Person")),
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

pub fn create_test_backend() -> LocalBackend {
    LocalBackend::new(BackendFixture {
        returns: vec![create_test_return()],
        licences: vec![LicenceRecord {
            licence_id: LicenceId::new("licence-1"),
            licence_number: LicenceNumber::new("01/123").unwrap(),
            purposes: vec![
                AbstractionPurpose {
                    purpose: String::from("400"),
                    description: String::from("Spray irrigation"),
                    abstraction_period: None,
                    authorised_annual_quantity: Some(120.0),
                },
                AbstractionPurpose {
                    purpose: String::from("420"),
                    description: String::from("Trickle irrigation"),
                    abstraction_period: None,
                    authorised_annual_quantity: None,
                },
            ],
        }],
        documents: vec![create_test_document()],
        change_reasons: vec![
            ChangeReason {
                id: String::from("reason-new"),
                description: String::from("New licence"),
            },
            ChangeReason {
                id: String::from("reason-transfer"),
                description: String::from("Licence transferred"),
            },
        ],
        billing_accounts: vec![BillingAccount {
            id: String::from("account-1"),
            account_number: String::from("A12345678A"),
        }],
    })
}

pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn post_request(value: Value) -> FormRequest {
    FormRequest::post(payload(value))
}

/// Decodes the query string of a redirect location.
pub fn query_of(location: &str) -> Payload {
    let query: &str = location.split_once('?').map_or("", |(_, query)| query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                urlencoding::decode(name).unwrap().into_owned(),
                Value::String(urlencoding::decode(value).unwrap().into_owned()),
            )
        })
        .collect()
}

pub fn redirect_location(outcome: &PageOutcome) -> &str {
    outcome.location().expect("expected a redirect")
}
