// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::date;
use water_abstraction_domain::{
    Address, Contact, DocumentId, Frequency, LicenceNumber, ReturnId, ReturnLine, ReturnModel,
};

use crate::{PaperFormDocument, PaperFormReturn};

/// A return for April to July 2018 with monthly lines.
pub fn create_test_return() -> ReturnModel {
    let lines: Vec<ReturnLine> = vec![
        ReturnLine::new(date!(2018 - 04 - 01), date!(2018 - 04 - 30), Frequency::Month),
        ReturnLine::new(date!(2018 - 05 - 01), date!(2018 - 05 - 31), Frequency::Month),
        ReturnLine::new(date!(2018 - 06 - 01), date!(2018 - 06 - 30), Frequency::Month),
        ReturnLine::new(date!(2018 - 07 - 01), date!(2018 - 07 - 31), Frequency::Month),
    ];
    ReturnModel::new(
        ReturnId::new("v1:1:01/123:10012345:2018-04-01:2018-07-31"),
        LicenceNumber::new("01/123").unwrap(),
        date!(2018 - 04 - 01),
        date!(2018 - 07 - 31),
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

pub fn create_test_document(document_id: &str) -> PaperFormDocument {
    PaperFormDocument::new(
        DocumentId::new(document_id),
        LicenceNumber::new("01/123").unwrap(),
        create_test_contact("Licence Holder Ltd"),
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
