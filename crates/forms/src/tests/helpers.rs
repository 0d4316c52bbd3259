// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::{Value, json};
use water_abstraction_domain::{DomainError, validate_meter_readings};

use crate::{
    Choice, FieldOptions, Form, Mapper, Method, ObjectSchema, Payload, Rule, ValidationErrorItem,
    fields, form_factory,
};

pub const READING_NAMES: [&str; 4] = [
    "2018-01-01_2018-01-31",
    "2018-02-01_2018-02-28",
    "2018-03-01_2018-03-31",
    "2018-04-01_2018-04-30",
];

pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn create_test_name_form() -> Form {
    form_factory("/test/name", Method::Post)
        .with_fields([
            fields::text(
                "name",
                FieldOptions::default()
                    .label("Full name")
                    .error("any.required", "Enter a name")
                    .error("string.empty", "Enter a name"),
            ),
            fields::radio(
                "role",
                vec![
                    Choice::new("licenceHolder", "Licence holder"),
                    Choice::new("returnsTo", "Returns contact"),
                ],
                FieldOptions::default().error("any.only", "Select a recipient"),
            ),
            fields::hidden("csrf_token", "abc"),
            fields::button("Continue"),
        ])
        .unwrap()
}

pub fn create_test_name_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("name", Rule::string().required().max(20.0))
        .field(
            "role",
            Rule::string().required().valid(["licenceHolder", "returnsTo"]),
        )
}

pub fn create_test_meter_readings_form() -> Form {
    let mut form_fields = vec![fields::text(
        "startReading",
        FieldOptions::default()
            .label("Start reading")
            .mapper(Mapper::Number)
            .error("any.required", "Enter a start reading"),
    )];
    for name in READING_NAMES {
        form_fields.push(fields::text(
            name,
            FieldOptions::default()
                .mapper(Mapper::Number)
                .error("number.min", "Reading must not be lower than a previous reading"),
        ));
    }
    form_fields.push(fields::button("Continue"));
    form_factory("/returns/internal/r1/meter-readings", Method::Post)
        .with_fields(form_fields)
        .unwrap()
}

pub fn create_test_meter_readings_schema() -> ObjectSchema {
    let mut schema = ObjectSchema::new().field("startReading", Rule::number().required().min(0.0));
    for name in READING_NAMES {
        schema = schema.field(name, Rule::number().allow_null().min(0.0));
    }
    schema.check(|values: &Payload| {
        let start: f64 = values
            .get("startReading")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let readings: Vec<Option<f64>> = READING_NAMES
            .iter()
            .map(|name| values.get(*name).and_then(Value::as_f64))
            .collect();
        match validate_meter_readings(start, &readings) {
            Ok(()) => Vec::new(),
            Err(DomainError::ReadingDecreased {
                index, previous, ..
            }) => vec![ValidationErrorItem::new(
                READING_NAMES[index],
                "number.min",
                format!("\"{}\" must be greater than or equal to {previous}", READING_NAMES[index]),
                Some(json!(previous)),
            )],
            Err(e) => vec![ValidationErrorItem::custom("startReading", &e.to_string())],
        }
    })
}
