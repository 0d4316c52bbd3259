// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AbstractionPeriod, DomainError, Frequency, LicenceNumber, Loss, ReturnId, ReturnLine,
    ReturnMethod, ReturnModel, Season, Source, Units,
};
use std::str::FromStr;
use time::macros::date;

fn create_test_return() -> ReturnModel {
    ReturnModel::new(
        ReturnId::new("v1:1:01/123:1:2018-04-01:2018-06-30"),
        LicenceNumber::new("01/123").unwrap(),
        date!(2018 - 04 - 01),
        date!(2018 - 06 - 30),
        Frequency::Month,
        vec![
            ReturnLine::new(date!(2018 - 04 - 01), date!(2018 - 04 - 30), Frequency::Month),
            ReturnLine::new(date!(2018 - 05 - 01), date!(2018 - 05 - 31), Frequency::Month),
            ReturnLine::new(date!(2018 - 06 - 01), date!(2018 - 06 - 30), Frequency::Month),
        ],
    )
}

#[test]
fn test_licence_number_is_normalised() {
    let licence: LicenceNumber = LicenceNumber::new("  01/123/r01 ").unwrap();
    assert_eq!(licence.value(), "01/123/R01");
}

#[test]
fn test_licence_number_rejects_blank() {
    assert_eq!(
        LicenceNumber::new("   "),
        Err(DomainError::EmptyLicenceNumber)
    );
}

#[test]
fn test_units_round_trip_through_wire_format() {
    for units in Units::ALL {
        assert_eq!(Units::from_str(units.as_str()), Ok(units));
    }
    assert!(Units::from_str("furlongs").is_err());
}

#[test]
fn test_units_convert_to_cubic_metres() {
    assert!((Units::Litres.to_cubic_metres(2500.0) - 2.5).abs() < f64::EPSILON);
    assert!((Units::Megalitres.to_cubic_metres(1.5) - 1500.0).abs() < f64::EPSILON);
}

#[test]
fn test_units_serialize_with_symbol() {
    let json = serde_json::to_string(&Units::CubicMetres).unwrap();
    assert_eq!(json, "\"m³\"");
}

#[test]
fn test_return_line_key() {
    let line = ReturnLine::new(date!(2018 - 04 - 01), date!(2018 - 04 - 30), Frequency::Month);
    assert_eq!(line.key(), "2018-04-01_2018-04-30");
}

#[test]
fn test_return_model_total_quantity_ignores_missing_lines() {
    let mut model: ReturnModel = create_test_return();
    assert_eq!(model.total_quantity(), None);

    model.lines[0].quantity = Some(5.0);
    model.lines[2].quantity = Some(7.5);
    assert_eq!(model.total_quantity(), Some(12.5));
}

#[test]
fn test_return_model_uses_meter_readings_only_without_reset() {
    let mut model: ReturnModel = create_test_return();
    model.reading.method = Some(ReturnMethod::OneMeter);
    assert!(model.uses_meter_readings());

    model.reading.meter_reset = Some(true);
    assert!(!model.uses_meter_readings());
}

#[test]
fn test_return_model_serializes_dates_as_iso_strings() {
    let model: ReturnModel = create_test_return();
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["start_date"], "2018-04-01");
    assert_eq!(json["lines"][1]["end_date"], "2018-05-31");

    let restored: ReturnModel = serde_json::from_value(json).unwrap();
    assert_eq!(restored, model);
}

#[test]
fn test_abstraction_period_rejects_impossible_day() {
    assert!(AbstractionPeriod::new(1, 4, 31, 10).is_ok());
    assert_eq!(
        AbstractionPeriod::new(31, 4, 31, 10),
        Err(DomainError::InvalidDayOfYear { day: 31, month: 4 })
    );
}

#[test]
fn test_charge_enums_parse_wire_values() {
    assert_eq!(Season::from_str("allyear"), Ok(Season::AllYear));
    assert_eq!(Loss::from_str("very low"), Ok(Loss::VeryLow));
    assert!(Loss::from_str("extreme").is_err());
}

#[test]
fn test_charge_enum_values_parse_their_own_wire_form() {
    for loss in Loss::ALL {
        assert_eq!(Loss::from_str(loss.as_str()), Ok(*loss));
    }
    assert_eq!(Source::ALL.len(), 4);
    assert_eq!(Season::ALL[2], Season::AllYear);
}
