// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use water_abstraction::CoreError;
use water_abstraction_domain::DomainError;
use water_abstraction_forms::{FormError, SchemaError};

use crate::{
    ApiError, translate_core_error, translate_domain_error, translate_form_error,
    translate_schema_error,
};

#[test]
fn test_reading_decrease_is_rule_violation() {
    let err: ApiError = translate_domain_error(DomainError::ReadingDecreased {
        index: 2,
        reading: 5.0,
        previous: 10.0,
    });
    assert!(matches!(
        err,
        ApiError::DomainRuleViolation { ref rule, .. } if rule == "readings_never_decrease"
    ));
}

#[test]
fn test_invalid_account_number_is_invalid_input() {
    let err: ApiError =
        translate_domain_error(DomainError::InvalidBillingAccountNumber(String::from("X1")));
    assert!(matches!(
        err,
        ApiError::InvalidInput { ref field, .. } if field == "account_number"
    ));
}

#[test]
fn test_core_error_wraps_domain_error() {
    let err: ApiError = translate_core_error(CoreError::DomainViolation(
        DomainError::EmptyLicenceNumber,
    ));
    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_unknown_line_names_the_line() {
    let err: ApiError = translate_core_error(CoreError::UnknownLine(String::from(
        "2018-01-01_2018-01-31",
    )));
    assert_eq!(
        err.to_string(),
        "Invalid input for field '2018-01-01_2018-01-31': Return has no line '2018-01-01_2018-01-31'"
    );
}

#[test]
fn test_schema_and_form_errors_are_internal() {
    let schema_err: ApiError = translate_schema_error(&SchemaError::ConflictingBounds {
        field: String::from("total"),
    });
    assert!(matches!(schema_err, ApiError::Internal { .. }));

    let form_err: ApiError = translate_form_error(&FormError::DuplicateField {
        action: String::from("/x"),
        name: String::from("y"),
    });
    assert!(matches!(form_err, ApiError::Internal { .. }));
}

#[test]
fn test_not_found_display() {
    let err: ApiError = ApiError::not_found("Return", String::from("Return 'r1' does not exist"));
    assert_eq!(err.to_string(), "Return not found: Return 'r1' does not exist");
}
