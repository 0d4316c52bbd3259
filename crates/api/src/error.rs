// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use water_abstraction::CoreError;
use water_abstraction_domain::DomainError;
use water_abstraction_forms::{FormError, SchemaError};

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
/// User input that fails validation is never an `ApiError`; it is attached to
/// the form and shown again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Builds a `ResourceNotFound` error.
    #[must_use]
    pub fn not_found(resource_type: &str, message: String) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::EmptyLicenceNumber => ApiError::InvalidInput {
            field: String::from("licence_number"),
            message: String::from("Licence number must not be empty"),
        },
        DomainError::InvalidBillingAccountNumber(number) => ApiError::InvalidInput {
            field: String::from("account_number"),
            message: format!("'{number}' is not a valid billing account number"),
        },
        DomainError::DateParseError { date_string, error } => ApiError::InvalidInput {
            field: String::from("date"),
            message: format!("Failed to parse date '{date_string}': {error}"),
        },
        DomainError::InvalidDayOfYear { day, month } => ApiError::InvalidInput {
            field: String::from("abstraction_period"),
            message: format!("{day}/{month} is not a day of the year"),
        },
        err @ (DomainError::DateOutOfRange { .. } | DomainError::InvalidPeriod { .. }) => {
            ApiError::DomainRuleViolation {
                rule: String::from("period_within_return"),
                message: err.to_string(),
            }
        }
        err @ DomainError::ReadingDecreased { .. } => ApiError::DomainRuleViolation {
            rule: String::from("readings_never_decrease"),
            message: err.to_string(),
        },
        err @ DomainError::NegativeQuantity { .. } => ApiError::DomainRuleViolation {
            rule: String::from("non_negative_quantity"),
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UnknownLine(key) => ApiError::InvalidInput {
            field: key.clone(),
            message: format!("Return has no line '{key}'"),
        },
        err @ (CoreError::NoLinesInPeriod | CoreError::IncompletePeriod) => {
            ApiError::DomainRuleViolation {
                rule: String::from("single_total_period"),
                message: err.to_string(),
            }
        }
    }
}

/// Translates a schema error into an API error.
///
/// A misconfigured schema is a defect, never a user mistake.
#[must_use]
pub fn translate_schema_error(err: &SchemaError) -> ApiError {
    ApiError::Internal {
        message: format!("Invalid validation schema: {err}"),
    }
}

/// Translates a form construction error into an API error.
#[must_use]
pub fn translate_form_error(err: &FormError) -> ApiError {
    ApiError::Internal {
        message: format!("Invalid form definition: {err}"),
    }
}
