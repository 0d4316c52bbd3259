// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod field;
mod form;
mod handler;
mod mapper;
mod schema;

#[cfg(test)]
mod tests;

/// A bag of named values: a raw request payload or typed form values.
pub type Payload = serde_json::Map<String, serde_json::Value>;

pub use error::{FormError, SchemaError};
pub use field::{Choice, Field, FieldError, FieldKind, FieldOptions, InputType, fields};
pub use form::{Form, Method, apply_errors, form_factory, get_values, set_values};
pub use handler::{FormRequest, handle_request, payload_from_pairs};
pub use mapper::Mapper;
pub use schema::{
    Check, ObjectSchema, Rule, Validation, ValidationErrorDetails, ValidationErrorItem,
    ValidationOptions, Validator, validate,
};
