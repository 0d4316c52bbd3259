// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for form construction and schema evaluation.
//!
//! None of these describe invalid user input: that is reported through
//! `Validation::error` and attached to fields. These errors are defects in
//! how a form or schema was put together.

use thiserror::Error;

/// Errors raised while building a form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Two fields in the same form share a name.
    #[error("Duplicate field name '{name}' in form '{action}'")]
    DuplicateField {
        /// The form action.
        action: String,
        /// The duplicated name.
        name: String,
    },
}

/// Errors raised by a malformed validation schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A rule's lower bound exceeds its upper bound.
    #[error("Rule for '{field}' has a minimum greater than its maximum")]
    ConflictingBounds {
        /// The field the rule belongs to.
        field: String,
    },
    /// A rule references a field the schema does not define.
    #[error("Rule for '{field}' references unknown field '{reference}'")]
    UnknownReference {
        /// The field the rule belongs to.
        field: String,
        /// The referenced field.
        reference: String,
    },
    /// A constraint does not apply to the rule's type.
    #[error("Rule for '{field}' uses '{constraint}', which does not apply to {rule_type} values")]
    InapplicableConstraint {
        /// The field the rule belongs to.
        field: String,
        /// The constraint name.
        constraint: &'static str,
        /// The rule type.
        rule_type: &'static str,
    },
    /// The compiled JSON Schema document was rejected.
    #[error("Schema failed to compile: {0}")]
    Compile(String),
}
