// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use water_abstraction_domain::DomainError;

/// Errors that can occur while applying a command to wizard state.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A value was given for a line the return does not have.
    UnknownLine(String),
    /// No return line falls inside the single total period.
    NoLinesInPeriod,
    /// A custom period is missing its start or end date.
    IncompletePeriod,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::UnknownLine(key) => write!(f, "Return has no line '{key}'"),
            Self::NoLinesInPeriod => write!(f, "No return lines fall within the total period"),
            Self::IncompletePeriod => write!(f, "A custom period needs a start and end date"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
