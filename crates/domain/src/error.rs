// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::Date;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A licence number was empty after normalisation.
    EmptyLicenceNumber,
    /// A billing account number does not match the expected format.
    InvalidBillingAccountNumber(String),
    /// A date string could not be parsed as an ISO 8601 calendar date.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// A date falls outside the period it must belong to.
    DateOutOfRange {
        /// The offending date.
        date: Date,
        /// The first permitted date.
        start: Date,
        /// The last permitted date.
        end: Date,
    },
    /// A period ends before it starts.
    InvalidPeriod {
        /// The period start.
        start: Date,
        /// The period end.
        end: Date,
    },
    /// A meter reading is lower than an earlier reading.
    ReadingDecreased {
        /// Zero-based index of the offending reading.
        index: usize,
        /// The offending reading.
        reading: f64,
        /// The highest reading seen before it.
        previous: f64,
    },
    /// A quantity was negative.
    NegativeQuantity {
        /// Zero-based index of the offending quantity.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// A day/month pair does not describe a real calendar day.
    InvalidDayOfYear {
        /// The day of the month.
        day: u8,
        /// The month number (1-12).
        month: u8,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLicenceNumber => write!(f, "Licence number cannot be empty"),
            Self::InvalidBillingAccountNumber(value) => {
                write!(f, "Invalid billing account number: '{value}'")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DateOutOfRange { date, start, end } => {
                write!(f, "Date {date} must be between {start} and {end}")
            }
            Self::InvalidPeriod { start, end } => {
                write!(f, "Period end {end} is before period start {start}")
            }
            Self::ReadingDecreased {
                index,
                reading,
                previous,
            } => {
                write!(
                    f,
                    "Reading {reading} at position {index} is lower than the previous reading {previous}"
                )
            }
            Self::NegativeQuantity { index, value } => {
                write!(f, "Quantity {value} at position {index} cannot be negative")
            }
            Self::InvalidDayOfYear { day, month } => {
                write!(f, "Day {day} of month {month} is not a valid date")
            }
        }
    }
}

impl std::error::Error for DomainError {}
