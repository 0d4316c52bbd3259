// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::dates::is_within;
use crate::error::DomainError;
use time::Date;

/// Validates a billing account number.
///
/// Account numbers are a region letter, eight digits and a trailing `A`,
/// e.g. `A12345678A`.
///
/// # Errors
///
/// Returns `DomainError::InvalidBillingAccountNumber` if the format does not match.
pub fn validate_billing_account_number(value: &str) -> Result<(), DomainError> {
    let bytes: &[u8] = value.as_bytes();
    let valid: bool = bytes.len() == 10
        && bytes[0].is_ascii_uppercase()
        && bytes[1..9].iter().all(u8::is_ascii_digit)
        && bytes[9] == b'A';

    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidBillingAccountNumber(value.to_string()))
    }
}

/// Validates that meter readings never decrease.
///
/// Missing readings (`None`) are permitted anywhere and are skipped; each
/// present reading must be at least the start reading and every earlier
/// present reading.
///
/// # Arguments
///
/// * `start_reading` - The reading at the start of the return period
/// * `readings` - End-of-line readings in line order
///
/// # Errors
///
/// Returns `DomainError::ReadingDecreased` for the first reading that is
/// lower than the highest reading before it.
pub fn validate_meter_readings(
    start_reading: f64,
    readings: &[Option<f64>],
) -> Result<(), DomainError> {
    let mut previous: f64 = start_reading;
    for (index, reading) in readings.iter().enumerate() {
        let Some(reading) = *reading else {
            continue;
        };
        if reading < previous {
            return Err(DomainError::ReadingDecreased {
                index,
                reading,
                previous,
            });
        }
        previous = reading;
    }
    Ok(())
}

/// Validates that no quantity is negative.
///
/// # Errors
///
/// Returns `DomainError::NegativeQuantity` for the first negative quantity.
pub fn validate_quantities(quantities: &[Option<f64>]) -> Result<(), DomainError> {
    match quantities
        .iter()
        .enumerate()
        .find_map(|(index, q)| q.filter(|v| *v < 0.0).map(|value| (index, value)))
    {
        Some((index, value)) => Err(DomainError::NegativeQuantity { index, value }),
        None => Ok(()),
    }
}

/// Validates that `start..=end` is a period within `period_start..=period_end`.
///
/// # Errors
///
/// Returns an error if the period is inverted or either date falls outside
/// the enclosing period.
pub fn validate_period_within(
    start: Date,
    end: Date,
    period_start: Date,
    period_end: Date,
) -> Result<(), DomainError> {
    if end < start {
        return Err(DomainError::InvalidPeriod { start, end });
    }
    for date in [start, end] {
        if !is_within(date, period_start, period_end) {
            return Err(DomainError::DateOutOfRange {
                date,
                start: period_start,
                end: period_end,
            });
        }
    }
    Ok(())
}
