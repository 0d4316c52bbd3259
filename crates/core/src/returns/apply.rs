// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;
use time::Date;
use water_abstraction_domain::{
    DomainError, Meter, Reading, ReturnMethod, ReturnModel, ReturnStatus, RoutingAction,
    validate_meter_readings, validate_period_within, validate_quantities,
};

use super::command::ReturnCommand;
use crate::error::CoreError;

/// Applies a command to a return, producing the updated return.
///
/// The input is never modified. Line quantities are kept consistent with
/// the answers: a nil return has none, a single total is spread over the
/// lines in its period and meter readings are turned into volumes.
///
/// # Arguments
///
/// * `model` - The return as answered so far
/// * `command` - The answers from one page
///
/// # Errors
///
/// Returns an error if:
/// - A value names a line the return does not have
/// - A quantity is negative
/// - A meter reading is lower than an earlier reading
/// - A custom single total period is incomplete, inverted or outside the
///   return period
/// - No line falls inside the single total period
pub fn apply_return_command(
    model: &ReturnModel,
    command: ReturnCommand,
) -> Result<ReturnModel, CoreError> {
    let mut next: ReturnModel = model.clone();

    match command {
        ReturnCommand::SetRoutingAction { action } => {
            next.routing_action = Some(action);
        }
        ReturnCommand::SetReceivedDate { date } => {
            next.received_date = Some(date);
        }
        ReturnCommand::SetNilReturn { is_nil } => {
            next.is_nil = Some(is_nil);
            if is_nil {
                next.reading = Reading::default();
                next.meter = Meter::default();
                next.meter_details_provided = None;
                clear_quantities(&mut next);
            }
        }
        ReturnCommand::SetMethod { method } => {
            next.reading.method = Some(method);
            if method == ReturnMethod::AbstractionVolumes {
                next.reading.meter_reset = None;
                next.meter.start_reading = None;
                next.meter.readings.clear();
            }
        }
        ReturnCommand::SetMeterReset { meter_reset } => {
            next.reading.meter_reset = Some(meter_reset);
        }
        ReturnCommand::SetUnits { units } => {
            next.reading.units = Some(units);
        }
        ReturnCommand::SetSingleTotal {
            is_single_total,
            total,
        } => {
            next.reading.is_single_total = Some(is_single_total);
            if is_single_total {
                next.reading.total = total;
                distribute_single_total(&mut next)?;
            } else {
                next.reading.total = None;
                next.reading.total_custom_dates = false;
                next.reading.total_start_date = None;
                next.reading.total_end_date = None;
            }
        }
        ReturnCommand::SetSingleTotalDates {
            custom,
            start_date,
            end_date,
        } => {
            next.reading.total_custom_dates = custom;
            if custom {
                let (start, end): (Date, Date) = match (start_date, end_date) {
                    (Some(start), Some(end)) => (start, end),
                    _ => return Err(CoreError::IncompletePeriod),
                };
                validate_period_within(start, end, model.start_date, model.end_date)?;
                next.reading.total_start_date = Some(start);
                next.reading.total_end_date = Some(end);
            } else {
                next.reading.total_start_date = None;
                next.reading.total_end_date = None;
            }
            distribute_single_total(&mut next)?;
        }
        ReturnCommand::SetQuantities { quantities } => {
            check_line_keys(&next, quantities.keys())?;
            let values: Vec<Option<f64>> = quantities.values().copied().collect();
            validate_quantities(&values)?;
            for line in &mut next.lines {
                if let Some(quantity) = quantities.get(&line.key()) {
                    line.quantity = *quantity;
                }
            }
        }
        ReturnCommand::SetMeterDetailsProvided { provided } => {
            next.meter_details_provided = Some(provided);
            if !provided {
                next.meter.manufacturer = None;
                next.meter.serial_number = None;
                next.meter.multiplier = false;
            }
        }
        ReturnCommand::SetMeterUnits { units } => {
            next.meter.units = Some(units);
            next.reading.units = Some(units);
        }
        ReturnCommand::SetMeterReadings {
            start_reading,
            readings,
        } => {
            check_line_keys(&next, readings.keys())?;
            let ordered: Vec<Option<f64>> = next
                .lines
                .iter()
                .map(|line| readings.get(&line.key()).copied().flatten())
                .collect();
            validate_meter_readings(start_reading, &ordered)?;
            next.meter.start_reading = Some(start_reading);
            next.meter.readings = readings;
            derive_quantities_from_readings(&mut next);
        }
        ReturnCommand::SetMeterDetails {
            manufacturer,
            serial_number,
            multiplier,
        } => {
            next.meter.manufacturer = Some(manufacturer);
            next.meter.serial_number = Some(serial_number);
            next.meter.multiplier = multiplier;
            if next.uses_meter_readings() && next.meter.start_reading.is_some() {
                derive_quantities_from_readings(&mut next);
            }
        }
        ReturnCommand::Submit => {
            next.status = if next.routing_action == Some(RoutingAction::LogReceipt) {
                ReturnStatus::Received
            } else {
                ReturnStatus::Completed
            };
        }
    }

    Ok(next)
}

fn clear_quantities(model: &mut ReturnModel) {
    for line in &mut model.lines {
        line.quantity = None;
    }
}

fn check_line_keys<'a, I>(model: &ReturnModel, keys: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a String>,
{
    let known: Vec<String> = model.line_keys();
    match keys.into_iter().find(|key| !known.contains(*key)) {
        Some(key) => Err(CoreError::UnknownLine(key.clone())),
        None => Ok(()),
    }
}

/// Spreads the single total evenly over the lines inside the total period.
fn distribute_single_total(model: &mut ReturnModel) -> Result<(), CoreError> {
    let Some(total) = model.reading.total else {
        return Ok(());
    };
    if total < 0.0 {
        return Err(CoreError::DomainViolation(DomainError::NegativeQuantity {
            index: 0,
            value: total,
        }));
    }
    let (start, end): (Date, Date) = match (
        model.reading.total_custom_dates,
        model.reading.total_start_date,
        model.reading.total_end_date,
    ) {
        (true, Some(start), Some(end)) => (start, end),
        _ => (model.start_date, model.end_date),
    };

    let count: usize = model.lines.iter().filter(|l| l.is_within(start, end)).count();
    if count == 0 {
        return Err(CoreError::NoLinesInPeriod);
    }
    #[allow(clippy::cast_precision_loss)]
    let share: f64 = total / count as f64;
    for line in &mut model.lines {
        line.quantity = line.is_within(start, end).then_some(share);
    }
    Ok(())
}

/// Sets each line's quantity to the difference from the last present reading.
///
/// Lines without a reading get no quantity.
fn derive_quantities_from_readings(model: &mut ReturnModel) {
    let factor: f64 = model.meter.factor();
    let readings: &BTreeMap<String, Option<f64>> = &model.meter.readings;
    let mut last: f64 = model.meter.start_reading.unwrap_or(0.0);
    let quantities: Vec<Option<f64>> = model
        .lines
        .iter()
        .map(|line| {
            let reading: f64 = readings.get(&line.key()).copied().flatten()?;
            let quantity: f64 = (reading - last) * factor;
            last = reading;
            Some(quantity)
        })
        .collect();
    for (line, quantity) in model.lines.iter_mut().zip(quantities) {
        line.quantity = quantity;
    }
}
