// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{FlowAnswers, Journey};

/// Steps of the staff returns journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalStep {
    /// Landing page.
    Start,
    /// Submit the return or only log its receipt.
    InternalRouting,
    /// Record the date a paper return arrived, without its contents.
    LogReceipt,
    /// Date the return was received.
    DateReceived,
    /// Whether anything was abstracted.
    NilReturn,
    /// Meter readings or volumes.
    Method,
    /// Whether the meter was reset or replaced.
    MeterReset,
    /// Units of the volumes.
    Units,
    /// Whether a single total was given.
    SingleTotal,
    /// Period the single total covers.
    SingleTotalDates,
    /// Per-line volumes.
    Quantities,
    /// Whether meter details were given with volumes.
    MeterDetailsProvided,
    /// Units the meter reads in.
    MeterUnits,
    /// Start and per-line readings.
    MeterReadings,
    /// Meter make, serial number and multiplier.
    MeterDetails,
    /// Summary before submission.
    Confirm,
    /// Terminal step.
    Submitted,
}

const ALL: [InternalStep; 17] = [
    InternalStep::Start,
    InternalStep::InternalRouting,
    InternalStep::LogReceipt,
    InternalStep::DateReceived,
    InternalStep::NilReturn,
    InternalStep::Method,
    InternalStep::MeterReset,
    InternalStep::Units,
    InternalStep::SingleTotal,
    InternalStep::SingleTotalDates,
    InternalStep::Quantities,
    InternalStep::MeterDetailsProvided,
    InternalStep::MeterUnits,
    InternalStep::MeterReadings,
    InternalStep::MeterDetails,
    InternalStep::Confirm,
    InternalStep::Submitted,
];

/// The staff returns journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalJourney;

impl Journey for InternalJourney {
    type Step = InternalStep;

    fn first() -> InternalStep {
        InternalStep::Start
    }

    fn next(step: InternalStep, answers: &FlowAnswers) -> Option<InternalStep> {
        use InternalStep as S;
        let next: InternalStep = match step {
            S::Start => S::InternalRouting,
            S::InternalRouting if answers.is_log_receipt() => S::LogReceipt,
            S::InternalRouting => S::DateReceived,
            S::LogReceipt | S::Confirm => S::Submitted,
            S::DateReceived => S::NilReturn,
            S::NilReturn if answers.is_nil => S::Confirm,
            S::NilReturn => S::Method,
            S::Method if answers.one_meter => S::MeterReset,
            S::Method => S::Units,
            S::MeterReset if answers.meter_reset => S::Units,
            S::MeterReset => S::MeterUnits,
            S::Units => S::SingleTotal,
            S::SingleTotal if answers.is_single_total => S::SingleTotalDates,
            S::SingleTotal | S::SingleTotalDates => S::Quantities,
            S::Quantities => S::MeterDetailsProvided,
            S::MeterDetailsProvided if answers.meter_details_provided => S::MeterDetails,
            S::MeterDetailsProvided | S::MeterDetails => S::Confirm,
            S::MeterUnits => S::MeterReadings,
            S::MeterReadings => S::MeterDetails,
            S::Submitted => return None,
        };
        Some(next)
    }

    fn previous(step: InternalStep, answers: &FlowAnswers) -> Option<InternalStep> {
        use InternalStep as S;
        let previous: InternalStep = match step {
            S::Start => return None,
            S::InternalRouting => S::Start,
            S::LogReceipt | S::DateReceived => S::InternalRouting,
            S::NilReturn => S::DateReceived,
            S::Method => S::NilReturn,
            S::MeterReset => S::Method,
            S::Units if answers.one_meter => S::MeterReset,
            S::Units => S::Method,
            S::SingleTotal => S::Units,
            S::SingleTotalDates => S::SingleTotal,
            S::Quantities if answers.is_single_total => S::SingleTotalDates,
            S::Quantities => S::SingleTotal,
            S::MeterDetailsProvided => S::Quantities,
            S::MeterUnits => S::MeterReset,
            S::MeterReadings => S::MeterUnits,
            S::MeterDetails if answers.uses_readings() => S::MeterReadings,
            S::MeterDetails => S::MeterDetailsProvided,
            S::Confirm if answers.is_nil => S::NilReturn,
            S::Confirm if answers.has_meter_details() => S::MeterDetails,
            S::Confirm => S::MeterDetailsProvided,
            S::Submitted if answers.is_log_receipt() => S::LogReceipt,
            S::Submitted => S::Confirm,
        };
        Some(previous)
    }

    fn path(step: InternalStep) -> &'static str {
        match step {
            InternalStep::Start => "start",
            InternalStep::InternalRouting => "internal",
            InternalStep::LogReceipt => "log-receipt",
            InternalStep::DateReceived => "date-received",
            InternalStep::NilReturn => "nil-return",
            InternalStep::Method => "method",
            InternalStep::MeterReset => "meter-reset",
            InternalStep::Units => "units",
            InternalStep::SingleTotal => "single-total",
            InternalStep::SingleTotalDates => "single-total-dates",
            InternalStep::Quantities => "quantities",
            InternalStep::MeterDetailsProvided => "meter-details-provided",
            InternalStep::MeterUnits => "meter-units",
            InternalStep::MeterReadings => "meter-readings",
            InternalStep::MeterDetails => "meter-details",
            InternalStep::Confirm => "confirm",
            InternalStep::Submitted => "submitted",
        }
    }

    fn all() -> &'static [InternalStep] {
        &ALL
    }
}
