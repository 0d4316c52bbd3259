// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{FlowAnswers, Journey};

/// Steps of the licence holder returns journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalStep {
    /// Landing page.
    Start,
    /// Whether anything was abstracted.
    NilReturn,
    /// Meter readings or volumes.
    Method,
    /// Whether the meter was reset or replaced.
    MeterReset,
    /// Units of the volumes.
    Units,
    /// Per-line volumes.
    Quantities,
    /// Whether a meter was used to measure the volumes.
    MeterUsed,
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

const ALL: [ExternalStep; 12] = [
    ExternalStep::Start,
    ExternalStep::NilReturn,
    ExternalStep::Method,
    ExternalStep::MeterReset,
    ExternalStep::Units,
    ExternalStep::Quantities,
    ExternalStep::MeterUsed,
    ExternalStep::MeterUnits,
    ExternalStep::MeterReadings,
    ExternalStep::MeterDetails,
    ExternalStep::Confirm,
    ExternalStep::Submitted,
];

/// The licence holder returns journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalJourney;

impl Journey for ExternalJourney {
    type Step = ExternalStep;

    fn first() -> ExternalStep {
        ExternalStep::Start
    }

    fn next(step: ExternalStep, answers: &FlowAnswers) -> Option<ExternalStep> {
        use ExternalStep as S;
        let next: ExternalStep = match step {
            S::Start => S::NilReturn,
            S::NilReturn if answers.is_nil => S::Confirm,
            S::NilReturn => S::Method,
            S::Method if answers.one_meter => S::MeterReset,
            S::Method => S::Units,
            S::MeterReset if answers.meter_reset => S::Units,
            S::MeterReset => S::MeterUnits,
            S::Units => S::Quantities,
            S::Quantities => S::MeterUsed,
            S::MeterUsed if answers.meter_details_provided => S::MeterDetails,
            S::MeterUsed | S::MeterDetails => S::Confirm,
            S::MeterUnits => S::MeterReadings,
            S::MeterReadings => S::MeterDetails,
            S::Confirm => S::Submitted,
            S::Submitted => return None,
        };
        Some(next)
    }

    fn previous(step: ExternalStep, answers: &FlowAnswers) -> Option<ExternalStep> {
        use ExternalStep as S;
        let previous: ExternalStep = match step {
            S::Start => return None,
            S::NilReturn => S::Start,
            S::Method => S::NilReturn,
            S::MeterReset => S::Method,
            S::Units if answers.one_meter => S::MeterReset,
            S::Units => S::Method,
            S::Quantities => S::Units,
            S::MeterUsed => S::Quantities,
            S::MeterUnits => S::MeterReset,
            S::MeterReadings => S::MeterUnits,
            S::MeterDetails if answers.uses_readings() => S::MeterReadings,
            S::MeterDetails => S::MeterUsed,
            S::Confirm if answers.is_nil => S::NilReturn,
            S::Confirm if answers.has_meter_details() => S::MeterDetails,
            S::Confirm => S::MeterUsed,
            S::Submitted => S::Confirm,
        };
        Some(previous)
    }

    fn path(step: ExternalStep) -> &'static str {
        match step {
            ExternalStep::Start => "start",
            ExternalStep::NilReturn => "nil-return",
            ExternalStep::Method => "method",
            ExternalStep::MeterReset => "meter-reset",
            ExternalStep::Units => "units",
            ExternalStep::Quantities => "quantities",
            ExternalStep::MeterUsed => "meter-used",
            ExternalStep::MeterUnits => "meter-units",
            ExternalStep::MeterReadings => "meter-readings",
            ExternalStep::MeterDetails => "meter-details",
            ExternalStep::Confirm => "confirm",
            ExternalStep::Submitted => "submitted",
        }
    }

    fn all() -> &'static [ExternalStep] {
        &ALL
    }
}
