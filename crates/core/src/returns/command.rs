// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;
use water_abstraction_domain::dates::iso_date;
use water_abstraction_domain::{ReturnMethod, RoutingAction, Units};

/// A command carries the answers from one returns wizard page as data only.
///
/// Line values are keyed by `ReturnLine::key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReturnCommand {
    /// Staff routing choice.
    SetRoutingAction {
        /// Chosen action.
        action: RoutingAction,
    },
    /// Date a paper return was received.
    SetReceivedDate {
        /// Received date.
        #[serde(with = "iso_date")]
        date: Date,
    },
    /// Whether anything was abstracted.
    SetNilReturn {
        /// True for a nil return.
        is_nil: bool,
    },
    /// Meter readings or volumes.
    SetMethod {
        /// Chosen method.
        method: ReturnMethod,
    },
    /// Whether the meter was reset or replaced.
    SetMeterReset {
        /// True if it was.
        meter_reset: bool,
    },
    /// Units of the volumes.
    SetUnits {
        /// Chosen units.
        units: Units,
    },
    /// Whether a single total was given, and the total.
    SetSingleTotal {
        /// True for a single total.
        is_single_total: bool,
        /// The total, required when `is_single_total` is true.
        total: Option<f64>,
    },
    /// Period the single total covers.
    SetSingleTotalDates {
        /// False when the total covers the whole return period.
        custom: bool,
        /// Start of a custom period.
        #[serde(default, with = "iso_date::option")]
        start_date: Option<Date>,
        /// End of a custom period.
        #[serde(default, with = "iso_date::option")]
        end_date: Option<Date>,
    },
    /// Per-line volumes.
    SetQuantities {
        /// Quantity per line key.
        quantities: BTreeMap<String, Option<f64>>,
    },
    /// Whether meter details were given with volumes.
    SetMeterDetailsProvided {
        /// True if they were.
        provided: bool,
    },
    /// Units the meter reads in.
    SetMeterUnits {
        /// Chosen units.
        units: Units,
    },
    /// Start and per-line meter readings.
    SetMeterReadings {
        /// Reading at the start of the period.
        start_reading: f64,
        /// Reading per line key.
        readings: BTreeMap<String, Option<f64>>,
    },
    /// Meter make, serial number and multiplier.
    SetMeterDetails {
        /// Manufacturer.
        manufacturer: String,
        /// Serial number.
        serial_number: String,
        /// True if the meter has a x10 display.
        multiplier: bool,
    },
    /// Completes the return.
    Submit,
}

impl ReturnCommand {
    /// Name of the command, for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetRoutingAction { .. } => "SetRoutingAction",
            Self::SetReceivedDate { .. } => "SetReceivedDate",
            Self::SetNilReturn { .. } => "SetNilReturn",
            Self::SetMethod { .. } => "SetMethod",
            Self::SetMeterReset { .. } => "SetMeterReset",
            Self::SetUnits { .. } => "SetUnits",
            Self::SetSingleTotal { .. } => "SetSingleTotal",
            Self::SetSingleTotalDates { .. } => "SetSingleTotalDates",
            Self::SetQuantities { .. } => "SetQuantities",
            Self::SetMeterDetailsProvided { .. } => "SetMeterDetailsProvided",
            Self::SetMeterUnits { .. } => "SetMeterUnits",
            Self::SetMeterReadings { .. } => "SetMeterReadings",
            Self::SetMeterDetails { .. } => "SetMeterDetails",
            Self::Submit => "Submit",
        }
    }
}
