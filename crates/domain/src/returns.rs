// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The return submission model accumulated by the returns wizard.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

use crate::dates::{format_iso_date, is_within, iso_date};
use crate::types::{
    Frequency, LicenceNumber, ReturnId, ReturnMethod, ReturnStatus, RoutingAction, Units,
};

/// One line of a return: the quantity abstracted over a sub-period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnLine {
    /// First day covered by the line.
    #[serde(with = "iso_date")]
    pub start_date: Date,
    /// Last day covered by the line.
    #[serde(with = "iso_date")]
    pub end_date: Date,
    /// Length of the line.
    pub time_period: Frequency,
    /// Abstracted quantity, `None` when no value was entered.
    #[serde(default)]
    pub quantity: Option<f64>,
}

impl ReturnLine {
    /// Creates an empty line.
    #[must_use]
    pub const fn new(start_date: Date, end_date: Date, time_period: Frequency) -> Self {
        Self {
            start_date,
            end_date,
            time_period,
            quantity: None,
        }
    }

    /// Stable key used as the form field name for this line.
    #[must_use]
    pub fn key(&self) -> String {
        format!(
            "{}_{}",
            format_iso_date(self.start_date),
            format_iso_date(self.end_date)
        )
    }

    /// Returns true if the whole line lies within `start..=end`.
    #[must_use]
    pub fn is_within(&self, start: Date, end: Date) -> bool {
        is_within(self.start_date, start, end) && is_within(self.end_date, start, end)
    }
}

/// How the return volumes were recorded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reading {
    /// Meter readings or direct volumes.
    #[serde(default)]
    pub method: Option<ReturnMethod>,
    /// Units of the volumes.
    #[serde(default)]
    pub units: Option<Units>,
    /// Whether the meter was reset or replaced during the period.
    #[serde(default)]
    pub meter_reset: Option<bool>,
    /// Whether a single total was given for the period.
    #[serde(default)]
    pub is_single_total: Option<bool>,
    /// The single total, when given.
    #[serde(default)]
    pub total: Option<f64>,
    /// Whether the single total covers custom dates rather than the whole period.
    #[serde(default)]
    pub total_custom_dates: bool,
    /// Start of the single total period.
    #[serde(default, with = "iso_date::option")]
    pub total_start_date: Option<Date>,
    /// End of the single total period.
    #[serde(default, with = "iso_date::option")]
    pub total_end_date: Option<Date>,
}

/// Details of the meter used for the return.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meter {
    /// Meter manufacturer.
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Meter serial number.
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Whether the meter has a x10 display multiplier.
    #[serde(default)]
    pub multiplier: bool,
    /// Units the meter reads in.
    #[serde(default)]
    pub units: Option<Units>,
    /// Reading at the start of the return period.
    #[serde(default)]
    pub start_reading: Option<f64>,
    /// End-of-line readings keyed by `ReturnLine::key`.
    #[serde(default)]
    pub readings: BTreeMap<String, Option<f64>>,
}

impl Meter {
    /// Multiplier applied to reading differences.
    #[must_use]
    pub const fn factor(&self) -> f64 {
        if self.multiplier { 10.0 } else { 1.0 }
    }
}

/// The return being completed, together with every answer given so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnModel {
    /// Return identifier.
    pub return_id: ReturnId,
    /// Licence the return belongs to.
    pub licence_number: LicenceNumber,
    /// First day of the return period.
    #[serde(with = "iso_date")]
    pub start_date: Date,
    /// Last day of the return period.
    #[serde(with = "iso_date")]
    pub end_date: Date,
    /// Line frequency.
    pub frequency: Frequency,
    /// Current status.
    #[serde(default)]
    pub status: ReturnStatus,
    /// Date a paper return was received.
    #[serde(default, with = "iso_date::option")]
    pub received_date: Option<Date>,
    /// Staff routing choice (internal journey only).
    #[serde(default)]
    pub routing_action: Option<RoutingAction>,
    /// Whether no water was abstracted.
    #[serde(default)]
    pub is_nil: Option<bool>,
    /// Reading method and totals.
    #[serde(default)]
    pub reading: Reading,
    /// Whether meter details were provided with a volumes return.
    #[serde(default)]
    pub meter_details_provided: Option<bool>,
    /// Meter details and readings.
    #[serde(default)]
    pub meter: Meter,
    /// Return lines.
    #[serde(default)]
    pub lines: Vec<ReturnLine>,
}

impl ReturnModel {
    /// Creates a due return with the given lines.
    #[must_use]
    pub fn new(
        return_id: ReturnId,
        licence_number: LicenceNumber,
        start_date: Date,
        end_date: Date,
        frequency: Frequency,
        lines: Vec<ReturnLine>,
    ) -> Self {
        Self {
            return_id,
            licence_number,
            start_date,
            end_date,
            frequency,
            status: ReturnStatus::Due,
            received_date: None,
            routing_action: None,
            is_nil: None,
            reading: Reading::default(),
            meter_details_provided: None,
            meter: Meter::default(),
            lines,
        }
    }

    /// True when the volumes are derived from meter readings.
    ///
    /// A meter that was reset during the period cannot be used for readings,
    /// so the return falls back to volumes.
    #[must_use]
    pub fn uses_meter_readings(&self) -> bool {
        self.reading.method == Some(ReturnMethod::OneMeter) && self.reading.meter_reset != Some(true)
    }

    /// Sum of all line quantities, `None` if no line has a quantity.
    #[must_use]
    pub fn total_quantity(&self) -> Option<f64> {
        self.lines
            .iter()
            .filter_map(|line| line.quantity)
            .fold(None, |acc, q| Some(acc.unwrap_or(0.0) + q))
    }

    /// Line keys in line order.
    #[must_use]
    pub fn line_keys(&self) -> Vec<String> {
        self.lines.iter().map(ReturnLine::key).collect()
    }
}
