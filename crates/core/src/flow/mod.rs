// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Step flow tables for the returns wizard.
//!
//! Each journey has its own step enum and a total transition function over
//! it. Only the terminal `Submitted` step has no `next`, and only `Start`
//! has no `previous`.

mod external;
mod internal;

use std::fmt;
use std::str::FromStr;
use water_abstraction_domain::{ReturnMethod, ReturnModel, RoutingAction};

pub use external::{ExternalJourney, ExternalStep};
pub use internal::{InternalJourney, InternalStep};

/// The answers that decide which way a journey branches.
///
/// Unanswered questions take the default branch: not nil, volumes, no meter
/// reset, not a single total and no meter details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlowAnswers {
    /// Staff routing choice.
    pub routing_action: Option<RoutingAction>,
    /// Nothing was abstracted.
    pub is_nil: bool,
    /// Readings were taken from one meter.
    pub one_meter: bool,
    /// The meter was reset or replaced.
    pub meter_reset: bool,
    /// A single total was given.
    pub is_single_total: bool,
    /// Meter details were given with volumes.
    pub meter_details_provided: bool,
}

impl FlowAnswers {
    /// Derives the answers from a return model.
    #[must_use]
    pub fn from_return(model: &ReturnModel) -> Self {
        Self {
            routing_action: model.routing_action,
            is_nil: model.is_nil == Some(true),
            one_meter: model.reading.method == Some(ReturnMethod::OneMeter),
            meter_reset: model.reading.meter_reset == Some(true),
            is_single_total: model.reading.is_single_total == Some(true),
            meter_details_provided: model.meter_details_provided == Some(true),
        }
    }

    /// Volumes come from meter readings.
    #[must_use]
    pub const fn uses_readings(&self) -> bool {
        self.one_meter && !self.meter_reset
    }

    /// A meter details page is part of the journey.
    #[must_use]
    pub const fn has_meter_details(&self) -> bool {
        self.uses_readings() || self.meter_details_provided
    }

    /// Staff chose to log receipt only.
    #[must_use]
    pub fn is_log_receipt(&self) -> bool {
        self.routing_action == Some(RoutingAction::LogReceipt)
    }
}

/// A returns journey: a finite set of steps and the transitions between them.
pub trait Journey {
    /// The step type.
    type Step: Copy + Eq + fmt::Debug + 'static;

    /// The entry step.
    fn first() -> Self::Step;

    /// The step after `step`, `None` only for the terminal step.
    fn next(step: Self::Step, answers: &FlowAnswers) -> Option<Self::Step>;

    /// The step before `step`, `None` only for the entry step.
    fn previous(step: Self::Step, answers: &FlowAnswers) -> Option<Self::Step>;

    /// Route slug for a step.
    fn path(step: Self::Step) -> &'static str;

    /// Every step in declaration order.
    fn all() -> &'static [Self::Step];

    /// Looks up a step by its route slug.
    fn from_path(slug: &str) -> Option<Self::Step> {
        Self::all().iter().copied().find(|s| Self::path(*s) == slug)
    }
}

/// Which returns journey a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JourneyKind {
    /// Staff keying in a return.
    Internal,
    /// A licence holder completing their own return.
    External,
}

impl JourneyKind {
    /// Route segment for the journey.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl fmt::Display for JourneyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JourneyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            other => Err(format!("Unknown journey '{other}'")),
        }
    }
}
