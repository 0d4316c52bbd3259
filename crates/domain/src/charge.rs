// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Charge information types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// Why a new charge version is being created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReason {
    /// Reason identifier in the water service.
    pub id: String,
    /// Reason description shown to staff.
    pub description: String,
}

/// The billing account a charge version is invoiced to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAccount {
    /// Account identifier in the CRM.
    pub id: String,
    /// Account number, e.g. `A12345678A`.
    pub account_number: String,
}

/// Water source classification for charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Unsupported source.
    Unsupported,
    /// Supported source.
    Supported,
    /// Kielder.
    Kielder,
    /// Tidal.
    Tidal,
}

/// Charging season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// Summer abstraction.
    Summer,
    /// Winter abstraction.
    Winter,
    /// All year abstraction.
    AllYear,
}

/// Loss category of the abstraction purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loss {
    /// High loss.
    High,
    /// Medium loss.
    Medium,
    /// Low loss.
    Low,
    /// Very low loss.
    #[serde(rename = "very low")]
    VeryLow,
    /// Non-chargeable.
    Non,
}

macro_rules! wire_enum {
    ($ty:ty { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $ty {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Converts this value to its wire representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!("Unknown {} '{s}'", stringify!($ty))),
                }
            }
        }
    };
}

wire_enum!(Source {
    Unsupported => "unsupported",
    Supported => "supported",
    Kielder => "kielder",
    Tidal => "tidal",
});

wire_enum!(Season {
    Summer => "summer",
    Winter => "winter",
    AllYear => "allyear",
});

wire_enum!(Loss {
    High => "high",
    Medium => "medium",
    Low => "low",
    VeryLow => "very low",
    Non => "non",
});

/// Start and end of the annual abstraction period, as day/month pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractionPeriod {
    /// Start day.
    pub start_day: u8,
    /// Start month.
    pub start_month: u8,
    /// End day.
    pub end_day: u8,
    /// End month.
    pub end_month: u8,
}

impl AbstractionPeriod {
    /// Creates a validated abstraction period.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDayOfYear` if either day/month pair is not
    /// a real calendar day in a leap year.
    pub fn new(
        start_day: u8,
        start_month: u8,
        end_day: u8,
        end_month: u8,
    ) -> Result<Self, DomainError> {
        validate_day_of_year(start_day, start_month)?;
        validate_day_of_year(end_day, end_month)?;
        Ok(Self {
            start_day,
            start_month,
            end_day,
            end_month,
        })
    }
}

fn validate_day_of_year(day: u8, month: u8) -> Result<(), DomainError> {
    let valid: bool = time::Month::try_from(month)
        .ok()
        .and_then(|m| time::Date::from_calendar_date(2020, m, day).ok())
        .is_some();
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidDayOfYear { day, month })
    }
}

/// One element of a charge version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeElement {
    /// Element identifier, generated when the element is created in the wizard.
    pub id: Uuid,
    /// Purpose use code.
    #[serde(default)]
    pub purpose: Option<String>,
    /// Free text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Abstraction period.
    #[serde(default)]
    pub abstraction_period: Option<AbstractionPeriod>,
    /// Authorised annual quantity in megalitres.
    #[serde(default)]
    pub authorised_annual_quantity: Option<f64>,
    /// Billable annual quantity in megalitres.
    #[serde(default)]
    pub billable_annual_quantity: Option<f64>,
    /// Source.
    #[serde(default)]
    pub source: Option<Source>,
    /// Season.
    #[serde(default)]
    pub season: Option<Season>,
    /// Loss.
    #[serde(default)]
    pub loss: Option<Loss>,
}

impl ChargeElement {
    /// Creates an empty element.
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self {
            id,
            purpose: None,
            description: None,
            abstraction_period: None,
            authorised_annual_quantity: None,
            billable_annual_quantity: None,
            source: None,
            season: None,
            loss: None,
        }
    }
}
