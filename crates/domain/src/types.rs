// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A water abstraction licence number, e.g. `01/123/R01`.
///
/// Licence numbers are stored trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenceNumber(String);

impl LicenceNumber {
    /// Creates a normalised licence number.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyLicenceNumber` if nothing remains after trimming.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let normalised: String = value.trim().to_uppercase();
        if normalised.is_empty() {
            return Err(DomainError::EmptyLicenceNumber);
        }
        Ok(Self(normalised))
    }

    /// Returns the licence number.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LicenceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a licence record in the water service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenceId(String);

impl LicenceId {
    /// Creates a licence identifier.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LicenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a CRM document header (one per licence holder document).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a document identifier.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a return, e.g. `v1:1:01/123:10012345:2018-04-01:2019-03-31`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnId(String);

impl ReturnId {
    /// Creates a return identifier.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Returns the identifier.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReturnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Units a return quantity or meter reading may be recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    /// Cubic metres.
    #[serde(rename = "m³")]
    CubicMetres,
    /// Litres.
    #[serde(rename = "l")]
    Litres,
    /// Megalitres.
    #[serde(rename = "Ml")]
    Megalitres,
    /// Imperial gallons.
    #[serde(rename = "gal")]
    Gallons,
}

impl Units {
    /// All supported units, in display order.
    pub const ALL: [Self; 4] = [
        Self::CubicMetres,
        Self::Litres,
        Self::Megalitres,
        Self::Gallons,
    ];

    /// Converts this unit to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CubicMetres => "m³",
            Self::Litres => "l",
            Self::Megalitres => "Ml",
            Self::Gallons => "gal",
        }
    }

    /// Human readable label used on forms.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CubicMetres => "Cubic metres",
            Self::Litres => "Litres",
            Self::Megalitres => "Megalitres",
            Self::Gallons => "Gallons",
        }
    }

    /// Converts a quantity in this unit to cubic metres.
    #[must_use]
    pub fn to_cubic_metres(&self, quantity: f64) -> f64 {
        match self {
            Self::CubicMetres => quantity,
            Self::Litres => quantity / 1000.0,
            Self::Megalitres => quantity * 1000.0,
            Self::Gallons => quantity * 0.004_546_09,
        }
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| format!("Unknown units '{s}'"))
    }
}

/// How the abstracted volumes on a return were arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReturnMethod {
    /// Readings from a single meter.
    OneMeter,
    /// Volumes entered directly.
    AbstractionVolumes,
}

impl ReturnMethod {
    /// Converts this method to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneMeter => "oneMeter",
            Self::AbstractionVolumes => "abstractionVolumes",
        }
    }
}

impl FromStr for ReturnMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oneMeter" => Ok(Self::OneMeter),
            "abstractionVolumes" => Ok(Self::AbstractionVolumes),
            _ => Err(format!("Unknown return method '{s}'")),
        }
    }
}

/// Length of each line on a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Daily lines.
    Day,
    /// Weekly lines.
    Week,
    /// Monthly lines.
    Month,
    /// Quarterly lines.
    Quarter,
    /// Annual lines.
    Year,
}

/// Lifecycle status of a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    /// Awaiting submission.
    #[default]
    Due,
    /// A paper return has been received but not yet keyed in.
    Received,
    /// Submitted.
    Completed,
}

/// What a member of staff chose to do with a return on the routing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAction {
    /// Key in the return contents.
    Submit,
    /// Only record that a paper return was received.
    LogReceipt,
}

impl RoutingAction {
    /// Converts this action to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::LogReceipt => "log_receipt",
        }
    }
}

impl FromStr for RoutingAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submit" => Ok(Self::Submit),
            "log_receipt" => Ok(Self::LogReceipt),
            _ => Err(format!("Unknown routing action '{s}'")),
        }
    }
}

/// Who a paper return form is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RecipientRole {
    /// The licence holder's address.
    #[default]
    LicenceHolder,
    /// The returns contact registered on the licence.
    ReturnsTo,
    /// A one-off address entered by staff.
    OneTimeAddress,
}

impl RecipientRole {
    /// Converts this role to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LicenceHolder => "licenceHolder",
            Self::ReturnsTo => "returnsTo",
            Self::OneTimeAddress => "oneTimeAddress",
        }
    }
}

impl FromStr for RecipientRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "licenceHolder" => Ok(Self::LicenceHolder),
            "returnsTo" => Ok(Self::ReturnsTo),
            "oneTimeAddress" => Ok(Self::OneTimeAddress),
            _ => Err(format!("Unknown recipient role '{s}'")),
        }
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    /// First address line.
    pub address_line_1: String,
    /// Second address line.
    #[serde(default)]
    pub address_line_2: Option<String>,
    /// Town or city.
    pub town: String,
    /// County.
    #[serde(default)]
    pub county: Option<String>,
    /// Postcode.
    pub postcode: String,
}

/// A named contact with an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Full name of the contact or organisation.
    pub name: String,
    /// Postal address.
    pub address: Address,
}
