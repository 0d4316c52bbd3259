// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod charge;
pub mod dates;
mod error;
mod returns;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use charge::{
    AbstractionPeriod, BillingAccount, ChangeReason, ChargeElement, Loss, Season, Source,
};
pub use dates::{format_iso_date, is_within, parse_iso_date};
pub use error::DomainError;
pub use returns::{Meter, Reading, ReturnLine, ReturnModel};
pub use types::{
    Address, Contact, DocumentId, Frequency, LicenceId, LicenceNumber, RecipientRole, ReturnId,
    ReturnMethod, ReturnStatus, RoutingAction, Units,
};
pub use validation::{
    validate_billing_account_number, validate_meter_readings, validate_period_within,
    validate_quantities,
};
