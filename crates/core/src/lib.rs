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

mod charge_information;
mod error;
pub mod flow;
mod notifications;
mod returns;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use charge_information::{
    ChargeElementData, ChargeInformationAction, ChargeInformationDraft, reduce_charge_information,
};
pub use error::CoreError;
pub use flow::{
    ExternalJourney, ExternalStep, FlowAnswers, InternalJourney, InternalStep, Journey,
    JourneyKind,
};
pub use notifications::{
    OneTimeAddress, PaperFormDocument, PaperFormReturn, PaperFormsAction, PaperFormsState,
    reduce_paper_forms,
};
pub use returns::{ReturnCommand, apply_return_command};

/// Session key for paper form notification state.
pub const PAPER_FORMS_SESSION_KEY: &str = "returns.paper-forms";

/// Session key for a licence's charge information draft.
#[must_use]
pub fn charge_information_session_key(licence_id: &water_abstraction_domain::LicenceId) -> String {
    format!("chargeInformation.{licence_id}")
}

/// Session key for a return being completed.
#[must_use]
pub fn return_session_key(return_id: &water_abstraction_domain::ReturnId) -> String {
    format!("returns.{return_id}")
}
