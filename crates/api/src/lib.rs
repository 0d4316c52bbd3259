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
    clippy::all
)]

mod backend;
mod error;
pub mod handlers;
mod licence_titles;
mod request_response;
mod session;
pub mod session_forms;

#[cfg(test)]
mod tests;

pub use backend::{AbstractionPurpose, BackendFixture, LicenceRecord, LocalBackend};
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_form_error,
    translate_schema_error,
};
pub use licence_titles::LicenceTitles;
pub use request_response::{PageOutcome, Redirect, ViewModel};
pub use session::SessionData;
