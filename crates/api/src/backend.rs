// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-process stand-in for the licensing backend services.
//!
//! Holds the returns, licences and licence holder documents the wizards read,
//! loaded from a JSON fixture. Submitted returns are written back to it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;
use water_abstraction::PaperFormDocument;
use water_abstraction_domain::{
    AbstractionPeriod, BillingAccount, ChangeReason, ChargeElement, LicenceId, LicenceNumber,
    ReturnId, ReturnModel,
};

use crate::error::ApiError;

/// One abstraction purpose on a licence, used to pre-fill charge elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractionPurpose {
    /// Purpose use code.
    pub purpose: String,
    /// Description.
    pub description: String,
    /// Abstraction period.
    #[serde(default)]
    pub abstraction_period: Option<AbstractionPeriod>,
    /// Authorised annual quantity in megalitres.
    #[serde(default)]
    pub authorised_annual_quantity: Option<f64>,
}

impl AbstractionPurpose {
    /// Builds a charge element pre-filled from this purpose.
    #[must_use]
    pub fn to_charge_element(&self, id: Uuid) -> ChargeElement {
        let mut element: ChargeElement = ChargeElement::new(id);
        element.purpose = Some(self.purpose.clone());
        element.description = Some(self.description.clone());
        element.abstraction_period = self.abstraction_period;
        element.authorised_annual_quantity = self.authorised_annual_quantity;
        element.billable_annual_quantity = self.authorised_annual_quantity;
        element
    }
}

/// A licence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenceRecord {
    /// Licence id.
    pub licence_id: LicenceId,
    /// Licence number.
    pub licence_number: LicenceNumber,
    /// Current abstraction purposes.
    #[serde(default)]
    pub purposes: Vec<AbstractionPurpose>,
}

/// The fixture file layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BackendFixture {
    /// Returns.
    #[serde(default)]
    pub returns: Vec<ReturnModel>,
    /// Licences.
    #[serde(default)]
    pub licences: Vec<LicenceRecord>,
    /// Licence holder documents with their due returns.
    #[serde(default)]
    pub documents: Vec<PaperFormDocument>,
    /// Change reasons offered for new charge versions.
    #[serde(default)]
    pub change_reasons: Vec<ChangeReason>,
    /// Billing accounts.
    #[serde(default)]
    pub billing_accounts: Vec<BillingAccount>,
}

/// Backend stand-in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalBackend {
    returns: BTreeMap<ReturnId, ReturnModel>,
    licences: BTreeMap<LicenceId, LicenceRecord>,
    documents: Vec<PaperFormDocument>,
    change_reasons: Vec<ChangeReason>,
    billing_accounts: Vec<BillingAccount>,
}

impl LocalBackend {
    /// Creates a backend from fixture data.
    #[must_use]
    pub fn new(fixture: BackendFixture) -> Self {
        Self {
            returns: fixture
                .returns
                .into_iter()
                .map(|r| (r.return_id.clone(), r))
                .collect(),
            licences: fixture
                .licences
                .into_iter()
                .map(|l| (l.licence_id.clone(), l))
                .collect(),
            documents: fixture.documents,
            change_reasons: fixture.change_reasons,
            billing_accounts: fixture.billing_accounts,
        }
    }

    /// Parses a JSON fixture.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` if the JSON does not match the fixture layout.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        let fixture: BackendFixture =
            serde_json::from_str(json).map_err(|e| ApiError::InvalidInput {
                field: String::from("fixtures"),
                message: format!("Invalid backend fixture: {e}"),
            })?;
        info!(
            returns = fixture.returns.len(),
            licences = fixture.licences.len(),
            documents = fixture.documents.len(),
            "Loaded backend fixture"
        );
        Ok(Self::new(fixture))
    }

    /// Reads a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let json: String = std::fs::read_to_string(path).map_err(|e| ApiError::Internal {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&json)
    }

    /// Looks up a return.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if there is no such return.
    pub fn get_return(&self, return_id: &ReturnId) -> Result<&ReturnModel, ApiError> {
        self.returns
            .get(return_id)
            .ok_or_else(|| ApiError::not_found("Return", format!("Return '{return_id}' does not exist")))
    }

    /// Stores a submitted return.
    pub fn submit_return(&mut self, model: ReturnModel) {
        info!(return_id = %model.return_id, status = ?model.status, "Return submitted");
        self.returns.insert(model.return_id.clone(), model);
    }

    /// Looks up a licence.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ResourceNotFound` if there is no such licence.
    pub fn get_licence(&self, licence_id: &LicenceId) -> Result<&LicenceRecord, ApiError> {
        self.licences.get(licence_id).ok_or_else(|| {
            ApiError::not_found("Licence", format!("Licence '{licence_id}' does not exist"))
        })
    }

    /// Documents for the given licence numbers that have due returns.
    #[must_use]
    pub fn documents_with_due_returns(
        &self,
        licence_numbers: &[LicenceNumber],
    ) -> Vec<PaperFormDocument> {
        self.documents
            .iter()
            .filter(|d| licence_numbers.contains(&d.licence_number) && !d.returns.is_empty())
            .cloned()
            .collect()
    }

    /// Change reasons.
    #[must_use]
    pub fn change_reasons(&self) -> &[ChangeReason] {
        &self.change_reasons
    }

    /// Looks up a billing account by account number.
    #[must_use]
    pub fn find_billing_account(&self, account_number: &str) -> Option<&BillingAccount> {
        self.billing_accounts
            .iter()
            .find(|a| a.account_number.eq_ignore_ascii_case(account_number.trim()))
    }
}
