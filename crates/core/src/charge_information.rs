// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Charge information drafts.
//!
//! A draft charge version is built up page by page for one licence before it
//! is sent for review.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;
use water_abstraction_domain::dates::iso_date;
use water_abstraction_domain::{
    AbstractionPeriod, BillingAccount, ChangeReason, ChargeElement, LicenceId, LicenceNumber,
    Loss, Season, Source,
};

/// A draft charge version for one licence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeInformationDraft {
    /// Licence the draft belongs to.
    pub licence_id: LicenceId,
    /// Licence number, once known.
    #[serde(default)]
    pub licence_number: Option<LicenceNumber>,
    /// Reason for the new charge version.
    #[serde(default)]
    pub change_reason: Option<ChangeReason>,
    /// Date the charge version takes effect.
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    /// Account the charges are invoiced to.
    #[serde(default)]
    pub billing_account: Option<BillingAccount>,
    /// Charge elements in entry order.
    #[serde(default)]
    pub charge_elements: Vec<ChargeElement>,
    /// Free text note for the reviewer.
    #[serde(default)]
    pub note: Option<String>,
}

impl ChargeInformationDraft {
    /// Creates an empty draft.
    #[must_use]
    pub const fn new(licence_id: LicenceId) -> Self {
        Self {
            licence_id,
            licence_number: None,
            change_reason: None,
            start_date: None,
            billing_account: None,
            charge_elements: Vec::new(),
            note: None,
        }
    }

    /// Looks up a charge element.
    #[must_use]
    pub fn charge_element(&self, id: Uuid) -> Option<&ChargeElement> {
        self.charge_elements.iter().find(|e| e.id == id)
    }
}

/// A partial update to a charge element. Unset fields are left alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChargeElementData {
    /// Purpose use code.
    #[serde(default)]
    pub purpose: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Abstraction period.
    #[serde(default)]
    pub abstraction_period: Option<AbstractionPeriod>,
    /// Authorised annual quantity.
    #[serde(default)]
    pub authorised_annual_quantity: Option<f64>,
    /// Billable annual quantity.
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

impl ChargeElementData {
    fn merge_into(self, element: &mut ChargeElement) {
        if self.purpose.is_some() {
            element.purpose = self.purpose;
        }
        if self.description.is_some() {
            element.description = self.description;
        }
        if self.abstraction_period.is_some() {
            element.abstraction_period = self.abstraction_period;
        }
        if self.authorised_annual_quantity.is_some() {
            element.authorised_annual_quantity = self.authorised_annual_quantity;
        }
        if self.billable_annual_quantity.is_some() {
            element.billable_annual_quantity = self.billable_annual_quantity;
        }
        if self.source.is_some() {
            element.source = self.source;
        }
        if self.season.is_some() {
            element.season = self.season;
        }
        if self.loss.is_some() {
            element.loss = self.loss;
        }
    }
}

/// Actions that update a charge information draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChargeInformationAction {
    /// Starts a new draft for a licence.
    SetInitialState {
        /// Licence id.
        licence_id: LicenceId,
        /// Licence number.
        licence_number: LicenceNumber,
    },
    /// Sets the change reason.
    SetChangeReason {
        /// Chosen reason.
        reason: ChangeReason,
    },
    /// Sets the effective date.
    SetStartDate {
        /// Start date.
        #[serde(with = "iso_date")]
        date: Date,
    },
    /// Sets the billing account.
    SetBillingAccount {
        /// Chosen account.
        account: BillingAccount,
    },
    /// Replaces the charge elements with ones derived from the licence's
    /// abstraction data.
    SetAbstractionData {
        /// Derived elements.
        charge_elements: Vec<ChargeElement>,
    },
    /// Appends an empty charge element.
    CreateChargeElement {
        /// Identifier for the new element.
        id: Uuid,
    },
    /// Updates one charge element.
    SetChargeElementData {
        /// Element to update.
        id: Uuid,
        /// Fields to set.
        data: ChargeElementData,
    },
    /// Removes one charge element.
    RemoveChargeElement {
        /// Element to remove.
        id: Uuid,
    },
    /// Sets or clears the reviewer note.
    SetNote {
        /// Note text, `None` to clear.
        note: Option<String>,
    },
    /// Discards every answer, keeping the licence.
    ClearData,
    /// Any unrecognised action type.
    #[serde(other)]
    Unknown,
}

/// Folds an action into a charge information draft.
#[must_use]
pub fn reduce_charge_information(
    state: &ChargeInformationDraft,
    action: ChargeInformationAction,
) -> ChargeInformationDraft {
    let mut next: ChargeInformationDraft = state.clone();
    match action {
        ChargeInformationAction::SetInitialState {
            licence_id,
            licence_number,
        } => {
            next = ChargeInformationDraft::new(licence_id);
            next.licence_number = Some(licence_number);
        }
        ChargeInformationAction::SetChangeReason { reason } => {
            next.change_reason = Some(reason);
        }
        ChargeInformationAction::SetStartDate { date } => {
            next.start_date = Some(date);
        }
        ChargeInformationAction::SetBillingAccount { account } => {
            next.billing_account = Some(account);
        }
        ChargeInformationAction::SetAbstractionData { charge_elements } => {
            next.charge_elements = charge_elements;
        }
        ChargeInformationAction::CreateChargeElement { id } => {
            if next.charge_element(id).is_none() {
                next.charge_elements.push(ChargeElement::new(id));
            }
        }
        ChargeInformationAction::SetChargeElementData { id, data } => {
            if let Some(element) = next.charge_elements.iter_mut().find(|e| e.id == id) {
                data.merge_into(element);
            }
        }
        ChargeInformationAction::RemoveChargeElement { id } => {
            next.charge_elements.retain(|e| e.id != id);
        }
        ChargeInformationAction::SetNote { note } => {
            next.note = note.filter(|n| !n.trim().is_empty());
        }
        ChargeInformationAction::ClearData => {
            let licence_number: Option<LicenceNumber> = next.licence_number.take();
            next = ChargeInformationDraft::new(state.licence_id.clone());
            next.licence_number = licence_number;
        }
        ChargeInformationAction::Unknown => {}
    }
    next
}
