// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Paper return form notifications.
//!
//! Staff pick licences, choose which due returns to send forms for and who
//! should receive them. The answers build up in a map of CRM document id to
//! `PaperFormDocument`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;
use water_abstraction_domain::dates::iso_date;
use water_abstraction_domain::{
    Address, Contact, DocumentId, LicenceNumber, RecipientRole, ReturnId,
};

/// A due return that a paper form may be sent for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperFormReturn {
    /// Return identifier.
    pub return_id: ReturnId,
    /// First day of the return period.
    #[serde(with = "iso_date")]
    pub start_date: Date,
    /// Last day of the return period.
    #[serde(with = "iso_date")]
    pub end_date: Date,
    /// Whether a form will be sent for this return.
    #[serde(default)]
    pub is_selected: bool,
}

/// A one-off recipient entered by staff.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OneTimeAddress {
    /// Recipient name.
    pub full_name: String,
    /// Address, once entered.
    #[serde(default)]
    pub address: Option<Address>,
}

/// Paper form answers for one licence document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperFormDocument {
    /// CRM document id.
    pub document_id: DocumentId,
    /// Licence the document belongs to.
    pub licence_number: LicenceNumber,
    /// Licence holder contact.
    pub licence_holder: Contact,
    /// Returns contact, if the licence has one.
    #[serde(default)]
    pub returns_to: Option<Contact>,
    /// Due returns on the licence.
    #[serde(default)]
    pub returns: Vec<PaperFormReturn>,
    /// Who the forms go to.
    #[serde(default)]
    pub selected_role: RecipientRole,
    /// One-off recipient, when chosen.
    #[serde(default)]
    pub one_time_address: Option<OneTimeAddress>,
}

impl PaperFormDocument {
    /// Creates a document entry with every return selected.
    #[must_use]
    pub fn new(
        document_id: DocumentId,
        licence_number: LicenceNumber,
        licence_holder: Contact,
        returns_to: Option<Contact>,
        returns: Vec<PaperFormReturn>,
    ) -> Self {
        let returns: Vec<PaperFormReturn> = returns
            .into_iter()
            .map(|r| PaperFormReturn {
                is_selected: true,
                ..r
            })
            .collect();
        Self {
            document_id,
            licence_number,
            licence_holder,
            returns_to,
            returns,
            selected_role: RecipientRole::LicenceHolder,
            one_time_address: None,
        }
    }

    /// Returns that will get a paper form.
    pub fn selected_returns(&self) -> impl Iterator<Item = &PaperFormReturn> {
        self.returns.iter().filter(|r| r.is_selected)
    }

    /// The contact the forms are addressed to, once fully known.
    #[must_use]
    pub fn recipient(&self) -> Option<Contact> {
        match self.selected_role {
            RecipientRole::LicenceHolder => Some(self.licence_holder.clone()),
            RecipientRole::ReturnsTo => self.returns_to.clone(),
            RecipientRole::OneTimeAddress => {
                let one_time: &OneTimeAddress = self.one_time_address.as_ref()?;
                Some(Contact {
                    name: one_time.full_name.clone(),
                    address: one_time.address.clone()?,
                })
            }
        }
    }
}

/// Paper form state keyed by document id.
pub type PaperFormsState = BTreeMap<DocumentId, PaperFormDocument>;

/// Actions that update paper form state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PaperFormsAction {
    /// Replaces the state with the documents found for the chosen licences.
    SetInitialState {
        /// Documents with their due returns.
        documents: Vec<PaperFormDocument>,
    },
    /// Selects exactly the given returns on a document.
    SetReturnsSelected {
        /// Document to update.
        document_id: DocumentId,
        /// Returns to select; every other return is deselected.
        return_ids: Vec<ReturnId>,
    },
    /// Chooses who receives the forms for a document.
    SetSelectedRole {
        /// Document to update.
        document_id: DocumentId,
        /// Chosen recipient.
        role: RecipientRole,
    },
    /// Names the one-off recipient for a document.
    SetOneTimeAddressName {
        /// Document to update.
        document_id: DocumentId,
        /// Recipient name.
        full_name: String,
    },
    /// Sets the one-off recipient's address for a document.
    SetOneTimeAddress {
        /// Document to update.
        document_id: DocumentId,
        /// Address.
        address: Address,
    },
    /// Empties the state.
    ClearData,
    /// Any unrecognised action type.
    #[serde(other)]
    Unknown,
}

/// Folds an action into paper form state.
///
/// Actions naming a document that is not in the state leave it unchanged.
#[must_use]
pub fn reduce_paper_forms(state: &PaperFormsState, action: PaperFormsAction) -> PaperFormsState {
    match action {
        PaperFormsAction::SetInitialState { documents } => documents
            .into_iter()
            .map(|doc| (doc.document_id.clone(), doc))
            .collect(),
        PaperFormsAction::SetReturnsSelected {
            document_id,
            return_ids,
        } => update_document(state, &document_id, |doc| {
            for ret in &mut doc.returns {
                ret.is_selected = return_ids.contains(&ret.return_id);
            }
        }),
        PaperFormsAction::SetSelectedRole { document_id, role } => {
            update_document(state, &document_id, |doc| {
                doc.selected_role = role;
                if role != RecipientRole::OneTimeAddress {
                    doc.one_time_address = None;
                }
            })
        }
        PaperFormsAction::SetOneTimeAddressName {
            document_id,
            full_name,
        } => update_document(state, &document_id, |doc| {
            doc.selected_role = RecipientRole::OneTimeAddress;
            doc.one_time_address = Some(OneTimeAddress {
                full_name,
                address: None,
            });
        }),
        PaperFormsAction::SetOneTimeAddress {
            document_id,
            address,
        } => update_document(state, &document_id, |doc| {
            let mut one_time: OneTimeAddress = doc.one_time_address.take().unwrap_or_default();
            one_time.address = Some(address);
            doc.one_time_address = Some(one_time);
        }),
        PaperFormsAction::ClearData => PaperFormsState::new(),
        PaperFormsAction::Unknown => state.clone(),
    }
}

fn update_document<F>(state: &PaperFormsState, document_id: &DocumentId, update: F) -> PaperFormsState
where
    F: FnOnce(&mut PaperFormDocument),
{
    let mut next: PaperFormsState = state.clone();
    if let Some(doc) = next.get_mut(document_id) {
        update(doc);
    }
    next
}
