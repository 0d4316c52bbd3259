// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde_json::json;
use water_abstraction_domain::{Address, DocumentId, RecipientRole, ReturnId};

use crate::tests::helpers::{create_test_contact, create_test_document};
use crate::{PaperFormsAction, PaperFormsState, reduce_paper_forms};

fn initial_state() -> PaperFormsState {
    reduce_paper_forms(
        &PaperFormsState::new(),
        PaperFormsAction::SetInitialState {
            documents: vec![create_test_document("doc-1"), create_test_document("doc-2")],
        },
    )
}

#[test]
fn test_set_initial_state_selects_every_return() {
    let state: PaperFormsState = initial_state();
    assert_eq!(state.len(), 2);
    let doc = &state[&DocumentId::new("doc-1")];
    assert!(doc.returns.iter().all(|r| r.is_selected));
    assert_eq!(doc.selected_role, RecipientRole::LicenceHolder);
}

#[test]
fn test_set_returns_selected_updates_only_target_document() {
    let state: PaperFormsState = initial_state();
    let next: PaperFormsState = reduce_paper_forms(
        &state,
        PaperFormsAction::SetReturnsSelected {
            document_id: DocumentId::new("doc-1"),
            return_ids: vec![ReturnId::new("return-2")],
        },
    );

    let doc = &next[&DocumentId::new("doc-1")];
    assert!(!doc.returns[0].is_selected);
    assert!(doc.returns[1].is_selected);
    assert_eq!(doc.selected_returns().count(), 1);
    assert_eq!(next[&DocumentId::new("doc-2")], state[&DocumentId::new("doc-2")]);
}

#[test]
fn test_set_returns_selected_on_unknown_document_is_noop() {
    let state: PaperFormsState = initial_state();
    let next: PaperFormsState = reduce_paper_forms(
        &state,
        PaperFormsAction::SetReturnsSelected {
            document_id: DocumentId::new("missing"),
            return_ids: Vec::new(),
        },
    );
    assert_eq!(next, state);
}

#[test]
fn test_recipient_follows_selected_role() {
    let state: PaperFormsState = initial_state();
    let id: DocumentId = DocumentId::new("doc-1");

    let returns_to: PaperFormsState = reduce_paper_forms(
        &state,
        PaperFormsAction::SetSelectedRole {
            document_id: id.clone(),
            role: RecipientRole::ReturnsTo,
        },
    );
    assert_eq!(
        returns_to[&id].recipient(),
        Some(create_test_contact("Returns Person"))
    );

    let named: PaperFormsState = reduce_paper_forms(
        &returns_to,
        PaperFormsAction::SetOneTimeAddressName {
            document_id: id.clone(),
            full_name: String::from("Jane Smith"),
        },
    );
    assert_eq!(named[&id].selected_role, RecipientRole::OneTimeAddress);
    assert_eq!(named[&id].recipient(), None);

    let address: Address = create_test_contact("ignored").address;
    let addressed: PaperFormsState = reduce_paper_forms(
        &named,
        PaperFormsAction::SetOneTimeAddress {
            document_id: id.clone(),
            address: address.clone(),
        },
    );
    let recipient = addressed[&id].recipient().unwrap();
    assert_eq!(recipient.name, "Jane Smith");
    assert_eq!(recipient.address, address);
}

#[test]
fn test_choosing_another_role_drops_one_time_address() {
    let id: DocumentId = DocumentId::new("doc-1");
    let named: PaperFormsState = reduce_paper_forms(
        &initial_state(),
        PaperFormsAction::SetOneTimeAddressName {
            document_id: id.clone(),
            full_name: String::from("Jane Smith"),
        },
    );
    let next: PaperFormsState = reduce_paper_forms(
        &named,
        PaperFormsAction::SetSelectedRole {
            document_id: id.clone(),
            role: RecipientRole::LicenceHolder,
        },
    );
    assert_eq!(next[&id].one_time_address, None);
}

#[test]
fn test_clear_data_empties_state() {
    assert!(reduce_paper_forms(&initial_state(), PaperFormsAction::ClearData).is_empty());
}

#[test]
fn test_unknown_action_returns_state_unchanged() {
    let state: PaperFormsState = initial_state();
    let action: PaperFormsAction =
        serde_json::from_value(json!({ "type": "somethingElse", "payload": 1 })).unwrap();
    assert_eq!(action, PaperFormsAction::Unknown);
    assert_eq!(reduce_paper_forms(&state, action), state);
}

#[test]
fn test_actions_deserialize_from_tagged_json() {
    let action: PaperFormsAction = serde_json::from_value(json!({
        "type": "setSelectedRole",
        "document_id": "doc-1",
        "role": "returnsTo"
    }))
    .unwrap();
    assert_eq!(
        action,
        PaperFormsAction::SetSelectedRole {
            document_id: DocumentId::new("doc-1"),
            role: RecipientRole::ReturnsTo,
        }
    );
}
