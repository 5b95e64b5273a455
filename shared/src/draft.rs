//! Receipt draft: recipient, selection and signature of one open form

use crate::errors::DraftError;
use crate::grouping::{available_groups, search_groups, GroupKey, ItemGroup};
use crate::models::{find_user, InventoryUnit, Receipt, User};
use crate::reconciler::{ReconcileResult, Reconciler, Reconciliation};
use crate::selection::{SelectionEntry, SelectionModel, SelectionRow};
use crate::snapshot::InventorySnapshot;
use crate::submission::{CreateReceiptRequest, Submission, SubmissionConflict, UpdateReceiptRequest};
use crate::types::{ReceiptId, UnitId, UserId};
use crate::validation::validate_signature;

/// Which backend call the draft ends in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftMode {
    /// Issue a new receipt
    Create { require_signature: bool },
    /// Edit the items of an existing receipt
    Update { receipt_id: ReceiptId },
}

/// State of one receipt form, owned by exactly one open form instance
#[derive(Debug, Clone)]
pub struct ReceiptDraft {
    mode: DraftMode,
    snapshot: InventorySnapshot,
    /// Units already on the receipt being edited; re-merged on every refresh
    owned: Vec<InventoryUnit>,
    selection: SelectionModel,
    recipient: Option<UserId>,
    signature: Option<String>,
    conflict: Option<SubmissionConflict>,
}

impl ReceiptDraft {
    pub fn for_create(snapshot: InventorySnapshot, require_signature: bool) -> Self {
        Self {
            mode: DraftMode::Create { require_signature },
            snapshot,
            owned: Vec::new(),
            selection: SelectionModel::new(),
            recipient: None,
            signature: None,
            conflict: None,
        }
    }

    /// Start editing an existing receipt with its current units preselected
    pub fn for_update(receipt: &Receipt, available: InventorySnapshot) -> Self {
        let mut snapshot = available;
        snapshot.merge_owned(receipt.items.clone());

        let mut selection = SelectionModel::new();
        for unit in &receipt.items {
            selection.push(unit.clone());
        }

        Self {
            mode: DraftMode::Update {
                receipt_id: receipt.id.clone(),
            },
            snapshot,
            owned: receipt.items.clone(),
            selection,
            recipient: Some(receipt.recipient.id.clone()),
            signature: None,
            conflict: None,
        }
    }

    pub fn mode(&self) -> &DraftMode {
        &self.mode
    }

    pub fn snapshot(&self) -> &InventorySnapshot {
        &self.snapshot
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn recipient(&self) -> Option<&UserId> {
        self.recipient.as_ref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// The unresolved conflict of the last submission, if any
    pub fn conflict(&self) -> Option<&SubmissionConflict> {
        self.conflict.as_ref()
    }

    // ------------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------------

    pub fn add_to_group(&mut self, key: &GroupKey, requested: usize) -> ReconcileResult {
        Reconciler::new(&self.snapshot).add_to_group(&mut self.selection, key, requested)
    }

    pub fn set_group_quantity(&mut self, key: &GroupKey, quantity: usize) -> ReconcileResult {
        Reconciler::new(&self.snapshot).set_group_quantity(&mut self.selection, key, quantity)
    }

    pub fn remove_group(&mut self, key: &GroupKey) -> Reconciliation {
        Reconciler::new(&self.snapshot).remove_group(&mut self.selection, key)
    }

    pub fn add_cipher_unit(&mut self, unit_id: &UnitId) -> ReconcileResult {
        Reconciler::new(&self.snapshot).add_cipher_unit(&mut self.selection, unit_id)
    }

    pub fn remove_cipher_unit(&mut self, unit_id: &UnitId) -> ReconcileResult {
        Reconciler::new(&self.snapshot).remove_cipher_unit(&mut self.selection, unit_id)
    }

    /// Groups still offered by the item selector
    pub fn available_groups(&self) -> Vec<ItemGroup> {
        available_groups(&self.snapshot, &self.selection)
    }

    pub fn search(&self, query: &str) -> Vec<ItemGroup> {
        search_groups(&self.available_groups(), query)
    }

    pub fn rows(&self) -> Vec<SelectionRow> {
        self.selection.rows()
    }

    // ------------------------------------------------------------------------
    // Recipient and signature
    // ------------------------------------------------------------------------

    /// Pick the recipient from the injected user list
    pub fn select_recipient<'u>(&mut self, user_id: &UserId, users: &'u [User]) -> Result<&'u User, DraftError> {
        let user = find_user(users, user_id).ok_or_else(|| DraftError::UnknownRecipient(user_id.clone()))?;
        self.recipient = Some(user.id.clone());
        Ok(user)
    }

    pub fn set_signature(&mut self, data_url: impl Into<String>) -> Result<(), DraftError> {
        if !matches!(self.mode, DraftMode::Create { .. }) {
            return Err(DraftError::SignatureNotAccepted);
        }
        let data_url = data_url.into();
        validate_signature(&data_url).map_err(DraftError::InvalidSignature)?;
        self.signature = Some(data_url);
        Ok(())
    }

    pub fn clear_signature(&mut self) {
        self.signature = None;
    }

    // ------------------------------------------------------------------------
    // Submission lifecycle
    // ------------------------------------------------------------------------

    /// Flatten the draft into the payload for the backend
    pub fn submission(&self) -> Result<Submission, DraftError> {
        if self.conflict.is_some() {
            return Err(DraftError::StaleSnapshot);
        }
        let recipient_user_id = self.recipient.clone().ok_or(DraftError::MissingRecipient)?;
        if self.selection.is_empty() {
            return Err(DraftError::EmptySelection);
        }
        let item_ids = self.selection.item_ids();

        match &self.mode {
            DraftMode::Create { require_signature } => {
                if *require_signature && self.signature.is_none() {
                    return Err(DraftError::MissingSignature);
                }
                Ok(Submission::Create {
                    request: CreateReceiptRequest {
                        recipient_user_id,
                        item_ids,
                        signature: self.signature.clone(),
                    },
                })
            }
            DraftMode::Update { receipt_id } => Ok(Submission::Update {
                receipt_id: receipt_id.clone(),
                request: UpdateReceiptRequest {
                    recipient_user_id,
                    item_ids,
                },
            }),
        }
    }

    /// Keep the selection as is and block resubmission until a refresh
    pub fn record_conflict(&mut self, conflict: SubmissionConflict) {
        self.conflict = Some(conflict);
    }

    /// Replace the snapshot after an explicit refresh
    ///
    /// Selected units that are missing or no longer operational in the new
    /// snapshot are dropped and returned so the form can tell the user. The
    /// rest are re-read from the new snapshot, so a unit the backend now
    /// reports elsewhere moves to its new group.
    pub fn refresh_snapshot(&mut self, available: InventorySnapshot) -> Vec<SelectionEntry> {
        let mut snapshot = available;
        snapshot.merge_owned(self.owned.clone());

        let pruned = self.selection.remove_where(|entry| {
            snapshot
                .get(entry.id())
                .map_or(true, |unit| {
                    !unit.is_operational && !self.owned.iter().any(|o| o.id == unit.id)
                })
        });
        self.selection.refresh_units(|id| snapshot.get(id));

        self.snapshot = snapshot;
        self.conflict = None;
        pruned
    }

    /// Full manual reset of the form
    pub fn reset(&mut self) {
        self.selection.clear();
        self.recipient = None;
        self.signature = None;
        self.conflict = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::UnavailableItem;
    use crate::test_support::{cipher_unit, helmets_snapshot, plain_unit, snapshot_of};
    use crate::validation::signature_data_url;
    use chrono::Utc;

    fn users() -> Vec<User> {
        vec![User {
            id: UserId::new("u1"),
            name: "Dana".to_string(),
            personal_number: Some("1234567".to_string()),
            unit_name: None,
        }]
    }

    fn png_signature() -> String {
        signature_data_url(b"\x89PNG\r\n\x1a\n....")
    }

    fn helmet_key() -> GroupKey {
        GroupKey::fungible("Helmet", Some("Base1"))
    }

    #[test]
    fn test_create_submission_flattens_selection() {
        let mut units = helmets_snapshot().units().to_vec();
        units.push(cipher_unit("c1", "Radio", Some("Base1")));
        let mut draft = ReceiptDraft::for_create(snapshot_of(units), true);

        draft.add_to_group(&helmet_key(), 1).unwrap();
        draft.add_cipher_unit(&UnitId::new("c1")).unwrap();
        draft.select_recipient(&UserId::new("u1"), &users()).unwrap();
        draft.set_signature(png_signature()).unwrap();

        let Submission::Create { request } = draft.submission().unwrap() else {
            panic!("expected a create submission");
        };
        assert_eq!(request.recipient_user_id, UserId::new("u1"));
        assert_eq!(request.item_ids, vec![UnitId::new("h1"), UnitId::new("c1")]);
        assert_eq!(request.signature, Some(png_signature()));
    }

    #[test]
    fn test_submission_requires_recipient_items_and_signature() {
        let mut draft = ReceiptDraft::for_create(helmets_snapshot(), true);
        assert_eq!(draft.submission(), Err(DraftError::MissingRecipient));

        draft.select_recipient(&UserId::new("u1"), &users()).unwrap();
        assert_eq!(draft.submission(), Err(DraftError::EmptySelection));

        draft.add_to_group(&helmet_key(), 1).unwrap();
        assert_eq!(draft.submission(), Err(DraftError::MissingSignature));

        let mut unsigned = ReceiptDraft::for_create(helmets_snapshot(), false);
        unsigned.select_recipient(&UserId::new("u1"), &users()).unwrap();
        unsigned.add_to_group(&helmet_key(), 1).unwrap();
        assert!(unsigned.submission().is_ok());
    }

    #[test]
    fn test_unknown_recipient_is_rejected() {
        let mut draft = ReceiptDraft::for_create(helmets_snapshot(), false);
        let users = users();
        let result = draft.select_recipient(&UserId::new("ghost"), &users);
        assert_eq!(result, Err(DraftError::UnknownRecipient(UserId::new("ghost"))));
        assert_eq!(draft.recipient(), None);
    }

    #[test]
    fn test_invalid_signature_is_not_stored() {
        let mut draft = ReceiptDraft::for_create(helmets_snapshot(), true);
        assert!(matches!(
            draft.set_signature("data:image/png;base64,AAAA"),
            Err(DraftError::InvalidSignature(_))
        ));
        assert_eq!(draft.signature(), None);
    }

    #[test]
    fn test_conflict_keeps_selection_and_blocks_resubmit() {
        let mut units = helmets_snapshot().units().to_vec();
        units.push(cipher_unit("c1", "Radio", Some("Base1")));
        let mut draft = ReceiptDraft::for_create(snapshot_of(units), false);
        draft.select_recipient(&UserId::new("u1"), &users()).unwrap();
        draft.add_to_group(&helmet_key(), 1).unwrap();
        draft.add_cipher_unit(&UnitId::new("c1")).unwrap();

        draft.record_conflict(SubmissionConflict {
            unavailable: vec![UnavailableItem {
                id: UnitId::new("h1"),
                name: Some("Helmet".to_string()),
                id_number: None,
            }],
            server_message: None,
        });

        assert_eq!(draft.conflict().unwrap().unavailable_ids(), vec![UnitId::new("h1")]);
        assert_eq!(draft.selection().item_ids(), vec![UnitId::new("h1"), UnitId::new("c1")]);
        assert_eq!(draft.submission(), Err(DraftError::StaleSnapshot));

        // h1 was claimed elsewhere, the refreshed snapshot no longer has it
        let pruned = draft.refresh_snapshot(snapshot_of(vec![
            plain_unit("h2", "Helmet", Some("Base1")),
            cipher_unit("c1", "Radio", Some("Base1")),
        ]));

        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0].id(), &UnitId::new("h1"));
        assert_eq!(draft.selection().item_ids(), vec![UnitId::new("c1")]);
        assert!(draft.conflict().is_none());
        assert!(draft.submission().is_ok());
    }

    #[test]
    fn test_update_draft_preselects_receipt_items() {
        let receipt = Receipt {
            id: ReceiptId::new("r1"),
            recipient: users().remove(0),
            items: vec![
                plain_unit("h8", "Helmet", Some("Base1")),
                cipher_unit("c9", "Radio", None),
            ],
            status: Default::default(),
            created_at: Utc::now(),
            updated_at: None,
        };
        let mut draft = ReceiptDraft::for_update(&receipt, helmets_snapshot());

        assert_eq!(draft.recipient(), Some(&UserId::new("u1")));
        assert_eq!(draft.rows()[0].quantity, 1);

        // The owned helmet and the three available ones form one group of four
        let outcome = draft.set_group_quantity(&helmet_key(), 4).unwrap();
        assert_eq!(outcome.quantity, 4);
        assert_eq!(outcome.notice, None);

        // Returning the radio is a removal from the receipt
        draft.remove_cipher_unit(&UnitId::new("c9")).unwrap();
        assert_eq!(draft.set_signature(png_signature()), Err(DraftError::SignatureNotAccepted));

        let Submission::Update { receipt_id, request } = draft.submission().unwrap() else {
            panic!("expected an update submission");
        };
        assert_eq!(receipt_id, ReceiptId::new("r1"));
        assert_eq!(request.item_ids.len(), 4);
        assert!(!request.item_ids.contains(&UnitId::new("c9")));

        // Units owned by the receipt survive a refresh even though the backend
        // never lists them as available
        let pruned = draft.refresh_snapshot(helmets_snapshot());
        assert!(pruned.is_empty());
    }

    #[test]
    fn test_refresh_moves_kept_units_to_their_new_group() {
        let mut draft = ReceiptDraft::for_create(
            snapshot_of(vec![
                plain_unit("h1", "Helmet", Some("Base1")),
                plain_unit("h2", "Helmet", Some("Base1")),
            ]),
            false,
        );
        draft.add_to_group(&helmet_key(), 1).unwrap();

        let pruned = draft.refresh_snapshot(snapshot_of(vec![
            plain_unit("h1", "Helmet", Some("Base2")),
            plain_unit("h2", "Helmet", Some("Base2")),
        ]));
        assert!(pruned.is_empty());

        let base2 = GroupKey::fungible("Helmet", Some("Base2"));
        let rows = draft.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, base2);
        assert_eq!(rows[0].location_label.as_deref(), Some("Base2"));
        assert_eq!(draft.selection().count_for(&helmet_key()), 0);

        let outcome = draft.set_group_quantity(&base2, 2).unwrap();
        assert_eq!(outcome.quantity, 2);
        assert_eq!(outcome.notice, None);
        assert_eq!(draft.rows().len(), 1);
        assert_eq!(draft.rows()[0].quantity, 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut draft = ReceiptDraft::for_create(helmets_snapshot(), true);
        draft.select_recipient(&UserId::new("u1"), &users()).unwrap();
        draft.add_to_group(&helmet_key(), 2).unwrap();
        draft.set_signature(png_signature()).unwrap();

        draft.reset();

        assert!(draft.selection().is_empty());
        assert_eq!(draft.recipient(), None);
        assert_eq!(draft.signature(), None);
        assert_eq!(draft.available_groups()[0].available, 3);
    }

    #[test]
    fn test_search_excludes_selected_units() {
        let mut draft = ReceiptDraft::for_create(helmets_snapshot(), false);
        draft.add_to_group(&helmet_key(), 3).unwrap();
        assert!(draft.search("helmet").is_empty());
    }
}
