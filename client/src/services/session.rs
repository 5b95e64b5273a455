//! Receipt session
//!
//! One open receipt form: the draft, the user list it picks recipients from
//! and the backend it submits to. Each session has its own id on every log
//! line so interleaved forms can be told apart.

use chrono::Utc;
use shared::{
    interpret_conflict, GroupKey, InventorySnapshot, InventoryUnit, Receipt, ReceiptDraft, ReceiptId,
    ReceiptStatus, Reconciliation, SelectionEntry, Submission, UnitId, User, UserId,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};
use crate::external::{InventorySource, ReceiptSink, UserDirectory};

/// Build a snapshot from a backend listing, reporting dropped duplicates
pub fn build_snapshot(units: Vec<InventoryUnit>) -> InventorySnapshot {
    let snapshot = InventorySnapshot::new(units, Utc::now());
    if snapshot.duplicates_dropped() > 0 {
        tracing::warn!(
            dropped = snapshot.duplicates_dropped(),
            "Backend listed the same item more than once"
        );
    }
    snapshot
}

pub struct ReceiptSession<'a, A> {
    api: &'a A,
    id: Uuid,
    span: tracing::Span,
    draft: ReceiptDraft,
    users: Vec<User>,
}

impl<'a, A> ReceiptSession<'a, A>
where
    A: InventorySource + UserDirectory + ReceiptSink,
{
    /// Open a form for issuing a new receipt
    pub async fn open_create(api: &'a A, require_signature: bool) -> ClientResult<Self> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("receipt_session", session_id = %id);

        async move {
            let (units, users) = tokio::try_join!(api.fetch_available(), api.fetch_users())?;
            let snapshot = build_snapshot(units);
            tracing::info!(items = snapshot.len(), users = users.len(), "Opened receipt form");

            Ok(Self {
                api,
                id,
                span: tracing::Span::current(),
                draft: ReceiptDraft::for_create(snapshot, require_signature),
                users,
            })
        }
        .instrument(span)
        .await
    }

    /// Open a form editing the items of an existing receipt
    pub async fn open_update(api: &'a A, receipt_id: &ReceiptId) -> ClientResult<Self> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("receipt_session", session_id = %id, receipt_id = %receipt_id);

        async move {
            let receipt = api.fetch_receipt(receipt_id).await?;
            if receipt.status == ReceiptStatus::Returned {
                return Err(ClientError::ReceiptReturned(receipt.id));
            }

            let (units, users) = tokio::try_join!(api.fetch_available(), api.fetch_users())?;
            let snapshot = build_snapshot(units);
            tracing::info!(
                items = snapshot.len(),
                owned = receipt.items.len(),
                "Opened receipt for editing"
            );

            Ok(Self {
                api,
                id,
                span: tracing::Span::current(),
                draft: ReceiptDraft::for_update(&receipt, snapshot),
                users,
            })
        }
        .instrument(span)
        .await
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn draft(&self) -> &ReceiptDraft {
        &self.draft
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn select_recipient(&mut self, user_id: &UserId) -> ClientResult<&User> {
        let _entered = self.span.enter();
        let user = self.draft.select_recipient(user_id, &self.users)?;
        tracing::debug!(recipient = %user.display_name(), "Recipient selected");
        Ok(user)
    }

    pub fn set_signature(&mut self, data_url: impl Into<String>) -> ClientResult<()> {
        Ok(self.draft.set_signature(data_url)?)
    }

    // ------------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------------

    pub fn add_to_group(&mut self, key: &GroupKey, requested: usize) -> ClientResult<Reconciliation> {
        let outcome = self.draft.add_to_group(key, requested);
        self.log_outcome("add_to_group", outcome)
    }

    pub fn set_group_quantity(&mut self, key: &GroupKey, quantity: usize) -> ClientResult<Reconciliation> {
        let outcome = self.draft.set_group_quantity(key, quantity);
        self.log_outcome("set_group_quantity", outcome)
    }

    pub fn remove_group(&mut self, key: &GroupKey) -> Reconciliation {
        let outcome = self.draft.remove_group(key);
        let _entered = self.span.enter();
        tracing::debug!(removed = outcome.removed.len(), "Group removed");
        outcome
    }

    pub fn add_cipher_unit(&mut self, unit_id: &UnitId) -> ClientResult<Reconciliation> {
        let outcome = self.draft.add_cipher_unit(unit_id);
        self.log_outcome("add_cipher_unit", outcome)
    }

    pub fn remove_cipher_unit(&mut self, unit_id: &UnitId) -> ClientResult<Reconciliation> {
        let outcome = self.draft.remove_cipher_unit(unit_id);
        self.log_outcome("remove_cipher_unit", outcome)
    }

    fn log_outcome(
        &self,
        operation: &str,
        outcome: Result<Reconciliation, shared::ReconcileError>,
    ) -> ClientResult<Reconciliation> {
        let _entered = self.span.enter();
        match &outcome {
            Ok(r) => {
                if let Some(notice) = &r.notice {
                    tracing::warn!(
                        operation,
                        requested = notice.requested,
                        available = notice.available_max,
                        "Requested quantity clamped to stock"
                    );
                }
                tracing::debug!(
                    operation,
                    added = r.added.len(),
                    removed = r.removed.len(),
                    quantity = r.quantity,
                    "Selection reconciled"
                );
            }
            Err(e) => tracing::debug!(operation, code = e.code(), "Reconciliation rejected"),
        }
        Ok(outcome?)
    }

    // ------------------------------------------------------------------------
    // Backend round trips
    // ------------------------------------------------------------------------

    /// Refetch the available items; the previous snapshot stays on failure
    pub async fn refresh(&mut self) -> ClientResult<Vec<SelectionEntry>> {
        let span = self.span.clone();
        async {
            let units = match self.api.fetch_available().await {
                Ok(units) => units,
                Err(e) => {
                    tracing::warn!(error = %e, "Refresh failed, keeping previous snapshot");
                    return Err(e);
                }
            };

            let previous = self.draft.snapshot().fetched_at();
            let pruned = self.draft.refresh_snapshot(build_snapshot(units));
            tracing::debug!(
                replaced = %previous,
                units = self.draft.snapshot().len(),
                "Inventory snapshot refreshed"
            );
            if !pruned.is_empty() {
                tracing::info!(pruned = pruned.len(), "Dropped items that are no longer available");
            }
            Ok(pruned)
        }
        .instrument(span)
        .await
    }

    /// Submit the draft
    ///
    /// On success the form is reset. A conflict is recorded on the draft with
    /// the selection untouched; any other failure leaves the draft as it was.
    pub async fn submit(&mut self) -> ClientResult<Receipt> {
        let span = self.span.clone();
        async {
            let submission = self.draft.submission()?;
            let result = match &submission {
                Submission::Create { request } => self.api.create_receipt(request).await,
                Submission::Update { receipt_id, request } => {
                    self.api.update_receipt(receipt_id, request).await
                }
            };

            match result {
                Ok(receipt) => {
                    tracing::info!(receipt_id = %receipt.id, items = receipt.items.len(), "Receipt submitted");
                    self.draft.reset();
                    Ok(receipt)
                }
                Err(ClientError::Conflict(body)) => {
                    let conflict = interpret_conflict(body, self.draft.snapshot());
                    tracing::warn!(
                        unavailable = conflict.unavailable.len(),
                        "Submission rejected, items claimed by another receipt"
                    );
                    self.draft.record_conflict(conflict.clone());
                    Err(conflict.into())
                }
                Err(e) => {
                    tracing::error!(error = %e, "Submission failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Return every item of a receipt
pub async fn return_receipt<S: ReceiptSink>(api: &S, receipt_id: &ReceiptId) -> ClientResult<Receipt> {
    let receipt = api.return_receipt(receipt_id).await?;
    tracing::info!(receipt_id = %receipt.id, status = %receipt.status, "Receipt returned");
    Ok(receipt)
}
