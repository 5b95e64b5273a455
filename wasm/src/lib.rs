//! WebAssembly bridge for the equipment receipt form
//!
//! Exposes the shared receipt composition core to the browser. Everything
//! crosses the boundary as JSON strings. Methods never throw for refused
//! operations; they answer with `{ "ok": false, "code", "message", "messageHe" }`
//! so the form can show the message next to the control that caused it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use shared::{
    parse_conflict, GroupKey, InventorySnapshot, InventoryUnit, LocalizedMessage, Receipt, ReceiptDraft,
    ReconcileResult, UnitId, User, UserId,
};
use wasm_bindgen::prelude::*;

// ============================================================================
// Envelope helpers
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Rejection<'a> {
    ok: bool,
    code: &'a str,
    message: String,
    message_he: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    unavailable_item_ids: Vec<UnitId>,
}

fn rejected(code: &str, message: LocalizedMessage) -> String {
    rejected_with_ids(code, message, Vec::new())
}

fn rejected_with_ids(code: &str, message: LocalizedMessage, unavailable_item_ids: Vec<UnitId>) -> String {
    let body = Rejection {
        ok: false,
        code,
        message: message.en,
        message_he: message.he,
        unavailable_item_ids,
    };
    serde_json::to_string(&body).unwrap_or_default()
}

fn accepted<T: Serialize>(value: &T) -> String {
    json!({ "ok": true, "value": value }).to_string()
}

fn invalid_input(what: &str, err: serde_json::Error) -> String {
    rejected(
        "INVALID_INPUT",
        LocalizedMessage::new(format!("Invalid {}: {}", what, err), format!("קלט לא תקין: {}", what)),
    )
}

fn reconciled(outcome: ReconcileResult) -> String {
    match outcome {
        Ok(r) => match &r.notice {
            Some(notice) => {
                let message = notice.message();
                json!({
                    "ok": true,
                    "value": r,
                    "notice": {
                        "code": notice.code(),
                        "message": message.en,
                        "messageHe": message.he,
                    }
                })
                .to_string()
            }
            None => accepted(&r),
        },
        Err(e) => {
            log(&format!("reconciliation rejected: {}", e));
            rejected(e.code(), e.message())
        }
    }
}

fn log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::debug_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

fn now() -> DateTime<Utc> {
    #[cfg(target_arch = "wasm32")]
    {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Utc::now()
    }
}

fn parse_snapshot(snapshot_json: &str) -> Result<InventorySnapshot, serde_json::Error> {
    let units: Vec<InventoryUnit> = serde_json::from_str(snapshot_json)?;
    let snapshot = InventorySnapshot::new(units, now());
    if snapshot.duplicates_dropped() > 0 {
        log(&format!("dropped {} duplicate item(s)", snapshot.duplicates_dropped()));
    }
    Ok(snapshot)
}

// ============================================================================
// Receipt composer
// ============================================================================

/// One open receipt form
#[wasm_bindgen]
pub struct ReceiptComposer {
    draft: ReceiptDraft,
    users: Vec<User>,
}

impl ReceiptComposer {
    /// Create-mode composer from the available-items JSON
    pub fn from_snapshot_json(snapshot_json: &str, require_signature: bool) -> Result<Self, String> {
        let snapshot = parse_snapshot(snapshot_json).map_err(|e| format!("Invalid snapshot: {}", e))?;
        Ok(Self {
            draft: ReceiptDraft::for_create(snapshot, require_signature),
            users: Vec::new(),
        })
    }

    /// Update-mode composer from a receipt and the available-items JSON
    pub fn from_receipt_json(receipt_json: &str, snapshot_json: &str) -> Result<Self, String> {
        let receipt: Receipt = serde_json::from_str(receipt_json).map_err(|e| format!("Invalid receipt: {}", e))?;
        let snapshot = parse_snapshot(snapshot_json).map_err(|e| format!("Invalid snapshot: {}", e))?;
        Ok(Self {
            users: vec![receipt.recipient.clone()],
            draft: ReceiptDraft::for_update(&receipt, snapshot),
        })
    }

    fn with_key(&mut self, key_json: &str, op: impl FnOnce(&mut ReceiptDraft, &GroupKey) -> String) -> String {
        match serde_json::from_str::<GroupKey>(key_json) {
            Ok(key) => op(&mut self.draft, &key),
            Err(e) => invalid_input("group key", e),
        }
    }
}

#[wasm_bindgen]
impl ReceiptComposer {
    #[wasm_bindgen(constructor)]
    pub fn new(snapshot_json: &str, require_signature: bool) -> Result<ReceiptComposer, JsValue> {
        Self::from_snapshot_json(snapshot_json, require_signature).map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(js_name = forReceipt)]
    pub fn for_receipt(receipt_json: &str, snapshot_json: &str) -> Result<ReceiptComposer, JsValue> {
        Self::from_receipt_json(receipt_json, snapshot_json).map_err(|e| JsValue::from_str(&e))
    }

    /// Replace the recipient list
    #[wasm_bindgen(js_name = setUsers)]
    pub fn set_users(&mut self, users_json: &str) -> String {
        match serde_json::from_str::<Vec<User>>(users_json) {
            Ok(users) => {
                self.users = users;
                accepted(&self.users.len())
            }
            Err(e) => invalid_input("user list", e),
        }
    }

    // ------------------------------------------------------------------------
    // Reconciliation
    // ------------------------------------------------------------------------

    #[wasm_bindgen(js_name = addToGroup)]
    pub fn add_to_group(&mut self, key_json: &str, requested: u32) -> String {
        self.with_key(key_json, |draft, key| {
            reconciled(draft.add_to_group(key, requested as usize))
        })
    }

    #[wasm_bindgen(js_name = setGroupQuantity)]
    pub fn set_group_quantity(&mut self, key_json: &str, quantity: u32) -> String {
        self.with_key(key_json, |draft, key| {
            reconciled(draft.set_group_quantity(key, quantity as usize))
        })
    }

    #[wasm_bindgen(js_name = removeGroup)]
    pub fn remove_group(&mut self, key_json: &str) -> String {
        self.with_key(key_json, |draft, key| accepted(&draft.remove_group(key)))
    }

    #[wasm_bindgen(js_name = addCipherUnit)]
    pub fn add_cipher_unit(&mut self, unit_id: &str) -> String {
        reconciled(self.draft.add_cipher_unit(&UnitId::new(unit_id)))
    }

    #[wasm_bindgen(js_name = removeCipherUnit)]
    pub fn remove_cipher_unit(&mut self, unit_id: &str) -> String {
        reconciled(self.draft.remove_cipher_unit(&UnitId::new(unit_id)))
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// Grouped rows of the receipt table
    pub fn rows(&self) -> String {
        accepted(&self.draft.rows())
    }

    /// Groups for the item selector, optionally filtered
    #[wasm_bindgen(js_name = availableGroups)]
    pub fn available_groups(&self, query: Option<String>) -> String {
        match query {
            Some(query) => accepted(&self.draft.search(&query)),
            None => accepted(&self.draft.available_groups()),
        }
    }

    #[wasm_bindgen(js_name = itemIds)]
    pub fn item_ids(&self) -> String {
        accepted(&self.draft.selection().item_ids())
    }

    // ------------------------------------------------------------------------
    // Recipient, signature and submission
    // ------------------------------------------------------------------------

    #[wasm_bindgen(js_name = selectRecipient)]
    pub fn select_recipient(&mut self, user_id: &str) -> String {
        match self.draft.select_recipient(&UserId::new(user_id), &self.users) {
            Ok(user) => accepted(user),
            Err(e) => rejected(e.code(), e.message()),
        }
    }

    #[wasm_bindgen(js_name = setSignature)]
    pub fn set_signature(&mut self, data_url: &str) -> String {
        match self.draft.set_signature(data_url) {
            Ok(()) => accepted(&true),
            Err(e) => rejected(e.code(), e.message()),
        }
    }

    #[wasm_bindgen(js_name = clearSignature)]
    pub fn clear_signature(&mut self) {
        self.draft.clear_signature();
    }

    /// The payload to send, or the reason the form is not ready
    pub fn submission(&self) -> String {
        match self.draft.submission() {
            Ok(submission) => accepted(&submission),
            Err(e) => rejected(e.code(), e.message()),
        }
    }

    /// Record the body of a 409 response against the current snapshot
    #[wasm_bindgen(js_name = recordConflict)]
    pub fn record_conflict(&mut self, body_json: &str) -> String {
        let Some(conflict) = parse_conflict(body_json, self.draft.snapshot()) else {
            return rejected(
                "INVALID_INPUT",
                LocalizedMessage::new("Unrecognised conflict response", "תשובת התנגשות לא מזוהה"),
            );
        };
        log(&format!("submission conflict on {} item(s)", conflict.unavailable.len()));

        let response = rejected_with_ids(conflict.code(), conflict.message(), conflict.unavailable_ids());
        self.draft.record_conflict(conflict);
        response
    }

    /// Swap in a freshly fetched snapshot; answers with the dropped units
    pub fn refresh(&mut self, snapshot_json: &str) -> String {
        match parse_snapshot(snapshot_json) {
            Ok(snapshot) => {
                let pruned: Vec<InventoryUnit> = self
                    .draft
                    .refresh_snapshot(snapshot)
                    .into_iter()
                    .map(|entry| entry.unit)
                    .collect();
                accepted(&pruned)
            }
            Err(e) => invalid_input("snapshot", e),
        }
    }

    pub fn reset(&mut self) {
        self.draft.reset();
    }
}

/// Clamp whatever the quantity stepper holds into `[0, available]`
#[wasm_bindgen(js_name = clampQuantity)]
pub fn clamp_quantity(raw: f64, available: u32) -> u32 {
    if !raw.is_finite() {
        return 0;
    }
    shared::clamp_quantity(raw.trunc() as i64, available as usize) as u32
}
