//! In-process backend used by the unit tests of this crate

use std::sync::Mutex;

use chrono::Utc;
use shared::{
    AllocatedLocation, ConflictBody, ConflictDetail, CreateReceiptRequest, InventoryUnit, Receipt, ReceiptId,
    ReceiptStatus, UnitId, UpdateReceiptRequest, User, UserId, ITEMS_UNAVAILABLE,
};

use crate::error::{ClientError, ClientResult};
use crate::external::{InventorySource, ReceiptSink, UserDirectory};

pub fn unit(id: &str, name: &str, location: &str, cipher: bool) -> InventoryUnit {
    InventoryUnit {
        id: UnitId::new(id),
        name: name.to_string(),
        id_number: cipher.then(|| format!("SN-{}", id)),
        allocated_location: Some(AllocatedLocation {
            id: location.to_string(),
            name: location.to_string(),
            unit_name: None,
        }),
        requires_reporting: cipher,
        is_operational: true,
    }
}

pub struct FakeBackend {
    pub available: Mutex<Vec<InventoryUnit>>,
    pub users: Vec<User>,
    /// Units another form claimed behind this client's back
    pub claimed: Mutex<Vec<UnitId>>,
    pub fail_inventory: Mutex<bool>,
    pub receipts: Mutex<Vec<Receipt>>,
}

impl FakeBackend {
    /// Helmets h1..h3 and radio c1 at base1, one user u1
    pub fn standard() -> Self {
        Self {
            available: Mutex::new(vec![
                unit("h1", "Helmet", "base1", false),
                unit("h2", "Helmet", "base1", false),
                unit("h3", "Helmet", "base1", false),
                unit("c1", "Radio", "base1", true),
            ]),
            users: vec![User {
                id: UserId::new("u1"),
                name: "Dana Levi".to_string(),
                personal_number: Some("8123456".to_string()),
                unit_name: None,
            }],
            claimed: Mutex::new(Vec::new()),
            fail_inventory: Mutex::new(false),
            receipts: Mutex::new(Vec::new()),
        }
    }

    fn issue(&self, id: ReceiptId, recipient: &UserId, item_ids: &[UnitId]) -> ClientResult<Receipt> {
        let claimed = self.claimed.lock().unwrap();
        let unavailable: Vec<UnitId> = item_ids.iter().filter(|id| claimed.contains(id)).cloned().collect();
        if !unavailable.is_empty() {
            return Err(ClientError::Conflict(ConflictBody {
                error: ConflictDetail {
                    code: ITEMS_UNAVAILABLE.to_string(),
                    message: None,
                    unavailable_item_ids: unavailable,
                },
            }));
        }

        let mut available = self.available.lock().unwrap();
        let items = item_ids
            .iter()
            .filter_map(|id| available.iter().find(|u| &u.id == id).cloned())
            .collect();
        available.retain(|u| !item_ids.contains(&u.id));

        let receipt = Receipt {
            id,
            recipient: self
                .users
                .iter()
                .find(|u| &u.id == recipient)
                .cloned()
                .ok_or_else(|| ClientError::NotFound("User".to_string()))?,
            items,
            status: ReceiptStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };
        self.receipts.lock().unwrap().push(receipt.clone());
        Ok(receipt)
    }
}

impl InventorySource for FakeBackend {
    async fn fetch_available(&self) -> ClientResult<Vec<InventoryUnit>> {
        if *self.fail_inventory.lock().unwrap() {
            return Err(ClientError::Server {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let claimed = self.claimed.lock().unwrap();
        Ok(self
            .available
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !claimed.contains(&u.id))
            .cloned()
            .collect())
    }
}

impl UserDirectory for FakeBackend {
    async fn fetch_users(&self) -> ClientResult<Vec<User>> {
        Ok(self.users.clone())
    }
}

impl ReceiptSink for FakeBackend {
    async fn fetch_receipt(&self, id: &ReceiptId) -> ClientResult<Receipt> {
        self.receipts
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Receipt".to_string()))
    }

    async fn create_receipt(&self, request: &CreateReceiptRequest) -> ClientResult<Receipt> {
        let id = ReceiptId::new(format!("r{}", self.receipts.lock().unwrap().len() + 1));
        self.issue(id, &request.recipient_user_id, &request.item_ids)
    }

    async fn update_receipt(&self, id: &ReceiptId, request: &UpdateReceiptRequest) -> ClientResult<Receipt> {
        let existing = self.fetch_receipt(id).await?;
        self.receipts.lock().unwrap().retain(|r| &r.id != id);
        self.available.lock().unwrap().extend(existing.items);
        self.issue(id.clone(), &request.recipient_user_id, &request.item_ids)
    }

    async fn return_receipt(&self, id: &ReceiptId) -> ClientResult<Receipt> {
        let mut receipts = self.receipts.lock().unwrap();
        let receipt = receipts
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| ClientError::NotFound("Receipt".to_string()))?;
        receipt.status = ReceiptStatus::Returned;
        self.available.lock().unwrap().extend(receipt.items.clone());
        Ok(receipt.clone())
    }
}
