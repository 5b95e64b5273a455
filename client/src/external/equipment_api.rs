//! Equipment Tracking API Client
//!
//! REST client for the equipment tracking backend.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    ConflictBody, CreateReceiptRequest, InventoryUnit, Receipt, ReceiptId, UpdateReceiptRequest, User,
};

use super::{InventorySource, ReceiptSink, UserDirectory};
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};

/// Client for the equipment tracking backend
#[derive(Clone)]
pub struct EquipmentApiClient {
    base_url: String,
    token: Option<String>,
    http_client: Client,
}

impl EquipmentApiClient {
    /// Create a new client from the API configuration
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, resource: &str) -> ClientResult<T> {
        let response = self.authorize(request).send().await?;
        let response = check_status(response, resource).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("{}: {}", resource, e)))
    }

    /// Get units currently available for issue
    pub async fn get_available_items(&self) -> ClientResult<Vec<InventoryUnit>> {
        tracing::debug!("Fetching available items");
        self.send(self.http_client.get(self.url("/items/available")), "Items")
            .await
    }

    /// Get users that can sign for equipment
    pub async fn get_users(&self) -> ClientResult<Vec<User>> {
        self.send(self.http_client.get(self.url("/users")), "Users").await
    }

    pub async fn get_receipt(&self, id: &ReceiptId) -> ClientResult<Receipt> {
        let url = self.url(&format!("/receipts/{}", id));
        self.send(self.http_client.get(url), "Receipt").await
    }

    /// Issue a new receipt
    pub async fn post_receipt(&self, request: &CreateReceiptRequest) -> ClientResult<Receipt> {
        tracing::debug!(items = request.item_ids.len(), "Creating receipt");
        self.send(
            self.http_client.post(self.url("/receipts")).json(request),
            "Receipt",
        )
        .await
    }

    /// Replace the item list of an existing receipt
    pub async fn put_receipt(&self, id: &ReceiptId, request: &UpdateReceiptRequest) -> ClientResult<Receipt> {
        tracing::debug!(receipt_id = %id, items = request.item_ids.len(), "Updating receipt");
        let url = self.url(&format!("/receipts/{}", id));
        self.send(self.http_client.put(url).json(request), "Receipt").await
    }

    /// Return every item of a receipt
    pub async fn post_return(&self, id: &ReceiptId) -> ClientResult<Receipt> {
        let url = self.url(&format!("/receipts/{}/return", id));
        self.send(self.http_client.post(url), "Receipt").await
    }
}

/// Map non-success statuses onto client errors
async fn check_status(response: Response, resource: &str) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(error_for_status(status, body, resource))
}

fn error_for_status(status: StatusCode, body: String, resource: &str) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound(resource.to_string()),
        StatusCode::CONFLICT => match serde_json::from_str::<ConflictBody>(&body) {
            Ok(conflict) => ClientError::Conflict(conflict),
            Err(_) => ClientError::Server {
                status: status.as_u16(),
                body,
            },
        },
        _ => ClientError::Server {
            status: status.as_u16(),
            body,
        },
    }
}

impl InventorySource for EquipmentApiClient {
    async fn fetch_available(&self) -> ClientResult<Vec<InventoryUnit>> {
        self.get_available_items().await
    }
}

impl UserDirectory for EquipmentApiClient {
    async fn fetch_users(&self) -> ClientResult<Vec<User>> {
        self.get_users().await
    }
}

impl ReceiptSink for EquipmentApiClient {
    async fn fetch_receipt(&self, id: &ReceiptId) -> ClientResult<Receipt> {
        self.get_receipt(id).await
    }

    async fn create_receipt(&self, request: &CreateReceiptRequest) -> ClientResult<Receipt> {
        self.post_receipt(request).await
    }

    async fn update_receipt(&self, id: &ReceiptId, request: &UpdateReceiptRequest) -> ClientResult<Receipt> {
        self.put_receipt(id, request).await
    }

    async fn return_receipt(&self, id: &ReceiptId) -> ClientResult<Receipt> {
        self.post_return(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_status_parses_body() {
        let body = r#"{"error":{"code":"ITEMS_UNAVAILABLE","unavailableItemIds":["h1"]}}"#;
        let err = error_for_status(StatusCode::CONFLICT, body.to_string(), "Receipt");

        let ClientError::Conflict(conflict) = err else {
            panic!("expected a conflict error");
        };
        assert_eq!(conflict.error.code, "ITEMS_UNAVAILABLE");
        assert_eq!(conflict.error.unavailable_item_ids.len(), 1);
    }

    #[test]
    fn test_unstructured_conflict_is_a_server_error() {
        let err = error_for_status(StatusCode::CONFLICT, "busy".to_string(), "Receipt");
        assert!(matches!(err, ClientError::Server { status: 409, .. }));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, String::new(), "Users"),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, String::new(), "Receipt"),
            ClientError::NotFound(ref r) if r == "Receipt"
        ));
        let err = error_for_status(StatusCode::SERVICE_UNAVAILABLE, "down".to_string(), "Items");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = EquipmentApiClient::new(&ApiConfig {
            base_url: "http://localhost:5000/api/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(client.url("/users"), "http://localhost:5000/api/users");
    }
}
