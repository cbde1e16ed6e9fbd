//! Entry listing and CSV export

use ledgerlink_core::time::export_file_name;
use ledgerlink_core::{FilterRequest, ListingFilters};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::ApiResult;
use crate::ApiClient;

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// CSV export ready to be saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ExportFile {
    /// Write the export into `dir` under its file name
    pub async fn save_in(&self, dir: &Path) -> ApiResult<PathBuf> {
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.body.as_bytes()).await?;
        log::info!(target: "ledgerlink::export", "Saved {} ({} bytes)", path.display(), self.body.len());
        Ok(path)
    }
}

impl ApiClient {
    /// Raw envelope for one page of entries
    pub async fn fetch_entries(&self, request: &FilterRequest) -> ApiResult<Value> {
        let response = self.transport.post_json(&self.api.filter_endpoint, request).await?;
        Ok(response.json::<Value>().await?)
    }

    /// CSV of every entry matching `filters`
    pub async fn export_entries(&self, filters: &ListingFilters) -> ApiResult<ExportFile> {
        let response = self.transport.post_json(&self.api.export_endpoint, filters).await?;
        let body = response.text().await?;
        let today = self.transport.signer().clock().today();

        Ok(ExportFile {
            file_name: export_file_name(today),
            content_type: CSV_CONTENT_TYPE,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::test_support::{config, signer, spawn_server, PASSWORD};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use ledgerlink_core::signer::hmac_signature;
    use ledgerlink_core::{EntrySource, ListingController, ListingStatus};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<Value>>>;

    fn verified(headers: &HeaderMap) -> bool {
        let message = headers.get("x-message").and_then(|v| v.to_str().ok());
        let signature = headers.get("x-signature").and_then(|v| v.to_str().ok());
        match (message, signature) {
            (Some(message), Some(signature)) => hmac_signature(message, PASSWORD).ok().as_deref() == Some(signature),
            _ => false,
        }
    }

    fn ledger_router(seen: Seen) -> Router {
        let filter_seen = seen.clone();
        Router::new()
            .route(
                "/filter",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let seen = filter_seen.clone();
                    async move {
                        if !verified(&headers) {
                            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad signature"})));
                        }
                        seen.lock().unwrap().push(body.clone());
                        let page = body["pageNumber"].as_u64().unwrap_or(0);
                        let records: Vec<Value> = match page {
                            1 => (0..2).map(|i| json!({"entry": {"id": format!("p1-{}", i), "amount": "4.50", "cr_dr": "DR"}, "documents": []})).collect(),
                            _ => vec![json!({"id": "p2-0", "amount": 1})],
                        };
                        (StatusCode::OK, Json(json!([{ "response": records }])))
                    }
                }),
            )
            .route(
                "/export",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let seen = seen.clone();
                    async move {
                        if !verified(&headers) {
                            return (StatusCode::UNAUTHORIZED, String::new());
                        }
                        seen.lock().unwrap().push(body);
                        (StatusCode::OK, "date,amount\n05-jan-2024,4.50\n".to_string())
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_listing_through_client() {
        let seen: Seen = Arc::default();
        let base = spawn_server(ledger_router(seen.clone())).await;
        let client = ApiClient::new(&config(&base), signer(Some(PASSWORD))).unwrap();
        let mut listing = ListingController::new(2);

        listing.reset_and_load(&client).await;
        assert_eq!(listing.state().total_loaded, 2);
        assert!(!listing.state().exhausted);
        assert_eq!(listing.entries()[0].display_amount(), "-4.50");

        assert!(listing.load_more(&client).await);
        assert_eq!(listing.state().total_loaded, 3);
        assert!(listing.state().exhausted);

        let bodies = seen.lock().unwrap().clone();
        assert_eq!(bodies[0], json!({"limit": 2, "pageNumber": 1}));
        assert_eq!(bodies[1], json!({"limit": 2, "pageNumber": 2}));
    }

    #[tokio::test]
    async fn test_listing_without_session_shows_error() {
        let base = spawn_server(ledger_router(Arc::default())).await;
        let client = ApiClient::new(&config(&base), signer(None)).unwrap();
        let mut listing = ListingController::new(2);

        listing.reset_and_load(&client).await;
        assert!(matches!(listing.status(), ListingStatus::Error(_)));
        assert!(listing.entries().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_maps_status_to_network_error() {
        let base = spawn_server(ledger_router(Arc::default())).await;
        let client = ApiClient::new(&config(&base), signer(None)).unwrap();
        let request = FilterRequest { limit: 2, page_number: 1, filters: ListingFilters::default() };

        assert!(matches!(client.fetch_entries(&request).await, Err(ApiError::Status { status: 401, .. })));
        let core = client.fetch_page(&request).await.unwrap_err();
        assert!(core.is_user_visible());
    }

    #[tokio::test]
    async fn test_export_entries() {
        let seen: Seen = Arc::default();
        let base = spawn_server(ledger_router(seen.clone())).await;
        let client = ApiClient::new(&config(&base), signer(Some(PASSWORD))).unwrap();
        let filters = ListingFilters { query_string: Some("rent".into()), ..Default::default() };

        let export = client.export_entries(&filters).await.unwrap();
        assert_eq!(export.file_name, "transactions-export-05-jan-2024.csv");
        assert_eq!(export.content_type, "text/csv;charset=utf-8");
        assert!(export.body.starts_with("date,amount"));
        assert_eq!(seen.lock().unwrap()[0], json!({"queryString": "rent"}));

        let dir = tempfile::tempdir().unwrap();
        let path = export.save_in(dir.path()).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), export.body);
    }
}
