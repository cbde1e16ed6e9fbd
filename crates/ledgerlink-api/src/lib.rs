//! HTTP client for the ledger backend
//!
//! Endpoint calls are organized into modules:
//! - endpoints::entries: paged listing and CSV export
//! - endpoints::upload: multipart entry submission with progress
//! - endpoints::autocomplete: category and description suggestions
//! - endpoints::documents: signed document links

pub mod endpoints;
pub mod error;
pub mod transport;

use async_trait::async_trait;
use ledgerlink_config::{ApiConfig, AutocompleteConfig, Config};
use ledgerlink_core::{CoreResult, EntrySource, FilterRequest, RequestSigner};
use serde_json::Value;
use std::time::Duration;

pub use endpoints::autocomplete::{Debouncer, SuggestionKind};
pub use endpoints::documents::DocumentLink;
pub use endpoints::entries::{ExportFile, CSV_CONTENT_TYPE};
pub use endpoints::upload::{EntrySubmission, UploadEvent, UploadFile, UploadHandle};
pub use error::{ApiError, ApiResult};
pub use transport::Transport;

/// Ledger API client
pub struct ApiClient {
    transport: Transport,
    api: ApiConfig,
    autocomplete: AutocompleteConfig,
    category_debouncer: Debouncer,
    description_debouncer: Debouncer,
}

impl ApiClient {
    pub fn new(config: &Config, signer: RequestSigner) -> ApiResult<Self> {
        let delay = Duration::from_millis(config.autocomplete.debounce_ms);
        Ok(Self {
            transport: Transport::new(&config.api, signer)?,
            api: config.api.clone(),
            autocomplete: config.autocomplete.clone(),
            category_debouncer: Debouncer::new(delay),
            description_debouncer: Debouncer::new(delay),
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn api_config(&self) -> &ApiConfig {
        &self.api
    }
}

#[async_trait]
impl EntrySource for ApiClient {
    async fn fetch_page(&self, request: &FilterRequest) -> CoreResult<Value> {
        Ok(self.fetch_entries(request).await?)
    }
}
