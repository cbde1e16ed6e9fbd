//! Category and description suggestions

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiResult;
use crate::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Category,
    Description,
}

impl SuggestionKind {
    /// Response field holding the suggestions
    pub fn response_field(&self) -> &'static str {
        match self {
            SuggestionKind::Category => "appended_category",
            SuggestionKind::Description => "appended_description",
        }
    }
}

impl std::str::FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "category" => Ok(SuggestionKind::Category),
            "description" => Ok(SuggestionKind::Description),
            _ => Err(format!("Unknown suggestion kind: {}", s)),
        }
    }
}

/// Suggestions under `field` of the first response element
pub fn parse_suggestions(raw: &Value, field: &str) -> Vec<String> {
    let first = match raw {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    first
        .and_then(|item| item.get(field))
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Runs only the most recent of a burst of lookups
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wait out the delay, then run `f` unless a newer call arrived meanwhile
    pub async fn run<F, Fut, T>(&self, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            return None;
        }
        Some(f().await)
    }
}

impl ApiClient {
    fn autocomplete_endpoint(&self, kind: SuggestionKind) -> &str {
        match kind {
            SuggestionKind::Category => &self.api.category_autocomplete_endpoint,
            SuggestionKind::Description => &self.api.description_autocomplete_endpoint,
        }
    }

    /// Suggestions for `text`; empty when too short or on any error
    pub async fn suggestions(&self, kind: SuggestionKind, text: &str) -> Vec<String> {
        if text.chars().count() < self.autocomplete.min_chars {
            return vec![];
        }

        let url = self.autocomplete_endpoint(kind);
        let result: ApiResult<Value> = match self.transport.post_json(url, &json!({ "searchFor": text })).await {
            Ok(response) => response.json::<Value>().await.map_err(Into::into),
            Err(e) => Err(e),
        };

        match result {
            Ok(raw) => parse_suggestions(&raw, kind.response_field()),
            Err(e) => {
                log::error!(target: "ledgerlink::autocomplete", "Fetching {:?} suggestions failed: {}", kind, e);
                vec![]
            }
        }
    }

    /// Debounced [`suggestions`](Self::suggestions); `None` when superseded
    pub async fn debounced_suggestions(&self, kind: SuggestionKind, text: &str) -> Option<Vec<String>> {
        let debouncer = match kind {
            SuggestionKind::Category => &self.category_debouncer,
            SuggestionKind::Description => &self.description_debouncer,
        };
        debouncer.run(|| self.suggestions(kind, text)).await
    }
}
