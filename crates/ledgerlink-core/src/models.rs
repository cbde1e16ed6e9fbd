//! Core data models for the ledger client

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{DocumentKind, Side};

/// Canonical ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Backend identifier (empty when the backend sent none)
    pub id: String,
    /// Entry date
    pub date: NaiveDate,
    /// Non-negative magnitude; the sign lives in `side`
    pub amount: Decimal,
    /// Credit or debit
    pub side: Side,
    pub category: String,
    pub description: String,
    /// Short human-readable reference assigned by the backend
    pub human_code: Option<String>,
    /// Attached documents, all with a non-empty URL
    pub documents: Vec<Document>,
}

impl Entry {
    /// Amount with two decimals, prefixed with '-' for debits
    pub fn display_amount(&self) -> String {
        match self.side {
            Side::Credit => format!("{:.2}", self.amount),
            Side::Debit => format!("-{:.2}", self.amount),
        }
    }

    /// Date as shown in listings, e.g. "Jan 05, 2024"
    pub fn display_date(&self) -> String {
        self.date.format("%b %d, %Y").to_string()
    }
}

/// Document attached to an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub url: String,
    pub name: String,
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_name(&self.name)
    }
}

/// Filters in the backend's wire format (dates as `DD-mon-YYYY`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl ListingFilters {
    /// Whether any filter is set
    pub fn is_active(&self) -> bool {
        self.query_string.is_some() || self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Body of a filter-endpoint request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub limit: usize,
    pub page_number: usize,
    #[serde(flatten)]
    pub filters: ListingFilters,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn entry(side: Side, amount: &str) -> Entry {
        Entry {
            id: "e-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            side,
            category: "Rent".to_string(),
            description: "January rent".to_string(),
            human_code: None,
            documents: vec![],
        }
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(entry(Side::Credit, "12.5").display_amount(), "12.50");
        assert_eq!(entry(Side::Debit, "1200").display_amount(), "-1200.00");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(entry(Side::Credit, "1").display_date(), "Jan 05, 2024");
    }

    #[test]
    fn test_filter_request_omits_absent_filters() {
        let request = FilterRequest {
            limit: 20,
            page_number: 1,
            filters: ListingFilters::default(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"limit": 20, "pageNumber": 1}));
    }

    #[test]
    fn test_filter_request_with_filters() {
        let request = FilterRequest {
            limit: 10,
            page_number: 3,
            filters: ListingFilters {
                query_string: Some("rent".to_string()),
                start_date: Some("01-jan-2024".to_string()),
                end_date: None,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "limit": 10,
                "pageNumber": 3,
                "queryString": "rent",
                "startDate": "01-jan-2024"
            })
        );
    }

    #[test]
    fn test_filters_active() {
        assert!(!ListingFilters::default().is_active());
        let filters = ListingFilters { end_date: Some("31-jan-2024".into()), ..Default::default() };
        assert!(filters.is_active());
    }
}
