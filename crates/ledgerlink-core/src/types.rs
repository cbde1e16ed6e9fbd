//! Basic types for the ledger client

use serde::{Deserialize, Serialize};

/// Credit/debit side of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Money in
    #[serde(rename = "CR")]
    Credit,
    /// Money out
    #[serde(rename = "DR")]
    Debit,
}

impl Default for Side {
    fn default() -> Self {
        Side::Credit
    }
}

impl Side {
    /// Classify a free-form side marker.
    ///
    /// Anything containing "CR"/"CREDIT" is a credit, anything containing
    /// "DR"/"DEBIT" a debit (case-insensitive, credit checked first).
    /// Unrecognized markers fall back to credit.
    pub fn classify(marker: &str) -> Side {
        let upper = marker.to_uppercase();
        if upper.contains("CR") || upper.contains("CREDIT") {
            Side::Credit
        } else if upper.contains("DR") || upper.contains("DEBIT") {
            Side::Debit
        } else {
            Side::Credit
        }
    }

    /// Wire code used by the upload form
    pub fn code(&self) -> &'static str {
        match self {
            Side::Credit => "CR",
            Side::Debit => "DR",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cr" | "credit" => Ok(Side::Credit),
            "dr" | "debit" => Ok(Side::Debit),
            _ => Err(format!("Invalid side: {}", s)),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Document category derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
    Spreadsheet,
    Text,
    Other,
}

impl DocumentKind {
    /// Classify by the extension of a file name
    pub fn from_name(name: &str) -> DocumentKind {
        let lower = name.to_lowercase();
        let ext = lower.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        match ext {
            "pdf" => DocumentKind::Pdf,
            "jpg" | "jpeg" | "png" | "gif" => DocumentKind::Image,
            "xls" | "xlsx" | "csv" => DocumentKind::Spreadsheet,
            "doc" | "docx" | "txt" => DocumentKind::Text,
            _ => DocumentKind::Other,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Image => write!(f, "image"),
            DocumentKind::Spreadsheet => write!(f, "spreadsheet"),
            DocumentKind::Text => write!(f, "text"),
            DocumentKind::Other => write!(f, "other"),
        }
    }
}
