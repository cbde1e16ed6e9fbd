//! Signed links for viewing entry documents

use ledgerlink_core::{Document, DocumentKind, Entry};
use serde::Serialize;

use crate::ApiClient;

/// Document with a URL that can be opened directly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    pub name: String,
    pub kind: DocumentKind,
    pub url: String,
}

impl ApiClient {
    pub fn document_link(&self, document: &Document) -> DocumentLink {
        DocumentLink {
            name: document.name.clone(),
            kind: document.kind(),
            url: self.transport.sign_for_link(&document.url),
        }
    }

    /// Signed links for every document attached to `entry`
    pub fn document_links(&self, entry: &Entry) -> Vec<DocumentLink> {
        entry.documents.iter().map(|d| self.document_link(d)).collect()
    }
}
