//! Session credentials, request signing and entry listing for the ledger client

pub mod auth;
pub mod credential;
pub mod error;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod signer;
pub mod time;
pub mod types;

pub use auth::Authenticator;
pub use credential::{Credential, CredentialStore, FileStorage, MemoryStorage, SessionStorage};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorLogger, ErrorSeverity};
pub use listing::{EntrySource, FetchTicket, FilterInput, ListingController, ListingState, ListingStatus};
pub use models::{Document, Entry, FilterRequest, ListingFilters};
pub use normalize::{normalize_document, normalize_entry, unwrap_response_envelope, EntryNormalizer};
pub use signer::{RequestSigner, SignedRequest, MESSAGE_HEADER, SIGNATURE_HEADER};
pub use time::{Clock, FixedClock, SystemClock};
pub use types::{DocumentKind, Side};

use ledgerlink_config::Config;
use std::sync::Arc;

/// Open the session store configured in `config`
pub fn open_session_store(config: &Config) -> CoreResult<Arc<CredentialStore>> {
    let storage = FileStorage::open(config.session.path.clone())?;
    Ok(Arc::new(CredentialStore::new(Arc::new(storage))))
}
